use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::MarketStore;
use crate::error::AppResult;
use crate::types::{Category, NewPost, NewUser, Post, PostFilter, PostUpdate, ProfileUpdate, User};

const USER_COLUMNS: &str = "id, name, email, password_hash, bio, avatar_url, phone, created_at, updated_at";
const POST_COLUMNS: &str =
    "p.id, p.user_id, p.category_id, p.title, p.description, p.price, p.image_url, p.created_at, p.updated_at";

/// [`MarketStore`] over the shared PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MarketStore for PgStore {
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let row = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users ORDER BY created_at", USER_COLUMNS))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET
                name = COALESCE($2, name),
                bio = COALESCE($3, bio),
                avatar_url = COALESCE($4, avatar_url),
                phone = COALESCE($5, phone),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(update.name)
        .bind(update.bio)
        .bind(update.avatar_url)
        .bind(update.phone)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_category(&self, id: i32) -> AppResult<Option<Category>> {
        let row = sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_posts(&self, filter: &PostFilter) -> AppResult<Vec<Post>> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM posts p WHERE TRUE", POST_COLUMNS));
        if let Some(category_id) = filter.category_id {
            query.push(" AND p.category_id = ").push_bind(category_id);
        }
        if let Some(user_id) = filter.user_id {
            query.push(" AND p.user_id = ").push_bind(user_id);
        }
        if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            query.push(" AND p.title ILIKE ").push_bind(format!("%{}%", escape_like(q)));
        }
        query.push(" ORDER BY p.created_at DESC");

        let rows = query.build_query_as::<Post>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn find_post(&self, id: Uuid) -> AppResult<Option<Post>> {
        let row = sqlx::query_as::<_, Post>(&format!("SELECT {} FROM posts p WHERE p.id = $1", POST_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_post(&self, user_id: Uuid, post: NewPost) -> AppResult<Post> {
        let row = sqlx::query_as::<_, Post>(&format!(
            "INSERT INTO posts AS p (id, user_id, category_id, title, description, price, image_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            POST_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(post.category_id)
        .bind(post.title.trim())
        .bind(&post.description)
        .bind(post.price)
        .bind(post.image_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_post(&self, id: Uuid, update: PostUpdate) -> AppResult<Option<Post>> {
        let row = sqlx::query_as::<_, Post>(&format!(
            "UPDATE posts AS p SET
                title = COALESCE($2, p.title),
                description = COALESCE($3, p.description),
                price = COALESCE($4, p.price),
                category_id = COALESCE($5, p.category_id),
                image_url = COALESCE($6, p.image_url),
                updated_at = NOW()
             WHERE p.id = $1
             RETURNING {}",
            POST_COLUMNS
        ))
        .bind(id)
        .bind(update.title.map(|t| t.trim().to_string()))
        .bind(update.description)
        .bind(update.price)
        .bind(update.category_id)
        .bind(update.image_url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_post(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_favorites(&self, user_id: Uuid) -> AppResult<Vec<Post>> {
        let rows = sqlx::query_as::<_, Post>(&format!(
            "SELECT {} FROM favorites f
             JOIN posts p ON p.id = f.post_id
             WHERE f.user_id = $1
             ORDER BY f.created_at DESC",
            POST_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn add_favorite(&self, user_id: Uuid, post_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO favorites (user_id, post_id) VALUES ($1, $2) ON CONFLICT (user_id, post_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(post_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_favorite(&self, user_id: Uuid, post_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Escapes LIKE wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    input.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}
