//! Shared fixtures: an in-memory [`MarketStore`], a failing store, a test
//! configuration and small request helpers.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use chrono::Utc;
use tower::ServiceExt;
use uuid::Uuid;

use crate::config::{AppConfig, RawSettings};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::issue_token;
use crate::state::AppState;
use crate::store::MarketStore;
use crate::types::{Category, NewPost, NewUser, Post, PostFilter, PostUpdate, ProfileUpdate, User};

pub const TEST_SECRET: &str = "test-secret";
/// Detail that must never reach a response body.
pub const LEAKY_DETAIL: &str = "password authentication failed for user \"render\" at 10.0.0.5";

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    categories: Vec<Category>,
    // insertion order; newest last
    posts: Vec<Post>,
    favorites: Vec<(Uuid, Uuid)>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn with_categories(names: &[&str]) -> Self {
        let store = Self::default();
        {
            let mut inner = store.inner.lock().unwrap();
            for (i, name) in names.iter().enumerate() {
                inner.categories.push(Category { id: i as i32 + 1, name: name.to_string() });
            }
        }
        store
    }

    /// Inserts a user whose password hash uses the minimum bcrypt cost.
    pub fn seed_user(&self, name: &str, email: &str, password: &str) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_lowercase(),
            password_hash: bcrypt::hash(password, 4).unwrap(),
            bio: None,
            avatar_url: None,
            phone: None,
            created_at: now,
            updated_at: now,
        };
        self.inner.lock().unwrap().users.push(user.clone());
        user
    }

    pub fn post_count(&self) -> usize {
        self.inner.lock().unwrap().posts.len()
    }
}

#[async_trait]
impl MarketStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("El registro ya existe".into()));
        }
        let now = Utc::now();
        let row = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            bio: None,
            avatar_url: None,
            phone: None,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(row.clone());
        Ok(row)
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.inner.lock().unwrap().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.inner.lock().unwrap().users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.inner.lock().unwrap().users.clone())
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<Option<User>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(user) = inner.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(v) = update.name {
            user.name = v;
        }
        if let Some(v) = update.bio {
            user.bio = Some(v);
        }
        if let Some(v) = update.avatar_url {
            user.avatar_url = Some(v);
        }
        if let Some(v) = update.phone {
            user.phone = Some(v);
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let mut rows = self.inner.lock().unwrap().categories.clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn find_category(&self, id: i32) -> AppResult<Option<Category>> {
        Ok(self.inner.lock().unwrap().categories.iter().find(|c| c.id == id).cloned())
    }

    async fn list_posts(&self, filter: &PostFilter) -> AppResult<Vec<Post>> {
        let q = filter.q.as_deref().map(|q| q.trim().to_lowercase()).filter(|q| !q.is_empty());
        Ok(self
            .inner
            .lock()
            .unwrap()
            .posts
            .iter()
            .rev()
            .filter(|p| filter.category_id.map_or(true, |c| p.category_id == Some(c)))
            .filter(|p| filter.user_id.map_or(true, |u| p.user_id == u))
            .filter(|p| q.as_ref().map_or(true, |q| p.title.to_lowercase().contains(q.as_str())))
            .cloned()
            .collect())
    }

    async fn find_post(&self, id: Uuid) -> AppResult<Option<Post>> {
        Ok(self.inner.lock().unwrap().posts.iter().find(|p| p.id == id).cloned())
    }

    async fn create_post(&self, user_id: Uuid, post: NewPost) -> AppResult<Post> {
        let now = Utc::now();
        let row = Post {
            id: Uuid::new_v4(),
            user_id,
            category_id: post.category_id,
            title: post.title.trim().to_string(),
            description: post.description,
            price: post.price,
            image_url: post.image_url,
            created_at: now,
            updated_at: now,
        };
        self.inner.lock().unwrap().posts.push(row.clone());
        Ok(row)
    }

    async fn update_post(&self, id: Uuid, update: PostUpdate) -> AppResult<Option<Post>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(post) = inner.posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(v) = update.title {
            post.title = v.trim().to_string();
        }
        if let Some(v) = update.description {
            post.description = v;
        }
        if let Some(v) = update.price {
            post.price = v;
        }
        if let Some(v) = update.category_id {
            post.category_id = Some(v);
        }
        if let Some(v) = update.image_url {
            post.image_url = Some(v);
        }
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.posts.len();
        inner.posts.retain(|p| p.id != id);
        inner.favorites.retain(|(_, post_id)| *post_id != id);
        Ok(inner.posts.len() < before)
    }

    async fn list_favorites(&self, user_id: Uuid) -> AppResult<Vec<Post>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .favorites
            .iter()
            .rev()
            .filter(|(u, _)| *u == user_id)
            .filter_map(|(_, post_id)| inner.posts.iter().find(|p| p.id == *post_id).cloned())
            .collect())
    }

    async fn add_favorite(&self, user_id: Uuid, post_id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        if inner.favorites.contains(&(user_id, post_id)) {
            return Ok(false);
        }
        inner.favorites.push((user_id, post_id));
        Ok(true)
    }

    async fn remove_favorite(&self, user_id: Uuid, post_id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.favorites.len();
        inner.favorites.retain(|pair| *pair != (user_id, post_id));
        Ok(inner.favorites.len() < before)
    }
}

/// Every call fails like an unreachable database would, or panics.
pub struct FailingStore {
    pub panic: bool,
}

impl FailingStore {
    fn fail<T>(&self) -> AppResult<T> {
        if self.panic {
            panic!("store exploded: {}", LEAKY_DETAIL);
        }
        Err(AppError::Database(LEAKY_DETAIL.to_string()))
    }
}

#[async_trait]
impl MarketStore for FailingStore {
    async fn create_user(&self, _: NewUser) -> AppResult<User> {
        self.fail()
    }
    async fn find_user(&self, _: Uuid) -> AppResult<Option<User>> {
        self.fail()
    }
    async fn find_user_by_email(&self, _: &str) -> AppResult<Option<User>> {
        self.fail()
    }
    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.fail()
    }
    async fn update_profile(&self, _: Uuid, _: ProfileUpdate) -> AppResult<Option<User>> {
        self.fail()
    }
    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.fail()
    }
    async fn find_category(&self, _: i32) -> AppResult<Option<Category>> {
        self.fail()
    }
    async fn list_posts(&self, _: &PostFilter) -> AppResult<Vec<Post>> {
        self.fail()
    }
    async fn find_post(&self, _: Uuid) -> AppResult<Option<Post>> {
        self.fail()
    }
    async fn create_post(&self, _: Uuid, _: NewPost) -> AppResult<Post> {
        self.fail()
    }
    async fn update_post(&self, _: Uuid, _: PostUpdate) -> AppResult<Option<Post>> {
        self.fail()
    }
    async fn delete_post(&self, _: Uuid) -> AppResult<bool> {
        self.fail()
    }
    async fn list_favorites(&self, _: Uuid) -> AppResult<Vec<Post>> {
        self.fail()
    }
    async fn add_favorite(&self, _: Uuid, _: Uuid) -> AppResult<bool> {
        self.fail()
    }
    async fn remove_favorite(&self, _: Uuid, _: Uuid) -> AppResult<bool> {
        self.fail()
    }
}

pub fn raw_settings() -> RawSettings {
    RawSettings {
        jwt_secret: Some(TEST_SECRET.into()),
        db_host: Some("db.example.internal".into()),
        db_user: Some("tienda".into()),
        db_password: Some("hunter2".into()),
        db_name: Some("tiendacl".into()),
        ..Default::default()
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    // kept alive for the duration of the test
    pub uploads: tempfile::TempDir,
}

impl TestApp {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self::with_settings(store, |_| {})
    }

    /// Same as [`TestApp::new`] with `tweak` applied to the settings first.
    pub fn with_settings(store: Arc<dyn MarketStore>, tweak: impl FnOnce(&mut RawSettings)) -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let mut raw = raw_settings();
        raw.uploads_dir = Some(uploads.path().to_string_lossy().into_owned());
        tweak(&mut raw);
        let state = AppState::new(store, AppConfig::from_settings(raw).unwrap());
        Self { router: crate::build_router(state.clone()), state, uploads }
    }

    pub fn token_for(&self, user: &User) -> String {
        issue_token(&self.state.config, user.id).unwrap()
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
        let res = self.router.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let headers = res.headers().clone();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    pub async fn send_json(&self, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let (status, _, body) = self.send(req).await;
        let value = if body.is_empty() { serde_json::Value::Null } else { serde_json::from_slice(&body).unwrap() };
        (status, value)
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri).header("content-type", "application/json");
    if let Some(t) = token {
        builder = builder.header("authorization", format!("Bearer {}", t));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn authed(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}
