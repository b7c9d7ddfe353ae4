//! Persistence seam for the route modules.
//!
//! Handlers only ever see `Arc<dyn MarketStore>`; production wires in
//! [`PgStore`], tests wire in an in-memory double.

mod postgres;

pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::types::{Category, NewPost, NewUser, Post, PostFilter, PostUpdate, ProfileUpdate, User};

#[async_trait]
pub trait MarketStore: Send + Sync {
    // users / profile
    async fn create_user(&self, user: NewUser) -> AppResult<User>;
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>>;
    /// `email` must already be lower-cased.
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn list_users(&self) -> AppResult<Vec<User>>;
    /// Applies the set fields only. `None` when the user does not exist.
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<Option<User>>;

    // categories
    async fn list_categories(&self) -> AppResult<Vec<Category>>;
    async fn find_category(&self, id: i32) -> AppResult<Option<Category>>;

    // posts
    /// Newest first.
    async fn list_posts(&self, filter: &PostFilter) -> AppResult<Vec<Post>>;
    async fn find_post(&self, id: Uuid) -> AppResult<Option<Post>>;
    async fn create_post(&self, user_id: Uuid, post: NewPost) -> AppResult<Post>;
    async fn update_post(&self, id: Uuid, update: PostUpdate) -> AppResult<Option<Post>>;
    /// `false` when nothing was deleted.
    async fn delete_post(&self, id: Uuid) -> AppResult<bool>;

    // favorites
    /// Posts favorited by `user_id`, most recently favorited first.
    async fn list_favorites(&self, user_id: Uuid) -> AppResult<Vec<Post>>;
    /// `false` when the pair already existed.
    async fn add_favorite(&self, user_id: Uuid, post_id: Uuid) -> AppResult<bool>;
    /// `false` when the pair did not exist.
    async fn remove_favorite(&self, user_id: Uuid, post_id: Uuid) -> AppResult<bool>;
}
