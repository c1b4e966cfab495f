//! Persistence contract for user accounts.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{Result, user::User};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create the account and its credentials row in one transaction.
    async fn create_user(&self, user: &User, password_hash: &str) -> Result<()>;

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn get_password_hash(&self, user_id: Uuid) -> Result<Option<String>>;
}
