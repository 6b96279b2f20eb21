use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use portal_core::{Email, User, UserId, UserStore, UserStoreError};

#[derive(Default)]
struct Users {
    by_id: HashMap<UserId, User>,
    ids_by_email: HashMap<Email, UserId>,
}

#[derive(Default, Clone)]
pub struct HashMapUserStore {
    users: Arc<RwLock<Users>>,
}

impl HashMapUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserStore for HashMapUserStore {
    async fn add_user(&self, user: User) -> Result<(), UserStoreError> {
        let mut users = self.users.write().await;
        if users.ids_by_email.contains_key(user.email()) {
            return Err(UserStoreError::UserAlreadyExists);
        }
        users.ids_by_email.insert(user.email().clone(), *user.id());
        users.by_id.insert(*user.id(), user);
        Ok(())
    }

    async fn get_user_by_email(&self, email: &Email) -> Result<User, UserStoreError> {
        let users = self.users.read().await;
        users
            .ids_by_email
            .get(email)
            .and_then(|id| users.by_id.get(id))
            .cloned()
            .ok_or(UserStoreError::UserNotFound)
    }

    async fn get_user_by_id(&self, id: &UserId) -> Result<User, UserStoreError> {
        let users = self.users.read().await;
        users
            .by_id
            .get(id)
            .cloned()
            .ok_or(UserStoreError::UserNotFound)
    }
}
