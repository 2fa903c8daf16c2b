//! In-memory stand-in for the external user service.

use std::collections::HashSet;
use std::sync::{RwLock, RwLockWriteGuard};

use keyward_core::{AuthError, AuthResult, Id, UserService};

/// Set of known user ids.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashSet<Id>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = Id>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().collect()),
        }
    }

    pub fn insert(&self, user_id: Id) -> AuthResult<()> {
        self.write()?.insert(user_id);
        Ok(())
    }

    pub fn remove(&self, user_id: &Id) -> AuthResult<bool> {
        Ok(self.write()?.remove(user_id))
    }

    fn write(&self) -> AuthResult<RwLockWriteGuard<'_, HashSet<Id>>> {
        self.users
            .write()
            .map_err(|_| AuthError::internal("user directory lock poisoned"))
    }
}

#[async_trait::async_trait]
impl UserService for InMemoryUserDirectory {
    async fn user_exists(&self, user_id: &Id) -> AuthResult<bool> {
        let users = self
            .users
            .read()
            .map_err(|_| AuthError::internal("user directory lock poisoned"))?;
        Ok(users.contains(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tracks_membership() {
        let dir = InMemoryUserDirectory::with_users([Id::from(1)]);
        assert!(dir.user_exists(&Id::from(1)).await.unwrap());
        assert!(!dir.user_exists(&Id::from(2)).await.unwrap());

        dir.insert(Id::from(2)).unwrap();
        assert!(dir.remove(&Id::from(1)).unwrap());
        assert!(!dir.remove(&Id::from(1)).unwrap());
        assert!(!dir.user_exists(&Id::from(1)).await.unwrap());
        assert!(dir.user_exists(&Id::from(2)).await.unwrap());
    }

    #[tokio::test]
    async fn poisoned_lock_is_reported() {
        let dir = InMemoryUserDirectory::with_users([Id::from(1)]);
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = dir.users.write().unwrap();
            panic!("poison the directory lock");
        }));

        assert!(matches!(dir.insert(Id::from(2)), Err(AuthError::Internal(_))));
        assert!(matches!(dir.remove(&Id::from(1)), Err(AuthError::Internal(_))));
        assert!(matches!(dir.user_exists(&Id::from(1)).await, Err(AuthError::Internal(_))));
    }
}
