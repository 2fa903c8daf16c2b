use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use keyward_core::{
    AuthError, AuthResult, Authorization, AuthorizationFilter, AuthorizationPage,
    AuthorizationService, AuthorizationUpdate, FindOptions, Id, IdGenerator, NewAuthorization,
    RandomIdGenerator, RandomTokenGenerator, TokenGenerator, UserService,
};

/// Primary index keyed by insertion sequence, plus the two lookup indexes.
///
/// All three maps are only ever mutated together under the store's write lock.
#[derive(Debug, Default)]
struct Indexes {
    next_seq: u64,
    records: BTreeMap<u64, Authorization>,
    by_id: HashMap<Id, u64>,
    by_token: HashMap<String, u64>,
}

impl Indexes {
    fn get_by_id(&self, id: &Id) -> Option<&Authorization> {
        self.by_id.get(id).and_then(|seq| self.records.get(seq))
    }

    fn get_by_token(&self, token: &str) -> Option<&Authorization> {
        self.by_token.get(token).and_then(|seq| self.records.get(seq))
    }

    fn insert(&mut self, auth: Authorization) -> AuthResult<()> {
        if self.by_id.contains_key(&auth.id) {
            return Err(AuthError::conflict(format!(
                "authorization id {} already exists",
                auth.id
            )));
        }
        if self.by_token.contains_key(&auth.token) {
            return Err(AuthError::conflict("authorization token already in use"));
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.by_id.insert(auth.id.clone(), seq);
        self.by_token.insert(auth.token.clone(), seq);
        self.records.insert(seq, auth);
        Ok(())
    }

    fn remove(&mut self, id: &Id) -> Option<Authorization> {
        let seq = self.by_id.remove(id)?;
        let auth = self.records.remove(&seq)?;
        self.by_token.remove(&auth.token);
        Some(auth)
    }
}

/// In-memory authorization store.
///
/// Every operation takes a single store-wide lock, so the by-id and by-token
/// indexes are always consistent with each other. Returned records are clones.
pub struct InMemoryAuthorizationStore {
    indexes: RwLock<Indexes>,
    users: Arc<dyn UserService>,
    ids: Arc<dyn IdGenerator>,
    tokens: Arc<dyn TokenGenerator>,
}

impl InMemoryAuthorizationStore {
    /// Store backed by the OS random generators.
    pub fn new(users: Arc<dyn UserService>) -> Self {
        Self {
            indexes: RwLock::new(Indexes::default()),
            users,
            ids: Arc::new(RandomIdGenerator),
            tokens: Arc::new(RandomTokenGenerator),
        }
    }

    pub fn with_generators(
        mut self,
        ids: Arc<dyn IdGenerator>,
        tokens: Arc<dyn TokenGenerator>,
    ) -> Self {
        self.ids = ids;
        self.tokens = tokens;
        self
    }

    /// Insert a fully-populated record as-is: no generation, no user check.
    pub fn put_authorization(&self, auth: Authorization) -> AuthResult<()> {
        if auth.token.is_empty() {
            return Err(AuthError::invalid_argument("seeded authorization needs a token"));
        }
        self.write()?.insert(auth)
    }

    pub fn len(&self) -> AuthResult<usize> {
        Ok(self.read()?.records.len())
    }

    pub fn is_empty(&self) -> AuthResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Synchronous listing used by the service impl.
    pub fn list(
        &self,
        filter: &AuthorizationFilter,
        options: &FindOptions,
    ) -> AuthResult<AuthorizationPage> {
        let ix = self.read()?;

        // Point lookups avoid scanning the primary index.
        let matched: Vec<Authorization> = if let Some(id) = &filter.id {
            ix.get_by_id(id).filter(|a| filter.matches(a)).cloned().into_iter().collect()
        } else if let Some(token) = &filter.token {
            ix.get_by_token(token).filter(|a| filter.matches(a)).cloned().into_iter().collect()
        } else {
            ix.records.values().filter(|a| filter.matches(a)).cloned().collect()
        };
        drop(ix);

        let total = matched.len();
        Ok(AuthorizationPage {
            items: options.apply(matched),
            total,
        })
    }

    fn read(&self) -> AuthResult<RwLockReadGuard<'_, Indexes>> {
        self.indexes
            .read()
            .map_err(|_| AuthError::internal("authorization store lock poisoned"))
    }

    fn write(&self) -> AuthResult<RwLockWriteGuard<'_, Indexes>> {
        self.indexes
            .write()
            .map_err(|_| AuthError::internal("authorization store lock poisoned"))
    }
}

impl core::fmt::Debug for InMemoryAuthorizationStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InMemoryAuthorizationStore")
            .field("len", &self.len().ok())
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl AuthorizationService for InMemoryAuthorizationStore {
    async fn create_authorization(&self, new: NewAuthorization) -> AuthResult<Authorization> {
        let Some(user_id) = new.user_id else {
            return Err(AuthError::invalid_argument("userID is required"));
        };
        if !self.users.user_exists(&user_id).await? {
            return Err(AuthError::invalid_argument(format!("user {user_id} does not exist")));
        }

        let id = new.id.unwrap_or_else(|| self.ids.new_id());
        let token = match new.token {
            Some(t) if !t.is_empty() => t,
            _ => self.tokens.new_token(),
        };

        let auth = Authorization {
            id,
            user_id,
            token,
            status: new.status,
            description: new.description,
        };
        self.write()?.insert(auth.clone())?;

        tracing::debug!(id = %auth.id, user_id = %auth.user_id, "authorization created");
        Ok(auth)
    }

    async fn find_authorization_by_id(&self, id: &Id) -> AuthResult<Authorization> {
        self.read()?
            .get_by_id(id)
            .cloned()
            .ok_or_else(|| AuthError::not_found("authorization not found"))
    }

    async fn find_authorization_by_token(&self, token: &str) -> AuthResult<Authorization> {
        self.read()?
            .get_by_token(token)
            .cloned()
            .ok_or_else(|| AuthError::not_found("authorization not found"))
    }

    async fn find_authorizations(
        &self,
        filter: &AuthorizationFilter,
        options: &FindOptions,
    ) -> AuthResult<AuthorizationPage> {
        self.list(filter, options)
    }

    async fn update_authorization(
        &self,
        id: &Id,
        update: AuthorizationUpdate,
    ) -> AuthResult<Authorization> {
        let mut ix = self.write()?;
        let seq = *ix
            .by_id
            .get(id)
            .ok_or_else(|| AuthError::not_found("authorization not found"))?;
        let auth = ix
            .records
            .get_mut(&seq)
            .ok_or_else(|| AuthError::internal("authorization index out of sync"))?;
        update.apply_to(auth);
        let updated = auth.clone();
        drop(ix);

        tracing::debug!(id = %updated.id, status = updated.status.as_str(), "authorization updated");
        Ok(updated)
    }

    async fn delete_authorization(&self, id: &Id) -> AuthResult<()> {
        self.write()?
            .remove(id)
            .ok_or_else(|| AuthError::not_found("authorization not found"))?;

        tracing::debug!(id = %id, "authorization deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use keyward_core::{SequentialIdGenerator, SequentialTokenGenerator, StaticTokenGenerator, Status};

    use super::*;
    use crate::InMemoryUserDirectory;

    fn user(n: u64) -> Id {
        Id::from(n)
    }

    fn store_with_users(users: &[u64]) -> InMemoryAuthorizationStore {
        let dir = InMemoryUserDirectory::new();
        for u in users {
            dir.insert(user(*u)).unwrap();
        }
        InMemoryAuthorizationStore::new(Arc::new(dir)).with_generators(
            Arc::new(SequentialIdGenerator::default()),
            Arc::new(SequentialTokenGenerator::new("tok-")),
        )
    }

    #[tokio::test]
    async fn create_fills_id_and_token() {
        let store = store_with_users(&[1]);

        let auth = store
            .create_authorization(NewAuthorization::for_user(user(1)))
            .await
            .unwrap();

        assert_eq!(auth.id, Id::from(1));
        assert_eq!(auth.token, "tok-1");
        assert_eq!(store.find_authorization_by_token("tok-1").await.unwrap(), auth);
    }

    #[tokio::test]
    async fn create_requires_an_existing_user() {
        let store = store_with_users(&[1]);

        let missing = store.create_authorization(NewAuthorization::default()).await;
        assert!(matches!(missing, Err(AuthError::InvalidArgument(_))));

        let unknown = store
            .create_authorization(NewAuthorization::for_user(user(2)))
            .await;
        assert!(matches!(unknown, Err(AuthError::InvalidArgument(_))));
        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn generated_token_collision_is_a_conflict() {
        let store = store_with_users(&[1]).with_generators(
            Arc::new(SequentialIdGenerator::default()),
            Arc::new(StaticTokenGenerator("same".into())),
        );

        store
            .create_authorization(NewAuthorization::for_user(user(1)))
            .await
            .unwrap();
        let second = store
            .create_authorization(NewAuthorization::for_user(user(1)))
            .await;

        assert!(matches!(second, Err(AuthError::Conflict(_))));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn returned_records_are_copies() {
        let store = store_with_users(&[1]);
        let auth = store
            .create_authorization(NewAuthorization::for_user(user(1)))
            .await
            .unwrap();

        let mut copy = store.find_authorization_by_id(&auth.id).await.unwrap();
        copy.token = "tampered".into();
        copy.status = Status::Inactive;

        assert_eq!(store.find_authorization_by_id(&auth.id).await.unwrap(), auth);
        assert!(store.find_authorization_by_token("tampered").await.is_err());
    }

    #[tokio::test]
    async fn delete_clears_both_indexes() {
        let store = store_with_users(&[1]);
        let auth = store
            .create_authorization(NewAuthorization::for_user(user(1)))
            .await
            .unwrap();

        store.delete_authorization(&auth.id).await.unwrap();

        assert!(matches!(
            store.find_authorization_by_id(&auth.id).await,
            Err(AuthError::NotFound(_))
        ));
        assert!(matches!(
            store.find_authorization_by_token(&auth.token).await,
            Err(AuthError::NotFound(_))
        ));

        // The token is free again.
        store
            .create_authorization(NewAuthorization::for_user(user(1)).with_token(auth.token.clone()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_keeps_identity() {
        let store = store_with_users(&[1]);
        let auth = store
            .create_authorization(NewAuthorization::for_user(user(1)))
            .await
            .unwrap();

        let updated = store
            .update_authorization(
                &auth.id,
                AuthorizationUpdate {
                    status: Some(Status::Inactive),
                    description: Some("ci runner".into()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, auth.id);
        assert_eq!(updated.user_id, auth.user_id);
        assert_eq!(updated.token, auth.token);
        assert_eq!(updated.status, Status::Inactive);
        assert_eq!(store.find_authorization_by_id(&auth.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn point_filters_combine_with_other_fields() {
        let store = store_with_users(&[1, 2]);
        let a = store
            .create_authorization(NewAuthorization::for_user(user(1)))
            .await
            .unwrap();

        let hit = AuthorizationFilter {
            id: Some(a.id.clone()),
            user_id: Some(user(1)),
            token: None,
        };
        let miss = AuthorizationFilter {
            token: Some(a.token.clone()),
            user_id: Some(user(2)),
            id: None,
        };

        assert_eq!(store.list(&hit, &FindOptions::default()).unwrap().total, 1);
        assert_eq!(store.list(&miss, &FindOptions::default()).unwrap().total, 0);
    }

    #[test]
    fn put_rejects_duplicates() {
        let store = store_with_users(&[]);
        let auth = Authorization {
            id: Id::from(9),
            user_id: user(1),
            token: "seed".into(),
            status: Status::Active,
            description: None,
        };
        store.put_authorization(auth.clone()).unwrap();

        let same_token = Authorization {
            id: Id::from(10),
            ..auth.clone()
        };
        assert!(matches!(
            store.put_authorization(same_token),
            Err(AuthError::Conflict(_))
        ));
        assert!(matches!(store.put_authorization(auth), Err(AuthError::Conflict(_))));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn concurrent_creates_keep_indexes_consistent() {
        let store = Arc::new(
            InMemoryAuthorizationStore::new(Arc::new(InMemoryUserDirectory::with_users([user(1)]))),
        );

        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .create_authorization(NewAuthorization::for_user(user(1)))
                    .await
                    .unwrap()
            }));
        }
        let mut created = Vec::new();
        for h in handles {
            created.push(h.await.unwrap());
        }

        assert_eq!(store.len().unwrap(), 32);
        for auth in created {
            assert_eq!(store.find_authorization_by_token(&auth.token).await.unwrap().id, auth.id);
        }
    }

    #[tokio::test]
    async fn poisoned_lock_is_an_internal_error() {
        let store = store_with_users(&[1]);
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = store.indexes.write().unwrap();
            panic!("poison the index lock");
        }));

        assert!(matches!(store.len(), Err(AuthError::Internal(_))));
        assert!(matches!(store.is_empty(), Err(AuthError::Internal(_))));
        assert!(matches!(
            store.create_authorization(NewAuthorization::for_user(user(1))).await,
            Err(AuthError::Internal(_))
        ));
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn user_filter_preserves_insertion_order(owners in proptest::collection::vec(0u64..4, 0..40), wanted in 0u64..4) {
                let store = store_with_users(&[]);
                for (i, owner) in owners.iter().enumerate() {
                    store.put_authorization(Authorization {
                        id: Id::from(i as u64),
                        user_id: user(*owner),
                        token: format!("t{i}"),
                        status: Status::Unset,
                        description: None,
                    }).unwrap();
                }

                let page = store
                    .list(&AuthorizationFilter::by_user(user(wanted)), &FindOptions::default())
                    .unwrap();

                let expected: Vec<Id> = owners
                    .iter()
                    .enumerate()
                    .filter(|(_, o)| **o == wanted)
                    .map(|(i, _)| Id::from(i as u64))
                    .collect();
                let got: Vec<Id> = page.items.iter().map(|a| a.id.clone()).collect();
                prop_assert_eq!(page.total, expected.len());
                prop_assert_eq!(got, expected);
            }

            #[test]
            fn pagination_happens_after_filtering(count in 0usize..30, offset in 0usize..35, limit in 0usize..10) {
                let store = store_with_users(&[]);
                for i in 0..count {
                    let owner = if i % 2 == 0 { 1 } else { 2 };
                    store.put_authorization(Authorization {
                        id: Id::from(i as u64),
                        user_id: user(owner),
                        token: format!("t{i}"),
                        status: Status::Unset,
                        description: None,
                    }).unwrap();
                }

                let filter = AuthorizationFilter::by_user(user(1));
                let all = store.list(&filter, &FindOptions::default()).unwrap();
                let page = store.list(&filter, &FindOptions::page(offset, limit)).unwrap();

                prop_assert_eq!(page.total, all.total);
                let expected: Vec<_> = all.items.into_iter().skip(offset).take(limit).collect();
                prop_assert_eq!(page.items, expected);
            }
        }
    }
}
