//! Closure-backed [`AuthorizationService`] for handler tests.

use keyward_core::{
    AuthError, AuthResult, Authorization, AuthorizationFilter, AuthorizationPage,
    AuthorizationService, AuthorizationUpdate, FindOptions, Id, NewAuthorization,
};

type Handler<A, R> = Box<dyn Fn(A) -> AuthResult<R> + Send + Sync>;

/// Every operation defaults to an `Internal` error until its closure is set.
pub struct MockAuthorizationService {
    pub create_fn: Handler<NewAuthorization, Authorization>,
    pub find_by_id_fn: Handler<Id, Authorization>,
    pub find_many_fn: Handler<(AuthorizationFilter, FindOptions), AuthorizationPage>,
    pub update_fn: Handler<(Id, AuthorizationUpdate), Authorization>,
    pub delete_fn: Handler<Id, ()>,
}

fn unimplemented_op<A, R>(op: &'static str) -> Handler<A, R> {
    Box::new(move |_| Err(AuthError::internal(format!("{op} not mocked"))))
}

impl Default for MockAuthorizationService {
    fn default() -> Self {
        Self {
            create_fn: unimplemented_op("create_authorization"),
            find_by_id_fn: unimplemented_op("find_authorization_by_id"),
            find_many_fn: unimplemented_op("find_authorizations"),
            update_fn: unimplemented_op("update_authorization"),
            delete_fn: unimplemented_op("delete_authorization"),
        }
    }
}

impl MockAuthorizationService {
    pub fn on_create(
        mut self,
        f: impl Fn(NewAuthorization) -> AuthResult<Authorization> + Send + Sync + 'static,
    ) -> Self {
        self.create_fn = Box::new(f);
        self
    }

    pub fn on_find_by_id(
        mut self,
        f: impl Fn(Id) -> AuthResult<Authorization> + Send + Sync + 'static,
    ) -> Self {
        self.find_by_id_fn = Box::new(f);
        self
    }

    pub fn on_find_many(
        mut self,
        f: impl Fn((AuthorizationFilter, FindOptions)) -> AuthResult<AuthorizationPage>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.find_many_fn = Box::new(f);
        self
    }

    pub fn on_update(
        mut self,
        f: impl Fn((Id, AuthorizationUpdate)) -> AuthResult<Authorization> + Send + Sync + 'static,
    ) -> Self {
        self.update_fn = Box::new(f);
        self
    }

    pub fn on_delete(mut self, f: impl Fn(Id) -> AuthResult<()> + Send + Sync + 'static) -> Self {
        self.delete_fn = Box::new(f);
        self
    }
}

#[async_trait::async_trait]
impl AuthorizationService for MockAuthorizationService {
    async fn create_authorization(&self, new: NewAuthorization) -> AuthResult<Authorization> {
        (self.create_fn)(new)
    }

    async fn find_authorization_by_id(&self, id: &Id) -> AuthResult<Authorization> {
        (self.find_by_id_fn)(id.clone())
    }

    // The HTTP surface resolves tokens through `find_authorizations`.
    async fn find_authorization_by_token(&self, _token: &str) -> AuthResult<Authorization> {
        Err(AuthError::internal("find_authorization_by_token not mocked"))
    }

    async fn find_authorizations(
        &self,
        filter: &AuthorizationFilter,
        options: &FindOptions,
    ) -> AuthResult<AuthorizationPage> {
        (self.find_many_fn)((filter.clone(), options.clone()))
    }

    async fn update_authorization(
        &self,
        id: &Id,
        update: AuthorizationUpdate,
    ) -> AuthResult<Authorization> {
        (self.update_fn)((id.clone(), update))
    }

    async fn delete_authorization(&self, id: &Id) -> AuthResult<()> {
        (self.delete_fn)(id.clone())
    }
}
