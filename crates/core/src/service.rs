//! Service contracts.

use std::sync::Arc;

use crate::authorization::{Authorization, AuthorizationUpdate, NewAuthorization};
use crate::error::AuthResult;
use crate::id::Id;
use crate::query::{AuthorizationFilter, FindOptions};

/// One page of a listing plus the number of matches before pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationPage {
    pub items: Vec<Authorization>,
    pub total: usize,
}

/// CRUD contract for authorization records.
///
/// Implemented by the in-memory store and by the HTTP client. The two must be
/// observationally equivalent, including the [`crate::AuthError`] kind returned
/// for each failure.
///
/// ## Semantics
///
/// - `create_authorization`: `InvalidArgument` when `user_id` is missing or the
///   user does not exist; id and token are generated when absent; `Conflict`
///   when either collides with an existing record.
/// - `find_authorization_by_id` / `find_authorization_by_token`: `NotFound`
///   when absent. Results are owned copies.
/// - `find_authorizations`: filter first, then sort and paginate; `total` counts
///   all matches. Default order is insertion order.
/// - `update_authorization`: applies status/description only; `NotFound` when absent.
/// - `delete_authorization`: `NotFound` when absent.
#[async_trait::async_trait]
pub trait AuthorizationService: Send + Sync {
    async fn create_authorization(&self, new: NewAuthorization) -> AuthResult<Authorization>;

    async fn find_authorization_by_id(&self, id: &Id) -> AuthResult<Authorization>;

    async fn find_authorization_by_token(&self, token: &str) -> AuthResult<Authorization>;

    async fn find_authorizations(
        &self,
        filter: &AuthorizationFilter,
        options: &FindOptions,
    ) -> AuthResult<AuthorizationPage>;

    async fn update_authorization(
        &self,
        id: &Id,
        update: AuthorizationUpdate,
    ) -> AuthResult<Authorization>;

    async fn delete_authorization(&self, id: &Id) -> AuthResult<()>;
}

#[async_trait::async_trait]
impl<S> AuthorizationService for Arc<S>
where
    S: AuthorizationService + ?Sized,
{
    async fn create_authorization(&self, new: NewAuthorization) -> AuthResult<Authorization> {
        (**self).create_authorization(new).await
    }

    async fn find_authorization_by_id(&self, id: &Id) -> AuthResult<Authorization> {
        (**self).find_authorization_by_id(id).await
    }

    async fn find_authorization_by_token(&self, token: &str) -> AuthResult<Authorization> {
        (**self).find_authorization_by_token(token).await
    }

    async fn find_authorizations(
        &self,
        filter: &AuthorizationFilter,
        options: &FindOptions,
    ) -> AuthResult<AuthorizationPage> {
        (**self).find_authorizations(filter, options).await
    }

    async fn update_authorization(
        &self,
        id: &Id,
        update: AuthorizationUpdate,
    ) -> AuthResult<Authorization> {
        (**self).update_authorization(id, update).await
    }

    async fn delete_authorization(&self, id: &Id) -> AuthResult<()> {
        (**self).delete_authorization(id).await
    }
}

/// Lookup capability of the external user service.
#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Whether a user with this id exists. Errors are collaborator failures.
    async fn user_exists(&self, user_id: &Id) -> AuthResult<bool>;
}

#[async_trait::async_trait]
impl<S> UserService for Arc<S>
where
    S: UserService + ?Sized,
{
    async fn user_exists(&self, user_id: &Id) -> AuthResult<bool> {
        (**self).user_exists(user_id).await
    }
}
