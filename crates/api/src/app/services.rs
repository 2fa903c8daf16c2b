use std::sync::Arc;

use keyward_core::{AuthorizationService, Id};
use keyward_infra::{InMemoryAuthorizationStore, InMemoryUserDirectory};

use crate::app::dto::LinkBuilder;

/// Everything the route handlers need, shared via an `Extension`.
#[derive(Clone)]
pub struct AppServices {
    pub authorizations: Arc<dyn AuthorizationService>,
    pub links: LinkBuilder,
}

impl AppServices {
    pub fn new(authorizations: Arc<dyn AuthorizationService>, links: LinkBuilder) -> Self {
        Self {
            authorizations,
            links,
        }
    }
}

/// Wire an in-memory store behind a user directory seeded with `users`.
pub fn in_memory(users: impl IntoIterator<Item = Id>, links: LinkBuilder) -> AppServices {
    let directory = Arc::new(InMemoryUserDirectory::with_users(users));
    let store = Arc::new(InMemoryAuthorizationStore::new(directory));
    AppServices::new(store, links)
}
