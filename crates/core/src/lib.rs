//! `keyward-core` — authorization records and the service contract around them.
//!
//! This crate has no HTTP or storage concerns; the store, the HTTP handler and
//! the HTTP client all build on the types defined here.

pub mod authorization;
pub mod error;
pub mod generator;
pub mod id;
pub mod query;
pub mod service;
pub mod wire;

pub use authorization::{Authorization, AuthorizationUpdate, NewAuthorization, Status};
pub use error::{AuthError, AuthResult, ErrorCode};
pub use generator::{
    IdGenerator, RandomIdGenerator, RandomTokenGenerator, SequentialIdGenerator,
    SequentialTokenGenerator, StaticTokenGenerator, TokenGenerator,
};
pub use id::Id;
pub use query::{AuthorizationFilter, FindOptions, ListQuery, QueryParam, SortKey};
pub use service::{AuthorizationPage, AuthorizationService, UserService};
