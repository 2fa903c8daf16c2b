//! Test support shared across the workspace: a mock service and the
//! behavioural suite every `AuthorizationService` implementation must pass.

pub mod conformance;
pub mod mock;

pub use conformance::{AuthorizationFields, Harness, Init};
pub use mock::MockAuthorizationService;
