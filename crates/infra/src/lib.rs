//! Infrastructure layer: storage backends and stand-ins for external services.

pub mod authorization_store;
pub mod user_directory;

pub use authorization_store::InMemoryAuthorizationStore;
pub use user_directory::InMemoryUserDirectory;
