//! Authentication layer
//!
//! - [`credentials`]: where the bearer token lives between runs
//! - [`guard`]: bearer attachment and 401 handling, composed by HTTP services
//! - [`client`]: login/registration exchanges

pub mod client;
pub mod credentials;
pub mod guard;

pub use client::AuthClient;
pub use credentials::{
    CredentialStore, Credentials, FileCredentialStore, MemoryCredentialStore, UserProfile,
};
pub use guard::{AuthEvent, AuthGuard, LOGIN_ROUTE};
