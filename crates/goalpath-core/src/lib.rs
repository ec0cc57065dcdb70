//! GoalPath Core - goal model and remote-synchronized goal store
//!
//! GoalPath helps learners turn a goal ("Learn Rust", "Run a half marathon")
//! into a week-by-week plan of milestones and track progress against it.
//! This crate holds everything except the tutor chat:
//!
//! 1. **Goal model** (`goal`, `timeline`): goals, milestones, drafts and the
//!    default five-phase timeline
//! 2. **Auth layer** (`auth`): bearer credentials, 401 handling, login
//! 3. **Goal service** (`service`): the remote HTTP/JSON API behind a trait
//! 4. **Goal store** (`store`): the in-memory cache, mutated only after the
//!    service confirms a change
//!
//! # Quick Start
//!
//! ```no_run
//! use goalpath_core::{
//!     AuthGuard, ClientConfig, Complexity, GoalDraft, GoalStore, HttpGoalService,
//!     MemoryCredentialStore,
//! };
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new().with_env()?;
//! let guard = AuthGuard::new(Arc::new(MemoryCredentialStore::new()));
//! let service = HttpGoalService::new(config.http_client()?, config.api_url.clone(), guard);
//!
//! let store = GoalStore::new(Arc::new(service));
//! store.load().await?;
//!
//! let draft = GoalDraft::builder()
//!     .title("Learn Go")
//!     .category("Education & Learning")
//!     .complexity(Complexity::Beginner)
//!     .build()?;
//! let goal = store.create(draft).await?;
//! println!("{}: {} milestones", goal.title, goal.milestones.len());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(rust_2018_idioms, missing_debug_implementations, clippy::all)]

pub mod auth;
pub mod checkin;
pub mod config;
pub mod error;
pub mod goal;
pub mod progress;
pub mod service;
pub mod store;
pub mod timeline;
pub mod types;

// Re-export commonly used types for convenience
pub use auth::{
    AuthClient, AuthEvent, AuthGuard, CredentialStore, Credentials, FileCredentialStore,
    MemoryCredentialStore, UserProfile,
};
pub use checkin::{CheckIn, Confidence};
pub use config::ClientConfig;
pub use error::{AuthError, ConfigError, GoalError, Result};
pub use goal::{Goal, GoalDraft, GoalId, GoalPatch, Milestone, TimelineKind};
pub use progress::{DashboardSummary, GoalProgress, MilestoneCounts};
pub use service::{GoalService, HttpGoalService};
pub use store::GoalStore;
pub use timeline::{generate_ai_milestones, suggest_duration, Category};
pub use types::{Complexity, ProgressStatus, Timestamp};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
