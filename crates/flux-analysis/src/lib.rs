//! Core analysis for the flux language service.
//!
//! This crate owns the moving parts between the front-end (lexer, parser,
//! type model) and the provider layer:
//!
//! - [`host::ProgramHost`] -- incremental program host with overlay files,
//!   watch hooks, and settle-then-notify change subscriptions
//! - [`models::ModelService`] -- model discovery and the action catalog
//! - [`node_path`] / [`dispatch`] -- cursor-to-node location and
//!   dispatch-call detection
//! - [`matcher`] -- the structural type matcher
//! - [`validate`] -- the dispatch validator producing diagnostics
//!
//! Everything is explicitly constructed: components receive their
//! collaborators as arguments, and shared state is exposed only through
//! read-only `Arc` snapshots.

pub mod cancel;
pub mod config;
pub mod dispatch;
pub mod host;
pub mod matcher;
pub mod models;
pub mod node_path;
pub mod overlay;
pub mod validate;
pub mod vfs;
pub mod watcher;

pub use cancel::CancelToken;
pub use config::WorkspaceConfig;
pub use host::{FileChangeEvent, Program, ProgramHost, SourceUnit};
pub use matcher::StructuralDiagnostic;
pub use models::{ActionSchema, ModelInfo, ModelService};
