//! Questboard client library exports.
//!
//! Resources that keep dashboard state in sync with remote tables, plus the
//! HTTP service they read through.

pub mod api_client;
pub mod config;
pub mod error;
pub mod hooks;
pub mod resource;
pub mod state;
pub mod telemetry;

pub use hooks::{use_achievements, use_user_activity, use_users};
pub use resource::ResourceHook;
pub use state::{ResourceState, ResourceStatus, FALLBACK_ERROR_MESSAGE};
