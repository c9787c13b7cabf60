//! Questboard Storage - Remote Table Service
//!
//! Defines the read-only seam between resources and the backend holding the
//! dashboard tables. The HTTP implementation lives in questboard-client.

pub mod memory;
pub mod service;

pub use memory::InMemoryTableService;
pub use service::RemoteTableService;
