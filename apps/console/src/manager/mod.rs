//! Applications manager: local view state over the backend's application records.

pub mod dashboard;
pub mod filter;
pub mod notifications;
pub mod pagination;
pub mod service;
pub mod state;

pub use filter::StatusFilter;
pub use service::ApplicationsService;
pub use state::{ApplicationsManager, ViewMode};
