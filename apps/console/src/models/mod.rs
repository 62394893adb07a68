pub mod application;
pub mod envelope;

pub use application::{ApplicationDetail, ApplicationId, ApplicationStatus, JobApplication};
pub use envelope::Envelope;
