pub mod import;
pub mod processing;
pub mod submission;

pub use import::{ImportService, ImportSummary};
pub use processing::RecomputeService;
pub use submission::SubmissionService;
