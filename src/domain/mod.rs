pub mod history;
pub mod types;

pub use history::{History, HistoryEntry, HISTORY_LIMIT};
pub use types::{ClassificationResult, ConfidenceTier, Submission, Upload};
