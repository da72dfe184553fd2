pub mod coordinator;
pub mod progress;

pub use coordinator::{Coordinator, DownloadEvent};
pub use progress::{ProgressTracker, ProgressUpdate};
