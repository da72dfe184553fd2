use crate::extractor::{HookStatus, ProgressHook};

/// What the gauge should do after one progress hook.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressUpdate {
    /// Completion percentage, always within `0.0..=100.0`.
    Percent(f32),
    /// Bytes are flowing but the total size is unknown.
    Indeterminate,
}

/// Converts raw byte counts into gauge updates for a single download.
///
/// Percentages never go backwards within one tracker, so a shrinking size
/// estimate cannot make the gauge jump back.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    highest: f32,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, hook: &ProgressHook) -> Option<ProgressUpdate> {
        match hook.status {
            HookStatus::Finished => {
                self.highest = 100.0;
                Some(ProgressUpdate::Percent(100.0))
            }
            HookStatus::Downloading => {
                let downloaded = hook.downloaded_bytes?;
                match hook.total() {
                    Some(total) => {
                        let percent = percentage(downloaded, total).max(self.highest);
                        self.highest = percent;
                        Some(ProgressUpdate::Percent(percent))
                    }
                    None => Some(ProgressUpdate::Indeterminate),
                }
            }
            HookStatus::Error => None,
        }
    }
}

/// `downloaded / total * 100`, clamped to the gauge range.
pub fn percentage(downloaded: u64, total: u64) -> f32 {
    if total == 0 {
        return 0.0;
    }
    let percent = downloaded as f64 / total as f64 * 100.0;
    percent.clamp(0.0, 100.0) as f32
}
