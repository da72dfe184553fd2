use std::path::PathBuf;

use serde::Deserialize;

/// Output of `yt-dlp --dump-single-json`; only the parts the format table needs.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub formats: Vec<FormatDescriptor>,
}

/// One downloadable stream variant as reported by the extractor.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FormatDescriptor {
    #[serde(rename = "format_id", default)]
    pub id: String,
    pub ext: Option<String>,
    pub resolution: Option<String>,
    pub fps: Option<f64>,
    /// Total bitrate in KBit/s
    pub tbr: Option<f64>,
    pub protocol: Option<String>,
    pub vcodec: Option<String>,
    pub vbr: Option<f64>,
    pub acodec: Option<String>,
    pub abr: Option<f64>,
    pub asr: Option<f64>,
    #[serde(rename = "format_note")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStatus {
    Downloading,
    Finished,
    Error,
}

impl HookStatus {
    pub fn parse(status: &str) -> Option<Self> {
        match status {
            "downloading" => Some(HookStatus::Downloading),
            "finished" => Some(HookStatus::Finished),
            "error" => Some(HookStatus::Error),
            _ => None,
        }
    }
}

/// One progress callback from a running download.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressHook {
    pub status: HookStatus,
    pub downloaded_bytes: Option<u64>,
    pub total_bytes: Option<u64>,
    pub total_bytes_estimate: Option<u64>,
}

impl ProgressHook {
    /// Exact total when known, otherwise the estimate. Zero counts as unknown.
    pub fn total(&self) -> Option<u64> {
        self.total_bytes
            .filter(|total| *total > 0)
            .or(self.total_bytes_estimate.filter(|total| *total > 0))
    }
}

/// Configuration for the yt-dlp process
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub program: PathBuf,
    /// Arguments placed before any generated ones, e.g. `["-m", "yt_dlp"]` with `python3`.
    pub base_args: Vec<String>,
    /// Passed as `--paths`; `None` downloads into the working directory.
    pub output_dir: Option<PathBuf>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("yt-dlp"),
            base_args: Vec::new(),
            output_dir: None,
        }
    }
}
