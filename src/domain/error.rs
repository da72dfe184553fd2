use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("Please enter a YouTube URL")]
    EmptyUrl,

    #[error("Please enter a YouTube URL and select a format")]
    UrlAndFormatRequired,

    #[error("A download is already in progress")]
    DownloadInProgress,

    #[error("{0}")]
    Extractor(String),
}
