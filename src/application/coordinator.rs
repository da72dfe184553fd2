use std::sync::Arc;

use futures::{stream::BoxStream, StreamExt};
use tracing::{error, info};

use crate::{
    application::{ProgressTracker, ProgressUpdate},
    domain::AppError,
    extractor::{self, FormatDescriptor, MediaExtractor, ProgressHook},
};

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    Progress(ProgressUpdate),
    Completed,
    Failed(AppError),
}

#[derive(Clone)]
pub struct Coordinator {
    extractor: Arc<dyn MediaExtractor>,
}

impl Coordinator {
    pub fn new(extractor: Arc<dyn MediaExtractor>) -> Self {
        Self { extractor }
    }

    pub async fn fetch_formats(&self, url: String) -> Result<Vec<FormatDescriptor>, AppError> {
        info!("Fetching formats for {}", url);
        self.extractor.extract_formats(&url).await.map_err(|e| {
            error!("Format fetch failed for {}: {}", url, e);
            AppError::from(e)
        })
    }

    /// Yields gauge updates followed by exactly one terminal event.
    pub fn download(&self, url: String, format_id: String) -> BoxStream<'static, DownloadEvent> {
        info!("Downloading format {} of {}", format_id, url);
        let hooks = self.extractor.download(&url, &format_id);

        futures::stream::unfold(
            DownloadRuntimeState::Running {
                hooks,
                tracker: ProgressTracker::new(),
            },
            |state| async move {
                match state {
                    DownloadRuntimeState::Running {
                        mut hooks,
                        mut tracker,
                    } => loop {
                        match hooks.next().await {
                            Some(Ok(hook)) => {
                                if let Some(update) = tracker.observe(&hook) {
                                    return Some((
                                        DownloadEvent::Progress(update),
                                        DownloadRuntimeState::Running { hooks, tracker },
                                    ));
                                }
                            }
                            Some(Err(e)) => {
                                error!("Download failed: {}", e);
                                return Some((
                                    DownloadEvent::Failed(e.into()),
                                    DownloadRuntimeState::Finished,
                                ));
                            }
                            None => {
                                info!("Download completed");
                                return Some((
                                    DownloadEvent::Completed,
                                    DownloadRuntimeState::Finished,
                                ));
                            }
                        }
                    },
                    DownloadRuntimeState::Finished => None,
                }
            },
        )
        .boxed()
    }
}

enum DownloadRuntimeState {
    Running {
        hooks: BoxStream<'static, extractor::Result<ProgressHook>>,
        tracker: ProgressTracker,
    },
    Finished,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{ExtractError, HookStatus};
    use futures::future::BoxFuture;
    use std::sync::Mutex;

    /// In-memory extractor with canned answers that records every call.
    #[derive(Default)]
    struct FakeExtractor {
        formats: Option<extractor::Result<Vec<FormatDescriptor>>>,
        hooks: Vec<extractor::Result<ProgressHook>>,
        calls: Mutex<Vec<String>>,
    }

    impl MediaExtractor for FakeExtractor {
        fn extract_formats(
            &self,
            url: &str,
        ) -> BoxFuture<'static, extractor::Result<Vec<FormatDescriptor>>> {
            self.calls.lock().unwrap().push(format!("formats {}", url));
            let result = self.formats.clone().unwrap_or(Ok(Vec::new()));
            Box::pin(async move { result })
        }

        fn download(
            &self,
            url: &str,
            format_id: &str,
        ) -> BoxStream<'static, extractor::Result<ProgressHook>> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("download {} {}", url, format_id));
            futures::stream::iter(self.hooks.clone()).boxed()
        }
    }

    fn hook(status: HookStatus, downloaded: u64, total: u64) -> ProgressHook {
        ProgressHook {
            status,
            downloaded_bytes: Some(downloaded),
            total_bytes: Some(total),
            total_bytes_estimate: None,
        }
    }

    #[tokio::test]
    async fn test_fetch_formats_passes_url_through() {
        let fake = Arc::new(FakeExtractor {
            formats: Some(Ok(vec![FormatDescriptor {
                id: "18".to_string(),
                ..Default::default()
            }])),
            ..Default::default()
        });
        let coordinator = Coordinator::new(fake.clone());

        let formats = coordinator
            .fetch_formats("https://example.com/watch?v=abc".to_string())
            .await
            .unwrap();

        assert_eq!(formats.len(), 1);
        assert_eq!(
            *fake.calls.lock().unwrap(),
            vec!["formats https://example.com/watch?v=abc".to_string()]
        );
    }

    #[tokio::test]
    async fn test_fetch_formats_keeps_message_verbatim() {
        let fake = Arc::new(FakeExtractor {
            formats: Some(Err(ExtractError::Service("Unsupported URL".to_string()))),
            ..Default::default()
        });
        let coordinator = Coordinator::new(fake);

        let err = coordinator.fetch_formats("x".to_string()).await.unwrap_err();
        assert_eq!(err, AppError::Extractor("Unsupported URL".to_string()));
        assert_eq!(err.to_string(), "Unsupported URL");
    }

    #[tokio::test]
    async fn test_download_progress_then_completed() {
        let fake = Arc::new(FakeExtractor {
            hooks: vec![
                Ok(hook(HookStatus::Downloading, 50, 200)),
                Ok(hook(HookStatus::Downloading, 200, 200)),
                Ok(hook(HookStatus::Finished, 200, 200)),
            ],
            ..Default::default()
        });
        let coordinator = Coordinator::new(fake.clone());

        let events: Vec<_> = coordinator
            .download("https://example.com/watch?v=abc".to_string(), "18".to_string())
            .collect()
            .await;

        assert_eq!(
            events,
            vec![
                DownloadEvent::Progress(ProgressUpdate::Percent(25.0)),
                DownloadEvent::Progress(ProgressUpdate::Percent(100.0)),
                DownloadEvent::Progress(ProgressUpdate::Percent(100.0)),
                DownloadEvent::Completed,
            ]
        );
        assert_eq!(
            *fake.calls.lock().unwrap(),
            vec!["download https://example.com/watch?v=abc 18".to_string()]
        );
    }

    #[tokio::test]
    async fn test_download_failure_is_single_terminal_event() {
        let fake = Arc::new(FakeExtractor {
            hooks: vec![
                Ok(hook(HookStatus::Downloading, 10, 100)),
                Err(ExtractError::Service("ERROR: HTTP Error 403".to_string())),
            ],
            ..Default::default()
        });
        let coordinator = Coordinator::new(fake);

        let events: Vec<_> = coordinator
            .download("x".to_string(), "18".to_string())
            .collect()
            .await;

        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1],
            DownloadEvent::Failed(AppError::Extractor("ERROR: HTTP Error 403".to_string()))
        );
        let terminal = events
            .iter()
            .filter(|e| !matches!(e, DownloadEvent::Progress(_)))
            .count();
        assert_eq!(terminal, 1);
    }

    #[tokio::test]
    async fn test_download_skips_malformed_hooks() {
        let fake = Arc::new(FakeExtractor {
            hooks: vec![
                Ok(ProgressHook {
                    status: HookStatus::Downloading,
                    downloaded_bytes: None,
                    total_bytes: Some(100),
                    total_bytes_estimate: None,
                }),
                Ok(hook(HookStatus::Downloading, 100, 400)),
            ],
            ..Default::default()
        });
        let coordinator = Coordinator::new(fake);

        let events: Vec<_> = coordinator
            .download("x".to_string(), "18".to_string())
            .collect()
            .await;

        assert_eq!(
            events,
            vec![
                DownloadEvent::Progress(ProgressUpdate::Percent(25.0)),
                DownloadEvent::Completed,
            ]
        );
    }
}
