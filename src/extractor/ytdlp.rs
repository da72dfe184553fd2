use std::process::Stdio;

use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::models::{ExtractorConfig, FormatDescriptor, HookStatus, ProgressHook, VideoInfo};
use super::{ExtractError, MediaExtractor, Result};

/// Every progress line we ask yt-dlp for starts with this marker.
const PROGRESS_MARKER: &str = "cheeze-progress";

const PROGRESS_TEMPLATE: &str = "download:cheeze-progress %(progress.status)s \
     %(progress.downloaded_bytes)s %(progress.total_bytes)s %(progress.total_bytes_estimate)s";

/// Drives the `yt-dlp` executable.
#[derive(Debug, Clone)]
pub struct YtDlp {
    config: ExtractorConfig,
}

impl YtDlp {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    fn program(&self) -> String {
        self.config.program.display().to_string()
    }

    fn command(&self, args: Vec<String>) -> Command {
        let mut command = Command::new(&self.config.program);
        command
            .args(&self.config.base_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    pub fn format_args(url: &str) -> Vec<String> {
        vec![
            "--dump-single-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--".to_string(),
            url.to_string(),
        ]
    }

    pub fn download_args(&self, url: &str, format_id: &str) -> Vec<String> {
        let mut args = vec![
            "--format".to_string(),
            format_id.to_string(),
            "--no-playlist".to_string(),
            "--newline".to_string(),
            "--progress".to_string(),
            "--progress-template".to_string(),
            PROGRESS_TEMPLATE.to_string(),
        ];
        if let Some(dir) = &self.config.output_dir {
            args.push("--paths".to_string());
            args.push(dir.display().to_string());
        }
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }
}

impl MediaExtractor for YtDlp {
    fn extract_formats(&self, url: &str) -> BoxFuture<'static, Result<Vec<FormatDescriptor>>> {
        let command = self.command(Self::format_args(url));
        let program = self.program();
        Box::pin(dump_formats(command, program))
    }

    fn download(&self, url: &str, format_id: &str) -> BoxStream<'static, Result<ProgressHook>> {
        let command = self.command(self.download_args(url, format_id));
        download_stream(command, self.program())
    }
}

async fn dump_formats(mut command: Command, program: String) -> Result<Vec<FormatDescriptor>> {
    let output = command.output().await.map_err(|e| ExtractError::Spawn {
        program,
        reason: e.to_string(),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = service_error(&stderr)
            .unwrap_or_else(|| format!("yt-dlp exited with {}", output.status));
        warn!("format listing failed: {}", message);
        return Err(ExtractError::Service(message));
    }

    let info: VideoInfo = serde_json::from_slice(&output.stdout)
        .map_err(|e| ExtractError::InvalidResponse(format!("JSON decode error: {}", e)))?;

    info!("{} formats found for '{}'", info.formats.len(), info.title);
    Ok(info.formats)
}

/// Internal state for the download stream
enum DownloadState {
    Start {
        command: Command,
        program: String,
    },
    Running {
        child: Child,
        stdout: BufReader<ChildStdout>,
        stderr: JoinHandle<String>,
        saw_finished: bool,
    },
    Finished,
}

fn download_stream(command: Command, program: String) -> BoxStream<'static, Result<ProgressHook>> {
    futures::stream::unfold(
        DownloadState::Start { command, program },
        |mut state| async move {
            loop {
                state = match state {
                    DownloadState::Start {
                        mut command,
                        program,
                    } => {
                        let mut child = match command.spawn() {
                            Ok(child) => child,
                            Err(e) => {
                                return Some((
                                    Err(ExtractError::Spawn {
                                        program,
                                        reason: e.to_string(),
                                    }),
                                    DownloadState::Finished,
                                ));
                            }
                        };

                        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take())
                        else {
                            return Some((
                                Err(ExtractError::Io(format!("{} has no output pipes", program))),
                                DownloadState::Finished,
                            ));
                        };

                        DownloadState::Running {
                            child,
                            stdout: BufReader::new(stdout),
                            stderr: tokio::spawn(collect_stderr(stderr)),
                            saw_finished: false,
                        }
                    }
                    DownloadState::Running {
                        child,
                        mut stdout,
                        stderr,
                        saw_finished,
                    } => match read_lossy_line(&mut stdout).await {
                        Ok(Some(line)) => match parse_progress_line(&line) {
                            Some(hook) => {
                                let saw_finished =
                                    saw_finished || hook.status == HookStatus::Finished;
                                return Some((
                                    Ok(hook),
                                    DownloadState::Running {
                                        child,
                                        stdout,
                                        stderr,
                                        saw_finished,
                                    },
                                ));
                            }
                            None => {
                                debug!("yt-dlp: {}", line);
                                DownloadState::Running {
                                    child,
                                    stdout,
                                    stderr,
                                    saw_finished,
                                }
                            }
                        },
                        Ok(None) => {
                            return match wait_for_exit(child, stderr).await {
                                Ok(()) if saw_finished => None,
                                // yt-dlp skips the progress template when the file is already on disk
                                Ok(()) => Some((Ok(finished_hook()), DownloadState::Finished)),
                                Err(e) => Some((Err(e), DownloadState::Finished)),
                            };
                        }
                        Err(e) => {
                            return Some((
                                Err(ExtractError::Io(format!("Failed to read yt-dlp output: {}", e))),
                                DownloadState::Finished,
                            ));
                        }
                    },
                    DownloadState::Finished => return None,
                };
            }
        },
    )
    .boxed()
}

fn finished_hook() -> ProgressHook {
    ProgressHook {
        status: HookStatus::Finished,
        downloaded_bytes: None,
        total_bytes: None,
        total_bytes_estimate: None,
    }
}

/// Next output line, with bytes that are not UTF-8 replaced. `None` at end of output.
async fn read_lossy_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<Option<String>> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf).await? == 0 {
        return Ok(None);
    }
    while matches!(buf.last(), Some(b'\n' | b'\r')) {
        buf.pop();
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

async fn collect_stderr(stderr: ChildStderr) -> String {
    let mut buf = String::new();
    let mut reader = BufReader::new(stderr);
    while let Ok(Some(line)) = read_lossy_line(&mut reader).await {
        buf.push_str(&line);
        buf.push('\n');
    }
    buf
}

async fn wait_for_exit(mut child: Child, stderr: JoinHandle<String>) -> Result<()> {
    let status = child
        .wait()
        .await
        .map_err(|e| ExtractError::Io(format!("yt-dlp process failed: {}", e)))?;
    let stderr = stderr.await.unwrap_or_default();

    if status.success() {
        return Ok(());
    }

    let message =
        service_error(&stderr).unwrap_or_else(|| format!("yt-dlp exited with {}", status));
    warn!("download failed: {}", message);
    Err(ExtractError::Service(message))
}

/// Picks the line worth showing to the user out of yt-dlp's stderr.
pub fn service_error(stderr: &str) -> Option<String> {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    lines
        .iter()
        .rev()
        .find(|line| line.starts_with("ERROR:"))
        .or_else(|| lines.last())
        .map(|line| line.to_string())
}

/// Parses a line printed through our progress template.
pub fn parse_progress_line(line: &str) -> Option<ProgressHook> {
    let mut fields = line.trim().strip_prefix(PROGRESS_MARKER)?.split_whitespace();

    let status = HookStatus::parse(fields.next()?)?;
    let downloaded_bytes = parse_byte_count(fields.next()?);
    let total_bytes = parse_byte_count(fields.next()?);
    let total_bytes_estimate = parse_byte_count(fields.next()?);

    Some(ProgressHook {
        status,
        downloaded_bytes,
        total_bytes,
        total_bytes_estimate,
    })
}

/// `NA` means missing; estimates come through as floats.
fn parse_byte_count(field: &str) -> Option<u64> {
    field.parse::<u64>().ok().or_else(|| {
        field
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value >= 0.0)
            .map(|value| value as u64)
    })
}
