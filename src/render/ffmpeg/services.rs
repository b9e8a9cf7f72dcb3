use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::sync::Notify;

use super::progress::{ProgressInfo, ProgressSource, StderrTimeProgress};

/// Characters of stderr kept for error reports.
pub const STDERR_TAIL_CHARS: usize = 500;

/// Upper bound on buffered stderr while a render runs.
const STDERR_BUFFER_BYTES: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Failed to start FFmpeg: {0}")]
    Spawn(#[source] io::Error),

    #[error("FFmpeg exited with code {}: {stderr_tail}", exit_code_label(.code))]
    Exited {
        code: Option<i32>,
        stderr_tail: String,
    },

    #[error("render was cancelled")]
    Cancelled,

    #[error("render timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error("I/O error while running FFmpeg: {0}")]
    Io(#[from] io::Error),
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cloneable handle that stops a running render when triggered.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    state: Arc<CancelState>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
        self.state.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.state.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

#[derive(Default)]
pub struct RunOptions {
    /// Expected output duration, used for percentages.
    pub total_duration: f64,
    pub timeout: Option<Duration>,
    pub cancel: Option<CancellationToken>,
    /// Echo processor output to our stderr.
    pub verbose: bool,
    /// Overrides the default `time=` scraper.
    pub progress: Option<Box<dyn ProgressSource>>,
}

impl RunOptions {
    pub fn new(total_duration: f64) -> Self {
        Self {
            total_duration,
            ..Self::default()
        }
    }

    pub fn with_progress(mut self, source: impl ProgressSource + 'static) -> Self {
        self.progress = Some(Box::new(source));
        self
    }
}

impl fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunOptions")
            .field("total_duration", &self.total_duration)
            .field("timeout", &self.timeout)
            .field("cancel", &self.cancel)
            .field("verbose", &self.verbose)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

/// Executes a compiled ffmpeg argument vector.
#[async_trait]
pub trait FfmpegRunner: Send + Sync {
    async fn run(
        &self,
        args: &[String],
        options: RunOptions,
        on_progress: &mut (dyn FnMut(ProgressInfo) + Send),
    ) -> Result<(), RunError>;
}

#[derive(Debug, Clone)]
pub struct SystemFfmpegRunner {
    binary: PathBuf,
}

impl Default for SystemFfmpegRunner {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl SystemFfmpegRunner {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &PathBuf {
        &self.binary
    }
}

#[async_trait]
impl FfmpegRunner for SystemFfmpegRunner {
    async fn run(
        &self,
        args: &[String],
        mut options: RunOptions,
        on_progress: &mut (dyn FnMut(ProgressInfo) + Send),
    ) -> Result<(), RunError> {
        let mut child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(RunError::Spawn)?;

        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("ffmpeg stderr was not captured"))?;

        let mut source: Box<dyn ProgressSource> = match options.progress.take() {
            Some(source) => source,
            None => Box::new(StderrTimeProgress::new(options.total_duration)),
        };
        let cancel = options.cancel.clone().unwrap_or_default();
        let timeout = options.timeout;
        let deadline = async move {
            match timeout {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);

        let mut captured = String::new();
        let mut buffer = [0u8; 4096];
        let mut stderr_open = true;

        // stderr closing does not mean the process is done; the exit wait
        // stays under the same cancel and timeout
        let outcome = loop {
            tokio::select! {
                read = stderr.read(&mut buffer), if stderr_open => {
                    let bytes_read = match read {
                        Ok(n) => n,
                        Err(err) => break Err(RunError::Io(err)),
                    };
                    if bytes_read == 0 {
                        stderr_open = false;
                        continue;
                    }

                    let chunk = String::from_utf8_lossy(&buffer[..bytes_read]);
                    if options.verbose {
                        eprint!("{chunk}");
                    }
                    captured.push_str(&chunk);
                    trim_front(&mut captured, STDERR_BUFFER_BYTES);

                    if let Some(info) = source.observe(&chunk) {
                        on_progress(info);
                    }
                }
                status = child.wait(), if !stderr_open => break status.map_err(RunError::Io),
                _ = cancel.cancelled() => break Err(RunError::Cancelled),
                _ = &mut deadline => break Err(RunError::TimedOut(timeout.unwrap_or_default())),
            }
        };

        let status = match outcome {
            Ok(status) => status,
            Err(err) => {
                let _ = child.kill().await;
                return Err(err);
            }
        };
        if !status.success() {
            return Err(RunError::Exited {
                code: status.code(),
                stderr_tail: tail_chars(&captured, STDERR_TAIL_CHARS),
            });
        }

        on_progress(source.finished());
        Ok(())
    }
}

/// Drop leading bytes so `text` stays under `limit`, on a char boundary.
fn trim_front(text: &mut String, limit: usize) {
    if text.len() <= limit {
        return;
    }
    let mut cut = text.len() - limit;
    while !text.is_char_boundary(cut) {
        cut += 1;
    }
    text.drain(..cut);
}

pub fn tail_chars(text: &str, count: usize) -> String {
    let total = text.chars().count();
    text.chars().skip(total.saturating_sub(count)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_keeps_last_characters() {
        assert_eq!(tail_chars("abcdef", 3), "def");
        assert_eq!(tail_chars("ab", 3), "ab");
        assert_eq!(tail_chars("ééé", 2), "éé");
    }

    #[test]
    fn trim_front_respects_char_boundaries() {
        let mut text = "aéb".to_string();
        trim_front(&mut text, 2);
        assert_eq!(text, "b");
    }

    #[test]
    fn exit_error_message() {
        let err = RunError::Exited {
            code: Some(1),
            stderr_tail: "No such file".into(),
        };
        assert_eq!(err.to_string(), "FFmpeg exited with code 1: No such file");
    }

    #[tokio::test]
    async fn cancellation_token_resolves_after_cancel() {
        let token = CancellationToken::new();
        let waiter = token.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });
        token.cancel();
        handle.await.unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let runner = SystemFfmpegRunner::new("/nonexistent/reelkit-ffmpeg");
        let mut events = Vec::new();
        let err = runner
            .run(&[], RunOptions::new(1.0), &mut |info| events.push(info))
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::Spawn(_)));
        assert!(err.to_string().starts_with("Failed to start FFmpeg"));
        assert!(events.is_empty());
    }

    #[cfg(unix)]
    mod fake_processor {
        use std::os::unix::fs::PermissionsExt;
        use std::path::Path;

        use tempfile::TempDir;

        use super::*;
        use crate::render::ffmpeg::progress::ProgressStage;

        fn write_script(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("fake-ffmpeg");
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            let mut perms = std::fs::metadata(&path).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&path, perms).unwrap();
            path
        }

        #[tokio::test]
        async fn reports_progress_then_completion() {
            let dir = TempDir::new().unwrap();
            let script = write_script(
                dir.path(),
                "echo 'frame=1 time=00:00:02.00 speed=1x' >&2\nsleep 0.1\necho 'frame=2 time=00:00:04.00 speed=1x' >&2\nexit 0",
            );
            let runner = SystemFfmpegRunner::new(script);
            let mut events = Vec::new();
            runner
                .run(&[], RunOptions::new(8.0), &mut |info| events.push(info))
                .await
                .unwrap();

            let percents: Vec<u8> = events.iter().map(|e| e.percent).collect();
            assert!(percents.contains(&25) || percents.contains(&50));
            let last = events.last().unwrap();
            assert_eq!(last.stage, ProgressStage::Finalizing);
            assert_eq!(last.percent, 100);
            assert!(events[..events.len() - 1].iter().all(|e| e.percent <= 99));
        }

        /// Counts chunks instead of parsing them.
        struct ChunkCounter {
            chunks: u8,
        }

        impl ProgressSource for ChunkCounter {
            fn observe(&mut self, _chunk: &str) -> Option<ProgressInfo> {
                self.chunks += 1;
                Some(ProgressInfo {
                    stage: ProgressStage::Encoding,
                    percent: self.chunks,
                    eta: None,
                })
            }

            fn finished(&mut self) -> ProgressInfo {
                ProgressInfo {
                    stage: ProgressStage::Finalizing,
                    percent: 100,
                    eta: Some(0),
                }
            }
        }

        #[tokio::test]
        async fn custom_progress_source_replaces_the_scraper() {
            let dir = TempDir::new().unwrap();
            let script = write_script(dir.path(), "echo 'no markers here' >&2\nexit 0");
            let runner = SystemFfmpegRunner::new(script);
            let mut events = Vec::new();
            let options = RunOptions::new(8.0).with_progress(ChunkCounter { chunks: 0 });
            runner
                .run(&[], options, &mut |info| events.push(info))
                .await
                .unwrap();

            assert_eq!(events[0].stage, ProgressStage::Encoding);
            assert_eq!(events[0].percent, 1);
            assert_eq!(events.last().unwrap().eta, Some(0));
        }

        #[tokio::test]
        async fn timeout_covers_a_process_that_closed_stderr() {
            let dir = TempDir::new().unwrap();
            let script = write_script(dir.path(), "exec 2>&-\nsleep 5");
            let runner = SystemFfmpegRunner::new(script);
            let options = RunOptions {
                timeout: Some(Duration::from_millis(200)),
                ..RunOptions::new(5.0)
            };
            let started = std::time::Instant::now();
            let err = runner.run(&[], options, &mut |_| {}).await.unwrap_err();
            assert!(matches!(err, RunError::TimedOut(_)));
            assert!(started.elapsed() < Duration::from_secs(4));
        }

        #[tokio::test]
        async fn failure_carries_stderr_tail() {
            let dir = TempDir::new().unwrap();
            let script = write_script(dir.path(), "echo 'clip.mp4: No such file or directory' >&2\nexit 3");
            let runner = SystemFfmpegRunner::new(script);
            let err = runner
                .run(&[], RunOptions::new(5.0), &mut |_| {})
                .await
                .unwrap_err();
            match err {
                RunError::Exited { code, stderr_tail } => {
                    assert_eq!(code, Some(3));
                    assert!(stderr_tail.contains("No such file or directory"));
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn timeout_kills_the_process() {
            let dir = TempDir::new().unwrap();
            let script = write_script(dir.path(), "sleep 5");
            let runner = SystemFfmpegRunner::new(script);
            let options = RunOptions {
                timeout: Some(Duration::from_millis(100)),
                ..RunOptions::new(5.0)
            };
            let err = runner.run(&[], options, &mut |_| {}).await.unwrap_err();
            assert!(matches!(err, RunError::TimedOut(_)));
        }

        #[tokio::test]
        async fn cancellation_stops_the_process() {
            let dir = TempDir::new().unwrap();
            let script = write_script(dir.path(), "sleep 5");
            let runner = SystemFfmpegRunner::new(script);
            let token = CancellationToken::new();
            let options = RunOptions {
                cancel: Some(token.clone()),
                ..RunOptions::new(5.0)
            };
            let trigger = tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                token.cancel();
            });
            let err = runner.run(&[], options, &mut |_| {}).await.unwrap_err();
            trigger.await.unwrap();
            assert!(matches!(err, RunError::Cancelled));
        }
    }
}
