//! `zip`-based archiver implementation.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

use super::config::ArchiverConfig;
use super::error::ArchiverError;
use super::traits::{ArchiveOutput, Archiver};

/// Archiver that runs `zip -r <name> ./` inside the directory.
pub struct ZipArchiver {
    config: ArchiverConfig,
}

impl ZipArchiver {
    /// Creates a new zip archiver with the given configuration.
    pub fn new(config: ArchiverConfig) -> Self {
        Self { config }
    }

    /// Creates an archiver with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ArchiverConfig::default())
    }

    /// Builds the arguments for archiving into `output_name`.
    fn build_args(&self, output_name: &str) -> Vec<String> {
        vec!["-r".to_string(), output_name.to_string(), "./".to_string()]
    }

    /// `PATH` for the child, with the configured search paths appended.
    fn search_path(&self) -> Option<OsString> {
        if self.config.search_paths.is_empty() {
            return None;
        }

        let current = std::env::var_os("PATH").unwrap_or_default();
        let paths = std::env::split_paths(&current).chain(self.config.search_paths.iter().cloned());

        match std::env::join_paths(paths) {
            Ok(joined) => Some(joined),
            Err(e) => {
                warn!("Ignoring archiver search paths: {}", e);
                None
            }
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.config.program);
        if let Some(path) = self.search_path() {
            command.env("PATH", path);
        }
        command
    }

    fn spawn_error(&self, e: std::io::Error) -> ArchiverError {
        if e.kind() == std::io::ErrorKind::NotFound {
            ArchiverError::ToolNotFound {
                program: self.config.program.clone(),
            }
        } else {
            ArchiverError::Io(e)
        }
    }
}

/// Forwards every line of a child stream to tracing and returns what was read.
///
/// Lines are decoded lossily; the stream is drained to the end so the child
/// never writes into a closed pipe.
async fn forward_lines<R>(stream: Option<R>, stream_name: &'static str) -> String
where
    R: AsyncRead + Unpin,
{
    let Some(stream) = stream else {
        return String::new();
    };

    let mut captured = String::new();
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']);
                debug!(stream = stream_name, "{}", line);
                captured.push_str(line);
                captured.push('\n');
            }
            Err(e) => {
                warn!(stream = stream_name, "Failed to read archiver output: {}", e);
                break;
            }
        }
    }
    captured
}

#[async_trait]
impl Archiver for ZipArchiver {
    fn name(&self) -> &str {
        "zip"
    }

    async fn archive(&self, dir: &Path, output_name: &str) -> Result<ArchiveOutput, ArchiverError> {
        let output_path = dir.join(output_name);
        info!(
            "Archiving {} into {}",
            dir.display(),
            output_path.display()
        );

        let mut child = self
            .command()
            .args(self.build_args(output_name))
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let result = timeout(timeout_duration, async {
            let (_, error_output) = tokio::join!(
                forward_lines(stdout, "stdout"),
                forward_lines(stderr, "stderr")
            );
            let status = child.wait().await?;
            Ok::<(std::process::ExitStatus, String), std::io::Error>((status, error_output))
        })
        .await;

        match result {
            Ok(Ok((status, error_output))) => {
                if !status.success() {
                    warn!(
                        "{} exited with code {:?}",
                        self.config.program.display(),
                        status.code()
                    );
                    return Err(ArchiverError::failed(status.code(), error_output));
                }
            }
            Ok(Err(e)) => return Err(ArchiverError::Io(e)),
            Err(_) => {
                // Kill the process on timeout
                let _ = child.kill().await;
                return Err(ArchiverError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        }

        if !tokio::fs::try_exists(&output_path).await.unwrap_or(false) {
            return Err(ArchiverError::OutputMissing { path: output_path });
        }

        Ok(ArchiveOutput { path: output_path })
    }

    async fn validate(&self) -> Result<(), ArchiverError> {
        self.command()
            .arg("-v")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_build_args() {
        let archiver = ZipArchiver::with_defaults();
        assert_eq!(archiver.build_args("archive.zip"), vec!["-r", "archive.zip", "./"]);
    }

    #[test]
    fn test_search_path_appends_directories() {
        let archiver = ZipArchiver::new(ArchiverConfig::default().with_search_path("/opt/task"));
        let path = archiver.search_path().unwrap();
        let last = std::env::split_paths(&path).last().unwrap();
        assert_eq!(last, Path::new("/opt/task"));
    }

    #[test]
    fn test_no_search_path_keeps_environment() {
        assert!(ZipArchiver::with_defaults().search_path().is_none());
    }

    #[tokio::test]
    async fn test_missing_program_is_tool_not_found() {
        let temp = TempDir::new().unwrap();
        let archiver =
            ZipArchiver::new(ArchiverConfig::default().with_program("archivist-no-such-zip"));

        let result = archiver.archive(temp.path(), "archive.zip").await;
        assert!(matches!(result, Err(ArchiverError::ToolNotFound { .. })));

        let result = archiver.validate().await;
        assert!(matches!(result, Err(ArchiverError::ToolNotFound { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_carries_code() {
        let temp = TempDir::new().unwrap();
        let archiver = ZipArchiver::new(ArchiverConfig::default().with_program("false"));

        let err = archiver
            .archive(temp.path(), "archive.zip")
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), Some(1));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_success_without_output_is_error() {
        let temp = TempDir::new().unwrap();
        let archiver = ZipArchiver::new(ArchiverConfig::default().with_program("true"));

        let result = archiver.archive(temp.path(), "archive.zip").await;
        assert!(matches!(result, Err(ArchiverError::OutputMissing { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_program_found_through_search_path() {
        use std::os::unix::fs::PermissionsExt;

        let bin = TempDir::new().unwrap();
        let script = bin.path().join("fake-zip");
        std::fs::write(
            &script,
            "#!/bin/sh\necho \"adding: $3\"\necho warning >&2\nprintf archive > \"$2\"\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let work = TempDir::new().unwrap();
        let archiver = ZipArchiver::new(
            ArchiverConfig::default()
                .with_program("fake-zip")
                .with_search_path(bin.path()),
        );

        let output = archiver.archive(work.path(), "out.zip").await.unwrap();
        assert_eq!(output.path, work.path().join("out.zip"));
        assert_eq!(std::fs::read_to_string(&output.path).unwrap(), "archive");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_utf8_output_does_not_fail_archive() {
        use std::os::unix::fs::PermissionsExt;

        let bin = TempDir::new().unwrap();
        let script = bin.path().join("noisy-zip");
        std::fs::write(
            &script,
            "#!/bin/sh\nprintf 'adding: \\377\\376\\n'\n\
             head -c 1048576 /dev/zero | tr '\\0' 'a'\n\
             printf '\\377 bad\\n' >&2\n\
             printf archive > \"$2\"\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let work = TempDir::new().unwrap();
        let archiver = ZipArchiver::new(ArchiverConfig::default().with_program(&script));

        let output = archiver.archive(work.path(), "out.zip").await.unwrap();
        assert_eq!(std::fs::read_to_string(&output.path).unwrap(), "archive");
    }

    #[tokio::test]
    async fn test_forward_lines_decodes_lossily() {
        let input: &[u8] = b"adding: \xff\xfe\nnext line\r\n";
        let captured = forward_lines(Some(input), "stdout").await;
        assert_eq!(captured, "adding: \u{fffd}\u{fffd}\nnext line\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_program() {
        use std::os::unix::fs::PermissionsExt;

        let bin = TempDir::new().unwrap();
        let script = bin.path().join("slow-zip");
        std::fs::write(&script, "#!/bin/sh\nexec sleep 30\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let work = TempDir::new().unwrap();
        let archiver = ZipArchiver::new(
            ArchiverConfig::default()
                .with_program(&script)
                .with_timeout(1),
        );

        let result = archiver.archive(work.path(), "out.zip").await;
        assert!(matches!(
            result,
            Err(ArchiverError::Timeout { timeout_secs: 1 })
        ));
    }

    #[tokio::test]
    #[ignore] // Requires the zip binary
    async fn test_real_zip_archives_recursively() {
        let work = TempDir::new().unwrap();
        std::fs::write(work.path().join("file1.txt"), "one").unwrap();
        std::fs::create_dir(work.path().join("nested")).unwrap();
        std::fs::write(work.path().join("nested/file2.txt"), "two").unwrap();

        let archiver = ZipArchiver::with_defaults();
        archiver.validate().await.unwrap();

        let output = archiver.archive(work.path(), "archive.zip").await.unwrap();
        let size = std::fs::metadata(&output.path).unwrap().len();
        assert!(size > 0);
    }
}
