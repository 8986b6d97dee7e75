use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

use super::{DownloadRequest, Downloader, TARGET_CODEC};
use crate::config::FetchConfig;
use crate::{FetchTagError, Result};

/// Video titles of the form "Artist - Title" are split into both fields
const TITLE_METADATA_PATTERN: &str = "title:%(artist)s - %(title)s";

/// Audio downloader using yt-dlp
#[derive(Debug, Clone)]
pub struct YtDlp {
    yt_dlp_path: String,
    embed_source_metadata: bool,
}

impl YtDlp {
    pub fn new() -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
            embed_source_metadata: false,
        }
    }

    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            yt_dlp_path: config.yt_dlp_path.clone(),
            embed_source_metadata: config.embed_source_metadata,
        }
    }

    /// Command line for one download, without the program name
    pub fn build_args(&self, request: &DownloadRequest) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "--format".into(),
            "bestaudio/best".into(),
            "--extract-audio".into(),
            "--audio-format".into(),
            TARGET_CODEC.into(),
            "--audio-quality".into(),
            request.quality.as_ytdlp_arg(),
            "--no-playlist".into(),
            "--output".into(),
            request.output_template().to_string_lossy().into_owned(),
            // Report the final path once post-processing has moved it into place
            "--print".into(),
            "after_move:filepath".into(),
            "--no-simulate".into(),
        ];

        if self.embed_source_metadata {
            args.extend([
                "--embed-metadata".to_string(),
                "--parse-metadata".to_string(),
                TITLE_METADATA_PATTERN.to_string(),
            ]);
        }

        args.push(request.link.to_string());
        args
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new()
    }
}

/// The last non-empty line yt-dlp printed is the produced file
fn produced_path(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(PathBuf::from)
}

#[async_trait]
impl Downloader for YtDlp {
    async fn check_available(&self) -> Result<()> {
        let missing = crate::utils::check_dependencies(&self.yt_dlp_path).await;
        if !missing.is_empty() {
            anyhow::bail!("{}", missing.join("\n"));
        }
        Ok(())
    }

    async fn download_audio(&self, request: &DownloadRequest) -> Result<PathBuf> {
        let args = self.build_args(request);
        tracing::debug!("Running {} {}", self.yt_dlp_path, args.join(" "));

        let output = Command::new(&self.yt_dlp_path)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                FetchTagError::DownloadFailed(format!(
                    "failed to run {}: {}",
                    self.yt_dlp_path, e
                ))
            })?;

        tracing::debug!("{} exited with {}", self.yt_dlp_path, output.status);

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(FetchTagError::DownloadFailed(format!(
                "{} exited with {}: {}",
                self.yt_dlp_path,
                output.status,
                error.trim()
            ))
            .into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        produced_path(&stdout)
            .ok_or_else(|| FetchTagError::NoFileProduced(request.link.to_string()).into())
    }
}
