use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use url::Url;

pub mod ytdlp;

pub use ytdlp::YtDlp;

use crate::config::FetchConfig;
use crate::{FetchTagError, Result};

/// Container/codec every download is converted to
pub const TARGET_CODEC: &str = "m4a";

/// Output directory used when none is configured
pub const DEFAULT_OUTPUT_DIR: &str = "out";

/// Audio quality handed to the transcoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QualityRepr", into = "String")]
pub enum AudioQuality {
    /// Best available quality
    Best,
    /// Variable bitrate on yt-dlp's 0 (best) to 10 (worst) scale
    Vbr(u8),
    /// Constant bitrate in kbps
    Bitrate(u32),
}

impl AudioQuality {
    /// Value passed to `--audio-quality`
    pub fn as_ytdlp_arg(&self) -> String {
        match self {
            AudioQuality::Best => "0".to_string(),
            AudioQuality::Vbr(level) => level.to_string(),
            AudioQuality::Bitrate(kbps) => format!("{}K", kbps),
        }
    }
}

impl Default for AudioQuality {
    fn default() -> Self {
        AudioQuality::Bitrate(128)
    }
}

impl fmt::Display for AudioQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioQuality::Best => write!(f, "best"),
            AudioQuality::Vbr(level) => write!(f, "{}", level),
            AudioQuality::Bitrate(kbps) => write!(f, "{}k", kbps),
        }
    }
}

impl FromStr for AudioQuality {
    type Err = FetchTagError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let value = s.trim().to_lowercase();
        let invalid = || FetchTagError::InvalidQuality(s.to_string());

        if value == "best" {
            return Ok(AudioQuality::Best);
        }

        if let Some(kbps) = value.strip_suffix('k') {
            return match kbps.parse::<u32>() {
                Ok(0) | Err(_) => Err(invalid()),
                Ok(kbps) => Ok(AudioQuality::Bitrate(kbps)),
            };
        }

        let number = value.parse::<u32>().map_err(|_| invalid())?;
        Ok(Self::from_number(number))
    }
}

impl AudioQuality {
    /// Bare numbers up to 10 are VBR levels, anything above is a bitrate
    fn from_number(number: u32) -> Self {
        if number <= 10 {
            AudioQuality::Vbr(number as u8)
        } else {
            AudioQuality::Bitrate(number)
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QualityRepr {
    Number(u32),
    Text(String),
}

impl TryFrom<QualityRepr> for AudioQuality {
    type Error = FetchTagError;

    fn try_from(repr: QualityRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            QualityRepr::Number(number) => Ok(Self::from_number(number)),
            QualityRepr::Text(text) => text.parse(),
        }
    }
}

impl From<AudioQuality> for String {
    fn from(quality: AudioQuality) -> Self {
        quality.to_string()
    }
}

/// One download: where from, where to, how good
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Source link
    pub link: Url,

    /// Directory the produced file lands in
    pub output_dir: PathBuf,

    /// Requested audio quality
    pub quality: AudioQuality,
}

impl DownloadRequest {
    /// Validate a raw link and build a request
    pub fn new(
        link: &str,
        output_dir: impl Into<PathBuf>,
        quality: AudioQuality,
    ) -> std::result::Result<Self, FetchTagError> {
        let link = link.trim();
        if link.is_empty() {
            return Err(FetchTagError::MissingLink);
        }

        Ok(Self {
            link: crate::utils::validate_url(link)?,
            output_dir: output_dir.into(),
            quality,
        })
    }

    /// Output template handed to yt-dlp: `<dir>/<title>.<ext>`
    pub fn output_template(&self) -> PathBuf {
        self.output_dir.join("%(title)s.%(ext)s")
    }
}

/// The file a fetch produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedAudio {
    pub path: PathBuf,
}

impl FetchedAudio {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// External tool that downloads and transcodes audio
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Check that the tool and its helpers can be run
    async fn check_available(&self) -> Result<()>;

    /// Download the request's audio and return the exact path produced
    async fn download_audio(&self, request: &DownloadRequest) -> Result<PathBuf>;
}

/// Wraps a [`Downloader`] with the output directory handling around it
#[derive(Clone)]
pub struct Fetcher {
    downloader: Arc<dyn Downloader>,
}

impl Fetcher {
    /// Fetcher backed by yt-dlp
    pub fn new(config: &FetchConfig) -> Self {
        Self::with_downloader(Arc::new(YtDlp::from_config(config)))
    }

    /// Fetcher backed by a specific downloader implementation
    pub fn with_downloader(downloader: Arc<dyn Downloader>) -> Self {
        Self { downloader }
    }

    /// Error lists each missing tool on its own line
    pub async fn check_available(&self) -> Result<()> {
        self.downloader.check_available().await
    }

    /// Produce exactly one audio file for the request
    pub async fn fetch(&self, request: &DownloadRequest) -> Result<FetchedAudio> {
        tokio::fs::create_dir_all(&request.output_dir)
            .await
            .with_context(|| {
                format!(
                    "Failed to create output directory {}",
                    request.output_dir.display()
                )
            })?;

        tracing::info!("Fetching audio from {}", request.link);
        let path = self.downloader.download_audio(request).await?;

        if !path.is_file() {
            tracing::warn!("Downloader reported {} but it does not exist", path.display());
            return Err(FetchTagError::NoFileProduced(request.link.to_string()).into());
        }

        tracing::info!("Audio saved to {}", path.display());
        Ok(FetchedAudio { path })
    }
}

impl fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetcher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_in(dir: &Path) -> DownloadRequest {
        DownloadRequest::new(
            "https://example.com/watch?v=X",
            dir.join("out"),
            AudioQuality::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_quality() {
        assert_eq!("best".parse::<AudioQuality>().unwrap(), AudioQuality::Best);
        assert_eq!("BEST".parse::<AudioQuality>().unwrap(), AudioQuality::Best);
        assert_eq!("0".parse::<AudioQuality>().unwrap(), AudioQuality::Vbr(0));
        assert_eq!("10".parse::<AudioQuality>().unwrap(), AudioQuality::Vbr(10));
        assert_eq!("128".parse::<AudioQuality>().unwrap(), AudioQuality::Bitrate(128));
        assert_eq!("192K".parse::<AudioQuality>().unwrap(), AudioQuality::Bitrate(192));
        assert_eq!("5k".parse::<AudioQuality>().unwrap(), AudioQuality::Bitrate(5));
        assert!("0k".parse::<AudioQuality>().is_err());
        assert!("loud".parse::<AudioQuality>().is_err());
        assert!("-1".parse::<AudioQuality>().is_err());
    }

    #[test]
    fn test_quality_ytdlp_arg() {
        assert_eq!(AudioQuality::Best.as_ytdlp_arg(), "0");
        assert_eq!(AudioQuality::Vbr(5).as_ytdlp_arg(), "5");
        assert_eq!(AudioQuality::Bitrate(128).as_ytdlp_arg(), "128K");
    }

    #[test]
    fn test_quality_display_parses_back() {
        for quality in [AudioQuality::Best, AudioQuality::Vbr(3), AudioQuality::Bitrate(256)] {
            assert_eq!(quality.to_string().parse::<AudioQuality>().unwrap(), quality);
        }
    }

    #[test]
    fn test_request_rejects_empty_link() {
        let result = DownloadRequest::new("   ", "out", AudioQuality::Best);
        assert!(matches!(result, Err(FetchTagError::MissingLink)));
    }

    #[test]
    fn test_request_rejects_non_url() {
        let result = DownloadRequest::new("just some words", "out", AudioQuality::Best);
        assert!(matches!(result, Err(FetchTagError::InvalidLink(_))));
    }

    #[test]
    fn test_output_template() {
        let request = DownloadRequest::new("https://youtu.be/abc", "out", AudioQuality::Best).unwrap();
        assert_eq!(
            request.output_template(),
            Path::new("out").join("%(title)s.%(ext)s")
        );
    }

    #[tokio::test]
    async fn test_fetch_creates_output_dir_and_returns_path() {
        let temp = tempfile::tempdir().unwrap();
        let request = request_in(temp.path());
        let produced = request.output_dir.join("Song Title.m4a");

        let mut downloader = MockDownloader::new();
        let produced_clone = produced.clone();
        downloader
            .expect_download_audio()
            .withf(|req| req.link.as_str() == "https://example.com/watch?v=X")
            .times(1)
            .returning(move |_| {
                std::fs::write(&produced_clone, b"audio").unwrap();
                Ok(produced_clone.clone())
            });

        let fetcher = Fetcher::with_downloader(Arc::new(downloader));
        let fetched = fetcher.fetch(&request).await.unwrap();

        assert!(request.output_dir.is_dir());
        assert_eq!(fetched.path, produced);
        assert!(fetched.path.starts_with(&request.output_dir));
    }

    #[tokio::test]
    async fn test_check_available_asks_downloader() {
        let mut downloader = MockDownloader::new();
        downloader
            .expect_check_available()
            .times(1)
            .returning(|| Err(anyhow::anyhow!("ffmpeg - required for converting audio to m4a")));
        downloader.expect_download_audio().times(0);

        let fetcher = Fetcher::with_downloader(Arc::new(downloader));
        let err = fetcher.check_available().await.unwrap_err();

        assert!(err.to_string().starts_with("ffmpeg"));
    }

    #[tokio::test]
    async fn test_fetch_missing_file_is_error() {
        let temp = tempfile::tempdir().unwrap();
        let request = request_in(temp.path());
        let ghost = request.output_dir.join("ghost.m4a");

        let mut downloader = MockDownloader::new();
        downloader
            .expect_download_audio()
            .returning(move |_| Ok(ghost.clone()));

        let fetcher = Fetcher::with_downloader(Arc::new(downloader));
        let err = fetcher.fetch(&request).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<FetchTagError>(),
            Some(FetchTagError::NoFileProduced(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_propagates_download_failure() {
        let temp = tempfile::tempdir().unwrap();
        let request = request_in(temp.path());

        let mut downloader = MockDownloader::new();
        downloader.expect_download_audio().times(1).returning(|_| {
            Err(FetchTagError::DownloadFailed("ERROR: video unavailable".to_string()).into())
        });

        let fetcher = Fetcher::with_downloader(Arc::new(downloader));
        let err = fetcher.fetch(&request).await.unwrap_err();

        assert!(err.to_string().contains("video unavailable"));
    }
}
