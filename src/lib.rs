//! fetchtag - download audio from video links and tag it
//!
//! This library wraps an external downloader (`yt-dlp`, which drives `ffmpeg` for
//! transcoding) and the `lofty` tag library behind two small orchestrators: an
//! interactive text flow and a form controller used by the desktop frontend.

pub mod cli;
pub mod config;
pub mod fetcher;
pub mod orchestrator;
pub mod tags;
pub mod utils;

#[cfg(feature = "gui")]
pub mod gui;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use fetcher::{AudioQuality, DownloadRequest, FetchedAudio, Fetcher};
pub use tags::{TagError, TagSet};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to a fetch-and-tag run
#[derive(thiserror::Error, Debug)]
pub enum FetchTagError {
    #[error("No link was entered")]
    MissingLink,

    #[error("Invalid link: {0}")]
    InvalidLink(String),

    #[error("Invalid audio quality: {0}")]
    InvalidQuality(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("No audio file was produced for {0}")]
    NoFileProduced(String),
}
