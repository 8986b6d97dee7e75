use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::fetcher::AudioQuality;
use crate::tags::TagSet;

#[derive(Parser)]
#[command(
    name = "fetchtag",
    about = "fetchtag - Download audio from video links and tag it",
    version,
    long_about = "Downloads the best available audio behind a video link with yt-dlp, converts it to m4a, and writes artist, track and album tags into the result. Run without a subcommand to be prompted for everything."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, global = true, value_name = "FILE", env = "FETCHTAG_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download a link and tag the result, prompting for any tag not given
    Fetch {
        /// Video link to download audio from
        #[arg(value_name = "URL")]
        url: String,

        #[command(flatten)]
        tags: TagArgs,

        /// Directory to store the audio file in
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Audio quality: "best", a VBR level 0-10, or a bitrate such as 128k
        #[arg(short, long, value_name = "QUALITY")]
        quality: Option<AudioQuality>,

        /// Write tags without asking for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Write tags into an existing audio file
    Tag {
        /// Audio file to tag
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        tags: TagArgs,
    },

    /// Show the tags of an audio file
    Show {
        /// Audio file to read
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct TagArgs {
    /// Artist tag
    #[arg(short, long)]
    pub artist: Option<String>,

    /// Track title tag
    #[arg(short, long, alias = "track")]
    pub title: Option<String>,

    /// Album tag
    #[arg(short = 'l', long)]
    pub album: Option<String>,
}

impl From<TagArgs> for TagSet {
    fn from(args: TagArgs) -> Self {
        TagSet {
            artist: args.artist,
            title: args.title,
            album: args.album,
        }
    }
}
