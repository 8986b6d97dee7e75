//! Artist/title/album tag reading and writing using `lofty`.
//!
//! All functions are synchronous. Async callers go through
//! [`read_tags_blocking`] and [`write_tags_blocking`], which move the work
//! onto tokio's blocking pool.

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use lofty::config::WriteOptions;
use lofty::file::TaggedFileExt;
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::Tag;
use serde::{Deserialize, Serialize};

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_TRACK: &str = "Unknown Track";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

#[derive(Debug, thiserror::Error)]
pub enum TagError {
    #[error("Audio file does not exist: {0}")]
    Missing(PathBuf),

    #[error("Failed to read {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    #[error("{0} cannot carry tags")]
    Unsupported(PathBuf),

    #[error("Failed to write tags to {path}: {reason}")]
    Write { path: PathBuf, reason: String },
}

/// One of the three tag fields this tool manages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagField {
    Artist,
    Title,
    Album,
}

impl TagField {
    pub const ALL: [TagField; 3] = [TagField::Artist, TagField::Title, TagField::Album];

    /// MP4 `ilst` atom the field is stored under in m4a files
    pub fn atom(&self) -> [u8; 4] {
        match self {
            TagField::Artist => *b"\xa9ART",
            TagField::Title => *b"\xa9nam",
            TagField::Album => *b"\xa9alb",
        }
    }

    /// Atom name as shown by tag editors, e.g. `©ART`
    pub fn atom_name(&self) -> String {
        // Atom bytes are Latin-1
        self.atom().iter().map(|&b| b as char).collect()
    }

    pub fn label(&self) -> &'static str {
        match self {
            TagField::Artist => "Artist",
            TagField::Title => "Track",
            TagField::Album => "Album",
        }
    }

    pub fn default_value(&self) -> &'static str {
        match self {
            TagField::Artist => UNKNOWN_ARTIST,
            TagField::Title => UNKNOWN_TRACK,
            TagField::Album => UNKNOWN_ALBUM,
        }
    }
}

impl fmt::Display for TagField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Artist, title and album of one audio file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSet {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
}

impl TagSet {
    pub fn new(
        artist: impl Into<String>,
        title: impl Into<String>,
        album: impl Into<String>,
    ) -> Self {
        Self {
            artist: Some(artist.into()),
            title: Some(title.into()),
            album: Some(album.into()),
        }
    }

    pub fn get(&self, field: TagField) -> Option<&str> {
        match field {
            TagField::Artist => self.artist.as_deref(),
            TagField::Title => self.title.as_deref(),
            TagField::Album => self.album.as_deref(),
        }
    }

    pub fn set(&mut self, field: TagField, value: Option<String>) {
        match field {
            TagField::Artist => self.artist = value,
            TagField::Title => self.title = value,
            TagField::Album => self.album = value,
        }
    }

    /// Fill every missing field with its literal "Unknown ..." default
    pub fn or_defaults(mut self) -> Self {
        for field in TagField::ALL {
            if self.get(field).is_none() {
                self.set(field, Some(field.default_value().to_string()));
            }
        }
        self
    }

    /// Take fields from `other` wherever this set has none
    pub fn or(mut self, other: &TagSet) -> Self {
        for field in TagField::ALL {
            if self.get(field).is_none() {
                self.set(field, other.get(field).map(str::to_string));
            }
        }
        self
    }

    /// Treat blank values as absent
    pub fn non_blank(mut self) -> Self {
        for field in TagField::ALL {
            let value = self
                .get(field)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string);
            self.set(field, value);
        }
        self
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in TagField::ALL.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", field, self.get(*field).unwrap_or("-"))?;
        }
        Ok(())
    }
}

fn open(path: &Path) -> Result<lofty::file::TaggedFile, TagError> {
    if !path.is_file() {
        return Err(TagError::Missing(path.to_path_buf()));
    }

    let unreadable = |e: lofty::error::LoftyError| TagError::Unreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    Probe::open(path)
        .map_err(unreadable)?
        .read()
        .map_err(unreadable)
}

/// Read artist, title and album from the file's primary tag
pub fn read_tags(path: &Path) -> Result<TagSet, TagError> {
    let tagged_file = open(path)?;

    let Some(tag) = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag())
    else {
        tracing::debug!("{} has no tags", path.display());
        return Ok(TagSet::default());
    };

    Ok(TagSet {
        artist: stored(tag.artist()),
        title: stored(tag.title()),
        album: stored(tag.album()),
    })
}

/// Value exactly as stored; whitespace-only items count as absent
fn stored(value: Option<Cow<'_, str>>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(Cow::into_owned)
}

/// Set (or remove, when `None`) the three fields on an in-memory tag
fn apply(tag: &mut Tag, tags: &TagSet) {
    match &tags.artist {
        Some(artist) => tag.set_artist(artist.clone()),
        None => tag.remove_artist(),
    }
    match &tags.title {
        Some(title) => tag.set_title(title.clone()),
        None => tag.remove_title(),
    }
    match &tags.album {
        Some(album) => tag.set_album(album.clone()),
        None => tag.remove_album(),
    }
}

/// Overwrite artist, title and album in place
///
/// Fields that are `None` are removed from the tag. The audio stream is left
/// untouched.
pub fn write_tags(path: &Path, tags: &TagSet) -> Result<(), TagError> {
    let mut tagged_file = open(path)?;

    if tagged_file.primary_tag().is_none() {
        let tag_type = tagged_file.primary_tag_type();
        tagged_file.insert_tag(Tag::new(tag_type));
    }

    let tag = tagged_file
        .primary_tag_mut()
        .ok_or_else(|| TagError::Unsupported(path.to_path_buf()))?;

    apply(tag, tags);

    tag.save_to_path(path, WriteOptions::default())
        .map_err(|e| TagError::Write {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    tracing::info!("Wrote tags to {}", path.display());
    Ok(())
}

/// [`read_tags`] on tokio's blocking pool
pub async fn read_tags_blocking(path: PathBuf) -> anyhow::Result<TagSet> {
    Ok(tokio::task::spawn_blocking(move || read_tags(&path)).await??)
}

/// [`write_tags`] on tokio's blocking pool
pub async fn write_tags_blocking(path: PathBuf, tags: TagSet) -> anyhow::Result<()> {
    Ok(tokio::task::spawn_blocking(move || write_tags(&path, &tags)).await??)
}
