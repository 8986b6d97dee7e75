//! Form controller behind the desktop frontend.
//!
//! The controller owns the four form fields and the submit handler. It never
//! runs I/O itself: `submit` hands back the download to run, the frontend runs
//! [`fetch_and_autofill`] in the background and posts the result to
//! `fetch_finished`; the confirmation answer goes to `confirm`, which hands
//! back the tags to write, and [`write_confirmed`]'s result goes to
//! `tag_finished`. [`FormController::run_once`] drives the same sequence
//! without a UI.

use std::path::PathBuf;

use super::Notice;
use crate::config::FetchConfig;
use crate::fetcher::{AudioQuality, DownloadRequest, Fetcher};
use crate::tags::{self, TagField, TagSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Link,
    Artist,
    Title,
    Album,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Fetching,
    /// Fields hold the file's current tags; waiting for yes/no
    AwaitingConfirmation(PathBuf),
    Tagging,
}

/// Result of the background fetch: the produced file and its tags, defaults filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoFill {
    pub path: PathBuf,
    pub tags: TagSet,
}

#[derive(Debug, Clone)]
pub struct FormController {
    link: String,
    artist: String,
    title: String,
    album: String,
    output_dir: PathBuf,
    quality: AudioQuality,
    phase: Phase,
    notice: Option<Notice>,
}

impl FormController {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            link: String::new(),
            artist: String::new(),
            title: String::new(),
            album: String::new(),
            output_dir: config.output_dir.clone(),
            quality: config.audio_quality,
            phase: Phase::Idle,
            notice: None,
        }
    }

    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Link => &self.link,
            FormField::Artist => &self.artist,
            FormField::Title => &self.title,
            FormField::Album => &self.album,
        }
    }

    pub fn set_field(&mut self, field: FormField, value: String) {
        match field {
            FormField::Link => self.link = value,
            FormField::Artist => self.artist = value,
            FormField::Title => self.title = value,
            FormField::Album => self.album = value,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Fetching | Phase::Tagging)
    }

    /// The tag fields as currently typed. A cleared field is `None`, which
    /// removes that item from the file.
    pub fn tags(&self) -> TagSet {
        let typed = |value: &str| (!value.trim().is_empty()).then(|| value.to_string());
        TagSet {
            artist: typed(&self.artist),
            title: typed(&self.title),
            album: typed(&self.album),
        }
    }

    /// Submit button. Returns the download to run, or `None` when the form
    /// is busy or the link is unusable (an error notice is set).
    pub fn submit(&mut self) -> Option<DownloadRequest> {
        if self.phase != Phase::Idle {
            return None;
        }

        match DownloadRequest::new(&self.link, self.output_dir.clone(), self.quality) {
            Ok(request) => {
                tracing::info!("Submitting {}", request.link);
                self.phase = Phase::Fetching;
                self.notice = Some(Notice::Info("Downloading audio...".to_string()));
                Some(request)
            }
            Err(e) => {
                self.notice = Some(Notice::Error(e.to_string()));
                None
            }
        }
    }

    pub fn fetch_finished(&mut self, result: Result<AutoFill, String>) {
        match result {
            Ok(AutoFill { path, tags }) => {
                for field in TagField::ALL {
                    let value = tags.get(field).unwrap_or(field.default_value());
                    self.set_field(field.into(), value.to_string());
                }
                self.notice = Some(Notice::Info(format!(
                    "Downloaded {}. Update its tags?",
                    path.display()
                )));
                self.phase = Phase::AwaitingConfirmation(path);
            }
            Err(e) => {
                self.notice = Some(Notice::Error(e));
                self.phase = Phase::Idle;
            }
        }
    }

    /// Yes/no answer. On yes, returns the file and the (possibly edited)
    /// field values to write.
    pub fn confirm(&mut self, yes: bool) -> Option<(PathBuf, TagSet)> {
        let Phase::AwaitingConfirmation(path) = &self.phase else {
            return None;
        };
        let path = path.clone();

        if yes {
            self.phase = Phase::Tagging;
            Some((path, self.tags()))
        } else {
            self.phase = Phase::Idle;
            self.notice = Some(Notice::Info("Tags were left unchanged.".to_string()));
            None
        }
    }

    pub fn tag_finished(&mut self, result: Result<PathBuf, String>) {
        self.notice = Some(match result {
            Ok(path) => Notice::Success(format!("Tags saved to {}", path.display())),
            Err(e) => Notice::Error(e),
        });
        self.phase = Phase::Idle;
    }

    /// Whole submission without a UI; `decide` stands in for the yes/no dialog
    pub async fn run_once(
        &mut self,
        fetcher: &Fetcher,
        decide: impl FnOnce(&mut FormController) -> bool,
    ) -> Option<Notice> {
        if let Some(request) = self.submit() {
            let fetched = fetch_and_autofill(fetcher.clone(), request).await;
            self.fetch_finished(fetched);

            if matches!(self.phase, Phase::AwaitingConfirmation(_)) {
                let yes = decide(self);
                if let Some((path, tags)) = self.confirm(yes) {
                    let written = write_confirmed(path, tags).await;
                    self.tag_finished(written);
                }
            }
        }

        self.notice.clone()
    }
}

impl From<TagField> for FormField {
    fn from(field: TagField) -> Self {
        match field {
            TagField::Artist => FormField::Artist,
            TagField::Title => FormField::Title,
            TagField::Album => FormField::Album,
        }
    }
}

/// Background half of submit: download, then read the file's tags back
pub async fn fetch_and_autofill(
    fetcher: Fetcher,
    request: DownloadRequest,
) -> Result<AutoFill, String> {
    let fetched = fetcher
        .fetch(&request)
        .await
        .map_err(|e| format!("{:#}", e))?;

    let tags = tags::read_tags_blocking(fetched.path.clone())
        .await
        .map_err(|e| format!("{:#}", e))?
        .or_defaults();

    Ok(AutoFill {
        path: fetched.path,
        tags,
    })
}

/// Background half of a "yes": write the tags
pub async fn write_confirmed(path: PathBuf, tags: TagSet) -> Result<PathBuf, String> {
    tags::write_tags_blocking(path.clone(), tags)
        .await
        .map_err(|e| format!("{:#}", e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::MockDownloader;
    use crate::orchestrator::testing::wav_downloader;
    use crate::FetchTagError;
    use std::sync::Arc;

    const LINK: &str = "https://example.com/watch?v=X";

    fn controller(dir: &std::path::Path) -> FormController {
        let config = FetchConfig {
            output_dir: dir.join("out"),
            ..FetchConfig::default()
        };
        FormController::new(&config)
    }

    #[tokio::test]
    async fn test_empty_link_shows_error_and_does_nothing() {
        let temp = tempfile::tempdir().unwrap();
        let mut downloader = MockDownloader::new();
        downloader.expect_download_audio().times(0);
        let fetcher = Fetcher::with_downloader(Arc::new(downloader));

        let mut form = controller(temp.path());
        let notice = form.run_once(&fetcher, |_| true).await;

        assert!(matches!(notice, Some(Notice::Error(_))));
        assert_eq!(form.phase(), &Phase::Idle);
        assert!(!temp.path().join("out").exists());
    }

    #[tokio::test]
    async fn test_autofill_defaults_then_write_edited_fields() {
        let temp = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::with_downloader(Arc::new(wav_downloader(LINK)));

        let mut form = controller(temp.path());
        form.set_field(FormField::Link, LINK.to_string());

        let notice = form
            .run_once(&fetcher, |form| {
                assert_eq!(form.field(FormField::Artist), "Unknown Artist");
                assert_eq!(form.field(FormField::Title), "Unknown Track");
                assert_eq!(form.field(FormField::Album), "Unknown Album");
                form.set_field(FormField::Artist, "A".to_string());
                form.set_field(FormField::Title, "T".to_string());
                form.set_field(FormField::Album, "Al".to_string());
                true
            })
            .await;

        assert!(matches!(notice, Some(Notice::Success(_))));
        let path = temp.path().join("out").join("Video Title.wav");
        assert_eq!(tags::read_tags(&path).unwrap(), TagSet::new("A", "T", "Al"));
    }

    #[tokio::test]
    async fn test_written_fields_read_back_as_typed() {
        let temp = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::with_downloader(Arc::new(wav_downloader(LINK)));

        let mut form = controller(temp.path());
        form.set_field(FormField::Link, LINK.to_string());

        form.run_once(&fetcher, |form| {
            form.set_field(FormField::Artist, " A ".to_string());
            form.set_field(FormField::Title, String::new());
            form.set_field(FormField::Album, "Al".to_string());
            true
        })
        .await;

        let expected = TagSet {
            artist: Some(" A ".to_string()),
            title: None,
            album: Some("Al".to_string()),
        };
        let path = temp.path().join("out").join("Video Title.wav");
        assert_eq!(tags::read_tags(&path).unwrap(), expected);
    }

    #[test]
    fn test_cleared_field_is_absent() {
        let temp = tempfile::tempdir().unwrap();
        let mut form = controller(temp.path());
        form.set_field(FormField::Artist, "A".to_string());
        form.set_field(FormField::Album, "   ".to_string());

        assert_eq!(
            form.tags(),
            TagSet {
                artist: Some("A".to_string()),
                title: None,
                album: None,
            }
        );
    }

    #[tokio::test]
    async fn test_declining_leaves_file_bytes_identical() {
        let temp = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::with_downloader(Arc::new(wav_downloader(LINK)));
        let path = temp.path().join("out").join("Video Title.wav");

        let mut form = controller(temp.path());
        form.set_field(FormField::Link, LINK.to_string());

        let mut before = Vec::new();
        let notice = form
            .run_once(&fetcher, |form| {
                before = std::fs::read(&path).unwrap();
                form.set_field(FormField::Artist, "Edited".to_string());
                false
            })
            .await;

        assert!(matches!(notice, Some(Notice::Info(_))));
        assert_eq!(form.phase(), &Phase::Idle);
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_fetch_failure_shows_error() {
        let temp = tempfile::tempdir().unwrap();
        let mut downloader = MockDownloader::new();
        downloader.expect_download_audio().times(1).returning(|req| {
            Err(FetchTagError::NoFileProduced(req.link.to_string()).into())
        });
        let fetcher = Fetcher::with_downloader(Arc::new(downloader));

        let mut form = controller(temp.path());
        form.set_field(FormField::Link, LINK.to_string());
        let notice = form.run_once(&fetcher, |_| panic!("no confirmation expected")).await;

        assert!(matches!(notice, Some(Notice::Error(m)) if m.contains("No audio file")));
        assert_eq!(form.phase(), &Phase::Idle);
    }

    #[test]
    fn test_submit_ignored_while_busy() {
        let temp = tempfile::tempdir().unwrap();
        let mut form = controller(temp.path());
        form.set_field(FormField::Link, LINK.to_string());

        assert!(form.submit().is_some());
        assert!(form.is_busy());
        assert!(form.submit().is_none());
    }

    #[test]
    fn test_confirm_outside_confirmation_is_noop() {
        let temp = tempfile::tempdir().unwrap();
        let mut form = controller(temp.path());
        assert!(form.confirm(true).is_none());
        assert_eq!(form.phase(), &Phase::Idle);
    }

    #[test]
    fn test_existing_tags_are_autofilled() {
        let temp = tempfile::tempdir().unwrap();
        let mut form = controller(temp.path());
        form.set_field(FormField::Link, LINK.to_string());
        form.submit().unwrap();

        let path = temp.path().join("song.m4a");
        form.fetch_finished(Ok(AutoFill {
            path: path.clone(),
            tags: TagSet::new("Band", "Hit", "Record"),
        }));

        assert_eq!(form.phase(), &Phase::AwaitingConfirmation(path.clone()));
        assert_eq!(form.field(FormField::Artist), "Band");
        assert_eq!(
            form.confirm(true),
            Some((path, TagSet::new("Band", "Hit", "Record")))
        );
        assert_eq!(form.phase(), &Phase::Tagging);
    }
}
