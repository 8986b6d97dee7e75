use std::path::PathBuf;

use super::{Notice, Prompter};
use crate::fetcher::{AudioQuality, DownloadRequest, FetchedAudio, Fetcher};
use crate::tags::{self, TagField, TagSet};
use crate::Result;

/// Where the text flow currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    PromptLink,
    PromptTags,
    Fetch,
    Tag,
    Done,
}

/// Inputs for one run of the text flow
#[derive(Debug, Clone, Default)]
pub struct InteractiveOptions {
    /// Link given up front; prompted for when `None`
    pub link: Option<String>,

    /// Tag values given up front; missing fields are prompted for
    pub preset: TagSet,

    pub output_dir: PathBuf,
    pub quality: AudioQuality,

    /// Ask before overwriting the file's tags
    pub confirm: bool,
}

/// What a completed run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub path: PathBuf,
    pub tags: TagSet,
    pub written: bool,
}

/// Prompt for a link and tags, fetch, then tag
pub struct InteractiveFlow<'a, P: Prompter> {
    fetcher: Fetcher,
    prompter: &'a mut P,
    options: InteractiveOptions,
    stage: Stage,
}

impl<'a, P: Prompter> InteractiveFlow<'a, P> {
    pub fn new(fetcher: Fetcher, prompter: &'a mut P, options: InteractiveOptions) -> Self {
        Self {
            fetcher,
            prompter,
            options,
            stage: Stage::PromptLink,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn enter(&mut self, stage: Stage) {
        tracing::debug!("{:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    pub async fn run(&mut self) -> Result<RunOutcome> {
        let request = self.prompt_link()?;

        self.enter(Stage::PromptTags);
        let answers = self.prompt_tags()?;

        self.enter(Stage::Fetch);
        let fetched = self.fetch(&request).await?;

        self.enter(Stage::Tag);
        let outcome = self.tag(fetched, answers).await?;

        self.enter(Stage::Done);
        Ok(outcome)
    }

    fn prompt_link(&mut self) -> Result<DownloadRequest> {
        let link = match self.options.link.clone() {
            Some(link) => link,
            None => self.prompter.ask("Enter the link:")?,
        };

        DownloadRequest::new(
            &link,
            self.options.output_dir.clone(),
            self.options.quality,
        )
        .map_err(|e| {
            self.prompter.notify(&Notice::Error(e.to_string()));
            e.into()
        })
    }

    fn prompt_tags(&mut self) -> Result<TagSet> {
        let mut answers = self.options.preset.clone().non_blank();

        for field in TagField::ALL {
            if answers.get(field).is_none() {
                let answer = self.prompter.ask(&format!("{}:", field.label()))?;
                answers.set(field, Some(answer));
            }
        }

        Ok(answers.non_blank())
    }

    async fn fetch(&mut self, request: &DownloadRequest) -> Result<FetchedAudio> {
        self.prompter
            .notify(&Notice::Info("Downloading audio...".to_string()));

        let fetched = self.fetcher.fetch(request).await.map_err(|e| {
            self.prompter.notify(&Notice::Error(format!("{:#}", e)));
            e
        })?;

        let size = crate::utils::file_size(fetched.path())
            .map(|bytes| format!(" ({})", crate::utils::format_file_size(bytes)))
            .unwrap_or_default();
        self.prompter.notify(&Notice::Info(format!(
            "Downloaded: {}{}",
            fetched.path().display(),
            size
        )));

        Ok(fetched)
    }

    async fn tag(&mut self, fetched: FetchedAudio, answers: TagSet) -> Result<RunOutcome> {
        // Blank answers fall back to what the file already carries
        let existing = tags::read_tags_blocking(fetched.path.clone()).await?;
        let tags = answers.or(&existing).or_defaults();

        if self.options.confirm {
            self.prompter.notify(&Notice::Info(tags.to_string()));
            if !self.prompter.confirm("Write these tags?")? {
                self.prompter
                    .notify(&Notice::Info("Tags were left unchanged.".to_string()));
                return Ok(RunOutcome {
                    path: fetched.path,
                    tags: existing,
                    written: false,
                });
            }
        }

        tags::write_tags_blocking(fetched.path.clone(), tags.clone()).await?;
        self.prompter.notify(&Notice::Success(format!(
            "Tags written to {}",
            fetched.path.display()
        )));

        Ok(RunOutcome {
            path: fetched.path,
            tags,
            written: true,
        })
    }
}
