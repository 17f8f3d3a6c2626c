//! Attachment service
//!
//! Orchestrates one attachment from raw input to a committed, servable
//! record: classify, validate, render every style concurrently, assemble
//! metadata and blurhash, name, then store all blobs. Any failure leaves
//! nothing behind in storage.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use futures::future::try_join_all;
use mediakit_core::{
    Attachment, AttachmentError, AttachmentId, BlobRef, CodecError, ErrorMetadata, LogLevel,
    ProcessingConfig, ProcessingState, StyleMeta, StyleName, StyleOutput, ValidationError,
    ValidationErrorKind,
};
use mediakit_storage::{style_key, Storage};
use tracing::{debug, error, info, warn};

use crate::blurhash;
use crate::classifier::classify;
use crate::codec::{CodecAdapter, Container, Probe};
use crate::input::{RawInput, SourceBlob};
use crate::metadata;
use crate::mime::MimeTable;
use crate::naming;
use crate::styles::{self, Step, StyleDefinition};
use crate::validator::AttachmentValidator;

/// Request to create an attachment.
#[derive(Debug, Clone, Default)]
pub struct NewAttachment {
    pub input: Option<RawInput>,
    pub remote_url: Option<String>,
    pub shortcode: Option<String>,
    pub description: Option<String>,
    /// `"x,y"` focal point
    pub focus: Option<String>,
}

impl NewAttachment {
    pub fn from_input(input: RawInput) -> Self {
        Self {
            input: Some(input),
            ..Self::default()
        }
    }
}

/// A rendered style before it is named and stored.
struct RenderedStyle {
    definition: StyleDefinition,
    data: Bytes,
    container: Container,
    probe: Probe,
}

/// A rendered style with its final name and metadata, ready to commit.
struct PendingStyle {
    name: StyleName,
    data: Bytes,
    container: Container,
    file_name: String,
    meta: StyleMeta,
}

pub struct AttachmentService {
    validator: AttachmentValidator,
    codec: Arc<dyn CodecAdapter>,
    storage: Arc<dyn Storage>,
}

impl AttachmentService {
    /// Fails if the serving MIME table does not recognise every extension the
    /// pipeline can emit.
    pub fn new(
        config: &ProcessingConfig,
        codec: Arc<dyn CodecAdapter>,
        storage: Arc<dyn Storage>,
    ) -> Result<Self, AttachmentError> {
        Self::with_mime_table(config, codec, storage, &MimeTable::new())
    }

    pub fn with_mime_table(
        config: &ProcessingConfig,
        codec: Arc<dyn CodecAdapter>,
        storage: Arc<dyn Storage>,
        mime_table: &MimeTable,
    ) -> Result<Self, AttachmentError> {
        mime_table.verify()?;

        Ok(Self {
            validator: AttachmentValidator::from_config(config),
            codec,
            storage,
        })
    }

    /// Create an attachment from raw input.
    ///
    /// A pending download with a remote URL yields an unprocessed record that
    /// [`AttachmentService::attach_download`] completes later.
    #[tracing::instrument(skip(self, new), fields(
        attachment_id = tracing::field::Empty,
        kind = tracing::field::Empty
    ))]
    pub async fn create(&self, new: NewAttachment) -> Result<Attachment, AttachmentError> {
        self.validator
            .validate_description(new.description.as_deref())?;
        let focus = self.validator.validate_focus(new.focus.as_deref())?;

        let source = match new.input {
            Some(input) => input.into_source()?,
            None => return Err(ValidationError::file(ValidationErrorKind::Blank).into()),
        };

        let mut attachment = Attachment::new(new.remote_url, new.shortcode);
        attachment.description = new.description;
        attachment.metadata.focus = focus;
        tracing::Span::current().record("attachment_id", tracing::field::display(attachment.id()));

        match source {
            Some(source) => self.run(attachment, source).await,
            None if !attachment.local() => {
                info!(
                    attachment_id = %attachment.id(),
                    "Registered remote attachment, awaiting download"
                );
                Ok(attachment)
            }
            None => Err(ValidationError::file(ValidationErrorKind::Blank).into()),
        }
    }

    /// Register a remote attachment whose bytes are fetched later.
    pub async fn register_remote(
        &self,
        remote_url: &str,
        shortcode: Option<String>,
        description: Option<String>,
    ) -> Result<Attachment, AttachmentError> {
        if remote_url.trim().is_empty() {
            return Err(ValidationError::new("remote_url", ValidationErrorKind::Blank).into());
        }

        self.create(NewAttachment {
            input: Some(RawInput::PendingDownload),
            remote_url: Some(remote_url.to_string()),
            shortcode,
            description,
            focus: None,
        })
        .await
    }

    /// Run the pipeline on bytes fetched for a registered remote attachment.
    /// The origin stays remote.
    #[tracing::instrument(skip(self, attachment, input), fields(
        attachment_id = %attachment.id(),
        kind = tracing::field::Empty
    ))]
    pub async fn attach_download(
        &self,
        attachment: Attachment,
        input: RawInput,
    ) -> Result<Attachment, AttachmentError> {
        if !attachment.needs_redownload() || attachment.state() != ProcessingState::Created {
            return Err(AttachmentError::InvalidState {
                from: attachment.state(),
                to: ProcessingState::Classified,
            });
        }

        let source = input
            .into_source()?
            .ok_or_else(|| ValidationError::file(ValidationErrorKind::Blank))?;

        self.run(attachment, source).await
    }

    /// Read back the stored blob of one style.
    pub async fn read_style(
        &self,
        attachment: &Attachment,
        name: StyleName,
    ) -> Result<Bytes, AttachmentError> {
        let style = attachment.style(name).ok_or_else(|| {
            AttachmentError::Storage(format!("attachment has no {} style", name))
        })?;
        Ok(self.storage.read(&style.blob.key).await?)
    }

    /// Delete every style blob. All deletions are attempted; the first
    /// failure is reported.
    #[tracing::instrument(skip(self, attachment), fields(attachment_id = %attachment.id()))]
    pub async fn destroy(&self, attachment: &Attachment) -> Result<(), AttachmentError> {
        let mut first_error = None;

        for style in attachment.styles() {
            if let Err(err) = self.storage.delete(&style.blob.key).await {
                warn!(
                    style = %style.name,
                    key = %style.blob.key,
                    error = %err,
                    "Failed to delete style blob"
                );
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err.into()),
            None => {
                info!(styles = attachment.styles().len(), "Attachment destroyed");
                Ok(())
            }
        }
    }

    async fn run(
        &self,
        mut attachment: Attachment,
        source: SourceBlob,
    ) -> Result<Attachment, AttachmentError> {
        let start = Instant::now();

        match self.process(&mut attachment, source).await {
            Ok(()) => {
                info!(
                    attachment_id = %attachment.id(),
                    kind = %attachment.kind(),
                    styles = attachment.styles().len(),
                    duration_ms = start.elapsed().as_millis(),
                    "Attachment processing complete"
                );
                Ok(attachment)
            }
            Err(err) => {
                if attachment.state().can_advance_to(ProcessingState::Failed) {
                    attachment.advance(ProcessingState::Failed)?;
                }
                match err.log_level() {
                    LogLevel::Debug => {
                        debug!(attachment_id = %attachment.id(), error = %err, "Attachment rejected")
                    }
                    LogLevel::Warn => {
                        warn!(attachment_id = %attachment.id(), error = %err, "Attachment processing failed")
                    }
                    LogLevel::Error => {
                        error!(attachment_id = %attachment.id(), error = %err.detailed_message(), "Attachment processing failed")
                    }
                }
                Err(err)
            }
        }
    }

    async fn process(
        &self,
        attachment: &mut Attachment,
        source: SourceBlob,
    ) -> Result<(), AttachmentError> {
        let kind = classify(&source.data, source.declared_content_type.as_deref());
        attachment.classify_as(kind)?;
        tracing::Span::current().record("kind", kind.as_str());

        self.validator.validate_file(kind, source.len())?;

        let source_probe = if kind.is_time_based() {
            let probe = self.codec.probe(source.data.clone()).await?;
            self.validator.validate_source_probe(kind, &probe)?;
            Some(probe)
        } else {
            None
        };
        attachment.advance(ProcessingState::Validated)?;

        attachment.advance(ProcessingState::Styling)?;
        let prepared = match styles::normalization_target(kind, &source.data) {
            Some(target) => {
                debug!(target = target.extension(), "Normalizing still image");
                self.codec.transcode(source.data.clone(), target).await?
            }
            None => source.data.clone(),
        };

        let rendered: Vec<RenderedStyle> = try_join_all(
            styles::styles_for(kind)
                .iter()
                .map(|definition| {
                    self.render_style(definition, prepared.clone(), source_probe.as_ref())
                }),
        )
        .await?
        .into_iter()
        .flatten()
        .collect();

        let (blurhash, background) = match rendered.iter().find(|r| r.definition.thumbnail) {
            Some(thumbnail) => {
                let (hash, color) = futures::try_join!(
                    blurhash::compute_async(thumbnail.data.clone()),
                    self.codec.dominant_color(thumbnail.data.clone())
                )?;
                (Some(hash), Some(color))
            }
            None => (None, None),
        };

        let pending: Vec<PendingStyle> = rendered
            .into_iter()
            .map(|rendered| {
                let name = rendered.definition.name;
                PendingStyle {
                    name,
                    meta: metadata::style_meta(kind, name, &rendered.probe, source_probe.as_ref()),
                    file_name: naming::generate_file_name(
                        source.file_name.as_deref(),
                        rendered.container,
                    ),
                    data: rendered.data,
                    container: rendered.container,
                }
            })
            .collect();

        let entries = pending.iter().map(|p| (p.name, p.meta.clone())).collect();
        let metadata = metadata::assemble(entries, background, attachment.metadata.focus);

        let styles = self.commit(attachment.id(), pending).await?;

        attachment.metadata = metadata;
        attachment.blurhash = blurhash;
        attachment.complete(styles)
    }

    async fn render_style(
        &self,
        definition: &StyleDefinition,
        source: Bytes,
        source_probe: Option<&Probe>,
    ) -> Result<Option<RenderedStyle>, AttachmentError> {
        let start = Instant::now();

        let Some(data) =
            styles::render(self.codec.as_ref(), definition, source, source_probe).await?
        else {
            debug!(style = %definition.name, "No embedded image, style skipped");
            return Ok(None);
        };

        let expected = definition.steps.iter().rev().find_map(|step| match step {
            Step::Transcode(container) => Some(*container),
            _ => None,
        });
        let container = naming::resolve_container(&data, expected)?;

        let probe = self.codec.probe(data.clone()).await?;
        if container.is_still_image() && probe.dimensions().is_none() {
            return Err(CodecError::UnexpectedOutput(format!(
                "{} style has no dimensions",
                definition.name
            ))
            .into());
        }

        debug!(
            style = %definition.name,
            content_type = container.content_type(),
            size_bytes = data.len(),
            width = ?probe.width,
            height = ?probe.height,
            duration_ms = start.elapsed().as_millis(),
            "Style rendered"
        );

        Ok(Some(RenderedStyle {
            definition: *definition,
            data,
            container,
            probe,
        }))
    }

    /// Store every style; on the first failure delete what was already stored.
    async fn commit(
        &self,
        id: AttachmentId,
        pending: Vec<PendingStyle>,
    ) -> Result<Vec<StyleOutput>, AttachmentError> {
        let mut stored: Vec<StyleOutput> = Vec::with_capacity(pending.len());

        for style in pending {
            let key = style_key(id, style.name, &style.file_name);
            let size_bytes = style.data.len() as u64;

            match self
                .storage
                .store(&key, style.data, style.container.content_type())
                .await
            {
                Ok(url) => stored.push(StyleOutput {
                    name: style.name,
                    blob: BlobRef { key, url },
                    file_name: style.file_name,
                    content_type: style.container.content_type().to_string(),
                    extension: style.container.extension().to_string(),
                    size_bytes,
                    width: style.meta.width,
                    height: style.meta.height,
                    aspect: style.meta.aspect,
                    duration: style.meta.duration,
                    frame_rate: style.meta.frame_rate,
                }),
                Err(err) => {
                    error!(
                        attachment_id = %id,
                        style = %style.name,
                        key = %key,
                        error = %err,
                        "Failed to store style, rolling back"
                    );
                    self.rollback(&stored).await;
                    return Err(err.into());
                }
            }
        }

        Ok(stored)
    }

    async fn rollback(&self, stored: &[StyleOutput]) {
        for style in stored {
            if let Err(err) = self.storage.delete(&style.blob.key).await {
                warn!(key = %style.blob.key, error = %err, "Rollback delete failed");
            }
        }
    }
}

impl std::fmt::Debug for AttachmentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachmentService")
            .field("validator", &self.validator)
            .field("storage", &self.storage.backend_type())
            .finish()
    }
}

