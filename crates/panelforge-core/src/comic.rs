//! Comic generation workflow
//!
//! Drives a drafted story panel by panel against the image-generation
//! service, holding a session per run so every panel after the first can
//! carry the conversation forward for visual consistency.
//!
//! The session manager and store never take part in the generation call
//! itself; this module feeds results back into the session and persists it
//! after each completed panel.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use panelforge_session::{ApiMessage, Role, Session, SessionConfig, SessionManager, SessionSummary};

use crate::config::{AspectRatio, ImageConfig};
use crate::error::{ForgeError, ForgeResult};
use crate::output;
use crate::services::{
    load_references, prepare_references, validate_references, GenerationRequest,
    ImageGenerationService, StoryDraftingService,
};
use crate::story::Story;

/// Options for a comic run
#[derive(Debug, Clone)]
pub struct ComicRunOptions {
    /// Carry session history into each generation call
    pub use_history: bool,

    /// Configuration for the run's session
    pub session_config: Option<SessionConfig>,
}

impl Default for ComicRunOptions {
    fn default() -> Self {
        Self {
            use_history: true,
            session_config: None,
        }
    }
}

/// The generated image for one panel
#[derive(Debug, Clone)]
pub struct PanelArt {
    /// Page the panel belongs to
    pub page_number: u32,

    /// Panel within the page
    pub panel_number: u32,

    /// Where the image was written
    pub path: PathBuf,
}

/// Result of a completed comic run
#[derive(Debug)]
pub struct ComicRun {
    /// The drafted story the panels were generated from
    pub story: Story,

    /// Identifier of the session that accumulated the run's context
    pub session_id: String,

    /// Session state after the final panel
    pub summary: SessionSummary,

    /// One entry per panel, in reading order
    pub panels: Vec<PanelArt>,
}

/// Orchestrates story drafting and per-panel image generation
pub struct ComicGenerator<D, G> {
    drafter: D,
    generator: G,
    sessions: SessionManager,
    config: ImageConfig,
}

impl<D, G> ComicGenerator<D, G>
where
    D: StoryDraftingService,
    G: ImageGenerationService,
{
    /// Create a generator with the default image configuration
    pub fn new(drafter: D, generator: G, sessions: SessionManager) -> Self {
        Self {
            drafter,
            generator,
            sessions,
            config: ImageConfig::default(),
        }
    }

    /// Replace the image configuration
    pub fn with_config(mut self, config: ImageConfig) -> Self {
        self.config = config;
        self
    }

    /// The session manager backing this generator
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Draft a story and generate every panel of it
    ///
    /// A fresh session accumulates the run's context; it is persisted after
    /// each completed panel, so a failure mid-run leaves the session intact
    /// up to the last panel that finished.
    pub async fn run(&self, requirements: &str, options: ComicRunOptions) -> ForgeResult<ComicRun> {
        let story = self.drafter.draft(requirements).await?;
        if story.pages.is_empty() {
            return Err(ForgeError::story("drafted story has no pages"));
        }

        let mut session = self.sessions.create(None, options.session_config.clone()).await?;
        info!(
            "Generating \"{}\": {} page(s), {} panel(s)",
            story.title,
            story.pages.len(),
            story.total_panels()
        );

        let mut panels = Vec::with_capacity(story.total_panels());
        for page in &story.pages {
            for panel in &page.panels {
                debug!(
                    "Generating page {} panel {}",
                    page.page_number, panel.panel_number
                );
                let path = self
                    .generate_in_session(
                        &mut session,
                        &panel.image_prompt,
                        &[],
                        options.use_history,
                        panel.image_ratio,
                    )
                    .await?;
                panels.push(PanelArt {
                    page_number: page.page_number,
                    panel_number: panel.panel_number,
                    path,
                });
            }
        }

        Ok(ComicRun {
            session_id: session.id().to_string(),
            summary: session.summary(),
            story,
            panels,
        })
    }

    /// Generate one image inside a session, maintaining its context
    ///
    /// Records the prompt, selects context by the session's policy, invokes
    /// the service, writes the result under the session's `images/`
    /// directory, and persists the session. This is the only path that
    /// advances the session's generation counter.
    pub async fn generate_in_session(
        &self,
        session: &mut Session,
        prompt: &str,
        reference_paths: &[PathBuf],
        use_history: bool,
        aspect_ratio: AspectRatio,
    ) -> ForgeResult<PathBuf> {
        session.add_message(Role::User, prompt);
        let context = session.context_for_prompt(prompt, use_history);

        let references = if reference_paths.is_empty() {
            Vec::new()
        } else {
            let report = validate_references(reference_paths).await;
            if !report.is_valid() {
                return Err(ForgeError::invalid_input(format!(
                    "invalid reference images: {}",
                    report.errors.join("; ")
                )));
            }
            for path in &report.valid {
                session.add_reference_image(path).await?;
            }
            load_references(&report.valid).await?
        };

        let image = self
            .generator
            .generate(GenerationRequest {
                context,
                prompt: prompt.to_string(),
                references,
                aspect_ratio,
            })
            .await?;

        let filename = output::generate_filename(
            &format!("gen_{}", session.metadata().generation_count + 1),
            "",
            image.format.extension(),
            true,
        );
        let dir = session.images_dir();
        fs::create_dir_all(&dir).await?;
        let path = dir.join(filename);
        fs::write(&path, &image.bytes).await?;

        session.add_generated_image(&path, false).await?;
        session.add_message(Role::Assistant, "Generated 1 image(s)");
        session.increment_generation_count();
        self.sessions.save(session).await?;

        Ok(path)
    }

    /// Generate outside any session
    ///
    /// One service call per configured image. Deliberately leaves every
    /// session untouched, including the generation counter.
    pub async fn generate_once(
        &self,
        prompt: &str,
        reference_paths: &[PathBuf],
        save_to: Option<&Path>,
    ) -> ForgeResult<Vec<PathBuf>> {
        self.config.validate()?;
        let references = prepare_references(reference_paths).await?;

        let mut outputs = Vec::with_capacity(self.config.num_images as usize);
        for index in 1..=self.config.num_images {
            let image = self
                .generator
                .generate(GenerationRequest {
                    context: vec![ApiMessage {
                        role: Role::User,
                        content: prompt.to_string(),
                    }],
                    prompt: prompt.to_string(),
                    references: references.clone(),
                    aspect_ratio: self.config.aspect_ratio,
                })
                .await?;

            let path = self.plan_single_output(save_to, index, image.format.extension());
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&path, &image.bytes).await?;
            outputs.push(path);
        }

        Ok(outputs)
    }

    /// Edit an existing image with a natural-language instruction
    pub async fn edit_image(
        &self,
        image_path: impl Into<PathBuf>,
        instruction: &str,
    ) -> ForgeResult<Vec<PathBuf>> {
        self.generate_once(instruction, &[image_path.into()], None).await
    }

    /// Fuse two or three images into one
    pub async fn fuse_images(
        &self,
        image_paths: &[PathBuf],
        fusion_prompt: &str,
    ) -> ForgeResult<Vec<PathBuf>> {
        if image_paths.len() < 2 {
            return Err(ForgeError::invalid_input("need at least 2 images to fuse"));
        }
        self.generate_once(fusion_prompt, image_paths, None).await
    }

    fn plan_single_output(&self, save_to: Option<&Path>, index: u32, extension: &str) -> PathBuf {
        match save_to {
            Some(requested) => {
                let planned = if requested.is_absolute() {
                    requested.to_path_buf()
                } else {
                    output::organize_output_path(
                        &self.config.output_dir,
                        &requested.to_string_lossy(),
                        self.config.organize_by_date,
                    )
                };
                if self.config.num_images > 1 {
                    output::indexed_path(&planned, index)
                } else {
                    planned
                }
            }
            None => {
                let suffix = if self.config.num_images > 1 {
                    index.to_string()
                } else {
                    String::new()
                };
                let filename = output::generate_filename("generated", &suffix, extension, true);
                output::organize_output_path(
                    &self.config.output_dir,
                    &filename,
                    self.config.organize_by_date,
                )
            }
        }
    }
}
