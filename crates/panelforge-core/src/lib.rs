//! Panelforge core library
//!
//! Everything around the session core needed to turn free-text requirements
//! into a multi-panel illustrated story:
//! - Structured story documents (title, characters, pages, panels)
//! - Image-generation configuration and limits
//! - Collaborator service traits for the hosted drafting and generation
//!   endpoints
//! - The comic workflow driving sessions against those services

pub mod comic;
pub mod config;
pub mod error;
pub mod output;
pub mod services;
pub mod story;

pub use comic::{ComicGenerator, ComicRun, ComicRunOptions, PanelArt};
pub use config::{AspectRatio, ImageConfig, OutputFormat};
pub use error::{ForgeError, ForgeResult};
pub use services::{
    GeneratedImage, GenerationRequest, ImageGenerationService, ReferenceData, ReferenceReport,
    StoryDraftingService,
};
pub use story::{Character, Page, Panel, Story};

// The session core is re-exported so most users need a single dependency.
pub use panelforge_session as session;
