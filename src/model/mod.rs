//! Seam to the external text-generation service.
//!
//! Calendar recognition and free-text generation are opaque services: they
//! take an instruction (plus images) and return untrusted text. The pipeline
//! only talks to them through `ScheduleModel`.

pub mod cli;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::ModelError;

pub use cli::CliModel;

/// One call to the text-generation service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelRequest {
    pub instruction: String,
    /// Calendar images to read, if any.
    pub images: Vec<PathBuf>,
}

impl ModelRequest {
    pub fn text(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            images: Vec::new(),
        }
    }

    pub fn with_images(instruction: impl Into<String>, images: Vec<PathBuf>) -> Self {
        Self {
            instruction: instruction.into(),
            images,
        }
    }
}

#[async_trait]
pub trait ScheduleModel: Send + Sync {
    /// Run the request and return the raw reply text.
    async fn complete(&self, request: ModelRequest) -> Result<String, ModelError>;
}
