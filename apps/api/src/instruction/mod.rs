//! Instruction assembly: template selection, image role assignment and composition
//! of the final text sent to the image model alongside the garment photos.
//!
//! Everything here is pure. No I/O, no shared state.

use thiserror::Error;

pub mod composer;
pub mod garment;
pub mod handlers;
pub mod mode;
pub mod prompts;
pub mod roles;

/// Usage errors raised while building an instruction. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    #[error("invalid mode '{0}': expected one of quotidien, party, conjunto")]
    InvalidMode(String),

    #[error("invalid position '{0}': expected one of front, back, ambos")]
    InvalidPosition(String),

    #[error("mode {mode} accepts {min} to {max} images, got {count}")]
    InvalidImageCount {
        mode: mode::Mode,
        count: usize,
        min: usize,
        max: usize,
    },
}
