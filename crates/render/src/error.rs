use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("Resolution must be at least 1x1, got {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },
    #[error("Invalid camera view: {0}")]
    InvalidView(String),
    #[error("Render cancelled after {rendered} of {total} pixels")]
    Cancelled { rendered: usize, total: usize },
}
