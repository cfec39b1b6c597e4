//! Progressive preview renderer for 3D signed distance fields.
//!
//! [`Renderer3`] sphere-traces one ray per pixel on a pool of worker threads
//! and streams partial rasters to a [`PartialSink`] while it works. Passes are
//! cancellable through a [`CancelToken`].

pub mod camera;
pub mod cancel;
pub mod config;
pub mod error;
pub mod framebuffer;
pub mod renderer;
pub mod sink;
pub mod state;

pub use camera::Camera;
pub use cancel::CancelToken;
pub use config::RenderConfig;
pub use error::RenderError;
pub use framebuffer::{Framebuffer, Rgba};
pub use renderer::Renderer3;
pub use sink::{Discard, FnSink, PartialRender, PartialSink, RenderProgress};
pub use state::RenderState;
