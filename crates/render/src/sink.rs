//! Progressive output: where partial rasters go while a pass is running.

use std::sync::mpsc::SyncSender;

use crate::framebuffer::Framebuffer;

/// How far a pass has got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderProgress {
    pub rendered: usize,
    pub total: usize,
}

impl RenderProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.rendered as f64 / self.total as f64
        }
    }
}

/// An owned partial raster, for sinks that hand frames to another thread.
#[derive(Debug, Clone)]
pub struct PartialRender {
    pub progress: RenderProgress,
    pub frame: Framebuffer,
}

/// Receiver of partial rasters.
///
/// `publish` runs on the rendering thread while the raster is read-locked,
/// so it should copy what it needs and return quickly. `close` runs exactly
/// once when the pass ends, whether it completed or was cancelled.
pub trait PartialSink {
    fn publish(&mut self, progress: RenderProgress, frame: &Framebuffer);

    fn close(&mut self) {}
}

/// Drops every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl PartialSink for Discard {
    fn publish(&mut self, _progress: RenderProgress, _frame: &Framebuffer) {}
}

/// Sends a copy of every update over a bounded channel.
///
/// A full channel blocks the pass until the receiver catches up, so at most
/// `bound` copies are ever queued. Drain the receiver on another thread.
/// A hung-up receiver is ignored.
impl PartialSink for SyncSender<PartialRender> {
    fn publish(&mut self, progress: RenderProgress, frame: &Framebuffer) {
        let _ = self.send(PartialRender {
            progress,
            frame: frame.clone(),
        });
    }
}

/// Adapts a closure into a sink.
pub struct FnSink<F>(pub F);

impl<F> PartialSink for FnSink<F>
where
    F: FnMut(RenderProgress, &Framebuffer),
{
    fn publish(&mut self, progress: RenderProgress, frame: &Framebuffer) {
        (self.0)(progress, frame)
    }
}

impl<T: PartialSink + ?Sized> PartialSink for &mut T {
    fn publish(&mut self, progress: RenderProgress, frame: &Framebuffer) {
        (**self).publish(progress, frame)
    }

    fn close(&mut self) {
        (**self).close()
    }
}
