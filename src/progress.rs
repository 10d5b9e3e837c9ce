//! Progress overlays for running downloads
//!
//! [`ProgressReporter::open`] mounts an overlay and returns the [`ProgressHandle`] that owns
//! it. Updates and the final close go through the handle; dropping it closes the overlay, so
//! an overlay never outlives its job.
//!
//! Under [`OverlayPolicy::Shared`] every overlay carries the same key and handles address
//! "the first overlay with that key" rather than their own, which reproduces a page with a
//! single fixed overlay: concurrent jobs overwrite each other and the first close removes
//! the oldest overlay. Each handle still removes exactly one overlay, so none leak.

use crate::config::OverlayPolicy;
use crate::surface::{ElementId, OverlayTarget, Surface};
use crate::types::{ProgressState, Variant};

/// Text shown when an overlay opens
pub const STARTING_TEXT: &str = "Starting...";

/// Opens progress overlays on a surface
#[derive(Clone, Debug)]
pub struct ProgressReporter {
    surface: Surface,
    policy: OverlayPolicy,
}

impl ProgressReporter {
    /// Create a reporter with the given overlay policy
    pub fn new(surface: Surface, policy: OverlayPolicy) -> Self {
        Self { surface, policy }
    }

    /// Mount an overlay for a `variant` download of `title`, at "Starting..." / 0%
    pub fn open(&self, title: &str, variant: Variant) -> ProgressHandle {
        let shared = self.policy == OverlayPolicy::Shared;
        let id = self.surface.mount_overlay(
            shared,
            format!("{} download", variant.label()),
            title.to_string(),
            ProgressState::new(STARTING_TEXT, 0),
        );
        tracing::debug!(overlay = %id, variant = %variant, shared, "opened progress overlay");

        let target = if shared {
            OverlayTarget::Shared
        } else {
            OverlayTarget::Element(id)
        };

        ProgressHandle {
            surface: self.surface.clone(),
            id,
            target,
            closed: false,
        }
    }
}

/// Owns one progress overlay; closes it when dropped
#[derive(Debug)]
pub struct ProgressHandle {
    surface: Surface,
    id: ElementId,
    target: OverlayTarget,
    closed: bool,
}

impl ProgressHandle {
    /// ID of the overlay this handle mounted
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Set the status text and percentage (clamped to 100)
    pub fn update(&self, text: &str, percentage: u8) {
        if !self
            .surface
            .update_overlay(self.target, ProgressState::new(text, percentage))
        {
            tracing::debug!(overlay = %self.id, text, "progress update found no overlay");
        }
    }

    /// Current state of the overlay this handle addresses
    pub fn state(&self) -> Option<ProgressState> {
        self.surface.overlay_progress(self.target)
    }

    /// Close the overlay
    pub fn close(mut self) {
        self.close_overlay();
    }

    fn close_overlay(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if !self.surface.remove_overlay(self.target) {
            tracing::debug!(overlay = %self.id, "overlay already closed");
        }
    }
}

impl Drop for ProgressHandle {
    fn drop(&mut self) {
        self.close_overlay();
    }
}
