//! Short-lived, auto-dismissing status messages
//!
//! Each call to [`Notifier::show`] is independent: the element is appended to the surface,
//! forced through a reflow so the entrance transition is observable, kept visible for
//! `notification_visible`, then marked hiding and removed exactly `notification_fade`
//! later. There is no return value and no cancellation handle; notifications stack freely.

use crate::config::TimingConfig;
use crate::surface::{NotificationPhase, Surface};
use crate::timer::Scheduler;
use crate::types::{Event, Notification, NotificationKind};
use std::time::Duration;
use tokio::sync::broadcast;

/// Shows notifications on a surface
#[derive(Clone, Debug)]
pub struct Notifier {
    surface: Surface,
    scheduler: Scheduler,
    event_tx: broadcast::Sender<Event>,
    visible_for: Duration,
    fade: Duration,
}

impl Notifier {
    /// Create a notifier using the lifetimes from `timing`
    pub fn new(
        surface: Surface,
        scheduler: Scheduler,
        event_tx: broadcast::Sender<Event>,
        timing: &TimingConfig,
    ) -> Self {
        Self {
            surface,
            scheduler,
            event_tx,
            visible_for: timing.notification_visible,
            fade: timing.notification_fade,
        }
    }

    /// Show `message` with the given style
    ///
    /// Must be called from within a Tokio runtime (the dismissal is scheduled on it).
    pub fn show(&self, message: impl Into<String>, kind: NotificationKind) {
        let notification = Notification {
            message: message.into(),
            kind,
        };
        tracing::debug!(kind = %kind, message = %notification.message, "showing notification");

        let guard = self.surface.mount_notification(notification.clone());
        self.surface.reflow(guard.id());
        self.surface
            .set_notification_phase(guard.id(), NotificationPhase::Visible);

        // No subscribers is fine
        self.event_tx
            .send(Event::Notified {
                message: notification.message,
                kind,
            })
            .ok();

        let surface = self.surface.clone();
        let scheduler = self.scheduler.clone();
        let fade = self.fade;
        self.scheduler.schedule(self.visible_for, move || {
            surface.set_notification_phase(guard.id(), NotificationPhase::Hiding);
            // The guard removes the element when this second callback drops it
            scheduler.schedule(fade, move || drop(guard));
        });
    }

    /// Show an info notification
    pub fn info(&self, message: impl Into<String>) {
        self.show(message, NotificationKind::Info);
    }

    /// Show a success notification
    pub fn success(&self, message: impl Into<String>) {
        self.show(message, NotificationKind::Success);
    }

    /// Show an error notification
    pub fn error(&self, message: impl Into<String>) {
        self.show(message, NotificationKind::Error);
    }
}
