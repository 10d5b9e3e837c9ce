//! Custom test assertions for integration tests

use std::time::Duration;
use audio_dl::{AudioClient, Event, NotificationKind};
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::RecvError;

/// Result of waiting for a download outcome
#[derive(Debug)]
pub enum WaitResult {
    /// The job completed (overlay closed, success notification shown)
    Completed,
    /// The job failed with error
    Failed(String),
    /// Timeout waiting for an outcome
    Timeout,
    /// Channel closed unexpectedly
    ChannelClosed,
}

/// Wait for the next download to complete or fail
pub async fn wait_for_outcome(events: &mut Receiver<Event>, timeout: Duration) -> WaitResult {
    let result = tokio::time::timeout(timeout, async {
        loop {
            match events.recv().await {
                Ok(Event::DownloadComplete { .. }) => return WaitResult::Completed,
                Ok(Event::DownloadFailed { error, .. }) => return WaitResult::Failed(error),
                Ok(_) => continue,
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return WaitResult::ChannelClosed,
            }
        }
    })
    .await;

    result.unwrap_or(WaitResult::Timeout)
}

/// Collect events until `predicate` matches one (inclusive) or the timeout expires
pub async fn collect_events_until<F>(
    events: &mut Receiver<Event>,
    timeout: Duration,
    mut predicate: F,
) -> Vec<Event>
where
    F: FnMut(&Event) -> bool,
{
    let mut collected = Vec::new();
    let _ = tokio::time::timeout(timeout, async {
        while let Ok(event) = events.recv().await {
            let done = predicate(&event);
            collected.push(event);
            if done {
                break;
            }
        }
    })
    .await;
    collected
}

/// Messages of the currently mounted notifications of `kind`
pub fn notification_messages(client: &AudioClient, kind: NotificationKind) -> Vec<String> {
    client
        .surface()
        .notifications()
        .into_iter()
        .filter(|n| n.notification.kind == kind)
        .map(|n| n.notification.message)
        .collect()
}

/// Messages of every `Notified` event of `kind` in `events`
pub fn notified(events: &[Event], kind: NotificationKind) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Notified { message, kind: k } if *k == kind => Some(message.clone()),
            _ => None,
        })
        .collect()
}

/// Assert that no transient element is left on the surface
pub fn assert_surface_clean(client: &AudioClient) {
    let surface = client.surface();
    assert!(surface.overlays().is_empty(), "overlay leaked: {:?}", surface.overlays());
    assert!(surface.anchors().is_empty(), "save anchor leaked: {:?}", surface.anchors());
    assert_eq!(surface.object_url_count(), 0, "object URL leaked");
}
