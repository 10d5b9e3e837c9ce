use super::*;
use crate::client::test_helpers::*;
use crate::config::OverlayPolicy;
use crate::types::{Event, NotificationKind, Variant};
use std::time::Duration;


/// Drain every event currently buffered in `rx`
fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Messages of the mounted notifications of the given kind, oldest first
fn notifications_of(client: &AudioClient, kind: NotificationKind) -> Vec<String> {
    client
        .surface()
        .notifications()
        .into_iter()
        .filter(|n| n.notification.kind == kind)
        .map(|n| n.notification.message)
        .collect()
}
