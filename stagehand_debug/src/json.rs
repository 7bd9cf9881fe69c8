// Copyright 2026 the Stagehand Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON export of recorded notifications.
//!
//! [`export`] writes the events of a
//! [`RecordingObserver`](crate::recorder::RecordingObserver) as a JSON array,
//! one object per event, tagged by an `"event"` field.

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::SceneEvent;

/// Writes `events` as a pretty-printed JSON array followed by a newline.
pub fn export(events: &[SceneEvent], writer: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, events)?;
    writeln!(writer)
}

/// Summarizes `events` as a JSON object: the total count and a count per
/// event type.
#[must_use]
pub fn summary(events: &[SceneEvent]) -> Value {
    let count = |pred: fn(&SceneEvent) -> bool| events.iter().filter(|e| pred(e)).count();
    json!({
        "events": events.len(),
        "node_added": count(|e| matches!(e, SceneEvent::NodeAdded { .. })),
        "node_removed": count(|e| matches!(e, SceneEvent::NodeRemoved { .. })),
        "node_reparented": count(|e| matches!(e, SceneEvent::NodeReparented { .. })),
        "transform_changed": count(|e| matches!(e, SceneEvent::TransformChanged { .. })),
        "property_changed": count(|e| matches!(e, SceneEvent::PropertyChanged { .. })),
    })
}
