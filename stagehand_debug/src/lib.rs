// Copyright 2026 the Stagehand Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and JSON export for stagehand scene
//! notifications.
//!
//! This crate provides [`SceneObserver`](stagehand_core::scene::SceneObserver)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintObserver`]: human-readable one-line-per-event output.
//! - [`recorder::RecordingObserver`]: keeps every notification as a
//!   [`recorder::SceneEvent`] with a snapshot of the node's state.
//! - [`json::export`]: writes recorded events as a JSON array.
//! - [`tee::Tee`]: fans notifications out to two observers.

pub mod json;
pub mod pretty;
pub mod recorder;
pub mod tee;
