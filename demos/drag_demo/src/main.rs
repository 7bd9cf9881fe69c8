// Copyright 2026 the Stagehand Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated editor session that exercises the scene notification pipeline.
//!
//! Builds a `root → arm → hand` chain, drags the hand through world space the
//! way a manipulator would, spins the root through an Euler edit, then moves
//! the hand under a second parent. Every notification goes to both a
//! [`PrettyPrintObserver`](stagehand_debug::pretty::PrettyPrintObserver) on
//! stdout and a [`RecordingObserver`](stagehand_debug::recorder::RecordingObserver),
//! whose events are exported as JSON.
//!
//! Usage: `drag_demo [OUTPUT]` (default `drag_events.json`). Set `RUST_LOG`
//! to see the core's diagnostics, e.g. `RUST_LOG=stagehand_core=debug`.

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;

use stagehand_core::bounds::Aabb3;
use stagehand_core::node::{GroupNode, InstanceNode};
use stagehand_core::property::PropertyKind;
use stagehand_core::quat::Quat;
use stagehand_core::scene::{PropertyEdit, SceneGraph};
use stagehand_core::vector::Vec3;

use stagehand_debug::pretty::PrettyPrintObserver;
use stagehand_debug::recorder::RecordingObserver;
use stagehand_debug::tee::Tee;

const DRAG_STEPS: u32 = 8;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "drag_events.json".to_string());

    let observer = Tee::new(
        PrettyPrintObserver::new(Box::new(std::io::stdout())),
        RecordingObserver::new(),
    );
    let mut scene = SceneGraph::new(observer);

    // -- build -------------------------------------------------------------
    let root = scene.create_node(GroupNode::new("root"));
    let arm = scene.create_node(GroupNode::new("arm"));
    let hand = scene.create_node(InstanceNode::new("/props/hand.model"));
    let shelf = scene.create_node(GroupNode::new("shelf"));
    scene.add_node(root, arm)?;
    scene.add_node(arm, hand)?;
    scene.set_local_translation(arm, Vec3::new(2.0, 0.0, 0.0));
    scene.set_local_rotation(arm, Quat::from_axis_angle(Vec3::Z, 0.5));
    scene.set_local_translation(hand, Vec3::new(1.0, 0.0, 0.0));
    scene.set_local_translation(shelf, Vec3::new(0.0, 0.0, 4.0));
    scene.set_local_bounds(
        hand,
        Aabb3::new(Vec3::new(-0.1, -0.1, -0.1), Vec3::new(0.1, 0.1, 0.1)),
    );

    // -- drag the hand in world space ---------------------------------------
    let start = scene.nodes().world_translation(hand);
    let target = Vec3::new(3.0, 3.0, 0.0);
    for step in 1..=DRAG_STEPS {
        let t = f64::from(step) / f64::from(DRAG_STEPS);
        let at = start + (target - start) * t;
        scene.edit_property(hand, PropertyEdit::WorldTranslation(at));
    }

    // -- rotate the root from the property panel ------------------------------
    scene.edit_property(root, PropertyEdit::Euler(Vec3::new(0.0, 0.0, 90.0)));

    // -- move the hand onto the shelf --------------------------------------
    scene.set_parent(hand, shelf)?;

    if let Some(bounds) = scene
        .read_property(hand, PropertyKind::WorldBounds)
        .and_then(|v| v.as_bounds())
    {
        log::info!("hand world bounds {:?}..{:?}", bounds.min, bounds.max);
    }

    // -- export -------------------------------------------------------------
    let (_, observer) = scene.into_parts();
    let (_, recorder) = observer.into_inner();
    let file = File::create(&path)?;
    let mut writer = BufWriter::new(file);
    stagehand_debug::json::export(recorder.events(), &mut writer)?;

    println!(
        "Wrote {path} ({} events: {})",
        recorder.events().len(),
        stagehand_debug::json::summary(recorder.events())
    );
    Ok(())
}
