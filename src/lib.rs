//! dotorbit drives a scroll-linked logo animation built from a handful of dots.
//!
//! Two anchor dots wiggle, spin up onto a shared orbit, split into four, gain a satellite,
//! merge back, and finally settle onto an elliptical orbit that fakes depth by scaling and
//! restacking them. Everything is deterministic for a given scroll offset.
//!
//! # Pipeline overview
//!
//! 1. **Choreograph**: `ChoreographyDef -> Timeline + ScrollMap` (tweens and spawn/despawn cues)
//! 2. **Tick**: `scroll px -> time -> Scene` (scrub-safe in both directions)
//! 3. **Compose**: `Scene + Layout -> Frame` (per-dot center, size, opacity, fill, stacking)
//! 4. **Present**: `Frame -> Stage` ([`RecordingStage`] in memory, [`CpuStage`] to pixels)
//!
//! [`LogoEffect`] wires these together and owns the init/cleanup lifecycle.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Explicit context**: all animation state lives in a [`Scene`]; there are no globals.
//! - **Total compositor**: composing a frame never fails, whatever the scene holds.
//! - **Premultiplied RGBA8** from the raster stage.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod choreo;
mod compose;
mod config;
mod effect;
mod foundation;
mod render;
mod scene;

pub use animation::ease::Ease;
pub use choreo::compound::{
    IMPACT_STRETCH, MergeSpec, RetractSpec, SPLIT_STRETCH, SatelliteSpec, SplitSpec, WiggleSpec,
    merge, retract, satellite, split, wiggle,
};
pub use choreo::script::{ChoreographyDef, DEFAULT_SCROLL_SPAN, StepDef};
pub use choreo::scroll::{ScrollMap, TriggerRegion};
pub use choreo::timeline::{Cue, CueAction, Timeline, Tween};
pub use compose::compositor::{
    Compositor, DotFrame, EllipseSample, Frame, ORBIT_TAKEOVER_RADIUS, Z_BACK, Z_BASE, Z_FRONT,
};
pub use compose::stage::{ElementId, HostEvent, ListenerId, RecordingStage, Stage};
pub use config::{AnchorDef, EffectConfig, LEAD_ID, Palette, TRAIL_ID};
pub use effect::LogoEffect;
pub use foundation::core::{Affine, Layout, Point, Rect, Rgba8, Size, Vec2};
pub use foundation::error::{DotError, DotResult};
pub use render::cpu::{CpuStage, FrameRGBA};
pub use scene::Scene;
pub use scene::dot::{
    DEFAULT_ACCENT, DEFAULT_COLOR, DEFAULT_SIZE, Dot, DotAttrs, DotField, EllipseRole,
};
pub use scene::orbit::{EllipseField, EllipseOrbit, GlobalOrbit, OrbitField, OrbitTuning};
pub use scene::registry::{DotRegistry, MAX_PARENT_DEPTH};
pub use scene::target::Target;
