//! Multi-dot choreography builders.
//!
//! Each builder appends tweens and cues to a [`Timeline`] starting at the step's `at`
//! and returns the time the operation completes. Starting values are sampled from the
//! timeline as built so far, so builders compose in the order they are called.

use serde::{Deserialize, Serialize};

use crate::{
    animation::ease::Ease,
    choreo::timeline::{CueAction, Timeline, Tween},
    foundation::core::Vec2,
    foundation::error::{DotError, DotResult},
    scene::{
        Scene,
        dot::{Dot, DotAttrs, DotField},
        target::Target,
    },
};

/// Horizontal stretch applied while a dot splits or absorbs another.
pub const SPLIT_STRETCH: (f64, f64) = (1.35, 0.75);
/// Stretch on merge impact.
pub const IMPACT_STRETCH: (f64, f64) = (1.3, 0.8);

fn default_split_distance() -> f64 {
    28.0
}
fn default_axis() -> Vec2 {
    Vec2::new(1.0, 0.0)
}
fn default_stretch_duration() -> f64 {
    0.3
}
fn default_separate_duration() -> f64 {
    0.7
}
fn default_converge_duration() -> f64 {
    0.4
}
fn default_impact_duration() -> f64 {
    0.2
}
fn default_settle_duration() -> f64 {
    0.4
}
fn default_satellite_radius() -> f64 {
    36.0
}
fn default_angular_speed() -> f64 {
    2.0
}
fn default_satellite_size() -> f64 {
    8.0
}
fn default_fade_duration() -> f64 {
    0.4
}
fn default_wiggle_amplitude() -> f64 {
    10.0
}
fn default_wiggle_cycles() -> u32 {
    2
}
fn default_wiggle_period() -> f64 {
    0.5
}
fn default_wiggle_field() -> DotField {
    DotField::OffsetY
}

/// Split one dot into two.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitSpec {
    /// Dot being split.
    pub source: String,
    /// Id of the dot that emerges.
    pub new_id: String,
    /// Start time.
    pub at: f64,
    /// Final pixel distance between the two dots along `axis`.
    #[serde(default = "default_split_distance")]
    pub distance: f64,
    /// Separation direction; normalized, zero falls back to +x.
    #[serde(default = "default_axis")]
    pub axis: Vec2,
    /// Orbit-angle separation in degrees, split evenly between the two dots.
    #[serde(default)]
    pub angle_spread: f64,
    /// Stretch and fade-in phase length.
    #[serde(default = "default_stretch_duration")]
    pub stretch_duration: f64,
    /// Overshooting separation phase length.
    #[serde(default = "default_separate_duration")]
    pub separate_duration: f64,
}

/// Merge `absorb` into `keep`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MergeSpec {
    /// Dot that survives.
    pub keep: String,
    /// Dot that is despawned at the end. Must have been spawned by a cue.
    pub absorb: String,
    /// Start time.
    pub at: f64,
    /// Convergence phase length.
    #[serde(default = "default_converge_duration")]
    pub converge_duration: f64,
    /// Impact stretch phase length.
    #[serde(default = "default_impact_duration")]
    pub impact_duration: f64,
    /// Settle phase length.
    #[serde(default = "default_settle_duration")]
    pub settle_duration: f64,
}

/// Spawn a satellite orbiting a parent dot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SatelliteSpec {
    /// Parent dot.
    pub parent: String,
    /// Satellite id.
    pub id: String,
    /// Start time.
    pub at: f64,
    /// Final satellite orbit radius in pixels.
    #[serde(default = "default_satellite_radius")]
    pub radius: f64,
    /// Degrees advanced per rendered frame.
    #[serde(default = "default_angular_speed")]
    pub angular_speed: f64,
    /// Satellite diameter in pixels.
    #[serde(default = "default_satellite_size")]
    pub size: f64,
    /// Initial satellite angle in degrees.
    #[serde(default)]
    pub start_angle: f64,
    /// Fade-in length.
    #[serde(default = "default_fade_duration")]
    pub fade_duration: f64,
}

/// Fade out and despawn a cue-spawned dot, pulling satellites into their parent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetractSpec {
    /// Dot to retract.
    pub id: String,
    /// Start time.
    pub at: f64,
    /// Fade-out length.
    #[serde(default = "default_fade_duration")]
    pub duration: f64,
}

/// Oscillate one dot field around its current value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WiggleSpec {
    /// Dot to wiggle.
    pub id: String,
    /// Start time.
    pub at: f64,
    /// Field to oscillate.
    #[serde(default = "default_wiggle_field")]
    pub field: DotField,
    /// Peak deviation.
    #[serde(default = "default_wiggle_amplitude")]
    pub amplitude: f64,
    /// Number of full oscillations.
    #[serde(default = "default_wiggle_cycles")]
    pub cycles: u32,
    /// Length of one oscillation.
    #[serde(default = "default_wiggle_period")]
    pub period: f64,
}

fn check_durations(what: &str, at: f64, durations: &[f64]) -> DotResult<()> {
    if !at.is_finite() || durations.iter().any(|d| !d.is_finite() || *d < 0.0) {
        return Err(DotError::validation(format!(
            "{what}: times must be finite and durations >= 0"
        )));
    }
    Ok(())
}

fn snapshot(timeline: &Timeline, scene: &Scene, id: &str, at: f64, what: &str) -> DotResult<Dot> {
    timeline
        .dot_snapshot(id, at, scene)
        .ok_or_else(|| DotError::validation(format!("{what}: unknown dot '{id}'")))
}

/// One timed segment of a compound step on a single dot.
#[derive(Clone, Copy)]
struct Phase<'a> {
    id: &'a str,
    start: f64,
    duration: f64,
    ease: Ease,
}

impl<'a> Phase<'a> {
    fn new(id: &'a str, start: f64, duration: f64, ease: Ease) -> Self {
        Self {
            id,
            start,
            duration,
            ease,
        }
    }

    /// Push a tween of `field` from `from` to `to` over this segment.
    fn push(&self, timeline: &mut Timeline, field: DotField, from: f64, to: f64) {
        let target = Target::dot(self.id, field);
        let tween = Tween::new(target, to, self.start, self.duration, self.ease);
        timeline.push_tween(tween.from_value(from));
    }
}

/// Stretch `source`, fade in a copy, then push the two apart with an overshoot.
///
/// The copy reaches full opacity before the offsets start to diverge, and both dots
/// end with `scale_x == scale_y == 1`.
pub fn split(timeline: &mut Timeline, scene: &Scene, spec: &SplitSpec) -> DotResult<f64> {
    check_durations(
        "split",
        spec.at,
        &[spec.stretch_duration, spec.separate_duration],
    )?;
    if !spec.distance.is_finite() || !spec.angle_spread.is_finite() || !spec.axis.is_finite() {
        return Err(DotError::validation(
            "split: distance, axis and spread must be finite",
        ));
    }
    if spec.source == spec.new_id {
        return Err(DotError::validation("split: new_id must differ from source"));
    }
    if scene.dots.contains(&spec.new_id) || timeline.spawns(&spec.new_id) {
        return Err(DotError::validation(format!(
            "split: dot '{}' already exists",
            spec.new_id
        )));
    }
    let src = snapshot(timeline, scene, &spec.source, spec.at, "split")?;

    let at = spec.at;
    let t1 = at + spec.stretch_duration;
    let t2 = t1 + spec.separate_duration;

    // The copy never takes an ellipse slot; only the two primary dots hold one.
    let attrs = DotAttrs {
        opacity: Some(0.0),
        role: None,
        ..src.attrs()
    };
    timeline.push_cue(
        at,
        CueAction::Spawn {
            id: spec.new_id.clone(),
            attrs,
        },
    );

    let (sx, sy) = SPLIT_STRETCH;
    for id in [spec.source.as_str(), spec.new_id.as_str()] {
        let stretch = Phase::new(id, at, spec.stretch_duration, Ease::OutQuad);
        stretch.push(timeline, DotField::ScaleX, src.scale_x, sx);
        stretch.push(timeline, DotField::ScaleY, src.scale_y, sy);
        let release = Phase::new(id, t1, spec.separate_duration, Ease::OutBack);
        release.push(timeline, DotField::ScaleX, sx, 1.0);
        release.push(timeline, DotField::ScaleY, sy, 1.0);
    }
    Phase::new(&spec.new_id, at, spec.stretch_duration, Ease::Linear).push(
        timeline,
        DotField::Opacity,
        0.0,
        1.0,
    );

    let dir = if spec.axis.length() > 0.0 {
        spec.axis.normalize()
    } else {
        default_axis()
    };
    let half = dir * (spec.distance * 0.5);
    let spread = spec.angle_spread * 0.5;
    for (id, sign) in [(spec.source.as_str(), -1.0), (spec.new_id.as_str(), 1.0)] {
        let apart = Phase::new(id, t1, spec.separate_duration, Ease::OutBack);
        let (ox, oy) = (src.offset.x, src.offset.y);
        apart.push(timeline, DotField::OffsetX, ox, ox + sign * half.x);
        apart.push(timeline, DotField::OffsetY, oy, oy + sign * half.y);
        if spread != 0.0 {
            let a = src.orbit_angle;
            apart.push(timeline, DotField::OrbitAngle, a, a + sign * spread);
        }
    }

    tracing::debug!(
        source = %spec.source,
        new_id = %spec.new_id,
        at,
        end = t2,
        "split scheduled"
    );
    Ok(t2)
}

/// Converge two dots, stretch both on impact, settle `keep` and despawn `absorb`.
pub fn merge(timeline: &mut Timeline, scene: &Scene, spec: &MergeSpec) -> DotResult<f64> {
    check_durations(
        "merge",
        spec.at,
        &[
            spec.converge_duration,
            spec.impact_duration,
            spec.settle_duration,
        ],
    )?;
    if spec.keep == spec.absorb {
        return Err(DotError::validation("merge: keep and absorb must differ"));
    }
    if scene.dots.get(&spec.absorb).is_some_and(|d| d.anchor) {
        return Err(DotError::validation(format!(
            "merge: anchor dot '{}' cannot be absorbed",
            spec.absorb
        )));
    }
    if !timeline.spawns(&spec.absorb) {
        return Err(DotError::validation(format!(
            "merge: '{}' was not spawned by this choreography",
            spec.absorb
        )));
    }
    let keep = snapshot(timeline, scene, &spec.keep, spec.at, "merge")?;
    let absorb = snapshot(timeline, scene, &spec.absorb, spec.at, "merge")?;

    let at = spec.at;
    let t1 = at + spec.converge_duration;
    let t2 = t1 + spec.impact_duration;
    let t3 = t2 + spec.settle_duration;

    let keep_in = Phase::new(&spec.keep, at, spec.converge_duration, Ease::InQuad);
    let absorb_in = Phase::new(&spec.absorb, at, spec.converge_duration, Ease::InQuad);
    for field in [
        DotField::BaseX,
        DotField::BaseY,
        DotField::OffsetX,
        DotField::OffsetY,
    ] {
        let (k, a) = (field.get(&keep), field.get(&absorb));
        let mid = (k + a) * 0.5;
        keep_in.push(timeline, field, k, mid);
        absorb_in.push(timeline, field, a, mid);
    }
    // Meet on the shorter arc so the pair never sweeps the long way round.
    let delta = (absorb.orbit_angle - keep.orbit_angle + 180.0).rem_euclid(360.0) - 180.0;
    if delta != 0.0 {
        let k = keep.orbit_angle;
        let a = absorb.orbit_angle;
        keep_in.push(timeline, DotField::OrbitAngle, k, k + delta * 0.5);
        absorb_in.push(timeline, DotField::OrbitAngle, a, a - delta * 0.5);
    }

    let (ix, iy) = IMPACT_STRETCH;
    for (id, dot) in [(spec.keep.as_str(), &keep), (spec.absorb.as_str(), &absorb)] {
        let impact = Phase::new(id, t1, spec.impact_duration, Ease::OutQuad);
        impact.push(timeline, DotField::ScaleX, dot.scale_x, ix);
        impact.push(timeline, DotField::ScaleY, dot.scale_y, iy);
        let settle = Phase::new(id, t2, spec.settle_duration, Ease::OutBack);
        settle.push(timeline, DotField::ScaleX, ix, 1.0);
        settle.push(timeline, DotField::ScaleY, iy, 1.0);
    }
    Phase::new(&spec.absorb, t1, spec.impact_duration, Ease::Linear).push(
        timeline,
        DotField::Opacity,
        absorb.opacity,
        0.0,
    );
    timeline.push_cue(
        t3,
        CueAction::Despawn {
            id: spec.absorb.clone(),
        },
    );

    tracing::debug!(
        keep = %spec.keep,
        absorb = %spec.absorb,
        at,
        end = t3,
        "merge scheduled"
    );
    Ok(t3)
}

/// Spawn a satellite that fades in while its orbit radius grows from zero.
pub fn satellite(timeline: &mut Timeline, scene: &Scene, spec: &SatelliteSpec) -> DotResult<f64> {
    check_durations("satellite", spec.at, &[spec.fade_duration])?;
    let finite = [spec.radius, spec.angular_speed, spec.size, spec.start_angle]
        .iter()
        .all(|v| v.is_finite());
    if !finite || spec.radius < 0.0 || spec.size < 0.0 {
        return Err(DotError::validation(
            "satellite: radius and size must be finite and >= 0",
        ));
    }
    if spec.parent == spec.id {
        return Err(DotError::validation("satellite: id must differ from parent"));
    }
    if scene.dots.contains(&spec.id) || timeline.spawns(&spec.id) {
        return Err(DotError::validation(format!(
            "satellite: dot '{}' already exists",
            spec.id
        )));
    }
    let parent = snapshot(timeline, scene, &spec.parent, spec.at, "satellite")?;

    let attrs = DotAttrs {
        size: Some(spec.size),
        orbit_angle: Some(spec.start_angle),
        orbit_radius: Some(0.0),
        angular_speed: Some(spec.angular_speed),
        color: Some(parent.color),
        accent: Some(parent.accent),
        color_mix: Some(parent.color_mix),
        opacity: Some(0.0),
        parent: Some(spec.parent.clone()),
        ..DotAttrs::default()
    };
    timeline.push_cue(
        spec.at,
        CueAction::Spawn {
            id: spec.id.clone(),
            attrs,
        },
    );
    Phase::new(&spec.id, spec.at, spec.fade_duration, Ease::Linear).push(
        timeline,
        DotField::Opacity,
        0.0,
        1.0,
    );
    Phase::new(&spec.id, spec.at, spec.fade_duration, Ease::OutBack).push(
        timeline,
        DotField::OrbitRadius,
        0.0,
        spec.radius,
    );

    Ok(spec.at + spec.fade_duration)
}

/// Fade out a cue-spawned dot (collapsing any satellite radius) and despawn it.
pub fn retract(timeline: &mut Timeline, scene: &Scene, spec: &RetractSpec) -> DotResult<f64> {
    check_durations("retract", spec.at, &[spec.duration])?;
    if !timeline.spawns(&spec.id) {
        return Err(DotError::validation(format!(
            "retract: '{}' was not spawned by this choreography",
            spec.id
        )));
    }
    let dot = snapshot(timeline, scene, &spec.id, spec.at, "retract")?;
    let end = spec.at + spec.duration;
    let fade = Phase::new(&spec.id, spec.at, spec.duration, Ease::InQuad);
    fade.push(timeline, DotField::Opacity, dot.opacity, 0.0);
    if dot.parent.is_some() {
        fade.push(timeline, DotField::OrbitRadius, dot.orbit_radius, 0.0);
    }
    timeline.push_cue(
        end,
        CueAction::Despawn {
            id: spec.id.clone(),
        },
    );
    Ok(end)
}

/// Oscillate a field `amplitude` above and below its value, returning to it at the end.
pub fn wiggle(timeline: &mut Timeline, scene: &Scene, spec: &WiggleSpec) -> DotResult<f64> {
    check_durations("wiggle", spec.at, &[spec.period])?;
    if !spec.amplitude.is_finite() {
        return Err(DotError::validation("wiggle: amplitude must be finite"));
    }
    let dot = snapshot(timeline, scene, &spec.id, spec.at, "wiggle")?;
    let rest = spec.field.get(&dot);
    let q = spec.period * 0.25;
    let mut t = spec.at;
    for _ in 0..spec.cycles {
        let hi = rest + spec.amplitude;
        let lo = rest - spec.amplitude;
        let ease = Ease::InOutSine;
        Phase::new(&spec.id, t, q, ease).push(timeline, spec.field, rest, hi);
        Phase::new(&spec.id, t + q, 2.0 * q, ease).push(timeline, spec.field, hi, lo);
        Phase::new(&spec.id, t + 3.0 * q, q, ease).push(timeline, spec.field, lo, rest);
        t += spec.period;
    }
    Ok(t)
}

#[cfg(test)]
#[path = "../../tests/unit/choreo/compound.rs"]
mod tests;
