use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    animation::ease::Ease,
    choreo::{
        compound::{
            self, MergeSpec, RetractSpec, SatelliteSpec, SplitSpec, WiggleSpec,
        },
        scroll::{ScrollMap, TriggerRegion},
        timeline::{Cue, Timeline, Tween},
    },
    config::{LEAD_ID, TRAIL_ID},
    foundation::core::Vec2,
    foundation::error::{DotError, DotResult},
    scene::{
        Scene,
        dot::DotField,
        orbit::{EllipseField, OrbitField},
        target::Target,
    },
};

/// Scroll span used when a choreography declares no trigger regions.
pub const DEFAULT_SCROLL_SPAN: f64 = 1000.0;

/// One choreography step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StepDef {
    /// Plain tween.
    Tween(Tween),
    /// Plain spawn/despawn cue.
    Cue(Cue),
    /// See [`compound::wiggle`].
    Wiggle(WiggleSpec),
    /// See [`compound::split`].
    Split(SplitSpec),
    /// See [`compound::merge`].
    Merge(MergeSpec),
    /// See [`compound::satellite`].
    Satellite(SatelliteSpec),
    /// See [`compound::retract`].
    Retract(RetractSpec),
}

impl StepDef {
    fn apply(&self, timeline: &mut Timeline, scene: &Scene) -> DotResult<()> {
        match self {
            Self::Tween(t) => timeline.push_tween(t.clone()),
            Self::Cue(c) => timeline.push_cue(c.at, c.action.clone()),
            Self::Wiggle(s) => {
                compound::wiggle(timeline, scene, s)?;
            }
            Self::Split(s) => {
                compound::split(timeline, scene, s)?;
            }
            Self::Merge(s) => {
                compound::merge(timeline, scene, s)?;
            }
            Self::Satellite(s) => {
                compound::satellite(timeline, scene, s)?;
            }
            Self::Retract(s) => {
                compound::retract(timeline, scene, s)?;
            }
        }
        Ok(())
    }
}

/// Serializable choreography: trigger regions plus ordered steps.
///
/// Steps are applied in order, so compound steps see the state produced by the ones
/// before them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChoreographyDef {
    /// Scroll regions; empty maps `[0, DEFAULT_SCROLL_SPAN]` onto the whole timeline.
    #[serde(default)]
    pub regions: Vec<TriggerRegion>,
    /// Steps in application order.
    pub steps: Vec<StepDef>,
}

impl Default for ChoreographyDef {
    fn default() -> Self {
        Self::canonical()
    }
}

impl ChoreographyDef {
    /// Load from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> DotResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| DotError::serde(format!("choreography JSON parse failed: {e}")))
    }

    /// Load from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> DotResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            DotError::serde(format!(
                "failed to open choreography '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Built-in sequence: wiggle, orbit spin-up, split into four with a satellite,
    /// wind down and merge back to two, then the ellipse depth orbit.
    pub fn canonical() -> Self {
        let orbit = |field, to, start, duration, ease| {
            StepDef::Tween(Tween::new(Target::orbit(field), to, start, duration, ease))
        };
        let ellipse = |field, to, start, duration, ease| {
            StepDef::Tween(Tween::new(Target::ellipse(field), to, start, duration, ease))
        };
        let wiggle = |id: &str| {
            StepDef::Wiggle(WiggleSpec {
                id: id.to_owned(),
                at: 0.0,
                field: DotField::OffsetY,
                amplitude: 10.0,
                cycles: 2,
                period: 0.5,
            })
        };
        let split = |source: &str, new_id: &str, axis: Vec2| {
            StepDef::Split(SplitSpec {
                source: source.to_owned(),
                new_id: new_id.to_owned(),
                at: 3.0,
                distance: 28.0,
                axis,
                angle_spread: 40.0,
                stretch_duration: 0.3,
                separate_duration: 0.7,
            })
        };
        let merge = |keep: &str, absorb: &str| {
            StepDef::Merge(MergeSpec {
                keep: keep.to_owned(),
                absorb: absorb.to_owned(),
                at: 6.0,
                converge_duration: 0.4,
                impact_duration: 0.2,
                settle_duration: 0.4,
            })
        };

        let steps = vec![
            wiggle(LEAD_ID),
            wiggle(TRAIL_ID),
            orbit(OrbitField::Radius, 140.0, 1.0, 1.0, Ease::InOutCubic),
            orbit(OrbitField::Angle, 360.0, 1.0, 2.0, Ease::InOutQuad),
            split(LEAD_ID, "dot3", Vec2::new(1.0, 0.0)),
            split(TRAIL_ID, "dot4", Vec2::new(-1.0, 0.0)),
            StepDef::Satellite(SatelliteSpec {
                parent: LEAD_ID.to_owned(),
                id: "moon".to_owned(),
                at: 4.0,
                radius: 36.0,
                angular_speed: 2.0,
                size: 8.0,
                start_angle: 0.0,
                fade_duration: 0.4,
            }),
            orbit(OrbitField::Angle, 540.0, 4.0, 2.0, Ease::InOutQuad),
            orbit(OrbitField::Radius, 0.0, 5.0, 1.0, Ease::InOutCubic),
            StepDef::Retract(RetractSpec {
                id: "moon".to_owned(),
                at: 6.0,
                duration: 0.4,
            }),
            merge(LEAD_ID, "dot3"),
            merge(TRAIL_ID, "dot4"),
            StepDef::Tween(Tween::new(Target::Blend, 1.0, 7.0, 1.0, Ease::InOutSine)),
            StepDef::Tween(Tween::new(
                Target::dot(LEAD_ID, DotField::ColorMix),
                1.0,
                7.0,
                1.0,
                Ease::Linear,
            )),
            ellipse(EllipseField::Angle, 450.0, 7.0, 2.5, Ease::InOutSine),
        ];

        let region = |start_px, end_px, from_time, to_time| TriggerRegion {
            start_px,
            end_px,
            from_time,
            to_time,
        };
        Self {
            regions: vec![
                region(0.0, 800.0, 0.0, 3.0),
                region(800.0, 1600.0, 3.0, 7.0),
                region(1600.0, 2600.0, 7.0, 10.0),
            ],
            steps,
        }
    }

    /// Apply every step to a fresh timeline, seal it against `scene`, and build the
    /// scroll map.
    pub fn build(&self, scene: &Scene) -> DotResult<(Timeline, ScrollMap)> {
        let mut timeline = Timeline::new();
        for step in &self.steps {
            step.apply(&mut timeline, scene)?;
        }
        timeline.seal(scene)?;
        let scroll = if self.regions.is_empty() {
            ScrollMap::linear(DEFAULT_SCROLL_SPAN, timeline.duration())?
        } else {
            ScrollMap::new(self.regions.clone())?
        };
        Ok((timeline, scroll))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/choreo/script.rs"]
mod tests;
