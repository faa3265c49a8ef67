use std::{collections::BTreeSet, fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    choreo::script::ChoreographyDef,
    foundation::core::{Rgba8, Vec2},
    foundation::error::{DotError, DotResult},
    scene::{
        dot::{DEFAULT_ACCENT, DEFAULT_COLOR, DotAttrs, EllipseRole},
        orbit::{EllipseOrbit, OrbitTuning},
    },
};

/// Dot id of the lead anchor in the default configuration.
pub const LEAD_ID: &str = "dot1";
/// Dot id of the trail anchor in the default configuration.
pub const TRAIL_ID: &str = "dot2";

/// One pre-existing element the effect binds a dot to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnchorDef {
    /// Element name looked up through [`crate::Stage::find_anchor`].
    pub element: String,
    /// Registry id of the bound dot.
    pub dot_id: String,
    /// Initial attributes; unset colors come from the palette.
    #[serde(default)]
    pub attrs: DotAttrs,
}

/// Primary and accent colors for dots that do not set their own.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Fill color.
    pub primary: Rgba8,
    /// Color `color_mix` blends toward.
    pub accent: Rgba8,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: DEFAULT_COLOR,
            accent: DEFAULT_ACCENT,
        }
    }
}

/// Effect configuration boundary object.
///
/// Every field has a default, so `{}` is a valid configuration describing the
/// two-dot logo with the built-in choreography.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EffectConfig {
    /// Anchor elements, bound in order.
    pub anchors: Vec<AnchorDef>,
    /// Default colors.
    pub palette: Palette,
    /// Drift constants.
    pub tuning: OrbitTuning,
    /// Initial ellipse depth orbit.
    pub ellipse: EllipseOrbit,
    /// Inline choreography; `None` uses [`ChoreographyDef::canonical`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choreography: Option<ChoreographyDef>,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            anchors: vec![
                AnchorDef {
                    element: "logo-dot-1".to_owned(),
                    dot_id: LEAD_ID.to_owned(),
                    attrs: DotAttrs {
                        base: Some(Vec2::new(-0.02, 0.0)),
                        orbit_angle: Some(0.0),
                        phase_drift: Some(0.0),
                        role: Some(EllipseRole::Lead),
                        ..DotAttrs::default()
                    },
                },
                AnchorDef {
                    element: "logo-dot-2".to_owned(),
                    dot_id: TRAIL_ID.to_owned(),
                    attrs: DotAttrs {
                        base: Some(Vec2::new(0.02, 0.0)),
                        orbit_angle: Some(180.0),
                        phase_drift: Some(1.0),
                        role: Some(EllipseRole::Trail),
                        ..DotAttrs::default()
                    },
                },
            ],
            palette: Palette::default(),
            tuning: OrbitTuning::default(),
            ellipse: EllipseOrbit::default(),
            choreography: None,
        }
    }
}

impl EffectConfig {
    /// Parse and validate a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> DotResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| DotError::validation(format!("parse effect config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse and validate a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> DotResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            DotError::validation(format!("open effect config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check anchors, tuning and ellipse ranges.
    pub fn validate(&self) -> DotResult<()> {
        if self.anchors.is_empty() {
            return Err(DotError::validation("at least one anchor is required"));
        }
        let mut elements = BTreeSet::new();
        let mut ids = BTreeSet::new();
        for a in &self.anchors {
            if a.element.trim().is_empty() || a.dot_id.trim().is_empty() {
                return Err(DotError::validation(
                    "anchor element and dot_id must be non-empty",
                ));
            }
            if !elements.insert(a.element.as_str()) {
                return Err(DotError::validation(format!(
                    "anchor element '{}' is listed twice",
                    a.element
                )));
            }
            if !ids.insert(a.dot_id.as_str()) {
                return Err(DotError::validation(format!(
                    "anchor dot id '{}' is listed twice",
                    a.dot_id
                )));
            }
            a.attrs
                .validate()
                .map_err(|e| DotError::validation(format!("anchor '{}': {e}", a.dot_id)))?;
        }
        self.tuning.validate().map_err(DotError::validation)?;

        let e = &self.ellipse;
        let finite = [e.center.x, e.center.y, e.radius_x, e.radius_y, e.depth_scale, e.angle]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(DotError::validation("ellipse values must be finite"));
        }
        if e.radius_x < 0.0 || e.radius_y < 0.0 {
            return Err(DotError::validation("ellipse radii must be >= 0"));
        }
        if !(0.0..=1.0).contains(&e.depth_scale) {
            return Err(DotError::validation("ellipse depth_scale must be in [0, 1]"));
        }
        Ok(())
    }

    /// Element names the effect needs before it can start.
    pub fn anchor_names(&self) -> impl Iterator<Item = &str> {
        self.anchors.iter().map(|a| a.element.as_str())
    }

    /// Inline choreography, or the built-in one.
    pub fn choreography(&self) -> ChoreographyDef {
        self.choreography
            .clone()
            .unwrap_or_else(ChoreographyDef::canonical)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
