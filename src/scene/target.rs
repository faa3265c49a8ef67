use serde::{Deserialize, Serialize};

use crate::scene::{
    Scene,
    dot::DotField,
    orbit::{EllipseField, OrbitField},
};

/// A numeric scene property a tween can drive.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    /// A field on one dot.
    Dot {
        /// Dot id.
        id: String,
        /// Field on that dot.
        field: DotField,
    },
    /// A field of the shared orbit.
    Orbit {
        /// Orbit field.
        field: OrbitField,
    },
    /// A field of the ellipse depth orbit.
    Ellipse {
        /// Ellipse field.
        field: EllipseField,
    },
    /// The ellipse blend scalar.
    Blend,
}

impl Target {
    /// Shorthand for [`Target::Dot`].
    pub fn dot(id: impl Into<String>, field: DotField) -> Self {
        Self::Dot {
            id: id.into(),
            field,
        }
    }

    /// Shorthand for [`Target::Orbit`].
    pub fn orbit(field: OrbitField) -> Self {
        Self::Orbit { field }
    }

    /// Shorthand for [`Target::Ellipse`].
    pub fn ellipse(field: EllipseField) -> Self {
        Self::Ellipse { field }
    }

    /// Dot id for dot targets.
    pub fn dot_id(&self) -> Option<&str> {
        match self {
            Self::Dot { id, .. } => Some(id),
            _ => None,
        }
    }
}

impl Scene {
    /// Current value of `target`, or `None` when it names a missing dot.
    pub fn read(&self, target: &Target) -> Option<f64> {
        match target {
            Target::Dot { id, field } => self.dots.get(id).map(|d| field.get(d)),
            Target::Orbit { field } => Some(field.get(&self.orbit)),
            Target::Ellipse { field } => Some(field.get(&self.ellipse)),
            Target::Blend => Some(self.blend),
        }
    }

    /// Write `v` to `target`; returns `false` when it names a missing dot.
    pub fn write(&mut self, target: &Target, v: f64) -> bool {
        match target {
            Target::Dot { id, field } => match self.dots.get_mut(id) {
                Some(d) => {
                    field.set(d, v);
                    true
                }
                None => false,
            },
            Target::Orbit { field } => {
                field.set(&mut self.orbit, v);
                true
            }
            Target::Ellipse { field } => {
                field.set(&mut self.ellipse, v);
                true
            }
            Target::Blend => {
                self.blend = v;
                true
            }
        }
    }
}
