use serde::{Deserialize, Serialize};

use crate::foundation::core::{Layout, Point, Vec2};

/// Shared circular motion driving every root-level dot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalOrbit {
    /// Angle in degrees; unbounded, wraps through the trigonometry.
    pub angle: f64,
    /// Radius in pixels; negative values are treated as zero.
    pub radius: f64,
}

/// Second, elliptical orbit used for the depth illusion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EllipseOrbit {
    /// Center as a fraction of the viewport.
    pub center: Vec2,
    /// Horizontal radius in pixels.
    pub radius_x: f64,
    /// Vertical radius in pixels.
    pub radius_y: f64,
    /// Strength of the near/far size modulation, in `[0, 1]`.
    pub depth_scale: f64,
    /// Current rotation in degrees.
    pub angle: f64,
}

impl Default for EllipseOrbit {
    fn default() -> Self {
        Self {
            center: Vec2::new(0.5, 0.5),
            radius_x: 160.0,
            radius_y: 48.0,
            depth_scale: 0.35,
            angle: 0.0,
        }
    }
}

impl EllipseOrbit {
    /// Ellipse center in viewport pixels.
    pub fn center_in(&self, layout: &Layout) -> Point {
        Point::new(
            layout.viewport.width * self.center.x,
            layout.viewport.height * self.center.y,
        )
    }
}

/// Constants that keep the two-body motion from looking mechanically opposed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitTuning {
    /// Peak shared-orbit drift in degrees, scaled per dot by `phase_drift`.
    pub orbit_drift_deg: f64,
    /// Drift cycles per radian of shared-orbit angle.
    pub orbit_drift_rate: f64,
    /// Peak trail-dot drift on the ellipse, in radians.
    pub ellipse_drift_rad: f64,
    /// Drift cycles per radian of ellipse angle.
    pub ellipse_drift_rate: f64,
    /// Multiplier applied to the trail dot's ellipse radii.
    pub trail_radius_scale: f64,
}

impl Default for OrbitTuning {
    fn default() -> Self {
        Self {
            orbit_drift_deg: 6.0,
            orbit_drift_rate: 0.5,
            ellipse_drift_rad: 0.12,
            ellipse_drift_rate: 0.35,
            trail_radius_scale: 0.94,
        }
    }
}

impl OrbitTuning {
    /// Shared-orbit drift in degrees for a dot with the given drift weight.
    pub fn orbit_drift(&self, weight: f64, global_angle_deg: f64) -> f64 {
        if weight == 0.0 {
            return 0.0;
        }
        let phase = global_angle_deg.to_radians() * self.orbit_drift_rate;
        weight * self.orbit_drift_deg * phase.sin()
    }

    /// Extra phase for the trail dot on the ellipse, in radians.
    pub fn ellipse_drift(&self, ellipse_angle_deg: f64) -> f64 {
        self.ellipse_drift_rad * (ellipse_angle_deg.to_radians() * self.ellipse_drift_rate).sin()
    }

    /// Reject non-finite or degenerate tuning.
    pub fn validate(&self) -> Result<(), String> {
        let all = [
            self.orbit_drift_deg,
            self.orbit_drift_rate,
            self.ellipse_drift_rad,
            self.ellipse_drift_rate,
            self.trail_radius_scale,
        ];
        if all.iter().any(|v| !v.is_finite()) {
            return Err("orbit tuning values must be finite".to_owned());
        }
        if self.trail_radius_scale <= 0.0 {
            return Err("trail_radius_scale must be > 0".to_owned());
        }
        Ok(())
    }
}

/// Global orbit fields addressable by tweens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrbitField {
    /// [`GlobalOrbit::angle`]
    Angle,
    /// [`GlobalOrbit::radius`]
    Radius,
}

/// Ellipse fields addressable by tweens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EllipseField {
    /// `center.x`
    CenterX,
    /// `center.y`
    CenterY,
    /// [`EllipseOrbit::radius_x`]
    RadiusX,
    /// [`EllipseOrbit::radius_y`]
    RadiusY,
    /// [`EllipseOrbit::depth_scale`]
    DepthScale,
    /// [`EllipseOrbit::angle`]
    Angle,
}

impl OrbitField {
    pub(crate) fn get(self, o: &GlobalOrbit) -> f64 {
        match self {
            Self::Angle => o.angle,
            Self::Radius => o.radius,
        }
    }

    pub(crate) fn set(self, o: &mut GlobalOrbit, v: f64) {
        match self {
            Self::Angle => o.angle = v,
            Self::Radius => o.radius = v,
        }
    }
}

impl EllipseField {
    pub(crate) fn get(self, e: &EllipseOrbit) -> f64 {
        match self {
            Self::CenterX => e.center.x,
            Self::CenterY => e.center.y,
            Self::RadiusX => e.radius_x,
            Self::RadiusY => e.radius_y,
            Self::DepthScale => e.depth_scale,
            Self::Angle => e.angle,
        }
    }

    pub(crate) fn set(self, e: &mut EllipseOrbit, v: f64) {
        match self {
            Self::CenterX => e.center.x = v,
            Self::CenterY => e.center.y = v,
            Self::RadiusX => e.radius_x = v,
            Self::RadiusY => e.radius_y = v,
            Self::DepthScale => e.depth_scale = v,
            Self::Angle => e.angle = v,
        }
    }
}
