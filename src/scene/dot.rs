use serde::{Deserialize, Serialize};

use crate::{
    compose::stage::ElementId,
    foundation::core::{Rgba8, Vec2},
};

/// Default fill for dots that do not specify one.
pub const DEFAULT_COLOR: Rgba8 = Rgba8::rgb(0x1f, 0x29, 0x37);
/// Default accent that `color_mix` blends toward.
pub const DEFAULT_ACCENT: Rgba8 = Rgba8::rgb(0xf9, 0x73, 0x16);
/// Default dot diameter in pixels.
pub const DEFAULT_SIZE: f64 = 24.0;

/// Which slot a primary dot occupies on the ellipse depth orbit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EllipseRole {
    /// Rides the ellipse at its current angle.
    Lead,
    /// Rides opposite the lead, with drift and a slightly smaller radius.
    Trail,
}

/// State of one animated dot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Dot {
    /// Registry key.
    pub id: String,
    /// Base position as a fraction of the reference rectangle's width/height,
    /// relative to its center.
    pub base: Vec2,
    /// Pixel offset added to the base position.
    pub offset: Vec2,
    /// Base diameter in pixels.
    pub size: f64,
    /// Uniform scale.
    pub scale: f64,
    /// Horizontal stretch.
    pub scale_x: f64,
    /// Vertical stretch.
    pub scale_y: f64,
    /// Angle offset on the shared orbit, and the satellite angle for dots with a parent (degrees).
    pub orbit_angle: f64,
    /// Satellite orbit radius in pixels.
    pub orbit_radius: f64,
    /// Satellite angle advance per rendered frame (degrees).
    pub angular_speed: f64,
    /// Weight of the shared-orbit phase drift; `0` disables drift.
    pub phase_drift: f64,
    /// Primary fill color.
    pub color: Rgba8,
    /// Accent color.
    pub accent: Rgba8,
    /// Blend from `color` (0) to `accent` (1).
    pub color_mix: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Parent dot for satellites.
    pub parent: Option<String>,
    /// Ellipse depth slot; only the two primary dots carry one.
    pub role: Option<EllipseRole>,
    /// Presentation element this dot writes to.
    pub element: ElementId,
    /// Anchor dots are bound to pre-existing elements and survive teardown.
    pub anchor: bool,
}

impl Dot {
    /// Build a dot by merging `attrs` over the defaults.
    pub fn new(id: impl Into<String>, attrs: DotAttrs, element: ElementId, anchor: bool) -> Self {
        let mut dot = Self {
            id: id.into(),
            base: Vec2::ZERO,
            offset: Vec2::ZERO,
            size: DEFAULT_SIZE,
            scale: 1.0,
            scale_x: 1.0,
            scale_y: 1.0,
            orbit_angle: 0.0,
            orbit_radius: 0.0,
            angular_speed: 0.0,
            phase_drift: 0.0,
            color: DEFAULT_COLOR,
            accent: DEFAULT_ACCENT,
            color_mix: 0.0,
            opacity: 1.0,
            parent: None,
            role: None,
            element,
            anchor,
        };
        attrs.apply_to(&mut dot);
        dot
    }

    /// Fill color after applying `color_mix`.
    pub fn fill(&self) -> Rgba8 {
        self.color.mix(self.accent, self.color_mix)
    }

    /// Snapshot every attribute so the dot can be re-created elsewhere.
    pub fn attrs(&self) -> DotAttrs {
        DotAttrs {
            base: Some(self.base),
            offset: Some(self.offset),
            size: Some(self.size),
            scale: Some(self.scale),
            scale_x: Some(self.scale_x),
            scale_y: Some(self.scale_y),
            orbit_angle: Some(self.orbit_angle),
            orbit_radius: Some(self.orbit_radius),
            angular_speed: Some(self.angular_speed),
            phase_drift: Some(self.phase_drift),
            color: Some(self.color),
            accent: Some(self.accent),
            color_mix: Some(self.color_mix),
            opacity: Some(self.opacity),
            parent: self.parent.clone(),
            role: self.role,
        }
    }
}

/// Partial dot attributes, merged over defaults on creation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DotAttrs {
    /// See [`Dot::base`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<Vec2>,
    /// See [`Dot::offset`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<Vec2>,
    /// See [`Dot::size`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    /// See [`Dot::scale`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    /// See [`Dot::scale_x`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_x: Option<f64>,
    /// See [`Dot::scale_y`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_y: Option<f64>,
    /// See [`Dot::orbit_angle`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orbit_angle: Option<f64>,
    /// See [`Dot::orbit_radius`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orbit_radius: Option<f64>,
    /// See [`Dot::angular_speed`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angular_speed: Option<f64>,
    /// See [`Dot::phase_drift`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_drift: Option<f64>,
    /// See [`Dot::color`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgba8>,
    /// See [`Dot::accent`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<Rgba8>,
    /// See [`Dot::color_mix`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_mix: Option<f64>,
    /// See [`Dot::opacity`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// See [`Dot::parent`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// See [`Dot::role`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<EllipseRole>,
}

impl DotAttrs {
    /// Overwrite every field of `dot` that is set here.
    pub fn apply_to(self, dot: &mut Dot) {
        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = self.$field { dot.$field = v; })*
            };
        }
        merge!(
            base,
            offset,
            size,
            scale,
            scale_x,
            scale_y,
            orbit_angle,
            orbit_radius,
            angular_speed,
            phase_drift,
            color,
            accent,
            color_mix,
            opacity,
        );
        if self.parent.is_some() {
            dot.parent = self.parent;
        }
        if self.role.is_some() {
            dot.role = self.role;
        }
    }

    /// Fill unset colors from a palette.
    pub fn with_palette_defaults(mut self, color: Rgba8, accent: Rgba8) -> Self {
        if self.color.is_none() {
            self.color = Some(color);
        }
        if self.accent.is_none() {
            self.accent = Some(accent);
        }
        self
    }

    /// Reject non-finite numeric attributes.
    pub fn validate(&self) -> Result<(), String> {
        let scalars = [
            ("size", self.size),
            ("scale", self.scale),
            ("scale_x", self.scale_x),
            ("scale_y", self.scale_y),
            ("orbit_angle", self.orbit_angle),
            ("orbit_radius", self.orbit_radius),
            ("angular_speed", self.angular_speed),
            ("phase_drift", self.phase_drift),
            ("color_mix", self.color_mix),
            ("opacity", self.opacity),
        ];
        for (name, v) in scalars {
            if let Some(v) = v {
                if !v.is_finite() {
                    return Err(format!("dot attribute '{name}' must be finite"));
                }
            }
        }
        for (name, v) in [("base", self.base), ("offset", self.offset)] {
            if let Some(v) = v {
                if !v.is_finite() {
                    return Err(format!("dot attribute '{name}' must be finite"));
                }
            }
        }
        Ok(())
    }
}

/// Numeric dot fields addressable by tweens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DotField {
    /// `base.x`
    BaseX,
    /// `base.y`
    BaseY,
    /// `offset.x`
    OffsetX,
    /// `offset.y`
    OffsetY,
    /// `size`
    Size,
    /// `scale`
    Scale,
    /// `scale_x`
    ScaleX,
    /// `scale_y`
    ScaleY,
    /// `orbit_angle`
    OrbitAngle,
    /// `orbit_radius`
    OrbitRadius,
    /// `angular_speed`
    AngularSpeed,
    /// `color_mix`
    ColorMix,
    /// `opacity`
    Opacity,
}

impl DotField {
    /// Every addressable field.
    pub const ALL: [DotField; 13] = [
        DotField::BaseX,
        DotField::BaseY,
        DotField::OffsetX,
        DotField::OffsetY,
        DotField::Size,
        DotField::Scale,
        DotField::ScaleX,
        DotField::ScaleY,
        DotField::OrbitAngle,
        DotField::OrbitRadius,
        DotField::AngularSpeed,
        DotField::ColorMix,
        DotField::Opacity,
    ];

    /// Read this field from `dot`.
    pub fn get(self, dot: &Dot) -> f64 {
        match self {
            Self::BaseX => dot.base.x,
            Self::BaseY => dot.base.y,
            Self::OffsetX => dot.offset.x,
            Self::OffsetY => dot.offset.y,
            Self::Size => dot.size,
            Self::Scale => dot.scale,
            Self::ScaleX => dot.scale_x,
            Self::ScaleY => dot.scale_y,
            Self::OrbitAngle => dot.orbit_angle,
            Self::OrbitRadius => dot.orbit_radius,
            Self::AngularSpeed => dot.angular_speed,
            Self::ColorMix => dot.color_mix,
            Self::Opacity => dot.opacity,
        }
    }

    /// Write this field on `dot`.
    pub fn set(self, dot: &mut Dot, v: f64) {
        match self {
            Self::BaseX => dot.base.x = v,
            Self::BaseY => dot.base.y = v,
            Self::OffsetX => dot.offset.x = v,
            Self::OffsetY => dot.offset.y = v,
            Self::Size => dot.size = v,
            Self::Scale => dot.scale = v,
            Self::ScaleX => dot.scale_x = v,
            Self::ScaleY => dot.scale_y = v,
            Self::OrbitAngle => dot.orbit_angle = v,
            Self::OrbitRadius => dot.orbit_radius = v,
            Self::AngularSpeed => dot.angular_speed = v,
            Self::ColorMix => dot.color_mix = v,
            Self::Opacity => dot.opacity = v,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/dot.rs"]
mod tests;
