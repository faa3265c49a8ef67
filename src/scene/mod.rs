pub(crate) mod dot;
pub(crate) mod orbit;
pub(crate) mod registry;
pub(crate) mod target;

use crate::scene::{
    orbit::{EllipseOrbit, GlobalOrbit},
    registry::DotRegistry,
};

/// Explicit animation context shared by the compositor and the choreography driver.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    /// Entity registry.
    pub dots: DotRegistry,
    /// Shared circular orbit.
    pub orbit: GlobalOrbit,
    /// Ellipse depth orbit.
    pub ellipse: EllipseOrbit,
    /// Raw ellipse blend scalar; read it through [`Scene::blend`].
    pub blend: f64,
}

impl Scene {
    /// Empty scene with the given ellipse state.
    pub fn new(ellipse: EllipseOrbit) -> Self {
        Self {
            ellipse,
            ..Self::default()
        }
    }

    /// Blend scalar clamped to `[0, 1]`; non-finite values read as `0`.
    pub fn blend(&self) -> f64 {
        if self.blend.is_finite() {
            self.blend.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/scene.rs"]
mod tests;
