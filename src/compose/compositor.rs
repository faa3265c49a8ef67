use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    compose::stage::{ElementId, Stage},
    foundation::core::{Affine, Layout, Point, Rgba8, Vec2},
    foundation::math::{deg_to_rad, lerp_point, wrap_degrees},
    scene::{
        Scene,
        dot::{Dot, EllipseRole},
        orbit::{EllipseOrbit, GlobalOrbit, OrbitTuning},
        registry::MAX_PARENT_DEPTH,
    },
};

/// Shared-orbit radius at which the orbit fully replaces the base position.
pub const ORBIT_TAKEOVER_RADIUS: f64 = 100.0;
/// Stacking order for dots outside the depth illusion.
pub const Z_BASE: i32 = 1;
/// Stacking order for the near ellipse dot once blend passes one half.
pub const Z_FRONT: i32 = 2;
/// Stacking order for the far ellipse dot once blend passes one half.
pub const Z_BACK: i32 = 0;

/// Composed visual attributes for one dot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DotFrame {
    /// Dot id.
    pub id: String,
    /// Element the attributes are written to.
    pub element: ElementId,
    /// Visual center in viewport pixels.
    pub center: Point,
    /// Bounding-box width.
    pub width: f64,
    /// Bounding-box height.
    pub height: f64,
    /// Translation placing the bounding box so that `center` is its center.
    pub transform: Affine,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Fill color after accent mixing.
    pub fill: Rgba8,
    /// Stacking order; higher paints on top.
    pub z: i32,
    /// Perspective size multiplier from the ellipse orbit (`1` outside it).
    pub depth: f64,
}

/// One composed frame, in registry (id) order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Frame {
    /// Per-dot attributes.
    pub dots: Vec<DotFrame>,
}

impl Frame {
    /// Find a dot's attributes by id.
    pub fn get(&self, id: &str) -> Option<&DotFrame> {
        self.dots.iter().find(|d| d.id == id)
    }
}

/// Position on the ellipse depth orbit for one primary dot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EllipseSample {
    /// Position on the ellipse.
    pub position: Point,
    /// Angle used for the position, in radians.
    pub theta: f64,
    /// Perspective size multiplier.
    pub depth: f64,
}

/// Per-frame position and appearance compositor.
#[derive(Clone, Debug, Default)]
pub struct Compositor {
    /// Phase-drift and radius-variation constants.
    pub tuning: OrbitTuning,
}

struct Placed {
    center: Point,
    depth: f64,
    z: i32,
}

impl Compositor {
    /// Compositor with the given tuning.
    pub fn new(tuning: OrbitTuning) -> Self {
        Self { tuning }
    }

    /// Compute every dot's frame. Total over its inputs: never fails, never panics.
    pub fn compose(&self, scene: &Scene, layout: &Layout) -> Frame {
        let rect = layout.reference_rect();
        let vc = layout.viewport_center();
        let blend = scene.blend();
        let ellipse_center = scene.ellipse.center_in(layout);

        let mut placed: BTreeMap<&str, Placed> = BTreeMap::new();
        let mut satellites: Vec<&Dot> = Vec::new();

        for dot in scene.dots.iter() {
            let roots = self.radius_blend(dot, &scene.orbit, rect.center(), rect.size(), vc);
            match dot.role {
                Some(role) if blend > 0.0 => {
                    let e = self.ellipse_sample(role, &scene.ellipse, ellipse_center, blend);
                    let z = if blend > 0.5 {
                        if e.theta.sin() > 0.0 { Z_FRONT } else { Z_BACK }
                    } else {
                        Z_BASE
                    };
                    placed.insert(
                        &dot.id,
                        Placed {
                            center: lerp_point(roots, e.position, blend),
                            depth: e.depth,
                            z,
                        },
                    );
                }
                _ if dot.parent.is_some() => satellites.push(dot),
                _ => {
                    placed.insert(
                        &dot.id,
                        Placed {
                            center: roots,
                            depth: 1.0,
                            z: Z_BASE,
                        },
                    );
                }
            }
        }

        // Satellites resolve against already-placed parents, one generation per pass.
        for _ in 0..MAX_PARENT_DEPTH {
            if satellites.is_empty() {
                break;
            }
            satellites.retain(|dot| {
                let dot: &Dot = *dot;
                let Some(parent) = dot.parent.as_deref() else {
                    return false;
                };
                let center = if let Some(p) = placed.get(parent) {
                    satellite_position(p.center, dot)
                } else if scene.dots.contains(parent) {
                    return true;
                } else {
                    vc
                };
                placed.insert(
                    &dot.id,
                    Placed {
                        center,
                        depth: 1.0,
                        z: Z_BASE,
                    },
                );
                false
            });
        }
        for dot in satellites {
            placed.insert(
                &dot.id,
                Placed {
                    center: vc,
                    depth: 1.0,
                    z: Z_BASE,
                },
            );
        }

        let dots = scene
            .dots
            .iter()
            .filter_map(|dot| placed.get(dot.id.as_str()).map(|p| dot_frame(dot, p)))
            .collect();
        Frame { dots }
    }

    /// Compose, apply every dot to `stage`, then advance satellite angles by their
    /// per-frame angular speed.
    pub fn render(&self, scene: &mut Scene, layout: &Layout, stage: &mut dyn Stage) -> Frame {
        let frame = self.compose(scene, layout);
        for df in &frame.dots {
            stage.apply(df.element, df);
        }
        for dot in scene.dots.iter_mut() {
            if dot.parent.is_some() && dot.angular_speed != 0.0 {
                dot.orbit_angle = wrap_degrees(dot.orbit_angle + dot.angular_speed);
            }
        }
        frame
    }

    /// Reference-rectangle position of a dot before any orbit.
    pub fn base_position(dot: &Dot, rect_center: Point, rect_size: kurbo::Size) -> Point {
        Point::new(
            rect_center.x + rect_size.width * dot.base.x + dot.offset.x,
            rect_center.y + rect_size.height * dot.base.y + dot.offset.y,
        )
    }

    /// Position on the shared circular orbit.
    pub fn orbit_position(&self, dot: &Dot, orbit: &GlobalOrbit, viewport_center: Point) -> Point {
        let radius = orbit.radius.max(0.0);
        let deg =
            orbit.angle + dot.orbit_angle + self.tuning.orbit_drift(dot.phase_drift, orbit.angle);
        let a = deg_to_rad(deg);
        viewport_center + Vec2::new(radius * a.cos(), radius * a.sin())
    }

    /// Sample the ellipse depth orbit for a primary dot at blend `blend`.
    pub fn ellipse_sample(
        &self,
        role: EllipseRole,
        ellipse: &EllipseOrbit,
        center: Point,
        blend: f64,
    ) -> EllipseSample {
        let lead = deg_to_rad(ellipse.angle);
        let (theta, radius_scale) = match role {
            EllipseRole::Lead => (lead, 1.0),
            EllipseRole::Trail => (
                lead + std::f64::consts::PI + self.tuning.ellipse_drift(ellipse.angle),
                self.tuning.trail_radius_scale,
            ),
        };
        let position = center
            + Vec2::new(
                ellipse.radius_x * radius_scale * theta.cos(),
                ellipse.radius_y * radius_scale * theta.sin(),
            );
        let depth = 1.0 + theta.sin() * ellipse.depth_scale * blend;
        EllipseSample {
            position,
            theta,
            depth,
        }
    }

    fn radius_blend(
        &self,
        dot: &Dot,
        orbit: &GlobalOrbit,
        rect_center: Point,
        rect_size: kurbo::Size,
        viewport_center: Point,
    ) -> Point {
        let base = Self::base_position(dot, rect_center, rect_size);
        let takeover = (orbit.radius.max(0.0) / ORBIT_TAKEOVER_RADIUS).min(1.0);
        if takeover <= 0.0 {
            return base;
        }
        lerp_point(base, self.orbit_position(dot, orbit, viewport_center), takeover)
    }
}

fn satellite_position(parent: Point, dot: &Dot) -> Point {
    let a = deg_to_rad(dot.orbit_angle);
    parent + Vec2::new(dot.orbit_radius * a.cos(), dot.orbit_radius * a.sin())
}

fn dot_frame(dot: &Dot, placed: &Placed) -> DotFrame {
    let size = (dot.size * dot.scale * placed.depth).max(0.0);
    let width = (size * dot.scale_x).max(0.0);
    let height = (size * dot.scale_y).max(0.0);
    let top_left = placed.center - Vec2::new(width * 0.5, height * 0.5);
    DotFrame {
        id: dot.id.clone(),
        element: dot.element,
        center: placed.center,
        width,
        height,
        transform: Affine::translate(top_left.to_vec2()),
        opacity: if dot.opacity.is_finite() {
            dot.opacity.clamp(0.0, 1.0)
        } else {
            0.0
        },
        fill: dot.fill(),
        z: placed.z,
        depth: placed.depth,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
