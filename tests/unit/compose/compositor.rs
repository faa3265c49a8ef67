use super::*;
use crate::{
    compose::stage::RecordingStage,
    foundation::core::{Rect, Size},
    scene::dot::{DEFAULT_ACCENT, DEFAULT_SIZE, DotAttrs},
};

const EPS: f64 = 1e-9;

fn layout() -> Layout {
    Layout::new(Size::new(1000.0, 800.0))
}

fn add(scene: &mut Scene, stage: &mut RecordingStage, id: &str, attrs: DotAttrs) {
    scene.dots.create(id, attrs, None, stage).unwrap();
}

fn close(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
}

fn primary_pair(scene: &mut Scene, stage: &mut RecordingStage) {
    add(
        scene,
        stage,
        "dot1",
        DotAttrs {
            base: Some(Vec2::new(-0.02, 0.0)),
            role: Some(EllipseRole::Lead),
            ..DotAttrs::default()
        },
    );
    add(
        scene,
        stage,
        "dot2",
        DotAttrs {
            base: Some(Vec2::new(0.02, 0.0)),
            orbit_angle: Some(180.0),
            phase_drift: Some(1.0),
            role: Some(EllipseRole::Trail),
            ..DotAttrs::default()
        },
    );
}

#[test]
fn default_logo_rect_places_base_dot_at_known_pixel() {
    let mut stage = RecordingStage::new();
    let mut scene = Scene::default();
    add(
        &mut scene,
        &mut stage,
        "dot1",
        DotAttrs {
            base: Some(Vec2::new(-0.02, 0.0)),
            ..DotAttrs::default()
        },
    );
    let frame = Compositor::default().compose(&scene, &layout());
    let c = frame.get("dot1").unwrap().center;
    assert!(close(c, Point::new(492.0, 400.0)), "{c:?}");
}

#[test]
fn root_dot_matches_closed_form_base_orbit_blend() {
    let mut stage = RecordingStage::new();
    let mut scene = Scene::default();
    add(
        &mut scene,
        &mut stage,
        "a",
        DotAttrs {
            base: Some(Vec2::new(0.1, -0.2)),
            offset: Some(Vec2::new(3.0, 4.0)),
            orbit_angle: Some(45.0),
            phase_drift: Some(1.0),
            ..DotAttrs::default()
        },
    );
    scene.orbit.angle = 30.0;
    scene.orbit.radius = 40.0;
    let layout = layout().with_logo(Rect::new(100.0, 50.0, 500.0, 250.0));

    let tuning = OrbitTuning::default();
    let base = Point::new(300.0 + 400.0 * 0.1 + 3.0, 150.0 + 200.0 * -0.2 + 4.0);
    let drift = tuning.orbit_drift_deg * (30f64.to_radians() * tuning.orbit_drift_rate).sin();
    let a = (30.0 + 45.0 + drift).to_radians();
    let orbit = Point::new(500.0 + 40.0 * a.cos(), 400.0 + 40.0 * a.sin());
    let t = 40.0 / ORBIT_TAKEOVER_RADIUS;
    let expected = Point::new(
        base.x * (1.0 - t) + orbit.x * t,
        base.y * (1.0 - t) + orbit.y * t,
    );

    let frame = Compositor::new(tuning).compose(&scene, &layout);
    let c = frame.get("a").unwrap().center;
    assert!(close(c, expected), "{c:?} vs {expected:?}");
    assert_eq!(frame.get("a").unwrap().z, Z_BASE);
}

#[test]
fn large_orbit_radius_fully_takes_over() {
    let mut stage = RecordingStage::new();
    let mut scene = Scene::default();
    add(&mut scene, &mut stage, "a", DotAttrs::default());
    scene.orbit.radius = 250.0;
    let frame = Compositor::default().compose(&scene, &layout());
    assert!(close(frame.get("a").unwrap().center, Point::new(750.0, 400.0)));
}

#[test]
fn satellite_orbits_parent_and_advances_per_render() {
    let mut stage = RecordingStage::new();
    let mut scene = Scene::default();
    add(&mut scene, &mut stage, "p", DotAttrs::default());
    add(
        &mut scene,
        &mut stage,
        "s",
        DotAttrs {
            parent: Some("p".to_owned()),
            orbit_radius: Some(20.0),
            orbit_angle: Some(350.0),
            angular_speed: Some(3.0),
            ..DotAttrs::default()
        },
    );
    let compositor = Compositor::default();
    let layout = layout();
    let parent = Point::new(500.0, 400.0);

    let n = 7;
    for i in 0..n {
        let theta = wrap_degrees(350.0 + 3.0 * i as f64).to_radians();
        let frame = compositor.render(&mut scene, &layout, &mut stage);
        let expected = parent + Vec2::new(20.0 * theta.cos(), 20.0 * theta.sin());
        assert!(close(frame.get("s").unwrap().center, expected), "render {i}");
    }
    let angle = scene.dots.get("s").unwrap().orbit_angle;
    assert!((angle - wrap_degrees(350.0 + 3.0 * n as f64)).abs() < EPS);
    assert!((0.0..360.0).contains(&angle));
    // Root dots never advance.
    assert_eq!(scene.dots.get("p").unwrap().orbit_angle, 0.0);
}

#[test]
fn satellite_with_missing_parent_sits_at_viewport_center() {
    let mut stage = RecordingStage::new();
    let mut scene = Scene::default();
    add(&mut scene, &mut stage, "p", DotAttrs::default());
    add(
        &mut scene,
        &mut stage,
        "s",
        DotAttrs {
            parent: Some("p".to_owned()),
            orbit_radius: Some(20.0),
            ..DotAttrs::default()
        },
    );
    scene.dots.remove("p", &mut stage);
    let frame = Compositor::default().compose(&scene, &layout());
    assert_eq!(frame.dots.len(), 1);
    assert_eq!(frame.get("s").unwrap().center, Point::new(500.0, 400.0));
}

#[test]
fn chained_satellites_resolve_regardless_of_id_order() {
    let mut stage = RecordingStage::new();
    let mut scene = Scene::default();
    add(&mut scene, &mut stage, "z_root", DotAttrs::default());
    // Ids sort before their parents, so each generation needs another pass.
    for (id, parent, angle) in [("c", "z_root", 0.0), ("b", "c", 90.0), ("a", "b", 0.0)] {
        add(
            &mut scene,
            &mut stage,
            id,
            DotAttrs {
                parent: Some(parent.to_owned()),
                orbit_radius: Some(10.0),
                orbit_angle: Some(angle),
                ..DotAttrs::default()
            },
        );
    }
    assert_eq!(scene.dots.depth_of("a"), 3);

    let frame = Compositor::default().compose(&scene, &layout());
    assert_eq!(frame.dots.len(), 4);
    let center = |id: &str| frame.get(id).unwrap().center;
    assert!(close(center("z_root"), Point::new(500.0, 400.0)));
    assert!(close(center("c"), Point::new(510.0, 400.0)), "{:?}", center("c"));
    assert!(close(center("b"), Point::new(510.0, 410.0)), "{:?}", center("b"));
    assert!(close(center("a"), Point::new(520.0, 410.0)), "{:?}", center("a"));
}

#[test]
fn chain_at_max_depth_still_resolves() {
    let mut stage = RecordingStage::new();
    let mut scene = Scene::default();
    add(&mut scene, &mut stage, "z_root", DotAttrs::default());
    let chain = ["d", "c", "b", "a"];
    let mut parent = "z_root";
    for id in chain {
        add(
            &mut scene,
            &mut stage,
            id,
            DotAttrs {
                parent: Some(parent.to_owned()),
                orbit_radius: Some(10.0),
                ..DotAttrs::default()
            },
        );
        parent = id;
    }
    assert_eq!(scene.dots.depth_of("a"), MAX_PARENT_DEPTH);

    let frame = Compositor::default().compose(&scene, &layout());
    for (i, id) in chain.iter().enumerate() {
        let expected = Point::new(500.0 + 10.0 * (i + 1) as f64, 400.0);
        assert!(close(frame.get(id).unwrap().center, expected), "{id}");
    }
}

#[test]
fn blend_zero_is_bit_identical_to_orbit_only() {
    let mut stage = RecordingStage::new();
    let mut with_roles = Scene::default();
    primary_pair(&mut with_roles, &mut stage);
    with_roles.orbit.angle = 77.0;
    with_roles.orbit.radius = 63.0;
    with_roles.ellipse.angle = 123.0;

    let mut without = with_roles.clone();
    for dot in without.dots.iter_mut() {
        dot.role = None;
    }

    let compositor = Compositor::default();
    let a = compositor.compose(&with_roles, &layout());
    let b = compositor.compose(&without, &layout());
    assert_eq!(a, b);
    for d in &a.dots {
        assert_eq!(d.depth, 1.0);
        assert_eq!(d.z, Z_BASE);
    }
}

#[test]
fn blend_one_matches_pure_ellipse_formula() {
    let mut stage = RecordingStage::new();
    let mut scene = Scene::default();
    primary_pair(&mut scene, &mut stage);
    scene.orbit.radius = 30.0;
    scene.blend = 1.0;
    scene.ellipse.angle = 40.0;

    let tuning = OrbitTuning::default();
    let e = scene.ellipse;
    let center = Point::new(500.0, 400.0);
    let lead = 40f64.to_radians();
    let trail = lead
        + std::f64::consts::PI
        + tuning.ellipse_drift_rad * (lead * tuning.ellipse_drift_rate).sin();
    let k = tuning.trail_radius_scale;

    let frame = Compositor::new(tuning).compose(&scene, &layout());
    let d1 = frame.get("dot1").unwrap();
    let d2 = frame.get("dot2").unwrap();
    assert!(close(
        d1.center,
        Point::new(
            center.x + e.radius_x * lead.cos(),
            center.y + e.radius_y * lead.sin()
        )
    ));
    assert!(close(
        d2.center,
        Point::new(
            center.x + k * e.radius_x * trail.cos(),
            center.y + k * e.radius_y * trail.sin()
        )
    ));
    assert!((d1.depth - (1.0 + lead.sin() * e.depth_scale)).abs() < EPS);
    assert_eq!(d1.z, Z_FRONT);
    assert_eq!(d2.z, Z_BACK);
}

#[test]
fn depth_stays_within_blend_scaled_bounds() {
    let mut stage = RecordingStage::new();
    let mut scene = Scene::default();
    primary_pair(&mut scene, &mut stage);
    let compositor = Compositor::default();
    let ds = scene.ellipse.depth_scale;
    for step in 0..=10 {
        let b = step as f64 / 10.0;
        scene.blend = b;
        for deg in (0..720).step_by(15) {
            scene.ellipse.angle = deg as f64;
            let frame = compositor.compose(&scene, &layout());
            for d in &frame.dots {
                assert!(d.depth >= 1.0 - ds * b - EPS, "{} at b={b} deg={deg}", d.depth);
                assert!(d.depth <= 1.0 + ds * b + EPS, "{} at b={b} deg={deg}", d.depth);
                assert!((d.width - DEFAULT_SIZE * d.depth).abs() < EPS);
            }
        }
    }
}

#[test]
fn stacking_only_changes_past_half_blend() {
    let mut stage = RecordingStage::new();
    let mut scene = Scene::default();
    primary_pair(&mut scene, &mut stage);
    scene.ellipse.angle = 90.0;
    let compositor = Compositor::default();

    scene.blend = 0.4;
    let frame = compositor.compose(&scene, &layout());
    assert!(frame.dots.iter().all(|d| d.z == Z_BASE));

    scene.blend = 0.8;
    let frame = compositor.compose(&scene, &layout());
    assert_eq!(frame.get("dot1").unwrap().z, Z_FRONT);
    assert_eq!(frame.get("dot2").unwrap().z, Z_BACK);
}

#[test]
fn frame_geometry_centers_the_stretched_box() {
    let mut stage = RecordingStage::new();
    let mut scene = Scene::default();
    add(
        &mut scene,
        &mut stage,
        "a",
        DotAttrs {
            size: Some(20.0),
            scale: Some(2.0),
            scale_x: Some(1.5),
            scale_y: Some(0.5),
            opacity: Some(3.0),
            color_mix: Some(1.0),
            ..DotAttrs::default()
        },
    );
    let frame = Compositor::default().compose(&scene, &layout());
    let d = frame.get("a").unwrap();
    assert_eq!((d.width, d.height), (60.0, 20.0));
    assert_eq!(d.transform, Affine::translate((470.0, 390.0)));
    assert_eq!(d.opacity, 1.0);
    assert_eq!(d.fill, DEFAULT_ACCENT);
}

#[test]
fn compose_is_total_over_degenerate_inputs() {
    let mut stage = RecordingStage::new();
    let mut scene = Scene::default();
    primary_pair(&mut scene, &mut stage);
    scene.blend = f64::NAN;
    scene.orbit.radius = -50.0;
    scene.dots.get_mut("dot1").unwrap().opacity = f64::NAN;
    let frame = Compositor::default().compose(&scene, &Layout::new(Size::ZERO));
    assert_eq!(frame.dots.len(), 2);
    assert_eq!(frame.get("dot1").unwrap().opacity, 0.0);
}
