use super::*;
use crate::compose::stage::{RecordingStage, Stage as _};

fn anchored() -> (Scene, RecordingStage) {
    let mut stage = RecordingStage::with_anchors(["logo-dot-1"]);
    let el = stage.find_anchor("logo-dot-1").unwrap();
    let mut scene = Scene::default();
    scene
        .dots
        .create("dot1", DotAttrs::default(), Some(el), &mut stage)
        .unwrap();
    (scene, stage)
}

fn split_spec(at: f64) -> SplitSpec {
    SplitSpec {
        source: "dot1".to_owned(),
        new_id: "dot3".to_owned(),
        at,
        distance: 20.0,
        axis: Vec2::new(1.0, 0.0),
        angle_spread: 0.0,
        stretch_duration: 0.25,
        separate_duration: 0.75,
    }
}

fn dot<'a>(scene: &'a Scene, id: &str) -> &'a Dot {
    scene.dots.get(id).unwrap()
}

#[test]
fn split_fades_in_before_diverging_and_ends_unstretched() {
    let (mut scene, mut stage) = anchored();
    let mut tl = Timeline::new();
    let end = split(&mut tl, &scene, &split_spec(1.0)).unwrap();
    assert_eq!(end, 2.0);
    tl.seal(&scene).unwrap();

    tl.tick(0.9, &mut scene, &mut stage).unwrap();
    assert_eq!(scene.dots.dynamic_ids().len(), 0);

    tl.tick(1.0, &mut scene, &mut stage).unwrap();
    assert_eq!(scene.dots.dynamic_ids(), vec!["dot3".to_owned()]);
    assert_eq!(dot(&scene, "dot3").opacity, 0.0);

    let mut saw_divergence = false;
    for i in 0..=16 {
        let t = 1.0 + f64::from(i) / 16.0;
        tl.tick(t, &mut scene, &mut stage).unwrap();
        let (a, b) = (dot(&scene, "dot1"), dot(&scene, "dot3"));
        if a.offset != b.offset {
            saw_divergence = true;
            assert_eq!(b.opacity, 1.0, "offsets diverged at t={t} before the fade finished");
        }
    }
    assert!(saw_divergence);

    tl.tick(end, &mut scene, &mut stage).unwrap();
    for id in ["dot1", "dot3"] {
        let d = dot(&scene, id);
        assert_eq!((d.scale_x, d.scale_y), (1.0, 1.0), "{id}");
    }
    assert_eq!(dot(&scene, "dot1").offset.x, -10.0);
    assert_eq!(dot(&scene, "dot3").offset.x, 10.0);
    assert_eq!(scene.dots.len(), 2);
}

#[test]
fn split_stretches_source_during_phase_one() {
    let (mut scene, mut stage) = anchored();
    let mut tl = Timeline::new();
    split(&mut tl, &scene, &split_spec(0.0)).unwrap();
    tl.tick(0.25, &mut scene, &mut stage).unwrap();
    let (sx, sy) = SPLIT_STRETCH;
    let d = dot(&scene, "dot1");
    assert_eq!((d.scale_x, d.scale_y), (sx, sy));
    assert_eq!(dot(&scene, "dot3").opacity, 1.0);
}

#[test]
fn split_copy_drops_ellipse_role_and_spreads_angles() {
    let (mut scene, mut stage) = anchored();
    scene.dots.get_mut("dot1").unwrap().role = Some(crate::scene::dot::EllipseRole::Lead);
    let mut tl = Timeline::new();
    let spec = SplitSpec {
        angle_spread: 40.0,
        ..split_spec(0.0)
    };
    let end = split(&mut tl, &scene, &spec).unwrap();
    tl.tick(end, &mut scene, &mut stage).unwrap();
    assert_eq!(dot(&scene, "dot3").role, None);
    assert_eq!(dot(&scene, "dot1").orbit_angle, -20.0);
    assert_eq!(dot(&scene, "dot3").orbit_angle, 20.0);
}

#[test]
fn split_rejects_unknown_source_and_taken_ids() {
    let (scene, _stage) = anchored();
    let mut tl = Timeline::new();
    let spec = SplitSpec {
        source: "nope".to_owned(),
        ..split_spec(0.0)
    };
    assert!(split(&mut tl, &scene, &spec).is_err());
    let spec = SplitSpec {
        new_id: "dot1".to_owned(),
        ..split_spec(0.0)
    };
    assert!(split(&mut tl, &scene, &spec).is_err());

    split(&mut tl, &scene, &split_spec(0.0)).unwrap();
    assert!(split(&mut tl, &scene, &split_spec(5.0)).is_err());
}

#[test]
fn merge_converges_and_despawns_absorbed_dot() {
    let (mut scene, mut stage) = anchored();
    let mut tl = Timeline::new();
    let split_end = split(&mut tl, &scene, &split_spec(0.0)).unwrap();
    let spec = MergeSpec {
        keep: "dot1".to_owned(),
        absorb: "dot3".to_owned(),
        at: split_end + 1.0,
        converge_duration: 0.5,
        impact_duration: 0.25,
        settle_duration: 0.5,
    };
    let end = merge(&mut tl, &scene, &spec).unwrap();
    tl.seal(&scene).unwrap();

    tl.tick(spec.at + 0.5, &mut scene, &mut stage).unwrap();
    assert_eq!(dot(&scene, "dot1").offset, dot(&scene, "dot3").offset);

    tl.tick(spec.at + 0.75, &mut scene, &mut stage).unwrap();
    let (ix, iy) = IMPACT_STRETCH;
    assert_eq!(dot(&scene, "dot1").scale_x, ix);
    assert_eq!(dot(&scene, "dot1").scale_y, iy);
    assert_eq!(dot(&scene, "dot3").opacity, 0.0);

    tl.tick(end, &mut scene, &mut stage).unwrap();
    assert!(!scene.dots.contains("dot3"));
    let d = dot(&scene, "dot1");
    assert_eq!((d.scale_x, d.scale_y), (1.0, 1.0));
    assert_eq!(d.offset.x, 0.0);
    assert_eq!(stage.synthesized_count(), 0);
}

#[test]
fn merge_validates_participants() {
    let (scene, _stage) = anchored();
    let mut tl = Timeline::new();
    split(&mut tl, &scene, &split_spec(0.0)).unwrap();
    let spec = |keep: &str, absorb: &str| MergeSpec {
        keep: keep.to_owned(),
        absorb: absorb.to_owned(),
        at: 3.0,
        converge_duration: 0.4,
        impact_duration: 0.2,
        settle_duration: 0.4,
    };
    assert!(merge(&mut tl, &scene, &spec("dot3", "dot3")).is_err());
    let err = merge(&mut tl, &scene, &spec("dot3", "dot1")).unwrap_err();
    assert!(err.to_string().contains("anchor"));
    assert!(merge(&mut tl, &scene, &spec("dot1", "ghost")).is_err());
}

#[test]
fn satellite_fades_in_while_radius_grows() {
    let (mut scene, mut stage) = anchored();
    let mut tl = Timeline::new();
    let spec = SatelliteSpec {
        parent: "dot1".to_owned(),
        id: "moon".to_owned(),
        at: 1.0,
        radius: 30.0,
        angular_speed: 2.0,
        size: 8.0,
        start_angle: 90.0,
        fade_duration: 0.5,
    };
    let end = satellite(&mut tl, &scene, &spec).unwrap();
    assert_eq!(end, 1.5);

    tl.tick(1.0, &mut scene, &mut stage).unwrap();
    let moon = dot(&scene, "moon");
    assert_eq!(moon.parent.as_deref(), Some("dot1"));
    assert_eq!((moon.opacity, moon.orbit_radius), (0.0, 0.0));
    assert_eq!(moon.size, 8.0);
    assert_eq!(moon.angular_speed, 2.0);

    tl.tick(end, &mut scene, &mut stage).unwrap();
    let moon = dot(&scene, "moon");
    assert_eq!((moon.opacity, moon.orbit_radius), (1.0, 30.0));

    assert!(satellite(&mut tl, &scene, &spec).is_err());
}

#[test]
fn retract_fades_and_despawns() {
    let (mut scene, mut stage) = anchored();
    let mut tl = Timeline::new();
    let spec = SatelliteSpec {
        parent: "dot1".to_owned(),
        id: "moon".to_owned(),
        at: 0.0,
        radius: 30.0,
        angular_speed: 2.0,
        size: 8.0,
        start_angle: 0.0,
        fade_duration: 0.5,
    };
    satellite(&mut tl, &scene, &spec).unwrap();
    let retract_spec = RetractSpec {
        id: "moon".to_owned(),
        at: 1.0,
        duration: 0.5,
    };
    let end = retract(&mut tl, &scene, &retract_spec).unwrap();

    tl.tick(1.25, &mut scene, &mut stage).unwrap();
    let moon = dot(&scene, "moon");
    assert!(moon.opacity > 0.0 && moon.opacity < 1.0);
    assert!(moon.orbit_radius < 30.0);

    tl.tick(end, &mut scene, &mut stage).unwrap();
    assert!(!scene.dots.contains("moon"));

    let anchor_retract = RetractSpec {
        id: "dot1".to_owned(),
        at: 0.0,
        duration: 0.5,
    };
    assert!(retract(&mut tl, &scene, &anchor_retract).is_err());
}

#[test]
fn wiggle_swings_both_ways_and_returns_to_rest() {
    let (mut scene, mut stage) = anchored();
    let mut tl = Timeline::new();
    let spec = WiggleSpec {
        id: "dot1".to_owned(),
        at: 0.0,
        field: DotField::OffsetY,
        amplitude: 10.0,
        cycles: 2,
        period: 0.5,
    };
    let end = wiggle(&mut tl, &scene, &spec).unwrap();
    assert_eq!(end, 1.0);

    tl.tick(0.125, &mut scene, &mut stage).unwrap();
    assert_eq!(dot(&scene, "dot1").offset.y, 10.0);
    tl.tick(0.375, &mut scene, &mut stage).unwrap();
    assert_eq!(dot(&scene, "dot1").offset.y, -10.0);
    tl.tick(end, &mut scene, &mut stage).unwrap();
    assert_eq!(dot(&scene, "dot1").offset.y, 0.0);
}

#[test]
fn spec_json_fills_defaults() {
    let spec: SplitSpec = serde_json::from_value(serde_json::json!({
        "source": "dot1", "new_id": "dot3", "at": 2.0
    }))
    .unwrap();
    assert_eq!(spec.distance, 28.0);
    assert_eq!(spec.axis, Vec2::new(1.0, 0.0));
    assert_eq!(spec.stretch_duration, 0.3);
}
