use super::*;
use crate::foundation::core::Point;

fn dot_frame(element: ElementId, center: (f64, f64), size: f64, fill: Rgba8, z: i32) -> DotFrame {
    DotFrame {
        id: format!("dot-{}", element.0),
        element,
        center: Point::new(center.0, center.1),
        width: size,
        height: size,
        transform: Affine::translate((center.0 - size / 2.0, center.1 - size / 2.0)),
        opacity: 1.0,
        fill,
        z,
        depth: 1.0,
    }
}

#[test]
fn paints_dot_at_its_center_and_leaves_corners_clear() {
    let mut stage = CpuStage::new(64, 64);
    let el = stage.spawn_element("a");
    let red = Rgba8::rgb(255, 0, 0);
    stage.apply(el, &dot_frame(el, (32.0, 32.0), 20.0, red, 1));

    let frame = stage.finish().unwrap();
    assert_eq!((frame.width, frame.height), (64, 64));
    assert_eq!(frame.data.len(), 64 * 64 * 4);
    assert!(frame.premultiplied);
    assert_eq!(frame.pixel(32, 32), Some([255, 0, 0, 255]));
    assert_eq!(frame.pixel(0, 0), Some([0, 0, 0, 0]));
    // Inside the bounding box but outside the ellipse.
    assert_eq!(frame.pixel(23, 23), Some([0, 0, 0, 0]));
    assert_eq!(frame.pixel(64, 0), None);
}

#[test]
fn higher_z_paints_on_top() {
    let mut stage = CpuStage::new(32, 32);
    let front = stage.spawn_element("front");
    let back = stage.spawn_element("back");
    let blue = Rgba8::rgb(0, 0, 255);
    let green = Rgba8::rgb(0, 255, 0);
    // Applied in the opposite order of their stacking.
    stage.apply(front, &dot_frame(front, (16.0, 16.0), 16.0, blue, 2));
    stage.apply(back, &dot_frame(back, (16.0, 16.0), 24.0, green, 0));

    let frame = stage.finish().unwrap();
    assert_eq!(frame.pixel(16, 16), Some([0, 0, 255, 255]));
    assert_eq!(frame.pixel(16, 5), Some([0, 255, 0, 255]));
}

#[test]
fn opacity_and_background_blend() {
    let mut stage = CpuStage::new(16, 16).with_background(Rgba8::rgb(255, 255, 255));
    let el = stage.spawn_element("a");
    let mut f = dot_frame(el, (8.0, 8.0), 12.0, Rgba8::rgb(0, 0, 0), 1);
    f.opacity = 0.5;
    stage.apply(el, &f);

    let frame = stage.finish().unwrap();
    let [r, g, b, a] = frame.pixel(8, 8).unwrap();
    assert_eq!(a, 255);
    assert!((120..=135).contains(&r), "r={r}");
    assert_eq!((r, g), (g, b));
    assert_eq!(frame.pixel(0, 0), Some([255, 255, 255, 255]));
}

#[test]
fn invisible_and_removed_dots_are_skipped() {
    let mut stage = CpuStage::new(16, 16);
    let hidden = stage.spawn_element("hidden");
    let removed = stage.spawn_element("removed");
    let mut f = dot_frame(hidden, (8.0, 8.0), 12.0, Rgba8::rgb(255, 0, 0), 1);
    f.opacity = 0.0;
    stage.apply(hidden, &f);
    stage.apply(removed, &dot_frame(removed, (8.0, 8.0), 12.0, Rgba8::rgb(255, 0, 0), 1));
    stage.remove_element(removed);

    let frame = stage.finish().unwrap();
    assert!(frame.data.iter().all(|&b| b == 0));
}

#[test]
fn rejects_degenerate_frame_sizes() {
    assert!(CpuStage::new(0, 10).finish().is_err());
    assert!(CpuStage::new(70_000, 10).finish().is_err());
}

#[test]
fn straight_alpha_conversion() {
    let frame = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![64, 0, 32, 128, 9, 9, 9, 0],
        premultiplied: true,
    };
    assert_eq!(frame.to_straight_rgba(), vec![128, 0, 64, 128, 0, 0, 0, 0]);
}

#[test]
fn delegates_stage_bookkeeping() {
    let mut stage = CpuStage::with_anchors(8, 8, ["logo-dot-1"]);
    assert!(stage.find_anchor("logo-dot-1").is_some());
    let l = stage.listen(HostEvent::Scroll);
    assert_eq!(stage.listener_count(), 1);
    stage.unlisten(l);
    assert_eq!(stage.listener_count(), 0);
    assert_eq!(stage.recording().element_count(), 1);
}
