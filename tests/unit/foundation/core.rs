use super::*;
use serde_json::json;

#[test]
fn parses_hex_rgb_and_rgba() {
    let c: Rgba8 = serde_json::from_value(json!("#ff0000")).unwrap();
    assert_eq!(c, Rgba8::rgb(255, 0, 0));

    let c: Rgba8 = serde_json::from_value(json!("0000FF80")).unwrap();
    assert_eq!(c, Rgba8::rgba(0, 0, 255, 128));
}

#[test]
fn parses_byte_arrays() {
    let c: Rgba8 = serde_json::from_value(json!([1, 2, 3])).unwrap();
    assert_eq!(c, Rgba8::rgb(1, 2, 3));
    let c: Rgba8 = serde_json::from_value(json!([1, 2, 3, 4])).unwrap();
    assert_eq!(c, Rgba8::rgba(1, 2, 3, 4));
    assert!(serde_json::from_value::<Rgba8>(json!([1, 2])).is_err());
}

#[test]
fn rejects_bad_hex() {
    assert!(Rgba8::from_hex("#12345").is_err());
    assert!(Rgba8::from_hex("#gg0000").is_err());
    assert!(serde_json::from_value::<Rgba8>(json!("#zzzzzz")).is_err());
}

#[test]
fn hex_serialization_roundtrips() {
    let c = Rgba8::rgba(0x12, 0xab, 0x00, 0x7f);
    let v = serde_json::to_value(c).unwrap();
    assert_eq!(v, json!("#12ab007f"));
    assert_eq!(serde_json::from_value::<Rgba8>(v).unwrap(), c);
}

#[test]
fn mix_hits_endpoints_and_midpoint() {
    let a = Rgba8::rgb(0, 0, 0);
    let b = Rgba8::rgb(255, 100, 10);
    assert_eq!(a.mix(b, 0.0), a);
    assert_eq!(a.mix(b, 1.0), b);
    assert_eq!(a.mix(b, 0.5), Rgba8::rgb(128, 50, 5));
    assert_eq!(a.mix(b, 7.0), b);
}

#[test]
fn reference_rect_falls_back_to_centered_default() {
    let layout = Layout::new(Size::new(1000.0, 800.0));
    let r = layout.reference_rect();
    assert_eq!(r.center(), Point::new(500.0, 400.0));
    assert_eq!(r.width(), 400.0);
    assert_eq!(r.height(), 100.0);

    let logo = Rect::new(10.0, 20.0, 110.0, 70.0);
    assert_eq!(layout.with_logo(logo).reference_rect(), logo);
}
