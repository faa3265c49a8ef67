use super::*;

const ALL: [Ease; 9] = [
    Ease::Linear,
    Ease::InQuad,
    Ease::OutQuad,
    Ease::InOutQuad,
    Ease::InCubic,
    Ease::OutCubic,
    Ease::InOutCubic,
    Ease::InOutSine,
    Ease::OutBack,
];

#[test]
fn endpoints_are_stable() {
    for ease in ALL {
        assert_eq!(ease.apply(0.0), 0.0);
        assert_eq!(ease.apply(1.0), 1.0);
        assert_eq!(ease.apply(-3.0), 0.0);
        assert_eq!(ease.apply(3.0), 1.0);
    }
}

#[test]
fn monotonic_spot_check() {
    for ease in ALL.into_iter().filter(|e| *e != Ease::OutBack) {
        let a = ease.apply(0.25);
        let b = ease.apply(0.5);
        let c = ease.apply(0.75);
        assert!(a < b, "{ease:?}");
        assert!(b < c, "{ease:?}");
    }
}

#[test]
fn out_back_overshoots_then_settles() {
    let mid = Ease::OutBack.apply(0.6);
    assert!(mid > 1.0);
    let late = Ease::OutBack.apply(0.99);
    assert!(late > 1.0 && late < mid);
}

#[test]
fn serde_uses_variant_names() {
    let v = serde_json::to_value(Ease::OutBack).unwrap();
    assert_eq!(v, serde_json::json!("OutBack"));
    let e: Ease = serde_json::from_value(serde_json::json!("InOutSine")).unwrap();
    assert_eq!(e, Ease::InOutSine);
}
