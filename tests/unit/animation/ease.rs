use super::*;

const MONOTONIC: [Ease; 15] = [
    Ease::Linear,
    Ease::InQuad,
    Ease::OutQuad,
    Ease::InOutQuad,
    Ease::InCubic,
    Ease::OutCubic,
    Ease::InOutCubic,
    Ease::InQuart,
    Ease::OutQuart,
    Ease::InOutQuart,
    Ease::InQuint,
    Ease::OutQuint,
    Ease::InOutQuint,
    Ease::OutExpo,
    Ease::InOutSine,
];

#[test]
fn endpoints_are_stable() {
    for ease in MONOTONIC.into_iter().chain([Ease::InBack, Ease::OutBack]) {
        assert!(ease.apply(0.0).abs() < 1e-9, "{ease:?} at 0");
        assert!((ease.apply(1.0) - 1.0).abs() < 1e-9, "{ease:?} at 1");
    }
}

#[test]
fn monotonic_spot_check() {
    for ease in MONOTONIC {
        let a = ease.apply(0.25);
        let b = ease.apply(0.5);
        let c = ease.apply(0.75);
        assert!(a < b, "{ease:?}");
        assert!(b < c, "{ease:?}");
    }
}

#[test]
fn back_out_overshoots() {
    assert!(Ease::OutBack.apply(0.5) > 1.0);
    assert!(Ease::InBack.apply(0.25) < 0.0);
}

#[test]
fn names_resolve_case_insensitively() {
    assert_eq!(Ease::from_name("power3.out"), Some(Ease::OutQuart));
    assert_eq!(Ease::from_name(" Power2.InOut "), Some(Ease::InOutCubic));
    assert_eq!(Ease::from_name("back.out(1.7)"), Some(Ease::OutBack));
    assert_eq!(Ease::from_name("none"), Some(Ease::Linear));
    assert_eq!(Ease::from_name("expo"), Some(Ease::OutExpo));
    assert_eq!(Ease::from_name("elastic.out"), None);
    assert_eq!(Ease::from_name(""), None);
}

#[test]
fn default_is_power3_out() {
    assert_eq!(Ease::default(), Ease::OutQuart);
}
