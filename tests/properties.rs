//! Values of the built-in properties, matched and written back in canonical form.

use rstest::rstest;
use vds::{default_engine, Error, Match, Value};

fn property(name: &str, text: &str) -> Option<Match> {
    default_engine()
        .parse_property_value(name, text)
        .expect("property to be registered")
}

fn canonical(name: &str, text: &str) -> Option<String> {
    property(name, text).map(|matched| default_engine().serialize(&matched))
}

#[rstest]
#[case("color", "#FFF", "#fff")]
#[case("color", "RebeccaPurple", "rebeccapurple")]
#[case("color", "CurrentColor", "currentcolor")]
#[case("color", "rgb(255, 0, 0)", "rgb(255, 0, 0)")]
#[case("color", "rgb(0 0 0 / 50%)", "rgb(0 0 0 / 50%)")]
#[case("color", "RGB(0  0 0)", "rgb(0 0 0)")]
#[case("color", "hsl(120deg 50% 50%)", "hsl(120deg 50% 50%)")]
#[case("width", "auto", "auto")]
#[case("width", "10PX", "10px")]
#[case("width", "0", "0")]
#[case("width", "fit-content(50%)", "fit-content(50%)")]
#[case("aspect-ratio", "16 / 9", "16 / 9")]
#[case("aspect-ratio", "16/9 auto", "auto 16 / 9")]
#[case("transition-duration", "1s,200MS", "1s, 200ms")]
#[case("rotate", "90deg x", "x 90deg")]
#[case("rotate", "1 0 0 0.25turn", "1 0 0 0.25turn")]
#[case("opacity", "50%", "50%")]
#[case("z-index", "-3", "-3")]
fn test_canonical_values(#[case] name: &str, #[case] text: &str, #[case] expected: &str) {
    assert_eq!(canonical(name, text).as_deref(), Some(expected), "{name}: {text}");
}

#[rstest]
#[case("color", "#ffff0")]
#[case("color", "notacolor")]
#[case("color", "rgb(255, 0 0)")]
#[case("width", "-10px")]
#[case("width", "10deg")]
#[case("width", "10")]
#[case("aspect-ratio", "-16 / 9")]
#[case("transition-duration", "-1s")]
#[case("transition-duration", "1s,")]
#[case("rotate", "x y 90deg")]
#[case("z-index", "1.5")]
fn test_rejected_values(#[case] name: &str, #[case] text: &str) {
    assert_eq!(property(name, text), None, "{name}: {text}");
}

#[test]
fn test_leaves_record_their_productions() {
    let width = property("width", "10px").unwrap();
    assert_eq!(width.types(), ["length-percentage"]);

    let color = property("color", "#ABC").unwrap();
    assert_eq!(color.value(), Some(&Value::HexColor("abc".into())));
    assert_eq!(color.types(), ["hex-color", "color"]);
}

#[test]
fn test_property_names_are_case_insensitive() {
    assert!(property("WIDTH", "auto").is_some());
}

#[test]
fn test_unknown_property_is_an_error() {
    let err = default_engine()
        .parse_property_value("colour", "red")
        .unwrap_err();
    assert_eq!(err, Error::UnknownProperty("colour".into()));
}
