//! Math functions matched through numeric primitives, resolved and serialized.

use rstest::rstest;
use vds::{parse_grammar, serialize_component_value, Engine, FixedRandom, StandardRegistry};

fn resolve(definition: &str, text: &str) -> Option<String> {
    parse_grammar(text, definition, None)
        .expect("definition to compile")
        .map(|matched| serialize_component_value(&matched))
}

#[rstest]
#[case("<length>", "calc(1px + 1em)", "calc(1em + 1px)")]
#[case("<length>", "calc(10px + 2px)", "calc(12px)")]
#[case("<length>", "calc(1in + 4px)", "calc(1.041667in)")]
#[case("<length>", "calc(2 * 3px)", "calc(6px)")]
#[case("<length>", "calc(3px * 2px / 2px)", "calc(3px)")]
#[case("<length>", "min(2px, 1em, 1px)", "min(1px, 1em)")]
#[case("<length>", "min(1px, 2px)", "calc(1px)")]
#[case("<length>", "clamp(1px, 5px, 3px)", "calc(3px)")]
#[case("<length>", "clamp(none, 5px, 3px)", "calc(3px)")]
#[case("<number>", "sign(-5)", "calc(-1)")]
#[case("<number>", "calc(pi)", "calc(3.141593)")]
#[case("<number>", "round(1, 0)", "calc(NaN)")]
#[case("<number>", "calc(1 / round(-1, 2))", "calc(-infinity)")]
#[case("<number>", "calc(1 / 0)", "calc(infinity)")]
#[case("<integer>", "calc(2.6)", "calc(3)")]
fn test_resolves_and_serializes(
    #[case] definition: &str,
    #[case] text: &str,
    #[case] expected: &str,
) {
    assert_eq!(resolve(definition, text).as_deref(), Some(expected), "{text}");
}

#[rstest]
#[case("<length>", "calc(1px + 1)")]
#[case("<length>", "calc(1px * 1px)")]
#[case("<length>", "calc(50%)")]
#[case("<number>", "calc(1px)")]
#[case("<length>", "calc(1px +1px)")]
#[case("<length>", "unknown(1px)")]
#[case("<integer [0,∞]>", "calc(-1)")]
#[case("<time [0s,∞]>", "calc(-1s)")]
fn test_rejects(#[case] definition: &str, #[case] text: &str) {
    assert_eq!(resolve(definition, text), None, "{text}");
}

#[test]
fn test_percentages_need_a_hint() {
    assert!(resolve("<length-percentage>", "calc(50% - 10px)").is_some());
    assert!(resolve("<length>", "calc(50% - 10px)").is_none());
}

#[test]
fn test_integer_results_are_rounded() {
    let engine = Engine::new(StandardRegistry);
    let matched = engine
        .parse_property_value("z-index", "calc(5 / 2)")
        .unwrap()
        .unwrap();
    assert_eq!(serialize_component_value(&matched), "calc(3)");
    assert_eq!(matched.types(), ["integer"]);
}

#[test]
fn test_range_is_checked_after_resolution() {
    let engine = Engine::new(StandardRegistry);
    assert!(engine
        .parse_property_value("width", "calc(10px - 20px)")
        .unwrap()
        .is_none());
    assert!(engine
        .parse_property_value("width", "calc(20px - 10px)")
        .unwrap()
        .is_some());
}

#[rstest]
#[case(0.5, "random(0, 10, by 5)", "calc(5)")]
#[case(0.99, "random(0, 10, by 5)", "calc(10)")]
#[case(0.25, "random(0, 8)", "calc(2)")]
#[case(0.25, "random(--seed per-element, 0, 8)", "calc(2)")]
fn test_random_draws_from_the_source(
    #[case] draw: f64,
    #[case] text: &str,
    #[case] expected: &str,
) {
    let engine = Engine::new(StandardRegistry).with_random_source(FixedRandom(draw));
    let matched = engine.parse_grammar(text, "<number>", None).unwrap().unwrap();
    assert_eq!(engine.serialize(&matched), expected);
}

#[test]
fn test_seeded_random_is_repeatable() {
    let first = Engine::new(StandardRegistry).with_random_source(vds::HashedRandom::new(7));
    let second = Engine::new(StandardRegistry).with_random_source(vds::HashedRandom::new(7));
    let text = "random(--a, 0, 100)";
    let a = first.parse_grammar(text, "<number>", None).unwrap().unwrap();
    let b = second.parse_grammar(text, "<number>", None).unwrap().unwrap();
    assert_eq!(a, b);
}
