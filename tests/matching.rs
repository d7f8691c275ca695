//! Matching behaviour of the engine: backtracking, multipliers, comma elision and
//! context-sensitive defaults.

use rstest::rstest;
use vds::{parse_grammar, Definition, Engine, MapRegistry, Match, Separator, Value};

fn accepts(definition: &str, text: &str) -> bool {
    parse_grammar(text, definition, None)
        .expect("definition to compile")
        .is_some()
}

fn keyword(word: &str) -> Match {
    Match::literal(Value::Keyword(word.into()))
}

fn space_list(items: Vec<Match>) -> Match {
    Match::List {
        items,
        separator: Separator::Space,
    }
}

#[rstest]
#[case("a | a a | a a a", "a", true)]
#[case("a | a a | a a a", "a a", true)]
#[case("a | a a | a a a", "a a a", true)]
#[case("a | a a | a a a", "a a a a", false)]
#[case("[a | a a | a a a] a", "a a", true)]
#[case("[a | a a | a a a] a", "a a a a", true)]
#[case("[a | a a | a a a] a", "a a a a a", false)]
#[case("[a && b] a", "b a a", true)]
#[case("[a? && b] a", "b a", true)]
#[case("[a || b] b", "a b", true)]
#[case("[a || b] b", "b a b", true)]
fn test_backtracking_completeness(#[case] definition: &str, #[case] text: &str, #[case] ok: bool) {
    assert_eq!(accepts(definition, text), ok, "{definition} on {text:?}");
}

#[test]
fn test_arrangement_in_repetition() {
    let empty = parse_grammar("", "[a || b]*", None).unwrap().unwrap();
    assert_eq!(space_list(vec![]), empty);

    let one = parse_grammar("a", "[a || b]*", None).unwrap().unwrap();
    assert_eq!(
        one,
        space_list(vec![space_list(vec![keyword("a"), Match::Omitted])])
    );
}

#[test]
fn test_arrangement_reads_in_declaration_order() {
    let matched = parse_grammar("b a", "[a || b]*", None).unwrap().unwrap();
    assert_eq!(
        matched,
        space_list(vec![space_list(vec![keyword("a"), keyword("b")])])
    );
}

#[rstest]
#[case("a", true)]
#[case("a, a", true)]
#[case("a, a, a", true)]
#[case("a a", false)]
#[case(", a", false)]
#[case("a,", false)]
#[case("a, , a", false)]
#[case("a,, a", false)]
#[case("a, a, a, a", false)]
fn test_comma_elision(#[case] text: &str, #[case] ok: bool) {
    assert_eq!(accepts("a?, a?, a", text), ok, "{text:?}");
}

#[test]
fn test_elided_commas_leave_omitted_slots() {
    let matched = parse_grammar("a", "a?, a?, a", None).unwrap().unwrap();
    assert_eq!(matched.items().map(<[Match]>::len), Some(5));
    assert_eq!(vds::serialize_component_value(&matched), "a");
}

#[rstest]
#[case(1, false)]
#[case(2, true)]
#[case(3, true)]
#[case(4, false)]
fn test_repetition_bounds(#[case] count: usize, #[case] ok: bool) {
    let text = vec!["a"; count].join(" ");
    assert_eq!(accepts("a{2,3}", &text), ok);
}

#[test]
fn test_unbounded_repetition_uses_top_level_default() {
    assert!(accepts("a*", &vec!["a"; 20].join(" ")));
    assert!(!accepts("a*", &vec!["a"; 21].join(" ")));
}

#[test]
fn test_repetition_default_depends_on_context() {
    let text = vec!["a"; 31].join(" ");
    assert!(parse_grammar(&text, "a*", Some("calc-sum")).unwrap().is_some());
    assert!(parse_grammar(&text, "a*", None).unwrap().is_none());
}

fn sum_of_ones(count: usize) -> String {
    vec!["1"; count].join(" + ")
}

#[test]
fn test_operand_budget_under_calc() {
    let within = format!("calc({})", sum_of_ones(32));
    let beyond = format!("calc({})", sum_of_ones(33));
    assert!(accepts("<number>", &within));
    assert!(!accepts("<number>", &beyond));
}

#[test]
fn test_operand_budget_under_min() {
    let within = format!("min({}, 2)", sum_of_ones(16));
    let beyond = format!("min({}, 2)", sum_of_ones(17));
    assert!(accepts("<number>", &within));
    assert!(!accepts("<number>", &beyond));
}

#[test]
fn test_alternation_priority_follows_declaration_order() {
    let registry = MapRegistry::new()
        .with_production("x", "<custom-ident>")
        .with_production("y", "<ident>");
    let engine = Engine::new(registry);
    let definition = "a || <x> || <y>";

    let matched = engine.parse_grammar("foo a", definition, None).unwrap().unwrap();
    let items = matched.items().unwrap();
    assert_eq!(items[0], keyword("a"));
    assert_eq!(items[1].types(), ["custom-ident", "x"]);
    assert_eq!(items[2], Match::Omitted);

    let matched = engine.parse_grammar("bar foo", definition, None).unwrap().unwrap();
    let items = matched.items().unwrap();
    assert_eq!(items[0], Match::Omitted);
    assert_eq!(items[1].value(), Some(&Value::Ident("bar".into())));
    assert_eq!(items[2].value(), Some(&Value::Ident("foo".into())));
    assert_eq!(items[2].types(), ["ident", "y"]);
}

#[test]
fn test_user_properties_shadow_builtins() {
    let engine = Engine::new(
        MapRegistry::new().with_property("opacity", Definition::new("none | <number [0,1]>")),
    );
    assert!(engine.parse_property_value("opacity", "none").unwrap().is_some());
    assert!(engine.parse_property_value("opacity", "50%").unwrap().is_none());
}

#[test]
fn test_registry_from_json() {
    let registry = MapRegistry::from_json(
        r#"{
            "productions": { "size": { "syntax": "small | large" } },
            "properties": { "Font-Size": { "syntax": "<size> | <length>", "initial": "medium" } }
        }"#,
    )
    .unwrap();
    let engine = Engine::new(registry);
    let matched = engine
        .parse_property_value("font-size", "LARGE")
        .unwrap()
        .unwrap();
    assert_eq!(matched.types(), ["size"]);
    assert!(engine.parse_property_value("font-size", "12px").unwrap().is_some());
}

#[test]
fn test_matches_are_independent_across_threads() {
    let engine = Engine::new(vds::StandardRegistry);
    std::thread::scope(|scope| {
        for width in ["1px", "2em", "calc(1px + 2%)", "auto"] {
            let engine = &engine;
            scope.spawn(move || {
                assert!(engine.parse_property_value("width", width).unwrap().is_some());
            });
        }
    });
}

#[rstest]
#[case("x [, y]?", "x, y")]
#[case("a [, b]? , c", "a, b, c")]
#[case("a b?, c", "a, c")]
#[case("g( [ circle || ellipse ]? [ at <ident> ]? , [ red | blue ]# )", "g(circle, red, blue)")]
fn test_commas_round_trip(#[case] definition: &str, #[case] text: &str) {
    let matched = parse_grammar(text, definition, None).unwrap().unwrap();
    let written = vds::serialize_component_value(&matched);
    assert_eq!(written, text);
    assert_eq!(parse_grammar(&written, definition, None).unwrap(), Some(matched));
}

#[test]
fn test_operand_budget_counts_every_leaf() {
    let products = |count: usize| vec!["1 * 1"; count].join(" + ");
    let within = format!("calc({})", products(16));
    let beyond = format!("calc({})", products(17));
    assert!(accepts("<number>", &within));
    assert!(!accepts("<number>", &beyond));
}

/// Run `check` on a thread with the default test stack size.
fn on_small_stack(check: impl FnOnce() + Send + 'static) {
    std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(check)
        .expect("thread to start")
        .join()
        .expect("check to finish without panicking");
}

#[test]
fn test_long_list_of_math_functions() {
    on_small_stack(|| {
        let text = vec!["calc(1px + 2px)"; 20].join(", ");
        let matched = parse_grammar(&text, "<length>#", None).unwrap().unwrap();
        assert_eq!(
            vds::serialize_component_value(&matched),
            vec!["calc(3px)"; 20].join(", ")
        );
    });
}

#[test]
fn test_long_calculation() {
    on_small_stack(|| {
        let terms = |count: usize| vec!["1 * 1 * 1 * 1"; count].join(" + ");
        assert!(!accepts("<number>", &format!("calc({})", terms(20))));
        let matched = parse_grammar(&format!("calc({})", terms(8)), "<number>", None)
            .unwrap()
            .unwrap();
        assert_eq!(vds::serialize_component_value(&matched), "calc(8)");
    });
}

#[test]
fn test_deeply_nested_parentheses() {
    on_small_stack(|| {
        let nested = |depth: usize| format!("calc({}1{})", "(".repeat(depth), ")".repeat(depth));
        let matched = parse_grammar(&nested(20), "<number>", None).unwrap().unwrap();
        assert_eq!(vds::serialize_component_value(&matched), "calc(1)");
        assert!(!accepts("<number>", &nested(35)));
    });
}

#[test]
fn test_long_keyword_run() {
    on_small_stack(|| {
        let limits = vds::Limits {
            default_repetition_max: 1000,
            ..vds::Limits::default()
        };
        let engine = Engine::new(vds::StandardRegistry).with_limits(limits);
        let text = vec!["a"; 1000].join(" ");
        assert!(engine.parse_grammar(&text, "a*", None).unwrap().is_some());
        assert!(engine.parse_grammar(&text, "a* b", None).unwrap().is_none());
    });
}
