//! Compiling definition text: canonical serialization and rejected definitions.

use insta::assert_snapshot;
use rstest::rstest;
use vds::definition::RepetitionDefaults;
use vds::registry::builtins::{PRODUCTIONS, PROPERTIES};
use vds::{parse_definition, serialize_definition, DefinitionError, Grammar, Limits};

fn compile(source: &str) -> Result<Grammar, DefinitionError> {
    parse_definition(source, RepetitionDefaults::top_level(&Limits::default()))
}

fn canonical(source: &str) -> String {
    serialize_definition(&compile(source).expect("definition to compile"))
}

#[test]
fn test_builtin_definitions_survive_serialization() {
    let syntaxes = PRODUCTIONS
        .iter()
        .map(|(_, syntax)| *syntax)
        .chain(PROPERTIES.iter().map(|(_, syntax, _)| *syntax));
    for syntax in syntaxes {
        let grammar = compile(syntax).unwrap();
        let text = serialize_definition(&grammar);
        assert_eq!(compile(&text).unwrap(), grammar, "{syntax} became {text}");
    }
}

#[test]
fn test_canonical_forms() {
    assert_snapshot!(canonical("AUTO|<length>"), @"auto | <length>");
    assert_snapshot!(canonical("[a||b]  &&c"), @"[ a || b ] && c");
    assert_snapshot!(canonical("<calc-sum>#{1,3}"), @"<calc-sum>#{1,3}");
    assert_snapshot!(canonical("<time [0s,∞]>#"), @"<time [0s,∞]>#");
    assert_snapshot!(canonical("a  [ b | c ]? , d"), @"a [ b | c ]?, d");
    assert_snapshot!(canonical("rgb( <number>#{3} , <alpha-value>? )"), @"rgb( <number>#{3}, <alpha-value>? )");
    assert_snapshot!(canonical("[ a b ]!"), @"[ a b ]!");
}

#[rstest]
#[case("a && b || c")]
#[case("a | b && c")]
#[case("a{3,1}")]
#[case("<length [1foo,2px]>")]
#[case("[ a b")]
#[case("a |")]
#[case("a ~ b")]
#[case("")]
fn test_malformed_definitions(#[case] source: &str) {
    assert!(compile(source).is_err(), "{source:?} compiled");
}

#[test]
fn test_error_messages() {
    assert_eq!(compile(" "), Err(DefinitionError::Empty));
    let inverted = compile("a{3,1}").unwrap_err();
    assert!(matches!(inverted, DefinitionError::Invalid { .. }));
    assert!(!inverted.to_string().is_empty());
}
