//! Tests for option decoding.

use sqltree_options::*;

// ============================================================================
// Packed integer form
// ============================================================================

#[test]
fn test_zero_bits_is_default() {
    let opts = ParseOptions::from_bits(0).unwrap();
    assert_eq!(opts, ParseOptions::default());
}

#[test]
fn test_mode_bits() {
    let opts = ParseOptions::from_bits(2).unwrap();
    assert_eq!(opts.mode, ParseMode::PlpgsqlExpr);
    let opts = ParseOptions::from_bits(5).unwrap();
    assert_eq!(opts.mode, ParseMode::PlpgsqlAssign3);
}

#[test]
fn test_dialect_bits() {
    let opts = ParseOptions::from_bits(16 | 32 | 64).unwrap();
    assert!(!opts.backslash_quote);
    assert!(!opts.standard_conforming_strings);
    assert!(!opts.escape_string_warning);
    assert_eq!(opts.to_bits(), 16 | 32 | 64);
}

#[test]
fn test_unknown_mode_rejected() {
    let err = ParseOptions::from_bits(9).unwrap_err();
    assert!(matches!(err, OptionsError::UnknownMode(_)));
}

#[test]
fn test_unknown_bits_rejected() {
    let err = ParseOptions::from_bits(128).unwrap_err();
    match err {
        OptionsError::UnknownFlags(bits) => assert_eq!(bits, 128),
        other => panic!("unexpected error: {other}"),
    }
}

// ============================================================================
// JSON form
// ============================================================================

#[test]
fn test_json_partial_document() {
    let opts = ParseOptions::from_json(r#"{"mode": "typeName", "validate": true}"#).unwrap();
    assert_eq!(opts.mode, ParseMode::TypeName);
    assert!(opts.validate);
    assert!(opts.standard_conforming_strings);
    assert_eq!(opts.max_stack_depth, sqltree_core::DEFAULT_MAX_STACK_DEPTH);
}

#[test]
fn test_json_unknown_key_rejected() {
    let err = ParseOptions::from_json(r#"{"fingerprint": true}"#).unwrap_err();
    assert!(matches!(err, OptionsError::Json(_)));
    assert!(err.to_string().contains("fingerprint"));
}

#[test]
fn test_json_serializes_camel_case() {
    let json = serde_json::to_value(ParseOptions::default()).unwrap();
    assert_eq!(json["standardConformingStrings"], true);
    assert_eq!(json["mode"], "default");
}

// ============================================================================
// key=value form
// ============================================================================

#[test]
fn test_set_accepts_key_spellings() {
    let mut opts = ParseOptions::default();
    opts.set("max-stack-depth", "64").unwrap();
    opts.set("standard_conforming_strings", "off").unwrap();
    opts.set("mode", "plpgsql_assign2").unwrap();
    assert_eq!(opts.max_stack_depth, 64);
    assert!(!opts.standard_conforming_strings);
    assert_eq!(opts.mode, ParseMode::PlpgsqlAssign2);
}

#[test]
fn test_set_rejects_unknown_key() {
    let mut opts = ParseOptions::default();
    let err = opts.set("deparse", "on").unwrap_err();
    assert_eq!(err.to_string(), "unrecognized parse option: deparse");
}

#[test]
fn test_set_rejects_bad_value() {
    let mut opts = ParseOptions::default();
    assert!(matches!(
        opts.set("validate", "maybe"),
        Err(OptionsError::InvalidValue { .. })
    ));
    assert!(opts.set("maxStackDepth", "0").is_err());
}

#[test]
fn test_stack_depth_ceiling_bounded() {
    let mut opts = ParseOptions::default();
    let err = opts.set("maxStackDepth", "4000000000").unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid value \"4000000000\" for option maxStackDepth"
    );
    assert_eq!(opts.max_stack_depth, sqltree_core::DEFAULT_MAX_STACK_DEPTH);

    opts.set("maxStackDepth", &sqltree_core::MAX_STACK_DEPTH_LIMIT.to_string()).unwrap();
    assert_eq!(opts.max_stack_depth, sqltree_core::MAX_STACK_DEPTH_LIMIT);

    let err = ParseOptions::from_json(r#"{"maxStackDepth": 4000000000}"#).unwrap_err();
    assert!(matches!(err, OptionsError::InvalidValue { .. }));
    assert!(ParseOptions::from_json(r#"{"maxStackDepth": 0}"#).is_err());
}
