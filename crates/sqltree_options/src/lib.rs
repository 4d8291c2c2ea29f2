//! sqltree_options: Parse options.
//!
//! [`ParseOptions`] is the one configuration value accepted by the parse
//! entry point. It can be built in code, decoded from JSON, decoded from the
//! packed integer form used by foreign callers, or adjusted one `key=value`
//! at a time. Every decoder is strict: unknown keys, bits, and modes are
//! rejected rather than ignored.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use sqltree_core::{DEFAULT_MAX_STACK_DEPTH, MAX_STACK_DEPTH_LIMIT};
use std::fmt;
use std::str::FromStr;

/// Errors produced while decoding options.
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("unrecognized parse option: {0}")]
    UnknownOption(String),

    #[error("unrecognized option bits: {0:#x}")]
    UnknownFlags(u32),

    #[error("unrecognized parse mode: {0}")]
    UnknownMode(String),

    #[error("invalid value \"{value}\" for option {key}")]
    InvalidValue { key: String, value: String },

    #[error("invalid options document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot read options file: {0}")]
    Io(#[from] std::io::Error),
}

/// What the input text is expected to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParseMode {
    /// A list of statements separated by semicolons.
    #[default]
    Default,
    /// A single type name.
    TypeName,
    /// An expression, returned as a target-list-only SELECT.
    PlpgsqlExpr,
    /// `name := expr`
    PlpgsqlAssign1,
    /// `name.field := expr`
    PlpgsqlAssign2,
    /// `name.field.field := expr`
    PlpgsqlAssign3,
}

impl ParseMode {
    pub const ALL: [ParseMode; 6] = [
        ParseMode::Default,
        ParseMode::TypeName,
        ParseMode::PlpgsqlExpr,
        ParseMode::PlpgsqlAssign1,
        ParseMode::PlpgsqlAssign2,
        ParseMode::PlpgsqlAssign3,
    ];

    /// Position of the mode in the packed integer form.
    pub fn to_raw(self) -> u32 {
        self as u32
    }

    pub fn from_raw(raw: u32) -> Option<ParseMode> {
        Self::ALL.get(raw as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            ParseMode::Default => "default",
            ParseMode::TypeName => "typeName",
            ParseMode::PlpgsqlExpr => "plpgsqlExpr",
            ParseMode::PlpgsqlAssign1 => "plpgsqlAssign1",
            ParseMode::PlpgsqlAssign2 => "plpgsqlAssign2",
            ParseMode::PlpgsqlAssign3 => "plpgsqlAssign3",
        }
    }

    /// Number of dotted name parts on the left of `:=`, for the assignment modes.
    pub fn assign_names(self) -> Option<usize> {
        match self {
            ParseMode::PlpgsqlAssign1 => Some(1),
            ParseMode::PlpgsqlAssign2 => Some(2),
            ParseMode::PlpgsqlAssign3 => Some(3),
            _ => None,
        }
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParseMode {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_key(s);
        Self::ALL
            .iter()
            .copied()
            .find(|m| normalize_key(m.name()) == wanted)
            .ok_or_else(|| OptionsError::UnknownMode(s.to_string()))
    }
}

bitflags! {
    /// The packed integer option form. The low four bits hold the
    /// [`ParseMode`]; the remaining bits switch dialect defaults off.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ParserFlags: u32 {
        const MODE_MASK = 0x0F;
        const DISABLE_BACKSLASH_QUOTE = 16;
        const DISABLE_STANDARD_CONFORMING_STRINGS = 32;
        const DISABLE_ESCAPE_STRING_WARNING = 64;
    }
}

/// Options for one parse call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ParseOptions {
    pub mode: ParseMode,

    // -- Dialect --
    /// Allow `\'` inside string literals when backslashes are escapes.
    pub backslash_quote: bool,
    /// Treat backslashes in `'...'` literally.
    pub standard_conforming_strings: bool,
    /// Warn about backslash escapes in `'...'` literals.
    pub escape_string_warning: bool,

    // -- Post-processing --
    /// Fill unknown statement locations from the statement's contents.
    pub resolve_statement_locations: bool,
    /// Walk the whole tree, sub-queries included, reporting unrecognized kinds.
    pub validate: bool,

    /// Recursion ceiling for parsing and traversal, between 1 and
    /// [`MAX_STACK_DEPTH_LIMIT`]. The native stack budget applies
    /// regardless of this value.
    pub max_stack_depth: u32,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            mode: ParseMode::Default,
            backslash_quote: true,
            standard_conforming_strings: true,
            escape_string_warning: true,
            resolve_statement_locations: true,
            validate: false,
            max_stack_depth: DEFAULT_MAX_STACK_DEPTH,
        }
    }
}

impl ParseOptions {
    pub fn with_mode(mode: ParseMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Decode the packed integer form.
    pub fn from_bits(bits: u32) -> Result<Self, OptionsError> {
        let flags = ParserFlags::from_bits(bits)
            .ok_or(OptionsError::UnknownFlags(bits & !ParserFlags::all().bits()))?;
        let raw_mode = (flags & ParserFlags::MODE_MASK).bits();
        let mode = ParseMode::from_raw(raw_mode).ok_or_else(|| OptionsError::UnknownMode(raw_mode.to_string()))?;
        Ok(Self {
            mode,
            backslash_quote: !flags.contains(ParserFlags::DISABLE_BACKSLASH_QUOTE),
            standard_conforming_strings: !flags.contains(ParserFlags::DISABLE_STANDARD_CONFORMING_STRINGS),
            escape_string_warning: !flags.contains(ParserFlags::DISABLE_ESCAPE_STRING_WARNING),
            ..Self::default()
        })
    }

    /// Encode the mode and dialect toggles in the packed integer form.
    pub fn to_bits(&self) -> u32 {
        let mut flags = ParserFlags::from_bits_retain(self.mode.to_raw());
        flags.set(ParserFlags::DISABLE_BACKSLASH_QUOTE, !self.backslash_quote);
        flags.set(ParserFlags::DISABLE_STANDARD_CONFORMING_STRINGS, !self.standard_conforming_strings);
        flags.set(ParserFlags::DISABLE_ESCAPE_STRING_WARNING, !self.escape_string_warning);
        flags.bits()
    }

    /// Decode a JSON options document. Absent keys keep their defaults.
    pub fn from_json(content: &str) -> Result<Self, OptionsError> {
        let options: Self = serde_json::from_str(content)?;
        check_stack_depth_option(options.max_stack_depth).ok_or_else(|| OptionsError::InvalidValue {
            key: "maxStackDepth".to_string(),
            value: options.max_stack_depth.to_string(),
        })?;
        Ok(options)
    }

    /// Decode a JSON options file.
    pub fn from_file(path: &str) -> Result<Self, OptionsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Set one option from its textual form. Keys match case-insensitively
    /// and ignore `_` and `-`, so `maxStackDepth` and `max-stack-depth` are
    /// the same key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), OptionsError> {
        let invalid = || OptionsError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        match normalize_key(key).as_str() {
            "mode" => self.mode = value.parse()?,
            "backslashquote" => self.backslash_quote = parse_bool(value).ok_or_else(invalid)?,
            "standardconformingstrings" => {
                self.standard_conforming_strings = parse_bool(value).ok_or_else(invalid)?
            }
            "escapestringwarning" => self.escape_string_warning = parse_bool(value).ok_or_else(invalid)?,
            "resolvestatementlocations" => {
                self.resolve_statement_locations = parse_bool(value).ok_or_else(invalid)?
            }
            "validate" => self.validate = parse_bool(value).ok_or_else(invalid)?,
            "maxstackdepth" => {
                self.max_stack_depth = value
                    .parse::<u32>()
                    .ok()
                    .and_then(check_stack_depth_option)
                    .ok_or_else(invalid)?
            }
            _ => return Err(OptionsError::UnknownOption(key.to_string())),
        }
        Ok(())
    }
}

fn check_stack_depth_option(depth: u32) -> Option<u32> {
    (1..=MAX_STACK_DEPTH_LIMIT).contains(&depth).then_some(depth)
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}
