//! Type names, as written in casts, typed literals, and the type-name mode.

use sqltree_ast::*;
use sqltree_core::Location;
use sqltree_diagnostics::{messages, Result};
use sqltree_scanner::{Keyword, Token, TokenKind};

use crate::parser::Parser;
use crate::utilities::{is_col_label, is_type_function_name, is_type_keyword};

// Datetime field numbers; interval typmods carry `1 << field` masks.
const MONTH: i32 = 1;
const YEAR: i32 = 2;
const DAY: i32 = 3;
const HOUR: i32 = 10;
const MINUTE: i32 = 11;
const SECOND: i32 = 12;

const INTERVAL_FULL_RANGE: i32 = 0x7FFF;

fn interval_field(token: &Token) -> Option<i32> {
    if token.kind != TokenKind::Ident {
        return None;
    }
    let field = match token.value.as_str() {
        "year" => YEAR,
        "month" => MONTH,
        "day" => DAY,
        "hour" => HOUR,
        "minute" => MINUTE,
        "second" => SECOND,
        _ => return None,
    };
    Some(field)
}

impl<'t, 'c, 'a> Parser<'t, 'c, 'a> {
    /// `[SETOF] type [array bounds]`
    pub(crate) fn parse_type_name(&mut self) -> Result<TypeName<'a>> {
        let setof = self.eat_keyword(Keyword::Setof);
        let mut type_name = self.parse_simple_type_name(false)?;
        type_name.setof = setof;
        type_name.array_bounds = self.parse_opt_array_bounds()?;
        Ok(type_name)
    }

    /// `[]`, `[n]` (repeatable), `ARRAY`, or `ARRAY[n]`.
    fn parse_opt_array_bounds(&mut self) -> Result<&'a [i32]> {
        let mut bounds = Vec::new();
        if self.eat_keyword(Keyword::Array) {
            if self.eat_char(b'[') {
                bounds.push(self.expect_iconst()?);
                self.expect_char(b']')?;
            } else {
                bounds.push(-1);
            }
        } else {
            while self.eat_char(b'[') {
                if self.eat_char(b']') {
                    bounds.push(-1);
                } else {
                    bounds.push(self.expect_iconst()?);
                    self.expect_char(b']')?;
                }
            }
        }
        Ok(self.f.arena().alloc_vec(bounds))
    }

    /// A type without `SETOF` or array bounds.
    ///
    /// In a typed literal (`const_context`), `BIT` and `CHARACTER` get no
    /// default length and `INTERVAL` fields follow the string instead of
    /// the type.
    pub(crate) fn parse_simple_type_name(&mut self, const_context: bool) -> Result<TypeName<'a>> {
        let location = self.loc();
        let Some(kw) = self.current().keyword().filter(|&kw| is_type_keyword(kw)) else {
            return self.parse_generic_type_name();
        };
        self.bump();

        let type_name = match kw {
            Keyword::Int | Keyword::Integer => self.system_type("int4", location),
            Keyword::Smallint => self.system_type("int2", location),
            Keyword::Bigint => self.system_type("int8", location),
            Keyword::Real => self.system_type("float4", location),
            Keyword::Boolean => self.system_type("bool", location),
            Keyword::Double => {
                self.expect_keyword(Keyword::Precision)?;
                self.system_type("float8", location)
            }
            Keyword::Float => self.parse_float_precision(location)?,
            Keyword::Decimal | Keyword::Dec | Keyword::Numeric => TypeName {
                typmods: self.parse_opt_type_modifiers()?,
                ..self.system_type("numeric", location)
            },
            Keyword::Bit => {
                let varying = self.eat_keyword(Keyword::Varying);
                let mut type_name = self.system_type(if varying { "varbit" } else { "bit" }, location);
                if self.at_char(b'(') {
                    type_name.typmods = self.parse_opt_type_modifiers()?;
                } else if !varying && !const_context {
                    type_name.typmods = self.f.list(vec![self.f.int_const(1, Location::UNKNOWN)]);
                }
                type_name
            }
            Keyword::Character | Keyword::Char | Keyword::Varchar => {
                let varying = kw == Keyword::Varchar || self.eat_keyword(Keyword::Varying);
                let mut type_name = self.system_type(if varying { "varchar" } else { "bpchar" }, location);
                if self.eat_char(b'(') {
                    let length_location = self.loc();
                    let length = self.expect_iconst()?;
                    self.expect_char(b')')?;
                    type_name.typmods = self.f.list(vec![self.f.int_const(length, length_location)]);
                } else if !varying && !const_context {
                    type_name.typmods = self.f.list(vec![self.f.int_const(1, Location::UNKNOWN)]);
                }
                type_name
            }
            Keyword::Timestamp | Keyword::Time => {
                let typmods = if self.eat_char(b'(') {
                    let precision_location = self.loc();
                    let precision = self.expect_iconst()?;
                    self.expect_char(b')')?;
                    self.f.list(vec![self.f.int_const(precision, precision_location)])
                } else {
                    &[]
                };
                let with_zone = self.parse_opt_timezone()?;
                let name = match (kw, with_zone) {
                    (Keyword::Timestamp, true) => "timestamptz",
                    (Keyword::Timestamp, false) => "timestamp",
                    (_, true) => "timetz",
                    (_, false) => "time",
                };
                TypeName {
                    typmods,
                    ..self.system_type(name, location)
                }
            }
            _ => {
                let mut type_name = self.system_type("interval", location);
                if self.eat_char(b'(') {
                    let precision_location = self.loc();
                    let precision = self.expect_iconst()?;
                    self.expect_char(b')')?;
                    type_name.typmods = self.f.list(vec![
                        self.f.int_const(INTERVAL_FULL_RANGE, Location::UNKNOWN),
                        self.f.int_const(precision, precision_location),
                    ]);
                } else if !const_context {
                    type_name.typmods = self.parse_opt_interval()?;
                }
                type_name
            }
        };
        Ok(type_name)
    }

    fn system_type(&self, name: &str, location: Location) -> TypeName<'a> {
        self.f.type_name(self.f.names(&["pg_catalog", name]), location)
    }

    /// `name[.attr...] [(modifiers)]` or `name[.attr...] %TYPE`.
    fn parse_generic_type_name(&mut self) -> Result<TypeName<'a>> {
        let location = self.loc();
        if !is_type_function_name(self.current()) {
            return Err(self.syntax_error());
        }
        let mut names = vec![self.name_of(self.current())];
        self.bump();
        while self.at_char(b'.') && is_col_label(self.peek_at(1)) {
            self.bump();
            names.push(self.parse_col_label()?);
        }
        let mut type_name = self.f.type_name(self.f.arena().alloc_vec(names), location);

        let pct_type = self.at_char(b'%') && self.peek_at(1).kind == TokenKind::Ident && self.peek_at(1).value == "type";
        if pct_type {
            self.bump();
            self.bump();
            type_name.pct_type = true;
        } else {
            type_name.typmods = self.parse_opt_type_modifiers()?;
        }
        Ok(type_name)
    }

    fn parse_opt_type_modifiers(&mut self) -> Result<NodeList<'a>> {
        if !self.eat_char(b'(') {
            return Ok(&[]);
        }
        let modifiers = self.parse_expr_list()?;
        self.expect_char(b')')?;
        Ok(self.f.list(modifiers))
    }

    /// `FLOAT [(p)]`: up to 24 bits is `float4`, up to 53 is `float8`.
    fn parse_float_precision(&mut self, location: Location) -> Result<TypeName<'a>> {
        if !self.at_char(b'(') {
            return Ok(self.system_type("float8", location));
        }
        let paren_location = self.loc();
        self.bump();
        let precision = self.expect_iconst()?;
        self.expect_char(b')')?;
        let name = match precision {
            i32::MIN..=0 => return Err(self.error_at(&messages::FLOAT_PRECISION_TOO_SMALL, paren_location)),
            1..=24 => "float4",
            25..=53 => "float8",
            _ => return Err(self.error_at(&messages::FLOAT_PRECISION_TOO_LARGE, paren_location)),
        };
        Ok(self.system_type(name, location))
    }

    /// `[WITH | WITHOUT] TIME ZONE`; whether the zone is included.
    fn parse_opt_timezone(&mut self) -> Result<bool> {
        let with = self.at_keyword(Keyword::With);
        if !(with || self.at_keyword(Keyword::Without)) || !self.peek_keyword(1, Keyword::Time) {
            return Ok(false);
        }
        self.bump();
        self.bump();
        self.expect_keyword(Keyword::Zone)?;
        Ok(with)
    }

    /// Interval field restriction such as `DAY TO SECOND(3)`, as typmods.
    pub(crate) fn parse_opt_interval(&mut self) -> Result<NodeList<'a>> {
        let Some(start) = interval_field(self.current()) else {
            return Ok(&[]);
        };
        let location = self.loc();
        self.bump();

        let mut mask = 1 << start;
        let mut end = start;
        if self.at_keyword(Keyword::To) {
            self.bump();
            let Some(to) = interval_field(self.current()) else {
                return Err(self.syntax_error());
            };
            let valid = matches!(
                (start, to),
                (YEAR, MONTH) | (DAY, HOUR | MINUTE | SECOND) | (HOUR, MINUTE | SECOND) | (MINUTE, SECOND)
            );
            if !valid {
                return Err(self.syntax_error());
            }
            self.bump();
            mask = if start == YEAR {
                (1 << YEAR) | (1 << MONTH)
            } else {
                [DAY, HOUR, MINUTE, SECOND]
                    .into_iter()
                    .filter(|field| (start..=to).contains(field))
                    .fold(0, |mask, field| mask | (1 << field))
            };
            end = to;
        }

        let mut typmods = vec![self.f.int_const(mask, location)];
        if end == SECOND && self.eat_char(b'(') {
            let precision_location = self.loc();
            let precision = self.expect_iconst()?;
            self.expect_char(b')')?;
            typmods.push(self.f.int_const(precision, precision_location));
        }
        Ok(self.f.list(typmods))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_fields_are_identifiers() {
        let day = Token::new(TokenKind::Ident, 0, 3).with_value("day".to_string());
        let quoted = Token::new(TokenKind::Ident, 0, 5).with_value("Day".to_string());
        assert_eq!(interval_field(&day), Some(DAY));
        assert_eq!(interval_field(&quoted), None);
    }
}
