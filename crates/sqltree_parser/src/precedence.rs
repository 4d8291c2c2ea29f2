//! Operator precedence for infix and postfix expression operators.

use sqltree_scanner::{Keyword, Token, TokenKind};

/// Binding strength of expression operators, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Precedence {
    Lowest = 0,
    Or = 1,
    And = 2,
    Not = 3,
    /// `IS`, `ISNULL`, `NOTNULL`
    Is = 4,
    /// `< > = <= >= <>`
    Comparison = 5,
    /// `BETWEEN IN LIKE ILIKE SIMILAR` and their `NOT` forms
    Like = 6,
    Escape = 7,
    /// Any other operator
    Op = 8,
    /// `+ -`
    Additive = 9,
    /// `* / %`
    Multiplicative = 10,
    /// `^`
    Exponent = 11,
    /// `AT TIME ZONE`, `AT LOCAL`
    At = 12,
    Collate = 13,
    /// Prefix minus and plus
    Unary = 14,
    /// `::`
    Highest = 15,
}

impl Precedence {
    /// The next tighter level; operands of a left-associative or
    /// non-associative operator are parsed at this level.
    pub fn next(self) -> Precedence {
        match self {
            Precedence::Lowest => Precedence::Or,
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::Not,
            Precedence::Not => Precedence::Is,
            Precedence::Is => Precedence::Comparison,
            Precedence::Comparison => Precedence::Like,
            Precedence::Like => Precedence::Escape,
            Precedence::Escape => Precedence::Op,
            Precedence::Op => Precedence::Additive,
            Precedence::Additive => Precedence::Multiplicative,
            Precedence::Multiplicative => Precedence::Exponent,
            Precedence::Exponent => Precedence::At,
            Precedence::At => Precedence::Collate,
            Precedence::Collate => Precedence::Unary,
            Precedence::Unary | Precedence::Highest => Precedence::Highest,
        }
    }

    /// Whether a second operator of the same level may follow without
    /// parentheses.
    pub fn is_associative(self) -> bool {
        !matches!(self, Precedence::Is | Precedence::Comparison | Precedence::Like)
    }
}

/// Precedence of `token` used as an infix or postfix operator, given the
/// token after it.
pub fn infix_precedence(token: &Token, next: &Token) -> Option<Precedence> {
    let prec = match token.kind {
        TokenKind::Keyword(Keyword::Or) => Precedence::Or,
        TokenKind::Keyword(Keyword::And) => Precedence::And,
        TokenKind::Keyword(Keyword::Is | Keyword::Isnull | Keyword::Notnull) => Precedence::Is,
        TokenKind::Char(b'<' | b'>' | b'=') | TokenKind::LessEquals | TokenKind::GreaterEquals | TokenKind::NotEquals => {
            Precedence::Comparison
        }
        TokenKind::Keyword(Keyword::Between | Keyword::In | Keyword::Like | Keyword::Ilike | Keyword::Similar) => {
            Precedence::Like
        }
        TokenKind::Keyword(Keyword::Not)
            if matches!(
                next.keyword(),
                Some(Keyword::Between | Keyword::In | Keyword::Like | Keyword::Ilike | Keyword::Similar)
            ) =>
        {
            Precedence::Like
        }
        TokenKind::Op => Precedence::Op,
        TokenKind::Char(b'+' | b'-') => Precedence::Additive,
        TokenKind::Char(b'*' | b'/' | b'%') => Precedence::Multiplicative,
        TokenKind::Char(b'^') => Precedence::Exponent,
        TokenKind::Keyword(Keyword::At) if matches!(next.keyword(), Some(Keyword::Time | Keyword::Local)) => {
            Precedence::At
        }
        TokenKind::Keyword(Keyword::Collate) => Precedence::Collate,
        TokenKind::Typecast => Precedence::Highest,
        _ => return None,
    };
    Some(prec)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(kind: TokenKind) -> Token {
        Token::new(kind, 0, 0)
    }

    #[test]
    fn test_ordering() {
        assert!(Precedence::Or < Precedence::And);
        assert!(Precedence::Comparison < Precedence::Op);
        assert!(Precedence::Multiplicative < Precedence::Exponent);
        assert_eq!(Precedence::Unary.next(), Precedence::Highest);
    }

    #[test]
    fn test_not_is_infix_only_before_pattern_keywords() {
        let not = tok(TokenKind::Keyword(Keyword::Not));
        assert_eq!(
            infix_precedence(&not, &tok(TokenKind::Keyword(Keyword::In))),
            Some(Precedence::Like)
        );
        assert_eq!(infix_precedence(&not, &tok(TokenKind::Ident)), None);
    }

    #[test]
    fn test_comparisons_are_non_associative() {
        assert!(!Precedence::Comparison.is_associative());
        assert!(Precedence::Additive.is_associative());
    }
}
