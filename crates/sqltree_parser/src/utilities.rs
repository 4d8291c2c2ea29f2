//! Parser utility functions.

use sqltree_scanner::{Keyword, KeywordCategory, Token, TokenKind};

/// `ColId`: an identifier, or a keyword that may name a column.
pub(crate) fn is_col_id(token: &Token) -> bool {
    match token.kind {
        TokenKind::Ident => true,
        TokenKind::Keyword(kw) => matches!(kw.category(), KeywordCategory::Unreserved | KeywordCategory::ColName),
        _ => false,
    }
}

/// `type_function_name`: an identifier, or a keyword that may name a type
/// or function.
pub(crate) fn is_type_function_name(token: &Token) -> bool {
    match token.kind {
        TokenKind::Ident => true,
        TokenKind::Keyword(kw) => matches!(
            kw.category(),
            KeywordCategory::Unreserved | KeywordCategory::TypeFuncName
        ),
        _ => false,
    }
}

/// `ColLabel`: any identifier or keyword.
pub(crate) fn is_col_label(token: &Token) -> bool {
    matches!(token.kind, TokenKind::Ident | TokenKind::Keyword(_))
}

/// A target-list label that may follow its expression without `AS`.
pub(crate) fn is_bare_label(token: &Token) -> bool {
    match token.kind {
        TokenKind::Ident => true,
        TokenKind::Keyword(kw) => kw.category() == KeywordCategory::Unreserved,
        _ => false,
    }
}

/// Keywords that begin a parenthesizable query.
pub(crate) fn starts_select(token: &Token) -> bool {
    matches!(
        token.keyword(),
        Some(Keyword::Select | Keyword::Values | Keyword::With | Keyword::Table)
    )
}

/// Built-in type keywords that may begin a typed literal or type name.
pub(crate) fn is_type_keyword(kw: Keyword) -> bool {
    matches!(
        kw,
        Keyword::Int
            | Keyword::Integer
            | Keyword::Smallint
            | Keyword::Bigint
            | Keyword::Real
            | Keyword::Float
            | Keyword::Double
            | Keyword::Decimal
            | Keyword::Dec
            | Keyword::Numeric
            | Keyword::Boolean
            | Keyword::Bit
            | Keyword::Char
            | Keyword::Character
            | Keyword::Varchar
            | Keyword::Timestamp
            | Keyword::Time
            | Keyword::Interval
    )
}

/// Node name for a utility statement, from its leading words (lower case).
///
/// Utility statements are captured whole as `Unrecognized` nodes carrying
/// this name. Returns `None` when the first word does not begin any
/// statement.
pub fn utility_statement_name(words: &[&str]) -> Option<&'static str> {
    let (&verb, rest) = words.split_first()?;
    let second = rest.first().copied().unwrap_or("");
    let name = match verb {
        "create" => create_statement_name(rest),
        "alter" => alter_statement_name(second),
        "drop" => match second {
            "role" | "user" | "group" => "DropRoleStmt",
            "database" => "DropdbStmt",
            "tablespace" => "DropTableSpaceStmt",
            "owned" => "DropOwnedStmt",
            _ => "DropStmt",
        },
        "truncate" => "TruncateStmt",
        "begin" | "start" | "commit" | "end" | "rollback" | "abort" | "savepoint" | "release" => "TransactionStmt",
        "prepare" if second == "transaction" => "TransactionStmt",
        "prepare" => "PrepareStmt",
        "set" if second == "constraints" => "ConstraintsSetStmt",
        "set" | "reset" => "VariableSetStmt",
        "show" => "VariableShowStmt",
        "explain" => "ExplainStmt",
        "copy" => "CopyStmt",
        "grant" | "revoke" => "GrantStmt",
        "vacuum" | "analyze" | "analyse" => "VacuumStmt",
        "execute" => "ExecuteStmt",
        "deallocate" => "DeallocateStmt",
        "listen" => "ListenStmt",
        "unlisten" => "UnlistenStmt",
        "notify" => "NotifyStmt",
        "lock" => "LockStmt",
        "declare" => "DeclareCursorStmt",
        "fetch" | "move" => "FetchStmt",
        "close" => "ClosePortalStmt",
        "call" => "CallStmt",
        "do" => "DoStmt",
        "comment" => "CommentStmt",
        "checkpoint" => "CheckPointStmt",
        "discard" => "DiscardStmt",
        "refresh" => "RefreshMatViewStmt",
        "reindex" => "ReindexStmt",
        "cluster" => "ClusterStmt",
        "load" => "LoadStmt",
        "import" => "ImportForeignSchemaStmt",
        "reassign" => "ReassignOwnedStmt",
        "security" => "SecLabelStmt",
        _ => return None,
    };
    Some(name)
}

fn create_statement_name(words: &[&str]) -> &'static str {
    const MODIFIERS: &[&str] = &[
        "or", "replace", "temp", "temporary", "unlogged", "global", "local", "unique", "trusted", "procedural",
        "default",
    ];
    let mut objects = words.iter().copied().skip_while(|w| MODIFIERS.contains(w));
    let object = objects.next().unwrap_or("");
    match object {
        "table" => "CreateStmt",
        "index" => "IndexStmt",
        "view" | "recursive" => "ViewStmt",
        "materialized" => "CreateTableAsStmt",
        "function" | "procedure" => "CreateFunctionStmt",
        "schema" => "CreateSchemaStmt",
        "sequence" => "CreateSeqStmt",
        "extension" => "CreateExtensionStmt",
        "trigger" | "constraint" => "CreateTrigStmt",
        "event" => "CreateEventTrigStmt",
        "role" | "user" | "group" => "CreateRoleStmt",
        "database" => "CreatedbStmt",
        "domain" => "CreateDomainStmt",
        "type" | "aggregate" | "operator" | "collation" | "text" => "DefineStmt",
        "policy" => "CreatePolicyStmt",
        "rule" => "RuleStmt",
        "tablespace" => "CreateTableSpaceStmt",
        "foreign" => match objects.next() {
            Some("table") => "CreateForeignTableStmt",
            _ => "CreateFdwStmt",
        },
        "server" => "CreateForeignServerStmt",
        "publication" => "CreatePublicationStmt",
        "subscription" => "CreateSubscriptionStmt",
        "cast" => "CreateCastStmt",
        "language" => "CreatePLangStmt",
        "statistics" => "CreateStatsStmt",
        "access" => "CreateAmStmt",
        "conversion" => "CreateConversionStmt",
        "transform" => "CreateTransformStmt",
        _ => "CreateStmt",
    }
}

fn alter_statement_name(object: &str) -> &'static str {
    match object {
        "table" | "index" | "view" | "sequence" | "materialized" | "foreign" => "AlterTableStmt",
        "role" | "user" | "group" => "AlterRoleStmt",
        "database" => "AlterDatabaseStmt",
        "function" | "procedure" | "routine" => "AlterFunctionStmt",
        "domain" => "AlterDomainStmt",
        "type" => "AlterTypeStmt",
        "system" => "AlterSystemStmt",
        "extension" => "AlterExtensionStmt",
        "default" => "AlterDefaultPrivilegesStmt",
        "publication" => "AlterPublicationStmt",
        "subscription" => "AlterSubscriptionStmt",
        "policy" => "AlterPolicyStmt",
        _ => "RenameStmt",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utility_names() {
        assert_eq!(utility_statement_name(&["create", "table", "t"]), Some("CreateStmt"));
        assert_eq!(
            utility_statement_name(&["create", "or", "replace", "view"]),
            Some("ViewStmt")
        );
        assert_eq!(
            utility_statement_name(&["create", "unique", "index"]),
            Some("IndexStmt")
        );
        assert_eq!(utility_statement_name(&["drop", "table"]), Some("DropStmt"));
        assert_eq!(
            utility_statement_name(&["prepare", "transaction"]),
            Some("TransactionStmt")
        );
        assert_eq!(utility_statement_name(&["prepare", "q"]), Some("PrepareStmt"));
        assert_eq!(utility_statement_name(&["selec"]), None);
        assert_eq!(utility_statement_name(&[]), None);
    }

    #[test]
    fn test_token_categories() {
        let ident = Token::new(TokenKind::Ident, 0, 1);
        let int = Token::new(TokenKind::Keyword(Keyword::Int), 0, 3);
        let left = Token::new(TokenKind::Keyword(Keyword::Left), 0, 4);
        let select = Token::new(TokenKind::Keyword(Keyword::Select), 0, 6);
        assert!(is_col_id(&ident) && is_col_id(&int) && !is_col_id(&left));
        assert!(is_type_function_name(&left) && !is_type_function_name(&int));
        assert!(is_col_label(&select) && !is_bare_label(&select));
        assert!(starts_select(&select));
    }
}
