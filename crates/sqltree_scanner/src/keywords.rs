//! The keyword table.
//!
//! Categories follow the server grammar: reserved keywords can never be
//! identifiers, type/function-name keywords can name types and functions but
//! not columns, column-name keywords can name columns but not functions, and
//! unreserved keywords can be used anywhere an identifier can.

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

/// How freely a keyword may be used as an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordCategory {
    Unreserved,
    ColName,
    TypeFuncName,
    Reserved,
}

macro_rules! keywords {
    ($( $variant:ident = $text:literal, $category:ident; )*) => {
        /// A recognised keyword.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Keyword {
            $( $variant, )*
        }

        impl Keyword {
            pub const ALL: &'static [Keyword] = &[ $( Keyword::$variant, )* ];

            /// The lower-case spelling.
            pub fn text(self) -> &'static str {
                match self {
                    $( Keyword::$variant => $text, )*
                }
            }

            pub fn category(self) -> KeywordCategory {
                match self {
                    $( Keyword::$variant => KeywordCategory::$category, )*
                }
            }
        }
    };
}

keywords! {
    Abort = "abort", Unreserved;
    All = "all", Reserved;
    Alter = "alter", Unreserved;
    Always = "always", Unreserved;
    Analyse = "analyse", Reserved;
    Analyze = "analyze", Reserved;
    And = "and", Reserved;
    Any = "any", Reserved;
    Array = "array", Reserved;
    As = "as", Reserved;
    Asc = "asc", Reserved;
    Asymmetric = "asymmetric", Reserved;
    At = "at", Unreserved;
    Authorization = "authorization", TypeFuncName;
    Begin = "begin", Unreserved;
    Between = "between", ColName;
    Bigint = "bigint", ColName;
    Binary = "binary", TypeFuncName;
    Bit = "bit", ColName;
    Boolean = "boolean", ColName;
    Both = "both", Reserved;
    By = "by", Unreserved;
    Call = "call", Unreserved;
    Cascade = "cascade", Unreserved;
    Case = "case", Reserved;
    Cast = "cast", Reserved;
    Char = "char", ColName;
    Character = "character", ColName;
    Check = "check", Reserved;
    Checkpoint = "checkpoint", Unreserved;
    Close = "close", Unreserved;
    Cluster = "cluster", Unreserved;
    Coalesce = "coalesce", ColName;
    Collate = "collate", Reserved;
    Collation = "collation", TypeFuncName;
    Column = "column", Reserved;
    Comment = "comment", Unreserved;
    Commit = "commit", Unreserved;
    Concurrently = "concurrently", TypeFuncName;
    Conflict = "conflict", Unreserved;
    Constraint = "constraint", Reserved;
    Copy = "copy", Unreserved;
    Create = "create", Reserved;
    Cross = "cross", TypeFuncName;
    Cube = "cube", Unreserved;
    Current = "current", Unreserved;
    CurrentCatalog = "current_catalog", Reserved;
    CurrentDate = "current_date", Reserved;
    CurrentRole = "current_role", Reserved;
    CurrentSchema = "current_schema", TypeFuncName;
    CurrentTime = "current_time", Reserved;
    CurrentTimestamp = "current_timestamp", Reserved;
    CurrentUser = "current_user", Reserved;
    Cursor = "cursor", Unreserved;
    Deallocate = "deallocate", Unreserved;
    Dec = "dec", ColName;
    Decimal = "decimal", ColName;
    Declare = "declare", Unreserved;
    Default = "default", Reserved;
    Deferrable = "deferrable", Reserved;
    Delete = "delete", Unreserved;
    Desc = "desc", Reserved;
    Discard = "discard", Unreserved;
    Distinct = "distinct", Reserved;
    Do = "do", Reserved;
    Double = "double", Unreserved;
    Drop = "drop", Unreserved;
    Else = "else", Reserved;
    End = "end", Reserved;
    Escape = "escape", Unreserved;
    Except = "except", Reserved;
    Exclude = "exclude", Unreserved;
    Execute = "execute", Unreserved;
    Exists = "exists", ColName;
    Explain = "explain", Unreserved;
    False = "false", Reserved;
    Fetch = "fetch", Reserved;
    Filter = "filter", Unreserved;
    First = "first", Unreserved;
    Float = "float", ColName;
    Following = "following", Unreserved;
    For = "for", Reserved;
    Foreign = "foreign", Reserved;
    Freeze = "freeze", TypeFuncName;
    From = "from", Reserved;
    Full = "full", TypeFuncName;
    Grant = "grant", Reserved;
    Greatest = "greatest", ColName;
    Group = "group", Reserved;
    Grouping = "grouping", ColName;
    Groups = "groups", Unreserved;
    Having = "having", Reserved;
    Ilike = "ilike", TypeFuncName;
    Import = "import", Unreserved;
    In = "in", Reserved;
    Initially = "initially", Reserved;
    Inner = "inner", TypeFuncName;
    Insert = "insert", Unreserved;
    Int = "int", ColName;
    Integer = "integer", ColName;
    Intersect = "intersect", Reserved;
    Interval = "interval", ColName;
    Into = "into", Reserved;
    Is = "is", TypeFuncName;
    Isnull = "isnull", TypeFuncName;
    Join = "join", TypeFuncName;
    Key = "key", Unreserved;
    Last = "last", Unreserved;
    Lateral = "lateral", Reserved;
    Leading = "leading", Reserved;
    Least = "least", ColName;
    Left = "left", TypeFuncName;
    Like = "like", TypeFuncName;
    Limit = "limit", Reserved;
    Listen = "listen", Unreserved;
    Load = "load", Unreserved;
    Local = "local", Unreserved;
    Localtime = "localtime", Reserved;
    Localtimestamp = "localtimestamp", Reserved;
    Lock = "lock", Unreserved;
    Locked = "locked", Unreserved;
    Matched = "matched", Unreserved;
    Materialized = "materialized", Unreserved;
    Merge = "merge", Unreserved;
    Move = "move", Unreserved;
    Natural = "natural", TypeFuncName;
    Next = "next", Unreserved;
    No = "no", Unreserved;
    None = "none", ColName;
    Not = "not", Reserved;
    Nothing = "nothing", Unreserved;
    Notify = "notify", Unreserved;
    Notnull = "notnull", TypeFuncName;
    Nowait = "nowait", Unreserved;
    Null = "null", Reserved;
    Nullif = "nullif", ColName;
    Nulls = "nulls", Unreserved;
    Numeric = "numeric", ColName;
    Of = "of", Unreserved;
    Offset = "offset", Reserved;
    On = "on", Reserved;
    Only = "only", Reserved;
    Or = "or", Reserved;
    Order = "order", Reserved;
    Ordinality = "ordinality", Unreserved;
    Others = "others", Unreserved;
    Outer = "outer", TypeFuncName;
    Over = "over", Unreserved;
    Overlaps = "overlaps", TypeFuncName;
    Overriding = "overriding", Unreserved;
    Partition = "partition", Unreserved;
    Placing = "placing", Reserved;
    Preceding = "preceding", Unreserved;
    Precision = "precision", ColName;
    Prepare = "prepare", Unreserved;
    Primary = "primary", Reserved;
    Range = "range", Unreserved;
    Real = "real", ColName;
    Reassign = "reassign", Unreserved;
    Recursive = "recursive", Unreserved;
    References = "references", Reserved;
    Refresh = "refresh", Unreserved;
    Reindex = "reindex", Unreserved;
    Release = "release", Unreserved;
    Repeatable = "repeatable", Unreserved;
    Reset = "reset", Unreserved;
    Returning = "returning", Reserved;
    Revoke = "revoke", Unreserved;
    Right = "right", TypeFuncName;
    Rollback = "rollback", Unreserved;
    Rollup = "rollup", Unreserved;
    Row = "row", ColName;
    Rows = "rows", Unreserved;
    Savepoint = "savepoint", Unreserved;
    Security = "security", Unreserved;
    Select = "select", Reserved;
    SessionUser = "session_user", Reserved;
    Set = "set", Unreserved;
    Setof = "setof", ColName;
    Sets = "sets", Unreserved;
    Share = "share", Unreserved;
    Show = "show", Unreserved;
    Similar = "similar", TypeFuncName;
    Skip = "skip", Unreserved;
    Smallint = "smallint", ColName;
    Some = "some", Reserved;
    Source = "source", Unreserved;
    Start = "start", Unreserved;
    Symmetric = "symmetric", Reserved;
    System = "system", Unreserved;
    SystemUser = "system_user", Reserved;
    Table = "table", Reserved;
    Tablesample = "tablesample", TypeFuncName;
    Target = "target", Unreserved;
    Temp = "temp", Unreserved;
    Temporary = "temporary", Unreserved;
    Then = "then", Reserved;
    Ties = "ties", Unreserved;
    Time = "time", ColName;
    Timestamp = "timestamp", ColName;
    To = "to", Reserved;
    Trailing = "trailing", Reserved;
    True = "true", Reserved;
    Truncate = "truncate", Unreserved;
    Unbounded = "unbounded", Unreserved;
    Union = "union", Reserved;
    Unique = "unique", Reserved;
    Unknown = "unknown", Unreserved;
    Unlisten = "unlisten", Unreserved;
    Unlogged = "unlogged", Unreserved;
    Update = "update", Unreserved;
    User = "user", Reserved;
    Using = "using", Reserved;
    Vacuum = "vacuum", Unreserved;
    Value = "value", Unreserved;
    Values = "values", ColName;
    Varchar = "varchar", ColName;
    Variadic = "variadic", Reserved;
    Varying = "varying", Unreserved;
    When = "when", Reserved;
    Where = "where", Reserved;
    Window = "window", Reserved;
    With = "with", Reserved;
    Within = "within", Unreserved;
    Without = "without", Unreserved;
    Zone = "zone", Unreserved;
}

lazy_static! {
    static ref KEYWORDS: FxHashMap<&'static str, Keyword> =
        Keyword::ALL.iter().map(|kw| (kw.text(), *kw)).collect();
}

/// Look up an already down-cased word.
pub fn lookup_keyword(word: &str) -> Option<Keyword> {
    KEYWORDS.get(word).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_keyword_round_trips_through_lookup() {
        for kw in Keyword::ALL {
            assert_eq!(lookup_keyword(kw.text()), Some(*kw));
        }
    }

    #[test]
    fn test_lookup_is_case_sensitive_on_folded_input() {
        assert_eq!(lookup_keyword("select"), Some(Keyword::Select));
        assert_eq!(lookup_keyword("SELECT"), None);
        assert_eq!(lookup_keyword("selec"), None);
    }

    #[test]
    fn test_categories() {
        assert_eq!(Keyword::Select.category(), KeywordCategory::Reserved);
        assert_eq!(Keyword::Join.category(), KeywordCategory::TypeFuncName);
        assert_eq!(Keyword::Between.category(), KeywordCategory::ColName);
        assert_eq!(Keyword::Update.category(), KeywordCategory::Unreserved);
    }
}
