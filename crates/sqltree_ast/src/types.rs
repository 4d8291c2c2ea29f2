//! Discriminants and flag types carried by node payloads.
//!
//! Node kinds that share a record layout are one payload with one of these
//! enums selecting the variant (an `A_Expr` is an operator, an IN list, a
//! BETWEEN, ... depending on its [`AExprKind`]).

use serde::Serialize;
use std::fmt;

/// Variant of an `A_Expr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AExprKind {
    /// Normal operator.
    Op,
    /// Scalar op ANY (array).
    OpAny,
    /// Scalar op ALL (array).
    OpAll,
    /// IS DISTINCT FROM.
    Distinct,
    /// IS NOT DISTINCT FROM.
    NotDistinct,
    /// NULLIF(a, b).
    NullIf,
    /// `[NOT] IN (list)`; the operator name is `=` or `<>`.
    In,
    /// `[NOT] LIKE`; the operator name is `~~` or `!~~`.
    Like,
    /// `[NOT] ILIKE`; the operator name is `~~*` or `!~~*`.
    ILike,
    /// `[NOT] SIMILAR TO`; the operator name is `~` or `!~`.
    Similar,
    Between,
    NotBetween,
    BetweenSym,
    NotBetweenSym,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoolExprType {
    And,
    Or,
    Not,
}

impl fmt::Display for BoolExprType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoolExprType::And => write!(f, "AND"),
            BoolExprType::Or => write!(f, "OR"),
            BoolExprType::Not => write!(f, "NOT"),
        }
    }
}

/// Variant of a `SubLink`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubLinkType {
    /// EXISTS(SELECT ...)
    Exists,
    /// (lefthand) op ALL (SELECT ...)
    All,
    /// (lefthand) op ANY (SELECT ...), also IN (SELECT ...)
    Any,
    /// (lefthand) op (SELECT ...)
    RowCompare,
    /// (SELECT with single targetlist item ...)
    Expr,
    /// (SELECT with multiple targetlist items ...), used in multi-assignment
    MultiExpr,
    /// ARRAY(SELECT with single targetlist item ...)
    Array,
    /// WITH query
    Cte,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortByDir {
    #[default]
    Default,
    Asc,
    Desc,
    /// ORDER BY ... USING operator
    Using,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortByNulls {
    #[default]
    Default,
    First,
    Last,
}

/// How a function call or row constructor was spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoercionForm {
    /// Plain `f(x)` or `ROW(...)`.
    #[default]
    ExplicitCall,
    /// `CAST` or `::` notation.
    ExplicitCast,
    /// Implicit row `(a, b)`.
    ImplicitCast,
    /// SQL-standard syntax such as `EXTRACT(x FROM y)` or `TRIM(BOTH ...)`.
    SqlSyntax,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MinMaxOp {
    Greatest,
    Least,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NullTestType {
    IsNull,
    IsNotNull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoolTestType {
    IsTrue,
    IsNotTrue,
    IsFalse,
    IsNotFalse,
    IsUnknown,
    IsNotUnknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupingSetKind {
    /// `()`
    Empty,
    /// A plain expression list inside GROUPING SETS.
    Simple,
    Rollup,
    Cube,
    Sets,
}

/// Keyword-led value functions (`CURRENT_DATE`, `CURRENT_USER`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SqlValueFunctionOp {
    CurrentDate,
    CurrentTime,
    CurrentTimeN,
    CurrentTimestamp,
    CurrentTimestampN,
    Localtime,
    LocaltimeN,
    Localtimestamp,
    LocaltimestampN,
    CurrentRole,
    CurrentUser,
    User,
    SessionUser,
    CurrentCatalog,
    CurrentSchema,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelPersistence {
    #[default]
    Permanent,
    Unlogged,
    Temp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JoinType {
    Inner,
    Left,
    Full,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CteMaterialize {
    #[default]
    Default,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LockClauseStrength {
    ForKeyShare,
    ForShare,
    ForNoKeyUpdate,
    ForUpdate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LockWaitPolicy {
    #[default]
    Block,
    Skip,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnConflictAction {
    Nothing,
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeMatchKind {
    Matched,
    NotMatchedBySource,
    NotMatchedByTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CmdType {
    Select,
    Update,
    Insert,
    Delete,
    Merge,
    Nothing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverridingKind {
    #[default]
    NotSet,
    UserValue,
    SystemValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SetOperation {
    #[default]
    None,
    Union,
    Intersect,
    Except,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LimitOption {
    #[default]
    Default,
    Count,
    WithTies,
}

bitflags::bitflags! {
    /// Window frame options, matching the server's `FRAMEOPTION_*` bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct FrameOptions: u32 {
        const NONDEFAULT                  = 0x00001;
        const RANGE                       = 0x00002;
        const ROWS                        = 0x00004;
        const GROUPS                      = 0x00008;
        const BETWEEN                     = 0x00010;
        const START_UNBOUNDED_PRECEDING   = 0x00020;
        const END_UNBOUNDED_PRECEDING     = 0x00040;
        const START_UNBOUNDED_FOLLOWING   = 0x00080;
        const END_UNBOUNDED_FOLLOWING     = 0x00100;
        const START_CURRENT_ROW           = 0x00200;
        const END_CURRENT_ROW             = 0x00400;
        const START_OFFSET_PRECEDING      = 0x00800;
        const END_OFFSET_PRECEDING        = 0x01000;
        const START_OFFSET_FOLLOWING      = 0x02000;
        const END_OFFSET_FOLLOWING        = 0x04000;
        const EXCLUDE_CURRENT_ROW         = 0x08000;
        const EXCLUDE_GROUP               = 0x10000;
        const EXCLUDE_TIES                = 0x20000;

        const START_OFFSET = Self::START_OFFSET_PRECEDING.bits() | Self::START_OFFSET_FOLLOWING.bits();
        const END_OFFSET = Self::END_OFFSET_PRECEDING.bits() | Self::END_OFFSET_FOLLOWING.bits();
        const EXCLUSION = Self::EXCLUDE_CURRENT_ROW.bits() | Self::EXCLUDE_GROUP.bits() | Self::EXCLUDE_TIES.bits();
        const DEFAULTS = Self::RANGE.bits() | Self::START_UNBOUNDED_PRECEDING.bits() | Self::END_CURRENT_ROW.bits();
    }
}

impl Default for FrameOptions {
    fn default() -> Self {
        FrameOptions::DEFAULTS
    }
}
