//! Error types for query construction and compilation.
//!
//! Construction errors are raised at the offending builder call; render
//! errors are raised when the accumulated state is turned into text.

use thiserror::Error;

/// Errors raised synchronously by a builder call or a token factory.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("Boost factor must be a positive number, got {0}")]
    InvalidBoost(f64),

    #[error("Fuzzy distance must be between 0.0 and 1.0, got {0}")]
    InvalidFuzzy(f64),

    #[error("Proximity distance must be a positive number, got {0}")]
    InvalidProximity(i64),

    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("Field name cannot be blank")]
    BlankFieldName,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(
        "A raw query was supplied; this query cannot be modified by fluent calls (such as where, select, order by, group by)"
    )]
    RawQueryPresent,

    #[error("Cannot supply a raw query after fluent clauses were added")]
    FluentClausesPresent,

    #[error("Cannot close a subclause that was never opened")]
    UnbalancedSubclause,

    #[error("Missing where clause")]
    MissingWhereClause,

    #[error("Cannot add {0}, previous token was already an operator token")]
    ConsecutiveOperators(&'static str),

    #[error("Default operator can only be set before any where clause is added")]
    DefaultOperatorAfterWhere,

    #[error("Cannot add intersect at this point")]
    IllegalIntersect,

    #[error("This query is already distinct")]
    AlreadyDistinct,

    #[error("Group by only works with dynamic (collection) queries")]
    GroupByOnStaticIndex,

    #[error("Illegal select combination: {0}")]
    IllegalSelect(String),

    #[error("A more-like-this scope is already open")]
    MoreLikeThisAlreadyOpen,

    #[error("No more-like-this scope is open")]
    MoreLikeThisNotOpen,

    #[error("The parameter {0} was already added")]
    DuplicateParameter(String),

    #[error("Collection name cannot contain a quote, but was: {0}")]
    InvalidCollectionName(String),
}

/// Errors raised when builder state is compiled to query text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error(
        "A clause was not closed correctly within this query, current clause depth = {depth}"
    )]
    UnbalancedSubclauses { depth: usize },

    #[error("Either an index name or a collection name must be specified")]
    MissingSource,

    #[error("A more-like-this scope is still open")]
    UnclosedMoreLikeThis,
}

/// Result type for builder calls
pub type BuildResult<T> = Result<T, BuildError>;
