//! Query tokens
//!
//! A token is an immutable fragment of query text. The builder accumulates
//! tokens per section and the compiler asks each one to write itself.
//! Tokens that need validation are created through fallible factories so a
//! bad argument fails at the builder call that supplied it.

mod facet;
mod group_by;
mod include;
mod more_like_this;
mod order_by;
mod projection;
mod shape;
mod source;
mod suggest;
mod where_clause;

pub use facet::*;
pub use group_by::*;
pub use include::*;
pub use more_like_this::*;
pub use order_by::*;
pub use projection::*;
pub use shape::*;
pub use source::*;
pub use suggest::*;
pub use where_clause::*;

/// Boolean operator between where clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOperator {
    And,
    Or,
}

impl BooleanOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            BooleanOperator::And => "and",
            BooleanOperator::Or => "or",
        }
    }
}

impl From<lodestone_config::DefaultOperator> for BooleanOperator {
    fn from(op: lodestone_config::DefaultOperator) -> Self {
        match op {
            lodestone_config::DefaultOperator::And => BooleanOperator::And,
            lodestone_config::DefaultOperator::Or => BooleanOperator::Or,
        }
    }
}

/// Every fragment the builder can place in a section.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryToken {
    // where section
    Where(WhereToken),
    Operator(BooleanOperator),
    OpenSubclause,
    CloseSubclause,
    Negate,
    True,
    IntersectMarker,
    MoreLikeThis(MoreLikeThisToken),

    // ordering and grouping
    OrderBy(OrderByToken),
    GroupBy(GroupByToken),

    // select section
    Distinct,
    FieldsToFetch(FieldsToFetchToken),
    GroupByKey(GroupByKeyToken),
    GroupBySum(GroupBySumToken),
    GroupByCount(GroupByCountToken),
    Facet(FacetToken),
    Suggest(SuggestToken),

    // include section
    CounterIncludes(CounterIncludesToken),
    Highlighting(HighlightingToken),
    Explanation(ExplanationToken),
    Timings,
}

impl QueryToken {
    /// Append this token's text to `out`.
    pub fn write_to(&self, out: &mut String) {
        match self {
            QueryToken::Where(t) => t.write_to(out),
            QueryToken::Operator(op) => out.push_str(op.as_str()),
            QueryToken::OpenSubclause => out.push('('),
            QueryToken::CloseSubclause => out.push(')'),
            QueryToken::Negate => out.push_str("not"),
            QueryToken::True => out.push_str("true"),
            QueryToken::IntersectMarker => out.push(','),
            QueryToken::MoreLikeThis(t) => t.write_to(out),
            QueryToken::OrderBy(t) => t.write_to(out),
            QueryToken::GroupBy(t) => t.write_to(out),
            QueryToken::Distinct => out.push_str("distinct"),
            QueryToken::FieldsToFetch(t) => t.write_to(out),
            QueryToken::GroupByKey(t) => t.write_to(out),
            QueryToken::GroupBySum(t) => t.write_to(out),
            QueryToken::GroupByCount(t) => t.write_to(out),
            QueryToken::Facet(t) => t.write_to(out),
            QueryToken::Suggest(t) => t.write_to(out),
            QueryToken::CounterIncludes(t) => t.write_to(out),
            QueryToken::Highlighting(t) => t.write_to(out),
            QueryToken::Explanation(t) => t.write_to(out),
            QueryToken::Timings => out.push_str("timings()"),
        }
    }

    /// Render this token on its own.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    pub fn is_operator(&self) -> bool {
        matches!(self, QueryToken::Operator(_))
    }

    pub fn as_where(&self) -> Option<&WhereToken> {
        match self {
            QueryToken::Where(t) => Some(t),
            _ => None,
        }
    }
}

/// Write the tokens of a where list, separating them with single spaces.
///
/// No space follows an opening parenthesis, and none precedes a closing
/// parenthesis or an intersect comma.
pub fn write_where_tokens(tokens: &[QueryToken], out: &mut String) {
    let mut previous: Option<&QueryToken> = None;
    for token in tokens {
        if let Some(prev) = previous {
            let suppress = matches!(prev, QueryToken::OpenSubclause)
                || matches!(token, QueryToken::CloseSubclause | QueryToken::IntersectMarker);
            if !suppress {
                out.push(' ');
            }
        }
        token.write_to(out);
        previous = Some(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spacing_around_subclauses() {
        let eq = WhereToken::create(WhereOperator::Equals, "a", Some("p0".to_string())).unwrap();
        let tokens = vec![
            QueryToken::Negate,
            QueryToken::OpenSubclause,
            QueryToken::Where(eq),
            QueryToken::CloseSubclause,
        ];
        let mut out = String::new();
        write_where_tokens(&tokens, &mut out);
        assert_eq!(out, "not (a = $p0)");
    }

    #[test]
    fn test_intersect_marker_attaches_to_previous() {
        let tokens = vec![QueryToken::True, QueryToken::IntersectMarker, QueryToken::True];
        let mut out = String::new();
        write_where_tokens(&tokens, &mut out);
        assert_eq!(out, "true, true");
    }
}
