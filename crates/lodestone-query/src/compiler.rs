//! Renders builder state into query text in fixed section order:
//! declare, from, group by, where, order by, load, select, include.

use crate::builder::{ClauseTarget, QueryBuilder};
use crate::error::RenderError;
use crate::field::escape_field;
use crate::token::{write_where_tokens, QueryToken};

pub(crate) struct QueryCompiler<'a> {
    builder: &'a QueryBuilder,
}

impl<'a> QueryCompiler<'a> {
    pub(crate) fn new(builder: &'a QueryBuilder) -> Self {
        Self { builder }
    }

    pub(crate) fn render(&self) -> Result<String, RenderError> {
        let b = self.builder;
        if let Some(raw) = &b.raw_query {
            return Ok(raw.clone());
        }
        if b.clause_depth != 0 {
            return Err(RenderError::UnbalancedSubclauses {
                depth: b.clause_depth,
            });
        }
        if matches!(b.target, ClauseTarget::MoreLikeThis(_)) {
            return Err(RenderError::UnclosedMoreLikeThis);
        }
        let from = b.from.as_ref().ok_or(RenderError::MissingSource)?;

        let mut out = String::new();
        if let Some(declare) = &b.declare {
            declare.write_to(&mut out);
        }
        from.write_to(&mut out);
        self.write_group_by(&mut out);
        self.write_where(&mut out);
        self.write_order_by(&mut out);
        self.write_load(&mut out);
        self.write_select(&mut out);
        self.write_include(&mut out);
        Ok(out)
    }

    fn write_group_by(&self, out: &mut String) {
        write_list(out, " group by ", &self.builder.group_by_tokens, ", ");
    }

    fn write_where(&self, out: &mut String) {
        let b = self.builder;
        if b.where_tokens.is_empty() {
            return;
        }
        out.push_str(" where ");
        if b.is_intersect {
            out.push_str("intersect(");
        }
        write_where_tokens(&b.where_tokens, out);
        if b.is_intersect {
            out.push(')');
        }
    }

    fn write_order_by(&self, out: &mut String) {
        write_list(out, " order by ", &self.builder.order_by_tokens, ", ");
    }

    fn write_load(&self, out: &mut String) {
        let loads = &self.builder.load_tokens;
        if loads.is_empty() {
            return;
        }
        out.push_str(" load ");
        for (i, load) in loads.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            load.write_to(out);
        }
    }

    fn write_select(&self, out: &mut String) {
        let tokens = &self.builder.select_tokens;
        if tokens.is_empty() {
            return;
        }
        out.push_str(" select ");
        if let [QueryToken::Distinct] = tokens.as_slice() {
            out.push_str("distinct *");
            return;
        }
        let mut previous: Option<&QueryToken> = None;
        for token in tokens {
            match previous {
                Some(QueryToken::Distinct) => out.push(' '),
                Some(_) => out.push_str(", "),
                None => {}
            }
            token.write_to(out);
            previous = Some(token);
        }
    }

    fn write_include(&self, out: &mut String) {
        let b = self.builder;
        if b.document_includes.is_empty() && b.include_tokens.is_empty() {
            return;
        }
        out.push_str(" include ");
        let mut first = true;
        for path in &b.document_includes {
            if !first {
                out.push(',');
            }
            first = false;
            out.push_str(&escape_field(path));
        }
        for token in &b.include_tokens {
            if !first {
                out.push(',');
            }
            first = false;
            token.write_to(out);
        }
    }
}

fn write_list(out: &mut String, keyword: &str, tokens: &[QueryToken], separator: &str) {
    if tokens.is_empty() {
        return;
    }
    out.push_str(keyword);
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        token.write_to(out);
    }
}
