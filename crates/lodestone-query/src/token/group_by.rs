//! Group by tokens and the aggregate projections that go with them

use crate::error::{BuildError, BuildResult};
use crate::field::write_field;

/// How a group by field is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupByMethod {
    #[default]
    None,
    /// Group by each element of an array field
    Array,
}

/// A field to group by, as supplied by the caller
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBy {
    pub field: String,
    pub method: GroupByMethod,
}

impl GroupBy {
    pub fn field(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            method: GroupByMethod::None,
        }
    }

    pub fn array(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            method: GroupByMethod::Array,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupByToken {
    field: String,
    method: GroupByMethod,
}

impl GroupByToken {
    pub fn create(field: impl Into<String>, method: GroupByMethod) -> BuildResult<Self> {
        let field = field.into();
        if field.trim().is_empty() {
            return Err(BuildError::BlankFieldName);
        }
        Ok(Self { field, method })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn write_to(&self, out: &mut String) {
        match self.method {
            GroupByMethod::None => write_field(out, &self.field),
            GroupByMethod::Array => {
                out.push_str("array(");
                write_field(out, &self.field);
                out.push(')');
            }
        }
    }
}

/// Select the group key, `key()` when no field is named
#[derive(Debug, Clone, PartialEq)]
pub struct GroupByKeyToken {
    field: Option<String>,
    projected: Option<String>,
}

impl GroupByKeyToken {
    pub fn create(field: Option<String>, projected: Option<String>) -> Self {
        Self { field, projected }
    }

    pub fn write_to(&self, out: &mut String) {
        let field = self.field.as_deref().unwrap_or("key()");
        write_field(out, field);
        if let Some(projected) = &self.projected {
            if projected != field {
                out.push_str(" as ");
                write_field(out, projected);
            }
        }
    }
}

/// `sum(field) as name`
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBySumToken {
    field: String,
    projected: Option<String>,
}

impl GroupBySumToken {
    pub fn create(field: impl Into<String>, projected: Option<String>) -> BuildResult<Self> {
        let field = field.into();
        if field.trim().is_empty() {
            return Err(BuildError::BlankFieldName);
        }
        Ok(Self { field, projected })
    }

    pub fn write_to(&self, out: &mut String) {
        out.push_str("sum(");
        write_field(out, &self.field);
        out.push(')');
        if let Some(projected) = &self.projected {
            out.push_str(" as ");
            write_field(out, projected);
        }
    }
}

/// `count() as name`
#[derive(Debug, Clone, PartialEq)]
pub struct GroupByCountToken {
    projected: Option<String>,
}

impl GroupByCountToken {
    pub fn create(projected: Option<String>) -> Self {
        Self { projected }
    }

    pub fn write_to(&self, out: &mut String) {
        out.push_str("count()");
        if let Some(projected) = &self.projected {
            out.push_str(" as ");
            write_field(out, projected);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(write: impl Fn(&mut String)) -> String {
        let mut out = String::new();
        write(&mut out);
        out
    }

    #[test]
    fn test_group_by_array() {
        let token = GroupByToken::create("tags", GroupByMethod::Array).unwrap();
        assert_eq!(render(|o| token.write_to(o)), "array(tags)");
    }

    #[test]
    fn test_group_key_defaults_to_key_function() {
        let token = GroupByKeyToken::create(None, Some("city".into()));
        assert_eq!(render(|o| token.write_to(o)), "key() as city");
    }

    #[test]
    fn test_group_key_same_projection_not_repeated() {
        let token = GroupByKeyToken::create(Some("city".into()), Some("city".into()));
        assert_eq!(render(|o| token.write_to(o)), "city");
    }

    #[test]
    fn test_sum_and_count() {
        let sum = GroupBySumToken::create("total", Some("revenue".into())).unwrap();
        let count = GroupByCountToken::create(Some("orders".into()));
        assert_eq!(render(|o| sum.write_to(o)), "sum(total) as revenue");
        assert_eq!(render(|o| count.write_to(o)), "count() as orders");
    }
}
