//! Where clause token

use crate::error::{BuildError, BuildResult};
use crate::field::write_field;
use crate::value::COMPARE_EXCHANGE_METHOD;

use super::shape::{ShapeToken, SpatialRelation};

/// Comparison performed by a where clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhereOperator {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    In,
    AllIn,
    Between,
    Search,
    Lucene,
    StartsWith,
    EndsWith,
    Exists,
    Regex,
    Spatial(SpatialRelation),
}

/// How the terms of a full-text search combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchOperator {
    #[default]
    Or,
    And,
}

/// Server methods usable as the value side of an equality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodType {
    CompareExchange,
}

impl MethodType {
    pub fn parse(name: &str) -> BuildResult<Self> {
        if name.eq_ignore_ascii_case(COMPARE_EXCHANGE_METHOD) {
            Ok(MethodType::CompareExchange)
        } else {
            Err(BuildError::UnsupportedMethod(name.to_string()))
        }
    }
}

/// A method call whose arguments are already bound as parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereMethodCall {
    pub method_type: MethodType,
    pub parameters: Vec<String>,
    pub property: Option<String>,
}

/// Modifiers attached to a where clause.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereOptions {
    search_operator: Option<SearchOperator>,
    from_parameter: Option<String>,
    to_parameter: Option<String>,
    boost: Option<f64>,
    fuzzy: Option<f64>,
    proximity: Option<u32>,
    exact: bool,
    method: Option<WhereMethodCall>,
    shape: Option<ShapeToken>,
    distance_error_pct: Option<f64>,
}

impl WhereOptions {
    pub fn exact(exact: bool) -> Self {
        Self {
            exact,
            ..Self::default()
        }
    }

    pub fn search(operator: SearchOperator) -> Self {
        Self {
            search_operator: Some(operator),
            ..Self::default()
        }
    }

    pub fn range(from_parameter: String, to_parameter: String, exact: bool) -> Self {
        Self {
            from_parameter: Some(from_parameter),
            to_parameter: Some(to_parameter),
            exact,
            ..Self::default()
        }
    }

    pub fn method(method: WhereMethodCall, exact: bool) -> Self {
        Self {
            method: Some(method),
            exact,
            ..Self::default()
        }
    }

    /// `distance_error_pct` is only written when it differs from the server default.
    pub fn spatial(shape: ShapeToken, distance_error_pct: Option<f64>) -> Self {
        Self {
            shape: Some(shape),
            distance_error_pct,
            ..Self::default()
        }
    }

    pub fn search_operator(&self) -> Option<SearchOperator> {
        self.search_operator
    }

    pub fn boost(&self) -> Option<f64> {
        self.boost
    }

    pub fn fuzzy(&self) -> Option<f64> {
        self.fuzzy
    }

    pub fn proximity(&self) -> Option<u32> {
        self.proximity
    }

    pub fn is_exact(&self) -> bool {
        self.exact
    }

    fn validate(&self) -> BuildResult<()> {
        if let Some(boost) = self.boost {
            if boost.is_nan() || boost <= 0.0 {
                return Err(BuildError::InvalidBoost(boost));
            }
        }
        if let Some(fuzzy) = self.fuzzy {
            if !(0.0..=1.0).contains(&fuzzy) {
                return Err(BuildError::InvalidFuzzy(fuzzy));
            }
        }
        if self.proximity == Some(0) {
            return Err(BuildError::InvalidProximity(0));
        }
        Ok(())
    }
}

/// One comparison in the where section.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereToken {
    field: String,
    operator: WhereOperator,
    parameter: Option<String>,
    options: WhereOptions,
}

impl WhereToken {
    pub fn create(
        operator: WhereOperator,
        field: impl Into<String>,
        parameter: Option<String>,
    ) -> BuildResult<Self> {
        Self::with_options(operator, field, parameter, WhereOptions::default())
    }

    pub fn with_options(
        operator: WhereOperator,
        field: impl Into<String>,
        parameter: Option<String>,
        options: WhereOptions,
    ) -> BuildResult<Self> {
        let field = field.into();
        if field.trim().is_empty() {
            return Err(BuildError::BlankFieldName);
        }
        options.validate()?;
        Ok(Self {
            field,
            operator,
            parameter,
            options,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn operator(&self) -> WhereOperator {
        self.operator
    }

    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }

    pub fn options(&self) -> &WhereOptions {
        &self.options
    }

    /// Copy of this token with a boost factor; a factor of exactly 1 clears it.
    pub fn with_boost(mut self, boost: f64) -> BuildResult<Self> {
        self.options.boost = if boost == 1.0 { None } else { Some(boost) };
        self.options.validate()?;
        Ok(self)
    }

    pub fn with_fuzzy(mut self, fuzzy: f64) -> BuildResult<Self> {
        self.options.fuzzy = Some(fuzzy);
        self.options.validate()?;
        Ok(self)
    }

    pub fn with_proximity(mut self, proximity: i64) -> BuildResult<Self> {
        let proximity = u32::try_from(proximity)
            .ok()
            .filter(|p| *p >= 1)
            .ok_or(BuildError::InvalidProximity(proximity))?;
        self.options.proximity = Some(proximity);
        Ok(self)
    }

    pub fn with_exact(mut self) -> Self {
        self.options.exact = true;
        self
    }

    pub fn write_to(&self, out: &mut String) {
        let options = &self.options;

        if options.boost.is_some() {
            out.push_str("boost(");
        }
        if options.fuzzy.is_some() {
            out.push_str("fuzzy(");
        }
        if options.proximity.is_some() {
            out.push_str("proximity(");
        }
        if options.exact {
            out.push_str("exact(");
        }

        match self.operator {
            WhereOperator::Search => out.push_str("search("),
            WhereOperator::Lucene => out.push_str("lucene("),
            WhereOperator::StartsWith => out.push_str("startsWith("),
            WhereOperator::EndsWith => out.push_str("endsWith("),
            WhereOperator::Exists => out.push_str("exists("),
            WhereOperator::Regex => out.push_str("regex("),
            WhereOperator::Spatial(relation) => {
                out.push_str(relation.function_name());
                out.push('(');
            }
            _ => {}
        }

        write_field(out, &self.field);

        match self.operator {
            WhereOperator::In => {
                out.push_str(" in (");
                self.write_parameter(out);
                out.push(')');
            }
            WhereOperator::AllIn => {
                out.push_str(" all in (");
                self.write_parameter(out);
                out.push(')');
            }
            WhereOperator::Between => {
                out.push_str(" between $");
                out.push_str(options.from_parameter.as_deref().unwrap_or_default());
                out.push_str(" and $");
                out.push_str(options.to_parameter.as_deref().unwrap_or_default());
            }
            WhereOperator::Equals => self.write_comparison(out, " = "),
            WhereOperator::NotEquals => self.write_comparison(out, " != "),
            WhereOperator::GreaterThan => self.write_comparison(out, " > "),
            WhereOperator::GreaterThanOrEqual => self.write_comparison(out, " >= "),
            WhereOperator::LessThan => self.write_comparison(out, " < "),
            WhereOperator::LessThanOrEqual => self.write_comparison(out, " <= "),
            WhereOperator::Search => {
                out.push_str(", ");
                self.write_parameter(out);
                if options.search_operator == Some(SearchOperator::And) {
                    out.push_str(", and");
                }
                out.push(')');
            }
            WhereOperator::Lucene
            | WhereOperator::StartsWith
            | WhereOperator::EndsWith
            | WhereOperator::Regex => {
                out.push_str(", ");
                self.write_parameter(out);
                out.push(')');
            }
            WhereOperator::Exists => out.push(')'),
            WhereOperator::Spatial(_) => {
                out.push_str(", ");
                if let Some(shape) = &options.shape {
                    shape.write_to(out);
                }
                if let Some(pct) = options.distance_error_pct {
                    out.push_str(", ");
                    out.push_str(&pct.to_string());
                }
                out.push(')');
            }
        }

        if options.exact {
            out.push(')');
        }
        if let Some(proximity) = options.proximity {
            out.push_str(&format!(", {proximity})"));
        }
        if let Some(fuzzy) = options.fuzzy {
            out.push_str(&format!(", {fuzzy})"));
        }
        if let Some(boost) = options.boost {
            out.push_str(&format!(", {boost})"));
        }
    }

    fn write_comparison(&self, out: &mut String, operator: &str) {
        out.push_str(operator);
        match &self.options.method {
            Some(method) => write_method(out, method),
            None => self.write_parameter(out),
        }
    }

    fn write_parameter(&self, out: &mut String) {
        out.push('$');
        out.push_str(self.parameter.as_deref().unwrap_or_default());
    }
}

fn write_method(out: &mut String, method: &WhereMethodCall) {
    match method.method_type {
        MethodType::CompareExchange => out.push_str("cmpxchg("),
    }
    let args: Vec<String> = method.parameters.iter().map(|p| format!("${p}")).collect();
    out.push_str(&args.join(","));
    out.push(')');
    if let Some(property) = &method.property {
        out.push('.');
        out.push_str(property);
    }
}
