//! Faceted aggregation tokens and the facet definitions they are built from

use serde::Serialize;

use crate::error::{BuildError, BuildResult};
use crate::field::write_field;
use crate::parameters::Parameters;
use crate::value::QueryValue;

/// Aggregate computed for every facet value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetAggregation {
    Max,
    Min,
    Average,
    Sum,
}

impl FacetAggregation {
    fn function_name(&self) -> &'static str {
        match self {
            FacetAggregation::Max => "max",
            FacetAggregation::Min => "min",
            FacetAggregation::Average => "avg",
            FacetAggregation::Sum => "sum",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum FacetTermSortMode {
    #[default]
    ValueAsc,
    ValueDesc,
    CountAsc,
    CountDesc,
}

/// Paging and sorting of facet values, sent as a parameter when not default
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FacetOptions {
    pub term_sort_mode: FacetTermSortMode,
    pub include_remaining_terms: bool,
    pub start: u32,
    pub page_size: u32,
}

impl Default for FacetOptions {
    fn default() -> Self {
        Self {
            term_sort_mode: FacetTermSortMode::ValueAsc,
            include_remaining_terms: false,
            start: 0,
            page_size: i32::MAX as u32,
        }
    }
}

/// `max(field)`, `min(field)`, `avg(field)` or `sum(field)`
#[derive(Debug, Clone, PartialEq)]
pub struct FacetAggregationToken {
    field: String,
    aggregation: FacetAggregation,
}

impl FacetAggregationToken {
    pub fn create(aggregation: FacetAggregation, field: impl Into<String>) -> BuildResult<Self> {
        let field = field.into();
        if field.trim().is_empty() {
            return Err(BuildError::BlankFieldName);
        }
        Ok(Self { field, aggregation })
    }

    pub fn write_to(&self, out: &mut String) {
        out.push_str(self.aggregation.function_name());
        out.push('(');
        write_field(out, &self.field);
        out.push(')');
    }
}

/// One bound of a generic range facet
#[derive(Debug, Clone, PartialEq)]
struct Bound {
    value: QueryValue,
    inclusive: bool,
}

/// A typed range over one field, e.g. `10 <= price < 50`.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeBuilder {
    field: String,
    lower: Option<Bound>,
    upper: Option<Bound>,
}

impl RangeBuilder {
    pub fn for_field(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            lower: None,
            upper: None,
        }
    }

    pub fn greater_than(mut self, value: impl Into<QueryValue>) -> Self {
        self.lower = Some(Bound { value: value.into(), inclusive: false });
        self
    }

    pub fn greater_than_or_equal_to(mut self, value: impl Into<QueryValue>) -> Self {
        self.lower = Some(Bound { value: value.into(), inclusive: true });
        self
    }

    pub fn less_than(mut self, value: impl Into<QueryValue>) -> Self {
        self.upper = Some(Bound { value: value.into(), inclusive: false });
        self
    }

    pub fn less_than_or_equal_to(mut self, value: impl Into<QueryValue>) -> Self {
        self.upper = Some(Bound { value: value.into(), inclusive: true });
        self
    }

    /// Render the range expression, binding its bounds as parameters.
    pub fn to_range_expression(&self, parameters: &mut Parameters) -> BuildResult<String> {
        let mut field = String::new();
        write_field(&mut field, &self.field);

        let upper = self.upper.as_ref().map(|bound| {
            let op = if bound.inclusive { "<=" } else { "<" };
            format!("{field} {op} ${}", parameters.bind(&bound.value))
        });
        let lower = self.lower.as_ref().map(|bound| {
            let op = if bound.inclusive { ">=" } else { ">" };
            format!("{field} {op} ${}", parameters.bind(&bound.value))
        });

        match (lower, upper) {
            (Some(lower), Some(upper)) => Ok(format!("{lower} and {upper}")),
            (Some(part), None) | (None, Some(part)) => Ok(part),
            (None, None) => Err(BuildError::InvalidArgument(
                "range bounds were not set".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum FacetKind {
    Field(String),
    Ranges(Vec<String>),
    GenericRanges(Vec<RangeBuilder>),
}

/// Caller-facing facet definition
#[derive(Debug, Clone, PartialEq)]
pub struct Facet {
    kind: FacetKind,
    display_name: Option<String>,
    options: Option<FacetOptions>,
    aggregations: Vec<(FacetAggregation, String)>,
}

impl Facet {
    /// One facet value per distinct term of `field`.
    pub fn by_field(field: impl Into<String>) -> Self {
        Self::new(FacetKind::Field(field.into()))
    }

    /// One facet value per range expression, e.g. `price < 100`.
    pub fn by_ranges<I, S>(ranges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(FacetKind::Ranges(ranges.into_iter().map(Into::into).collect()))
    }

    /// One facet value per typed range; bounds become parameters.
    pub fn by_typed_ranges(ranges: Vec<RangeBuilder>) -> Self {
        Self::new(FacetKind::GenericRanges(ranges))
    }

    fn new(kind: FacetKind) -> Self {
        Self {
            kind,
            display_name: None,
            options: None,
            aggregations: Vec::new(),
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_options(mut self, options: FacetOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_aggregation(mut self, aggregation: FacetAggregation, field: impl Into<String>) -> Self {
        self.aggregations.push((aggregation, field.into()));
        self
    }
}

/// `facet(...)` entry of the select section
#[derive(Debug, Clone, PartialEq)]
pub struct FacetToken {
    setup_document_id: Option<String>,
    aggregate_by: Option<String>,
    alias: Option<String>,
    ranges: Vec<String>,
    options_parameter: Option<String>,
    aggregations: Vec<FacetAggregationToken>,
}

impl FacetToken {
    /// Facets defined by a stored setup document.
    pub fn from_setup_document(document_id: impl Into<String>) -> BuildResult<Self> {
        let document_id = document_id.into();
        if document_id.trim().is_empty() {
            return Err(BuildError::InvalidArgument(
                "facet setup document id cannot be blank".to_string(),
            ));
        }
        Ok(Self {
            setup_document_id: Some(document_id),
            aggregate_by: None,
            alias: None,
            ranges: Vec::new(),
            options_parameter: None,
            aggregations: Vec::new(),
        })
    }

    pub fn from_facet(facet: &Facet, parameters: &mut Parameters) -> BuildResult<Self> {
        let aggregations = facet
            .aggregations
            .iter()
            .map(|(aggregation, field)| FacetAggregationToken::create(*aggregation, field.clone()))
            .collect::<BuildResult<Vec<_>>>()?;

        let (aggregate_by, ranges) = match &facet.kind {
            FacetKind::Field(field) => {
                if field.trim().is_empty() {
                    return Err(BuildError::BlankFieldName);
                }
                (Some(field.clone()), Vec::new())
            }
            FacetKind::Ranges(ranges) => (None, ranges.clone()),
            FacetKind::GenericRanges(builders) => {
                let ranges = builders
                    .iter()
                    .map(|builder| builder.to_range_expression(parameters))
                    .collect::<BuildResult<Vec<_>>>()?;
                (None, ranges)
            }
        };

        let options_parameter = match &facet.options {
            Some(options) if *options != FacetOptions::default() => {
                let json = serde_json::to_value(options)
                    .map_err(|e| BuildError::InvalidArgument(e.to_string()))?;
                Some(parameters.bind_json(json))
            }
            _ => None,
        };

        Ok(Self {
            setup_document_id: None,
            aggregate_by,
            alias: facet.display_name.clone(),
            ranges,
            options_parameter,
            aggregations,
        })
    }

    /// The name results are reported under
    pub fn name(&self) -> Option<&str> {
        self.alias.as_deref().or(self.aggregate_by.as_deref())
    }

    pub fn write_to(&self, out: &mut String) {
        out.push_str("facet(");

        if let Some(id) = &self.setup_document_id {
            out.push_str("id('");
            out.push_str(id);
            out.push_str("'))");
            return;
        }

        let mut first_argument = true;
        if let Some(field) = &self.aggregate_by {
            write_field(out, field);
            first_argument = false;
        } else if !self.ranges.is_empty() {
            out.push_str(&self.ranges.join(", "));
            first_argument = false;
        }

        for aggregation in &self.aggregations {
            if !first_argument {
                out.push_str(", ");
            }
            first_argument = false;
            aggregation.write_to(out);
        }

        if let Some(options) = &self.options_parameter {
            out.push_str(", $");
            out.push_str(options);
        }

        out.push(')');

        match &self.alias {
            Some(alias) if !alias.trim().is_empty() && Some(alias) != self.aggregate_by.as_ref() => {
                out.push_str(" as ");
                write_field(out, alias);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(token: &FacetToken) -> String {
        let mut out = String::new();
        token.write_to(&mut out);
        out
    }

    #[test]
    fn test_setup_document_facet() {
        let token = FacetToken::from_setup_document("facets/products").unwrap();
        assert_eq!(render(&token), "facet(id('facets/products'))");
    }

    #[test]
    fn test_field_facet_with_aggregations_and_alias() {
        let facet = Facet::by_field("brand")
            .with_display_name("brands")
            .with_aggregation(FacetAggregation::Max, "price")
            .with_aggregation(FacetAggregation::Average, "rating");
        let mut params = Parameters::new();
        let token = FacetToken::from_facet(&facet, &mut params).unwrap();
        assert_eq!(render(&token), "facet(brand, max(price), avg(rating)) as brands");
        assert!(params.is_empty());
    }

    #[test]
    fn test_default_options_not_bound() {
        let facet = Facet::by_field("brand").with_options(FacetOptions::default());
        let mut params = Parameters::new();
        let token = FacetToken::from_facet(&facet, &mut params).unwrap();
        assert_eq!(render(&token), "facet(brand)");
    }

    #[test]
    fn test_custom_options_bound_as_parameter() {
        let options = FacetOptions {
            page_size: 5,
            ..FacetOptions::default()
        };
        let facet = Facet::by_field("brand").with_options(options);
        let mut params = Parameters::new();
        let token = FacetToken::from_facet(&facet, &mut params).unwrap();
        assert_eq!(render(&token), "facet(brand, $p0)");
        assert_eq!(params.get("p0").unwrap()["PageSize"], json!(5));
    }

    #[test]
    fn test_typed_ranges_bind_bounds() {
        let facet = Facet::by_typed_ranges(vec![
            RangeBuilder::for_field("price").less_than(100),
            RangeBuilder::for_field("price")
                .greater_than_or_equal_to(100)
                .less_than(500),
        ])
        .with_display_name("price_ranges");
        let mut params = Parameters::new();
        let token = FacetToken::from_facet(&facet, &mut params).unwrap();
        assert_eq!(
            render(&token),
            "facet(price < $p0, price >= $p2 and price < $p1) as price_ranges"
        );
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_range_without_bounds_rejected() {
        let facet = Facet::by_typed_ranges(vec![RangeBuilder::for_field("price")]);
        let mut params = Parameters::new();
        assert!(FacetToken::from_facet(&facet, &mut params).is_err());
    }

    #[test]
    fn test_blank_aggregation_field_rejected() {
        assert_eq!(
            FacetAggregationToken::create(FacetAggregation::Sum, " ").unwrap_err(),
            BuildError::BlankFieldName
        );
    }
}
