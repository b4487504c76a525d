//! Order by token

use crate::error::{BuildError, BuildResult};
use crate::field::{quote, write_field};

/// How the server compares values of a sort field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderingType {
    #[default]
    String,
    Long,
    Double,
    AlphaNumeric,
}

impl OrderingType {
    fn suffix(&self) -> Option<&'static str> {
        match self {
            OrderingType::String => None,
            OrderingType::Long => Some(" as long"),
            OrderingType::Double => Some(" as double"),
            OrderingType::AlphaNumeric => Some(" as alphaNumeric"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Field(String),
    Score,
    Random(Option<String>),
    DistanceToPoint {
        field: String,
        latitude_parameter: String,
        longitude_parameter: String,
    },
    DistanceToShape {
        field: String,
        shape_parameter: String,
    },
}

/// One entry of the order by section
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByToken {
    key: SortKey,
    descending: bool,
    ordering: OrderingType,
}

impl OrderByToken {
    pub fn field(
        field: impl Into<String>,
        ordering: OrderingType,
        descending: bool,
    ) -> BuildResult<Self> {
        let field = field.into();
        if field.trim().is_empty() {
            return Err(BuildError::BlankFieldName);
        }
        Ok(Self {
            key: SortKey::Field(field),
            descending,
            ordering,
        })
    }

    pub fn score(descending: bool) -> Self {
        Self {
            key: SortKey::Score,
            descending,
            ordering: OrderingType::default(),
        }
    }

    pub fn random(seed: Option<String>) -> Self {
        Self {
            key: SortKey::Random(seed),
            descending: false,
            ordering: OrderingType::default(),
        }
    }

    pub fn distance_to_point(
        field: impl Into<String>,
        latitude_parameter: impl Into<String>,
        longitude_parameter: impl Into<String>,
        descending: bool,
    ) -> BuildResult<Self> {
        let field = field.into();
        if field.trim().is_empty() {
            return Err(BuildError::BlankFieldName);
        }
        Ok(Self {
            key: SortKey::DistanceToPoint {
                field,
                latitude_parameter: latitude_parameter.into(),
                longitude_parameter: longitude_parameter.into(),
            },
            descending,
            ordering: OrderingType::default(),
        })
    }

    pub fn distance_to_shape(
        field: impl Into<String>,
        shape_parameter: impl Into<String>,
        descending: bool,
    ) -> BuildResult<Self> {
        let field = field.into();
        if field.trim().is_empty() {
            return Err(BuildError::BlankFieldName);
        }
        Ok(Self {
            key: SortKey::DistanceToShape {
                field,
                shape_parameter: shape_parameter.into(),
            },
            descending,
            ordering: OrderingType::default(),
        })
    }

    pub fn is_descending(&self) -> bool {
        self.descending
    }

    pub fn write_to(&self, out: &mut String) {
        match &self.key {
            SortKey::Field(field) => write_field(out, field),
            SortKey::Score => out.push_str("score()"),
            SortKey::Random(None) => out.push_str("random()"),
            SortKey::Random(Some(seed)) => {
                out.push_str("random(");
                out.push_str(&quote(seed));
                out.push(')');
            }
            SortKey::DistanceToPoint {
                field,
                latitude_parameter,
                longitude_parameter,
            } => {
                out.push_str("spatial.distance(");
                write_field(out, field);
                out.push_str(&format!(
                    ", spatial.point(${latitude_parameter}, ${longitude_parameter}))"
                ));
            }
            SortKey::DistanceToShape {
                field,
                shape_parameter,
            } => {
                out.push_str("spatial.distance(");
                write_field(out, field);
                out.push_str(&format!(", spatial.wkt(${shape_parameter}))"));
            }
        }

        if let Some(suffix) = self.ordering.suffix() {
            out.push_str(suffix);
        }
        if self.descending {
            out.push_str(" desc");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(token: &OrderByToken) -> String {
        let mut out = String::new();
        token.write_to(&mut out);
        out
    }

    #[test]
    fn test_field_with_ordering_and_direction() {
        let token = OrderByToken::field("age", OrderingType::Long, true).unwrap();
        assert_eq!(render(&token), "age as long desc");
    }

    #[test]
    fn test_random_seed_is_quoted() {
        assert_eq!(render(&OrderByToken::random(None)), "random()");
        assert_eq!(
            render(&OrderByToken::random(Some("it's".into()))),
            "random('it''s')"
        );
    }

    #[test]
    fn test_score_descending() {
        assert_eq!(render(&OrderByToken::score(true)), "score() desc");
    }

    #[test]
    fn test_distance_to_point() {
        let token = OrderByToken::distance_to_point("location", "p0", "p1", false).unwrap();
        assert_eq!(
            render(&token),
            "spatial.distance(location, spatial.point($p0, $p1))"
        );
    }
}
