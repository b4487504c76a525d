//! Spatial shapes and relations

/// Spatial predicate applied between a field and a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialRelation {
    Within,
    Contains,
    Disjoint,
    Intersects,
}

impl SpatialRelation {
    pub fn function_name(&self) -> &'static str {
        match self {
            SpatialRelation::Within => "spatial.within",
            SpatialRelation::Contains => "spatial.contains",
            SpatialRelation::Disjoint => "spatial.disjoint",
            SpatialRelation::Intersects => "spatial.intersects",
        }
    }
}

/// Distance units for circle shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialUnits {
    Kilometers,
    Miles,
}

impl SpatialUnits {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpatialUnits::Kilometers => "Kilometers",
            SpatialUnits::Miles => "Miles",
        }
    }
}

/// A shape argument with its parameters already bound.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeToken {
    text: String,
}

impl ShapeToken {
    /// `spatial.circle($radius, $lat, $lng[, 'Units'])`
    pub fn circle(
        radius_parameter: &str,
        latitude_parameter: &str,
        longitude_parameter: &str,
        units: Option<SpatialUnits>,
    ) -> Self {
        let text = match units {
            Some(units) => format!(
                "spatial.circle(${radius_parameter}, ${latitude_parameter}, ${longitude_parameter}, '{}')",
                units.as_str()
            ),
            None => format!(
                "spatial.circle(${radius_parameter}, ${latitude_parameter}, ${longitude_parameter})"
            ),
        };
        Self { text }
    }

    /// `spatial.wkt($shape)`
    pub fn wkt(shape_parameter: &str) -> Self {
        Self {
            text: format!("spatial.wkt(${shape_parameter})"),
        }
    }

    pub fn write_to(&self, out: &mut String) {
        out.push_str(&self.text);
    }
}

/// Caller-facing description of a spatial filter, before parameters are bound.
#[derive(Debug, Clone, PartialEq)]
pub enum SpatialCriteria {
    Circle {
        relation: SpatialRelation,
        radius: f64,
        latitude: f64,
        longitude: f64,
        units: Option<SpatialUnits>,
    },
    Wkt {
        relation: SpatialRelation,
        shape: String,
    },
}

impl SpatialCriteria {
    pub fn within_radius(radius: f64, latitude: f64, longitude: f64) -> Self {
        SpatialCriteria::Circle {
            relation: SpatialRelation::Within,
            radius,
            latitude,
            longitude,
            units: None,
        }
    }

    pub fn relates_to_shape(relation: SpatialRelation, wkt: impl Into<String>) -> Self {
        SpatialCriteria::Wkt {
            relation,
            shape: wkt.into(),
        }
    }

    pub fn relation(&self) -> SpatialRelation {
        match self {
            SpatialCriteria::Circle { relation, .. } | SpatialCriteria::Wkt { relation, .. } => {
                *relation
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_with_units() {
        let mut out = String::new();
        ShapeToken::circle("p0", "p1", "p2", Some(SpatialUnits::Miles)).write_to(&mut out);
        assert_eq!(out, "spatial.circle($p0, $p1, $p2, 'Miles')");
    }

    #[test]
    fn test_wkt() {
        let mut out = String::new();
        ShapeToken::wkt("p3").write_to(&mut out);
        assert_eq!(out, "spatial.wkt($p3)");
    }
}
