//! Order-by calls

use crate::error::BuildResult;
use crate::token::{OrderByToken, OrderingType, QueryToken};

use super::QueryBuilder;

impl QueryBuilder {
    pub fn order_by(&mut self, field: &str) -> BuildResult<&mut Self> {
        self.order_by_with(field, OrderingType::String)
    }

    pub fn order_by_with(&mut self, field: &str, ordering: OrderingType) -> BuildResult<&mut Self> {
        self.add_field_ordering(field, ordering, false)
    }

    pub fn order_by_descending(&mut self, field: &str) -> BuildResult<&mut Self> {
        self.order_by_descending_with(field, OrderingType::String)
    }

    pub fn order_by_descending_with(&mut self, field: &str, ordering: OrderingType) -> BuildResult<&mut Self> {
        self.add_field_ordering(field, ordering, true)
    }

    pub fn order_by_score(&mut self) -> BuildResult<&mut Self> {
        self.push_ordering(OrderByToken::score(false))
    }

    pub fn order_by_score_descending(&mut self) -> BuildResult<&mut Self> {
        self.push_ordering(OrderByToken::score(true))
    }

    /// Random order, reproducible when a seed is given.
    pub fn random_ordering(&mut self, seed: Option<&str>) -> BuildResult<&mut Self> {
        let seed = seed.filter(|s| !s.trim().is_empty()).map(str::to_string);
        self.push_ordering(OrderByToken::random(seed))
    }

    pub fn order_by_distance(&mut self, field: &str, latitude: f64, longitude: f64) -> BuildResult<&mut Self> {
        self.add_point_distance(field, latitude, longitude, false)
    }

    pub fn order_by_distance_descending(
        &mut self,
        field: &str,
        latitude: f64,
        longitude: f64,
    ) -> BuildResult<&mut Self> {
        self.add_point_distance(field, latitude, longitude, true)
    }

    /// Distance to a WKT shape
    pub fn order_by_distance_wkt(&mut self, field: &str, shape_wkt: &str) -> BuildResult<&mut Self> {
        self.add_shape_distance(field, shape_wkt, false)
    }

    pub fn order_by_distance_wkt_descending(&mut self, field: &str, shape_wkt: &str) -> BuildResult<&mut Self> {
        self.add_shape_distance(field, shape_wkt, true)
    }

    fn add_field_ordering(&mut self, field: &str, ordering: OrderingType, descending: bool) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        let field = self.resolve_field(field, false)?;
        let token = OrderByToken::field(field, ordering, descending)?;
        self.push_ordering(token)
    }

    fn add_point_distance(
        &mut self,
        field: &str,
        latitude: f64,
        longitude: f64,
        descending: bool,
    ) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        let field = self.resolve_field(field, false)?;
        let lat = self.parameters.bind(&latitude.into());
        let lng = self.parameters.bind(&longitude.into());
        let token = OrderByToken::distance_to_point(field, lat, lng, descending)?;
        self.push_ordering(token)
    }

    fn add_shape_distance(&mut self, field: &str, shape_wkt: &str, descending: bool) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        let field = self.resolve_field(field, false)?;
        let shape = self.parameters.bind(&shape_wkt.into());
        let token = OrderByToken::distance_to_shape(field, shape, descending)?;
        self.push_ordering(token)
    }

    fn push_ordering(&mut self, token: OrderByToken) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        self.order_by_tokens.push(QueryToken::OrderBy(token));
        Ok(self)
    }
}

