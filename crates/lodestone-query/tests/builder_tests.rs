//! Builder and compiler behavior, observed through the rendered query text.

use lodestone_config::{Conventions, DefaultOperator};
use lodestone_query::token::{
    BooleanOperator, Facet, GroupBy, OrderingType, QueryData, QueryToken, SearchOperator,
    SpatialCriteria, SpatialRelation, Suggestion,
};
use lodestone_query::{BuildError, MethodCall, QueryBuilder, QueryValue, RenderError};
use serde_json::json;
use std::time::Duration;

fn users() -> QueryBuilder {
    QueryBuilder::for_collection(Conventions::default(), "Users").unwrap()
}

fn text(builder: &QueryBuilder) -> String {
    builder.to_query_text().unwrap()
}

// =========================================================================
// Operators and negation
// =========================================================================

#[test]
fn test_explicit_or_then_negated_clause() {
    let mut q = users();
    q.where_equals("name", "a")
        .unwrap()
        .or_else()
        .unwrap()
        .where_greater_than("age", 5)
        .unwrap()
        .negate_next()
        .unwrap()
        .where_equals("city", "x")
        .unwrap();

    assert_eq!(
        text(&q),
        "from Users where name = $p0 or age > $p1 and not city = $p2"
    );
    let params = q.parameters();
    assert_eq!(params.get("p0"), Some(&json!("a")));
    assert_eq!(params.get("p1"), Some(&json!(5)));
    assert_eq!(params.get("p2"), Some(&json!("x")));
}

#[test]
fn test_implicit_operator_uses_default() {
    let mut q = users();
    q.where_equals("a", 1).unwrap().where_equals("b", 2).unwrap();
    assert_eq!(text(&q), "from Users where a = $p0 and b = $p1");
}

#[test]
fn test_conventions_default_operator_or() {
    let conventions = Conventions {
        default_operator: DefaultOperator::Or,
        ..Conventions::default()
    };
    let mut q = QueryBuilder::for_collection(conventions, "Users").unwrap();
    q.where_equals("a", 1).unwrap().where_equals("b", 2).unwrap();
    assert_eq!(text(&q), "from Users where a = $p0 or b = $p1");
}

#[test]
fn test_using_default_operator_after_where_rejected() {
    let mut q = users();
    q.using_default_operator(BooleanOperator::Or).unwrap();
    q.where_equals("a", 1).unwrap().where_equals("b", 2).unwrap();
    assert_eq!(text(&q), "from Users where a = $p0 or b = $p1");

    let err = q.using_default_operator(BooleanOperator::And).unwrap_err();
    assert_eq!(err, BuildError::DefaultOperatorAfterWhere);
}

#[test]
fn test_search_forces_or() {
    let mut q = users();
    q.search("bio", "rust tokio").unwrap().where_equals("name", "a").unwrap();
    assert_eq!(text(&q), "from Users where search(bio, $p0) or name = $p1");
}

#[test]
fn test_search_and_operator_still_joined_with_or() {
    let mut q = users();
    q.search_with("bio", "rust tokio", SearchOperator::And)
        .unwrap()
        .where_equals("name", "a")
        .unwrap();
    assert_eq!(
        text(&q),
        "from Users where search(bio, $p0, and) or name = $p1"
    );
}

#[test]
fn test_negate_first_clause_inserts_exists_filler() {
    let mut q = users();
    q.negate_next().unwrap().where_equals("name", "a").unwrap();

    let tokens: Vec<String> = q.where_tokens().iter().map(QueryToken::render).collect();
    assert_eq!(tokens, vec!["exists(name)", "and", "not", "name = $p0"]);
    assert_eq!(text(&q), "from Users where exists(name) and not name = $p0");
}

#[test]
fn test_negate_inside_subclause_inserts_filler() {
    let mut q = users();
    q.where_equals("a", 1)
        .unwrap()
        .open_subclause()
        .unwrap()
        .negate_next()
        .unwrap()
        .where_equals("b", 2)
        .unwrap()
        .close_subclause()
        .unwrap();
    assert_eq!(
        text(&q),
        "from Users where a = $p0 and (exists(b) and not b = $p1)"
    );
}

#[test]
fn test_negate_without_field_uses_true_filler() {
    let mut q = users();
    q.negate_next().unwrap().where_true().unwrap();
    assert_eq!(text(&q), "from Users where true and not true");
}

#[test]
fn test_negate_applies_once() {
    let mut q = users();
    q.where_equals("a", 1)
        .unwrap()
        .negate_next()
        .unwrap()
        .where_equals("b", 2)
        .unwrap()
        .where_equals("c", 3)
        .unwrap();
    assert_eq!(
        text(&q),
        "from Users where a = $p0 and not b = $p1 and c = $p2"
    );
}

#[test]
fn test_consecutive_explicit_operators_rejected() {
    let mut q = users();
    q.where_equals("a", 1).unwrap().and_also().unwrap();
    assert_eq!(
        q.or_else().unwrap_err(),
        BuildError::ConsecutiveOperators("or")
    );
}

#[test]
fn test_explicit_operator_on_empty_list_is_noop() {
    let mut q = users();
    q.and_also().unwrap().where_equals("a", 1).unwrap();
    assert_eq!(text(&q), "from Users where a = $p0");
}

// =========================================================================
// Subclauses and intersect
// =========================================================================

#[test]
fn test_subclause_rendering() {
    let mut q = users();
    q.where_equals("a", 1)
        .unwrap()
        .open_subclause()
        .unwrap()
        .where_equals("b", 2)
        .unwrap()
        .or_else()
        .unwrap()
        .where_equals("c", 3)
        .unwrap()
        .close_subclause()
        .unwrap();
    assert_eq!(
        text(&q),
        "from Users where a = $p0 and (b = $p1 or c = $p2)"
    );
    assert_eq!(q.clause_depth(), 0);
}

#[test]
fn test_unbalanced_open_fails_at_render() {
    let mut q = users();
    q.open_subclause().unwrap().where_equals("a", 1).unwrap();
    assert_eq!(
        q.to_query_text().unwrap_err(),
        RenderError::UnbalancedSubclauses { depth: 1 }
    );
}

#[test]
fn test_close_without_open_rejected() {
    let mut q = users();
    assert_eq!(
        q.close_subclause().unwrap_err(),
        BuildError::UnbalancedSubclause
    );
}

#[test]
fn test_intersect() {
    let mut q = users();
    q.where_equals("a", 1)
        .unwrap()
        .intersect()
        .unwrap()
        .where_equals("b", 2)
        .unwrap();
    assert!(q.is_intersect());
    assert_eq!(text(&q), "from Users where intersect(a = $p0, b = $p1)");
}

#[test]
fn test_intersect_requires_preceding_clause() {
    let mut q = users();
    assert_eq!(q.intersect().unwrap_err(), BuildError::IllegalIntersect);
}

// =========================================================================
// Values and parameters
// =========================================================================

#[test]
fn test_identity_property_becomes_id_function() {
    let mut q = users();
    q.where_equals("id", "users/1").unwrap();
    assert_eq!(text(&q), "from Users where id() = $p0");
}

#[test]
fn test_custom_identity_property() {
    let conventions = Conventions::default().with_identity_property("Key");
    let mut q = QueryBuilder::for_collection(conventions, "Users").unwrap();
    q.where_equals("Key", "users/1").unwrap().where_equals("id", 1).unwrap();
    assert_eq!(text(&q), "from Users where id() = $p0 and id = $p1");
}

#[test]
fn test_keyword_field_is_quoted() {
    let mut q = users();
    q.where_equals("order", 1).unwrap();
    assert_eq!(text(&q), "from Users where 'order' = $p0");
}

#[test]
fn test_open_range_bounds() {
    let mut q = users();
    q.where_greater_than("age", None::<i32>)
        .unwrap()
        .where_less_than("age", QueryValue::Null)
        .unwrap()
        .where_between("score", QueryValue::Null, QueryValue::Null)
        .unwrap();
    assert_eq!(
        text(&q),
        "from Users where age > $p0 and age < $p1 and score between $p2 and $p3"
    );
    let params = q.parameters();
    assert_eq!(params.get("p0"), Some(&json!("*")));
    assert_eq!(params.get("p1"), Some(&json!("NULL")));
    assert_eq!(params.get("p2"), Some(&json!("*")));
    assert_eq!(params.get("p3"), Some(&json!("NULL")));
}

#[test]
fn test_duration_bound_as_ticks() {
    let mut q = users();
    q.where_equals("elapsed", Duration::from_secs(1)).unwrap();
    assert_eq!(q.parameters().get("p0"), Some(&json!(10_000_000)));
}

#[test]
fn test_where_in_flattens_into_one_parameter() {
    let mut q = users();
    let values = vec![QueryValue::from(vec![1, 2]), QueryValue::from(3)];
    q.where_in("rank", values).unwrap();
    assert_eq!(text(&q), "from Users where rank in ($p0)");
    assert_eq!(q.parameters().get("p0"), Some(&json!([1, 2, 3])));
}

#[test]
fn test_contains_all_empty_renders_true() {
    let mut q = users();
    q.contains_all("tags", Vec::<String>::new()).unwrap();
    assert_eq!(q.where_tokens(), &[QueryToken::True]);
    assert_eq!(text(&q), "from Users where true");
    assert!(q.parameters().is_empty());
}

#[test]
fn test_contains_all_flattens_nested() {
    let mut q = users();
    let values = vec![QueryValue::from(vec!["a", "b"]), QueryValue::from("c")];
    q.contains_all("tags", values).unwrap();
    assert_eq!(text(&q), "from Users where tags all in ($p0)");
    assert_eq!(q.parameters().get("p0"), Some(&json!(["a", "b", "c"])));
}

#[test]
fn test_contains_any_renders_in() {
    let mut q = users();
    q.contains_any("tags", vec!["a", "b"]).unwrap();
    assert_eq!(text(&q), "from Users where tags in ($p0)");
}

#[test]
fn test_named_parameter_not_reused_by_generated_name() {
    let mut q = users();
    q.add_parameter("$p0", "custom").unwrap();
    q.where_equals("a", 1).unwrap();
    assert_eq!(text(&q), "from Users where a = $p1");
}

#[test]
fn test_compare_exchange_method() {
    let mut q = users();
    q.where_equals_method(
        "owner",
        MethodCall::compare_exchange("locks/1").with_access_path("Owner"),
        false,
    )
    .unwrap();
    assert_eq!(text(&q), "from Users where owner = cmpxchg($p0).Owner");
}

#[test]
fn test_unsupported_method_rejected_without_side_effects() {
    let mut q = users();
    let err = q
        .where_equals_method("owner", MethodCall::new("counter", vec!["x".into()]), false)
        .unwrap_err();
    assert_eq!(err, BuildError::UnsupportedMethod("counter".to_string()));
    assert!(q.where_tokens().is_empty());
    assert!(q.parameters().is_empty());
}

// =========================================================================
// Modifiers
// =========================================================================

#[test]
fn test_boost_fuzzy_proximity() {
    let mut q = users();
    q.where_equals("name", "a").unwrap().boost(2.0).unwrap();
    q.search("bio", "fast code").unwrap().proximity(2).unwrap();
    q.where_equals("nick", "bob").unwrap().fuzzy(0.5).unwrap();
    assert_eq!(
        text(&q),
        "from Users where boost(name = $p0, 2) and proximity(search(bio, $p1), 2) or fuzzy(nick = $p2, 0.5)"
    );
}

#[test]
fn test_boost_of_one_is_noop() {
    let mut q = users();
    q.where_equals("name", "a").unwrap().boost(1.0).unwrap();
    assert_eq!(text(&q), "from Users where name = $p0");
}

#[test]
fn test_exact_modifier_wraps_last_clause() {
    let mut q = users();
    q.where_equals("name", "Ann").unwrap().exact().unwrap();
    assert_eq!(text(&q), "from Users where exact(name = $p0)");
}

#[test]
fn test_modifier_without_where_rejected() {
    let mut q = users();
    assert_eq!(q.boost(2.0).unwrap_err(), BuildError::MissingWhereClause);
    q.where_equals("a", 1).unwrap().open_subclause().unwrap();
    assert_eq!(q.fuzzy(0.5).unwrap_err(), BuildError::MissingWhereClause);
}

#[test]
fn test_invalid_modifier_values() {
    let mut q = users();
    q.where_equals("a", 1).unwrap();
    assert_eq!(q.boost(0.0).unwrap_err(), BuildError::InvalidBoost(0.0));
    assert_eq!(q.fuzzy(1.1).unwrap_err(), BuildError::InvalidFuzzy(1.1));
    assert_eq!(q.proximity(0).unwrap_err(), BuildError::InvalidProximity(0));
}

#[test]
fn test_exact_equality() {
    let mut q = users();
    q.where_equals_with("name", "Ann", true).unwrap();
    assert_eq!(text(&q), "from Users where exact(name = $p0)");
}

// =========================================================================
// Spatial
// =========================================================================

#[test]
fn test_spatial_within_radius() {
    let mut q = users();
    q.spatial("location", &SpatialCriteria::within_radius(10.0, 32.1, 34.8), None)
        .unwrap();
    assert_eq!(
        text(&q),
        "from Users where spatial.within(location, spatial.circle($p0, $p1, $p2))"
    );
}

#[test]
fn test_spatial_custom_error_pct_written() {
    let mut q = users();
    let criteria = SpatialCriteria::relates_to_shape(SpatialRelation::Intersects, "POINT(1 2)");
    q.spatial("area", &criteria, Some(0.05)).unwrap();
    assert_eq!(
        text(&q),
        "from Users where spatial.intersects(area, spatial.wkt($p0), 0.05)"
    );
}

#[test]
fn test_spatial_default_error_pct_omitted() {
    let mut q = users();
    let criteria = SpatialCriteria::relates_to_shape(SpatialRelation::Within, "POINT(1 2)");
    q.spatial("area", &criteria, Some(0.025)).unwrap();
    assert_eq!(text(&q), "from Users where spatial.within(area, spatial.wkt($p0))");
}

// =========================================================================
// Select, grouping, ordering and includes
// =========================================================================

#[test]
fn test_distinct_occupies_first_slot() {
    let mut q = users();
    q.select_fields(&QueryData::fields(["name"])).unwrap();
    q.distinct().unwrap();
    assert!(q.is_distinct());
    assert_eq!(q.select_tokens()[0], QueryToken::Distinct);
    assert_eq!(text(&q), "from Users select distinct name");
}

#[test]
fn test_distinct_alone_selects_all() {
    let mut q = users();
    q.distinct().unwrap();
    assert_eq!(text(&q), "from Users select distinct *");
    assert_eq!(q.distinct().unwrap_err(), BuildError::AlreadyDistinct);
}

#[test]
fn test_fields_to_fetch_replaced_in_place() {
    let mut q = users();
    q.select_fields(&QueryData::fields(["a"])).unwrap();
    q.select_fields(&QueryData::fields(["b", "c"])).unwrap();
    assert_eq!(q.select_tokens().len(), 1);
    assert_eq!(q.fields_to_fetch().unwrap().fields(), &["b", "c"]);
    assert_eq!(text(&q), "from Users select b, c");
}

#[test]
fn test_group_by_with_aggregates() {
    let mut q = QueryBuilder::for_collection(Conventions::default(), "Orders").unwrap();
    q.group_by_with(&[GroupBy::field("ShipTo.City"), GroupBy::array("Lines")])
        .unwrap()
        .group_by_key(None, Some("city"))
        .unwrap()
        .group_by_sum("Freight", Some("freight"))
        .unwrap()
        .group_by_count(Some("total"))
        .unwrap();
    assert_eq!(
        text(&q),
        "from Orders group by ShipTo.City, array(Lines) select key() as city, sum(Freight) as freight, count() as total"
    );
}

#[test]
fn test_group_by_key_resolves_alias() {
    let mut q = QueryBuilder::for_collection(Conventions::default(), "Orders").unwrap();
    q.group_by(&["Company"]).unwrap();
    q.add_group_by_alias("Company", "company");
    q.group_by_key(Some("company"), Some("company")).unwrap();
    assert_eq!(
        text(&q),
        "from Orders group by Company select Company as company"
    );
}

#[test]
fn test_group_by_on_static_index_rejected() {
    let mut q = QueryBuilder::for_index(Conventions::default(), "Orders/Totals").unwrap();
    assert_eq!(
        q.group_by(&["Company"]).unwrap_err(),
        BuildError::GroupByOnStaticIndex
    );
}

#[test]
fn test_order_by_variants() {
    let mut q = users();
    q.order_by("name")
        .unwrap()
        .order_by_descending_with("age", OrderingType::Long)
        .unwrap()
        .order_by_score_descending()
        .unwrap()
        .random_ordering(Some("seed"))
        .unwrap();
    assert_eq!(
        text(&q),
        "from Users order by name, age as long desc, score() desc, random('seed')"
    );
}

#[test]
fn test_order_by_distance() {
    let mut q = users();
    q.order_by_distance("location", 32.1, 34.8).unwrap();
    assert_eq!(
        text(&q),
        "from Users order by spatial.distance(location, spatial.point($p0, $p1))"
    );
}

#[test]
fn test_includes() {
    let mut q = users();
    q.include("Employee")
        .unwrap()
        .include("Employee")
        .unwrap()
        .include_counters(None, &["likes"])
        .unwrap()
        .highlight("body", 128, 1, None)
        .unwrap()
        .include_timings()
        .unwrap();
    assert_eq!(
        text(&q),
        "from Users include Employee,counters($p0),highlight(body,128,1),timings()"
    );
}

#[test]
fn test_full_section_order() {
    let mut q = QueryBuilder::new(Conventions::default());
    q.from_collection("Orders", Some("o"))
        .unwrap()
        .declare_function("output", "o", "return o;")
        .unwrap()
        .where_equals("Company", "companies/1")
        .unwrap()
        .order_by("Freight")
        .unwrap()
        .load("o.Company", "c")
        .unwrap()
        .select_fields(&QueryData::custom_function("output(o)"))
        .unwrap()
        .include("Employee")
        .unwrap();

    assert_eq!(
        text(&q),
        "declare function output(o) {\nreturn o;\n}\nfrom Orders as o where Company = $p0 order by Freight load o.Company as c select output(o) include Employee"
    );
}

#[test]
fn test_missing_source_fails_at_render() {
    let mut q = QueryBuilder::new(Conventions::default());
    q.where_equals("a", 1).unwrap();
    assert_eq!(q.to_query_text().unwrap_err(), RenderError::MissingSource);
}

// =========================================================================
// Facets and suggestions
// =========================================================================

#[test]
fn test_facets_exclusive_in_select() {
    let mut q = QueryBuilder::for_index(Conventions::default(), "Products/Search").unwrap();
    q.aggregate_by(&Facet::by_field("Brand")).unwrap();
    q.aggregate_using("facets/products").unwrap();
    assert_eq!(
        text(&q),
        "from index 'Products/Search' select facet(Brand), facet(id('facets/products'))"
    );

    let err = q.select_fields(&QueryData::fields(["Name"])).unwrap_err();
    assert!(matches!(err, BuildError::IllegalSelect(_)));
}

#[test]
fn test_facet_after_projection_rejected() {
    let mut q = users();
    q.select_fields(&QueryData::fields(["Name"])).unwrap();
    let err = q.aggregate_by(&Facet::by_field("Brand")).unwrap_err();
    assert!(matches!(err, BuildError::IllegalSelect(_)));
}

#[test]
fn test_suggest() {
    let mut q = users();
    q.suggest_using(&Suggestion::term("Name", "jhon")).unwrap();
    assert_eq!(text(&q), "from Users select suggest(Name, $p0)");
}

#[test]
fn test_second_suggestion_rejected() {
    let mut q = users();
    q.suggest_using(&Suggestion::term("Name", "jhon")).unwrap();
    let err = q.suggest_using(&Suggestion::term("City", "osl")).unwrap_err();
    assert!(matches!(err, BuildError::IllegalSelect(_)));
    assert_eq!(q.parameters().len(), 1);
    assert_eq!(text(&q), "from Users select suggest(Name, $p0)");
}

#[test]
fn test_suggest_with_where_rejected() {
    let mut q = users();
    q.where_equals("a", 1).unwrap();
    let err = q.suggest_using(&Suggestion::term("Name", "jhon")).unwrap_err();
    assert!(matches!(err, BuildError::IllegalSelect(_)));
}

// =========================================================================
// More like this
// =========================================================================

#[test]
fn test_more_like_this_scope() {
    let mut q = QueryBuilder::for_index(Conventions::default(), "Products/Search").unwrap();
    q.where_equals("Category", "books").unwrap();
    q.more_like_this(None, |inner| {
        inner.where_equals("id", "products/1")?;
        Ok(())
    })
    .unwrap();

    assert!(!q.is_more_like_this_open());
    assert_eq!(
        text(&q),
        "from index 'Products/Search' where Category = $p0 and moreLikeThis(id() = $p1)"
    );
}

#[test]
fn test_more_like_this_document_with_options() {
    let mut q = QueryBuilder::for_index(Conventions::default(), "Products/Search").unwrap();
    let options = lodestone_query::token::MoreLikeThisOptions {
        minimum_term_frequency: Some(1),
        ..Default::default()
    };
    q.open_more_like_this()
        .unwrap()
        .more_like_this_options(&options)
        .unwrap()
        .more_like_this_document(r#"{ "Name": "Rust" }"#)
        .unwrap()
        .close_more_like_this()
        .unwrap();
    assert_eq!(
        text(&q),
        "from index 'Products/Search' where moreLikeThis($p1, $p0)"
    );
}

#[test]
fn test_open_more_like_this_fails_render() {
    let mut q = users();
    q.open_more_like_this().unwrap().where_equals("a", 1).unwrap();
    assert!(q.where_tokens().is_empty());
    assert_eq!(
        q.to_query_text().unwrap_err(),
        RenderError::UnclosedMoreLikeThis
    );
    assert_eq!(
        q.open_more_like_this().unwrap_err(),
        BuildError::MoreLikeThisAlreadyOpen
    );
}

#[test]
fn test_negated_more_like_this_gets_filler() {
    let mut q = users();
    q.negate_next().unwrap();
    q.more_like_this(None, |inner| {
        inner.where_equals("name", "a")?;
        Ok(())
    })
    .unwrap();
    assert_eq!(
        text(&q),
        "from Users where true and not moreLikeThis(name = $p0)"
    );
}

#[test]
fn test_negated_more_like_this_after_open_subclause() {
    let mut q = users();
    q.open_subclause().unwrap().negate_next().unwrap();
    q.more_like_this(None, |inner| {
        inner.where_equals("name", "a")?;
        Ok(())
    })
    .unwrap();
    q.close_subclause().unwrap();
    assert_eq!(
        text(&q),
        "from Users where (true and not moreLikeThis(name = $p0))"
    );
}

#[test]
fn test_more_like_this_document_without_scope_binds_nothing() {
    let mut q = users();
    assert_eq!(
        q.more_like_this_document("{}").unwrap_err(),
        BuildError::MoreLikeThisNotOpen
    );
    assert!(q.parameters().is_empty());

    q.where_equals("name", "a").unwrap();
    assert_eq!(text(&q), "from Users where name = $p0");
}

#[test]
fn test_root_subclause_cannot_close_inside_more_like_this() {
    let mut q = users();
    q.open_subclause().unwrap().open_more_like_this().unwrap();
    q.where_equals("a", 1).unwrap();
    assert_eq!(
        q.close_subclause().unwrap_err(),
        BuildError::UnbalancedSubclause
    );

    q.close_more_like_this().unwrap().close_subclause().unwrap();
    assert_eq!(text(&q), "from Users where (moreLikeThis(a = $p0))");
}

#[test]
fn test_more_like_this_cannot_close_over_open_subclause() {
    let mut q = users();
    q.open_more_like_this().unwrap().open_subclause().unwrap();
    q.where_equals("a", 1).unwrap();
    assert_eq!(
        q.close_more_like_this().unwrap_err(),
        BuildError::UnbalancedSubclause
    );
    assert!(q.is_more_like_this_open());

    q.close_subclause().unwrap().close_more_like_this().unwrap();
    assert_eq!(text(&q), "from Users where moreLikeThis((a = $p0))");
}

// =========================================================================
// Raw queries and compiled output
// =========================================================================

#[test]
fn test_raw_query() {
    let mut q = users();
    q.raw_query("from Users where age > $minAge").unwrap();
    q.add_parameter("minAge", 30).unwrap();
    let compiled = q.compile().unwrap();
    assert_eq!(compiled.text(), "from Users where age > $minAge");
    assert_eq!(compiled.parameters().get("minAge"), Some(&json!(30)));

    assert_eq!(
        q.where_equals("a", 1).unwrap_err(),
        BuildError::RawQueryPresent
    );
}

#[test]
fn test_raw_query_after_fluent_rejected() {
    let mut q = users();
    q.where_equals("a", 1).unwrap();
    assert_eq!(
        q.raw_query("from Users").unwrap_err(),
        BuildError::FluentClausesPresent
    );
}

#[test]
fn test_compiled_flags_and_hash() {
    let mut q = users();
    q.where_equals("a", 1)
        .unwrap()
        .skip(10)
        .take(5)
        .wait_for_non_stale_results(None);
    let compiled = q.compile().unwrap();
    assert_eq!(compiled.start(), 10);
    assert_eq!(compiled.page_size(), Some(5));
    assert!(compiled.wait_for_non_stale_results());
    assert_eq!(compiled.wait_timeout(), Some(Duration::from_secs(15)));
    assert!(!compiled.can_cache_aggressively());

    let again = q.compile().unwrap();
    assert_eq!(compiled.query_hash(), again.query_hash());
}
