#![allow(dead_code)]

use oxide_query::{parse, DialectKind, Order, ParseError, QueryEnhancer, QueryError, Sort};

pub const JPQL_FAMILY: [DialectKind; 3] = [DialectKind::Jpql, DialectKind::Eql, DialectKind::Hql];

pub fn enhancer(dialect: DialectKind, query: &str) -> Box<dyn QueryEnhancer> {
    parse(dialect, query)
        .unwrap_or_else(|e| panic!("Failed to parse {dialect} query: {query}\nError: {e}"))
}

pub fn parse_err(dialect: DialectKind, query: &str) -> ParseError {
    match parse(dialect, query) {
        Err(QueryError::BadGrammar { source, .. }) => source,
        Err(other) => panic!("Expected grammar error for: {query}, got {other:?}"),
        Ok(_) => panic!("Expected grammar error for: {query}"),
    }
}

pub fn sorted(dialect: DialectKind, query: &str, sort: &Sort) -> String {
    enhancer(dialect, query)
        .render_sorted(sort)
        .unwrap_or_else(|e| panic!("Failed to sort: {query}\nError: {e}"))
}

pub fn sorted_by(dialect: DialectKind, query: &str, orders: impl IntoIterator<Item = Order>) -> String {
    sorted(dialect, query, &Sort::by(orders))
}

pub fn count(dialect: DialectKind, query: &str) -> String {
    count_with(dialect, query, None)
}

pub fn count_with(dialect: DialectKind, query: &str, projection: Option<&str>) -> String {
    enhancer(dialect, query)
        .render_count(projection)
        .unwrap_or_else(|e| panic!("Failed to count: {query}\nError: {e}"))
}

/// Verifies that an unsorted rendering reproduces `query` exactly.
pub fn round_trip(dialect: DialectKind, query: &str) {
    let enhancer = enhancer(dialect, query);
    let rendered = enhancer.render().unwrap();
    assert_eq!(
        rendered, query,
        "Round-trip failed.\n  Dialect:  {dialect}\n  Input:    {query}\n  Rendered: {rendered}"
    );
}

/// Normalizes SQL the way the native enhancer prints it.
pub fn normalized_sql(sql: &str) -> String {
    enhancer(DialectKind::Native, sql).render().unwrap()
}
