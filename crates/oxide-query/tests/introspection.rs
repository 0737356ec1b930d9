//! Tests for alias, projection and constructor detection.

mod common;
use common::*;

use oxide_query::{DialectKind, QueryShape};

#[test]
fn alias_of_first_root() {
    for dialect in JPQL_FAMILY {
        let query = enhancer(dialect, "select a from Person p join p.address a, Role r");
        assert_eq!(query.alias(), Some("p"), "{dialect}");
    }
}

#[test]
fn alias_with_as_keyword() {
    let query = enhancer(DialectKind::Jpql, "SELECT u FROM User AS u");
    assert_eq!(query.alias(), Some("u"));
}

#[test]
fn alias_of_unaliased_root() {
    assert_eq!(
        enhancer(DialectKind::Jpql, "select Person from Person").alias(),
        Some("Person")
    );
    assert_eq!(
        enhancer(DialectKind::Eql, "select Person from Person").alias(),
        Some("Person")
    );
    assert_eq!(enhancer(DialectKind::Hql, "from Person").alias(), None);
}

#[test]
fn projection_of_top_level_select() {
    let query = enhancer(
        DialectKind::Jpql,
        "select p.name, count(a) as addresses from Person p join p.addresses a \
         where exists (select r from Role r where r.owner = p) group by p.name",
    );
    assert_eq!(query.projection(), "p.name, count(a) as addresses");
}

#[test]
fn projection_of_set_operation_is_first_branch() {
    let query = enhancer(
        DialectKind::Eql,
        "select p.name from Person p except select a.name from Animal a",
    );
    assert_eq!(query.shape(), QueryShape::SetOperation);
    assert_eq!(query.projection(), "p.name");
}

#[test]
fn projection_of_from_only_query_is_empty() {
    assert_eq!(enhancer(DialectKind::Hql, "from Person p").projection(), "");
}

#[test]
fn constructor_expression_detection() {
    assert!(enhancer(DialectKind::Jpql, "select new com.x.Dto(p.name) from Person p")
        .has_constructor_expression());
    assert!(enhancer(
        DialectKind::Hql,
        "select p from Person p where p.id in (select new Ref(r.id) from Ref r)"
    )
    .has_constructor_expression());
    assert!(!enhancer(DialectKind::Jpql, "select p.name from Person p")
        .has_constructor_expression());
}

#[test]
fn shape_of_statements() {
    assert_eq!(
        enhancer(DialectKind::Jpql, "select p from Person p").shape(),
        QueryShape::Select
    );
    assert_eq!(
        enhancer(DialectKind::Jpql, "update Person p set p.a = 1").shape(),
        QueryShape::Update
    );
    assert_eq!(
        enhancer(DialectKind::Jpql, "delete from Person p").shape(),
        QueryShape::Delete
    );
    assert_eq!(
        enhancer(DialectKind::Hql, "insert into Person (id) values (1)").shape(),
        QueryShape::Insert
    );
}
