//! Tests for ORDER BY injection in JPQL, EQL and HQL queries.

mod common;
use common::*;

use oxide_query::{DialectKind, Order, QueryError, Sort};

#[test]
fn sort_adds_order_by_in_every_dialect() {
    for dialect in JPQL_FAMILY {
        assert_eq!(
            sorted_by(dialect, "select p from Person p", [Order::asc("name")]),
            "select p from Person p order by p.name asc"
        );
    }
}

#[test]
fn sort_keeps_original_spelling() {
    assert_eq!(
        sorted_by(
            DialectKind::Jpql,
            "SELECT p FROM Person p WHERE p.name LIKE :name",
            [Order::desc("age")]
        ),
        "SELECT p FROM Person p WHERE p.name LIKE :name order by p.age desc"
    );
}

#[test]
fn sort_references_select_alias_bare() {
    assert_eq!(
        sorted_by(
            DialectKind::Jpql,
            "select p.name as n from Person p",
            [Order::asc("n")]
        ),
        "select p.name as n from Person p order by n asc"
    );
}

#[test]
fn sort_select_alias_with_ignore_case() {
    assert_eq!(
        sorted_by(
            DialectKind::Hql,
            "select p.name as n from Person p",
            [Order::asc("n").ignore_case()]
        ),
        "select p.name as n from Person p order by lower(n) asc"
    );
}

#[test]
fn sort_keeps_join_alias_references() {
    assert_eq!(
        sorted_by(
            DialectKind::Jpql,
            "select p from Person p left join p.address a",
            [Order::asc("a.city"), Order::asc("name")]
        ),
        "select p from Person p left join p.address a order by a.city asc, p.name asc"
    );
}

#[test]
fn sort_sees_aliases_of_additional_roots() {
    assert_eq!(
        sorted_by(
            DialectKind::Jpql,
            "select p from Person p, Address a where a.owner = p",
            [Order::asc("a.city")]
        ),
        "select p from Person p, Address a where a.owner = p order by a.city asc"
    );
}

#[test]
fn sort_keeps_functions_and_case_expressions() {
    assert_eq!(
        sorted_by(
            DialectKind::Jpql,
            "select p from Person p",
            [
                Order::asc("length(p.name)"),
                Order::desc("case when p.age > 18 then 1 else 0 end"),
            ]
        ),
        "select p from Person p order by length(p.name) asc, \
         case when p.age > 18 then 1 else 0 end desc"
    );
}

#[test]
fn sort_is_idempotent_for_qualified_properties() {
    assert_eq!(
        sorted_by(DialectKind::Jpql, "select p from Person p", [Order::asc("p.name")]),
        "select p from Person p order by p.name asc"
    );
}

#[test]
fn sort_appends_to_existing_order_by() {
    assert_eq!(
        sorted_by(
            DialectKind::Eql,
            "select p from Person p order by p.age desc",
            [Order::asc("name").nulls_first()]
        ),
        "select p from Person p order by p.age desc, p.name asc nulls first"
    );
}

#[test]
fn sort_preserves_input_order() {
    let first = Sort::by([Order::asc("b"), Order::asc("a")]);
    let second = Sort::by([Order::desc("c")]);
    assert_eq!(
        sorted(
            DialectKind::Jpql,
            "select p from Person p",
            &first.and(second)
        ),
        "select p from Person p order by p.b asc, p.a asc, p.c desc"
    );
}

#[test]
fn unsorted_returns_query_unchanged() {
    for dialect in JPQL_FAMILY {
        let query = "select   p from Person p";
        assert_eq!(sorted(dialect, query, &Sort::unsorted()), query);
    }
}

#[test]
fn sort_never_enters_subqueries() {
    assert_eq!(
        sorted_by(
            DialectKind::Jpql,
            "select p from Person p where p.age = (select max(q.age) from Person q)",
            [Order::asc("name")]
        ),
        "select p from Person p where p.age = (select max(q.age) from Person q) \
         order by p.name asc"
    );
}

#[test]
fn sort_set_operation_once_without_alias() {
    assert_eq!(
        sorted_by(
            DialectKind::Hql,
            "select p.name from Person p union all select a.name from Animal a",
            [Order::asc("name"), Order::desc("a.name")]
        ),
        "select p.name from Person p union all select a.name from Animal a \
         order by name asc, a.name desc"
    );
}

#[test]
fn sort_hql_from_only_queries() {
    assert_eq!(
        sorted_by(DialectKind::Hql, "from Person p", [Order::asc("name")]),
        "from Person p order by p.name asc"
    );
    assert_eq!(
        sorted_by(DialectKind::Hql, "from Person", [Order::asc("name")]),
        "from Person order by name asc"
    );
}

#[test]
fn sort_hql_goes_before_row_limits() {
    assert_eq!(
        sorted_by(
            DialectKind::Hql,
            "from Person p where p.age > 1 offset 5 rows fetch first 10 rows only",
            [Order::asc("name")]
        ),
        "from Person p where p.age > 1 order by p.name asc offset 5 rows fetch first 10 rows only"
    );
}

#[test]
fn sort_update_is_not_rewritten() {
    let query = "update Person p set p.name = 'x'";
    assert_eq!(sorted_by(DialectKind::Jpql, query, [Order::asc("name")]), query);
}

#[test]
fn sort_rejects_invalid_properties() {
    for dialect in JPQL_FAMILY {
        for property in ["", "   ", "name desc, p.password", "name) or (1 = 1"] {
            let result = enhancer(dialect, "select p from Person p")
                .render_sorted(&Sort::by([Order::asc(property)]));
            match result {
                Err(QueryError::InvalidSortExpression { property: rejected, .. }) => {
                    assert_eq!(rejected, property);
                }
                other => panic!("Expected invalid sort expression for {property:?}, got {other:?}"),
            }
        }
    }
}

#[test]
fn sort_keyword_named_entities() {
    assert_eq!(
        sorted_by(DialectKind::Jpql, "select o from Order o", [Order::desc("total")]),
        "select o from Order o order by o.total desc"
    );
    assert_eq!(
        sorted_by(DialectKind::Hql, "from Group g join g.members m", [Order::asc("m.name")]),
        "from Group g join g.members m order by m.name asc"
    );
}

#[test]
fn sort_hql_from_first_subquery_stays_unsorted() {
    assert_eq!(
        sorted_by(
            DialectKind::Hql,
            "from Person p where p.id in (from Person q where q.age > 18)",
            [Order::asc("name")]
        ),
        "from Person p where p.id in (from Person q where q.age > 18) order by p.name asc"
    );
}
