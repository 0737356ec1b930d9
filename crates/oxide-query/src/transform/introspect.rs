//! Extraction of alias, projection and constructor usage.

use super::writer::QueryWriter;
use crate::ast::{Alias, Expr, FromRoot, RootSource, Statement};
use crate::dialect::Dialect;

/// What the transformers need to know about a parsed statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Introspection {
    /// Identification variable of the first root of the top-level query.
    pub alias: Option<String>,
    /// Select items of the top-level query as written.
    pub projection: String,
    /// True if a constructor expression occurs anywhere in the statement.
    pub constructor: bool,
}

/// Introspects `statement` under the alias rules of `dialect`.
#[must_use]
pub fn introspect(statement: &Statement, dialect: &dyn Dialect) -> Introspection {
    let infer = dialect.infers_entity_alias();
    match statement {
        Statement::Select(query) => {
            let select = query.body.first_select();
            let alias = select
                .from
                .as_ref()
                .and_then(|from| from.roots.first())
                .and_then(|root| root_alias(root, infer));
            let projection = select
                .select
                .as_ref()
                .map(|clause| {
                    QueryWriter::verbatim()
                        .write_select_items(&clause.items)
                        .render()
                })
                .unwrap_or_default();
            Introspection {
                alias,
                projection,
                constructor: query.any_expr(&Expr::is_constructor),
            }
        }
        Statement::Update(update) => Introspection {
            alias: declared_alias(alias_name(update.alias.as_ref()), &update.entity, infer),
            ..Introspection::default()
        },
        Statement::Delete(delete) => Introspection {
            alias: declared_alias(alias_name(delete.alias.as_ref()), &delete.entity, infer),
            ..Introspection::default()
        },
        Statement::Insert(_) => Introspection::default(),
    }
}

fn alias_name(alias: Option<&Alias>) -> Option<&str> {
    alias.map(|a| a.name.as_str())
}

fn root_alias(root: &FromRoot, infer: bool) -> Option<String> {
    let alias = alias_name(root.alias.as_ref());
    match &root.source {
        RootSource::Entity(entity) => declared_alias(alias, entity, infer),
        RootSource::Subquery { .. } | RootSource::Collection { .. } => alias.map(str::to_string),
    }
}

/// The declared variable, or the entity name where the language allows
/// referring to an unaliased root by its name.
fn declared_alias(alias: Option<&str>, entity: &str, infer: bool) -> Option<String> {
    match alias {
        Some(alias) => Some(alias.to_string()),
        None if infer => Some(entity.to_string()),
        None => None,
    }
}
