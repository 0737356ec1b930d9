//! Alias qualification of sort properties.

use std::fmt;

use crate::lexer::Keyword;

/// Aliases discovered while walking a query. The first registration of a
/// name wins; matching is case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasRegistry {
    joins: Vec<String>,
    selections: Vec<String>,
}

impl AliasRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the alias of a join or of an additional FROM root.
    pub fn register_join(&mut self, alias: &str) {
        if !self.joins.iter().any(|a| a == alias) {
            self.joins.push(alias.to_string());
        }
    }

    /// Registers the alias of a select item.
    pub fn register_selection(&mut self, alias: &str) {
        if !self.selections.iter().any(|a| a == alias) {
            self.selections.push(alias.to_string());
        }
    }

    #[must_use]
    pub fn join_aliases(&self) -> &[String] {
        &self.joins
    }

    #[must_use]
    pub fn selection_aliases(&self) -> &[String] {
        &self.selections
    }
}

/// How a sort property is referenced in ORDER BY.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Qualified<'a> {
    /// The property names a select item alias.
    SelectAlias(&'a str),
    /// The property is used as written.
    Verbatim(&'a str),
    /// The property prefixed with the primary alias.
    Prefixed(String),
    /// No alias is known.
    Bare(&'a str),
}

impl Qualified<'_> {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::SelectAlias(text) | Self::Verbatim(text) | Self::Bare(text) => text,
            Self::Prefixed(text) => text.as_str(),
        }
    }
}

impl fmt::Display for Qualified<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides how `property` is referenced in ORDER BY.
///
/// 1. A select alias is referenced bare.
/// 2. Function calls, properties already starting with a join alias, a
///    select alias or the primary alias, and expressions starting with a
///    keyword (e.g. `case when …`) are used verbatim.
/// 3. Otherwise the primary alias is prefixed if known.
#[must_use]
pub fn qualify<'a, S: AsRef<str>>(
    property: &'a str,
    join_aliases: &[S],
    select_aliases: &[S],
    primary_alias: Option<&str>,
) -> Qualified<'a> {
    if select_aliases.iter().any(|a| a.as_ref() == property) {
        return Qualified::SelectAlias(property);
    }

    let has_prefix = |alias: &str| {
        property
            .strip_prefix(alias)
            .is_some_and(|rest| rest.starts_with('.'))
    };

    if property.contains('(')
        || join_aliases.iter().any(|a| has_prefix(a.as_ref()))
        || select_aliases.iter().any(|a| has_prefix(a.as_ref()))
        || primary_alias.is_some_and(has_prefix)
        || starts_with_keyword(property)
    {
        return Qualified::Verbatim(property);
    }

    match primary_alias {
        Some(alias) if !alias.is_empty() => Qualified::Prefixed(format!("{alias}.{property}")),
        _ => Qualified::Bare(property),
    }
}

/// Returns true if `property` is a multi-word expression whose first word is
/// a keyword.
fn starts_with_keyword(property: &str) -> bool {
    let mut words = property.split_whitespace();
    match (words.next(), words.next()) {
        (Some(first), Some(_)) => Keyword::from_str(first).is_some(),
        _ => false,
    }
}
