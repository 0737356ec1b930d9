//! Enhancer configuration.
//!
//! Selects the query language used for non-native queries and the SQL
//! dialect used for native ones. The configuration deserializes from any
//! serde format:
//!
//! ```
//! use oxide_query::{EnhancerConfig, PersistenceProvider};
//!
//! let config = EnhancerConfig::default()
//!     .with_provider(PersistenceProvider::Hibernate)
//!     .with_native_dialect("postgresql");
//! assert_eq!(config.provider, PersistenceProvider::Hibernate);
//! ```

use serde::{Deserialize, Serialize};

use crate::dialect::DialectKind;
use crate::error::QueryError;

/// The persistence provider that executes the queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceProvider {
    /// Hibernate ORM, queries are HQL.
    Hibernate,
    /// EclipseLink, queries are EQL.
    EclipseLink,
    /// Any other provider, queries are plain JPQL.
    #[default]
    Generic,
}

impl PersistenceProvider {
    /// Returns the query language of the provider.
    #[must_use]
    pub const fn dialect(self) -> DialectKind {
        match self {
            Self::Hibernate => DialectKind::Hql,
            Self::EclipseLink => DialectKind::Eql,
            Self::Generic => DialectKind::Jpql,
        }
    }

    /// Returns the provider name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hibernate => "hibernate",
            Self::EclipseLink => "eclipselink",
            Self::Generic => "generic",
        }
    }
}

impl std::str::FromStr for PersistenceProvider {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hibernate" => Ok(Self::Hibernate),
            "eclipselink" => Ok(Self::EclipseLink),
            "generic" => Ok(Self::Generic),
            _ => Err(QueryError::UnknownProvider(s.to_string())),
        }
    }
}

impl std::fmt::Display for PersistenceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration of a [`QueryEnhancerFactory`](crate::QueryEnhancerFactory).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancerConfig {
    /// Provider executing non-native queries.
    pub provider: PersistenceProvider,
    /// Name of the SQL dialect for native queries (e.g., `postgresql`,
    /// `mysql`, `generic`).
    pub native_dialect: String,
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            provider: PersistenceProvider::Generic,
            native_dialect: String::from("generic"),
        }
    }
}

impl EnhancerConfig {
    /// Sets the persistence provider.
    #[must_use]
    pub const fn with_provider(mut self, provider: PersistenceProvider) -> Self {
        self.provider = provider;
        self
    }

    /// Sets the native SQL dialect.
    #[must_use]
    pub fn with_native_dialect(mut self, dialect: impl Into<String>) -> Self {
        self.native_dialect = dialect.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EnhancerConfig::default();
        assert_eq!(config.provider, PersistenceProvider::Generic);
        assert_eq!(config.native_dialect, "generic");
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!(
            "Hibernate".parse::<PersistenceProvider>().unwrap(),
            PersistenceProvider::Hibernate
        );
        assert_eq!(
            "eclipselink".parse::<PersistenceProvider>().unwrap(),
            PersistenceProvider::EclipseLink
        );
        assert!(matches!(
            "toplink".parse::<PersistenceProvider>(),
            Err(QueryError::UnknownProvider(name)) if name == "toplink"
        ));
    }

    #[test]
    fn test_provider_dialect() {
        assert_eq!(PersistenceProvider::Hibernate.dialect(), DialectKind::Hql);
        assert_eq!(PersistenceProvider::EclipseLink.dialect(), DialectKind::Eql);
        assert_eq!(PersistenceProvider::Generic.dialect(), DialectKind::Jpql);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: EnhancerConfig =
            serde_json::from_str(r#"{"provider": "eclipselink"}"#).unwrap();
        assert_eq!(config.provider, PersistenceProvider::EclipseLink);
        assert_eq!(config.native_dialect, "generic");
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = EnhancerConfig::default()
            .with_provider(PersistenceProvider::Hibernate)
            .with_native_dialect("postgresql");
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(
            json,
            r#"{"provider":"hibernate","native_dialect":"postgresql"}"#
        );
        let back: EnhancerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
