//! Sort specifications.
//!
//! A [`Sort`] is an ordered list of [`Order`]s supplied at runtime, for
//! example from a paging request.
//!
//! ```
//! use oxide_query::{Order, Sort};
//!
//! let sort = Sort::by([Order::asc("lastname"), Order::desc("age").nulls_last()]);
//! assert_eq!(sort.iter().count(), 2);
//! assert!(Sort::unsorted().is_unsorted());
//! ```

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    #[must_use]
    pub const fn is_ascending(self) -> bool {
        matches!(self, Self::Asc)
    }
}

/// Placement of null values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullHandling {
    /// Leave it to the database.
    #[default]
    Native,
    NullsFirst,
    NullsLast,
}

/// Ordering by a single property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Property path, select alias or expression (e.g., `name`,
    /// `address.city`, `length(name)`).
    pub property: String,
    #[serde(default)]
    pub direction: Direction,
    /// Compare case-insensitively by sorting on `lower(property)`.
    #[serde(default)]
    pub ignore_case: bool,
    #[serde(default)]
    pub null_handling: NullHandling,
}

impl Order {
    /// Creates an order with the given direction.
    #[must_use]
    pub fn new(property: impl Into<String>, direction: Direction) -> Self {
        Self {
            property: property.into(),
            direction,
            ignore_case: false,
            null_handling: NullHandling::Native,
        }
    }

    /// Creates an ascending order.
    #[must_use]
    pub fn asc(property: impl Into<String>) -> Self {
        Self::new(property, Direction::Asc)
    }

    /// Creates a descending order.
    #[must_use]
    pub fn desc(property: impl Into<String>) -> Self {
        Self::new(property, Direction::Desc)
    }

    #[must_use]
    pub const fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    #[must_use]
    pub const fn nulls_first(mut self) -> Self {
        self.null_handling = NullHandling::NullsFirst;
        self
    }

    #[must_use]
    pub const fn nulls_last(mut self) -> Self {
        self.null_handling = NullHandling::NullsLast;
        self
    }
}

/// An ordered sequence of orders.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sort {
    orders: Vec<Order>,
}

impl Sort {
    /// The empty sort. Queries sorted by it are returned unchanged.
    #[must_use]
    pub const fn unsorted() -> Self {
        Self { orders: Vec::new() }
    }

    /// Creates a sort from orders, keeping their order.
    #[must_use]
    pub fn by(orders: impl IntoIterator<Item = Order>) -> Self {
        Self {
            orders: orders.into_iter().collect(),
        }
    }

    /// Creates an ascending sort over the given properties.
    #[must_use]
    pub fn by_properties<S: Into<String>>(properties: impl IntoIterator<Item = S>) -> Self {
        Self::by(properties.into_iter().map(Order::asc))
    }

    /// Appends the orders of `other`.
    #[must_use]
    pub fn and(mut self, other: Self) -> Self {
        self.orders.extend(other.orders);
        self
    }

    #[must_use]
    pub fn is_unsorted(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Order> {
        self.orders.iter()
    }
}

impl<'a> IntoIterator for &'a Sort {
    type Item = &'a Order;
    type IntoIter = std::slice::Iter<'a, Order>;

    fn into_iter(self) -> Self::IntoIter {
        self.orders.iter()
    }
}

impl FromIterator<Order> for Sort {
    fn from_iter<I: IntoIterator<Item = Order>>(iter: I) -> Self {
        Self::by(iter)
    }
}
