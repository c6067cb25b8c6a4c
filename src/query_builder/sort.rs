use serde::{Deserialize, Serialize};
use std::fmt;

/// Sort direction for a single key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Order {
    Ascending,
    Descending,
}

impl Order {
    pub fn to_sql(self) -> &'static str {
        match self {
            Order::Ascending => "ASC",
            Order::Descending => "DESC",
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            Order::Ascending => Order::Descending,
            Order::Descending => Order::Ascending,
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_sql())
    }
}

/// Ordered mapping of sort key to direction.
///
/// Insertion order is the precedence order of the keys. A key without a
/// direction sorts ascending. Re-adding an existing key replaces its direction
/// in place rather than appending a duplicate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKeys {
    keys: Vec<(String, Option<Order>)>,
}

impl SortKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key with an explicit (or absent) direction
    pub fn key(mut self, name: &str, order: Option<Order>) -> Self {
        match self.keys.iter_mut().find(|(existing, _)| existing == name) {
            Some(entry) => entry.1 = order,
            None => self.keys.push((name.to_string(), order)),
        }
        self
    }

    pub fn asc(self, name: &str) -> Self {
        self.key(name, Some(Order::Ascending))
    }

    pub fn desc(self, name: &str) -> Self {
        self.key(name, Some(Order::Descending))
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Keys with their effective direction
    pub fn iter(&self) -> impl Iterator<Item = (&str, Order)> {
        self.keys
            .iter()
            .map(|(name, order)| (name.as_str(), order.unwrap_or(Order::Ascending)))
    }

    /// Every key flipped to the opposite direction
    pub fn reversed(&self) -> Self {
        Self {
            keys: self
                .iter()
                .map(|(name, order)| (name.to_string(), Some(order.reverse())))
                .collect(),
        }
    }

    /// Render as the body of an ORDER BY clause, e.g. `START_TIME DESC, TASK_EXECUTION_ID ASC`
    pub fn to_sql(&self) -> String {
        self.iter()
            .map(|(name, order)| format!("{name} {order}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
