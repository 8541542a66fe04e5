// src/events/change.rs
//
// Store change signals
//
// A change names the entity kinds a committed write touched. It carries
// no row data: listeners re-run their own query against the new snapshot.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityKind {
    Category,
    Meal,
    Ingredient,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Category, EntityKind::Meal, EntityKind::Ingredient];

    fn bit(self) -> u8 {
        match self {
            EntityKind::Category => 0b001,
            EntityKind::Meal => 0b010,
            EntityKind::Ingredient => 0b100,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Category => "category",
            EntityKind::Meal => "meal",
            EntityKind::Ingredient => "ingredient",
        }
    }
}

/// Small set of entity kinds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EntityKinds(u8);

impl EntityKinds {
    pub const NONE: EntityKinds = EntityKinds(0);
    pub const ALL: EntityKinds = EntityKinds(0b111);

    pub fn of(kind: EntityKind) -> Self {
        EntityKinds(kind.bit())
    }

    pub fn with(self, kind: EntityKind) -> Self {
        EntityKinds(self.0 | kind.bit())
    }

    pub fn insert(&mut self, kind: EntityKind) {
        self.0 |= kind.bit();
    }

    pub fn contains(self, kind: EntityKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn intersects(self, other: EntityKinds) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = EntityKind> {
        EntityKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl FromIterator<EntityKind> for EntityKinds {
    fn from_iter<I: IntoIterator<Item = EntityKind>>(iter: I) -> Self {
        iter.into_iter().fold(EntityKinds::NONE, EntityKinds::with)
    }
}

impl fmt::Display for EntityKinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(EntityKind::as_str).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Published once per committed write that changed at least one row
#[derive(Debug, Clone)]
pub struct StoreChange {
    /// Strictly increasing, in commit order
    pub sequence: u64,
    pub kinds: EntityKinds,
    pub operation: String,
    pub committed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_set_operations() {
        let mut kinds = EntityKinds::of(EntityKind::Meal);
        assert!(kinds.contains(EntityKind::Meal));
        assert!(!kinds.contains(EntityKind::Category));

        kinds.insert(EntityKind::Ingredient);
        assert!(kinds.intersects(EntityKinds::of(EntityKind::Ingredient)));
        assert!(!kinds.intersects(EntityKinds::of(EntityKind::Category)));
        assert!(EntityKinds::NONE.is_empty());
    }

    #[test]
    fn test_collect_and_display() {
        let kinds: EntityKinds = vec![EntityKind::Ingredient, EntityKind::Category]
            .into_iter()
            .collect();
        assert_eq!(kinds.to_string(), "[category, ingredient]");
        assert_eq!(EntityKinds::ALL.iter().count(), 3);
    }
}
