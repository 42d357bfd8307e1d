//! Entity registry: qualified-name interning tables.
//!
//! Each named entity kind has its own [`Interner`] mapping a qualified name to
//! the id of the single entity carrying it. [`Interner::ensure`] registers the
//! id returned by its allocator *before* the caller populates the entity, so a
//! recursive resolution of the same name finds the slot and stops.

use crate::model::{AttributeId, MethodId, NamespaceId, ParameterId, TypeId};
use std::collections::HashMap;

/// Outcome of [`Interner::ensure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ensured<I> {
    /// The name was already registered.
    Existing(I),
    /// The allocator ran and its id was registered; the caller must populate it.
    Created(I),
}

impl<I: Copy> Ensured<I> {
    /// The interned id, whether new or not.
    pub fn id(self) -> I {
        match self {
            Ensured::Existing(id) | Ensured::Created(id) => id,
        }
    }

    /// True if this call created the entry.
    pub fn is_created(self) -> bool {
        matches!(self, Ensured::Created(_))
    }
}

/// Qualified name → id table for one entity kind.
#[derive(Debug, Clone)]
pub struct Interner<I> {
    by_name: HashMap<String, I>,
}

impl<I> Default for Interner<I> {
    fn default() -> Self {
        Interner {
            by_name: HashMap::new(),
        }
    }
}

impl<I: Copy> Interner<I> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id registered under `qualified_name`, or allocate one.
    ///
    /// `allocate` runs at most once and only when the name is absent. Its id is
    /// inserted before this returns, so anything the caller resolves while
    /// populating a [`Ensured::Created`] entry sees it.
    pub fn ensure(&mut self, qualified_name: &str, allocate: impl FnOnce() -> I) -> Ensured<I> {
        if let Some(&id) = self.by_name.get(qualified_name) {
            return Ensured::Existing(id);
        }
        let id = allocate();
        self.by_name.insert(qualified_name.to_string(), id);
        Ensured::Created(id)
    }

    /// Look up a qualified name without creating anything.
    pub fn get(&self, qualified_name: &str) -> Option<I> {
        self.by_name.get(qualified_name).copied()
    }

    /// Check whether a qualified name is registered.
    pub fn contains(&self, qualified_name: &str) -> bool {
        self.by_name.contains_key(qualified_name)
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// One interning table per named entity kind.
///
/// Local variables are deliberately absent: they are created per declaration
/// fragment and never looked up by name.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    pub namespaces: Interner<NamespaceId>,
    pub types: Interner<TypeId>,
    pub methods: Interner<MethodId>,
    pub attributes: Interner<AttributeId>,
    pub parameters: Interner<ParameterId>,
}

impl EntityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_creates_once() {
        let mut table: Interner<TypeId> = Interner::new();
        let mut next = 0u32;

        let first = table.ensure("java.lang.String", || {
            next += 1;
            TypeId::new(next)
        });
        let second = table.ensure("java.lang.String", || {
            next += 1;
            TypeId::new(next)
        });

        assert!(first.is_created());
        assert!(!second.is_created());
        assert_eq!(first.id(), second.id());
        assert_eq!(next, 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn distinct_names_get_distinct_ids() {
        let mut table: Interner<MethodId> = Interner::new();
        let a = table.ensure("A.m()", || MethodId::new(0)).id();
        let b = table.ensure("A.m(int)", || MethodId::new(1)).id();
        assert_ne!(a, b);
        assert_eq!(table.get("A.m(int)"), Some(b));
        assert_eq!(table.get("A.n()"), None);
    }

    #[test]
    fn registered_before_caller_populates() {
        let mut table: Interner<TypeId> = Interner::new();
        let ensured = table.ensure("p.Node", || TypeId::new(7));
        // A recursive lookup made while populating the new entry hits the slot.
        assert!(ensured.is_created());
        assert!(table.contains("p.Node"));
        assert_eq!(
            table.ensure("p.Node", || unreachable!()),
            Ensured::Existing(TypeId::new(7))
        );
    }

    #[test]
    fn registry_tables_are_independent() {
        let mut registry = EntityRegistry::new();
        registry.types.ensure("p.A", || TypeId::new(0));
        assert!(registry.methods.is_empty());
        assert!(registry.attributes.get("p.A").is_none());
    }
}
