//! Model builder: the resolvers that turn declarations and bindings into
//! model entities.
//!
//! A [`ModelBuilder`] owns everything one run needs: the [`Repository`] being
//! filled, the [`EntityRegistry`] that interns named entities by qualified
//! name, and the [`ScopeStack`] mirroring the traversal. The resolvers are
//! split by concern:
//!
//! - [`types`]: namespaces, types, the unknown fallbacks, anonymous types
//! - [`members`]: methods, attributes, parameters, local variables
//! - [`relations`]: inheritance, invocation and access edges
//!
//! # Ensure Discipline
//!
//! Every named entity is created through [`Interner::ensure`]: the entity is
//! inserted into the repository and registered under its qualified name
//! *before* anything it references is resolved. A recursive request for the
//! same name therefore finds the half-built entity and returns it, which is
//! what lets `class Color extends Enum<Color>` resolve.
//!
//! Resolution never fails. A missing binding falls back to what the syntax
//! says, and when the syntax says nothing usable the per-builder unknown
//! type is returned.
//!
//! [`Interner::ensure`]: crate::registry::Interner::ensure

pub mod members;
pub mod relations;
pub mod types;

use serde::{Deserialize, Serialize};

use crate::binding::BindingTable;
use crate::model::{modifier_set, ContainerRef, MethodId, Modifier, NamedEntity, NamespaceId, TypeId};
use crate::registry::EntityRegistry;
use crate::repository::Repository;
use crate::scope::ScopeStack;

// ============================================================================
// Options
// ============================================================================

/// How attributes without a binding are keyed in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKeying {
    /// Containing type's qualified name + `.` + field name.
    #[default]
    Keyed,
    /// Containing type's qualified name only. Every unresolved field of a
    /// type collapses into the first one seen.
    Legacy,
}

/// Builder configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderOptions {
    #[serde(default)]
    pub attribute_keying: AttributeKeying,
}

impl BuilderOptions {
    /// Set the attribute keying mode.
    pub fn with_attribute_keying(mut self, keying: AttributeKeying) -> Self {
        self.attribute_keying = keying;
        self
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builds one model from one binding table.
#[derive(Debug)]
pub struct ModelBuilder<'a> {
    bindings: &'a BindingTable,
    options: BuilderOptions,
    repository: Repository,
    registry: EntityRegistry,
    scope: ScopeStack,
    unknown_namespace: Option<NamespaceId>,
    unknown_type: Option<TypeId>,
}

impl<'a> ModelBuilder<'a> {
    /// Create a builder with default options.
    pub fn new(bindings: &'a BindingTable) -> Self {
        ModelBuilder {
            bindings,
            options: BuilderOptions::default(),
            repository: Repository::new(),
            registry: EntityRegistry::new(),
            scope: ScopeStack::new(),
            unknown_namespace: None,
            unknown_type: None,
        }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: BuilderOptions) -> Self {
        self.options = options;
        self
    }

    /// The binding table this builder resolves against.
    pub fn bindings(&self) -> &'a BindingTable {
        self.bindings
    }

    pub fn options(&self) -> BuilderOptions {
        self.options
    }

    /// The model built so far.
    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn scope(&self) -> &ScopeStack {
        &self.scope
    }

    /// Finish the run and hand over the model.
    pub fn into_repository(self) -> Repository {
        self.repository
    }

    // ========================================================================
    // Scope
    // ========================================================================

    /// Enter a declaration.
    pub fn enter(&mut self, container: impl Into<ContainerRef>) {
        self.scope.push(container);
    }

    /// Leave the innermost declaration.
    pub fn exit(&mut self) -> Option<ContainerRef> {
        self.scope.pop()
    }

    /// The method on top of the scope stack, if any.
    pub fn current_method(&self) -> Option<MethodId> {
        self.scope.current_method()
    }

    /// The type owning the innermost scope: the top type, or the parent type
    /// of the top method.
    pub fn current_owner_type(&self) -> Option<TypeId> {
        match self.scope.current()? {
            ContainerRef::Type(id) => Some(id),
            ContainerRef::Method(id) => self.repository.method(id).map(|m| m.parent_type),
            ContainerRef::Namespace(_) => None,
        }
    }

    /// Like [`current_owner_type`](Self::current_owner_type), falling back to
    /// the unknown type.
    fn owner_type_or_unknown(&mut self) -> TypeId {
        match self.current_owner_type() {
            Some(id) => id,
            None => self.unknown_type(),
        }
    }
}

/// Mark an entity as seen at its declaration.
///
/// Declared modifiers only apply when the entity has none yet, so modifiers
/// taken from a binding are kept.
fn declare(entity: &mut NamedEntity, declared: &[Modifier]) {
    entity.is_stub = false;
    if entity.modifiers.is_empty() {
        entity.modifiers = modifier_set(declared);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_keying_is_per_field() {
        assert_eq!(BuilderOptions::default().attribute_keying, AttributeKeying::Keyed);
        let legacy = BuilderOptions::default().with_attribute_keying(AttributeKeying::Legacy);
        assert_eq!(legacy.attribute_keying, AttributeKeying::Legacy);
    }

    #[test]
    fn owner_type_follows_scope() {
        let bindings = BindingTable::new();
        let mut builder = ModelBuilder::new(&bindings);
        assert_eq!(builder.current_owner_type(), None);

        let ns = builder.ensure_namespace("p");
        builder.enter(ns);
        assert_eq!(builder.current_owner_type(), None);

        let t = builder.unknown_type();
        builder.enter(t);
        assert_eq!(builder.current_owner_type(), Some(t));
        builder.exit();
        builder.exit();
        assert!(builder.scope().is_empty());
    }

    #[test]
    fn declare_keeps_binding_modifiers() {
        let mut entity = NamedEntity::stub("A");
        entity.add_modifiers([Modifier::Public]);
        declare(&mut entity, &[]);
        assert!(!entity.is_stub);
        assert_eq!(entity.modifiers.len(), 1);

        let mut bare = NamedEntity::stub("B");
        declare(&mut bare, &[Modifier::Final]);
        assert!(bare.modifiers.contains(&Modifier::Package));
        assert!(bare.modifiers.contains(&Modifier::Final));
    }
}
