//! Model entities: the FAMIX data model produced by the builder.
//!
//! This module defines the entity and relationship types stored in the
//! [`Repository`](crate::repository::Repository):
//! - [`Namespace`]: Java packages (and the synthetic unknown namespace)
//! - [`Type`]: classes, interfaces, enums, generics and their instantiations
//! - [`Method`], [`Attribute`], [`Parameter`], [`LocalVariable`]: members
//! - [`Inheritance`], [`Invocation`], [`Access`]: relationships
//!
//! Entities reference each other through typed `u32` ids that index into the
//! repository's per-kind storage. Named entities are interned by qualified
//! name; relationships are never interned.
//!
//! # Type Variants
//!
//! The FAMIX type hierarchy is flattened into [`TypeKind`]:
//!
//! | Variant | FAMIX class | Source |
//! |---------|-------------|--------|
//! | `Opaque` | `Type` | name recovered from syntax only |
//! | `Primitive` | `PrimitiveType` | primitive binding |
//! | `Class` | `Class` | class/interface binding |
//! | `Enum` | `Enum` | enum binding |
//! | `ParameterizableClass` | `ParameterizableClass` | generic declaration |
//! | `ParameterizedType` | `ParameterizedType` | generic instantiation |
//! | `ParameterType` | `ParameterType` | declared type parameter |

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Name of the synthetic namespace and type used when nothing can be recovered.
pub const UNKNOWN_NAME: &str = "__UNKNOWN__";

/// Reserved name of the synthetic method modelling an initializer block.
pub const INITIALIZER_NAME: &str = "__initializer__";

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for a namespace within a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct NamespaceId(pub u32);

impl NamespaceId {
    /// Create a new namespace ID.
    pub fn new(id: u32) -> Self {
        NamespaceId(id)
    }
}

impl std::fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ns_{}", self.0)
    }
}

/// Unique identifier for a type within a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Create a new type ID.
    pub fn new(id: u32) -> Self {
        TypeId(id)
    }
}

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "type_{}", self.0)
    }
}

/// Unique identifier for a method within a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct MethodId(pub u32);

impl MethodId {
    /// Create a new method ID.
    pub fn new(id: u32) -> Self {
        MethodId(id)
    }
}

impl std::fmt::Display for MethodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "meth_{}", self.0)
    }
}

/// Unique identifier for an attribute (field) within a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct AttributeId(pub u32);

impl AttributeId {
    /// Create a new attribute ID.
    pub fn new(id: u32) -> Self {
        AttributeId(id)
    }
}

impl std::fmt::Display for AttributeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "attr_{}", self.0)
    }
}

/// Unique identifier for a parameter within a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ParameterId(pub u32);

impl ParameterId {
    /// Create a new parameter ID.
    pub fn new(id: u32) -> Self {
        ParameterId(id)
    }
}

impl std::fmt::Display for ParameterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "param_{}", self.0)
    }
}

/// Unique identifier for a local variable within a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct LocalVariableId(pub u32);

impl LocalVariableId {
    /// Create a new local variable ID.
    pub fn new(id: u32) -> Self {
        LocalVariableId(id)
    }
}

impl std::fmt::Display for LocalVariableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "local_{}", self.0)
    }
}

/// Unique identifier for an inheritance edge within a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct InheritanceId(pub u32);

impl InheritanceId {
    /// Create a new inheritance ID.
    pub fn new(id: u32) -> Self {
        InheritanceId(id)
    }
}

impl std::fmt::Display for InheritanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "inh_{}", self.0)
    }
}

/// Unique identifier for an invocation edge within a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct InvocationId(pub u32);

impl InvocationId {
    /// Create a new invocation ID.
    pub fn new(id: u32) -> Self {
        InvocationId(id)
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "inv_{}", self.0)
    }
}

/// Unique identifier for an access edge within a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct AccessId(pub u32);

impl AccessId {
    /// Create a new access ID.
    pub fn new(id: u32) -> Self {
        AccessId(id)
    }
}

impl std::fmt::Display for AccessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "acc_{}", self.0)
    }
}

// ============================================================================
// Entity References
// ============================================================================

/// A lexical container: the owner of a type, or an open scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ContainerRef {
    Namespace(NamespaceId),
    Type(TypeId),
    Method(MethodId),
}

impl From<NamespaceId> for ContainerRef {
    fn from(id: NamespaceId) -> Self {
        ContainerRef::Namespace(id)
    }
}

impl From<TypeId> for ContainerRef {
    fn from(id: TypeId) -> Self {
        ContainerRef::Type(id)
    }
}

impl From<MethodId> for ContainerRef {
    fn from(id: MethodId) -> Self {
        ContainerRef::Method(id)
    }
}

/// The variable targeted by an [`Access`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum StructuralRef {
    Attribute(AttributeId),
    Parameter(ParameterId),
}

/// Any element stored in the repository, in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ElementRef {
    Namespace(NamespaceId),
    Type(TypeId),
    Method(MethodId),
    Attribute(AttributeId),
    Parameter(ParameterId),
    LocalVariable(LocalVariableId),
    Inheritance(InheritanceId),
    Invocation(InvocationId),
    Access(AccessId),
}

// ============================================================================
// Modifiers
// ============================================================================

/// Modifier recorded on a named entity.
///
/// `Package` is not a Java keyword: it is added when an entity declares none
/// of `public`, `protected` or `private` (see [`modifier_set`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Package,
    Final,
    Abstract,
    Native,
    Synchronized,
    Transient,
    Volatile,
    Static,
}

impl Modifier {
    /// The name used for this modifier in exported models.
    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Package => "package",
            Modifier::Final => "final",
            Modifier::Abstract => "abstract",
            Modifier::Native => "native",
            Modifier::Synchronized => "synchronized",
            Modifier::Transient => "transient",
            Modifier::Volatile => "volatile",
            Modifier::Static => "static",
        }
    }

    /// Whether this modifier controls visibility.
    pub fn is_visibility(&self) -> bool {
        matches!(
            self,
            Modifier::Public | Modifier::Protected | Modifier::Private | Modifier::Package
        )
    }
}

/// Build the modifier set of an entity from its declared modifiers.
///
/// Adds [`Modifier::Package`] when no explicit visibility is declared.
pub fn modifier_set(declared: &[Modifier]) -> BTreeSet<Modifier> {
    let mut modifiers: BTreeSet<Modifier> = declared.iter().copied().collect();
    if !modifiers.iter().any(Modifier::is_visibility) {
        modifiers.insert(Modifier::Package);
    }
    modifiers
}

// ============================================================================
// Named Entities
// ============================================================================

/// Fields shared by every named entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntity {
    /// Simple name (namespaces use their dotted package name).
    pub name: String,
    /// True until the entity is populated from its own declaration.
    pub is_stub: bool,
    /// Modifiers, ordered for deterministic export.
    pub modifiers: BTreeSet<Modifier>,
}

impl NamedEntity {
    /// Create a stub entity with no modifiers.
    pub fn stub(name: impl Into<String>) -> Self {
        NamedEntity {
            name: name.into(),
            is_stub: true,
            modifiers: BTreeSet::new(),
        }
    }

    /// Add modifiers to the entity.
    pub fn add_modifiers(&mut self, modifiers: impl IntoIterator<Item = Modifier>) {
        self.modifiers.extend(modifiers);
    }
}

/// A Java package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub namespace_id: NamespaceId,
    pub entity: NamedEntity,
}

/// Variant-specific part of a [`Type`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum TypeKind {
    /// A type known only by the name recovered from syntax.
    Opaque,
    Primitive,
    Class {
        is_interface: bool,
    },
    Enum,
    /// A generic declaration, owning its type parameters in declaration order.
    ParameterizableClass {
        is_interface: bool,
        parameters: Vec<TypeId>,
    },
    /// A generic instantiation such as `List<String>`.
    ParameterizedType {
        /// The generic type this instantiates. Set after registration.
        erasure: Option<TypeId>,
        arguments: Vec<TypeId>,
    },
    ParameterType,
}

impl TypeKind {
    /// The FAMIX class name of this variant.
    pub fn famix_name(&self) -> &'static str {
        match self {
            TypeKind::Opaque => "Type",
            TypeKind::Primitive => "PrimitiveType",
            TypeKind::Class { .. } => "Class",
            TypeKind::Enum => "Enum",
            TypeKind::ParameterizableClass { .. } => "ParameterizableClass",
            TypeKind::ParameterizedType { .. } => "ParameterizedType",
            TypeKind::ParameterType => "ParameterType",
        }
    }

    /// The interface flag, for variants that carry one.
    pub fn is_interface(&self) -> Option<bool> {
        match self {
            TypeKind::Class { is_interface } => Some(*is_interface),
            TypeKind::ParameterizableClass { is_interface, .. } => Some(*is_interface),
            _ => None,
        }
    }
}

/// A type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Type {
    pub type_id: TypeId,
    pub entity: NamedEntity,
    /// Owning namespace, enclosing type, or (for local types) method.
    pub container: ContainerRef,
    pub kind: TypeKind,
}

/// Kind of a [`Method`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    #[default]
    Normal,
    Constructor,
    Initializer,
}

impl MethodKind {
    /// The exported kind string; normal methods have none.
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            MethodKind::Normal => None,
            MethodKind::Constructor => Some("constructor"),
            MethodKind::Initializer => Some("initializer"),
        }
    }
}

/// A method, constructor, or initializer block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub method_id: MethodId,
    pub entity: NamedEntity,
    pub parent_type: TypeId,
    /// `name(ParamType, ...)`, the last segment of the qualified name.
    pub signature: String,
    pub kind: MethodKind,
    /// Declared return type; `None` for void and constructors.
    pub declared_type: Option<TypeId>,
}

/// A field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub attribute_id: AttributeId,
    pub entity: NamedEntity,
    pub parent_type: TypeId,
    pub declared_type: TypeId,
}

/// A formal parameter of a method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub parameter_id: ParameterId,
    pub entity: NamedEntity,
    pub parent: MethodId,
    pub declared_type: TypeId,
}

/// A local variable declared in a method body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalVariable {
    pub local_variable_id: LocalVariableId,
    pub entity: NamedEntity,
    /// Owning method; `None` when declared outside any method scope.
    pub parent: Option<MethodId>,
    pub declared_type: TypeId,
}

// ============================================================================
// Relationships
// ============================================================================

/// Subtype to supertype edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inheritance {
    pub inheritance_id: InheritanceId,
    pub subclass: TypeId,
    pub superclass: TypeId,
}

/// A call from a method to one or more candidate methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub invocation_id: InvocationId,
    /// Calling method; `None` for calls outside any method scope.
    pub sender: Option<MethodId>,
    pub candidates: Vec<MethodId>,
    /// Call text as written, e.g. `add(item)`.
    pub signature: String,
}

/// A read or write of a field or parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Access {
    pub access_id: AccessId,
    pub accessor: Option<MethodId>,
    /// Target variable; `None` when the binding names a local variable or an
    /// unknown parameter.
    pub variable: Option<StructuralRef>,
    pub is_write: bool,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod modifier_tests {
        use super::*;

        #[test]
        fn package_added_without_visibility() {
            let set = modifier_set(&[Modifier::Static, Modifier::Final]);
            assert!(set.contains(&Modifier::Package));
            assert_eq!(set.len(), 3);
        }

        #[test]
        fn explicit_visibility_suppresses_package() {
            let set = modifier_set(&[Modifier::Private, Modifier::Static]);
            assert!(!set.contains(&Modifier::Package));
            assert!(set.contains(&Modifier::Private));
        }

        #[test]
        fn modifiers_iterate_in_declaration_order() {
            let set = modifier_set(&[Modifier::Static, Modifier::Abstract, Modifier::Public]);
            let names: Vec<_> = set.iter().map(Modifier::as_str).collect();
            assert_eq!(names, vec!["public", "abstract", "static"]);
        }

        #[test]
        fn modifier_serializes_snake_case() {
            let json = serde_json::to_string(&Modifier::Synchronized).unwrap();
            assert_eq!(json, "\"synchronized\"");
        }
    }

    mod type_kind_tests {
        use super::*;

        #[test]
        fn famix_names() {
            assert_eq!(TypeKind::Opaque.famix_name(), "Type");
            assert_eq!(TypeKind::Primitive.famix_name(), "PrimitiveType");
            assert_eq!(
                TypeKind::ParameterizedType {
                    erasure: None,
                    arguments: vec![]
                }
                .famix_name(),
                "ParameterizedType"
            );
        }

        #[test]
        fn interface_flag_only_on_classes() {
            assert_eq!(
                TypeKind::Class { is_interface: true }.is_interface(),
                Some(true)
            );
            assert_eq!(TypeKind::Enum.is_interface(), None);
        }
    }

    #[test]
    fn id_display() {
        assert_eq!(TypeId::new(3).to_string(), "type_3");
        assert_eq!(MethodId::new(0).to_string(), "meth_0");
        assert_eq!(AccessId::new(12).to_string(), "acc_12");
    }

    #[test]
    fn method_kind_strings() {
        assert_eq!(MethodKind::Normal.as_str(), None);
        assert_eq!(MethodKind::Constructor.as_str(), Some("constructor"));
        assert_eq!(MethodKind::Initializer.as_str(), Some("initializer"));
    }
}
