//! Model repository: append-only storage for every entity and relationship.
//!
//! The [`Repository`] owns the whole object graph of a run:
//! - Per-kind storage indexed by typed ids (ids are dense and never reused)
//! - A global insertion order used by exporters
//! - Postings lists for child queries (types in a container, parameters of a
//!   method, supertypes of a type)
//!
//! Nothing is ever removed. Entities may be enriched in place through the
//! `*_mut` accessors.

use crate::error::ExportError;
use crate::model::{
    Access, AccessId, Attribute, AttributeId, ContainerRef, ElementRef, Inheritance,
    InheritanceId, Invocation, InvocationId, LocalVariable, LocalVariableId, Method, MethodId,
    Namespace, NamespaceId, Parameter, ParameterId, Type, TypeId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Number of elements of each kind in a repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub namespaces: usize,
    pub types: usize,
    pub methods: usize,
    pub attributes: usize,
    pub parameters: usize,
    pub local_variables: usize,
    pub inheritances: usize,
    pub invocations: usize,
    pub accesses: usize,
}

impl ModelSummary {
    /// Total number of elements.
    pub fn total(&self) -> usize {
        self.namespaces
            + self.types
            + self.methods
            + self.attributes
            + self.parameters
            + self.local_variables
            + self.inheritances
            + self.invocations
            + self.accesses
    }
}

/// In-memory store for the model built during one run.
#[derive(Debug, Default)]
pub struct Repository {
    // Primary storage (index = id)
    namespaces: Vec<Namespace>,
    types: Vec<Type>,
    methods: Vec<Method>,
    attributes: Vec<Attribute>,
    parameters: Vec<Parameter>,
    local_variables: Vec<LocalVariable>,
    inheritances: Vec<Inheritance>,
    invocations: Vec<Invocation>,
    accesses: Vec<Access>,

    /// Every element in the order it was inserted.
    order: Vec<ElementRef>,

    // Postings lists
    /// container → types declared in it, in insertion order.
    types_by_container: HashMap<ContainerRef, Vec<TypeId>>,
    /// type → methods owned by it.
    methods_by_type: HashMap<TypeId, Vec<MethodId>>,
    /// type → attributes owned by it.
    attributes_by_type: HashMap<TypeId, Vec<AttributeId>>,
    /// method → parameters, in declaration order.
    parameters_by_method: HashMap<MethodId, Vec<ParameterId>>,
    /// method → local variables, in declaration order.
    locals_by_method: HashMap<MethodId, Vec<LocalVariableId>>,
    /// subtype → supertypes (one entry per edge, duplicates kept).
    supertypes_of: HashMap<TypeId, Vec<TypeId>>,
    /// supertype → subtypes (one entry per edge, duplicates kept).
    subtypes_of: HashMap<TypeId, Vec<TypeId>>,
}

impl Repository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Repository::default()
    }

    // ========================================================================
    // ID Generation
    // ========================================================================

    /// The id the next inserted namespace will get.
    pub fn next_namespace_id(&self) -> NamespaceId {
        NamespaceId::new(self.namespaces.len() as u32)
    }

    /// The id the next inserted type will get.
    pub fn next_type_id(&self) -> TypeId {
        TypeId::new(self.types.len() as u32)
    }

    /// The id the next inserted method will get.
    pub fn next_method_id(&self) -> MethodId {
        MethodId::new(self.methods.len() as u32)
    }

    /// The id the next inserted attribute will get.
    pub fn next_attribute_id(&self) -> AttributeId {
        AttributeId::new(self.attributes.len() as u32)
    }

    /// The id the next inserted parameter will get.
    pub fn next_parameter_id(&self) -> ParameterId {
        ParameterId::new(self.parameters.len() as u32)
    }

    /// The id the next inserted local variable will get.
    pub fn next_local_variable_id(&self) -> LocalVariableId {
        LocalVariableId::new(self.local_variables.len() as u32)
    }

    /// The id the next inserted inheritance edge will get.
    pub fn next_inheritance_id(&self) -> InheritanceId {
        InheritanceId::new(self.inheritances.len() as u32)
    }

    /// The id the next inserted invocation will get.
    pub fn next_invocation_id(&self) -> InvocationId {
        InvocationId::new(self.invocations.len() as u32)
    }

    /// The id the next inserted access will get.
    pub fn next_access_id(&self) -> AccessId {
        AccessId::new(self.accesses.len() as u32)
    }

    // ========================================================================
    // Insert Operations
    // ========================================================================

    /// Insert a namespace.
    pub fn insert_namespace(&mut self, namespace: Namespace) -> NamespaceId {
        let id = namespace.namespace_id;
        debug_assert_eq!(id, self.next_namespace_id());
        self.order.push(ElementRef::Namespace(id));
        self.namespaces.push(namespace);
        id
    }

    /// Insert a type.
    pub fn insert_type(&mut self, ty: Type) -> TypeId {
        let id = ty.type_id;
        debug_assert_eq!(id, self.next_type_id());
        self.types_by_container
            .entry(ty.container)
            .or_default()
            .push(id);
        self.order.push(ElementRef::Type(id));
        self.types.push(ty);
        id
    }

    /// Insert a method.
    pub fn insert_method(&mut self, method: Method) -> MethodId {
        let id = method.method_id;
        debug_assert_eq!(id, self.next_method_id());
        self.methods_by_type
            .entry(method.parent_type)
            .or_default()
            .push(id);
        self.order.push(ElementRef::Method(id));
        self.methods.push(method);
        id
    }

    /// Insert an attribute.
    pub fn insert_attribute(&mut self, attribute: Attribute) -> AttributeId {
        let id = attribute.attribute_id;
        debug_assert_eq!(id, self.next_attribute_id());
        self.attributes_by_type
            .entry(attribute.parent_type)
            .or_default()
            .push(id);
        self.order.push(ElementRef::Attribute(id));
        self.attributes.push(attribute);
        id
    }

    /// Insert a parameter.
    pub fn insert_parameter(&mut self, parameter: Parameter) -> ParameterId {
        let id = parameter.parameter_id;
        debug_assert_eq!(id, self.next_parameter_id());
        self.parameters_by_method
            .entry(parameter.parent)
            .or_default()
            .push(id);
        self.order.push(ElementRef::Parameter(id));
        self.parameters.push(parameter);
        id
    }

    /// Insert a local variable.
    pub fn insert_local_variable(&mut self, local: LocalVariable) -> LocalVariableId {
        let id = local.local_variable_id;
        debug_assert_eq!(id, self.next_local_variable_id());
        if let Some(parent) = local.parent {
            self.locals_by_method.entry(parent).or_default().push(id);
        }
        self.order.push(ElementRef::LocalVariable(id));
        self.local_variables.push(local);
        id
    }

    /// Insert an inheritance edge.
    pub fn insert_inheritance(&mut self, inheritance: Inheritance) -> InheritanceId {
        let id = inheritance.inheritance_id;
        debug_assert_eq!(id, self.next_inheritance_id());
        self.supertypes_of
            .entry(inheritance.subclass)
            .or_default()
            .push(inheritance.superclass);
        self.subtypes_of
            .entry(inheritance.superclass)
            .or_default()
            .push(inheritance.subclass);
        self.order.push(ElementRef::Inheritance(id));
        self.inheritances.push(inheritance);
        id
    }

    /// Insert an invocation edge.
    pub fn insert_invocation(&mut self, invocation: Invocation) -> InvocationId {
        let id = invocation.invocation_id;
        debug_assert_eq!(id, self.next_invocation_id());
        self.order.push(ElementRef::Invocation(id));
        self.invocations.push(invocation);
        id
    }

    /// Insert an access edge.
    pub fn insert_access(&mut self, access: Access) -> AccessId {
        let id = access.access_id;
        debug_assert_eq!(id, self.next_access_id());
        self.order.push(ElementRef::Access(id));
        self.accesses.push(access);
        id
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Get a namespace by ID.
    pub fn namespace(&self, id: NamespaceId) -> Option<&Namespace> {
        self.namespaces.get(id.0 as usize)
    }

    /// Get a type by ID.
    pub fn ty(&self, id: TypeId) -> Option<&Type> {
        self.types.get(id.0 as usize)
    }

    /// Get a type by ID for enrichment.
    pub fn ty_mut(&mut self, id: TypeId) -> Option<&mut Type> {
        self.types.get_mut(id.0 as usize)
    }

    /// Get a method by ID.
    pub fn method(&self, id: MethodId) -> Option<&Method> {
        self.methods.get(id.0 as usize)
    }

    /// Get a method by ID for enrichment.
    pub fn method_mut(&mut self, id: MethodId) -> Option<&mut Method> {
        self.methods.get_mut(id.0 as usize)
    }

    /// Get an attribute by ID.
    pub fn attribute(&self, id: AttributeId) -> Option<&Attribute> {
        self.attributes.get(id.0 as usize)
    }

    /// Get an attribute by ID for enrichment.
    pub fn attribute_mut(&mut self, id: AttributeId) -> Option<&mut Attribute> {
        self.attributes.get_mut(id.0 as usize)
    }

    /// Get a parameter by ID.
    pub fn parameter(&self, id: ParameterId) -> Option<&Parameter> {
        self.parameters.get(id.0 as usize)
    }

    /// Get a local variable by ID.
    pub fn local_variable(&self, id: LocalVariableId) -> Option<&LocalVariable> {
        self.local_variables.get(id.0 as usize)
    }

    /// Get an inheritance edge by ID.
    pub fn inheritance(&self, id: InheritanceId) -> Option<&Inheritance> {
        self.inheritances.get(id.0 as usize)
    }

    /// Get an invocation by ID.
    pub fn invocation(&self, id: InvocationId) -> Option<&Invocation> {
        self.invocations.get(id.0 as usize)
    }

    /// Get an access by ID.
    pub fn access(&self, id: AccessId) -> Option<&Access> {
        self.accesses.get(id.0 as usize)
    }

    /// Get an access by ID, e.g. to mark it as a write.
    pub fn access_mut(&mut self, id: AccessId) -> Option<&mut Access> {
        self.accesses.get_mut(id.0 as usize)
    }

    // ========================================================================
    // Postings Queries
    // ========================================================================

    /// Types whose container is `container`, in insertion order.
    pub fn types_in(&self, container: ContainerRef) -> &[TypeId] {
        self.types_by_container
            .get(&container)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Methods owned by a type.
    pub fn methods_of(&self, type_id: TypeId) -> &[MethodId] {
        self.methods_by_type
            .get(&type_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Attributes owned by a type.
    pub fn attributes_of(&self, type_id: TypeId) -> &[AttributeId] {
        self.attributes_by_type
            .get(&type_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Parameters of a method, in declaration order.
    pub fn parameters_of(&self, method_id: MethodId) -> Vec<&Parameter> {
        self.parameters_by_method
            .get(&method_id)
            .map(|ids| ids.iter().filter_map(|id| self.parameter(*id)).collect())
            .unwrap_or_default()
    }

    /// Local variables of a method, in declaration order.
    pub fn locals_of(&self, method_id: MethodId) -> Vec<&LocalVariable> {
        self.locals_by_method
            .get(&method_id)
            .map(|ids| ids.iter().filter_map(|id| self.local_variable(*id)).collect())
            .unwrap_or_default()
    }

    /// Supertypes of a type, one entry per inheritance edge.
    pub fn supertypes_of(&self, type_id: TypeId) -> &[TypeId] {
        self.supertypes_of
            .get(&type_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Subtypes of a type, one entry per inheritance edge.
    pub fn subtypes_of(&self, type_id: TypeId) -> &[TypeId] {
        self.subtypes_of
            .get(&type_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // ========================================================================
    // Qualified Names
    // ========================================================================

    /// Dot-joined path of a container from the root namespace.
    pub fn container_qualified_name(&self, container: ContainerRef) -> String {
        match container {
            ContainerRef::Namespace(id) => self.namespace_qualified_name(id),
            ContainerRef::Type(id) => self.type_qualified_name(id),
            ContainerRef::Method(id) => self.method_qualified_name(id),
        }
    }

    /// Qualified name a child called `name` of `container` would have.
    pub fn child_qualified_name(&self, container: ContainerRef, name: &str) -> String {
        join_name(&self.container_qualified_name(container), name)
    }

    /// Qualified name of a namespace (its package name).
    pub fn namespace_qualified_name(&self, id: NamespaceId) -> String {
        self.namespace(id)
            .map(|ns| ns.entity.name.clone())
            .unwrap_or_default()
    }

    /// Qualified name of a type: container path + `.` + name.
    pub fn type_qualified_name(&self, id: TypeId) -> String {
        match self.ty(id) {
            Some(ty) => join_name(
                &self.container_qualified_name(ty.container),
                &ty.entity.name,
            ),
            None => String::new(),
        }
    }

    /// Qualified name of a method: owner path + `.` + signature.
    pub fn method_qualified_name(&self, id: MethodId) -> String {
        match self.method(id) {
            Some(method) => join_name(
                &self.type_qualified_name(method.parent_type),
                &method.signature,
            ),
            None => String::new(),
        }
    }

    /// Qualified name of an attribute: owner path + `.` + name.
    pub fn attribute_qualified_name(&self, id: AttributeId) -> String {
        match self.attribute(id) {
            Some(attr) => join_name(
                &self.type_qualified_name(attr.parent_type),
                &attr.entity.name,
            ),
            None => String::new(),
        }
    }

    /// Qualified name of a parameter: method path + `.` + name.
    pub fn parameter_qualified_name(&self, id: ParameterId) -> String {
        match self.parameter(id) {
            Some(param) => join_name(
                &self.method_qualified_name(param.parent),
                &param.entity.name,
            ),
            None => String::new(),
        }
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// Every element in insertion order.
    pub fn elements(&self) -> &[ElementRef] {
        &self.order
    }

    /// All namespaces.
    pub fn namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.namespaces.iter()
    }

    /// All types.
    pub fn types(&self) -> impl Iterator<Item = &Type> {
        self.types.iter()
    }

    /// All methods.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.iter()
    }

    /// All attributes.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }

    /// All parameters.
    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }

    /// All local variables.
    pub fn local_variables(&self) -> impl Iterator<Item = &LocalVariable> {
        self.local_variables.iter()
    }

    /// All inheritance edges.
    pub fn inheritances(&self) -> impl Iterator<Item = &Inheritance> {
        self.inheritances.iter()
    }

    /// All invocations.
    pub fn invocations(&self) -> impl Iterator<Item = &Invocation> {
        self.invocations.iter()
    }

    /// All accesses.
    pub fn accesses(&self) -> impl Iterator<Item = &Access> {
        self.accesses.iter()
    }

    // ========================================================================
    // Counts and Export
    // ========================================================================

    /// Number of elements of each kind.
    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            namespaces: self.namespaces.len(),
            types: self.types.len(),
            methods: self.methods.len(),
            attributes: self.attributes.len(),
            parameters: self.parameters.len(),
            local_variables: self.local_variables.len(),
            inheritances: self.inheritances.len(),
            invocations: self.invocations.len(),
            accesses: self.accesses.len(),
        }
    }

    /// Total number of stored elements.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Write the whole model to `path` in MSE format.
    pub fn export_mse(&self, path: &Path) -> Result<(), ExportError> {
        crate::mse::export_mse(self, path)
    }
}

fn join_name(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MethodKind, NamedEntity, TypeKind};

    fn add_namespace(repo: &mut Repository, name: &str) -> NamespaceId {
        let namespace_id = repo.next_namespace_id();
        repo.insert_namespace(Namespace {
            namespace_id,
            entity: NamedEntity::stub(name),
        })
    }

    fn add_class(repo: &mut Repository, name: &str, container: ContainerRef) -> TypeId {
        let type_id = repo.next_type_id();
        repo.insert_type(Type {
            type_id,
            entity: NamedEntity::stub(name),
            container,
            kind: TypeKind::Class {
                is_interface: false,
            },
        })
    }

    fn add_method(repo: &mut Repository, parent_type: TypeId, signature: &str) -> MethodId {
        let method_id = repo.next_method_id();
        repo.insert_method(Method {
            method_id,
            entity: NamedEntity::stub(signature.split('(').next().unwrap_or(signature)),
            parent_type,
            signature: signature.to_string(),
            kind: MethodKind::Normal,
            declared_type: None,
        })
    }

    mod storage_tests {
        use super::*;

        #[test]
        fn ids_are_dense_per_kind() {
            let mut repo = Repository::new();
            let ns = add_namespace(&mut repo, "p");
            let a = add_class(&mut repo, "A", ns.into());
            let b = add_class(&mut repo, "B", ns.into());
            assert_eq!(ns, NamespaceId::new(0));
            assert_eq!(a, TypeId::new(0));
            assert_eq!(b, TypeId::new(1));
            assert_eq!(repo.ty(b).unwrap().entity.name, "B");
        }

        #[test]
        fn insertion_order_spans_kinds() {
            let mut repo = Repository::new();
            let ns = add_namespace(&mut repo, "p");
            let a = add_class(&mut repo, "A", ns.into());
            let m = add_method(&mut repo, a, "run()");
            assert_eq!(
                repo.elements(),
                &[
                    ElementRef::Namespace(ns),
                    ElementRef::Type(a),
                    ElementRef::Method(m)
                ]
            );
            assert_eq!(repo.len(), 3);
        }

        #[test]
        fn summary_counts_each_kind() {
            let mut repo = Repository::new();
            let ns = add_namespace(&mut repo, "p");
            let a = add_class(&mut repo, "A", ns.into());
            let b = add_class(&mut repo, "B", ns.into());
            let inheritance_id = repo.next_inheritance_id();
            repo.insert_inheritance(Inheritance {
                inheritance_id,
                subclass: b,
                superclass: a,
            });
            let summary = repo.summary();
            assert_eq!(summary.namespaces, 1);
            assert_eq!(summary.types, 2);
            assert_eq!(summary.inheritances, 1);
            assert_eq!(summary.total(), 4);
        }
    }

    mod postings_tests {
        use super::*;

        #[test]
        fn types_in_container() {
            let mut repo = Repository::new();
            let ns = add_namespace(&mut repo, "p");
            let outer = add_class(&mut repo, "Outer", ns.into());
            let inner = add_class(&mut repo, "Inner", outer.into());
            assert_eq!(repo.types_in(ns.into()), &[outer]);
            assert_eq!(repo.types_in(outer.into()), &[inner]);
            assert!(repo.types_in(inner.into()).is_empty());
        }

        #[test]
        fn inheritance_indexes_keep_duplicates() {
            let mut repo = Repository::new();
            let ns = add_namespace(&mut repo, "p");
            let base = add_class(&mut repo, "Base", ns.into());
            let derived = add_class(&mut repo, "Derived", ns.into());
            for _ in 0..2 {
                let inheritance_id = repo.next_inheritance_id();
                repo.insert_inheritance(Inheritance {
                    inheritance_id,
                    subclass: derived,
                    superclass: base,
                });
            }
            assert_eq!(repo.supertypes_of(derived), &[base, base]);
            assert_eq!(repo.subtypes_of(base).len(), 2);
        }
    }

    mod qualified_name_tests {
        use super::*;

        #[test]
        fn nested_types_join_with_dots() {
            let mut repo = Repository::new();
            let ns = add_namespace(&mut repo, "com.example");
            let outer = add_class(&mut repo, "Outer", ns.into());
            let inner = add_class(&mut repo, "Inner", outer.into());
            let m = add_method(&mut repo, inner, "go(int)");
            assert_eq!(repo.type_qualified_name(inner), "com.example.Outer.Inner");
            assert_eq!(repo.method_qualified_name(m), "com.example.Outer.Inner.go(int)");
        }

        #[test]
        fn missing_ids_give_empty_names() {
            let repo = Repository::new();
            assert_eq!(repo.type_qualified_name(TypeId::new(9)), "");
            assert_eq!(repo.method_qualified_name(MethodId::new(0)), "");
        }
    }
}
