//! Type resolution: namespaces, types, and the unknown fallbacks.

use tracing::{debug, warn};

use super::{declare, ModelBuilder};
use crate::binding::{Resolution, TypeBinding, TypeBindingId};
use crate::model::{
    modifier_set, ContainerRef, NamedEntity, Namespace, NamespaceId, Type, TypeId, TypeKind,
    UNKNOWN_NAME,
};
use crate::registry::Ensured;
use crate::syntax::{AnonymousClassDeclaration, TypeDeclaration, TypeDeclarationKind, TypeRef, TypeSyntax};

/// Pick the model variant for a binding.
///
/// Flags are checked in order: primitive, parameterized, generic, enum. A
/// binding with none of them is a class or interface.
pub fn kind_for_binding(binding: &TypeBinding) -> TypeKind {
    if binding.is_primitive {
        TypeKind::Primitive
    } else if binding.is_parameterized {
        TypeKind::ParameterizedType {
            erasure: None,
            arguments: Vec::new(),
        }
    } else if binding.is_generic {
        TypeKind::ParameterizableClass {
            is_interface: binding.is_interface,
            parameters: Vec::new(),
        }
    } else if binding.is_enum {
        TypeKind::Enum
    } else {
        TypeKind::Class {
            is_interface: binding.is_interface,
        }
    }
}

/// The `.Member` tail of a member type's name, when `outer` really encloses it.
fn member_suffix<'b>(outer: &TypeBinding, member: &'b TypeBinding) -> Option<&'b str> {
    member
        .qualified_name
        .strip_prefix(outer.qualified_name.as_str())
        .filter(|suffix| suffix.starts_with('.'))
}

impl<'a> ModelBuilder<'a> {
    // ========================================================================
    // Namespaces
    // ========================================================================

    /// Return the namespace for a package name, creating a stub if needed.
    pub fn ensure_namespace(&mut self, name: &str) -> NamespaceId {
        let repository = &mut self.repository;
        let ensured = self.registry.namespaces.ensure(name, || {
            let namespace_id = repository.next_namespace_id();
            repository.insert_namespace(Namespace {
                namespace_id,
                entity: NamedEntity::stub(name),
            })
        });
        if ensured.is_created() {
            debug!(namespace = name, "created namespace");
        }
        ensured.id()
    }

    /// The namespace holding everything whose package is unknown.
    pub fn unknown_namespace(&mut self) -> NamespaceId {
        if let Some(id) = self.unknown_namespace {
            return id;
        }
        let id = self.ensure_namespace(UNKNOWN_NAME);
        self.unknown_namespace = Some(id);
        id
    }

    // ========================================================================
    // Types
    // ========================================================================

    /// The placeholder type used when nothing about a type can be recovered.
    pub fn unknown_type(&mut self) -> TypeId {
        if let Some(id) = self.unknown_type {
            return id;
        }
        let id = self.type_named_in_unknown_namespace(UNKNOWN_NAME);
        self.unknown_type = Some(id);
        id
    }

    /// Resolve a type binding by index.
    ///
    /// A dangling index resolves to the unknown type.
    pub fn ensure_type_from_binding(&mut self, id: TypeBindingId) -> TypeId {
        let bindings = self.bindings;
        match bindings.type_binding(id) {
            Some(binding) => self.ensure_type_from_resolved(binding),
            None => self.unknown_type(),
        }
    }

    /// Resolve a type reference, preferring its binding over its syntax.
    pub fn ensure_type(&mut self, type_ref: &TypeRef) -> TypeId {
        let bindings = self.bindings;
        match bindings.resolve_type(type_ref.binding, &type_ref.syntax) {
            Resolution::Resolved((_, binding)) => self.ensure_type_from_resolved(binding),
            Resolution::Unresolved(syntax) => self.ensure_type_from_syntax(syntax),
        }
    }

    /// Resolve a type from source text alone.
    ///
    /// A recoverable name gives a stub under the unknown namespace; anything
    /// else gives the unknown type.
    pub fn ensure_type_from_syntax(&mut self, syntax: &TypeSyntax) -> TypeId {
        match syntax.recovered_name() {
            Some(name) => self.type_named_in_unknown_namespace(&name),
            None => {
                debug!(syntax = %syntax, "no recoverable type name");
                self.unknown_type()
            }
        }
    }

    /// Resolve the type introduced by a class, interface or enum declaration
    /// and mark it as declared.
    pub fn ensure_type_from_declaration(&mut self, declaration: &TypeDeclaration) -> TypeId {
        let bindings = self.bindings;
        let type_id = match bindings.resolve_type(declaration.binding, declaration) {
            Resolution::Resolved((_, binding)) => self.ensure_type_from_resolved(binding),
            Resolution::Unresolved(declaration) => self.ensure_type_from_unresolved_declaration(declaration),
        };
        if let Some(ty) = self.repository.ty_mut(type_id) {
            declare(&mut ty.entity, &declaration.modifiers);
        }
        type_id
    }

    /// Create the type of an anonymous class body.
    ///
    /// The type is named `$n` after the number of types its container already
    /// holds. Inside a method the container is the method's parent type. Its
    /// single supertype is the instantiated type.
    pub fn ensure_type_from_anonymous(
        &mut self,
        anonymous: &AnonymousClassDeclaration,
        instantiated: &TypeRef,
    ) -> TypeId {
        let container: ContainerRef = match self.scope.current() {
            Some(ContainerRef::Method(method_id)) => match self.repository.method(method_id) {
                Some(method) => method.parent_type.into(),
                None => method_id.into(),
            },
            Some(container) => container,
            None => self.unknown_namespace().into(),
        };
        let name = format!("${}", self.repository.types_in(container).len());
        let qualified_name = self.repository.child_qualified_name(container, &name);

        let bindings = self.bindings;
        let kind = match bindings.resolve_type(anonymous.binding, ()) {
            Resolution::Resolved((_, binding)) => kind_for_binding(binding),
            Resolution::Unresolved(()) => TypeKind::Class {
                is_interface: false,
            },
        };

        let ensured = self.intern_type(&qualified_name, &name, container, kind);
        let type_id = ensured.id();
        if ensured.is_created() {
            if let Some(ty) = self.repository.ty_mut(type_id) {
                ty.entity.is_stub = false;
            }
            self.create_inheritance_to_type_ref(type_id, instantiated);
        }
        type_id
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn ensure_type_from_resolved(&mut self, binding: &'a TypeBinding) -> TypeId {
        let key = self.type_key(binding);
        let qualified_name = key.as_str();
        if let Some(id) = self.registry.types.get(qualified_name) {
            return id;
        }

        let container = self.container_for_binding(binding);
        let kind = kind_for_binding(binding);
        let populate_parameterized = matches!(kind, TypeKind::ParameterizedType { .. });
        let populate_generic = matches!(kind, TypeKind::ParameterizableClass { .. });

        // Resolving the container may have reached this type already.
        let type_id = match self.intern_type(qualified_name, &binding.name, container, kind) {
            Ensured::Existing(id) => return id,
            Ensured::Created(id) => id,
        };
        if let Some(ty) = self.repository.ty_mut(type_id) {
            ty.entity.modifiers = modifier_set(&binding.modifiers);
        }

        // Registered; references back to this type now terminate.
        if let Some(superclass) = binding.superclass {
            self.create_inheritance_to_binding(type_id, superclass);
        }
        for interface in &binding.interfaces {
            self.create_inheritance_to_binding(type_id, *interface);
        }

        if populate_parameterized {
            let erasure = binding.erasure.map(|e| self.ensure_type_from_binding(e));
            let arguments: Vec<TypeId> = binding
                .type_arguments
                .iter()
                .map(|arg| self.ensure_type_from_binding(*arg))
                .collect();
            if let Some(ty) = self.repository.ty_mut(type_id) {
                ty.kind = TypeKind::ParameterizedType { erasure, arguments };
            }
        } else if populate_generic {
            let parameters: Vec<TypeId> = binding
                .type_parameters
                .iter()
                .map(|name| self.ensure_parameter_type(type_id, qualified_name, name))
                .collect();
            if let Some(ty) = self.repository.ty_mut(type_id) {
                if let TypeKind::ParameterizableClass {
                    parameters: slot, ..
                } = &mut ty.kind
                {
                    *slot = parameters;
                }
            }
        }
        type_id
    }

    /// Where a bound type lives: its declaring type, its package, or the
    /// unknown namespace.
    fn container_for_binding(&mut self, binding: &'a TypeBinding) -> ContainerRef {
        let bindings = self.bindings;
        if let Some(outer) = binding.declaring_class.and_then(|id| bindings.type_binding(id)) {
            if member_suffix(outer, binding).is_some() {
                return self.ensure_type_from_resolved(outer).into();
            }
            warn!(
                member = %binding.qualified_name,
                declaring = %outer.qualified_name,
                "declaring class does not enclose member type"
            );
        }
        match &binding.package {
            Some(package) => self.ensure_namespace(package).into(),
            None => self.unknown_namespace().into(),
        }
    }

    /// The registry key of a bound type: the qualified name the repository
    /// derives from the container `container_for_binding` picks. Bound and
    /// syntactic references to one name therefore meet.
    fn type_key(&self, binding: &TypeBinding) -> String {
        let bindings = self.bindings;
        if let Some(outer) = binding.declaring_class.and_then(|id| bindings.type_binding(id)) {
            if let Some(suffix) = member_suffix(outer, binding) {
                return format!("{}{}", self.type_key(outer), suffix);
            }
        }
        if binding.package.is_some() {
            binding.qualified_name.clone()
        } else {
            format!("{}.{}", UNKNOWN_NAME, binding.qualified_name)
        }
    }

    fn ensure_parameter_type(&mut self, owner: TypeId, owner_name: &str, name: &str) -> TypeId {
        let qualified_name = format!("{}.{}", owner_name, name);
        self.intern_type(&qualified_name, name, owner.into(), TypeKind::ParameterType)
            .id()
    }

    fn ensure_type_from_unresolved_declaration(&mut self, declaration: &TypeDeclaration) -> TypeId {
        let container = match self.scope.current() {
            Some(container) => container,
            None => self.unknown_namespace().into(),
        };
        let qualified_name = self
            .repository
            .child_qualified_name(container, &declaration.name);
        let kind = match declaration.kind {
            TypeDeclarationKind::Class => TypeKind::Class {
                is_interface: false,
            },
            TypeDeclarationKind::Interface => TypeKind::Class { is_interface: true },
            TypeDeclarationKind::Enum => TypeKind::Enum,
        };
        let ensured = self.intern_type(&qualified_name, &declaration.name, container, kind);
        if let Ensured::Created(type_id) = ensured {
            if let Some(superclass) = &declaration.superclass {
                self.create_inheritance_to_type_ref(type_id, superclass);
            }
            for interface in &declaration.interfaces {
                self.create_inheritance_to_type_ref(type_id, interface);
            }
        }
        ensured.id()
    }

    fn type_named_in_unknown_namespace(&mut self, name: &str) -> TypeId {
        let namespace = self.unknown_namespace();
        let qualified_name = format!("{}.{}", UNKNOWN_NAME, name);
        self.intern_type(&qualified_name, name, namespace.into(), TypeKind::Opaque)
            .id()
    }

    /// Insert and register a stub type, unless `qualified_name` is taken.
    fn intern_type(
        &mut self,
        qualified_name: &str,
        name: &str,
        container: ContainerRef,
        kind: TypeKind,
    ) -> Ensured<TypeId> {
        let repository = &mut self.repository;
        let ensured = self.registry.types.ensure(qualified_name, || {
            let type_id = repository.next_type_id();
            repository.insert_type(Type {
                type_id,
                entity: NamedEntity::stub(name),
                container,
                kind,
            })
        });
        if ensured.is_created() {
            debug!(qualified_name, "created type");
        }
        ensured
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::BindingTable;
    use crate::model::Modifier;

    fn list_of_string(table: &mut BindingTable) -> TypeBindingId {
        let list = table.add_type(
            TypeBinding::class("java.util", "List")
                .interface()
                .with_type_parameters(&["E"]),
        );
        let string = table.add_type(TypeBinding::class("java.lang", "String"));
        let mut instantiation =
            TypeBinding::class("java.util", "List<String>").parameterized(list, vec![string]);
        instantiation.qualified_name = "java.util.List<java.lang.String>".to_string();
        table.add_type(instantiation.interface())
    }

    mod binding_tests {
        use super::*;

        #[test]
        fn parameterized_list_of_string() {
            let mut table = BindingTable::new();
            let id = list_of_string(&mut table);
            let mut builder = ModelBuilder::new(&table);

            let ty_id = builder.ensure_type_from_binding(id);
            let repo = builder.repository();
            let ty = repo.ty(ty_id).unwrap();
            let TypeKind::ParameterizedType { erasure, arguments } = &ty.kind else {
                panic!("expected parameterized type, got {:?}", ty.kind);
            };

            let erasure = repo.ty(erasure.unwrap()).unwrap();
            assert_eq!(erasure.entity.name, "List");
            assert_eq!(erasure.kind.famix_name(), "ParameterizableClass");
            assert_eq!(repo.container_qualified_name(erasure.container), "java.util");

            assert_eq!(arguments.len(), 1);
            let argument = repo.ty(arguments[0]).unwrap();
            assert_eq!(argument.entity.name, "String");
            assert_eq!(repo.container_qualified_name(argument.container), "java.lang");
        }

        #[test]
        fn same_binding_resolves_to_same_type() {
            let mut table = BindingTable::new();
            let id = list_of_string(&mut table);
            let mut builder = ModelBuilder::new(&table);
            let first = builder.ensure_type_from_binding(id);
            let count = builder.repository().summary().types;
            let second = builder.ensure_type_from_binding(id);
            assert_eq!(first, second);
            assert_eq!(builder.repository().summary().types, count);
        }

        #[test]
        fn generic_declaration_owns_parameter_types() {
            let mut table = BindingTable::new();
            let map = table.add_type(TypeBinding::class("java.util", "Map").with_type_parameters(&["K", "V"]));
            let mut builder = ModelBuilder::new(&table);
            let map_id = builder.ensure_type_from_binding(map);

            let repo = builder.repository();
            let TypeKind::ParameterizableClass { parameters, .. } = &repo.ty(map_id).unwrap().kind else {
                panic!("expected parameterizable class");
            };
            let names: Vec<_> = parameters
                .iter()
                .map(|p| repo.ty(*p).unwrap().entity.name.as_str())
                .collect();
            assert_eq!(names, vec!["K", "V"]);
            assert_eq!(repo.types_in(map_id.into()), parameters.as_slice());
            assert_eq!(repo.type_qualified_name(parameters[1]), "java.util.Map.V");
        }

        #[test]
        fn self_referential_generic_terminates() {
            // enum Color extends Enum<Color>
            let mut table = BindingTable::new();
            let enum_generic = table.add_type(TypeBinding::class("java.lang", "Enum").with_type_parameters(&["E"]));
            let color = table.add_type(TypeBinding::class("p", "Color").enumeration());
            let mut enum_of_color = TypeBinding::class("java.lang", "Enum<Color>").parameterized(enum_generic, vec![color]);
            enum_of_color.qualified_name = "java.lang.Enum<p.Color>".to_string();
            let enum_of_color = table.add_type(enum_of_color);
            table.types[color.0 as usize].superclass = Some(enum_of_color);

            let mut builder = ModelBuilder::new(&table);
            let color_id = builder.ensure_type_from_binding(color);

            let repo = builder.repository();
            let supertypes = repo.supertypes_of(color_id);
            assert_eq!(supertypes.len(), 1);
            let TypeKind::ParameterizedType { arguments, .. } = &repo.ty(supertypes[0]).unwrap().kind else {
                panic!("expected parameterized supertype");
            };
            assert_eq!(arguments, &vec![color_id]);
        }

        #[test]
        fn modifiers_come_from_binding() {
            let mut table = BindingTable::new();
            let id = table.add_type(TypeBinding::class("p", "A").with_modifiers(&[Modifier::Abstract]));
            let mut builder = ModelBuilder::new(&table);
            let ty = builder.ensure_type_from_binding(id);
            let entity = &builder.repository().ty(ty).unwrap().entity;
            assert!(entity.is_stub);
            assert!(entity.modifiers.contains(&Modifier::Abstract));
            assert!(entity.modifiers.contains(&Modifier::Package));
        }

        #[test]
        fn primitives_live_in_unknown_namespace() {
            let mut table = BindingTable::new();
            let int = table.add_type(TypeBinding::primitive("int"));
            let mut builder = ModelBuilder::new(&table);
            let ty = builder.ensure_type_from_binding(int);
            let repo = builder.repository();
            assert_eq!(repo.ty(ty).unwrap().kind, TypeKind::Primitive);
            assert_eq!(repo.type_qualified_name(ty), "__UNKNOWN__.int");
        }

        #[test]
        fn packageless_binding_meets_syntactic_reference() {
            let mut table = BindingTable::new();
            let type_variable = table.add_type(TypeBinding {
                qualified_name: "T".to_string(),
                package: None,
                ..TypeBinding::class("", "T")
            });
            let mut builder = ModelBuilder::new(&table);

            let bound = builder.ensure_type(&TypeRef::resolved(TypeSyntax::simple("T"), type_variable));
            let syntactic = builder.ensure_type(&TypeRef::unresolved(TypeSyntax::simple("T")));
            assert_eq!(bound, syntactic);
            assert_eq!(builder.repository().type_qualified_name(bound), "__UNKNOWN__.T");
            assert!(builder.registry().types.get("__UNKNOWN__.T").is_some());
            assert!(builder.registry().types.get("T").is_none());
        }

        #[test]
        fn syntactic_reference_first_is_reused_by_binding() {
            let mut table = BindingTable::new();
            let int = table.add_type(TypeBinding::primitive("int"));
            let mut builder = ModelBuilder::new(&table);
            let syntactic = builder.ensure_type_from_syntax(&TypeSyntax::simple("int"));
            let bound = builder.ensure_type_from_binding(int);
            assert_eq!(syntactic, bound);
        }

        #[test]
        fn member_of_packageless_type_is_keyed_by_derived_name() {
            let mut table = BindingTable::new();
            let outer = table.add_type(TypeBinding {
                qualified_name: "Outer".to_string(),
                package: None,
                ..TypeBinding::class("", "Outer")
            });
            let mut inner = TypeBinding::class("", "Inner").nested_in(outer);
            inner.qualified_name = "Outer.Inner".to_string();
            inner.package = None;
            let inner = table.add_type(inner);

            let mut builder = ModelBuilder::new(&table);
            let inner_id = builder.ensure_type_from_binding(inner);
            let qualified_name = builder.repository().type_qualified_name(inner_id);
            assert_eq!(qualified_name, "__UNKNOWN__.Outer.Inner");
            assert_eq!(builder.registry().types.get(&qualified_name), Some(inner_id));
        }

        #[test]
        fn member_type_is_contained_by_declaring_type() {
            let mut table = BindingTable::new();
            let outer = table.add_type(TypeBinding::class("p", "Outer"));
            let mut inner = TypeBinding::class("p", "Inner").nested_in(outer);
            inner.qualified_name = "p.Outer.Inner".to_string();
            let inner = table.add_type(inner);

            let mut builder = ModelBuilder::new(&table);
            let inner_id = builder.ensure_type_from_binding(inner);
            let repo = builder.repository();
            assert_eq!(repo.type_qualified_name(inner_id), "p.Outer.Inner");
            assert!(matches!(repo.ty(inner_id).unwrap().container, ContainerRef::Type(_)));
        }

        #[test]
        fn dangling_binding_gives_unknown_type() {
            let table = BindingTable::new();
            let mut builder = ModelBuilder::new(&table);
            let ty = builder.ensure_type_from_binding(TypeBindingId(42));
            assert_eq!(ty, builder.unknown_type());
        }
    }

    mod syntax_tests {
        use super::*;

        #[test]
        fn unresolved_simple_type_is_filed_under_unknown() {
            let table = BindingTable::new();
            let mut builder = ModelBuilder::new(&table);
            let a = builder.ensure_type(&TypeRef::unresolved(TypeSyntax::simple("Widget")));
            let b = builder.ensure_type(&TypeRef::unresolved(TypeSyntax::simple("Widget")));
            assert_eq!(a, b);

            let repo = builder.repository();
            let ty = repo.ty(a).unwrap();
            assert!(ty.entity.is_stub);
            assert_eq!(ty.kind, TypeKind::Opaque);
            assert_eq!(repo.type_qualified_name(a), "__UNKNOWN__.Widget");
        }

        #[test]
        fn unresolved_parameterized_type_uses_base_name() {
            let table = BindingTable::new();
            let mut builder = ModelBuilder::new(&table);
            let syntax = TypeSyntax::parameterized(
                TypeSyntax::simple("Box"),
                vec![TypeSyntax::simple("Item")],
            );
            let ty = builder.ensure_type_from_syntax(&syntax);
            assert_eq!(builder.repository().ty(ty).unwrap().entity.name, "Box");
        }

        #[test]
        fn unrecoverable_syntax_gives_unknown_singleton() {
            let table = BindingTable::new();
            let mut builder = ModelBuilder::new(&table);
            let array = TypeSyntax::Array {
                element: Box::new(TypeSyntax::simple("X")),
                dimensions: 1,
            };
            let a = builder.ensure_type_from_syntax(&array);
            let b = builder.ensure_type_from_syntax(&TypeSyntax::primitive("int"));
            assert_eq!(a, b);
            assert_eq!(a, builder.unknown_type());
            assert_eq!(builder.repository().summary().namespaces, 1);
        }
    }

    mod declaration_tests {
        use super::*;
        use crate::syntax::BodyDeclaration;

        fn declaration(name: &str) -> TypeDeclaration {
            TypeDeclaration {
                name: name.to_string(),
                kind: TypeDeclarationKind::Class,
                binding: None,
                modifiers: vec![Modifier::Public],
                superclass: None,
                interfaces: Vec::new(),
                body: Vec::<BodyDeclaration>::new(),
            }
        }

        #[test]
        fn declared_type_is_not_a_stub() {
            let mut table = BindingTable::new();
            let binding = table.add_type(TypeBinding::class("p", "A").with_modifiers(&[Modifier::Public]));
            let mut builder = ModelBuilder::new(&table);
            let referenced = builder.ensure_type_from_binding(binding);

            let mut decl = declaration("A");
            decl.binding = Some(binding);
            let declared = builder.ensure_type_from_declaration(&decl);
            assert_eq!(referenced, declared);
            assert!(!builder.repository().ty(declared).unwrap().entity.is_stub);
        }

        #[test]
        fn unbound_declaration_is_filed_under_scope() {
            let table = BindingTable::new();
            let mut builder = ModelBuilder::new(&table);
            let ns = builder.ensure_namespace("p");
            builder.enter(ns);

            let mut decl = declaration("Local");
            decl.kind = TypeDeclarationKind::Interface;
            decl.superclass = Some(TypeRef::unresolved(TypeSyntax::simple("Base")));
            let ty = builder.ensure_type_from_declaration(&decl);
            let again = builder.ensure_type_from_declaration(&decl);
            assert_eq!(ty, again);

            let repo = builder.repository();
            assert_eq!(repo.type_qualified_name(ty), "p.Local");
            assert_eq!(repo.ty(ty).unwrap().kind.is_interface(), Some(true));
            assert_eq!(repo.supertypes_of(ty).len(), 1);
            assert_eq!(repo.ty(ty).unwrap().entity.modifiers.len(), 1);
        }
    }
}
