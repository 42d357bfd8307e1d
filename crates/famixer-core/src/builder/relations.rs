//! Relationship edges: inheritance, invocation, access.
//!
//! Edges are not interned. Each call appends a new edge, so visiting the same
//! syntax twice records it twice.

use tracing::debug;

use super::ModelBuilder;
use crate::binding::{MethodBindingId, Resolution, TypeBindingId, VariableBinding, VariableBindingId, VariableKind};
use crate::model::{
    Access, AccessId, Inheritance, InheritanceId, Invocation, InvocationId, StructuralRef, TypeId,
};
use crate::syntax::{Expression, TypeRef};

impl<'a> ModelBuilder<'a> {
    // ========================================================================
    // Inheritance
    // ========================================================================

    /// Record that `subclass` extends or implements `superclass`.
    pub fn create_inheritance(&mut self, subclass: TypeId, superclass: TypeId) -> InheritanceId {
        let inheritance_id = self.repository.next_inheritance_id();
        self.repository.insert_inheritance(Inheritance {
            inheritance_id,
            subclass,
            superclass,
        })
    }

    /// Inheritance edge to a supertype given by binding.
    pub fn create_inheritance_to_binding(&mut self, subclass: TypeId, superclass: TypeBindingId) -> InheritanceId {
        let superclass = self.ensure_type_from_binding(superclass);
        self.create_inheritance(subclass, superclass)
    }

    /// Inheritance edge to a supertype as written in source.
    pub fn create_inheritance_to_type_ref(&mut self, subclass: TypeId, superclass: &TypeRef) -> InheritanceId {
        let superclass = self.ensure_type(superclass);
        self.create_inheritance(subclass, superclass)
    }

    // ========================================================================
    // Invocation
    // ========================================================================

    /// Record a call from the current method.
    ///
    /// `signature` is the call as written. A resolved binding gives the
    /// target method; otherwise the target is a stub on the unknown type
    /// keyed by `signature`.
    pub fn create_invocation(&mut self, binding: Option<MethodBindingId>, signature: &str) -> InvocationId {
        let bindings = self.bindings;
        let candidate = match bindings.resolve_method(binding, signature) {
            Resolution::Resolved((id, _)) => self.ensure_method_from_binding(id),
            Resolution::Unresolved(signature) => self.ensure_unresolved_method(signature),
        };
        let sender = self.current_method();
        if sender.is_none() {
            debug!(signature, "invocation outside any method");
        }
        let invocation_id = self.repository.next_invocation_id();
        self.repository.insert_invocation(Invocation {
            invocation_id,
            sender,
            candidates: vec![candidate],
            signature: signature.to_string(),
        })
    }

    /// Record the call made by a method invocation or instance creation.
    ///
    /// Returns `None` for any other expression.
    pub fn create_invocation_from_expression(&mut self, expression: &Expression) -> Option<InvocationId> {
        let signature = expression.call_signature()?;
        let binding = match expression {
            Expression::MethodInvocation { binding, .. }
            | Expression::ClassInstanceCreation { binding, .. } => *binding,
            _ => None,
        };
        Some(self.create_invocation(binding, &signature))
    }

    // ========================================================================
    // Access
    // ========================================================================

    /// Record a read of the variable behind `binding` by the current method.
    ///
    /// Fields resolve to attributes and parameters to parameters of the
    /// current method. Locals, unknown parameters and dangling bindings
    /// leave the target empty.
    pub fn create_access_from_variable_binding(&mut self, binding: VariableBindingId) -> AccessId {
        let bindings = self.bindings;
        let variable = bindings
            .variable_binding(binding)
            .and_then(|binding| self.structural_entity_for_binding(binding));
        self.insert_access(variable)
    }

    /// Record a read of the variable named by a simple-name expression.
    ///
    /// Returns `None` unless `expression` is a name with a resolvable
    /// variable binding.
    pub fn create_access_from_expression(&mut self, expression: &Expression) -> Option<AccessId> {
        let binding = self.variable_binding_of(expression)?;
        let variable = self.structural_entity_for_binding(binding);
        Some(self.insert_access(variable))
    }

    /// The attribute or parameter a simple-name expression refers to.
    pub fn ensure_structural_entity_from_expression(&mut self, expression: &Expression) -> Option<StructuralRef> {
        let binding = self.variable_binding_of(expression)?;
        self.structural_entity_for_binding(binding)
    }

    /// Flag an access as a write. Returns `false` if the access is unknown.
    pub fn mark_write(&mut self, access: AccessId) -> bool {
        match self.repository.access_mut(access) {
            Some(access) => {
                access.is_write = true;
                true
            }
            None => false,
        }
    }

    fn structural_entity_for_binding(&mut self, binding: &'a VariableBinding) -> Option<StructuralRef> {
        match binding.kind {
            VariableKind::Field => Some(StructuralRef::Attribute(self.ensure_attribute_for_variable(binding))),
            VariableKind::Parameter => self.parameter_in_current_method(&binding.name).map(StructuralRef::Parameter),
            VariableKind::Local => None,
        }
    }

    fn variable_binding_of(&self, expression: &Expression) -> Option<&'a VariableBinding> {
        match expression {
            Expression::Name {
                binding: Some(id), ..
            } => self.bindings.variable_binding(*id),
            _ => None,
        }
    }

    fn insert_access(&mut self, variable: Option<StructuralRef>) -> AccessId {
        let accessor = self.current_method();
        let access_id = self.repository.next_access_id();
        self.repository.insert_access(Access {
            access_id,
            accessor,
            variable,
            is_write: false,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{BindingTable, MethodBinding, TypeBinding};
    use crate::syntax::{MethodDeclaration, SingleVariableDeclaration, TypeSyntax};

    mod inheritance_tests {
        use super::*;

        #[test]
        fn duplicate_visits_give_duplicate_edges() {
            let mut table = BindingTable::new();
            let base = table.add_type(TypeBinding::class("p", "Base"));
            let mut builder = ModelBuilder::new(&table);
            let derived = builder.ensure_type_from_syntax(&TypeSyntax::simple("Derived"));

            let first = builder.create_inheritance_to_binding(derived, base);
            let second = builder.create_inheritance_to_binding(derived, base);
            assert_ne!(first, second);

            let repo = builder.repository();
            assert_eq!(repo.summary().inheritances, 2);
            assert_eq!(repo.inheritance(first).unwrap().superclass, repo.inheritance(second).unwrap().superclass);
        }
    }

    mod invocation_tests {
        use super::*;

        fn builder_in_method(table: &BindingTable) -> (ModelBuilder<'_>, crate::model::MethodId) {
            let mut builder = ModelBuilder::new(table);
            let ty = builder.ensure_type_from_syntax(&TypeSyntax::simple("Client"));
            builder.enter(ty);
            let method = builder.ensure_method_from_declaration(&MethodDeclaration {
                name: "run".to_string(),
                binding: None,
                is_constructor: false,
                return_type: None,
                parameters: Vec::new(),
                modifiers: Vec::new(),
                body: Vec::new(),
            });
            builder.enter(method);
            (builder, method)
        }

        #[test]
        fn resolved_call_targets_bound_method() {
            let mut table = BindingTable::new();
            let list = table.add_type(TypeBinding::class("java.util", "ArrayList"));
            let add = table.add_method(MethodBinding::new("add", list));
            let (mut builder, run) = builder_in_method(&table);

            let call = Expression::MethodInvocation {
                receiver: Some(Box::new(Expression::name("items", None))),
                name: "add".to_string(),
                arguments: vec![Expression::name("item", None)],
                binding: Some(add),
            };
            let inv = builder.create_invocation_from_expression(&call).unwrap();

            let repo = builder.repository();
            let invocation = repo.invocation(inv).unwrap();
            assert_eq!(invocation.sender, Some(run));
            assert_eq!(invocation.signature, "add(item)");
            let target = repo.method(invocation.candidates[0]).unwrap();
            assert_eq!(target.signature, "add()");
            assert_eq!(repo.type_qualified_name(target.parent_type), "java.util.ArrayList");
        }

        #[test]
        fn unresolved_call_targets_unknown_stub() {
            let table = BindingTable::new();
            let (mut builder, _) = builder_in_method(&table);
            let a = builder.create_invocation(None, "mystery(1)");
            let b = builder.create_invocation(None, "mystery(1)");
            assert_ne!(a, b);

            let unknown = builder.unknown_type();
            let repo = builder.repository();
            let first = repo.invocation(a).unwrap();
            let second = repo.invocation(b).unwrap();
            assert_eq!(first.candidates, second.candidates);
            let stub = repo.method(first.candidates[0]).unwrap();
            assert_eq!(stub.parent_type, unknown);
            assert_eq!(stub.entity.name, "mystery");
            assert!(stub.entity.is_stub);
        }

        #[test]
        fn non_call_expression_gives_nothing() {
            let table = BindingTable::new();
            let (mut builder, _) = builder_in_method(&table);
            let literal = Expression::Literal { text: "1".to_string() };
            assert!(builder.create_invocation_from_expression(&literal).is_none());
        }
    }

    mod access_tests {
        use super::*;

        #[test]
        fn field_and_parameter_accesses() {
            let mut table = BindingTable::new();
            let counter = table.add_type(TypeBinding::class("p", "Counter"));
            let int = table.add_type(TypeBinding::primitive("int"));
            let count = table.add_variable(VariableBinding::field("count", counter, int));
            let step = table.add_variable(VariableBinding::parameter("step", int));
            let tmp = table.add_variable(VariableBinding::local("tmp", int));

            let mut builder = ModelBuilder::new(&table);
            let counter_id = builder.ensure_type_from_binding(counter);
            builder.enter(counter_id);
            let decl = MethodDeclaration {
                name: "bump".to_string(),
                binding: None,
                is_constructor: false,
                return_type: None,
                parameters: vec![SingleVariableDeclaration {
                    name: "step".to_string(),
                    ty: TypeRef::resolved(TypeSyntax::primitive("int"), int),
                    binding: Some(step),
                }],
                modifiers: Vec::new(),
                body: Vec::new(),
            };
            let bump = builder.ensure_method_from_declaration(&decl);
            let step_param = builder.ensure_parameter(&decl.parameters[0], bump);
            builder.enter(bump);

            let field_access = builder.create_access_from_expression(&Expression::name("count", Some(count))).unwrap();
            let param_access = builder.create_access_from_variable_binding(step);
            let local_access = builder.create_access_from_variable_binding(tmp);
            assert!(builder.mark_write(field_access));

            let repo = builder.repository();
            let field = repo.access(field_access).unwrap();
            assert!(field.is_write);
            assert_eq!(field.accessor, Some(bump));
            let Some(StructuralRef::Attribute(attr)) = field.variable else {
                panic!("expected attribute target");
            };
            assert_eq!(repo.attribute_qualified_name(attr), "p.Counter.count");

            assert_eq!(
                repo.access(param_access).unwrap().variable,
                Some(StructuralRef::Parameter(step_param))
            );
            assert_eq!(repo.access(local_access).unwrap().variable, None);
            assert!(!repo.access(local_access).unwrap().is_write);
            assert_eq!(repo.summary().accesses, 3);
        }

        #[test]
        fn only_bound_names_produce_accesses() {
            let table = BindingTable::new();
            let mut builder = ModelBuilder::new(&table);
            assert!(builder.create_access_from_expression(&Expression::name("x", None)).is_none());
            let other = Expression::Other { text: "a[i]".to_string() };
            assert!(builder.create_access_from_expression(&other).is_none());
            assert!(builder.ensure_structural_entity_from_expression(&other).is_none());
            assert!(!builder.mark_write(AccessId::new(0)));
            assert!(builder.repository().is_empty());
        }
    }
}
