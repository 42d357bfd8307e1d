//! Member resolution: methods, attributes, parameters, local variables.
//!
//! Methods are keyed by `<owner qualified name>.<signature>` where the
//! signature is `name(T1, T2)`. The binding path and the declaration path
//! build the parameter list the same way whenever parameter types are
//! resolved, so a method reached through both ends up as one entity.

use tracing::debug;

use super::{declare, AttributeKeying, ModelBuilder};
use crate::binding::{MethodBinding, MethodBindingId, Resolution, VariableBinding, VariableKind};
use crate::model::{
    modifier_set, Attribute, AttributeId, LocalVariable, LocalVariableId, Method, MethodId,
    MethodKind, Modifier, NamedEntity, Parameter, ParameterId, TypeId, INITIALIZER_NAME,
    UNKNOWN_NAME,
};
use crate::registry::Ensured;
use crate::syntax::{
    FieldDeclaration, Initializer, MethodDeclaration, SingleVariableDeclaration, TypeRef,
    VariableFragment,
};

/// Build a method signature: `name(T1, T2)`.
pub fn method_signature<S: AsRef<str>>(name: &str, parameter_types: &[S]) -> String {
    let parameters: Vec<&str> = parameter_types.iter().map(AsRef::as_ref).collect();
    format!("{}({})", name, parameters.join(", "))
}

impl<'a> ModelBuilder<'a> {
    // ========================================================================
    // Methods
    // ========================================================================

    /// Resolve a method binding, owned by its declaring class.
    ///
    /// Without a declaring class the method goes on the unknown type. A
    /// dangling index gives a stub on the unknown type.
    pub fn ensure_method_from_binding(&mut self, id: MethodBindingId) -> MethodId {
        let bindings = self.bindings;
        let Some(binding) = bindings.method_binding(id) else {
            return self.ensure_unresolved_method(&method_signature::<&str>(UNKNOWN_NAME, &[]));
        };
        let owner = match binding.declaring_class {
            Some(declaring) => self.ensure_type_from_binding(declaring),
            None => self.unknown_type(),
        };
        self.ensure_method_from_resolved(binding, owner)
    }

    /// Resolve the method introduced by a declaration and mark it declared.
    ///
    /// The owner is always the type owning the current scope, even when the
    /// declaration carries a binding. Members of anonymous types depend on
    /// this: their bindings name no usable owner.
    pub fn ensure_method_from_declaration(&mut self, declaration: &MethodDeclaration) -> MethodId {
        let owner = self.owner_type_or_unknown();
        let bindings = self.bindings;
        let method_id = match bindings.resolve_method(declaration.binding, declaration) {
            Resolution::Resolved((_, binding)) => self.ensure_method_from_resolved(binding, owner),
            Resolution::Unresolved(declaration) => self.ensure_method_from_syntax(declaration, owner),
        };
        if let Some(method) = self.repository.method_mut(method_id) {
            declare(&mut method.entity, &declaration.modifiers);
        }
        method_id
    }

    /// Create the synthetic method modelling an initializer block.
    ///
    /// Never deduplicated: every call creates a new method.
    pub fn create_initializer(&mut self, initializer: &Initializer) -> MethodId {
        let parent_type = self.owner_type_or_unknown();
        let mut entity = NamedEntity::stub(INITIALIZER_NAME);
        entity.is_stub = false;
        if initializer.is_static {
            entity.add_modifiers([Modifier::Static]);
        }
        let method_id = self.repository.next_method_id();
        self.repository.insert_method(Method {
            method_id,
            entity,
            parent_type,
            signature: INITIALIZER_NAME.to_string(),
            kind: MethodKind::Initializer,
            declared_type: None,
        })
    }

    /// A stub method on the unknown type for a call that did not resolve.
    ///
    /// Keyed by the call text, so repeated identical calls share it.
    pub fn ensure_unresolved_method(&mut self, signature: &str) -> MethodId {
        let owner = self.unknown_type();
        let name = signature.split('(').next().unwrap_or(signature);
        let qualified_name = format!("{}.{}", self.repository.type_qualified_name(owner), signature);
        let ensured = self.intern_method(&qualified_name, name, owner, signature, MethodKind::Normal);
        if ensured.is_created() {
            debug!(signature, "created unresolved method stub");
        }
        ensured.id()
    }

    fn ensure_method_from_resolved(&mut self, binding: &'a MethodBinding, owner: TypeId) -> MethodId {
        let bindings = self.bindings;
        let parameter_types: Vec<&str> = binding
            .parameter_types
            .iter()
            .map(|id| match bindings.type_binding(*id) {
                Some(parameter) => parameter.qualified_name.as_str(),
                None => UNKNOWN_NAME,
            })
            .collect();
        let signature = method_signature(&binding.name, &parameter_types);
        let qualified_name = format!("{}.{}", self.repository.type_qualified_name(owner), signature);
        let kind = if binding.is_constructor {
            MethodKind::Constructor
        } else {
            MethodKind::Normal
        };

        let method_id = match self.intern_method(&qualified_name, &binding.name, owner, &signature, kind) {
            Ensured::Existing(id) => return id,
            Ensured::Created(id) => id,
        };
        let declared_type = binding
            .return_type
            .filter(|id| bindings.type_binding(*id).is_some_and(|ret| !ret.is_void()))
            .map(|id| self.ensure_type_from_binding(id));
        if let Some(method) = self.repository.method_mut(method_id) {
            method.entity.modifiers = modifier_set(&binding.modifiers);
            method.declared_type = declared_type;
        }
        method_id
    }

    fn ensure_method_from_syntax(&mut self, declaration: &MethodDeclaration, owner: TypeId) -> MethodId {
        let bindings = self.bindings;
        let parameter_types: Vec<String> = declaration
            .parameters
            .iter()
            .map(|parameter| match bindings.resolve_type(parameter.ty.binding, &parameter.ty.syntax) {
                Resolution::Resolved((_, binding)) => binding.qualified_name.clone(),
                Resolution::Unresolved(syntax) => syntax.to_string(),
            })
            .collect();
        let signature = method_signature(&declaration.name, &parameter_types);
        let qualified_name = format!("{}.{}", self.repository.type_qualified_name(owner), signature);
        let kind = if declaration.is_constructor {
            MethodKind::Constructor
        } else {
            MethodKind::Normal
        };

        let method_id = match self.intern_method(&qualified_name, &declaration.name, owner, &signature, kind) {
            Ensured::Existing(id) => return id,
            Ensured::Created(id) => id,
        };
        let declared_type = match &declaration.return_type {
            Some(return_type) if !self.is_void(return_type) => Some(self.ensure_type(return_type)),
            _ => None,
        };
        if let Some(method) = self.repository.method_mut(method_id) {
            method.declared_type = declared_type;
        }
        method_id
    }

    fn is_void(&self, type_ref: &TypeRef) -> bool {
        match type_ref.binding.and_then(|id| self.bindings.type_binding(id)) {
            Some(binding) => binding.is_void(),
            None => type_ref.syntax.is_void(),
        }
    }

    fn intern_method(
        &mut self,
        qualified_name: &str,
        name: &str,
        parent_type: TypeId,
        signature: &str,
        kind: MethodKind,
    ) -> Ensured<MethodId> {
        let repository = &mut self.repository;
        self.registry.methods.ensure(qualified_name, || {
            let method_id = repository.next_method_id();
            repository.insert_method(Method {
                method_id,
                entity: NamedEntity::stub(name),
                parent_type,
                signature: signature.to_string(),
                kind,
                declared_type: None,
            })
        })
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    /// Resolve a formal parameter of `method`, keyed by the method's
    /// qualified name and the parameter name.
    pub fn ensure_parameter(&mut self, declaration: &SingleVariableDeclaration, method: MethodId) -> ParameterId {
        let qualified_name = format!(
            "{}.{}",
            self.repository.method_qualified_name(method),
            declaration.name
        );
        if let Some(id) = self.registry.parameters.get(&qualified_name) {
            return id;
        }
        let declared_type = self.ensure_type(&declaration.ty);
        let repository = &mut self.repository;
        self.registry
            .parameters
            .ensure(&qualified_name, || {
                let mut entity = NamedEntity::stub(declaration.name.as_str());
                entity.is_stub = false;
                let parameter_id = repository.next_parameter_id();
                repository.insert_parameter(Parameter {
                    parameter_id,
                    entity,
                    parent: method,
                    declared_type,
                })
            })
            .id()
    }

    /// Find an already registered parameter of the current method by name.
    ///
    /// Never creates anything.
    pub fn parameter_in_current_method(&self, name: &str) -> Option<ParameterId> {
        let method = self.current_method()?;
        self.repository
            .parameters_of(method)
            .into_iter()
            .find(|parameter| parameter.entity.name == name)
            .map(|parameter| parameter.parameter_id)
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    /// Resolve the attribute declared by one field fragment.
    ///
    /// With a binding, the attribute is shared with every other reference to
    /// the field. Without one, it is filed under the current type and keyed
    /// per [`AttributeKeying`]. Either way the result stays a stub.
    pub fn ensure_attribute_for_fragment(
        &mut self,
        fragment: &VariableFragment,
        field: &FieldDeclaration,
    ) -> AttributeId {
        let bindings = self.bindings;
        let resolved = match bindings.resolve_variable(fragment.binding, ()) {
            Resolution::Resolved((_, binding)) if binding.kind == VariableKind::Field => Some(binding),
            _ => None,
        };
        let attribute_id = match resolved {
            Some(binding) => self.ensure_attribute_for_variable(binding),
            None => self.ensure_attribute_from_syntax(fragment, field),
        };
        if let Some(attribute) = self.repository.attribute_mut(attribute_id) {
            attribute.entity.is_stub = true;
            if attribute.entity.modifiers.is_empty() {
                let declared = resolved.map_or(field.modifiers.as_slice(), |b| b.modifiers.as_slice());
                attribute.entity.modifiers = modifier_set(declared);
            }
        }
        attribute_id
    }

    /// Resolve the attribute named by a field binding.
    pub fn ensure_attribute_for_variable(&mut self, binding: &'a VariableBinding) -> AttributeId {
        let parent_type = match binding.declaring_class {
            Some(declaring) => self.ensure_type_from_binding(declaring),
            None => self.owner_type_or_unknown(),
        };
        let qualified_name = format!(
            "{}.{}",
            self.repository.type_qualified_name(parent_type),
            binding.name
        );
        if let Some(id) = self.registry.attributes.get(&qualified_name) {
            return id;
        }
        let declared_type = match binding.type_binding {
            Some(ty) => self.ensure_type_from_binding(ty),
            None => self.unknown_type(),
        };
        self.intern_attribute(&qualified_name, &binding.name, parent_type, declared_type)
    }

    fn ensure_attribute_from_syntax(&mut self, fragment: &VariableFragment, field: &FieldDeclaration) -> AttributeId {
        let parent_type = self.owner_type_or_unknown();
        let type_name = self.repository.type_qualified_name(parent_type);
        let qualified_name = match self.options.attribute_keying {
            AttributeKeying::Keyed => format!("{}.{}", type_name, fragment.name),
            AttributeKeying::Legacy => type_name,
        };
        if let Some(id) = self.registry.attributes.get(&qualified_name) {
            return id;
        }
        debug!(field = %fragment.name, "attribute without binding");
        let declared_type = self.ensure_type(&field.ty);
        self.intern_attribute(&qualified_name, &fragment.name, parent_type, declared_type)
    }

    fn intern_attribute(
        &mut self,
        qualified_name: &str,
        name: &str,
        parent_type: TypeId,
        declared_type: TypeId,
    ) -> AttributeId {
        let repository = &mut self.repository;
        self.registry
            .attributes
            .ensure(qualified_name, || {
                let attribute_id = repository.next_attribute_id();
                repository.insert_attribute(Attribute {
                    attribute_id,
                    entity: NamedEntity::stub(name),
                    parent_type,
                    declared_type,
                })
            })
            .id()
    }

    // ========================================================================
    // Local Variables
    // ========================================================================

    /// Create a local variable for one declaration fragment.
    ///
    /// Always creates a new entity, attached to the current method.
    pub fn create_local_variable(&mut self, fragment: &VariableFragment, ty: &TypeRef) -> LocalVariableId {
        let declared_type = self.ensure_type(ty);
        let parent = self.current_method();
        let local_variable_id = self.repository.next_local_variable_id();
        self.repository.insert_local_variable(LocalVariable {
            local_variable_id,
            entity: NamedEntity::stub(fragment.name.as_str()),
            parent,
            declared_type,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
