//! Symbolic bindings supplied by the front-end.
//!
//! The front-end resolves names and types and reports what it found as
//! bindings. Bindings live in a [`BindingTable`] and refer to each other by
//! index, so a binding graph may be cyclic (`Enum<E extends Enum<E>>`).
//! Syntax nodes carry optional binding indices; an absent index means the
//! front-end could not resolve that node.
//!
//! # Resolution
//!
//! Callers never branch on raw `Option`s: [`BindingTable::resolve_type`] and
//! friends return a [`Resolution`], either the binding or the syntactic hint
//! to fall back on. A dangling index is treated as unresolved.

use crate::model::Modifier;
use serde::{Deserialize, Serialize};
use tracing::warn;

// ============================================================================
// Binding IDs
// ============================================================================

/// Index of a [`TypeBinding`] in a [`BindingTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TypeBindingId(pub u32);

/// Index of a [`MethodBinding`] in a [`BindingTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct MethodBindingId(pub u32);

/// Index of a [`VariableBinding`] in a [`BindingTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct VariableBindingId(pub u32);

// ============================================================================
// Bindings
// ============================================================================

/// A resolved type.
///
/// Trait flags are checked in a fixed order when choosing the model variant:
/// primitive, parameterized, generic, enum, then class/interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeBinding {
    /// Fully qualified name, including type arguments
    /// (e.g., `"java.util.List<java.lang.String>"`).
    pub qualified_name: String,
    /// Simple name, including type arguments (e.g., `"List<String>"`).
    pub name: String,
    /// Package name; `None` for primitives, type variables and arrays.
    #[serde(default)]
    pub package: Option<String>,
    /// Enclosing type of a member type.
    #[serde(default)]
    pub declaring_class: Option<TypeBindingId>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub is_primitive: bool,
    #[serde(default)]
    pub is_parameterized: bool,
    #[serde(default)]
    pub is_generic: bool,
    #[serde(default)]
    pub is_enum: bool,
    #[serde(default)]
    pub is_interface: bool,
    #[serde(default)]
    pub superclass: Option<TypeBindingId>,
    #[serde(default)]
    pub interfaces: Vec<TypeBindingId>,
    /// Generic declaration of a parameterized type.
    #[serde(default)]
    pub erasure: Option<TypeBindingId>,
    #[serde(default)]
    pub type_arguments: Vec<TypeBindingId>,
    /// Names of the declared type parameters of a generic type.
    #[serde(default)]
    pub type_parameters: Vec<String>,
}

impl TypeBinding {
    /// A class binding in `package`.
    pub fn class(package: &str, name: &str) -> Self {
        TypeBinding {
            qualified_name: format!("{}.{}", package, name),
            name: name.to_string(),
            package: Some(package.to_string()),
            declaring_class: None,
            modifiers: Vec::new(),
            is_primitive: false,
            is_parameterized: false,
            is_generic: false,
            is_enum: false,
            is_interface: false,
            superclass: None,
            interfaces: Vec::new(),
            erasure: None,
            type_arguments: Vec::new(),
            type_parameters: Vec::new(),
        }
    }

    /// A primitive binding such as `int` or `void`.
    pub fn primitive(name: &str) -> Self {
        TypeBinding {
            qualified_name: name.to_string(),
            package: None,
            is_primitive: true,
            ..TypeBinding::class("", name)
        }
    }

    /// Mark as an interface.
    pub fn interface(mut self) -> Self {
        self.is_interface = true;
        self
    }

    /// Mark as an enum.
    pub fn enumeration(mut self) -> Self {
        self.is_enum = true;
        self
    }

    /// Mark as a generic declaration with the given type parameters.
    pub fn with_type_parameters(mut self, params: &[&str]) -> Self {
        self.is_generic = true;
        self.type_parameters = params.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Mark as a parameterized instantiation.
    pub fn parameterized(
        mut self,
        erasure: TypeBindingId,
        arguments: Vec<TypeBindingId>,
    ) -> Self {
        self.is_parameterized = true;
        self.erasure = Some(erasure);
        self.type_arguments = arguments;
        self
    }

    /// Mark as a member type of `outer`.
    pub fn nested_in(mut self, outer: TypeBindingId) -> Self {
        self.declaring_class = Some(outer);
        self
    }

    /// Set the superclass.
    pub fn with_superclass(mut self, superclass: TypeBindingId) -> Self {
        self.superclass = Some(superclass);
        self
    }

    /// Add an implemented interface.
    pub fn with_interface(mut self, interface: TypeBindingId) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Set modifiers.
    pub fn with_modifiers(mut self, modifiers: &[Modifier]) -> Self {
        self.modifiers = modifiers.to_vec();
        self
    }

    /// Check if this is the `void` pseudo-type.
    pub fn is_void(&self) -> bool {
        self.is_primitive && self.name == "void"
    }
}

/// A resolved method or constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodBinding {
    pub name: String,
    /// Declaring type; absent for methods of unresolvable anonymous types.
    #[serde(default)]
    pub declaring_class: Option<TypeBindingId>,
    #[serde(default)]
    pub parameter_types: Vec<TypeBindingId>,
    #[serde(default)]
    pub return_type: Option<TypeBindingId>,
    #[serde(default)]
    pub is_constructor: bool,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
}

impl MethodBinding {
    /// A method binding with no parameters and no return type.
    pub fn new(name: &str, declaring_class: TypeBindingId) -> Self {
        MethodBinding {
            name: name.to_string(),
            declaring_class: Some(declaring_class),
            parameter_types: Vec::new(),
            return_type: None,
            is_constructor: false,
            modifiers: Vec::new(),
        }
    }

    /// Set parameter types.
    pub fn with_parameters(mut self, parameter_types: Vec<TypeBindingId>) -> Self {
        self.parameter_types = parameter_types;
        self
    }

    /// Set the return type.
    pub fn returning(mut self, return_type: TypeBindingId) -> Self {
        self.return_type = Some(return_type);
        self
    }

    /// Mark as a constructor.
    pub fn constructor(mut self) -> Self {
        self.is_constructor = true;
        self
    }

    /// Set modifiers.
    pub fn with_modifiers(mut self, modifiers: &[Modifier]) -> Self {
        self.modifiers = modifiers.to_vec();
        self
    }
}

/// What a [`VariableBinding`] names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    Field,
    Parameter,
    Local,
}

/// A resolved variable: field, parameter or local.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableBinding {
    pub name: String,
    pub kind: VariableKind,
    /// Declaring type, for fields.
    #[serde(default)]
    pub declaring_class: Option<TypeBindingId>,
    /// Declared type of the variable.
    #[serde(default, rename = "type")]
    pub type_binding: Option<TypeBindingId>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
}

impl VariableBinding {
    /// A field binding declared in `declaring_class`.
    pub fn field(name: &str, declaring_class: TypeBindingId, ty: TypeBindingId) -> Self {
        VariableBinding {
            name: name.to_string(),
            kind: VariableKind::Field,
            declaring_class: Some(declaring_class),
            type_binding: Some(ty),
            modifiers: Vec::new(),
        }
    }

    /// A parameter binding.
    pub fn parameter(name: &str, ty: TypeBindingId) -> Self {
        VariableBinding {
            name: name.to_string(),
            kind: VariableKind::Parameter,
            declaring_class: None,
            type_binding: Some(ty),
            modifiers: Vec::new(),
        }
    }

    /// A local variable binding.
    pub fn local(name: &str, ty: TypeBindingId) -> Self {
        VariableBinding {
            kind: VariableKind::Local,
            ..VariableBinding::parameter(name, ty)
        }
    }

    /// Set modifiers.
    pub fn with_modifiers(mut self, modifiers: &[Modifier]) -> Self {
        self.modifiers = modifiers.to_vec();
        self
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Result of resolving a syntax node against the binding table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<B, H> {
    /// The front-end supplied a binding.
    Resolved(B),
    /// No usable binding; fall back to what the syntax says.
    Unresolved(H),
}

// ============================================================================
// Binding Table
// ============================================================================

/// All bindings of a project, addressed by index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingTable {
    #[serde(default)]
    pub types: Vec<TypeBinding>,
    #[serde(default)]
    pub methods: Vec<MethodBinding>,
    #[serde(default)]
    pub variables: Vec<VariableBinding>,
}

impl BindingTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a type binding and return its index.
    pub fn add_type(&mut self, binding: TypeBinding) -> TypeBindingId {
        self.types.push(binding);
        TypeBindingId((self.types.len() - 1) as u32)
    }

    /// Append a method binding and return its index.
    pub fn add_method(&mut self, binding: MethodBinding) -> MethodBindingId {
        self.methods.push(binding);
        MethodBindingId((self.methods.len() - 1) as u32)
    }

    /// Append a variable binding and return its index.
    pub fn add_variable(&mut self, binding: VariableBinding) -> VariableBindingId {
        self.variables.push(binding);
        VariableBindingId((self.variables.len() - 1) as u32)
    }

    /// Get a type binding; logs and returns `None` for a dangling index.
    pub fn type_binding(&self, id: TypeBindingId) -> Option<&TypeBinding> {
        let binding = self.types.get(id.0 as usize);
        if binding.is_none() {
            warn!(index = id.0, "dangling type binding index");
        }
        binding
    }

    /// Get a method binding; logs and returns `None` for a dangling index.
    pub fn method_binding(&self, id: MethodBindingId) -> Option<&MethodBinding> {
        let binding = self.methods.get(id.0 as usize);
        if binding.is_none() {
            warn!(index = id.0, "dangling method binding index");
        }
        binding
    }

    /// Get a variable binding; logs and returns `None` for a dangling index.
    pub fn variable_binding(&self, id: VariableBindingId) -> Option<&VariableBinding> {
        let binding = self.variables.get(id.0 as usize);
        if binding.is_none() {
            warn!(index = id.0, "dangling variable binding index");
        }
        binding
    }

    /// Resolve an optional type binding, keeping `hint` for the fallback path.
    pub fn resolve_type<H>(
        &self,
        id: Option<TypeBindingId>,
        hint: H,
    ) -> Resolution<(TypeBindingId, &TypeBinding), H> {
        match id.and_then(|id| self.type_binding(id).map(|binding| (id, binding))) {
            Some(resolved) => Resolution::Resolved(resolved),
            None => Resolution::Unresolved(hint),
        }
    }

    /// Resolve an optional method binding, keeping `hint` for the fallback path.
    pub fn resolve_method<H>(
        &self,
        id: Option<MethodBindingId>,
        hint: H,
    ) -> Resolution<(MethodBindingId, &MethodBinding), H> {
        match id.and_then(|id| self.method_binding(id).map(|binding| (id, binding))) {
            Some(resolved) => Resolution::Resolved(resolved),
            None => Resolution::Unresolved(hint),
        }
    }

    /// Resolve an optional variable binding, keeping `hint` for the fallback path.
    pub fn resolve_variable<H>(
        &self,
        id: Option<VariableBindingId>,
        hint: H,
    ) -> Resolution<(VariableBindingId, &VariableBinding), H> {
        match id.and_then(|id| self.variable_binding(id).map(|binding| (id, binding))) {
            Some(resolved) => Resolution::Resolved(resolved),
            None => Resolution::Unresolved(hint),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
