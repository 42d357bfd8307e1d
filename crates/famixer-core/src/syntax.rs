//! Declaration syntax supplied by the front-end.
//!
//! A trimmed Java syntax tree: only the nodes the model builder consumes.
//! Every node that the front-end may fail to resolve carries an optional
//! binding index into the project's [`BindingTable`](crate::binding::BindingTable).
//! Syntactic type expressions ([`TypeSyntax`]) are kept so a name can still be
//! recovered when the binding is missing.

use crate::binding::{MethodBindingId, TypeBindingId, VariableBindingId};
use crate::model::Modifier;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Expressions
// ============================================================================

/// A type as written in source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeSyntax {
    /// `int`, `void`, ...
    Primitive { name: String },
    /// `String` or `java.util.List`.
    Simple { name: String },
    /// `List<String>`.
    Parameterized {
        base: Box<TypeSyntax>,
        #[serde(default)]
        arguments: Vec<TypeSyntax>,
    },
    /// `int[]`, `String[][]`.
    Array {
        element: Box<TypeSyntax>,
        #[serde(default = "default_dimensions")]
        dimensions: u32,
    },
    /// `?`, `? extends T`, `? super T`.
    Wildcard {
        #[serde(default)]
        bound: Option<Box<TypeSyntax>>,
        #[serde(default = "default_upper")]
        upper: bool,
    },
}

fn default_dimensions() -> u32 {
    1
}

fn default_upper() -> bool {
    true
}

impl TypeSyntax {
    /// A simple (possibly dotted) type name.
    pub fn simple(name: &str) -> Self {
        TypeSyntax::Simple {
            name: name.to_string(),
        }
    }

    /// A primitive type.
    pub fn primitive(name: &str) -> Self {
        TypeSyntax::Primitive {
            name: name.to_string(),
        }
    }

    /// A parameterized type `base<arguments>`.
    pub fn parameterized(base: TypeSyntax, arguments: Vec<TypeSyntax>) -> Self {
        TypeSyntax::Parameterized {
            base: Box::new(base),
            arguments,
        }
    }

    /// The best name recoverable without a binding.
    ///
    /// Simple types give their name, parameterized types the text of their
    /// base type. Everything else gives nothing.
    pub fn recovered_name(&self) -> Option<String> {
        match self {
            TypeSyntax::Simple { name } => Some(name.clone()),
            TypeSyntax::Parameterized { base, .. } => Some(base.to_string()),
            _ => None,
        }
    }

    /// Check if this is `void`.
    pub fn is_void(&self) -> bool {
        matches!(self, TypeSyntax::Primitive { name } if name == "void")
    }
}

impl fmt::Display for TypeSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSyntax::Primitive { name } | TypeSyntax::Simple { name } => f.write_str(name),
            TypeSyntax::Parameterized { base, arguments } => {
                write!(f, "{}<", base)?;
                for (i, arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(">")
            }
            TypeSyntax::Array {
                element,
                dimensions,
            } => {
                write!(f, "{}", element)?;
                for _ in 0..*dimensions {
                    f.write_str("[]")?;
                }
                Ok(())
            }
            TypeSyntax::Wildcard { bound, upper } => match bound {
                None => f.write_str("?"),
                Some(bound) if *upper => write!(f, "? extends {}", bound),
                Some(bound) => write!(f, "? super {}", bound),
            },
        }
    }
}

/// A type expression together with its binding, if the front-end found one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    pub syntax: TypeSyntax,
    #[serde(default)]
    pub binding: Option<TypeBindingId>,
}

impl TypeRef {
    /// A type reference the front-end resolved.
    pub fn resolved(syntax: TypeSyntax, binding: TypeBindingId) -> Self {
        TypeRef {
            syntax,
            binding: Some(binding),
        }
    }

    /// A type reference the front-end could not resolve.
    pub fn unresolved(syntax: TypeSyntax) -> Self {
        TypeRef {
            syntax,
            binding: None,
        }
    }
}

// ============================================================================
// Declarations
// ============================================================================

/// One source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationUnit {
    /// Source path, for diagnostics only.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub package: Option<PackageDeclaration>,
    #[serde(default)]
    pub types: Vec<TypeDeclaration>,
}

/// `package a.b.c;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDeclaration {
    pub name: String,
}

/// Kind of a named type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TypeDeclarationKind {
    #[default]
    Class,
    Interface,
    Enum,
}

/// A class, interface or enum declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    pub name: String,
    #[serde(default)]
    pub kind: TypeDeclarationKind,
    #[serde(default)]
    pub binding: Option<TypeBindingId>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    /// `extends` clause as written.
    #[serde(default)]
    pub superclass: Option<TypeRef>,
    /// `implements` (or interface `extends`) clause as written.
    #[serde(default)]
    pub interfaces: Vec<TypeRef>,
    #[serde(default)]
    pub body: Vec<BodyDeclaration>,
}

/// A member of a type body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BodyDeclaration {
    Field(FieldDeclaration),
    Method(MethodDeclaration),
    Initializer(Initializer),
    Type(TypeDeclaration),
}

/// `private int a, b = 1;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDeclaration {
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    pub fragments: Vec<VariableFragment>,
}

/// One declared name of a field or local variable declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableFragment {
    pub name: String,
    #[serde(default)]
    pub binding: Option<VariableBindingId>,
    #[serde(default)]
    pub initializer: Option<Expression>,
}

impl VariableFragment {
    /// A fragment with no binding and no initializer.
    pub fn named(name: &str) -> Self {
        VariableFragment {
            name: name.to_string(),
            binding: None,
            initializer: None,
        }
    }
}

/// A method or constructor declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDeclaration {
    pub name: String,
    #[serde(default)]
    pub binding: Option<MethodBindingId>,
    #[serde(default)]
    pub is_constructor: bool,
    /// Return type as written; `None` for constructors.
    #[serde(default)]
    pub return_type: Option<TypeRef>,
    #[serde(default)]
    pub parameters: Vec<SingleVariableDeclaration>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub body: Vec<Statement>,
}

/// A formal parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleVariableDeclaration {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub binding: Option<VariableBindingId>,
}

/// An instance or static initializer block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initializer {
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub body: Vec<Statement>,
}

/// Body of an anonymous class instantiation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymousClassDeclaration {
    #[serde(default)]
    pub binding: Option<TypeBindingId>,
    #[serde(default)]
    pub body: Vec<BodyDeclaration>,
}

// ============================================================================
// Statements and Expressions
// ============================================================================

/// The statements the builder looks into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
    LocalVariable {
        #[serde(rename = "type")]
        ty: TypeRef,
        fragments: Vec<VariableFragment>,
    },
    Expression {
        expression: Expression,
    },
    Return {
        #[serde(default)]
        value: Option<Expression>,
    },
    Block {
        #[serde(default)]
        statements: Vec<Statement>,
    },
}

/// The expressions the builder looks into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expression {
    /// A bare identifier.
    Name {
        identifier: String,
        #[serde(default)]
        binding: Option<VariableBindingId>,
    },
    Literal {
        text: String,
    },
    Assignment {
        target: Box<Expression>,
        value: Box<Expression>,
    },
    MethodInvocation {
        #[serde(default)]
        receiver: Option<Box<Expression>>,
        name: String,
        #[serde(default)]
        arguments: Vec<Expression>,
        #[serde(default)]
        binding: Option<MethodBindingId>,
    },
    ClassInstanceCreation {
        #[serde(rename = "type")]
        ty: TypeRef,
        #[serde(default)]
        arguments: Vec<Expression>,
        #[serde(default)]
        binding: Option<MethodBindingId>,
        #[serde(default)]
        anonymous: Option<AnonymousClassDeclaration>,
    },
    /// Anything else, kept as text.
    Other {
        text: String,
    },
}

impl Expression {
    /// An identifier expression.
    pub fn name(identifier: &str, binding: Option<VariableBindingId>) -> Self {
        Expression::Name {
            identifier: identifier.to_string(),
            binding,
        }
    }

    /// The call text used as an invocation signature, e.g. `add(item)`.
    ///
    /// Returns `None` for expressions that do not call anything.
    pub fn call_signature(&self) -> Option<String> {
        match self {
            Expression::MethodInvocation {
                name, arguments, ..
            } => Some(format!("{}({})", name, join_expressions(arguments))),
            Expression::ClassInstanceCreation { ty, arguments, .. } => {
                Some(format!("{}({})", ty.syntax, join_expressions(arguments)))
            }
            _ => None,
        }
    }
}

fn join_expressions(expressions: &[Expression]) -> String {
    expressions
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Name { identifier, .. } => f.write_str(identifier),
            Expression::Literal { text } | Expression::Other { text } => f.write_str(text),
            Expression::Assignment { target, value } => write!(f, "{} = {}", target, value),
            Expression::MethodInvocation {
                receiver,
                name,
                arguments,
                ..
            } => {
                if let Some(receiver) = receiver {
                    write!(f, "{}.", receiver)?;
                }
                write!(f, "{}({})", name, join_expressions(arguments))
            }
            Expression::ClassInstanceCreation { ty, arguments, .. } => {
                write!(f, "new {}({})", ty.syntax, join_expressions(arguments))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod type_syntax_tests {
        use super::*;

        #[test]
        fn display_matches_source_text() {
            let map = TypeSyntax::parameterized(
                TypeSyntax::simple("Map"),
                vec![
                    TypeSyntax::simple("String"),
                    TypeSyntax::Wildcard {
                        bound: Some(Box::new(TypeSyntax::simple("Number"))),
                        upper: true,
                    },
                ],
            );
            assert_eq!(map.to_string(), "Map<String,? extends Number>");

            let matrix = TypeSyntax::Array {
                element: Box::new(TypeSyntax::primitive("int")),
                dimensions: 2,
            };
            assert_eq!(matrix.to_string(), "int[][]");
        }

        #[test]
        fn recovered_name_uses_head_of_parameterized_type() {
            let list = TypeSyntax::parameterized(
                TypeSyntax::simple("java.util.List"),
                vec![TypeSyntax::simple("String")],
            );
            assert_eq!(list.recovered_name(), Some("java.util.List".to_string()));
            assert_eq!(TypeSyntax::primitive("int").recovered_name(), None);
        }

        #[test]
        fn deserializes_tagged_syntax() {
            let json = r#"{"kind": "array", "element": {"kind": "simple", "name": "String"}}"#;
            let syntax: TypeSyntax = serde_json::from_str(json).unwrap();
            assert_eq!(syntax.to_string(), "String[]");
        }
    }

    mod expression_tests {
        use super::*;

        #[test]
        fn call_signature_omits_receiver() {
            let call = Expression::MethodInvocation {
                receiver: Some(Box::new(Expression::name("items", None))),
                name: "add".to_string(),
                arguments: vec![Expression::name("item", None)],
                binding: None,
            };
            assert_eq!(call.call_signature(), Some("add(item)".to_string()));
            assert_eq!(call.to_string(), "items.add(item)");
        }

        #[test]
        fn constructor_call_signature_uses_type_text() {
            let creation = Expression::ClassInstanceCreation {
                ty: TypeRef::unresolved(TypeSyntax::simple("Point")),
                arguments: vec![
                    Expression::Literal {
                        text: "1".to_string(),
                    },
                    Expression::Literal {
                        text: "2".to_string(),
                    },
                ],
                binding: None,
                anonymous: None,
            };
            assert_eq!(creation.call_signature(), Some("Point(1, 2)".to_string()));
            assert_eq!(Expression::name("x", None).call_signature(), None);
        }
    }

    #[test]
    fn body_declarations_are_tagged() {
        let json = r#"{
            "name": "Point",
            "body": [
                {"kind": "field", "type": {"syntax": {"kind": "primitive", "name": "int"}},
                 "fragments": [{"name": "x"}]},
                {"kind": "initializer", "is_static": true}
            ]
        }"#;
        let decl: TypeDeclaration = serde_json::from_str(json).unwrap();
        assert_eq!(decl.kind, TypeDeclarationKind::Class);
        assert_eq!(decl.body.len(), 2);
        assert!(matches!(decl.body[0], BodyDeclaration::Field(_)));
        assert!(matches!(
            decl.body[1],
            BodyDeclaration::Initializer(Initializer { is_static: true, .. })
        ));
    }
}
