//! Depth-first traversal of compilation units into a model builder.
//!
//! The walker opens a scope for every package, type, method, initializer and
//! anonymous class body it enters and closes it on the way out, so the
//! builder always sees the innermost open declaration. Each syntax node is
//! visited exactly once; edges are created as they are met.

use famixer_core::builder::{BuilderOptions, ModelBuilder};
use famixer_core::repository::Repository;
use famixer_core::syntax::{
    BodyDeclaration, CompilationUnit, Expression, FieldDeclaration, Initializer,
    MethodDeclaration, Statement, TypeDeclaration,
};
use tracing::{debug, warn};

use crate::project::Project;

/// Build the model of a whole project.
#[tracing::instrument(level = "debug", skip_all, fields(units = project.units.len()))]
pub fn build_model(project: &Project, options: BuilderOptions) -> Repository {
    let mut walker = ModelWalker::new(ModelBuilder::new(&project.bindings).with_options(options));
    for unit in &project.units {
        walker.visit_unit(unit);
    }
    walker.finish()
}

/// Feeds syntax to a [`ModelBuilder`] in declaration order.
pub struct ModelWalker<'a> {
    builder: ModelBuilder<'a>,
}

impl<'a> ModelWalker<'a> {
    pub fn new(builder: ModelBuilder<'a>) -> Self {
        ModelWalker { builder }
    }

    /// The builder being fed.
    pub fn builder(&self) -> &ModelBuilder<'a> {
        &self.builder
    }

    /// Stop walking and take the model.
    pub fn finish(self) -> Repository {
        if !self.builder.scope().is_empty() {
            warn!(depth = self.builder.scope().depth(), "traversal ended with open scopes");
        }
        self.builder.into_repository()
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    pub fn visit_unit(&mut self, unit: &CompilationUnit) {
        debug!(path = unit.path.as_deref().unwrap_or("<unnamed>"), "visiting unit");
        match &unit.package {
            Some(package) => {
                let namespace = self.builder.ensure_namespace(&package.name);
                self.builder.enter(namespace);
                self.visit_types(&unit.types);
                self.builder.exit();
            }
            None => self.visit_types(&unit.types),
        }
    }

    fn visit_types(&mut self, types: &[TypeDeclaration]) {
        for declaration in types {
            self.visit_type(declaration);
        }
    }

    pub fn visit_type(&mut self, declaration: &TypeDeclaration) {
        let type_id = self.builder.ensure_type_from_declaration(declaration);
        self.builder.enter(type_id);
        self.visit_body(&declaration.body);
        self.builder.exit();
    }

    fn visit_body(&mut self, body: &[BodyDeclaration]) {
        for member in body {
            match member {
                BodyDeclaration::Field(field) => self.visit_field(field),
                BodyDeclaration::Method(method) => self.visit_method(method),
                BodyDeclaration::Initializer(initializer) => self.visit_initializer(initializer),
                BodyDeclaration::Type(declaration) => self.visit_type(declaration),
            }
        }
    }

    fn visit_field(&mut self, field: &FieldDeclaration) {
        for fragment in &field.fragments {
            self.builder.ensure_attribute_for_fragment(fragment, field);
            if let Some(initializer) = &fragment.initializer {
                self.visit_expression(initializer);
            }
        }
    }

    fn visit_method(&mut self, declaration: &MethodDeclaration) {
        let method_id = self.builder.ensure_method_from_declaration(declaration);
        for parameter in &declaration.parameters {
            self.builder.ensure_parameter(parameter, method_id);
        }
        self.builder.enter(method_id);
        self.visit_statements(&declaration.body);
        self.builder.exit();
    }

    fn visit_initializer(&mut self, initializer: &Initializer) {
        let method_id = self.builder.create_initializer(initializer);
        self.builder.enter(method_id);
        self.visit_statements(&initializer.body);
        self.builder.exit();
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn visit_statements(&mut self, statements: &[Statement]) {
        for statement in statements {
            self.visit_statement(statement);
        }
    }

    fn visit_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::LocalVariable { ty, fragments } => {
                for fragment in fragments {
                    self.builder.create_local_variable(fragment, ty);
                    if let Some(initializer) = &fragment.initializer {
                        self.visit_expression(initializer);
                    }
                }
            }
            Statement::Expression { expression } => self.visit_expression(expression),
            Statement::Return { value } => {
                if let Some(value) = value {
                    self.visit_expression(value);
                }
            }
            Statement::Block { statements } => self.visit_statements(statements),
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn visit_expression(&mut self, expression: &Expression) {
        match expression {
            Expression::Name { .. } => {
                self.builder.create_access_from_expression(expression);
            }
            Expression::Assignment { target, value } => {
                match self.builder.create_access_from_expression(target) {
                    Some(access) => {
                        self.builder.mark_write(access);
                    }
                    None => self.visit_expression(target),
                }
                self.visit_expression(value);
            }
            Expression::MethodInvocation {
                receiver,
                arguments,
                ..
            } => {
                self.builder.create_invocation_from_expression(expression);
                if let Some(receiver) = receiver {
                    self.visit_expression(receiver);
                }
                self.visit_expressions(arguments);
            }
            Expression::ClassInstanceCreation {
                ty,
                arguments,
                anonymous,
                ..
            } => {
                self.builder.create_invocation_from_expression(expression);
                self.visit_expressions(arguments);
                if let Some(anonymous) = anonymous {
                    let type_id = self.builder.ensure_type_from_anonymous(anonymous, ty);
                    self.builder.enter(type_id);
                    self.visit_body(&anonymous.body);
                    self.builder.exit();
                }
            }
            Expression::Literal { .. } | Expression::Other { .. } => {}
        }
    }

    fn visit_expressions(&mut self, expressions: &[Expression]) {
        for expression in expressions {
            self.visit_expression(expression);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
