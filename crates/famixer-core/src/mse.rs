//! MSE export.
//!
//! Writes a [`Repository`] in the Moose interchange format: one parenthesized
//! stanza per element, in insertion order, wrapped in an outer list.
//!
//! ```text
//! (
//! (FAMIX.Namespace (id: 1) (name 'java.util') (isStub true))
//! (FAMIX.ParameterizableClass (id: 2) (name 'List') (container (ref: 1)) (isStub true) (isInterface true))
//! )
//! ```
//!
//! Element ids are 1-based positions in the repository's insertion order, so
//! the same model always exports to the same text.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::ExportError;
use crate::model::{
    ContainerRef, ElementRef, Modifier, NamedEntity, StructuralRef, TypeKind,
};
use crate::repository::Repository;

/// Write `repository` to `path`, replacing any existing file.
pub fn export_mse(repository: &Repository, path: &Path) -> Result<(), ExportError> {
    let to_export_error = |source: io::Error| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(to_export_error)?;
    let mut writer = BufWriter::new(file);
    write_mse(repository, &mut writer).map_err(to_export_error)?;
    writer.flush().map_err(to_export_error)?;
    info!(
        path = %path.display(),
        elements = repository.len(),
        "exported model"
    );
    Ok(())
}

/// Write `repository` in MSE format to any writer.
pub fn write_mse(repository: &Repository, writer: &mut impl Write) -> io::Result<()> {
    let ids: HashMap<ElementRef, usize> = repository
        .elements()
        .iter()
        .enumerate()
        .map(|(index, element)| (*element, index + 1))
        .collect();

    writeln!(writer, "(")?;
    for element in repository.elements() {
        let mut stanza = Stanza::new(&ids, *element);
        describe(repository, *element, &mut stanza);
        writeln!(writer, "{}", stanza.finish())?;
    }
    writeln!(writer, ")")
}

/// Fill in the properties of one element.
fn describe(repository: &Repository, element: ElementRef, stanza: &mut Stanza<'_>) {
    match element {
        ElementRef::Namespace(id) => {
            if let Some(ns) = repository.namespace(id) {
                stanza.class("Namespace");
                stanza.named(&ns.entity);
            }
        }
        ElementRef::Type(id) => {
            if let Some(ty) = repository.ty(id) {
                stanza.class(ty.kind.famix_name());
                stanza.string("name", &ty.entity.name);
                stanza.reference("container", container_element(ty.container));
                stanza.entity_flags(&ty.entity);
                if let Some(is_interface) = ty.kind.is_interface() {
                    stanza.boolean("isInterface", is_interface);
                }
                if let TypeKind::ParameterizedType { erasure, arguments } = &ty.kind {
                    if let Some(erasure) = erasure {
                        stanza.reference("parameterizableClass", ElementRef::Type(*erasure));
                    }
                    stanza.references(
                        "arguments",
                        arguments.iter().map(|arg| ElementRef::Type(*arg)),
                    );
                }
            }
        }
        ElementRef::Method(id) => {
            if let Some(method) = repository.method(id) {
                stanza.class("Method");
                stanza.string("name", &method.entity.name);
                stanza.reference("parentType", ElementRef::Type(method.parent_type));
                stanza.string("signature", &method.signature);
                if let Some(kind) = method.kind.as_str() {
                    stanza.string("kind", kind);
                }
                if let Some(declared) = method.declared_type {
                    stanza.reference("declaredType", ElementRef::Type(declared));
                }
                stanza.entity_flags(&method.entity);
            }
        }
        ElementRef::Attribute(id) => {
            if let Some(attr) = repository.attribute(id) {
                stanza.class("Attribute");
                stanza.string("name", &attr.entity.name);
                stanza.reference("parentType", ElementRef::Type(attr.parent_type));
                stanza.reference("declaredType", ElementRef::Type(attr.declared_type));
                stanza.entity_flags(&attr.entity);
            }
        }
        ElementRef::Parameter(id) => {
            if let Some(param) = repository.parameter(id) {
                stanza.class("Parameter");
                stanza.string("name", &param.entity.name);
                stanza.reference("parentBehaviouralEntity", ElementRef::Method(param.parent));
                stanza.reference("declaredType", ElementRef::Type(param.declared_type));
                stanza.entity_flags(&param.entity);
            }
        }
        ElementRef::LocalVariable(id) => {
            if let Some(local) = repository.local_variable(id) {
                stanza.class("LocalVariable");
                stanza.string("name", &local.entity.name);
                if let Some(parent) = local.parent {
                    stanza.reference("parentBehaviouralEntity", ElementRef::Method(parent));
                }
                stanza.reference("declaredType", ElementRef::Type(local.declared_type));
                stanza.entity_flags(&local.entity);
            }
        }
        ElementRef::Inheritance(id) => {
            if let Some(edge) = repository.inheritance(id) {
                stanza.class("Inheritance");
                stanza.reference("subclass", ElementRef::Type(edge.subclass));
                stanza.reference("superclass", ElementRef::Type(edge.superclass));
            }
        }
        ElementRef::Invocation(id) => {
            if let Some(edge) = repository.invocation(id) {
                stanza.class("Invocation");
                if let Some(sender) = edge.sender {
                    stanza.reference("sender", ElementRef::Method(sender));
                }
                stanza.references(
                    "candidates",
                    edge.candidates.iter().map(|m| ElementRef::Method(*m)),
                );
                stanza.string("signature", &edge.signature);
            }
        }
        ElementRef::Access(id) => {
            if let Some(edge) = repository.access(id) {
                stanza.class("Access");
                if let Some(accessor) = edge.accessor {
                    stanza.reference("accessor", ElementRef::Method(accessor));
                }
                if let Some(variable) = edge.variable {
                    stanza.reference("variable", structural_element(variable));
                }
                stanza.boolean("isWrite", edge.is_write);
            }
        }
    }
}

fn container_element(container: ContainerRef) -> ElementRef {
    match container {
        ContainerRef::Namespace(id) => ElementRef::Namespace(id),
        ContainerRef::Type(id) => ElementRef::Type(id),
        ContainerRef::Method(id) => ElementRef::Method(id),
    }
}

fn structural_element(variable: StructuralRef) -> ElementRef {
    match variable {
        StructuralRef::Attribute(id) => ElementRef::Attribute(id),
        StructuralRef::Parameter(id) => ElementRef::Parameter(id),
    }
}

/// Quote a string, doubling embedded single quotes.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

// ============================================================================
// Stanza Builder
// ============================================================================

struct Stanza<'a> {
    ids: &'a HashMap<ElementRef, usize>,
    id: usize,
    class: &'static str,
    properties: Vec<String>,
}

impl<'a> Stanza<'a> {
    fn new(ids: &'a HashMap<ElementRef, usize>, element: ElementRef) -> Self {
        Stanza {
            ids,
            id: ids.get(&element).copied().unwrap_or(0),
            class: "Entity",
            properties: Vec::new(),
        }
    }

    fn class(&mut self, class: &'static str) {
        self.class = class;
    }

    fn string(&mut self, name: &str, value: &str) {
        self.properties.push(format!("({} {})", name, quote(value)));
    }

    fn boolean(&mut self, name: &str, value: bool) {
        self.properties.push(format!("({} {})", name, value));
    }

    fn reference(&mut self, name: &str, target: ElementRef) {
        if let Some(id) = self.ids.get(&target) {
            self.properties.push(format!("({} (ref: {}))", name, id));
        }
    }

    fn references(&mut self, name: &str, targets: impl Iterator<Item = ElementRef>) {
        let refs: Vec<String> = targets
            .filter_map(|target| self.ids.get(&target))
            .map(|id| format!("(ref: {})", id))
            .collect();
        if !refs.is_empty() {
            self.properties.push(format!("({} {})", name, refs.join(" ")));
        }
    }

    fn named(&mut self, entity: &NamedEntity) {
        self.string("name", &entity.name);
        self.entity_flags(entity);
    }

    fn entity_flags(&mut self, entity: &NamedEntity) {
        self.boolean("isStub", entity.is_stub);
        self.modifiers(&entity.modifiers);
    }

    fn modifiers(&mut self, modifiers: &BTreeSet<Modifier>) {
        if modifiers.is_empty() {
            return;
        }
        let quoted: Vec<String> = modifiers.iter().map(|m| quote(m.as_str())).collect();
        self.properties
            .push(format!("(modifiers {})", quoted.join(" ")));
    }

    fn finish(self) -> String {
        let mut line = format!("(FAMIX.{} (id: {})", self.class, self.id);
        for property in &self.properties {
            line.push(' ');
            line.push_str(property);
        }
        line.push(')');
        line
    }
}

// ============================================================================
// Tests
// ============================================================================
