//! Scope stack: the chain of open declarations during traversal.

use crate::model::{ContainerRef, MethodId, NamespaceId, TypeId};
use tracing::warn;

/// Stack of lexical containers, innermost last.
///
/// The driver pushes when it enters a package, type or method declaration and
/// pops when it leaves it. The stack is empty outside any declaration.
#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    frames: Vec<ContainerRef>,
}

impl ScopeStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a container.
    pub fn push(&mut self, container: impl Into<ContainerRef>) {
        self.frames.push(container.into());
    }

    /// Leave the innermost container.
    ///
    /// Returns `None` (and logs) on underflow, which means the driver's
    /// enter/exit calls are unbalanced.
    pub fn pop(&mut self) -> Option<ContainerRef> {
        let popped = self.frames.pop();
        if popped.is_none() {
            warn!("scope stack underflow: pop without matching push");
        }
        popped
    }

    /// The innermost open container.
    pub fn current(&self) -> Option<ContainerRef> {
        self.frames.last().copied()
    }

    /// The innermost container if it is a method.
    pub fn current_method(&self) -> Option<MethodId> {
        match self.current() {
            Some(ContainerRef::Method(id)) => Some(id),
            _ => None,
        }
    }

    /// The innermost container if it is a type.
    pub fn current_type(&self) -> Option<TypeId> {
        match self.current() {
            Some(ContainerRef::Type(id)) => Some(id),
            _ => None,
        }
    }

    /// The innermost open namespace, at any depth.
    pub fn enclosing_namespace(&self) -> Option<NamespaceId> {
        self.frames.iter().rev().find_map(|frame| match frame {
            ContainerRef::Namespace(id) => Some(*id),
            _ => None,
        })
    }

    /// Number of open containers.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Check if no container is open.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Open containers from outermost to innermost.
    pub fn frames(&self) -> &[ContainerRef] {
        &self.frames
    }
}

// ============================================================================
// Tests
// ============================================================================
