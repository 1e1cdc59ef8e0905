//! Intermediate-representation data model
//!
//! These are the values handed back to callers. They are plain owned data,
//! decoupled from the engine's live scene, so they stay valid after the
//! engine resets.

use serde::Serialize;
use std::fmt;

/// The two intermediate-representation flavors the engine can produce.
///
/// Both cover the same program units; they differ in how control flow over
/// assignments is encoded. `ThreeAddress` leaves assignment targets
/// unversioned, `Ssa` gives every assignment a fresh version of its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IrForm {
    ThreeAddress,
    Ssa,
}

/// Where a loaded unit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnitProvenance {
    /// Loaded from a configured input artifact; these are the units callers
    /// asked to analyze.
    Application,
    /// Loaded from the classpath to resolve references.
    Library,
    /// Synthesized placeholder for a tolerated unresolved reference.
    Phantom,
}

/// Reference to a method within a unit, rendered as `unit#method`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MethodRef {
    pub unit: String,
    pub name: String,
}

impl MethodRef {
    pub fn new(unit: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            name: name.into(),
        }
    }

    /// Parse a `unit#method` reference string
    pub fn parse(reference: &str) -> Option<Self> {
        let (unit, name) = reference.split_once('#')?;
        if unit.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(unit, name))
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.unit, self.name)
    }
}

/// A single statement in a method body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    /// Position of the statement within its method body
    pub index: u32,
    pub kind: StatementKind,
    /// Source line, present only when line-number tracking is on
    pub line: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StatementKind {
    /// Assignment to a local; `version` is populated in SSA form only
    Assign {
        target: String,
        version: Option<u32>,
        value: String,
    },
    /// Call site targeting another method
    Invoke { target: MethodRef },
    Return,
}

/// A method of a loaded program unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Method {
    pub name: String,
    pub line: Option<u32>,
    pub body: Vec<Statement>,
}

impl Method {
    /// Iterate over the call targets of this method's body
    pub fn invoked_targets(&self) -> impl Iterator<Item = &MethodRef> {
        self.body.iter().filter_map(|stmt| match &stmt.kind {
            StatementKind::Invoke { target } => Some(target),
            _ => None,
        })
    }
}

/// A loaded program unit in the requested intermediate-representation form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramUnit {
    pub name: String,
    pub provenance: UnitProvenance,
    /// The form the unit's method bodies are encoded in
    pub form: IrForm,
    pub methods: Vec<Method>,
}

impl ProgramUnit {
    /// Look up a method by name
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(|m| m.name.as_str())
    }
}
