//! Live engine state between reset points
//!
//! A scene only exists inside one configure → load → run → extract window;
//! the reset primitive discards it wholesale.

use crate::graph::CallGraph;
use crate::ir::{ProgramUnit, UnitProvenance};

#[derive(Debug, Default)]
pub(crate) struct Scene {
    /// Loaded units in insertion order: application first, then library,
    /// then synthesized phantoms
    pub units: Vec<ProgramUnit>,
    pub call_graph: Option<CallGraph>,
    pub derived: bool,
    pub loaded: bool,
    pub ran: bool,
}

impl Scene {
    /// Clone the application-level units out of the scene
    pub fn application_units(&self) -> Vec<ProgramUnit> {
        self.units
            .iter()
            .filter(|unit| unit.provenance == UnitProvenance::Application)
            .cloned()
            .collect()
    }
}
