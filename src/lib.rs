//! Scenegate: a functional request interface over a non-reentrant
//! static-analysis engine
//!
//! The underlying engine keeps its configuration, loaded program model, and
//! results in process-wide mutable global state. This library wraps it in a
//! stateless-looking API: describe where the input comes from with a
//! [`SourceConfig`], then ask for an intermediate representation or a
//! whole-program call graph. An exclusive session serializes all operations
//! and resets the engine before and after each one, so unrelated callers
//! never observe each other's state.
//!
//! Note that exclusivity covers every caller going through the session; any
//! other code driving the engine adapter directly will destroy whatever
//! state is present.

pub mod engine;
pub mod error;
pub mod graph;
pub mod ir;
pub mod session;
pub mod source;

pub use error::{Error, Result};
pub use session::{global_session, EngineSession};
pub use source::{from_compiled_units, from_packaged_binary, from_source_files, SourceConfig};

// Re-export commonly used types
pub use engine::{
    CallGraphPolicy, EngineAdapter, EngineOption, GlobalEngine, OptionSet, SourcePrecedence,
};
pub use graph::{CallGraph, CallSite};
pub use ir::{IrForm, Method, MethodRef, ProgramUnit, Statement, StatementKind, UnitProvenance};
