//! Engine adapter boundary
//!
//! The engine is a process-wide mutable singleton: one live option registry,
//! one live scene, one live result, all existing only between reset points.
//! [`EngineAdapter`] is the only doorway to that state. The expected
//! lifecycle per operation is
//! reset → set options → derive → load → run → read result → reset;
//! adapters report out-of-sequence use as errors rather than returning stale
//! results.
//!
//! [`GlobalEngine`] is the concrete implementation. Test code can substitute
//! any other implementation of the trait.

pub mod global;
pub mod manifest;
pub mod options;
pub mod pack;

pub(crate) mod loader;
pub(crate) mod pipeline;
pub(crate) mod scene;

pub use global::GlobalEngine;
pub use loader::{COMPILED_EXTENSION, RUNTIME_CLASSPATH_ENV, SOURCE_EXTENSION};
pub use options::{CallGraphPolicy, EngineOption, OptionSet, SourcePrecedence};
pub use pack::{PackFile, PackHeader, PACK_EXTENSION, PACK_MAGIC};

use crate::error::Result;
use crate::graph::CallGraph;
use crate::ir::ProgramUnit;

/// Driver interface over the engine's global state.
///
/// Implementations guard their own state internally, but nothing here makes
/// a multi-call sequence atomic; callers must hold the exclusive session
/// gate for the whole configure → run → extract → reset window.
pub trait EngineAdapter: Send + Sync {
    /// Force the engine back to pristine state: no options, no loaded
    /// units, no results. Total and infallible.
    fn reset(&self);

    /// Write a single named option into the global registry
    fn set_option(&self, option: EngineOption) -> Result<()>;

    /// Snapshot of the current option registry
    fn options(&self) -> OptionSet;

    /// Compute options that depend on the ones already set and validate
    /// the combination
    fn derive_options(&self) -> Result<()>;

    /// Run the class-loading phase according to the configured options
    fn load_units(&self) -> Result<()>;

    /// Run transformations and analyses over the loaded scene
    fn run_pipeline(&self) -> Result<()>;

    /// The loaded application-level units, decoupled from the live scene
    fn application_units(&self) -> Result<Vec<ProgramUnit>>;

    /// The computed call graph, decoupled from the live scene
    fn call_graph(&self) -> Result<CallGraph>;
}
