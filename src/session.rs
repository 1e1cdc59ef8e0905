//! Exclusive engine session
//!
//! The engine relies on process-wide global state and is not reentrant, so
//! this module is the single choke point through which it is ever driven.
//! Every operation runs the same sequence under one gate: acquire, reset,
//! configure, derive, execute, extract, reset, release. The second reset is
//! guaranteed on every exit path, so no options, loaded units, or results
//! ever leak from one operation into the next, even when an operation
//! fails partway.
//!
//! Note that exclusivity only covers callers going through a session; code
//! bypassing the session and driving an adapter directly is on its own.

use crate::engine::options::{CallGraphPolicy, EngineOption};
use crate::engine::{EngineAdapter, GlobalEngine};
use crate::error::Result;
use crate::graph::CallGraph;
use crate::ir::{IrForm, ProgramUnit};
use crate::source::SourceConfig;
use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex, PoisonError};

/// Gatekeeper serializing all logical operations against one engine
pub struct EngineSession {
    adapter: Arc<dyn EngineAdapter>,
    gate: Mutex<()>,
}

impl EngineSession {
    /// Create a session driving the given adapter. Exclusivity holds among
    /// all operations issued through this session.
    pub fn new(adapter: Arc<dyn EngineAdapter>) -> Self {
        Self {
            adapter,
            gate: Mutex::new(()),
        }
    }

    /// Loads units and produces the application's intermediate
    /// representation in the requested form.
    pub fn ir_units(&self, source: &SourceConfig, form: IrForm) -> Result<Vec<ProgramUnit>> {
        self.run_exclusive(source, &[EngineOption::OutputFormat(form)], |engine| {
            engine.application_units()
        })
    }

    /// Runs whole-program call-graph analysis with no distinguished entry
    /// point; every loaded unit is considered reachable.
    pub fn call_graph(&self, source: &SourceConfig) -> Result<CallGraph> {
        self.run_exclusive(
            source,
            &[
                EngineOption::WholeProgram(true),
                EngineOption::CallGraphPolicy(CallGraphPolicy::AllReachable),
            ],
            |engine| engine.call_graph(),
        )
    }

    /// Drive one logical operation through the full lifecycle while holding
    /// the gate.
    fn run_exclusive<T>(
        &self,
        source: &SourceConfig,
        request: &[EngineOption],
        extract: impl FnOnce(&dyn EngineAdapter) -> Result<T>,
    ) -> Result<T> {
        // At most one logical operation may touch the engine at a time. A
        // poisoned gate means an earlier holder panicked; the pre-reset
        // below discards whatever it left behind, so the gate is reclaimed.
        let _turn = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        let engine = self.adapter.as_ref();
        log::debug!("engine gate acquired");

        // Make sure previous state doesn't impact this run.
        engine.reset();
        // Resets again when dropped, on success and failure alike, before
        // the gate is released.
        let _cleanup = ResetOnRelease { engine };

        // The operation's own output options first, then the source
        // configuration's layered writes.
        for option in request {
            engine.set_option(option.clone())?;
        }
        for option in source.engine_options() {
            engine.set_option(option)?;
        }

        engine.derive_options()?;

        log::debug!("executing engine pipeline");
        engine.load_units()?;
        engine.run_pipeline()?;

        extract(engine)
    }
}

/// Scope guard restoring pristine engine state on every exit path
struct ResetOnRelease<'a> {
    engine: &'a dyn EngineAdapter,
}

impl Drop for ResetOnRelease<'_> {
    fn drop(&mut self) {
        self.engine.reset();
        log::debug!("engine reset before gate release");
    }
}

/// The process-wide default session, backing the convenience methods on
/// [`SourceConfig`]. It owns the process's [`GlobalEngine`] instance.
pub fn global_session() -> &'static EngineSession {
    static SESSION: Lazy<EngineSession> =
        Lazy::new(|| EngineSession::new(Arc::new(GlobalEngine::new())));
    &SESSION
}
