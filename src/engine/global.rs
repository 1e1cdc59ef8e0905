//! The concrete engine adapter
//!
//! `GlobalEngine` owns the engine's mutable global state behind a private
//! mutex. Each trait call is individually consistent; making a whole
//! configure → load → run → extract sequence atomic is the exclusive
//! session's job.

use crate::engine::options::{EngineOption, OptionSet};
use crate::engine::scene::Scene;
use crate::engine::{loader, pipeline, EngineAdapter};
use crate::error::{Error, Result};
use crate::graph::CallGraph;
use crate::ir::ProgramUnit;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct EngineState {
    options: OptionSet,
    scene: Scene,
}

/// The one concrete [`EngineAdapter`] implementation
#[derive(Debug, Default)]
pub struct GlobalEngine {
    state: Mutex<EngineState>,
}

impl GlobalEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        // A poisoned lock still holds structurally valid state, and every
        // operation starts from a reset; reclaim it.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EngineAdapter for GlobalEngine {
    fn reset(&self) {
        let mut state = self.lock();
        *state = EngineState::default();
        log::debug!("engine state reset");
    }

    fn set_option(&self, option: EngineOption) -> Result<()> {
        self.lock().options.apply(option)
    }

    fn options(&self) -> OptionSet {
        self.lock().options.clone()
    }

    fn derive_options(&self) -> Result<()> {
        let mut state = self.lock();
        state.options.derive()?;
        state.scene.derived = true;
        Ok(())
    }

    fn load_units(&self) -> Result<()> {
        let mut state = self.lock();
        if !state.scene.derived {
            return Err(Error::internal("load requested before options were derived"));
        }
        let units = loader::load_scene(&state.options)?;
        if state.options.verbose {
            log::info!("loaded {} units", units.len());
        }
        state.scene.units = units;
        state.scene.loaded = true;
        Ok(())
    }

    fn run_pipeline(&self) -> Result<()> {
        let mut state = self.lock();
        if !state.scene.loaded {
            return Err(Error::internal("pipeline requested before units were loaded"));
        }
        let EngineState { options, scene } = &mut *state;
        scene.call_graph = pipeline::run(&mut scene.units, options);
        scene.ran = true;
        if options.verbose {
            log::info!("pipeline finished over {} units", scene.units.len());
        }
        Ok(())
    }

    fn application_units(&self) -> Result<Vec<ProgramUnit>> {
        let state = self.lock();
        if !state.scene.ran {
            return Err(Error::internal("results requested before the pipeline ran"));
        }
        Ok(state.scene.application_units())
    }

    fn call_graph(&self) -> Result<CallGraph> {
        let state = self.lock();
        if !state.scene.ran {
            return Err(Error::internal("results requested before the pipeline ran"));
        }
        state
            .scene
            .call_graph
            .clone()
            .ok_or_else(|| Error::configuration("call graph requires whole-program mode"))
    }
}
