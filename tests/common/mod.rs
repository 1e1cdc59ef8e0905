#![allow(dead_code)]
//! Shared fixtures for integration tests

use scenegate::engine::{EngineAdapter, EngineOption, GlobalEngine, OptionSet, PACK_MAGIC};
use scenegate::{CallGraph, Error, ProgramUnit, Result};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Initialize logging for a test; safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn unit_manifest(name: &str, methods: Value) -> Value {
    json!({ "name": name, "methods": methods })
}

pub fn write_manifest(dir: &Path, file_name: &str, manifest: &Value) {
    std::fs::write(
        dir.join(file_name),
        serde_json::to_vec_pretty(manifest).expect("manifest serializes"),
    )
    .expect("fixture write succeeds");
}

/// Encode a pack file holding the given unit manifests
pub fn pack_bytes(units: &[Value]) -> Vec<u8> {
    let payload = serde_json::to_vec(units).expect("payload serializes");
    let mut data = Vec::new();
    data.extend_from_slice(&PACK_MAGIC.to_le_bytes());
    data.extend_from_slice(&1u32.to_le_bytes());
    data.extend_from_slice(&(units.len() as u32).to_le_bytes());
    data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    data.extend_from_slice(&payload);
    data
}

pub fn write_pack(path: &Path, units: &[Value]) {
    std::fs::write(path, pack_bytes(units)).expect("fixture write succeeds");
}

/// A unit with two methods where `m` calls `n`
pub fn two_method_unit() -> Value {
    unit_manifest(
        "app.Main",
        json!([
            { "name": "m", "line": 3, "body": [
                { "op": "assign", "target": "x", "value": "1", "line": 4 },
                { "op": "invoke", "target": "app.Main#n", "line": 5 },
                { "op": "return", "line": 6 }
            ]},
            { "name": "n", "line": 8, "body": [
                { "op": "return", "line": 9 }
            ]}
        ]),
    )
}

/// Adapter wrapper that measures call overlap and injects failures.
///
/// Each adapter call sleeps briefly while counting in-flight callers, so
/// two operations whose windows overlapped would be observed with a peak
/// above one.
pub struct ProbeEngine {
    inner: GlobalEngine,
    in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
    pub fail_next_pipeline: AtomicBool,
    pub resets: AtomicUsize,
}

impl ProbeEngine {
    pub fn new() -> Self {
        Self {
            inner: GlobalEngine::new(),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            fail_next_pipeline: AtomicBool::new(false),
            resets: AtomicUsize::new(0),
        }
    }

    fn observe<T>(&self, call: impl FnOnce() -> T) -> T {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(2));
        let result = call();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl Default for ProbeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineAdapter for ProbeEngine {
    fn reset(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
        self.observe(|| self.inner.reset())
    }

    fn set_option(&self, option: EngineOption) -> Result<()> {
        self.observe(|| self.inner.set_option(option))
    }

    fn options(&self) -> OptionSet {
        self.inner.options()
    }

    fn derive_options(&self) -> Result<()> {
        self.observe(|| self.inner.derive_options())
    }

    fn load_units(&self) -> Result<()> {
        self.observe(|| self.inner.load_units())
    }

    fn run_pipeline(&self) -> Result<()> {
        if self.fail_next_pipeline.swap(false, Ordering::SeqCst) {
            return Err(Error::analysis("injected pipeline failure"));
        }
        self.observe(|| self.inner.run_pipeline())
    }

    fn application_units(&self) -> Result<Vec<ProgramUnit>> {
        self.observe(|| self.inner.application_units())
    }

    fn call_graph(&self) -> Result<CallGraph> {
        self.observe(|| self.inner.call_graph())
    }
}
