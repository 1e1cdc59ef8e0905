//! Source configurations
//!
//! An immutable description of where analysis input comes from and how the
//! engine's options must be set for that input kind. Construction never
//! touches engine state; configurations are freely shareable across threads.
//!
//! The option layering replaces the usual deep-inheritance scheme with an
//! ordered list of layer functions applied base-to-derived, so a more
//! specific layer always overrides a more general one.

use crate::engine::options::{EngineOption, SourcePrecedence};
use crate::error::Result;
use crate::graph::CallGraph;
use crate::ir::{IrForm, ProgramUnit};
use crate::session;
use std::path::{Path, PathBuf};

/// An immutable analysis input description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    kind: SourceKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SourceKind {
    PackagedBinary {
        binary: PathBuf,
        platform_dir: PathBuf,
    },
    CompiledUnits {
        units_dir: PathBuf,
        class_path: String,
    },
    SourceFiles {
        source_dir: PathBuf,
        class_path: String,
    },
}

/// Load units from a packaged binary and a matching platform library
/// directory. Operates on the units inside the binary.
pub fn from_packaged_binary(
    binary: impl Into<PathBuf>,
    platform_library_dir: impl Into<PathBuf>,
) -> SourceConfig {
    SourceConfig {
        kind: SourceKind::PackagedBinary {
            binary: binary.into(),
            platform_dir: platform_library_dir.into(),
        },
    }
}

/// Operate on source unit files in `source_dir` and load dependencies from
/// the classpath provided.
pub fn from_source_files(
    source_dir: impl Into<PathBuf>,
    class_path: impl Into<String>,
) -> SourceConfig {
    SourceConfig {
        kind: SourceKind::SourceFiles {
            source_dir: source_dir.into(),
            class_path: class_path.into(),
        },
    }
}

/// Operate on compiled unit files in `units_dir` and load dependencies from
/// the classpath provided.
pub fn from_compiled_units(
    units_dir: impl Into<PathBuf>,
    class_path: impl Into<String>,
) -> SourceConfig {
    SourceConfig {
        kind: SourceKind::CompiledUnits {
            units_dir: units_dir.into(),
            class_path: class_path.into(),
        },
    }
}

impl SourceConfig {
    /// The option writes for this configuration, in base-to-derived order.
    /// Applying them in order reproduces the layered override semantics:
    /// later writes win.
    pub fn engine_options(&self) -> Vec<EngineOption> {
        let mut options = Vec::new();
        base_layer(&mut options);
        match &self.kind {
            SourceKind::PackagedBinary {
                binary,
                platform_dir,
            } => packaged_binary_layer(&mut options, binary, platform_dir),
            SourceKind::CompiledUnits {
                units_dir,
                class_path,
            } => {
                directory_layer(&mut options, units_dir, class_path);
                // Prefer definitions from compiled unit files over source files
                options.push(EngineOption::SourcePrecedence(
                    SourcePrecedence::CompiledUnits,
                ));
            }
            SourceKind::SourceFiles {
                source_dir,
                class_path,
            } => {
                directory_layer(&mut options, source_dir, class_path);
                // Prefer definitions from source files over compiled unit files
                options.push(EngineOption::SourcePrecedence(SourcePrecedence::SourceFiles));
            }
        }
        options
    }

    /// Loads units and produces the three-address intermediate
    /// representation of the application.
    pub fn three_address_units(&self) -> Result<Vec<ProgramUnit>> {
        session::global_session().ir_units(self, IrForm::ThreeAddress)
    }

    /// Loads units and produces the SSA intermediate representation of the
    /// application.
    pub fn ssa_units(&self) -> Result<Vec<ProgramUnit>> {
        session::global_session().ir_units(self, IrForm::Ssa)
    }

    /// Runs whole-program call-graph analysis without a distinguished entry
    /// point; all loaded code is considered reachable.
    pub fn call_graph(&self) -> Result<CallGraph> {
        session::global_session().call_graph(self)
    }
}

/// Defaults shared by every input kind
fn base_layer(options: &mut Vec<EngineOption>) {
    options.push(EngineOption::Verbose(false));
    // we need to link statements to source lines for display
    options.push(EngineOption::KeepLineNumbers(true));
    // called methods without a definition on the classpath become phantoms
    options.push(EngineOption::AllowPhantomRefs(true));
}

/// Shared settings for directory-based inputs
fn directory_layer(options: &mut Vec<EngineOption>, dir: &Path, class_path: &str) {
    // Include the ambient default runtime classpath.
    options.push(EngineOption::PrependClasspath(true));
    options.push(EngineOption::ProcessDirs(vec![dir.to_path_buf()]));
    // The input directory itself goes on the classpath.
    let classpath = if class_path.is_empty() {
        dir.display().to_string()
    } else {
        format!("{}:{}", dir.display(), class_path)
    };
    options.push(EngineOption::Classpath(classpath));
}

fn packaged_binary_layer(options: &mut Vec<EngineOption>, binary: &Path, platform_dir: &Path) {
    // Prefer definitions from the packaged binary over anything else
    options.push(EngineOption::SourcePrecedence(
        SourcePrecedence::PackagedBinary,
    ));
    options.push(EngineOption::PlatformDir(platform_dir.to_path_buf()));
    options.push(EngineOption::ProcessDirs(vec![binary.to_path_buf()]));
}
