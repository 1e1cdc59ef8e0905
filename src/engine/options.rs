//! Engine option registry
//!
//! The engine's global configuration as a typed struct. `OptionSet::default()`
//! is the pristine state the reset primitive restores. Individual options are
//! written one at a time through [`EngineOption`] values; later writes win,
//! except for the source precedence which may only be set once per
//! configuration epoch.

use crate::error::{Error, Result};
use crate::ir::IrForm;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Which artifact kind provides unit definitions when several are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourcePrecedence {
    /// Definitions come from a packaged binary artifact
    PackagedBinary,
    /// Prefer compiled unit files over source files
    CompiledUnits,
    /// Prefer source files over compiled unit files
    SourceFiles,
}

impl fmt::Display for SourcePrecedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourcePrecedence::PackagedBinary => "packaged-binary",
            SourcePrecedence::CompiledUnits => "compiled-units",
            SourcePrecedence::SourceFiles => "source-files",
        };
        f.write_str(name)
    }
}

/// How call-graph construction decides reachability.
///
/// The two modes have different completeness trade-offs and are kept
/// distinct: `AllReachable` treats every loaded unit as reachable,
/// `FromEntryPoints` only follows calls from configured entry points (and
/// with none configured it reaches nothing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CallGraphPolicy {
    FromEntryPoints,
    AllReachable,
}

/// One named-option write against the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineOption {
    Verbose(bool),
    KeepLineNumbers(bool),
    AllowPhantomRefs(bool),
    OutputFormat(IrForm),
    SourcePrecedence(SourcePrecedence),
    ProcessDirs(Vec<PathBuf>),
    Classpath(String),
    PrependClasspath(bool),
    PlatformDir(PathBuf),
    WholeProgram(bool),
    CallGraphPolicy(CallGraphPolicy),
}

/// The engine's global option registry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionSet {
    pub verbose: bool,
    pub keep_line_numbers: bool,
    pub allow_phantom_refs: bool,
    pub output_format: IrForm,
    pub source_precedence: Option<SourcePrecedence>,
    /// Directories (or packaged binaries) holding the application's units
    pub process_dirs: Vec<PathBuf>,
    /// Colon-separated classpath used to resolve references
    pub classpath: String,
    pub prepend_classpath: bool,
    /// Platform library directory for packaged-binary inputs
    pub platform_dir: Option<PathBuf>,
    pub whole_program: bool,
    pub call_graph_policy: CallGraphPolicy,
}

impl Default for OptionSet {
    fn default() -> Self {
        Self {
            verbose: false,
            keep_line_numbers: false,
            allow_phantom_refs: false,
            output_format: IrForm::ThreeAddress,
            source_precedence: None,
            process_dirs: Vec::new(),
            classpath: String::new(),
            prepend_classpath: false,
            platform_dir: None,
            whole_program: false,
            call_graph_policy: CallGraphPolicy::FromEntryPoints,
        }
    }
}

impl OptionSet {
    /// Apply a single option write. Later writes override earlier ones,
    /// except that the source precedence may not change once set.
    pub fn apply(&mut self, option: EngineOption) -> Result<()> {
        match option {
            EngineOption::Verbose(value) => self.verbose = value,
            EngineOption::KeepLineNumbers(value) => self.keep_line_numbers = value,
            EngineOption::AllowPhantomRefs(value) => self.allow_phantom_refs = value,
            EngineOption::OutputFormat(form) => self.output_format = form,
            EngineOption::SourcePrecedence(precedence) => match self.source_precedence {
                Some(existing) if existing != precedence => {
                    return Err(Error::configuration(format!(
                        "source precedence already set to {existing}, refusing {precedence}"
                    )));
                }
                _ => self.source_precedence = Some(precedence),
            },
            EngineOption::ProcessDirs(dirs) => self.process_dirs = dirs,
            EngineOption::Classpath(classpath) => self.classpath = classpath,
            EngineOption::PrependClasspath(value) => self.prepend_classpath = value,
            EngineOption::PlatformDir(dir) => self.platform_dir = Some(dir),
            EngineOption::WholeProgram(value) => self.whole_program = value,
            EngineOption::CallGraphPolicy(policy) => self.call_graph_policy = policy,
        }
        Ok(())
    }

    /// Compute options that depend on the ones already set and validate the
    /// combination. Runs once per operation, after configuration.
    pub fn derive(&mut self) -> Result<()> {
        if self.source_precedence.is_none() {
            self.source_precedence = Some(SourcePrecedence::CompiledUnits);
        }
        let precedence = self
            .source_precedence
            .unwrap_or(SourcePrecedence::CompiledUnits);

        match precedence {
            SourcePrecedence::PackagedBinary => {
                let platform = self.platform_dir.as_ref().ok_or_else(|| {
                    Error::configuration(
                        "packaged-binary precedence requires a platform library directory",
                    )
                })?;
                if self.classpath.is_empty() {
                    // Derived classpath: the platform libraries followed by
                    // the binary itself.
                    let mut entries = vec![platform.display().to_string()];
                    entries.extend(self.process_dirs.iter().map(|p| p.display().to_string()));
                    self.classpath = entries.join(":");
                }
            }
            SourcePrecedence::CompiledUnits | SourcePrecedence::SourceFiles => {
                if self.platform_dir.is_some() {
                    return Err(Error::configuration(
                        "platform library directory conflicts with directory-based source precedence",
                    ));
                }
            }
        }

        if self.process_dirs.is_empty() {
            return Err(Error::configuration("no input artifacts configured"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_pristine_defaults() {
        let options = OptionSet::default();
        assert!(!options.verbose);
        assert!(!options.keep_line_numbers);
        assert!(!options.allow_phantom_refs);
        assert_eq!(options.output_format, IrForm::ThreeAddress);
        assert!(options.source_precedence.is_none());
        assert!(!options.whole_program);
        assert_eq!(options.call_graph_policy, CallGraphPolicy::FromEntryPoints);
    }

    #[test]
    fn test_last_applied_wins() {
        let mut options = OptionSet::default();
        options.apply(EngineOption::Verbose(true)).unwrap();
        options.apply(EngineOption::Verbose(false)).unwrap();
        assert!(!options.verbose);

        options
            .apply(EngineOption::OutputFormat(IrForm::Ssa))
            .unwrap();
        options
            .apply(EngineOption::OutputFormat(IrForm::ThreeAddress))
            .unwrap();
        assert_eq!(options.output_format, IrForm::ThreeAddress);
    }

    #[test]
    fn test_precedence_set_twice_same_value_is_idempotent() {
        let mut options = OptionSet::default();
        options
            .apply(EngineOption::SourcePrecedence(
                SourcePrecedence::CompiledUnits,
            ))
            .unwrap();
        options
            .apply(EngineOption::SourcePrecedence(
                SourcePrecedence::CompiledUnits,
            ))
            .unwrap();
        assert_eq!(
            options.source_precedence,
            Some(SourcePrecedence::CompiledUnits)
        );
    }

    #[test]
    fn test_precedence_conflict_is_configuration_error() {
        let mut options = OptionSet::default();
        options
            .apply(EngineOption::SourcePrecedence(
                SourcePrecedence::CompiledUnits,
            ))
            .unwrap();
        let err = options
            .apply(EngineOption::SourcePrecedence(SourcePrecedence::SourceFiles))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_derive_defaults_precedence_to_compiled_units() {
        let mut options = OptionSet::default();
        options
            .apply(EngineOption::ProcessDirs(vec![PathBuf::from("units")]))
            .unwrap();
        options.derive().unwrap();
        assert_eq!(
            options.source_precedence,
            Some(SourcePrecedence::CompiledUnits)
        );
    }

    #[test]
    fn test_derive_computes_packaged_binary_classpath() {
        let mut options = OptionSet::default();
        options
            .apply(EngineOption::SourcePrecedence(
                SourcePrecedence::PackagedBinary,
            ))
            .unwrap();
        options
            .apply(EngineOption::PlatformDir(PathBuf::from("platform")))
            .unwrap();
        options
            .apply(EngineOption::ProcessDirs(vec![PathBuf::from("app.pack")]))
            .unwrap();
        options.derive().unwrap();
        assert_eq!(
            options.classpath,
            format!(
                "{}:{}",
                Path::new("platform").display(),
                Path::new("app.pack").display()
            )
        );
    }

    #[test]
    fn test_derive_rejects_conflicting_artifact_locations() {
        let mut options = OptionSet::default();
        options
            .apply(EngineOption::SourcePrecedence(SourcePrecedence::SourceFiles))
            .unwrap();
        options
            .apply(EngineOption::PlatformDir(PathBuf::from("platform")))
            .unwrap();
        options
            .apply(EngineOption::ProcessDirs(vec![PathBuf::from("src")]))
            .unwrap();
        let err = options.derive().unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_derive_requires_input_artifacts() {
        let mut options = OptionSet::default();
        let err = options.derive().unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_derive_keeps_explicit_classpath() {
        let mut options = OptionSet::default();
        options
            .apply(EngineOption::SourcePrecedence(
                SourcePrecedence::PackagedBinary,
            ))
            .unwrap();
        options
            .apply(EngineOption::PlatformDir(PathBuf::from("platform")))
            .unwrap();
        options
            .apply(EngineOption::ProcessDirs(vec![PathBuf::from("app.pack")]))
            .unwrap();
        options
            .apply(EngineOption::Classpath("explicit".to_string()))
            .unwrap();
        options.derive().unwrap();
        assert_eq!(options.classpath, "explicit");
    }
}
