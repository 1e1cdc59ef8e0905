//! Class-loading phase
//!
//! Loads unit definitions from the configured input artifacts and the
//! classpath: application units from the process dirs, library units from
//! classpath entries, and phantom placeholders for tolerated unresolved
//! references. Artifact discovery is deterministic (name order) so loaded
//! scenes are reproducible.

use crate::engine::manifest::UnitManifest;
use crate::engine::options::{OptionSet, SourcePrecedence};
use crate::engine::pack::{PackFile, PACK_EXTENSION};
use crate::error::{Error, Result};
use crate::ir::{IrForm, Method, ProgramUnit, UnitProvenance};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Environment variable naming the ambient default runtime classpath,
/// colon-separated. Consulted only when classpath prepending is on.
pub const RUNTIME_CLASSPATH_ENV: &str = "SCENEGATE_RUNTIME_PATH";

/// Extension of compiled unit files
pub const COMPILED_EXTENSION: &str = "unit";

/// Extension of source unit files
pub const SOURCE_EXTENSION: &str = "src";

/// Load the full scene for the given option set.
pub(crate) fn load_scene(options: &OptionSet) -> Result<Vec<ProgramUnit>> {
    let precedence = options
        .source_precedence
        .ok_or_else(|| Error::internal("source precedence not derived before loading"))?;

    let mut units: Vec<ProgramUnit> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    // Application units from the configured input artifacts.
    for input in &options.process_dirs {
        let loaded = match precedence {
            SourcePrecedence::PackagedBinary => load_pack(input, UnitProvenance::Application)?,
            _ => load_dir(input, precedence, UnitProvenance::Application)?,
        };
        absorb(&mut units, &mut seen, loaded);
    }

    // Library units from the classpath. The first definition of a unit wins,
    // so application units shadow library units of the same name.
    for entry in classpath_entries(options) {
        let path = PathBuf::from(&entry);
        if options.process_dirs.iter().any(|input| *input == path) {
            // Input artifacts routinely appear on their own classpath;
            // they are already loaded as application units.
            continue;
        }
        let loaded = if has_extension(&path, PACK_EXTENSION) {
            load_pack(&path, UnitProvenance::Library)?
        } else {
            load_dir(&path, precedence, UnitProvenance::Library)?
        };
        absorb(&mut units, &mut seen, loaded);
    }

    resolve_references(&mut units, options.allow_phantom_refs)?;

    if !options.keep_line_numbers {
        strip_line_numbers(&mut units);
    }

    log::debug!(
        "scene loaded: {} units ({} application)",
        units.len(),
        units
            .iter()
            .filter(|u| u.provenance == UnitProvenance::Application)
            .count()
    );
    Ok(units)
}

fn absorb(units: &mut Vec<ProgramUnit>, seen: &mut HashSet<String>, loaded: Vec<ProgramUnit>) {
    for unit in loaded {
        if seen.insert(unit.name.clone()) {
            units.push(unit);
        } else {
            log::debug!("unit {} already loaded, skipping duplicate", unit.name);
        }
    }
}

/// Effective classpath entries: the ambient runtime classpath (when
/// prepending is on) followed by the configured classpath.
fn classpath_entries(options: &OptionSet) -> Vec<String> {
    let mut entries = Vec::new();
    if options.prepend_classpath {
        if let Ok(runtime) = std::env::var(RUNTIME_CLASSPATH_ENV) {
            entries.extend(
                runtime
                    .split(':')
                    .filter(|segment| !segment.is_empty())
                    .map(str::to_string),
            );
        }
    }
    entries.extend(
        options
            .classpath
            .split(':')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string),
    );
    entries
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(extension)
}

fn load_pack(path: &Path, provenance: UnitProvenance) -> Result<Vec<ProgramUnit>> {
    if !path.is_file() {
        return Err(Error::resolution(
            path.display().to_string(),
            "pack file does not exist",
        ));
    }
    let data = std::fs::read(path).map_err(|e| {
        Error::resolution(
            path.display().to_string(),
            format!("failed to read pack file: {e}"),
        )
    })?;
    let pack = PackFile::parse(&data)?;
    let origin = path.display().to_string();
    pack.units
        .iter()
        .map(|manifest| manifest.to_unit(provenance, &origin))
        .collect()
}

fn load_dir(
    dir: &Path,
    precedence: SourcePrecedence,
    provenance: UnitProvenance,
) -> Result<Vec<ProgramUnit>> {
    if !dir.is_dir() {
        let message = if dir.exists() {
            "not a directory"
        } else {
            "directory does not exist"
        };
        return Err(Error::resolution(dir.display().to_string(), message));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            Error::resolution(
                dir.display().to_string(),
                format!("failed to walk directory: {e}"),
            )
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if has_extension(path, COMPILED_EXTENSION)
            || has_extension(path, SOURCE_EXTENSION)
            || has_extension(path, PACK_EXTENSION)
        {
            files.push(entry.into_path());
        }
    }

    let parsed: Vec<Vec<(PathBuf, UnitManifest)>> = files
        .par_iter()
        .map(|path| parse_artifact(path))
        .collect::<Result<Vec<_>>>()?;

    arbitrate(
        parsed.into_iter().flatten().collect(),
        precedence,
        provenance,
    )
}

/// Parse one artifact into its unit manifests. Packs can hold several units,
/// unit and source files exactly one.
fn parse_artifact(path: &Path) -> Result<Vec<(PathBuf, UnitManifest)>> {
    if has_extension(path, PACK_EXTENSION) {
        let data = std::fs::read(path).map_err(|e| {
            Error::resolution(
                path.display().to_string(),
                format!("failed to read pack file: {e}"),
            )
        })?;
        let pack = PackFile::parse(&data)?;
        Ok(pack
            .units
            .into_iter()
            .map(|manifest| (path.to_path_buf(), manifest))
            .collect())
    } else {
        let data = std::fs::read(path).map_err(|e| {
            Error::resolution(
                path.display().to_string(),
                format!("failed to read unit manifest: {e}"),
            )
        })?;
        let manifest: UnitManifest = serde_json::from_slice(&data).map_err(|e| {
            Error::resolution(
                path.display().to_string(),
                format!("failed to parse unit manifest: {e}"),
            )
        })?;
        Ok(vec![(path.to_path_buf(), manifest)])
    }
}

/// Pick one definition per unit name when several artifacts define it,
/// honoring the source precedence.
fn arbitrate(
    parsed: Vec<(PathBuf, UnitManifest)>,
    precedence: SourcePrecedence,
    provenance: UnitProvenance,
) -> Result<Vec<ProgramUnit>> {
    let preferred = preferred_extension(precedence);

    let mut order: Vec<String> = Vec::new();
    let mut candidates: HashMap<String, Vec<(PathBuf, UnitManifest)>> = HashMap::new();
    for (path, manifest) in parsed {
        if !candidates.contains_key(&manifest.name) {
            order.push(manifest.name.clone());
        }
        candidates
            .entry(manifest.name.clone())
            .or_default()
            .push((path, manifest));
    }

    let mut units = Vec::with_capacity(order.len());
    for name in &order {
        let group = match candidates.remove(name) {
            Some(group) => group,
            None => continue,
        };
        let chosen = group
            .iter()
            .find(|(path, _)| has_extension(path, preferred))
            .unwrap_or(&group[0]);
        if group.len() > 1 {
            log::debug!(
                "unit {} defined by {} artifacts, preferring {}",
                name,
                group.len(),
                chosen.0.display()
            );
        }
        units.push(chosen.1.to_unit(provenance, &chosen.0.display().to_string())?);
    }
    Ok(units)
}

fn preferred_extension(precedence: SourcePrecedence) -> &'static str {
    match precedence {
        SourcePrecedence::PackagedBinary => PACK_EXTENSION,
        SourcePrecedence::CompiledUnits => COMPILED_EXTENSION,
        SourcePrecedence::SourceFiles => SOURCE_EXTENSION,
    }
}

/// Resolve every call target against the loaded units. Unresolved targets
/// become phantom placeholders when tolerated and resolution errors when not.
fn resolve_references(units: &mut Vec<ProgramUnit>, allow_phantom: bool) -> Result<()> {
    let mut index: HashMap<String, usize> = units
        .iter()
        .enumerate()
        .map(|(i, unit)| (unit.name.clone(), i))
        .collect();

    // Deterministic target order: scene order, deduplicated.
    let mut targets = Vec::new();
    let mut seen = HashSet::new();
    for unit in units.iter() {
        for method in &unit.methods {
            for target in method.invoked_targets() {
                if seen.insert(target.clone()) {
                    targets.push(target.clone());
                }
            }
        }
    }

    for target in targets {
        match index.get(&target.unit) {
            Some(&i) => {
                if units[i].method(&target.name).is_none() {
                    if !allow_phantom {
                        return Err(Error::resolution(
                            target.to_string(),
                            "unresolved method reference",
                        ));
                    }
                    log::warn!("synthesizing phantom method for {target}");
                    units[i].methods.push(Method {
                        name: target.name.clone(),
                        line: None,
                        body: Vec::new(),
                    });
                }
            }
            None => {
                if !allow_phantom {
                    return Err(Error::resolution(
                        target.to_string(),
                        "unresolved unit reference",
                    ));
                }
                log::warn!("synthesizing phantom unit for {target}");
                index.insert(target.unit.clone(), units.len());
                units.push(ProgramUnit {
                    name: target.unit.clone(),
                    provenance: UnitProvenance::Phantom,
                    form: IrForm::ThreeAddress,
                    methods: vec![Method {
                        name: target.name.clone(),
                        line: None,
                        body: Vec::new(),
                    }],
                });
            }
        }
    }
    Ok(())
}

fn strip_line_numbers(units: &mut [ProgramUnit]) {
    for unit in units {
        for method in &mut unit.methods {
            method.line = None;
            for statement in &mut method.body {
                statement.line = None;
            }
        }
    }
}
