use scenegate::engine::{EngineOption, OptionSet, SourcePrecedence};
use scenegate::{from_compiled_units, from_packaged_binary, from_source_files, IrForm, SourceConfig};
use std::path::PathBuf;

fn effective(config: &SourceConfig) -> OptionSet {
    let mut options = OptionSet::default();
    for option in config.engine_options() {
        options.apply(option).expect("layered options apply cleanly");
    }
    options
}

#[test]
fn test_compiled_units_layering() {
    let options = effective(&from_compiled_units("units", "dep"));

    assert!(!options.verbose);
    assert!(options.keep_line_numbers);
    assert!(options.allow_phantom_refs);
    assert!(options.prepend_classpath);
    assert_eq!(options.process_dirs, vec![PathBuf::from("units")]);
    assert_eq!(options.classpath, "units:dep");
    assert_eq!(
        options.source_precedence,
        Some(SourcePrecedence::CompiledUnits)
    );
    // configurations never choose the output format
    assert_eq!(options.output_format, IrForm::ThreeAddress);
    assert!(!options.whole_program);
}

#[test]
fn test_source_files_layering_differs_only_in_precedence() {
    let compiled = effective(&from_compiled_units("dir", "cp"));
    let source = effective(&from_source_files("dir", "cp"));

    assert_eq!(source.source_precedence, Some(SourcePrecedence::SourceFiles));

    let mut source_as_compiled = source.clone();
    source_as_compiled.source_precedence = compiled.source_precedence;
    assert_eq!(source_as_compiled, compiled);
}

#[test]
fn test_packaged_binary_layering() {
    let options = effective(&from_packaged_binary("app.pack", "platform"));

    assert_eq!(
        options.source_precedence,
        Some(SourcePrecedence::PackagedBinary)
    );
    assert_eq!(options.platform_dir, Some(PathBuf::from("platform")));
    assert_eq!(options.process_dirs, vec![PathBuf::from("app.pack")]);
    // the classpath is derived from the platform dir and binary later
    assert!(options.classpath.is_empty());
    assert!(!options.prepend_classpath);
    assert!(options.keep_line_numbers);
    assert!(options.allow_phantom_refs);
}

#[test]
fn test_later_writes_override_earlier_ones() {
    let config = from_compiled_units("units", "");
    let mut options = OptionSet::default();
    options
        .apply(EngineOption::KeepLineNumbers(false))
        .unwrap();
    for option in config.engine_options() {
        options.apply(option).unwrap();
    }
    // the configuration's base layer applied last, so it wins
    assert!(options.keep_line_numbers);
}

#[test]
fn test_configure_twice_is_idempotent() {
    let config = from_source_files("src", "cp");
    let mut options = OptionSet::default();
    for option in config.engine_options() {
        options.apply(option).unwrap();
    }
    let first = options.clone();
    for option in config.engine_options() {
        options.apply(option).unwrap();
    }
    assert_eq!(options, first);
}

#[test]
fn test_empty_classpath_is_just_the_input_dir() {
    let options = effective(&from_compiled_units("units", ""));
    assert_eq!(options.classpath, "units");
}
