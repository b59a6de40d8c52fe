//! Integration tests for `scenario_validator::validate_fs`.

use std::fs;
use std::path::Path;

use scenario_validator::{
    ConfigError, DiagnosticKind, FsSourceConfig, LoaderKind, Severity, ValidationConfig,
    validate_fs,
};
use tempfile::TempDir;

const MINIMAL_VALID: &str = "\
name: Open Settings
app: Settings
description: Opens the Settings app and checks the title.
steps:
  - launch: Settings
  - assert_visible: Settings
";

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn render_human(report: &scenario_validator::ValidationReport) -> String {
    let mut buf = Vec::new();
    scenario_validator::output::write_human(report, &mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn test_validate_fs_minimal_valid_file() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "apps/settings/open.yaml", MINIMAL_VALID);

    let report = validate_fs(
        &FsSourceConfig::for_root(tmp.path()),
        &ValidationConfig::default(),
    )
    .unwrap();

    assert_eq!(report.scanned_files, 1);
    assert!(report.ok, "unexpected diagnostics: {:?}", report.diagnostics);
    assert!(report.diagnostics.is_empty());
    assert_eq!(
        render_human(&report),
        "Validated 1 scenario files.\n\n\nAll checks passed.\n"
    );
}

#[test]
fn test_validate_fs_unknown_step_type_fails() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "apps/settings/open.yaml",
        &MINIMAL_VALID.replace("  - launch:", "  - tap_screen:"),
    );

    let report = validate_fs(
        &FsSourceConfig::for_root(tmp.path()),
        &ValidationConfig::default(),
    )
    .unwrap();

    assert!(!report.ok);
    assert_eq!(report.errors_count(), 1);
    assert_eq!(report.warnings_count(), 0);
    let error = report.errors().next().unwrap();
    assert_eq!(error.kind, DiagnosticKind::UnknownStepType);
    assert_eq!(
        error.format_human_readable(),
        format!(
            "  ERROR  {}: unknown step type 'tap_screen' at step 1",
            Path::new("apps/settings/open.yaml").display()
        )
    );
}

#[test]
fn test_validate_fs_no_scenario_dirs_is_config_error() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "docs/readme.yaml", MINIMAL_VALID);

    let err = validate_fs(
        &FsSourceConfig::for_root(tmp.path()),
        &ValidationConfig::default(),
    )
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::NoScenarioFiles(_))
    ));
    assert!(err.to_string().contains("No scenario files found"), "got: {err}");
}

#[test]
fn test_validate_fs_missing_root_errors() {
    let tmp = TempDir::new().unwrap();
    let err = validate_fs(
        &FsSourceConfig::for_root(tmp.path().join("does_not_exist")),
        &ValidationConfig::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("does not exist"), "got: {err}");
}

#[test]
fn test_validate_fs_warnings_alone_pass() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "testing/launch_only.yaml",
        &MINIMAL_VALID.replace("  - assert_visible: Settings\n", ""),
    );

    let report = validate_fs(
        &FsSourceConfig::for_root(tmp.path()),
        &ValidationConfig::default(),
    )
    .unwrap();

    assert!(report.ok);
    assert_eq!(report.warnings_count(), 1);
    let output = render_human(&report);
    assert!(output.contains("  WARN   "), "got: {output}");
    assert!(output.contains("\n1 warning(s)\n"), "got: {output}");
    assert!(output.ends_with("\nAll checks passed.\n"), "got: {output}");
}

#[test]
fn test_validate_fs_prints_warnings_before_errors_in_discovery_order() {
    let tmp = TempDir::new().unwrap();
    let no_assert = MINIMAL_VALID.replace("  - assert_visible: Settings\n", "");
    write(tmp.path(), "apps/a_error.yaml", "# nothing\n");
    write(tmp.path(), "apps/b_warn.yaml", &no_assert);
    write(tmp.path(), "testing/c_error.yaml", "name: only a name\n");
    write(tmp.path(), "workflows/d_warn.yaml", &no_assert);

    let report = validate_fs(
        &FsSourceConfig::for_root(tmp.path()),
        &ValidationConfig::default(),
    )
    .unwrap();

    assert_eq!(report.scanned_files, 4);
    assert!(!report.ok);

    let ordered: Vec<(Severity, String)> = report
        .ordered()
        .iter()
        .map(|d| {
            let name = d.file.file_name().unwrap().to_string_lossy().into_owned();
            (d.severity, name)
        })
        .collect();
    let expected: Vec<(Severity, String)> = [
        (Severity::Warning, "b_warn.yaml"),
        (Severity::Warning, "d_warn.yaml"),
        (Severity::Error, "a_error.yaml"),
        (Severity::Error, "c_error.yaml"),
        (Severity::Error, "c_error.yaml"),
        (Severity::Error, "c_error.yaml"),
    ]
    .into_iter()
    .map(|(s, n)| (s, n.to_owned()))
    .collect();
    assert_eq!(ordered, expected);

    let output = render_human(&report);
    assert!(output.starts_with("Validated 4 scenario files.\n\n"));
    assert!(output.contains("\n2 warning(s)\n4 error(s)\n"), "got: {output}");
    assert!(!output.contains("All checks passed."));
}

#[test]
fn test_validate_fs_malformed_file_does_not_stop_run() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "apps/broken.yaml", "key: [unclosed bracket\n");
    write(tmp.path(), "apps/fine.yaml", MINIMAL_VALID);

    let report = validate_fs(
        &FsSourceConfig::for_root(tmp.path()),
        &ValidationConfig::default(),
    )
    .unwrap();

    assert_eq!(report.scanned_files, 2);
    assert_eq!(report.errors_count(), 1);
    let error = report.errors().next().unwrap();
    assert_eq!(error.kind, DiagnosticKind::ParseFailure);
    assert!(error.message.starts_with("failed to parse: "));
}

#[test]
fn test_validate_fs_non_utf8_file_is_parse_failure() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("apps")).unwrap();
    fs::write(tmp.path().join("apps/binary.yaml"), [0xFF, 0xFE, 0x00, 0x80]).unwrap();

    let report = validate_fs(
        &FsSourceConfig::for_root(tmp.path()),
        &ValidationConfig::default(),
    )
    .unwrap();

    assert_eq!(report.errors_count(), 1);
    assert_eq!(report.diagnostics[0].kind, DiagnosticKind::ParseFailure);
}

#[test]
fn test_validate_fs_max_file_size_is_parse_failure() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "apps/big.yaml", MINIMAL_VALID);

    let mut fs_config = FsSourceConfig::for_root(tmp.path());
    fs_config.max_file_size = 10;
    let report = validate_fs(&fs_config, &ValidationConfig::default()).unwrap();

    assert!(!report.ok);
    assert!(report.diagnostics[0].message.contains("maximum size"));
}

#[test]
fn test_validate_fs_subset_loader_matches_yaml_loader() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "apps/settings/open.yaml", MINIMAL_VALID);
    write(
        tmp.path(),
        "workflows/morning.yaml",
        "\
name: Morning routine
app: Clock
description: |
  Turns off the alarm
  and checks the weather.
ios_min: \"17\"
locale: en-US
tags: [daily, routine]
steps:
  - launch: Clock
  - tap: ${ALARM_LABEL:-Alarm}
  - swipe: ${1bad}
  - wait_for: Weather
",
    );

    let fs_config = FsSourceConfig::for_root(tmp.path());
    let mut subset = ValidationConfig::default();
    subset.loader = LoaderKind::Subset;

    let full = validate_fs(&fs_config, &ValidationConfig::default()).unwrap();
    let narrow = validate_fs(&fs_config, &subset).unwrap();

    assert_eq!(full.diagnostics, narrow.diagnostics);
    let kinds: Vec<DiagnosticKind> = full.ordered().iter().map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        vec![
            DiagnosticKind::MissingAssertion,
            DiagnosticKind::MalformedVariable,
            DiagnosticKind::MalformedVersion,
            DiagnosticKind::MalformedLocale,
        ]
    );
}

#[test]
fn test_validate_fs_exclude_pattern() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "apps/fine.yaml", MINIMAL_VALID);
    write(tmp.path(), "apps/wip_broken.yaml", "# nothing yet\n");

    let mut fs_config = FsSourceConfig::for_root(tmp.path());
    let without = validate_fs(&fs_config, &ValidationConfig::default()).unwrap();
    assert!(!without.ok);

    fs_config.exclude = vec!["wip_*".to_owned()];
    let with = validate_fs(&fs_config, &ValidationConfig::default()).unwrap();
    assert_eq!(with.scanned_files, 1);
    assert!(with.ok);
}

#[test]
fn test_validate_fs_json_output_contract() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "apps/empty.yaml", "# nothing\n");

    let report = validate_fs(
        &FsSourceConfig::for_root(tmp.path()),
        &ValidationConfig::default(),
    )
    .unwrap();

    let mut buf = Vec::new();
    scenario_validator::output::write_json(&report, &mut buf).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();

    assert_eq!(json["scanned_files"], 1);
    assert_eq!(json["ok"], false);
    let diag = &json["diagnostics"][0];
    assert_eq!(diag["severity"], "error");
    assert_eq!(diag["kind"], "empty_document");
    assert_eq!(diag["message"], "empty or invalid document");
    assert!(diag["line"].is_null());
}

#[cfg(unix)]
#[test]
fn test_validate_fs_symlink_between_scenario_dirs_is_validated() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "apps/a.yaml", MINIMAL_VALID);
    fs::create_dir_all(tmp.path().join("workflows")).unwrap();
    std::os::unix::fs::symlink("../apps/a.yaml", tmp.path().join("workflows/a.yaml")).unwrap();

    let report = validate_fs(
        &FsSourceConfig::for_root(tmp.path()),
        &ValidationConfig::default(),
    )
    .unwrap();

    assert_eq!(report.scanned_files, 2);
    assert!(report.ok, "unexpected diagnostics: {:?}", report.diagnostics);
}

#[test]
fn test_validate_fs_no_files_with_invalid_exclude_is_config_error() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("apps")).unwrap();

    let mut fs_config = FsSourceConfig::for_root(tmp.path());
    fs_config.exclude = vec!["[unclosed".to_owned()];
    let err = validate_fs(&fs_config, &ValidationConfig::default()).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::NoScenarioFiles(_))
    ));
}

#[test]
fn test_validate_fs_bom_and_document_end_agree_across_loaders() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "apps/bom.yaml", &format!("\u{feff}{MINIMAL_VALID}"));
    write(tmp.path(), "apps/ended.yaml", &format!("{MINIMAL_VALID}...\n"));

    let fs_config = FsSourceConfig::for_root(tmp.path());
    let mut subset = ValidationConfig::default();
    subset.loader = LoaderKind::Subset;

    for config in [ValidationConfig::default(), subset] {
        let report = validate_fs(&fs_config, &config).unwrap();
        assert_eq!(report.scanned_files, 2);
        assert!(report.ok, "{}: {:?}", config.loader, report.diagnostics);
    }
}
