//! Scenario rule engine.
//!
//! Each rule looks at one loaded document (or its raw text) and appends
//! diagnostics. Rules are independent: apart from the parse/empty gate, every
//! rule runs for every file and none depends on another's findings.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::config::ValidationConfig;
use crate::error::{Diagnostic, DiagnosticKind, LoadError};
use crate::loader::{ScenarioDocument, StepEntry, StepsField};

/// Step types the scenario runner understands.
pub const STEP_TYPES: &[&str] = &[
    "launch",
    "tap",
    "type",
    "swipe",
    "wait_for",
    "assert_visible",
    "assert_not_visible",
    "screenshot",
    "press_key",
    "press_home",
    "open_url",
    "shake",
    "remember",
];

/// Step types that count as an assertion.
pub const ASSERTION_STEP_TYPES: &[&str] = &["assert_visible", "assert_not_visible"];

/// Fields every scenario must define with a non-null value.
pub const REQUIRED_FIELDS: &[&str] = &["name", "app", "description", "steps"];

/// `MAJOR.MINOR` or `MAJOR.MINOR.PATCH`.
static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r"^\d+\.\d+(\.\d+)?$") {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid version regex: {err}"),
    }
});

/// `ll_RR`, e.g. `en_US`.
static LOCALE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r"^[a-z]{2}_[A-Z]{2}$") {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid locale regex: {err}"),
    }
});

/// Any `${...}` expression. The body may span lines; it stops at the first `}`.
static VARIABLE_EXPRESSION: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r"\$\{[^}]*\}") {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid variable expression regex: {err}"),
    }
});

/// A well-formed expression body: `NAME` or `NAME:-default`.
static VARIABLE_BODY: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(?::-[A-Za-z0-9_:/.\-]*)?$") {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid variable body regex: {err}"),
    }
});

/// Collects diagnostics for one file.
struct Findings {
    file: PathBuf,
    diagnostics: Vec<Diagnostic>,
}

impl Findings {
    fn new(file: &Path) -> Self {
        Self {
            file: file.to_path_buf(),
            diagnostics: Vec::new(),
        }
    }

    fn error(&mut self, kind: DiagnosticKind, message: String) {
        self.diagnostics
            .push(Diagnostic::error(kind, self.file.clone(), message));
    }

    fn error_at(&mut self, kind: DiagnosticKind, line: usize, message: String) {
        self.diagnostics
            .push(Diagnostic::error(kind, self.file.clone(), message).at_line(line));
    }

    fn warning(&mut self, kind: DiagnosticKind, message: String) {
        self.diagnostics
            .push(Diagnostic::warning(kind, self.file.clone(), message));
    }
}

/// The diagnostic for a file that could not be read or parsed.
#[must_use]
pub fn load_failure(file: &Path, err: &LoadError) -> Diagnostic {
    Diagnostic::error(
        DiagnosticKind::ParseFailure,
        file.to_path_buf(),
        format!("failed to parse: {err}"),
    )
}

/// Load `content` with the configured loader and run every rule on it.
///
/// `file` is the path reported in diagnostics (relative to the repository root).
#[must_use]
pub fn check_scenario(file: &Path, content: &str, config: &ValidationConfig) -> Vec<Diagnostic> {
    let loaded = config.loader.load(content);
    check_loaded(file, content, loaded, config)
}

/// Run every rule on an already-loaded document and its raw text.
#[must_use]
pub fn check_loaded(
    file: &Path,
    content: &str,
    loaded: Result<Option<ScenarioDocument>, LoadError>,
    config: &ValidationConfig,
) -> Vec<Diagnostic> {
    let doc = match loaded {
        Ok(Some(doc)) => doc,
        Ok(None) => {
            let mut findings = Findings::new(file);
            findings.error(
                DiagnosticKind::EmptyDocument,
                "empty or invalid document".to_owned(),
            );
            return findings.diagnostics;
        }
        Err(err) => return vec![load_failure(file, &err)],
    };

    let mut findings = Findings::new(file);
    check_required_fields(&doc, &mut findings);
    check_steps(&doc, config.strict_steps, &mut findings);
    check_variables(content, &mut findings);
    check_ios_min(&doc, &mut findings);
    check_tags(&doc, &mut findings);
    check_locale(&doc, &mut findings);
    findings.diagnostics
}

fn check_required_fields(doc: &ScenarioDocument, findings: &mut Findings) {
    for field in REQUIRED_FIELDS {
        if doc.get(field).is_none() {
            findings.error(
                DiagnosticKind::MissingField,
                format!("missing required field '{field}'"),
            );
        }
    }
}

fn check_steps(doc: &ScenarioDocument, strict: bool, findings: &mut Findings) {
    let steps = match doc.steps() {
        StepsField::List(steps) => steps,
        StepsField::NotList(value) if strict => {
            findings.error(
                DiagnosticKind::StepsNotList,
                format!("steps must be a list, found {}", value_kind(value)),
            );
            return;
        }
        StepsField::NotList(_) | StepsField::Absent => return,
    };

    let mut has_assertion = false;
    for (idx, step) in steps.iter().enumerate() {
        let position = idx + 1;
        let StepEntry::Action(entry) = StepEntry::classify(step) else {
            findings.error(
                DiagnosticKind::MalformedStep,
                format!("step {position} is not a mapping"),
            );
            continue;
        };
        for step_type in entry.keys() {
            if !STEP_TYPES.contains(&step_type.as_str()) {
                findings.error(
                    DiagnosticKind::UnknownStepType,
                    format!("unknown step type '{step_type}' at step {position}"),
                );
            }
            if ASSERTION_STEP_TYPES.contains(&step_type.as_str()) {
                has_assertion = true;
            }
        }
    }

    if !has_assertion {
        findings.warning(
            DiagnosticKind::MissingAssertion,
            "no assert_visible or assert_not_visible step".to_owned(),
        );
    }
}

fn check_variables(content: &str, findings: &mut Findings) {
    for expr in VARIABLE_EXPRESSION.find_iter(content) {
        let text = expr.as_str();
        let body = &text[2..text.len() - 1];
        if !VARIABLE_BODY.is_match(body) {
            findings.error(
                DiagnosticKind::MalformedVariable,
                format!("malformed variable syntax '{text}'"),
            );
        }
    }

    for (idx, line) in content.lines().enumerate() {
        let opens = line.matches("${").count();
        let closes = line.matches('}').count();
        if opens > closes {
            findings.error_at(
                DiagnosticKind::UnclosedVariable,
                idx + 1,
                "unclosed '${' in variable expression".to_owned(),
            );
        }
    }
}

fn check_ios_min(doc: &ScenarioDocument, findings: &mut Findings) {
    if let Some(ios_min) = doc.text("ios_min")
        && !VERSION_PATTERN.is_match(&ios_min)
    {
        findings.error(
            DiagnosticKind::MalformedVersion,
            format!("ios_min '{ios_min}' is not semver-ish (e.g. '17.0')"),
        );
    }
}

fn check_tags(doc: &ScenarioDocument, findings: &mut Findings) {
    let Some(tags) = doc.get("tags") else {
        return;
    };
    let well_formed = tags
        .as_array()
        .is_some_and(|items| items.iter().all(Value::is_string));
    if !well_formed {
        findings.error(
            DiagnosticKind::MalformedTags,
            "tags must be a list of strings".to_owned(),
        );
    }
}

fn check_locale(doc: &ScenarioDocument, findings: &mut Findings) {
    if let Some(locale) = doc.text("locale")
        && !LOCALE_PATTERN.is_match(&locale)
    {
        findings.error(
            DiagnosticKind::MalformedLocale,
            format!("locale '{locale}' is not a valid locale code (e.g. 'en_US')"),
        );
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
