use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use scenario_validator::{
    ConfigError, FsSourceConfig, LoaderKind, ValidationConfig, output, validate_fs,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Validate scenario files under apps/, testing/ and workflows/.
///
/// Exits 0 when no errors are found (warnings are OK), 1 otherwise.
#[derive(Parser, Debug)]
#[command(name = "validate-scenarios", version, about)]
pub struct Cli {
    /// Repository root [default: two directories above this executable]
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Document loader: `yaml` (full parser) or `subset` (flat scenario subset)
    #[arg(long)]
    pub loader: Option<LoaderKind>,

    /// Report a `steps` field that is present but not a list
    #[arg(long)]
    pub strict_steps: bool,

    /// Skip files matching this glob (repeatable)
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// The repository root when `--root` is not given: the executable sits in a
/// directory one level below it (e.g. `<root>/scripts/validate-scenarios`).
fn default_root() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot locate the running executable")?;
    root_for_executable(&exe)
        .with_context(|| format!("executable {} has no grandparent directory", exe.display()))
}

fn root_for_executable(exe: &Path) -> Option<PathBuf> {
    exe.ancestors().nth(2).map(Path::to_path_buf)
}

pub fn run(args: &Cli) -> Result<ExitCode> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let code = execute(args, &mut out)?;
    out.flush()?;
    Ok(code)
}

/// Run one validation and write the report to `out`.
fn execute(args: &Cli, out: &mut dyn Write) -> Result<ExitCode> {
    let root = match &args.root {
        Some(root) => root.clone(),
        None => default_root()?,
    };

    let mut fs_config = FsSourceConfig::for_root(root);
    fs_config.exclude.clone_from(&args.exclude);

    let mut validation_config = ValidationConfig::default();
    if let Some(loader) = args.loader {
        validation_config.loader = loader;
    }
    validation_config.strict_steps = args.strict_steps;

    let report = match validate_fs(&fs_config, &validation_config) {
        Ok(report) => report,
        Err(e) => {
            if let Some(ConfigError::NoScenarioFiles(_)) = e.downcast_ref::<ConfigError>() {
                tracing::debug!("{e}");
                writeln!(out, "No scenario files found.")?;
                return Ok(ExitCode::FAILURE);
            }
            return Err(e);
        }
    };

    match args.format {
        OutputFormat::Human => output::write_human(&report, out)?,
        OutputFormat::Json => output::write_json(&report, out)?,
    }

    Ok(if report.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
