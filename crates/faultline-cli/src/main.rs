//! `faultline`: inject catalog faults into a front-end project tree,
//! let the build observe them, and restore the tree byte-identically.

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;

use faultline_backup::EntryDisposition;
use faultline_engine::{
    EngineError, Harness, HarnessConfig, RestoreOutcome, DEFAULT_BACKUP_DIR,
    DEFAULT_TEMPLATES_ROOT,
};
use faultline_registry::FaultKind;

fn main() {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));
    let code = match dispatch(&matches) {
        Ok(code) => code,
        Err(err) => report_failure(&err),
    };
    std::process::exit(code);
}

fn cli() -> Command {
    Command::new("faultline")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Fault injection harness for front-end build pipelines")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("project-root")
                .long("project-root")
                .value_name("DIR")
                .default_value(".")
                .value_parser(value_parser!(PathBuf))
                .global(true)
                .help("Project tree to inject faults into"),
        )
        .arg(
            Arg::new("backup-dir")
                .long("backup-dir")
                .value_name("DIR")
                .default_value(DEFAULT_BACKUP_DIR)
                .value_parser(value_parser!(PathBuf))
                .global(true)
                .help("Backup storage directory (relative paths resolve under the project root)"),
        )
        .arg(
            Arg::new("templates")
                .long("templates")
                .value_name("DIR")
                .default_value(DEFAULT_TEMPLATES_ROOT)
                .value_parser(value_parser!(PathBuf))
                .global(true)
                .help("Directory holding the fault templates"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Emit machine-readable JSON on stdout"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Enable debug logging on stderr"),
        )
        .subcommand(Command::new("list").about("List the fault catalog"))
        .subcommand(
            Command::new("inject")
                .about("Inject one catalog fault into the project tree")
                .arg(
                    Arg::new("type")
                        .long("type")
                        .value_name("FAULT")
                        .required(true)
                        .help("Fault type to inject (see `faultline list`)"),
                ),
        )
        .subcommand(
            Command::new("restore").about("Restore the tree from the active backup record"),
        )
        .subcommand(Command::new("status").about("Show whether a fault is active"))
        .subcommand(Command::new("verify").about("Check every catalog template on disk"))
}

fn config_from(matches: &ArgMatches) -> HarnessConfig {
    let project_root = matches
        .get_one::<PathBuf>("project-root")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));
    let backup_dir = matches
        .get_one::<PathBuf>("backup-dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BACKUP_DIR));
    let templates = matches
        .get_one::<PathBuf>("templates")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATES_ROOT));
    HarnessConfig::new(project_root)
        .with_backup_dir(backup_dir)
        .with_templates_root(templates)
}

fn dispatch(matches: &ArgMatches) -> Result<i32, EngineError> {
    let json = matches.get_flag("json");
    let harness = Harness::open(config_from(matches))?;
    match matches.subcommand() {
        Some(("list", _)) => Ok(cmd_list(&harness, json)),
        Some(("inject", args)) => cmd_inject(&harness, args, json),
        Some(("restore", _)) => cmd_restore(&harness, json),
        Some(("status", _)) => cmd_status(&harness, json),
        Some(("verify", _)) => Ok(cmd_verify(&harness, json)),
        _ => Ok(2),
    }
}

fn cmd_list(harness: &Harness, json: bool) -> i32 {
    let summaries = harness.fault_types();
    if json {
        return emit_json(&summaries);
    }
    println!("Available fault types ({}):", summaries.len());
    for summary in &summaries {
        let note = if summary.build_fails {
            ""
        } else {
            " (build passes)"
        };
        println!();
        println!(
            "  {} [{} / {}]{}",
            summary.fault_type, summary.category, summary.severity, note
        );
        println!("      {}", summary.description);
        println!("      targets: {}", join_paths(&summary.target_paths));
    }
    0
}

fn cmd_inject(harness: &Harness, args: &ArgMatches, json: bool) -> Result<i32, EngineError> {
    let raw = args
        .get_one::<String>("type")
        .map(String::as_str)
        .unwrap_or_default();
    let fault = match raw.parse::<FaultKind>() {
        Ok(fault) => fault,
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!();
            eprintln!("valid fault types:");
            for kind in FaultKind::ALL {
                eprintln!("  {kind}");
            }
            return Ok(1);
        }
    };

    let report = harness.inject(fault)?;
    if json {
        return Ok(emit_json(&report));
    }
    println!("Injected fault: {}", report.fault_type);
    println!("  Severity: {}", report.severity);
    println!(
        "  Build fails: {}",
        if report.build_fails { "yes" } else { "no" }
    );
    println!("  Modified: {}", join_paths(&report.modified_paths));
    println!("  Expected error: {}", report.expected_error);
    println!(
        "  Backed up {} path(s); run `faultline restore` to undo",
        report.backed_up
    );
    Ok(0)
}

fn cmd_restore(harness: &Harness, json: bool) -> Result<i32, EngineError> {
    let outcome = harness.restore()?;
    let code = outcome.summary().map_or(0, |s| i32::from(!s.cleaned));
    if json {
        let emitted = emit_json(&outcome);
        return Ok(if emitted == 0 { code } else { emitted });
    }
    match &outcome {
        RestoreOutcome::Idle => println!("No active fault; nothing to restore."),
        RestoreOutcome::Restored { summary } => {
            println!("Restored fault: {}", summary.fault_type);
            for file in &summary.files {
                println!("  {}: {}", file.path.display(), describe(&file.disposition));
            }
            if summary.mismatch_count() > 0 {
                println!(
                    "Warning: {} path(s) differ from the original snapshot digest.",
                    summary.mismatch_count()
                );
            }
            if summary.cleaned {
                println!("Backup record cleared.");
            } else {
                println!(
                    "Backup record retained; {} path(s) could not be restored.",
                    summary.failure_count()
                );
            }
        }
    }
    Ok(code)
}

fn cmd_status(harness: &Harness, json: bool) -> Result<i32, EngineError> {
    let status = harness.status()?;
    if json {
        return Ok(emit_json(&status));
    }
    match &status.active {
        None => println!("No active fault."),
        Some(active) => {
            println!("Active fault: {}", active.fault_type);
            println!("  Injected at: {}", active.injected_at.to_rfc3339());
            println!("  Protected paths: {}", active.entry_count);
        }
    }
    Ok(0)
}

fn cmd_verify(harness: &Harness, json: bool) -> i32 {
    let report = harness.verify_templates();
    let code = i32::from(!report.is_clean());
    if json {
        let emitted = emit_json(&report);
        return if emitted == 0 { code } else { emitted };
    }
    if report.is_clean() {
        println!("Checked {} template(s): all usable.", report.checked);
    } else {
        println!(
            "Checked {} template(s); {} unusable:",
            report.checked,
            report.issues.len()
        );
        for issue in &report.issues {
            println!("  {}: {}", issue.fault_type, issue.problem);
        }
    }
    code
}

fn describe(disposition: &EntryDisposition) -> String {
    match disposition {
        EntryDisposition::Restored { bytes } => format!("restored ({bytes} bytes)"),
        EntryDisposition::Removed => "removed".to_owned(),
        EntryDisposition::DigestMismatch { expected, actual } => format!(
            "content mismatch after copy-back (expected {}, found {})",
            expected.short(),
            actual.short()
        ),
        EntryDisposition::Failed { reason } => format!("FAILED: {reason}"),
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn emit_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(body) => {
            println!("{body}");
            0
        }
        Err(err) => {
            eprintln!("error: failed to serialize output: {err}");
            1
        }
    }
}

fn report_failure(err: &EngineError) -> i32 {
    eprintln!("error: {err}");
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
    exit_code(err)
}

fn exit_code(err: &EngineError) -> i32 {
    if err.is_conflict() || err.is_corrupt_state() {
        2
    } else {
        1
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultline_backup::{BackupError, ContentDigest};

    #[test]
    fn cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_the_subcommand() {
        let matches = cli()
            .try_get_matches_from([
                "faultline",
                "inject",
                "--type",
                "syntax-error",
                "--project-root",
                "demo",
                "--json",
            ])
            .expect("parse");
        let config = config_from(&matches);
        assert_eq!(config.project_root, PathBuf::from("demo"));
        assert_eq!(config.backup_dir, PathBuf::from(DEFAULT_BACKUP_DIR));
        assert!(matches.get_flag("json"));

        let (name, args) = matches.subcommand().expect("subcommand");
        assert_eq!(name, "inject");
        assert_eq!(
            args.get_one::<String>("type").map(String::as_str),
            Some("syntax-error")
        );
    }

    #[test]
    fn defaults_resolve_to_working_directory_layout() {
        let matches = cli()
            .try_get_matches_from(["faultline", "status"])
            .expect("parse");
        let config = config_from(&matches);
        assert_eq!(config.project_root, PathBuf::from("."));
        assert_eq!(config.templates_root, PathBuf::from(DEFAULT_TEMPLATES_ROOT));
    }

    #[test]
    fn conflicts_and_corruption_map_to_exit_two() {
        let active = EngineError::FaultAlreadyActive {
            fault: FaultKind::SyntaxError,
            injected_at: chrono::Utc::now(),
        };
        assert_eq!(exit_code(&active), 2);

        let corrupt = EngineError::Backup(BackupError::CorruptState {
            path: PathBuf::from("metadata.json"),
            reason: "unparseable record".to_owned(),
        });
        assert_eq!(exit_code(&corrupt), 2);

        let io = EngineError::Backup(BackupError::Io {
            path: PathBuf::from("src/App.jsx"),
            source: std::io::Error::other("disk trouble"),
        });
        assert_eq!(exit_code(&io), 1);
    }

    #[test]
    fn dispositions_render_one_line_each() {
        assert_eq!(
            describe(&EntryDisposition::Restored { bytes: 17 }),
            "restored (17 bytes)"
        );
        assert_eq!(describe(&EntryDisposition::Removed), "removed");
        let mismatch = describe(&EntryDisposition::DigestMismatch {
            expected: ContentDigest::compute(b"a"),
            actual: ContentDigest::compute(b"b"),
        });
        assert!(mismatch.contains("mismatch"));
        assert_eq!(
            describe(&EntryDisposition::Failed {
                reason: "target is a directory".to_owned()
            }),
            "FAILED: target is a directory"
        );
    }
}
