//! CLI entrypoint for the calltest fixture harness.

use std::path::PathBuf;

use calltest_core::{ColorChoice, CompareMode, Console, Engine};
use calltest_harness::structured_log::{self, ArtifactIndex, LogEmitter, LogEntry, LogLevel};
use calltest_harness::{FixtureSet, HarnessConfig, RunReport, TestRunner, VerificationSummary, catalog};
use clap::{Parser, Subcommand};

/// Call-and-compare tooling over the built-in catalog.
#[derive(Debug, Parser)]
#[command(name = "calltest")]
#[command(about = "Run call/expectation fixtures against registered functions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run fixture files and print one verdict per case.
    Run {
        /// Fixture JSON file, or a directory of them.
        #[arg(long)]
        fixture: PathBuf,
        /// Output report path (markdown; JSON and artifact index are written alongside).
        #[arg(long)]
        report: Option<PathBuf>,
        /// Structured JSONL log path (overrides CALLTEST_LOG).
        #[arg(long)]
        log: Option<PathBuf>,
        /// Color output: auto, always, or never (overrides CALLTEST_COLOR).
        #[arg(long)]
        color: Option<String>,
        /// Default compare mode: exact or type-only (overrides CALLTEST_COMPARE).
        #[arg(long)]
        mode: Option<String>,
        /// Run identifier used in log trace ids.
        #[arg(long, default_value = "run")]
        run_id: String,
        /// Optional fixed timestamp string for deterministic report generation.
        #[arg(long)]
        timestamp: Option<String>,
    },
    /// List built-in functions with their signatures.
    List {
        /// Emit descriptors as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Validate a structured JSONL log.
    ValidateLog {
        /// Structured JSONL log path.
        #[arg(long)]
        log: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            fixture,
            report,
            log,
            color,
            mode,
            run_id,
            timestamp,
        } => {
            let mut config = HarnessConfig::from_env();
            if let Some(raw) = color {
                config = config.with_color(ColorChoice::from_str_loose(&raw));
            }
            if let Some(raw) = mode {
                let mode = CompareMode::from_str_loose(&raw)
                    .ok_or_else(|| format!("unknown compare mode: {raw}"))?;
                config = config.with_default_mode(mode);
            }
            if let Some(path) = log {
                config = config.with_log_path(path);
            }
            config.color.apply_global();

            eprintln!("Running fixtures from {}", fixture.display());
            let sets = FixtureSet::load_path(&fixture)?;
            let registry = catalog::builtin();
            let runner = TestRunner::new("fixture-run", config.default_mode);
            let mut engine = Engine::new(Console::stdout(config.color));
            let mut emitter = match &config.log_path {
                Some(path) => Some(LogEmitter::to_file(path, "calltest", &run_id)?),
                None => None,
            };

            let mut results = Vec::new();
            let mut suites = Vec::new();
            for (path, set) in &sets {
                eprintln!("Suite {} ({} cases) from {}", set.suite, set.cases.len(), path.display());
                let run = match emitter.as_mut() {
                    Some(log) => runner.run_logged(set, &registry, &mut engine, log)?,
                    None => runner.run(set, &registry, &mut engine)?,
                };
                results.extend(run);
                suites.push(set.suite.clone());
            }

            let report_doc = RunReport {
                title: String::from("calltest Run Report"),
                suites,
                timestamp: timestamp.unwrap_or_else(structured_log::now_utc),
                summary: VerificationSummary::from_results(results),
            };

            eprintln!(
                "Run complete: total={}, passed={}, failed={}",
                report_doc.summary.total, report_doc.summary.passed, report_doc.summary.failed
            );

            if let Some(report_path) = report {
                eprintln!("Writing report to {}", report_path.display());
                std::fs::write(&report_path, report_doc.to_markdown())?;
                let json_path = report_path.with_extension("json");
                std::fs::write(&json_path, report_doc.to_json())?;
                let index_path = report_path.with_extension("artifacts.json");

                // Close the log before it is hashed into the index.
                if let Some(log) = emitter.as_mut() {
                    log.set_suite("calltest");
                    let refs = [&report_path, &json_path, &index_path]
                        .iter()
                        .map(|path| path.display().to_string())
                        .collect();
                    log.emit_entry(
                        LogEntry::new("", LogLevel::Info, "artifacts_written").with_artifacts(refs),
                    )?;
                    log.flush()?;
                }

                let mut index = ArtifactIndex::new(&run_id);
                index.add_file(&report_path, "report_markdown")?;
                index.add_file(&json_path, "report_json")?;
                if let Some(log_path) = &config.log_path {
                    index.add_file(log_path, "structured_log")?;
                }
                std::fs::write(&index_path, index.to_json()?)?;
                eprintln!("Wrote artifact index to {}", index_path.display());
            }

            if !report_doc.summary.all_passed() {
                return Err("calltest run failed".into());
            }
        }
        Command::List { json } => {
            let registry = catalog::builtin();
            if json {
                println!("{}", serde_json::to_string_pretty(&registry.descriptors())?);
            } else {
                for descriptor in registry.descriptors() {
                    println!("{descriptor}");
                }
            }
        }
        Command::ValidateLog { log } => {
            let (lines, errors) = structured_log::validate_log_file(&log)?;
            for err in &errors {
                eprintln!("{err}");
            }
            eprintln!(
                "Validated {} line(s) in {}: {} error(s)",
                lines,
                log.display(),
                errors.len()
            );
            if !errors.is_empty() {
                return Err("structured log validation failed".into());
            }
        }
    }

    Ok(())
}
