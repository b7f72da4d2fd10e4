use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};

use changeflow::config::{Config, STAGING_DIR};
use changeflow::git::{Git2Repository, Repository};
use changeflow::release::{Orchestrator, ReleaseOutcome};
use changeflow::ui;

#[derive(clap::Parser)]
#[command(
    name = "changeflow",
    about = "Aggregate pending change records into a version bump and changelog update"
)]
struct Args {
    #[arg(long, help = "Project root directory", default_value = ".")]
    root: PathBuf,

    #[arg(long, help = "Scaffold the .changeflow staging directory and exit")]
    init: bool,

    #[arg(
        long,
        help = "Initial project version used with --init",
        default_value = "0.1.0"
    )]
    initial_version: String,

    #[arg(long, help = "Preview the release without modifying any file")]
    dry_run: bool,

    #[arg(
        long,
        help = "Verify the last commit adds a pending change record and exit"
    )]
    check: bool,

    #[arg(short, long, help = "Print version information")]
    version: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.version {
        println!("changeflow {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.init {
        match Config::init(&args.root, &args.initial_version) {
            Ok(_) => {
                ui::display_success(&format!(
                    "Initialized .changeflow in {} at version {}",
                    args.root.display(),
                    args.initial_version
                ));
                return Ok(());
            }
            Err(e) => {
                ui::display_error(&e.to_string());
                std::process::exit(1);
            }
        }
    }

    if args.check {
        let repo = match Git2Repository::discover(&args.root) {
            Ok(repo) => repo,
            Err(e) => {
                ui::display_error(&e.to_string());
                std::process::exit(1);
            }
        };
        match repo.last_commit_adds_record(Path::new(STAGING_DIR)) {
            Ok(true) => {
                ui::display_success("Last commit adds a pending change record");
                return Ok(());
            }
            Ok(false) => {
                ui::display_error(&format!(
                    "Last commit does not add a change record under {}/",
                    STAGING_DIR
                ));
                std::process::exit(1);
            }
            Err(e) => {
                ui::display_error(&e.to_string());
                std::process::exit(1);
            }
        }
    }

    let config = match Config::load(&args.root) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    };

    let repo = match Git2Repository::discover(&args.root) {
        Ok(repo) => repo,
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    };

    let orchestrator = Orchestrator::new(&args.root, config, &repo);

    if args.dry_run {
        match orchestrator.plan() {
            Ok(Some((plan, scans))) => {
                ui::display_plan(&plan, &scans);
                ui::display_status("Dry run: no files were modified.");
            }
            Ok(None) => {
                ui::display_outcome(&ReleaseOutcome::NoChanges);
            }
            Err(e) => {
                ui::display_error(&e.to_string());
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let mut observer = ui::ConsoleObserver;
    match orchestrator.release(&mut observer) {
        Ok(outcome) => {
            ui::display_outcome(&outcome);
            Ok(())
        }
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    }
}
