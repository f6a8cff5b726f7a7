use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::commands::{self, CommandReport};
use crate::tidy::config::load_config;

#[derive(Debug, Parser)]
#[command(
    name = "lecture-tidy",
    version,
    about = "Rename hash-suffixed export folders to `lecture NN` and fix the links that point at them"
)]
struct Cli {
    /// Directory to tidy (defaults to the current directory)
    #[arg(value_hint = clap::ValueHint::DirPath)]
    root: Option<PathBuf>,

    /// Print the planned renames without touching any file
    #[arg(long)]
    dry_run: bool,

    /// Print per-folder details
    #[arg(short, long)]
    verbose: bool,
}

fn render(report: &CommandReport, verbose: bool) -> Vec<String> {
    let mut lines = Vec::new();
    if verbose || report.dry_run {
        lines.push(format!("[{}]", report.command));
        lines.extend(report.details.iter().cloned());
    }
    lines.extend(report.warnings.iter().cloned());

    let verb = if report.dry_run { "planned" } else { "tidied" };
    lines.push(String::new());
    lines.push(format!("done: {} folder(s) {verb}", report.processed));
    lines.push(" - image folders: 'lecture 01', 'lecture 02', ...".to_string());
    lines.push(
        " - documents: hash and brackets removed, links relative with spaces encoded (%20)"
            .to_string(),
    );
    lines.push(
        " - if missing-path warnings appear, check that those files really exist in the folder"
            .to_string(),
    );
    lines
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_config()?;
    let opts = commands::tidy::TidyOptions {
        root: cli.root,
        dry_run: cli.dry_run,
    };

    let mut report = CommandReport::new("tidy");
    let outcome = commands::tidy::run(&opts, &cfg, &mut report);
    for line in render(&report, cli.verbose) {
        println!("{line}");
    }
    outcome
}
