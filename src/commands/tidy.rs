use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::commands::CommandReport;
use crate::error::{MatchError, WarnCode};
use crate::tidy::backup::Backup;
use crate::tidy::config::TidyConfig;
use crate::tidy::links::{LinkRewriter, rewrite_document};
use crate::tidy::matcher::{DocumentMatch, find_document};
use crate::tidy::names::{LectureNumbering, clean_name};
use crate::tidy::paths::{relative_posix, resolve_root};
use crate::tidy::renamer::{RenameOutcome, move_file, rename_folder};
use crate::tidy::scan::{CandidateFolder, scan_candidates};

#[derive(Debug, Clone, Default)]
pub struct TidyOptions {
    /// Directory to tidy; the working directory when unset.
    pub root: Option<PathBuf>,
    pub dry_run: bool,
}

struct FolderPlan {
    new_dir_name: String,
    new_dir: PathBuf,
    document: DocumentMatch,
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Cleaned file name for `document`, or `None` when nothing would be left of the stem.
fn clean_document_name(document: &Path) -> Option<String> {
    let stem = document.file_stem()?.to_string_lossy();
    let clean = clean_name(&stem);
    if clean.is_empty() {
        return None;
    }
    match document.extension() {
        Some(ext) => Some(format!("{clean}.{}", ext.to_string_lossy())),
        None => Some(clean),
    }
}

fn plan_folder(
    root: &Path,
    candidate: &CandidateFolder,
    order_idx: usize,
    cfg: &TidyConfig,
    numbering: &LectureNumbering,
    report: &mut CommandReport,
) -> Result<Option<FolderPlan>> {
    let number = numbering.extract(&candidate.pretty_title, order_idx);
    let new_dir_name = cfg.folder_name(&number);

    let document = match find_document(root, &candidate.raw_name, &cfg.document_extension) {
        Ok(document) => document,
        Err(MatchError::Io(err)) => {
            return Err(err).with_context(|| format!("failed to list {}", root.display()));
        }
        Err(err) => {
            let code = err.warn_code().unwrap_or(WarnCode::W001NoDocument);
            report.warn(
                code,
                &candidate.raw_name,
                "",
                format!("warning: `{}` skipped: {err}", candidate.raw_name),
            );
            return Ok(None);
        }
    };

    Ok(Some(FolderPlan {
        new_dir: root.join(&new_dir_name),
        new_dir_name,
        document,
    }))
}

fn report_missing(
    report: &mut CommandReport,
    candidate: &CandidateFolder,
    document: &Path,
    missing: &[String],
    limit: usize,
) {
    if missing.is_empty() {
        return;
    }
    let doc_name = display_name(document);
    report.warn(
        WarnCode::W003MissingImage,
        &candidate.raw_name,
        &doc_name,
        format!(
            "warning: {doc_name}: {} image link(s) do not resolve:",
            missing.len()
        ),
    );
    for link in missing.iter().take(limit) {
        report.warn_more(format!("   - {link}"));
    }
    if missing.len() > limit {
        report.warn_more("   ...");
    }
}

/// Rename `document` to its cleaned name in `root`; an existing file there is backed up first.
fn rename_document(
    root: &Path,
    candidate: &CandidateFolder,
    document: &Path,
    report: &mut CommandReport,
) -> Result<PathBuf> {
    let Some(clean) = clean_document_name(document) else {
        let doc_name = display_name(document);
        report.warn(
            WarnCode::W005EmptyCleanName,
            &candidate.raw_name,
            &doc_name,
            format!("warning: {doc_name}: cleaned name would be empty; kept as is"),
        );
        return Ok(document.to_path_buf());
    };

    let desired = root.join(&clean);
    if desired.as_path() == document {
        return Ok(desired);
    }
    if desired.exists() {
        let same = matches!(
            (desired.canonicalize(), document.canonicalize()),
            (Ok(a), Ok(b)) if a == b
        );
        if same {
            return Ok(document.to_path_buf());
        }
        let backup = Backup::snapshot(&desired)?;
        report.detail(format!(
            "backed up existing {} to {}",
            clean,
            display_name(&backup.backup_path)
        ));
    }
    move_file(document, &desired)?;
    report.detail(format!("renamed {} -> {}", display_name(document), clean));
    Ok(desired)
}

fn describe_plan(candidate: &CandidateFolder, plan: &FolderPlan) -> String {
    format!(
        "`{}` -> `{}` (document {}, matched by {})",
        candidate.raw_name,
        plan.new_dir_name,
        display_name(&plan.document.path),
        plan.document.strategy.as_str()
    )
}

fn dry_run_one(
    root: &Path,
    candidate: &CandidateFolder,
    plan: &FolderPlan,
    report: &mut CommandReport,
) -> Result<()> {
    let document = &plan.document.path;
    let content = fs::read_to_string(document)
        .with_context(|| format!("failed to read {}", document.display()))?;
    let rewriter = LinkRewriter::new(candidate.old_variants(), relative_posix(root, &plan.new_dir));
    let (_, links) = rewriter.rewrite_content(&content);

    report.detail(format!("plan: {}", describe_plan(candidate, plan)));
    report.detail(format!(
        "      {links} link(s) would be rewritten ({} name variant(s) checked)",
        rewriter.variants().len()
    ));
    if let Some(clean) = clean_document_name(document) {
        if clean != display_name(document) {
            report.detail(format!("      document would be renamed to {clean}"));
        }
    }
    Ok(())
}

fn process_one(
    root: &Path,
    candidate: &CandidateFolder,
    plan: &FolderPlan,
    cfg: &TidyConfig,
    report: &mut CommandReport,
) -> Result<()> {
    report.detail(describe_plan(candidate, plan));

    match rename_folder(&candidate.path, &plan.new_dir)? {
        RenameOutcome::Unchanged => report.detail("folder already in place"),
        RenameOutcome::Moved => report.detail(format!("moved folder to {}", plan.new_dir_name)),
        RenameOutcome::Merged(stats) => {
            report.detail(format!(
                "merged {} file(s) into existing {}",
                stats.moved_files, plan.new_dir_name
            ));
            if stats.collisions > 0 {
                report.warn(
                    WarnCode::W004MergeCollision,
                    &candidate.raw_name,
                    &display_name(&plan.document.path),
                    format!(
                        "warning: {} file(s) already present in {} were kept; the copies from `{}` were dropped",
                        stats.collisions, plan.new_dir_name, candidate.raw_name
                    ),
                );
            }
        }
    }

    let rewrite = rewrite_document(&plan.document.path, &candidate.old_variants(), &plan.new_dir)?;
    report.detail(format!(
        "rewrote {} link(s); backup at {} ({} bytes)",
        rewrite.rewritten_links,
        display_name(&rewrite.backup.backup_path),
        rewrite.backup.bytes
    ));
    report_missing(
        report,
        candidate,
        &rewrite.document,
        &rewrite.missing,
        cfg.missing_report_limit,
    );

    rename_document(root, candidate, &plan.document.path, report)?;
    Ok(())
}

/// Tidy one root, recording into `report` as it goes. On error the report keeps
/// everything recorded for the folders handled before the failure.
pub fn run(opts: &TidyOptions, cfg: &TidyConfig, report: &mut CommandReport) -> Result<()> {
    let root = resolve_root(opts.root.as_deref())?;
    let numbering = cfg.numbering()?;
    report.dry_run = opts.dry_run;
    report.detail(format!("root={}", root.display()));

    let candidates = scan_candidates(&root)?;
    report.detail(format!("candidates={}", candidates.len()));

    for (idx, candidate) in candidates.iter().enumerate() {
        let order_idx = idx + 1;
        let Some(plan) = plan_folder(&root, candidate, order_idx, cfg, &numbering, report)? else {
            continue;
        };
        if opts.dry_run {
            dry_run_one(&root, candidate, &plan, report)?;
        } else {
            process_one(&root, candidate, &plan, cfg, report)?;
        }
        report.processed += 1;
    }

    Ok(())
}
