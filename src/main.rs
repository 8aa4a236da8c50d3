use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use openapi_patcher::{
    safe_parse, ApplyOutcome, Dialect, Document, Engine, Fix, FixKind, Issue, PlanRequest,
};
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "openapi-patcher")]
#[command(about = "Format-preserving quickfix planner for OpenAPI documents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the edit plan for a fix and print it without applying
    Plan {
        /// OpenAPI document (.json, .yaml or .yml)
        document: PathBuf,

        /// Fix descriptor file (JSON)
        #[arg(short, long)]
        fix: PathBuf,

        /// Render a snippet template with numbered placeholders
        #[arg(short, long)]
        snippet: bool,

        /// Show a unified diff of the would-be result
        #[arg(short, long)]
        diff: bool,

        /// Issue pointer(s) for parameter resolution (repeatable)
        #[arg(long)]
        issue: Vec<String>,
    },

    /// Apply a fix to the document in place
    Apply {
        /// OpenAPI document (.json, .yaml or .yml)
        document: PathBuf,

        /// Fix descriptor file (JSON)
        #[arg(short, long)]
        fix: PathBuf,

        /// Show what would change without modifying the file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show a unified diff of the changes
        #[arg(short, long)]
        diff: bool,

        /// Issue pointer(s) for parameter resolution (repeatable)
        #[arg(long)]
        issue: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            document,
            fix,
            snippet,
            diff,
            issue,
        } => cmd_plan(&document, &fix, snippet, diff, &issue),

        Commands::Apply {
            document,
            fix,
            dry_run,
            diff,
            issue,
        } => cmd_apply(&document, &fix, dry_run, diff, &issue),
    }
}

fn dialect_of(path: &Path) -> Result<Dialect> {
    path.extension()
        .and_then(|extension| extension.to_str())
        .and_then(Dialect::from_extension)
        .with_context(|| {
            format!(
                "cannot determine dialect of {}: expected .json, .yaml or .yml",
                path.display()
            )
        })
}

fn load_fix(path: &Path) -> Result<Fix> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read fix descriptor {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("invalid fix descriptor {}", path.display()))
}

fn issues_from(pointers: &[String]) -> Vec<Issue> {
    pointers
        .iter()
        .map(|pointer| Issue {
            pointer: pointer.clone(),
            id: None,
        })
        .collect()
}

fn plan_for(
    document_path: &Path,
    fix_path: &Path,
    snippet: bool,
    issue_pointers: &[String],
) -> Result<(String, openapi_patcher::PlannedEdit)> {
    let dialect = dialect_of(document_path)?;
    let text = fs::read_to_string(document_path)
        .with_context(|| format!("failed to read {}", document_path.display()))?;
    let document = Document::new(text.clone());
    let root = safe_parse(&text, dialect)
        .with_context(|| format!("failed to parse {}", document_path.display()))?;
    let fix = load_fix(fix_path)?;

    let engine = Engine::with_defaults();
    // An insert may address a location that does not exist yet; grow the
    // payload through the missing containers first.
    let fix = if fix.kind == FixKind::Insert {
        engine.materialize(&fix, &root)?
    } else {
        fix
    };
    let issues = issues_from(issue_pointers);
    let bundle = root.to_value();

    let plan = engine.plan(&PlanRequest {
        fix: &fix,
        root: &root,
        document: &document,
        dialect,
        snippet,
        issues: &issues,
        bundle: Some(&bundle),
        mapper: None,
    })?;
    Ok((text, plan))
}

fn cmd_plan(
    document_path: &Path,
    fix_path: &Path,
    snippet: bool,
    show_diff: bool,
    issue_pointers: &[String],
) -> Result<()> {
    let (text, plan) = plan_for(document_path, fix_path, snippet, issue_pointers)?;
    let document = Document::new(text.clone());
    let (utf16_start, utf16_end) = plan.utf16_span(&document);

    println!(
        "{} bytes [{}, {}) / utf16 [{}, {})",
        "span:".bold(),
        plan.start,
        plan.end,
        utf16_start,
        utf16_end
    );
    println!("{} {:?}", "text:".bold(), plan.text);

    if show_diff {
        let edited = plan.apply_to(&text)?;
        print_diff(document_path, &text, &edited);
    }
    Ok(())
}

fn cmd_apply(
    document_path: &Path,
    fix_path: &Path,
    dry_run: bool,
    show_diff: bool,
    issue_pointers: &[String],
) -> Result<()> {
    // Literal mode only: applying a snippet template is an editor concern.
    let (text, plan) = plan_for(document_path, fix_path, false, issue_pointers)?;

    if show_diff || dry_run {
        let edited = plan.apply_to(&text)?;
        print_diff(document_path, &text, &edited);
    }
    if dry_run {
        println!("{}", "[dry run] no changes written".cyan());
        return Ok(());
    }

    match plan.apply_to_file(document_path)? {
        ApplyOutcome::Applied { bytes_changed } => {
            println!(
                "{}",
                format!(
                    "Applied to {} ({} bytes spliced)",
                    document_path.display(),
                    bytes_changed
                )
                .green()
            );
        }
        ApplyOutcome::AlreadyApplied => {
            println!(
                "{}",
                format!("Already applied: {}", document_path.display()).yellow()
            );
        }
    }
    Ok(())
}

fn print_diff(file: &Path, original: &str, modified: &str) {
    println!("{}", format!("--- {} (original)", file.display()).dimmed());
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}
