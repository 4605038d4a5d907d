//! docnorm CLI - academic document formatting analyzer and fixer

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};

use docnorm::{
    extract_structure, Action, ActionStatus, ClassifiedParagraph, Issue, NormProfile,
    ParagraphClass, Pipeline, PipelineOptions, Severity, ValidationResult, Vision,
};

#[derive(Parser)]
#[command(name = "docnorm")]
#[command(version)]
#[command(about = "Analyze, repair, and validate academic document formatting", long_about = None)]
struct Cli {
    /// Input document
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Formatting norm profile
    #[arg(long, value_enum, default_value = "abnt")]
    norm: NormKind,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a document and report issues and the planned fixes
    Analyze {
        /// Input DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Formatting norm profile
        #[arg(long, value_enum, default_value = "abnt")]
        norm: NormKind,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,

        /// Keep the intermediate PDF render next to the input
        #[arg(long)]
        keep_render: bool,
    },

    /// Repair a document, save it, and validate the result
    Repair {
        /// Input DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (defaults to <input>_formatted.docx)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Formatting norm profile
        #[arg(long, value_enum, default_value = "abnt")]
        norm: NormKind,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,

        /// Keep the intermediate PDF renders next to the files
        #[arg(long)]
        keep_render: bool,
    },

    /// Score a document against the norm's visual targets
    Validate {
        /// Input DOCX or PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Formatting norm profile
        #[arg(long, value_enum, default_value = "abnt")]
        norm: NormKind,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show document structure, metadata, and statistics
    Info {
        /// Input DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the structural model as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum NormKind {
    /// ABNT NBR 14724 (Brazilian academic standard)
    Abnt,
    /// APA 7th edition
    Apa,
}

impl From<NormKind> for NormProfile {
    fn from(kind: NormKind) -> Self {
        match kind {
            NormKind::Abnt => NormProfile::abnt(),
            NormKind::Apa => NormProfile::apa(),
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Analyze {
            input,
            norm,
            json,
            keep_render,
        }) => cmd_analyze(&input, norm, json, keep_render),
        Some(Commands::Repair {
            input,
            output,
            norm,
            json,
            keep_render,
        }) => cmd_repair(&input, output.as_deref(), norm, json, keep_render),
        Some(Commands::Validate { input, norm, json }) => cmd_validate(&input, norm, json),
        Some(Commands::Info { input, json }) => cmd_info(&input, json),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: analyze if input is provided
            if let Some(input) = cli.input {
                cmd_analyze(&input, cli.norm, cli.json, false)
            } else {
                println!("{}", "Usage: docnorm <FILE>".yellow());
                println!("       docnorm --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn pipeline_for(norm: NormKind, keep_render: bool) -> Pipeline {
    let options = PipelineOptions::new()
        .with_norm(norm.into())
        .with_keep_renders(keep_render);
    Pipeline::new(options)
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn cmd_analyze(
    input: &Path,
    norm: NormKind,
    json: bool,
    keep_render: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = pipeline_for(norm, keep_render);

    let pb = spinner("Analyzing document...");
    let report = pipeline.analyze(input);
    pb.finish_and_clear();
    let report = report?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_vision(&report.vision, &report.classifications);
    println!();
    print_issues(&report.issues);
    println!();
    print_plan(&report.plan);
    println!();
    let score = report.compliance_score;
    let text = score.to_string();
    let colored = if score >= 90 {
        text.green()
    } else if score >= 70 {
        text.yellow()
    } else {
        text.red()
    };
    println!("{}: {}/100", "Structural compliance".bold(), colored);

    Ok(())
}

fn cmd_repair(
    input: &Path,
    output: Option<&Path>,
    norm: NormKind,
    json: bool,
    keep_render: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let dest = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_repair_path(input));

    let pipeline = pipeline_for(norm, keep_render);

    let pb = spinner("Repairing document...");
    let report = pipeline.repair(input, &dest);
    pb.finish_and_clear();
    let report = report?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_issues(&report.analysis.issues);
    println!();

    println!("{}", "Execution".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    if report.execution.outcomes.is_empty() {
        println!("{}", "Nothing to fix; saved a verbatim copy".green());
    }
    for outcome in &report.execution.outcomes {
        let mark = match outcome.status {
            ActionStatus::Success => "✓".green(),
            ActionStatus::Error => "✗".red(),
        };
        println!("{mark} {}", outcome.message);
    }
    println!(
        "{} {}/{} action(s) applied",
        "Done:".green().bold(),
        report.execution.successful_actions,
        report.execution.total_actions
    );
    println!("{} {}", "Saved to".green(), dest.display());

    if let Some(validation) = &report.validation {
        println!();
        print_validation(validation);
        if let Some(meets) = report.meets_acceptance {
            let verdict = if meets {
                "meets the acceptance threshold".green()
            } else {
                "below the acceptance threshold".red()
            };
            println!("{}: {}", "Acceptance".bold(), verdict);
        }
    } else if let Some(note) = &report.analysis.vision.note {
        println!();
        println!("{}: {}", "Note".yellow().bold(), note);
    }

    Ok(())
}

fn cmd_validate(
    input: &Path,
    norm: NormKind,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = pipeline_for(norm, false);

    let pb = spinner("Validating document...");
    let validation = pipeline.validate(input);
    pb.finish_and_clear();
    let validation = validation?;

    if json {
        println!("{}", serde_json::to_string_pretty(&validation)?);
        return Ok(());
    }

    print_validation(&validation);

    if !validation.all_issues.is_empty() {
        println!();
        println!("{}", "Detected problems".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        for issue in &validation.all_issues {
            println!(
                "{} [{}] {} (impact {:.1})",
                severity_glyph(issue.severity),
                issue.category,
                issue.description,
                issue.score_impact
            );
        }
    }

    Ok(())
}

fn cmd_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let doc = extract_structure(input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    if let Some(ref title) = doc.metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = doc.metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref created) = doc.metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = doc.metadata.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    println!();
    println!("{}", "Structure".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Sections".bold(), doc.sections.len());
    println!("{}: {}", "Paragraphs".bold(), doc.statistics.total_paragraphs);
    println!("{}: {}", "Headings".bold(), doc.hierarchy.len());
    println!("{}: {}", "Styles".bold(), doc.styles.total());
    if let Some(section) = doc.sections.first() {
        let m = section.margins;
        println!(
            "{}: top {}, bottom {}, left {}, right {}",
            "Margins".bold(),
            axis_cm(m.top),
            axis_cm(m.bottom),
            axis_cm(m.left),
            axis_cm(m.right),
        );
    }

    println!();
    println!("{}", "Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let stats = &doc.statistics;
    println!("{}: {}", "Words".bold(), stats.total_words);
    println!("{}: {}", "Characters".bold(), stats.total_characters);
    if let Some(font) = stats.dominant_font() {
        println!("{}: {}", "Dominant font".bold(), font);
    }
    if let Some(size) = stats.dominant_size() {
        println!("{}: {}pt", "Dominant size".bold(), size);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docnorm".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Academic document formatting analyzer and fixer");
    println!();
    println!(
        "Repository: {}",
        "https://github.com/docnorm/docnorm".dimmed()
    );
    println!("License: MIT");
}

fn print_vision(vision: &Vision, classifications: &[ClassifiedParagraph]) {
    println!("{}", "Document".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let counts = &vision.analysis.total_elements;
    println!("{}: {}", "Kind".bold(), vision.analysis.document_kind);
    println!("{}: {}", "Paragraphs".bold(), counts.paragraphs);
    println!("{}: {}", "Sections".bold(), counts.sections);
    if let Some(pages) = counts.pages {
        println!("{}: {}", "Pages".bold(), pages);
    }
    if let Some(ref margins) = vision.visual_margins {
        println!(
            "{}: top {:.1}cm, left {:.1}cm, right {:.1}cm",
            "Measured margins".bold(),
            margins.top,
            margins.left,
            margins.right
        );
    }

    let (mut title, mut subtitle, mut body, mut other) = (0, 0, 0, 0);
    for c in classifications {
        match c.classification {
            ParagraphClass::Title => title += 1,
            ParagraphClass::Subtitle => subtitle += 1,
            ParagraphClass::Body => body += 1,
            ParagraphClass::Other => other += 1,
        }
    }
    println!(
        "{}: {title} title, {subtitle} subtitle, {body} body, {other} other",
        "Paragraph roles".bold()
    );

    if let Some(ref note) = vision.note {
        println!("{}: {}", "Note".yellow().bold(), note);
    }
}

fn print_issues(issues: &[Issue]) {
    println!("{}", "Issues".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    if issues.is_empty() {
        println!("{}", "No issues found".green());
        return;
    }
    for issue in issues {
        println!(
            "{} [{}] {}",
            severity_glyph(issue.severity),
            issue.category,
            issue.description
        );
        if let Some(ref rec) = issue.recommendation {
            println!("  {} {}", "└─".dimmed(), rec);
        }
    }
}

fn print_plan(plan: &[Action]) {
    println!("{}", "Planned fixes".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    if plan.is_empty() {
        println!("{}", "Nothing to fix".green());
        return;
    }
    for action in plan {
        println!(
            "{} {} {}",
            format!("[{}]", action.priority).dimmed(),
            action.description,
            format!("({})", action.target).dimmed()
        );
    }
}

fn print_validation(validation: &ValidationResult) {
    println!("{}", "Validation".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    print_check(
        "Margins",
        validation.margins.valid,
        validation.margins.score,
        &validation.margins.issues,
        validation.margins.reason.as_deref(),
    );
    print_check(
        "Fonts",
        validation.fonts.valid,
        validation.fonts.score,
        &validation.fonts.issues,
        validation.fonts.reason.as_deref(),
    );
    print_check(
        "Spacing",
        validation.spacing.valid,
        validation.spacing.score,
        &validation.spacing.issues,
        validation.spacing.reason.as_deref(),
    );
    print_check(
        "Alignment",
        validation.alignment.valid,
        validation.alignment.score,
        &validation.alignment.issues,
        validation.alignment.reason.as_deref(),
    );

    println!();
    let verdict = if validation.overall_valid {
        "PASS".green().bold()
    } else {
        "FAIL".red().bold()
    };
    println!(
        "{}: {}/100 {}",
        "Overall".bold(),
        score_colored(validation.overall_score),
        verdict
    );
}

fn print_check(name: &str, valid: bool, score: f64, issues: &[String], reason: Option<&str>) {
    let mark = if valid { "✓".green() } else { "✗".red() };
    println!("{mark} {name}: {score:.1}");
    for issue in issues {
        println!("  {} {}", "├─".dimmed(), issue);
    }
    if let Some(reason) = reason {
        println!("  {} {}", "└─".dimmed(), reason);
    }
}

fn severity_glyph(severity: Severity) -> ColoredString {
    match severity {
        Severity::High => "●".red(),
        Severity::Medium => "●".yellow(),
        Severity::Low => "●".normal(),
    }
}

fn score_colored(score: f64) -> ColoredString {
    let text = format!("{score:.1}");
    if score >= 90.0 {
        text.green()
    } else if score >= 70.0 {
        text.yellow()
    } else {
        text.red()
    }
}

fn axis_cm(value: Option<f64>) -> String {
    match value {
        Some(cm) => format!("{cm}cm"),
        None => "unset".to_string(),
    }
}

fn default_repair_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "docx".to_string());
    input.with_file_name(format!("{stem}_formatted.{ext}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_repair_path() {
        assert_eq!(
            default_repair_path(Path::new("/tmp/tese.docx")),
            PathBuf::from("/tmp/tese_formatted.docx")
        );
        assert_eq!(
            default_repair_path(Path::new("tese")),
            PathBuf::from("tese_formatted.docx")
        );
    }

    #[test]
    fn test_axis_cm() {
        assert_eq!(axis_cm(Some(3.0)), "3cm");
        assert_eq!(axis_cm(Some(1.25)), "1.25cm");
        assert_eq!(axis_cm(None), "unset");
    }
}
