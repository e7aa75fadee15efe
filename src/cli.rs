//! CLI implementation for doc4md

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use doc4md::classify;
use doc4md::config::Config;
use doc4md::corpus::{ConvertOptions, CorpusConverter};
use doc4md::identity::CommandIdentity;
use doc4md::properties;

// Exit codes
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    NoPages = 2,
    NotACommandPage = 3,
}

#[derive(Parser)]
#[command(name = "doc4md")]
#[command(about = "Converts a 4D reference-manual HTML corpus into Docusaurus Markdown")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Show debug info
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every command page in a corpus folder
    Convert {
        /// Folder containing the HTML corpus
        html_root: PathBuf,
        /// Output folder for the Markdown trees
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Language codes to skip (repeatable)
        #[arg(long = "skip-lang")]
        skip_languages: Vec<String>,
        /// Plan and convert but write nothing
        #[arg(long)]
        dry_run: bool,
    },
    /// Convert a single page and print the Markdown to stdout
    Page {
        /// The HTML page to convert
        file: PathBuf,
        /// Corpus root for link and image resolution (defaults to the
        /// page's folder)
        #[arg(long)]
        html_root: Option<PathBuf>,
    },
    /// Explain how a file would be classified
    Check {
        /// The HTML file to probe
        file: PathBuf,
    },
    /// Append localized property tables to a published Markdown tree
    Annotate {
        /// Folder containing the HTML corpus
        html_root: PathBuf,
        /// Root of the published Markdown tree to annotate
        docs: PathBuf,
        /// JSON file with per-language table strings
        #[arg(long, default_value = "translations.json")]
        translations: PathBuf,
    },
}

/// Default tracing directive when `RUST_LOG` is unset. main.rs consults the
/// verbose flag before the subscriber is installed.
pub fn default_log_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Dispatch pre-parsed arguments. Parsing and tracing setup happen in
/// main.rs, which needs the flags before the subscriber exists.
pub fn run_with(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Convert {
            ref html_root,
            ref output,
            ref skip_languages,
            dry_run,
        } => cmd_convert(&cli, &config, html_root, output.as_deref(), skip_languages, dry_run),
        Commands::Page {
            ref file,
            ref html_root,
        } => cmd_page(file, html_root.as_deref()),
        Commands::Check { ref file } => cmd_check(file),
        Commands::Annotate {
            ref html_root,
            ref docs,
            ref translations,
        } => cmd_annotate(&cli, &config, html_root, docs, translations),
    }
}

fn cmd_convert(
    cli: &Cli,
    config: &Config,
    html_root: &Path,
    output: Option<&Path>,
    skip_languages: &[String],
    dry_run: bool,
) -> Result<()> {
    let quiet = cli.quiet || config.quiet_or_default();

    let mut opts = ConvertOptions::new(
        html_root,
        output.map_or_else(|| config.output_or_default(), Path::to_path_buf),
    );
    opts.skip_languages = if skip_languages.is_empty() {
        config.skip_languages_or_default()
    } else {
        skip_languages.to_vec()
    };
    opts.dry_run = dry_run;

    let converter = CorpusConverter::new(opts)?;
    let tasks = converter.plan()?;
    if tasks.is_empty() {
        println!("No command pages found in {}", html_root.display());
        std::process::exit(ExitCode::NoPages as i32);
    }

    if !quiet {
        println!("Converting {} pages...", tasks.len());
    }
    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(tasks.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .context("progress template")?,
        );
        pb
    };

    let summary = converter.run(&tasks, || progress.inc(1))?;
    progress.finish_with_message("done");

    if !quiet {
        println!();
        println!("Conversion complete:");
        println!("  {} {}", "Converted:".green(), summary.converted);
        println!("  {} {}", "Skipped:".yellow(), summary.skipped);
        if summary.failed > 0 {
            println!("  {} {}", "Failed:".red(), summary.failed);
        }
        println!("  Themes: {}", summary.themes);
        if dry_run {
            println!("  (dry run, nothing written)");
        }
    }
    Ok(())
}

fn cmd_page(file: &Path, html_root: Option<&Path>) -> Result<()> {
    let root = match html_root {
        Some(root) => root.to_path_buf(),
        None => file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    if !file.is_file() {
        bail!("page {} does not exist", file.display());
    }

    let mut opts = ConvertOptions::new(root, PathBuf::from("."));
    opts.dry_run = true;
    let converter = CorpusConverter::new(opts)?;
    let markdown = converter.convert_file(file)?;
    print!("{markdown}");
    Ok(())
}

fn cmd_check(file: &Path) -> Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let verdict = classify::classify(file, &bytes);
    let identity = CommandIdentity::from_path(file);

    let mark = |flag: bool| {
        if flag {
            "yes".green()
        } else {
            "no".red()
        }
    };
    println!("{}", file.display());
    println!("  command: {} [{}]", identity.display_name(), identity.language);
    println!("  command page:   {}", mark(verdict.is_command_page));
    println!("  language track: {}", mark(verdict.is_language_track));
    println!("  deprecated:     {}", mark(classify::is_deprecated(file)));
    println!("  output group:   {:?}", verdict.group);

    if !(verdict.is_command_page && verdict.is_language_track) {
        std::process::exit(ExitCode::NotACommandPage as i32);
    }
    Ok(())
}

fn cmd_annotate(
    cli: &Cli,
    config: &Config,
    html_root: &Path,
    docs: &Path,
    translations: &Path,
) -> Result<()> {
    let quiet = cli.quiet || config.quiet_or_default();
    if !docs.is_dir() {
        bail!("docs folder {} does not exist", docs.display());
    }

    let translations = properties::load_translations(translations)?;
    let collected = properties::collect(html_root)?;
    if !quiet {
        println!("Collected properties for {} commands", collected.len());
    }
    let annotated = properties::annotate_tree(docs, &collected, &translations)?;
    if !quiet {
        println!("  {} {}", "Annotated:".green(), annotated);
    }
    Ok(())
}
