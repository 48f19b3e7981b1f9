//! CLI tool for inspecting and normalizing markdown slide decks.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use deck_core::{Document, SlideBlock};
use std::fs;
use std::path::{Path, PathBuf};

/// Inspect, normalize, and extract notes from markdown slide decks.
#[derive(Parser, Debug)]
#[command(name = "deck")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show frontmatter and a per-slide summary
    Inspect {
        /// Deck file (markdown with frontmatter)
        file: PathBuf,

        /// Print the parsed document as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Rewrite a deck in canonical form
    Fmt {
        /// Deck file (markdown with frontmatter)
        file: PathBuf,

        /// Overwrite the file instead of printing to stdout
        #[arg(short, long)]
        write: bool,
    },

    /// Print presenter notes for every slide
    Notes {
        /// Deck file (markdown with frontmatter)
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match &args.command {
        Command::Inspect { file, json } => {
            let document = read_document(file)?;
            if *json {
                let out = serde_json::to_string_pretty(&document)
                    .context("Failed to encode document as JSON")?;
                println!("{}", out);
            } else {
                print!("{}", summarize(&document));
            }
        }
        Command::Fmt { file, write } => {
            let document = read_document(file)?;
            let mut text = document.to_markdown();
            text.push('\n');
            if *write {
                fs::write(file, &text)
                    .with_context(|| format!("Failed to write to {}", file.display()))?;
                log::debug!("Rewrote {}", file.display());
            } else {
                print!("{}", text);
            }
        }
        Command::Notes { file } => {
            let document = read_document(file)?;
            print!("{}", format_notes(&document.slides));
        }
    }

    Ok(())
}

/// Read and parse a deck file.
fn read_document(path: &Path) -> Result<Document> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document = Document::parse(&raw);
    log::debug!(
        "Parsed {}: {} fields, {} slides",
        path.display(),
        document.frontmatter.len(),
        document.slides.len()
    );
    Ok(document)
}

/// Human-readable overview of a deck.
fn summarize(document: &Document) -> String {
    let mut out = String::new();

    out.push_str("Frontmatter:\n");
    if document.frontmatter.is_empty() {
        out.push_str("  (none)\n");
    }
    for (key, value) in document.frontmatter.iter() {
        match value.lines().count() {
            0 | 1 => out.push_str(&format!("  {}: {}\n", key, value)),
            n => out.push_str(&format!("  {}: <{} lines>\n", key, n)),
        }
    }

    out.push_str(&format!("Slides: {}\n", document.slides.len()));
    for (index, slide) in document.slides.iter().enumerate() {
        out.push_str(&format!(
            "  {:>3}  {:<10} {}{}\n",
            index + 1,
            slide.id.as_str(),
            slide.headline().unwrap_or("(empty)"),
            if slide.has_comment() { "  [note]" } else { "" }
        ));
    }

    out
}

/// Presenter notes, one block per slide that has one.
fn format_notes(slides: &[SlideBlock]) -> String {
    slides
        .iter()
        .enumerate()
        .filter(|(_, s)| s.has_comment())
        .map(|(index, s)| format!("Slide {}:\n{}\n", index + 1, s.comment))
        .collect::<Vec<_>>()
        .join("\n")
}
