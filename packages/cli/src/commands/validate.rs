use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use stencil_editor::{Document, Section};
use walkdir::WalkDir;

use crate::config::DEFAULT_CONFIG_NAME;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Template .json file or directory to validate
    pub input: PathBuf,

    /// Also list files without issues
    #[arg(short, long)]
    pub all: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub level: Level,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,
    pub message: String,
}

pub fn validate(args: ValidateArgs, _cwd: &Path) -> Result<()> {
    let files = if args.input.is_file() {
        vec![args.input.clone()]
    } else if args.input.is_dir() {
        find_templates(&args.input)
    } else {
        return Err(anyhow::anyhow!(
            "Input path does not exist: {}",
            args.input.display()
        ));
    };

    let mut total_errors = 0;
    let mut total_warnings = 0;

    for file in &files {
        let diagnostics = check_file(file);
        let errors = diagnostics.iter().filter(|d| d.level == Level::Error).count();
        total_errors += errors;
        total_warnings += diagnostics.len() - errors;

        if args.format == "json" {
            let report = serde_json::json!({
                "file": file.display().to_string(),
                "diagnostics": diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            continue;
        }

        if diagnostics.is_empty() {
            if args.all {
                println!("{} {}", "✓".green(), file.display());
            }
            continue;
        }

        println!("{}", file.display());
        for diagnostic in &diagnostics {
            let level = match diagnostic.level {
                Level::Error => "error".red().bold(),
                Level::Warning => "warning".yellow().bold(),
            };
            match diagnostic.section {
                Some(section) => println!("  {} [{}] {}", level, section, diagnostic.message),
                None => println!("  {} {}", level, diagnostic.message),
            }
        }
        println!();
    }

    if args.format != "json" {
        println!(
            "{} {} file(s) checked",
            if total_errors > 0 {
                "Done".red().bold()
            } else {
                "Done".green().bold()
            },
            files.len()
        );
        if total_errors > 0 {
            println!("   {} {}", "Errors:".red(), total_errors);
        }
        if total_warnings > 0 {
            println!("   {} {}", "Warnings:".yellow(), total_warnings);
        }
        if total_errors == 0 && total_warnings == 0 {
            println!("   {} No issues found!", "✓".green());
        }
    }

    if total_errors > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Diagnostics for one template file
pub fn check_file(path: &Path) -> Vec<Diagnostic> {
    match Document::load(path) {
        Ok(document) => check_document(&document),
        Err(err) => vec![Diagnostic {
            level: Level::Error,
            section: None,
            message: err.to_string(),
        }],
    }
}

pub fn check_document(document: &Document) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for section in Section::ALL {
        let tree = document.section(section);
        let mut error = |message: String| {
            diagnostics.push(Diagnostic {
                level: Level::Error,
                section: Some(section),
                message,
            })
        };

        for id in tree.find_duplicate_ids() {
            error(format!("Duplicate node id: {}", id));
        }
        if let Err(violation) = tree.validate_tree() {
            error(violation.to_string());
        }
    }

    if document.section(Section::Content).is_empty() {
        diagnostics.push(Diagnostic {
            level: Level::Warning,
            section: Some(Section::Content),
            message: "Content section is empty".to_string(),
        });
    }

    diagnostics
}

fn find_templates(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.is_file()
                && path.extension().map(|e| e == "json").unwrap_or(false)
                && path.file_name().map(|n| n != DEFAULT_CONFIG_NAME).unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}
