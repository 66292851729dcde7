use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use stencil_editor::{Document, EditSession, EditorConfig, Mutation};

use crate::config;

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Template .json file to edit
    pub input: PathBuf,

    /// JSON array of edit commands
    #[arg(short, long)]
    pub script: PathBuf,

    /// Where to write the result (defaults to overwriting the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Run the script without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

pub fn apply(args: ApplyArgs, cwd: &Path) -> Result<()> {
    let config = config::load(cwd)?;

    let script = std::fs::read_to_string(&args.script)
        .with_context(|| format!("Cannot read script {}", args.script.display()))?;
    let commands: Vec<Mutation> = serde_json::from_str(&script)
        .with_context(|| format!("Invalid script {}", args.script.display()))?;

    let document = Document::load(&args.input)
        .with_context(|| format!("Cannot load {}", args.input.display()))?;

    println!("✏️  {} {}", "Applying".green().bold(), args.script.display());
    println!("   Template: {}", args.input.display());
    println!("   Commands: {}", commands.len());
    println!();

    let mut document = run_script(document, commands, &config)?;

    if args.dry_run {
        println!("{} Dry run, nothing written", "✓".green());
        return Ok(());
    }

    let output = args.output.unwrap_or(args.input);
    document.save_as(&output)?;
    println!(
        "✨ {} Wrote {} (version {})",
        "Done".green().bold(),
        output.display(),
        document.version
    );
    Ok(())
}

/// Run every command in order, stopping at the first failure
pub fn run_script(document: Document, commands: Vec<Mutation>, config: &EditorConfig) -> Result<Document> {
    let mut session = EditSession::with_config("cli", document, config);

    for (index, command) in commands.into_iter().enumerate() {
        let name = command.name();
        let applied = session
            .apply(command)
            .with_context(|| format!("Command #{} ({}) failed", index + 1, name))?;

        if applied.node_ids.is_empty() {
            println!("   {} {}", "✓".green(), name);
        } else {
            println!("   {} {} {}", "✓".green(), name, applied.node_ids.join(", ").dimmed());
        }
    }
    println!();

    Ok(session.into_document())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_editor::Section;

    const TEMPLATE: &str = r#"{
        "pageSize": "A4",
        "content": {"id": "page", "type": "column", "children": [
            {"id": "title", "type": "text", "properties": {"content": "Invoice"}}
        ]}
    }"#;

    fn commands(json: &str) -> Vec<Mutation> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_run_script() {
        let document = Document::from_json(TEMPLATE).unwrap();
        let script = commands(
            r#"[
                {"op": "add_component", "parent_id": "page", "node": {"id": "total", "type": "text"}, "index": 0},
                {"op": "update_property", "node_id": "total", "key": "bold", "value": true}
            ]"#,
        );

        let document = run_script(document, script, &EditorConfig::default()).unwrap();
        let content = document.section(Section::Content);
        assert_eq!(content.get("page").unwrap().child_ids(), ["total", "title"]);
        assert_eq!(document.version, 2);
        assert_eq!(document.page_settings()["pageSize"], "A4");
    }

    #[test]
    fn test_failing_command_names_its_position() {
        let document = Document::from_json(TEMPLATE).unwrap();
        let script = commands(r#"[{"op": "undo"}, {"op": "delete_component", "node_id": "ghost"}]"#);

        let err = run_script(document, script, &EditorConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "Command #2 (delete_component) failed");
        assert!(format!("{:#}", err).contains("Node not found: ghost"));
    }

    #[test]
    fn test_apply_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("invoice.json");
        let script = dir.path().join("edits.json");
        let output = dir.path().join("out.json");
        std::fs::write(&input, TEMPLATE).unwrap();
        std::fs::write(&script, r#"[{"op": "delete_component", "node_id": "title"}]"#).unwrap();

        let args = ApplyArgs {
            input: input.clone(),
            script,
            output: Some(output.clone()),
            dry_run: false,
        };
        apply(args, dir.path()).unwrap();

        let written = Document::load(&output).unwrap();
        assert!(!written.section(Section::Content).contains("title"));
        let untouched = Document::load(&input).unwrap();
        assert!(untouched.section(Section::Content).contains("title"));
    }
}
