use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use stencil_editor::{Document, Section};
use stencil_tree::{Node, Tree};

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Template .json file
    pub input: PathBuf,

    /// Only show this section (header, content, footer)
    #[arg(short, long)]
    pub section: Option<String>,

    /// Show node properties
    #[arg(short, long)]
    pub properties: bool,
}

pub fn inspect(args: InspectArgs, _cwd: &Path) -> Result<()> {
    let document = Document::load(&args.input)?;
    let only = args.section.as_deref().map(parse_section).transpose()?;

    println!("{} {}", "Template".green().bold(), args.input.display());
    if !document.page_settings().is_empty() {
        let keys: Vec<&str> = document.page_settings().keys().map(String::as_str).collect();
        println!("   Page settings: {}", keys.join(", "));
    }
    println!();

    for section in Section::ALL {
        if only.is_some_and(|s| s != section) {
            continue;
        }
        let tree = document.section(section);
        println!(
            "{} {}",
            section.to_string().bold(),
            format!("({} nodes, depth {})", tree.count_nodes(), tree.max_depth()).dimmed()
        );
        if tree.is_empty() {
            println!("  {}", "empty".dimmed());
        } else {
            for line in outline(tree, args.properties) {
                println!("  {}", line);
            }
        }
        println!();
    }

    Ok(())
}

fn parse_section(name: &str) -> Result<Section> {
    Section::ALL
        .into_iter()
        .find(|s| s.as_str() == name)
        .ok_or_else(|| anyhow::anyhow!("Unknown section: {}. Use: header, content, or footer", name))
}

/// One indented line per node in document order
pub fn outline(tree: &Tree, with_properties: bool) -> Vec<String> {
    let mut lines = Vec::new();
    tree.traverse(|visit| {
        let indent = "  ".repeat(visit.depth);
        let mut line = format!("{}{} {}", indent, visit.node.id(), describe(visit.node));
        if with_properties && !visit.node.properties.is_empty() {
            if let Ok(json) = serde_json::to_string(&visit.node.properties) {
                line.push(' ');
                line.push_str(&json);
            }
        }
        lines.push(line);
        ControlFlow::Continue(())
    });
    lines
}

fn describe(node: &Node) -> String {
    let mut tags = vec![node.component().to_string()];
    if let Some(repeat_for) = node.repeat.as_ref().and_then(|r| r.repeat_for.as_deref()) {
        tags.push(format!("repeat {}", repeat_for));
    }
    if node.visible.is_some() {
        tags.push("conditional".to_string());
    }
    format!("({})", tags.join(", "))
}
