//! Koala DOM CLI
//!
//! Replays a JSON call script through the binding protocol and prints the
//! resulting document, standing in for a scripting host.

mod script;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use koala_bindings::BindingContext;
use koala_dom::{DomOptions, DomTree, NodeId, NodeType};
use owo_colors::OwoColorize;

/// Koala DOM: replay scripted calls against a fresh document
#[derive(Parser, Debug)]
#[command(name = "koala")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Run a script and print the resulting tree
    koala calls.json

    # Print the tree as JSON instead
    koala --json calls.json

    # Only report failed calls
    koala --quiet calls.json
"#)]
struct Cli {
    /// Path to a JSON array of calls
    #[arg(value_name = "SCRIPT")]
    script: PathBuf,

    /// Print the final tree as a JSON snapshot
    #[arg(long)]
    json: bool,

    /// Print failed calls only
    #[arg(short, long)]
    quiet: bool,

    /// Do not fire DOMNodeInserted and the other mutation events
    #[arg(long)]
    no_mutation_events: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let source = fs::read_to_string(&cli.script)
        .with_context(|| format!("failed to read {}", cli.script.display()))?;
    let calls = script::parse(&source)?;

    let tree = DomTree::with_options(DomOptions {
        mutation_events: !cli.no_mutation_events,
    });
    let mut session = script::Session::new(BindingContext::new(tree), cli.quiet);
    let failures = session.run(&calls)?;

    for error in session.context_mut().tree_mut().take_deferred_errors() {
        println!("{} {error}", "deferred:".yellow());
    }

    let tree = session.context().tree();
    if cli.json {
        let snapshot = tree
            .snapshot(NodeId::ROOT)
            .context("the document has been released")?;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("\n=== DOM Tree ===");
        print_tree(tree, NodeId::ROOT, 0);
    }

    if failures > 0 && !cli.quiet {
        println!("\n{} of {} calls failed", failures, calls.len());
    }
    Ok(())
}

/// Print a DOM tree for debugging.
fn print_tree(tree: &DomTree, id: NodeId, indent: usize) {
    let prefix = "  ".repeat(indent);
    let Some(node) = tree.get(id) else {
        return;
    };
    match node.node_type() {
        NodeType::Document(data) => {
            println!("{prefix}{} ({})", "Document".bold(), data.kind);
        }
        NodeType::DocumentType(data) => {
            println!("{prefix}<!DOCTYPE {}>", data.name);
        }
        NodeType::Element(data) => {
            let attrs: Vec<String> = data
                .attrs()
                .iter()
                .map(|attr| {
                    if attr.value().is_empty() {
                        attr.qualified_name()
                    } else {
                        format!("{}=\"{}\"", attr.qualified_name(), attr.value())
                    }
                })
                .collect();
            let tag = data.qualified_name();
            if attrs.is_empty() {
                println!("{prefix}<{}>", tag.cyan());
            } else {
                println!("{prefix}<{} {}>", tag.cyan(), attrs.join(" "));
            }
        }
        NodeType::Text(data) => {
            let display = data.replace('\n', "\\n").replace(' ', "\u{00B7}");
            println!("{prefix}\"{display}\"");
        }
        NodeType::Comment(data) => {
            println!("{prefix}{}", format!("<!-- {data} -->").dimmed());
        }
    }
    for child in tree.children(id) {
        print_tree(tree, child, indent + 1);
    }
}
