//! Command-line client for the snippet service.
//!
//! Drives the same cache, transfer and refresh paths an editor integration
//! uses, with a file on disk standing in for the active editor.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::Parser;
use snipdrop_client::config::{Command, Config};
use snipdrop_client::{
    DragPayload, DropLocation, FileEditor, HttpSnippetService, NodePath, SnippetGroups,
    SyncContext, TransferCoordinator,
};
use snipdrop_core::{display_text, Category, EditorHost, EditorSelection, FileInfo};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Editor host for commands that do not read a file.
struct NoEditor;

impl EditorHost for NoEditor {
    fn document_text(&self) -> Option<String> {
        None
    }

    fn selection(&self) -> Option<EditorSelection> {
        None
    }

    fn current_file(&self) -> Option<FileInfo> {
        None
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();

    info!("Starting snipdrop v{}", env!("CARGO_PKG_VERSION"));
    info!("  Service: {}", config.service_url());

    let service = HttpSnippetService::new(
        config.service_url(),
        Duration::from_secs(config.timeout_secs),
    )?;
    let sync = SyncContext::current(Arc::new(service))?;

    match config.command {
        Command::List => {
            let count = sync.refresh().join().await?;
            info!("Fetched {} snippets", count);
            print_groups(&sync.groups());
        }

        Command::Save {
            file,
            lines,
            category,
        } => {
            let editor = FileEditor::open(&file, lines, Some(config.project.clone()))
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let fragment = editor.fragment();
            let coordinator = TransferCoordinator::new(&sync, Arc::new(editor));

            let target = drop_target(category);
            let snippet = coordinator
                .import(DragPayload::Text(fragment), &target)?
                .join()
                .await?;
            println!("Created snippet {} ({})", snippet.id, snippet.name.unwrap_or_default());
        }

        Command::Reclassify { id, category } => {
            sync.refresh().join().await?;

            let source = find_node(&sync.groups(), &id)
                .ok_or_else(|| anyhow!("Snippet {} is not listed in any category", id))?;
            let coordinator = TransferCoordinator::new(&sync, Arc::new(NoEditor));
            let bundle = coordinator
                .begin_drag(source)
                .ok_or_else(|| anyhow!("Snippet {} cannot be dragged", id))?;

            let target = drop_target(Some(category));
            let snippet = coordinator
                .import(DragPayload::Snippet(bundle.snippet), &target)?
                .join()
                .await?;
            println!("Reclassified snippet {}", snippet.id);
        }

        Command::Show { id } => {
            sync.refresh().join().await?;

            let snippet = sync
                .cache()
                .get(&id)
                .ok_or_else(|| anyhow!("Snippet not found: {}", id))?;
            println!("{}", display_text(&snippet)?);
        }
    }

    Ok(())
}

/// Drop location for a category given on the command line, or the empty
/// area of the view when none is given.
fn drop_target(category: Option<String>) -> DropLocation {
    match category {
        Some(tag) => DropLocation::Node(NodePath::category(Category::new(tag).normalized())),
        None => DropLocation::Elsewhere,
    }
}

fn find_node(groups: &SnippetGroups, id: &str) -> Option<NodePath> {
    groups.groups().iter().find_map(|group| {
        group
            .snippets
            .iter()
            .find(|descriptor| descriptor.id == id)
            .map(|descriptor| NodePath::snippet(group.category.clone(), descriptor.clone()))
    })
}

fn print_groups(groups: &SnippetGroups) {
    match groups {
        SnippetGroups::Empty => println!("No snippets"),
        SnippetGroups::Groups(groups) => {
            for group in groups {
                println!("{} ({})", group.category, group.snippets.len());
                for descriptor in &group.snippets {
                    println!("  {}  {}", descriptor.id, descriptor.label());
                }
            }
        }
    }
}
