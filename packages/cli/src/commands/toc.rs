use crate::config::Config;
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use coursekit_common::IdGenerator;
use coursekit_toc::{ItemType, TocAction, TocEditor, TocState};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct TocArgs {
    /// Outline file; defaults to the configured one
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: TocCommand,
}

#[derive(Subcommand, Debug)]
pub enum TocCommand {
    /// Write the starter outline
    New {
        /// Overwrite an existing outline
        #[arg(long)]
        force: bool,
    },

    /// Print the outline as a tree
    Outline,

    /// Apply an action given as JSON, e.g. '{"type":"ADD_CHILD","payload":{"parentID":"ROOT"}}'
    Apply { action: String },
}

fn load_state(path: &Path) -> Result<TocState> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read outline {}", path.display()))?;
    Ok(TocState::from_json(&json)?)
}

fn save_state(path: &Path, state: &TocState, config: &Config) -> Result<()> {
    let json = if config.pretty {
        state.to_json_pretty()?
    } else {
        state.to_json()?
    };
    fs::write(path, json)?;
    Ok(())
}

fn print_outline(state: &TocState) {
    for entry in state.outline() {
        let marker = match entry.item_type {
            ItemType::Title => "■".bright_white().bold(),
            ItemType::Chapter => "▸".bright_blue(),
            ItemType::Lesson => "·".normal(),
        };
        let selected = if entry.id == state.selected_id { " ←" } else { "" };
        println!(
            "{}{} {} {}{}",
            "  ".repeat(entry.depth),
            marker,
            entry.name,
            entry.id.dimmed(),
            selected.green()
        );
    }
}

pub fn toc(args: TocArgs, cwd: &Path, config: &Config) -> Result<()> {
    let path = args
        .file
        .map(|f| cwd.join(f))
        .unwrap_or_else(|| config.get_toc_file(cwd));
    let ids = IdGenerator::new(config.editor.id_strategy.clone());

    match args.command {
        TocCommand::New { force } => {
            if path.exists() && !force {
                println!("{} {} already exists", "⚠️".yellow(), path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }
            let editor = TocEditor::new(ids);
            save_state(&path, editor.state(), config)?;
            println!("  {} Created {}", "✓".green(), path.display());
        }
        TocCommand::Outline => print_outline(&load_state(&path)?),
        TocCommand::Apply { action } => {
            let action: TocAction =
                serde_json::from_str(&action).context("Invalid TOC action")?;
            let name = action.name();
            let mut editor = TocEditor::from_state(load_state(&path)?, ids)?;
            if editor.dispatch(action).is_applied() {
                save_state(&path, editor.state(), config)?;
                println!("  {} {}", "✓".green(), name);
            } else {
                println!("  {} {} ignored", "⚠".yellow(), name);
            }
        }
    }
    Ok(())
}
