use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use coursekit_editor::Document;
use serde_json::json;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct BlocksArgs {
    /// Lesson document
    pub input: PathBuf,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

/// One tracked block in document order
#[derive(Debug, Clone, PartialEq)]
pub struct BlockRow {
    pub depth: usize,
    pub block_id: String,
    pub kind: &'static str,
    pub text: String,
}

const PREVIEW_CHARS: usize = 40;

/// Tracked blocks of a loaded document
pub fn block_rows(doc: &Document) -> Vec<BlockRow> {
    let tree = doc.tree();
    tree.descendants(tree.root())
        .into_iter()
        .filter_map(|key| {
            let block_id = tree.block_id(key)?;
            let kind = tree.kind(key)?;
            Some(BlockRow {
                depth: tree.ancestors(key).len().saturating_sub(1),
                block_id: block_id.to_string(),
                kind: kind.name(),
                text: tree.text_content(key).chars().take(PREVIEW_CHARS).collect(),
            })
        })
        .collect()
}

pub fn blocks(args: BlocksArgs, cwd: &Path, config: &Config) -> Result<()> {
    let doc = Document::load(&cwd.join(&args.input), &config.editor)?;
    let rows = block_rows(&doc);

    if args.format == "json" {
        let rows: Vec<_> = rows
            .iter()
            .map(|r| json!({ "blockId": r.block_id, "type": r.kind, "depth": r.depth }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for row in &rows {
        println!(
            "{}{} {} {}",
            "  ".repeat(row.depth),
            row.kind.bright_blue(),
            row.block_id.dimmed(),
            row.text
        );
    }
    println!();
    println!("   {} blocks", rows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursekit_editor::{Command, EditSession, EditorConfig};

    #[test]
    fn test_rows_follow_document_order() {
        let config = EditorConfig::sequential("b");
        let mut session = EditSession::new("cli", Document::new(&config), &config);
        session.dispatch(Command::InsertMcq);

        let rows = block_rows(&session.document);
        let kinds: Vec<&str> = rows.iter().map(|r| r.kind).collect();
        assert_eq!(&kinds[..3], ["paragraph", "mcq-container", "mcq-question"]);
        assert_eq!(rows[0].depth, 0);
        assert_eq!(rows[2].depth, 1);
        assert_eq!(rows[3].text, "?...");
        assert!(rows.iter().all(|r| !r.block_id.is_empty()));
    }
}
