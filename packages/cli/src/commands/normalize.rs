use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use coursekit_editor::{Document, NormalizeReport};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Lesson document to repair
    pub input: PathBuf,

    /// Write here instead of stdout
    #[arg(short, long, conflicts_with = "in_place")]
    pub output: Option<PathBuf>,

    /// Overwrite the input file
    #[arg(short, long)]
    pub in_place: bool,
}

/// Import `source`, repair it and export it again
pub fn normalize_source(source: &str, config: &Config) -> Result<(String, NormalizeReport)> {
    let mut doc = Document::empty(&config.editor);
    let report = doc.import_json(source)?;
    let json = if config.pretty {
        doc.to_json_pretty()?
    } else {
        doc.to_json()?
    };
    Ok((json, report))
}

pub fn normalize(args: NormalizeArgs, cwd: &Path, config: &Config) -> Result<()> {
    let input = cwd.join(&args.input);
    let source = fs::read_to_string(&input)?;
    let (json, report) = normalize_source(&source, config)?;

    let target = if args.in_place {
        Some(input.clone())
    } else {
        args.output.as_ref().map(|o| cwd.join(o))
    };
    match target {
        Some(path) => {
            fs::write(&path, json)?;
            println!(
                "  {} {} ({} repairs in {} passes)",
                "✓".green(),
                path.display(),
                report.repairs,
                report.passes
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orphaned_content_is_unwrapped() {
        let source = r#"{"root":{"type":"root","version":1,"children":[
            {"type":"collapsible-content","version":1,"children":[
                {"type":"paragraph","version":1,"blockId":"keep","children":[
                    {"type":"text","version":1,"text":"body"}
                ]}
            ]}
        ]}}"#;
        let (json, report) = normalize_source(source, &Config::default()).unwrap();
        assert!(report.repairs > 0);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let blocks = value["root"]["children"].as_array().unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0]["type"], "tracked-paragraph");
        assert_eq!(blocks[0]["blockId"], "keep");
    }

    #[test]
    fn test_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lesson.json");
        fs::write(&path, coursekit_editor::EMPTY_DOCUMENT_JSON).unwrap();

        let args = NormalizeArgs {
            input: PathBuf::from("lesson.json"),
            output: None,
            in_place: true,
        };
        normalize(args, dir.path(), &Config::default()).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("tracked-paragraph"));
        assert!(written.contains("blockId"));
    }
}
