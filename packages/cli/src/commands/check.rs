use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use coursekit_common::IdGenerator;
use coursekit_editor::{import_document, violations, BlockIdentity};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Lesson file or directory; defaults to the configured lessons directory
    pub input: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

/// Result of checking one lesson file
#[derive(Debug, Clone, PartialEq)]
pub enum FileStatus {
    Valid { nodes: usize },
    /// Parsed, but composite shapes need repair
    Violations(Vec<String>),
    /// Rejected by the codec
    Invalid(String),
}

impl FileStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, FileStatus::Valid { .. })
    }
}

pub fn check(args: CheckArgs, cwd: &Path, config: &Config) -> Result<()> {
    let input = args
        .input
        .clone()
        .unwrap_or_else(|| config.get_lessons_dir(cwd));

    let files = if input.is_file() {
        vec![input.clone()]
    } else if input.is_dir() {
        find_lesson_files(&input)?
    } else {
        return Err(anyhow::anyhow!(
            "Input path does not exist: {}",
            input.display()
        ));
    };

    let mut reports = Vec::new();
    for file in &files {
        reports.push((file.clone(), check_file(file, config)?));
    }
    let failed = reports.iter().filter(|(_, s)| !s.is_valid()).count();

    if args.format == "json" {
        let rows: Vec<_> = reports
            .iter()
            .map(|(path, status)| {
                let (state, problems) = match status {
                    FileStatus::Valid { .. } => ("valid", Vec::new()),
                    FileStatus::Violations(v) => ("violations", v.clone()),
                    FileStatus::Invalid(e) => ("invalid", vec![e.clone()]),
                };
                json!({ "path": path.display().to_string(), "status": state, "problems": problems })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!("🔍 {} {}", "Checking".green().bold(), input.display());
        println!();
        for (path, status) in &reports {
            print_status(path, status);
        }
        println!();
        println!("   Files checked: {}", files.len());
        if failed == 0 {
            println!("   {} No issues found!", "✓".green());
        }
    }

    if failed > 0 {
        return Err(anyhow::anyhow!("{} of {} files failed the check", failed, files.len()));
    }
    Ok(())
}

fn print_status(path: &Path, status: &FileStatus) {
    match status {
        FileStatus::Valid { nodes } => {
            println!("  {} {} ({} nodes)", "✓".green(), path.display(), nodes)
        }
        FileStatus::Violations(problems) => {
            println!("  {} {}", "⚠".yellow(), path.display());
            for problem in problems {
                println!("      {}", problem.yellow());
            }
        }
        FileStatus::Invalid(error) => {
            println!("  {} {}: {}", "✗".red(), path.display(), error);
        }
    }
}

/// Import `path` without normalizing and report what the shape checker finds
pub fn check_file(path: &Path, config: &Config) -> Result<FileStatus> {
    let source = fs::read_to_string(path)?;
    let mut identity = BlockIdentity::new(IdGenerator::new(config.editor.id_strategy.clone()));

    let tree = match import_document(&source, &mut identity) {
        Ok(tree) => tree,
        Err(err) => return Ok(FileStatus::Invalid(err.to_string())),
    };
    let problems: Vec<String> = violations(&tree).iter().map(|v| v.to_string()).collect();
    if problems.is_empty() {
        Ok(FileStatus::Valid { nodes: tree.len() })
    } else {
        Ok(FileStatus::Violations(problems))
    }
}

/// Lesson documents below `dir`, skipping outlines and config files
pub fn find_lesson_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy();
        let is_json = path.extension().map(|e| e == "json").unwrap_or(false);
        if path.is_file() && is_json && !name.ends_with(".toc.json") && name != DEFAULT_CONFIG_NAME {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}
