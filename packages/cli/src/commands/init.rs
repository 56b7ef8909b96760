use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use coursekit_common::IdGenerator;
use coursekit_editor::empty_document_json;
use coursekit_toc::TocEditor;
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Lessons directory
    #[arg(short, long, default_value = "lessons")]
    pub lessons_dir: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing course...".bright_blue().bold());

    let config = Config {
        lessons_dir: args.lessons_dir.clone(),
        ..Config::default()
    };

    let lessons_dir = config.get_lessons_dir(cwd);
    if !lessons_dir.exists() {
        fs::create_dir_all(&lessons_dir)?;
        println!("  {} Created {}/", "✓".green(), args.lessons_dir);
    }

    let example = lessons_dir.join("lesson-1.json");
    if !example.exists() {
        fs::write(&example, empty_document_json())?;
        println!("  {} Created lesson-1.json", "✓".green());
    }

    let toc_path = config.get_toc_file(cwd);
    if !toc_path.exists() {
        let editor = TocEditor::new(IdGenerator::new(config.editor.id_strategy.clone()));
        fs::write(&toc_path, editor.state().to_json_pretty()?)?;
        println!("  {} Created {}", "✓".green(), config.toc_file);
    }

    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Course initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: coursekit toc outline");
    println!("  2. Run: coursekit check");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_scaffolds_course() {
        let dir = tempfile::tempdir().unwrap();
        init(
            InitArgs {
                lessons_dir: "content".to_string(),
                force: false,
            },
            dir.path(),
        )
        .unwrap();

        let config = Config::load(dir.path(), None).unwrap();
        assert_eq!(config.lessons_dir, "content");
        assert!(dir.path().join("content/lesson-1.json").exists());
        assert!(config.get_toc_file(dir.path()).exists());
    }
}
