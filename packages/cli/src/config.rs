use anyhow::Context;
use coursekit_editor::EditorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "coursekit.config.json";

/// Coursekit configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding lesson documents
    #[serde(default = "default_lessons_dir")]
    pub lessons_dir: String,

    /// Course outline file
    #[serde(default = "default_toc_file")]
    pub toc_file: String,

    /// Write pretty-printed JSON
    #[serde(default = "default_pretty")]
    pub pretty: bool,

    /// Editor settings applied to every loaded document
    #[serde(default)]
    pub editor: EditorConfig,
}

fn default_lessons_dir() -> String {
    "lessons".to_string()
}

fn default_toc_file() -> String {
    "course.toc.json".to_string()
}

fn default_pretty() -> bool {
    true
}

impl Config {
    /// Load `explicit` if given, else the config in `cwd`, else defaults
    pub fn load(cwd: &Path, explicit: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = cwd.join(DEFAULT_CONFIG_NAME);
                if !path.exists() {
                    return Ok(Config::default());
                }
                path
            }
        };
        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Cannot read {}", config_path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config {}", config_path.display()))?;
        Ok(config)
    }

    pub fn get_lessons_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.lessons_dir)
    }

    pub fn get_toc_file(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.toc_file)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lessons_dir: default_lessons_dir(),
            toc_file: default_toc_file(),
            pretty: default_pretty(),
            editor: EditorConfig::default(),
        }
    }
}
