use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub logging: LoggingSection,
    #[serde(default)]
    pub recipes: RecipesSection,
    #[serde(default)]
    pub storage: StorageSection,
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct RecipesSection {
    #[serde(default = "default_recipes_path")]
    pub path: String,
    #[serde(default = "default_recipes_suffix")]
    pub suffix: String,
    /// File stems or directory names to load. `"*"` loads everything.
    #[serde(default = "default_enabled_recipes")]
    pub enabled: Vec<String>,
}

fn default_recipes_path() -> String {
    "files/recipes".into()
}

fn default_recipes_suffix() -> String {
    ".recipe".into()
}

fn default_enabled_recipes() -> Vec<String> {
    vec!["*".into()]
}

impl Default for RecipesSection {
    fn default() -> Self {
        Self {
            path: default_recipes_path(),
            suffix: default_recipes_suffix(),
            enabled: default_enabled_recipes(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StorageSection {
    /// Directory holding one file per saved container.
    #[serde(default = "default_storage_directory")]
    pub directory: String,
}

fn default_storage_directory() -> String {
    "world/containers".into()
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            directory: default_storage_directory(),
        }
    }
}

impl ServerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }
}
