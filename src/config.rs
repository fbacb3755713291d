use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Deserialization Error: {0}")]
    De(#[from] toml::de::Error),

    #[error("Serialization Error: {0}")]
    Ser(#[from] toml::ser::Error),
}

/// A packed game-data archive textures may be read from, tried before the
/// plain filesystem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchiveSource {
    pub path: PathBuf,
    pub password: Option<String>,
}

/// Where the cache looks for texture files and scale-factor overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextureConfig {
    /// Directory holding loose texture files and the base `scalefactors.txt`.
    pub textures_dir: PathBuf,
    /// Optional packed archive probed before the filesystem.
    pub archive: Option<ArchiveSource>,
    /// Compressed-format subdirectories whose `scalefactors.txt` files
    /// override the base one, in the order listed.
    pub format_subdirs: Vec<String>,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            textures_dir: PathBuf::from("data/textures"),
            archive: None,
            format_subdirs: vec![String::from("etc1"), String::from("pvr")],
        }
    }
}

impl TextureConfig {
    /// Loads a config from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: TextureConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves the config to a TOML file, ensuring the directory exists.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Redirects the texture directory into a custom level set, which keeps
    /// its own textures under `levels/<set>/data/textures` beneath the same
    /// storage root.
    pub fn with_level_set(mut self, set: &str) -> Self {
        let root = self
            .textures_dir
            .ancestors()
            .nth(2)
            .map(Path::to_path_buf)
            .unwrap_or_default();
        self.textures_dir = root
            .join("levels")
            .join(set)
            .join("data")
            .join("textures");
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_values() {
        let config = TextureConfig::default();
        assert_eq!(config.textures_dir, PathBuf::from("data/textures"));
        assert!(config.archive.is_none());
        assert_eq!(config.format_subdirs, vec!["etc1", "pvr"]);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempdir().expect("Failed to create temporary directory");
        let path = dir.path().join("textures.toml");

        let config = TextureConfig {
            textures_dir: PathBuf::from("game/data/textures"),
            archive: Some(ArchiveSource {
                path: PathBuf::from("game/data.zip"),
                password: Some(String::from("hunter2")),
            }),
            format_subdirs: vec![String::from("etc1")],
        };
        config.save_to_file(&path).unwrap();

        let loaded = TextureConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn corrupted_file_is_a_deserialization_error() {
        let dir = tempdir().expect("Failed to create temporary directory");
        let path = dir.path().join("textures.toml");
        fs::write(&path, "invalid toml content ::::").unwrap();

        let result = TextureConfig::load_from_file(&path);
        assert!(matches!(result, Err(ConfigError::De(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = TextureConfig::load_from_file(Path::new("does/not/exist.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn level_set_redirects_texture_dir() {
        let config = TextureConfig::default().with_level_set("community_pack");
        assert_eq!(
            config.textures_dir,
            PathBuf::from("levels/community_pack/data/textures")
        );
    }

    #[test]
    fn level_set_keeps_storage_root() {
        let config = TextureConfig {
            textures_dir: PathBuf::from("/opt/game/data/textures"),
            ..Default::default()
        }
        .with_level_set("community_pack");
        assert_eq!(
            config.textures_dir,
            PathBuf::from("/opt/game/levels/community_pack/data/textures")
        );
    }
}
