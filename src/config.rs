//! Per-build configuration tree
//!
//! Each recognised build may ship a TOML file naming its files and locating
//! its message tables. The tree is only ever queried; a build without a
//! configuration still parses, it just has no file names or text tables.

use std::path::{Path, PathBuf};

use log::{debug, trace};
use serde::Deserialize;
use toml::{Table, Value};

use crate::error::ConfigError;
use crate::version::Version;

/// Directory of configuration files shipped with the crate.
pub const PACKAGED_CONFIG_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config");

#[derive(Debug, Clone, Default)]
pub struct ConfigTree {
    root: Table,
}

/// `messageTable` group.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct MessageTableConfig {
    /// Offset of the table inside the `code` file.
    pub offset: Option<u32>,
    /// Per-language table files, used by builds without a table in `code`.
    pub files: Option<LanguageFiles>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct LanguageFiles {
    pub en: String,
    pub de: String,
    pub fr: String,
    pub es: String,
}

impl ConfigTree {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let root = text.parse::<Table>()?;
        Ok(ConfigTree { root })
    }

    pub fn load(path: &Path) -> Result<Self, crate::error::Error> {
        debug!("loading config {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Ok(ConfigTree::from_toml(&text)?)
    }

    /// Find the configuration file for `version`, trying each of
    /// `search_paths` before the packaged directory.
    pub fn locate(version: Version, search_paths: &[PathBuf]) -> Option<PathBuf> {
        let name = format!("{}.toml", version.config_name()?);
        search_paths
            .iter()
            .map(PathBuf::as_path)
            .chain(std::iter::once(Path::new(PACKAGED_CONFIG_DIR)))
            .map(|dir| dir.join(&name))
            .find(|candidate| {
                trace!("looking for config at {}", candidate.display());
                candidate.is_file()
            })
    }

    /// Locate and load, treating every failure as "no configuration".
    pub fn for_version(version: Version, search_paths: &[PathBuf]) -> Option<Self> {
        let path = ConfigTree::locate(version, search_paths)?;
        match ConfigTree::load(&path) {
            Ok(tree) => Some(tree),
            Err(e) => {
                log::warn!("ignoring config {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn get_value(&self, path: &[&str]) -> Option<&Value> {
        let (last, groups) = path.split_last()?;
        let mut table = &self.root;
        for group in groups {
            table = table.get(*group)?.as_table()?;
        }
        table.get(*last)
    }

    pub fn has_key(&self, path: &[&str]) -> bool {
        self.get_value(path).is_some()
    }

    pub fn get_str(&self, path: &[&str]) -> Option<&str> {
        self.get_value(path)?.as_str()
    }

    /// Read an integer. Strings in `0x` hex notation are accepted too.
    pub fn get_u32(&self, path: &[&str]) -> Result<u32, ConfigError> {
        let key = path.join(".");
        let value = self
            .get_value(path)
            .ok_or_else(|| ConfigError::MissingKey(key.clone()))?;
        let parsed = match value {
            Value::Integer(i) => u32::try_from(*i).ok(),
            Value::String(s) => match s.strip_prefix("0x") {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => s.parse().ok(),
            },
            _ => None,
        };
        parsed.ok_or_else(|| ConfigError::BadValue {
            key,
            value: value.to_string(),
        })
    }

    /// Name of the first key in `group` whose string value equals `value`.
    pub fn find_key(&self, group: &[&str], value: &str) -> Option<&str> {
        let table = if group.is_empty() {
            &self.root
        } else {
            self.get_value(group)?.as_table()?
        };
        table
            .iter()
            .find(|(_, v)| v.as_str() == Some(value))
            .map(|(k, _)| k.as_str())
    }

    pub fn message_table(&self) -> Result<MessageTableConfig, ConfigError> {
        let value = self
            .get_value(&["messageTable"])
            .ok_or_else(|| ConfigError::MissingKey("messageTable".to_string()))?;
        value.clone().try_into().map_err(|_| ConfigError::BadValue {
            key: "messageTable".to_string(),
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[fileList]
"00000000" = "makerom"
"00A87000" = "code"

[fileList.fakeNames]
"00B00000" = "unnamed_b00000"

[messageTable]
offset = 0x12E4C0

[messageData]
en = "nes_message_data_static"
offset_hex = "0x1000"
"#;

    #[test]
    fn lookups() {
        let tree = ConfigTree::from_toml(SAMPLE).unwrap();
        assert_eq!(tree.get_str(&["fileList", "00A87000"]), Some("code"));
        assert_eq!(
            tree.get_str(&["fileList", "fakeNames", "00B00000"]),
            Some("unnamed_b00000")
        );
        assert!(tree.has_key(&["messageTable", "offset"]));
        assert!(!tree.has_key(&["messageTable", "files"]));
        assert_eq!(tree.get_u32(&["messageTable", "offset"]).unwrap(), 0x12E4C0);
        assert_eq!(tree.get_u32(&["messageData", "offset_hex"]).unwrap(), 0x1000);
        assert!(matches!(
            tree.get_u32(&["messageData", "en"]),
            Err(ConfigError::BadValue { .. })
        ));
        assert!(matches!(
            tree.get_u32(&["nothing"]),
            Err(ConfigError::MissingKey(_))
        ));
    }

    #[test]
    fn find_key_by_value() {
        let tree = ConfigTree::from_toml(SAMPLE).unwrap();
        assert_eq!(tree.find_key(&["fileList"], "code"), Some("00A87000"));
        assert_eq!(tree.find_key(&["fileList"], "nope"), None);
    }

    #[test]
    fn message_table_group() {
        let tree = ConfigTree::from_toml(SAMPLE).unwrap();
        let mt = tree.message_table().unwrap();
        assert_eq!(mt.offset, Some(0x12E4C0));
        assert_eq!(mt.files, None);
    }

    #[test]
    fn bad_toml_is_parse_error() {
        assert!(matches!(
            ConfigTree::from_toml("fileList = ["),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn packaged_config_is_found() {
        let tree = ConfigTree::for_version(Version::OotNtsc10, &[]).unwrap();
        assert_eq!(tree.get_str(&["fileList", "00A87000"]), Some("code"));
        assert!(ConfigTree::locate(Version::Unknown, &[]).is_none());
        assert!(ConfigTree::for_version(Version::MmEuDebug, &[PathBuf::from("/nonexistent")]).is_none());
    }
}
