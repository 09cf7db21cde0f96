use std::path::Path;

use crate::error::Error;

/// Name of the optional config file at the vault root.
pub const CONFIG_FILE: &str = ".hashattach.toml";

/// Vault configuration loaded from `.hashattach.toml`.
/// Exclude patterns are vault-relative path prefixes applied to attachments.
#[derive(Debug, Clone)]
pub struct Config {
    /// Attachment path prefixes that are never renamed.
    exclude: Vec<String>,
    /// Lowercased extensions that are never renamed.
    ignore_extensions: Vec<String>,
    /// Keep alias / alt text when rewriting a reference.
    pub keep_display_text: bool,
}

/// Raw TOML structure for `.hashattach.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct HashattachTomlConfig {
    /// See `Config::exclude`.
    #[serde(default)]
    exclude: Vec<String>,
    /// See `Config::ignore_extensions`.
    #[serde(default = "default_ignore_extensions")]
    ignore_extensions: Vec<String>,
    /// See `Config::keep_display_text`.
    #[serde(default)]
    keep_display_text: bool,
}

/// Embedded notes are links too; leave them alone unless told otherwise.
fn default_ignore_extensions() -> Vec<String> {
    return vec!["md".to_string()];
}

impl Default for Config {
    /// Renames every non-markdown attachment and drops display text.
    fn default() -> Self {
        return Self::from_lists(Vec::new(), default_ignore_extensions(), false);
    }
}

impl Config {
    /// Build a config, normalizing extensions to lowercase without a leading dot.
    pub fn from_lists(exclude: Vec<String>, ignore_extensions: Vec<String>, keep_display_text: bool) -> Self {
        let ignore_extensions = ignore_extensions
            .into_iter()
            .map(|ext| return ext.trim_start_matches('.').to_ascii_lowercase())
            .collect();
        return Self { exclude, ignore_extensions, keep_display_text };
    }

    /// Load config from `.hashattach.toml` in the vault root.
    /// Returns the default if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; never silently
    /// falls back to defaults when the user wrote a config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(vault: &Path) -> Result<Self, Error> {
        let path = vault.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
        };

        let raw: HashattachTomlConfig = toml::from_str(&content)?;
        return Ok(Self::from_lists(raw.exclude, raw.ignore_extensions, raw.keep_display_text));
    }

    /// Check whether an attachment may be renamed.
    ///
    /// An attachment is skipped if its extension is ignored (case-insensitive)
    /// or its vault-relative path starts with any exclude prefix.
    pub fn should_rename(&self, store_path: &str, extension: &str) -> bool {
        let ext = extension.to_ascii_lowercase();
        if self.ignore_extensions.contains(&ext) {
            return false;
        }

        return !self.exclude.iter().any(|p| return store_path.starts_with(p.as_str()));
    }
}
