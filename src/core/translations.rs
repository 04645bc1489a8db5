/// Description Translations
///
/// Tool and toolset descriptions are looked up by upper-case keys such as
/// `TOOL_GET_ME_DESCRIPTION`. Overrides come from a JSON file and from
/// `GITHUB_MCP_<KEY>` environment variables (env wins). Every key looked up
/// is remembered so the full table can be exported for editing.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::core::error::LoopError;

/// File read for overrides and written by export, relative to the working directory.
pub const CONFIG_FILE_NAME: &str = "github-mcp-server-config.json";

const ENV_PREFIX: &str = "GITHUB_MCP_";

#[derive(Debug, Default)]
pub struct Translations {
    overrides: HashMap<String, String>,
    used: BTreeMap<String, String>,
}

impl Translations {
    pub fn new(overrides: HashMap<String, String>) -> Self {
        Self {
            overrides: overrides
                .into_iter()
                .map(|(k, v)| (k.to_ascii_uppercase(), v))
                .collect(),
            used: BTreeMap::new(),
        }
    }

    /// Load overrides from `dir/github-mcp-server-config.json` (if present) and
    /// from `GITHUB_MCP_*` variables in `env`.
    pub fn load<I>(dir: &Path, env: I) -> Result<Self, LoopError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let path = dir.join(CONFIG_FILE_NAME);
        let mut overrides: HashMap<String, String> = HashMap::new();

        if path.exists() {
            let read_err = |reason: String| LoopError::TranslationsRead {
                path: path.display().to_string(),
                reason,
            };
            let text = std::fs::read_to_string(&path).map_err(|e| read_err(e.to_string()))?;
            let table: HashMap<String, String> =
                serde_json::from_str(&text).map_err(|e| read_err(e.to_string()))?;
            overrides.extend(table.into_iter().map(|(k, v)| (k.to_ascii_uppercase(), v)));
        }

        // folded on insert: env entries replace file entries
        for (name, value) in env {
            if let Some(key) = name.strip_prefix(ENV_PREFIX) {
                overrides.insert(key.to_ascii_uppercase(), value);
            }
        }

        Ok(Self::new(overrides))
    }

    /// Look up `key`, falling back to `default`, and record the result.
    pub fn translate(&mut self, key: &str, default: &str) -> String {
        let key = key.to_ascii_uppercase();
        let value = self
            .overrides
            .get(&key)
            .cloned()
            .unwrap_or_else(|| default.to_string());
        self.used.insert(key, value.clone());
        value
    }

    /// Every key looked up so far, with its effective value.
    pub fn used(&self) -> &BTreeMap<String, String> {
        &self.used
    }

    /// Write the used table to `dir/github-mcp-server-config.json`.
    pub fn export(&self, dir: &Path) -> Result<PathBuf, LoopError> {
        let path = dir.join(CONFIG_FILE_NAME);
        let write_err = |reason: String| LoopError::TranslationsWrite {
            path: path.display().to_string(),
            reason,
        };
        let json = serde_json::to_string_pretty(self.used()).map_err(|e| write_err(e.to_string()))?;
        std::fs::write(&path, json).map_err(|e| write_err(e.to_string()))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_used_without_overrides() {
        let mut t = Translations::default();
        assert_eq!(t.translate("TOOL_GET_ME_DESCRIPTION", "Get me"), "Get me");
        assert_eq!(t.used().get("TOOL_GET_ME_DESCRIPTION").unwrap(), "Get me");
    }

    #[test]
    fn env_override_beats_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{"TOOL_GET_ME_DESCRIPTION": "from file", "TOOL_X_DESCRIPTION": "x file"}"#,
        )
        .unwrap();
        let env = vec![(
            "GITHUB_MCP_TOOL_GET_ME_DESCRIPTION".to_string(),
            "from env".to_string(),
        )];
        let mut t = Translations::load(dir.path(), env).unwrap();
        assert_eq!(t.translate("tool_get_me_description", "default"), "from env");
        assert_eq!(t.translate("TOOL_X_DESCRIPTION", "default"), "x file");
    }

    #[test]
    fn env_override_beats_lower_case_file_key() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{"tool_get_me_description": "from file"}"#,
        )
        .unwrap();
        for _ in 0..32 {
            let env = vec![(
                "GITHUB_MCP_TOOL_GET_ME_DESCRIPTION".to_string(),
                "from env".to_string(),
            )];
            let mut t = Translations::load(dir.path(), env).unwrap();
            assert_eq!(t.translate("TOOL_GET_ME_DESCRIPTION", "default"), "from env");
        }
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "not json").unwrap();
        let err = Translations::load(dir.path(), Vec::new()).unwrap_err();
        assert!(matches!(err, LoopError::TranslationsRead { .. }));
    }

    #[test]
    fn export_writes_used_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = Translations::default();
        t.translate("TOOLSET_REPOS_DESCRIPTION", "GitHub Repository related tools");
        let path = t.export(dir.path()).unwrap();

        let written: BTreeMap<String, String> =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(
            written.get("TOOLSET_REPOS_DESCRIPTION").map(String::as_str),
            Some("GitHub Repository related tools")
        );
    }
}
