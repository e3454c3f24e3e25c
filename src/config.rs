use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::link_style::LinkStyle;

/// The on-disk shape of a `.changelog.toml` file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCfg {
    #[serde(default)]
    pub changelog: RawChangelogCfg,
    /// section title -> commit types collected under it, in file order
    #[serde(default)]
    pub sections: IndexMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RawChangelogCfg {
    pub file: Option<String>,
    pub repository: Option<String>,
    pub link_style: LinkStyle,
    pub subtitle: Option<String>,
    pub grep: Option<String>,
    pub git_dir: Option<PathBuf>,
    pub git_work_tree: Option<PathBuf>,
}
