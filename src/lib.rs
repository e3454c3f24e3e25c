//! Generates a conventional changelog from a repository's history.
//!
//! Commits following the `type(component): subject` convention are
//! classified into [`git::Commit`] records, grouped by type and rendered as a
//! Markdown release section that is prepended to an existing changelog.
//!
//! ```
//! use changelog::{parse::classify_all, render};
//!
//! let log = "8a3f0c2\nfeat(parser): add support for x. Closes #42\n\n==END==\n";
//! let content = render("", classify_all(log), "1.0.0").unwrap();
//!
//! assert!(content.contains("* **parser:** add support for x. (8a3f0c2, closes #42)"));
//! ```

#[macro_use]
mod macros;
mod changelog;
pub mod config;
pub mod error;
pub mod fmt;
pub mod git;
mod link_style;
pub mod parse;
mod sectionmap;

pub use changelog::{render, Changelog, DEFAULT_GREP};
pub use link_style::LinkStyle;
pub use sectionmap::SectionMap;

// The default config file
const DEFAULT_CONFIG_FILE: &str = ".changelog.toml";
