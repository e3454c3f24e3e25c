mod md_writer;

pub use self::md_writer::MarkdownWriter;
use crate::{changelog::Changelog, error::Result, sectionmap::SectionMap};

/// A trait that allows writing the results of a `changelog` run in an
/// arbitrary format. The single required function `write_changelog()` accepts
/// a `changelog::SectionMap` which can be thought of similiar to a changelog
/// "AST" of sorts.
///
/// The crate provides `changelog::fmt::MarkdownWriter` as the default
/// implementor.
pub trait FormatWriter {
    /// Writes a changelog from a given `changelog::SectionMap` which can be
    /// thought of as an "AST" of sorts
    fn write_changelog(&mut self, options: &Changelog, section_map: &SectionMap) -> Result<()>;
}
