use std::io;

use log::debug;
use time::macros::format_description;

use crate::{
    changelog::Changelog, error::Result, fmt::FormatWriter, git::Commit, sectionmap::SectionMap,
};

/// Wraps a `std::io::Write` object to write `changelog` output in a Markdown
/// format
///
/// # Example
///
/// ```no_run
/// # use std::fs::File;
/// # use changelog::{Changelog, SectionMap, fmt::{FormatWriter, MarkdownWriter}};
/// let changelog = Changelog::new().version("1.2.0");
///
/// // Get the commits we're interested in...
/// let sm = SectionMap::from_commits(changelog.get_commits().unwrap());
///
/// // Create a file to hold our results, which the MarkdownWriter will wrap
/// let mut file = File::create("my_changelog.md").unwrap();
///
/// let mut writer = MarkdownWriter::new(&mut file);
/// writer.write_changelog(&changelog, &sm).unwrap();
/// ```
pub struct MarkdownWriter<'a>(&'a mut dyn io::Write);

impl<'a> MarkdownWriter<'a> {
    /// Creates a new instance of the `MarkdownWriter` struct using a
    /// `std::io::Write` object.
    pub fn new<T: io::Write + 'a>(writer: &'a mut T) -> MarkdownWriter<'a> {
        MarkdownWriter(writer)
    }

    fn write_header(&mut self, options: &Changelog) -> Result<()> {
        let version = options.version.as_deref().unwrap_or_default();

        let mut version_text = if options.patch_ver {
            format!("### {version}")
        } else {
            format!("## {version}")
        };
        if let Some(subtitle) = options.subtitle.as_deref().filter(|s| !s.is_empty()) {
            version_text.push(' ');
            version_text.push_str(subtitle);
        }
        if let Some(date) = options.date {
            let date = date.format(format_description!("[year]-[month]-[day]"))?;
            version_text.push_str(&format!(" ({date})"));
        }

        writeln!(self.0, "<a name=\"{version}\"></a>\n{version_text}\n").map_err(Into::into)
    }

    /// Writes a particular section of a changelog
    fn write_section(&mut self, options: &Changelog, title: &str, entries: &[Commit]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        write!(self.0, "\n#### {title}\n\n")?;

        for entry in entries {
            write!(self.0, "* {}{} (", component_prefix(entry), entry.subject)?;
            self.write_hash(options, &entry.hash)?;

            if !entry.closes.is_empty() {
                let closes_string = entry
                    .closes
                    .iter()
                    .map(|&issue| {
                        match options.link_style.issue_link(issue, options.repo.as_deref()) {
                            Some(link) => format!("[#{issue}]({link})"),
                            None => format!("#{issue}"),
                        }
                    })
                    .collect::<Vec<String>>()
                    .join(", ");

                write!(self.0, ", closes {closes_string}")?;
            }

            writeln!(self.0, ")")?;
        }

        Ok(())
    }

    /// Lists every breaking note under the commit that introduced it
    fn write_breaking(&mut self, sm: &SectionMap) -> Result<()> {
        let mut breaking = sm.breaking().peekable();
        if breaking.peek().is_none() {
            return Ok(());
        }

        write!(self.0, "\n#### Breaking Changes\n\n")?;

        for entry in breaking {
            writeln!(self.0, "* {}{}", component_prefix(entry), entry.subject)?;
            for note in &entry.breaks {
                for line in note.trim_end().lines() {
                    if line.is_empty() {
                        writeln!(self.0)?;
                    } else {
                        writeln!(self.0, "  {line}")?;
                    }
                }
            }
        }

        Ok(())
    }

    fn write_hash(&mut self, options: &Changelog, hash: &str) -> Result<()> {
        let short = hash.get(..8).unwrap_or(hash);
        let res = match options.link_style.commit_link(hash, options.repo.as_deref()) {
            Some(link) => write!(self.0, "[{short}]({link})"),
            None => write!(self.0, "{short}"),
        };
        res.map_err(Into::into)
    }
}

fn component_prefix(entry: &Commit) -> String {
    if entry.component.is_empty() {
        String::new()
    } else {
        format!("**{}:** ", entry.component)
    }
}

impl<'a> FormatWriter for MarkdownWriter<'a> {
    fn write_changelog(&mut self, options: &Changelog, sm: &SectionMap) -> Result<()> {
        debug!("Writing {} markdown section(s)", sm.sections.len());
        self.write_header(options)?;

        for (commit_type, entries) in &sm.sections {
            self.write_section(options, options.section_for(commit_type), entries)?;
        }
        self.write_breaking(sm)?;

        self.0.flush().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    fn commit(commit_type: &str, component: &str, subject: &str) -> Commit {
        Commit {
            hash: "0123456789abcdef0123456789abcdef01234567".into(),
            subject: subject.into(),
            component: component.into(),
            closes: vec![],
            breaks: vec![],
            commit_type: commit_type.into(),
            body: String::new(),
        }
    }

    fn write(options: &Changelog, commits: Vec<Commit>) -> String {
        let sm = SectionMap::from_commits(commits);
        let mut out = Vec::new();
        MarkdownWriter::new(&mut out)
            .write_changelog(options, &sm)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn header_only() {
        let options = Changelog::new().version("1.0.0");
        assert_eq!(write(&options, vec![]), "<a name=\"1.0.0\"></a>\n## 1.0.0\n\n");
    }

    #[test]
    fn header_with_patch_subtitle_and_date() {
        let options = Changelog::new()
            .version("1.0.1")
            .patch_ver(true)
            .subtitle("Hotfix")
            .date(date!(2024 - 03 - 07));
        assert_eq!(
            write(&options, vec![]),
            "<a name=\"1.0.1\"></a>\n### 1.0.1 Hotfix (2024-03-07)\n\n"
        );
    }

    #[test]
    fn sections_use_titles_and_first_seen_order() {
        let options = Changelog::new().version("2.0.0");
        let mut fix = commit("fix", "", "handle empty input");
        fix.closes = vec![3, 4];

        let out = write(
            &options,
            vec![
                fix,
                commit("feat", "parser", "add support for x."),
                commit("docs", "", "explain things"),
            ],
        );

        assert_eq!(
            out,
            "<a name=\"2.0.0\"></a>\n## 2.0.0\n\n\n#### Bug Fixes\n\n* handle empty input (01234567, \
             closes #3, #4)\n\n#### Features\n\n* **parser:** add support for x. (01234567)\n\n#### \
             docs\n\n* explain things (01234567)\n"
        );
    }

    #[test]
    fn links_when_repository_is_set() {
        let options = Changelog::new()
            .version("1.0.0")
            .repository("https://github.com/owner/repo");
        let mut feat = commit("feat", "", "x");
        feat.closes = vec![42];

        let out = write(&options, vec![feat]);
        assert!(out.contains(
            "* x ([01234567](https://github.com/owner/repo/commit/0123456789abcdef0123456789abcdef01234567), \
             closes [#42](https://github.com/owner/repo/issues/42))\n"
        ));
    }

    #[test]
    fn breaking_changes_are_listed_last() {
        let options = Changelog::new().version("3.0.0");
        let mut feat = commit("feat", "config", "new format");
        feat.breaks = vec!["the config format changed\n\nmigrate with `x`\n".into()];

        let out = write(&options, vec![feat, commit("fix", "", "y")]);
        assert!(out.ends_with(
            "\n#### Breaking Changes\n\n* **config:** new format\n  the config format changed\n\n  migrate \
             with `x`\n"
        ));
    }

    #[test]
    fn short_hashes_do_not_panic() {
        let options = Changelog::new().version("1.0.0");
        let mut feat = commit("feat", "", "x");
        feat.hash = "abc".into();
        assert!(write(&options, vec![feat]).contains("* x (abc)\n"));
    }
}
