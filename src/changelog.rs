use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use log::{debug, info};
use time::{Date, OffsetDateTime};

use crate::{
    config::RawCfg,
    error::{Error, Result},
    fmt::{FormatWriter, MarkdownWriter},
    git::{Commits, GitRepo},
    link_style::LinkStyle,
    parse::{classify_all, COMMIT_DELIMITER},
    sectionmap::SectionMap,
    DEFAULT_CONFIG_FILE,
};

/// Grep pattern selecting the commits worth looking at
pub const DEFAULT_GREP: &str = "^feat|^fix|BREAKING";

/// The base struct used to set options and interact with the library.
#[derive(Debug, Clone)]
pub struct Changelog {
    /// The grep search pattern used to find commits we are interested in
    /// (Defaults to: "^feat|^fix|BREAKING")
    pub grep: String,
    /// The format of the commit output from `git log` (Defaults to:
    /// "%H%n%s%n%b%n==END==")
    pub format: String,
    /// The repository used for the base of hyper-links
    pub repo: Option<String>,
    /// The link style to used for commit and issue hyper-links
    pub link_style: LinkStyle,
    /// The version label for the release, required before anything is
    /// written
    pub version: Option<String>,
    /// Whether or not this is a patch version update or not. Patch versions
    /// use a lower markdown header (`###` instead of `##` for major and minor
    /// releases)
    pub patch_ver: bool,
    /// The subtitle for the release
    pub subtitle: Option<String>,
    /// The release date shown in the header, omitted when `None`
    pub date: Option<Date>,
    /// Where the changelog starts (Defaults to the latest tag, or the first
    /// commit)
    pub from: Option<String>,
    /// Where the changelog ends (Defaults to `HEAD`)
    pub to: String,
    /// The changelog file read from and prepended to (Defaults to
    /// `CHANGELOG.md`)
    pub file: PathBuf,
    /// Maps out the sections and aliases used to trigger those sections. The
    /// keys are the section title, and the values are an array of commit
    /// types.
    pub section_map: IndexMap<String, Vec<String>>,
    /// The git dir with all the meta-data (Typically the `.git` sub-directory
    /// of the project)
    pub git_dir: Option<PathBuf>,
    /// The working directory of the git project
    pub git_work_tree: Option<PathBuf>,
}

impl Default for Changelog {
    fn default() -> Self {
        debug!("Creating default changelog with Changelog::default()");
        let mut sections = IndexMap::new();
        sections.insert("Features".to_owned(), vec!["feat".to_owned()]);
        sections.insert("Bug Fixes".to_owned(), vec!["fix".to_owned()]);

        Changelog {
            grep: DEFAULT_GREP.to_owned(),
            format: format!("%H%n%s%n%b%n{COMMIT_DELIMITER}"),
            repo: None,
            link_style: LinkStyle::Github,
            version: None,
            patch_ver: false,
            subtitle: None,
            date: None,
            from: None,
            to: "HEAD".to_owned(),
            file: PathBuf::from("CHANGELOG.md"),
            section_map: sections,
            git_dir: None,
            git_work_tree: None,
        }
    }
}

impl Changelog {
    /// Creates a `Changelog` with the default options, without looking for a
    /// configuration file.
    ///
    /// # Example
    ///
    /// ```
    /// # use changelog::Changelog;
    /// let changelog = Changelog::new();
    /// assert_eq!("Features", changelog.section_for("feat"));
    /// ```
    pub fn new() -> Self { Changelog::default() }

    /// Creates a `Changelog` from `.changelog.toml` in the current directory
    /// if it exists, or the defaults otherwise.
    pub fn with_default_config() -> Result<Self> {
        let cwd = env::current_dir().map_err(|_| Error::CurrentDir)?;
        let cfg_file = cwd.join(DEFAULT_CONFIG_FILE);
        if cfg_file.is_file() {
            Changelog::from_file(cfg_file)
        } else {
            debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
            Ok(Changelog::default())
        }
    }

    /// Creates a `Changelog` from a custom named TOML configuration file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use changelog::Changelog;
    /// let changelog = Changelog::from_file("/myproject/changelog.toml").unwrap();
    /// ```
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        debug!("Creating changelog with \n\tfile: {:?}", file.as_ref());
        Changelog::default().try_config_file(file.as_ref())
    }

    // Try and apply a config file on top of the current options
    fn try_config_file(mut self, cfg_file: &Path) -> Result<Self> {
        debug!("Trying to use config file: {:?}", cfg_file);
        let toml_s = fs::read_to_string(cfg_file)?;
        let cfg: RawCfg = toml::from_str(&toml_s)
            .map_err(|e| Error::ConfigParse(cfg_file.to_path_buf(), e.to_string()))?;

        let clcfg = cfg.changelog;
        if let Some(file) = clcfg.file {
            self.file = file.into();
        }
        if let Some(grep) = clcfg.grep {
            self.grep = grep;
        }
        self.repo = clcfg.repository.or(self.repo);
        self.subtitle = clcfg.subtitle.or(self.subtitle);
        self.git_dir = clcfg.git_dir.or(self.git_dir);
        self.git_work_tree = clcfg.git_work_tree.or(self.git_work_tree);
        self.link_style = clcfg.link_style;

        if !cfg.sections.is_empty() {
            self.section_map = cfg.sections;
        }

        debug!("Returning changelog:\n{:?}", self);
        Ok(self)
    }

    /// Sets the grep search pattern for finding commits.
    pub fn grep<S: Into<String>>(mut self, g: S) -> Changelog {
        self.grep = g.into();
        self
    }

    /// Sets the format for `git log` output. Every commit has to end with
    /// `==END==` for the output to be split correctly.
    pub fn format<S: Into<String>>(mut self, f: S) -> Changelog {
        self.format = f.into();
        self
    }

    /// Sets the repository used for the base of hyper-links
    ///
    /// **NOTE:** Leave off the trailing `.git`
    ///
    /// # Example
    ///
    /// ```
    /// # use changelog::Changelog;
    /// let changelog = Changelog::new().repository("https://github.com/sebastianm/changelog");
    /// ```
    pub fn repository<S: Into<String>>(mut self, r: S) -> Changelog {
        self.repo = Some(r.into());
        self
    }

    /// Sets the link style to use for hyper-links
    pub fn link_style(mut self, l: LinkStyle) -> Changelog {
        self.link_style = l;
        self
    }

    /// Sets the version for the release
    ///
    /// # Example
    ///
    /// ```
    /// # use changelog::Changelog;
    /// let changelog = Changelog::new().version("v0.2.1-beta3");
    /// ```
    pub fn version<S: Into<String>>(mut self, v: S) -> Changelog {
        self.version = Some(v.into());
        self
    }

    /// Sets the subtitle for the release
    pub fn subtitle<S: Into<String>>(mut self, s: S) -> Changelog {
        self.subtitle = Some(s.into());
        self
    }

    /// Sets the date shown next to the version
    pub fn date(mut self, d: Date) -> Changelog {
        self.date = Some(d);
        self
    }

    /// Stamps the release with today's (UTC) date
    pub fn dated_today(self) -> Changelog { self.date(OffsetDateTime::now_utc().date()) }

    /// Sets where the changelog starts using a tag, hash or short hash
    pub fn from<S: Into<String>>(mut self, f: S) -> Changelog {
        self.from = Some(f.into());
        self
    }

    /// Sets where the changelog ends (Defaults to `HEAD`)
    pub fn to<S: Into<String>>(mut self, t: S) -> Changelog {
        self.to = t.into();
        self
    }

    /// Sets the changelog file to read and prepend to
    ///
    /// # Example
    ///
    /// ```
    /// # use changelog::Changelog;
    /// let changelog = Changelog::new().file("docs/HISTORY.md");
    /// ```
    pub fn file<P: AsRef<Path>>(mut self, f: P) -> Changelog {
        self.file = f.as_ref().to_path_buf();
        self
    }

    /// Sets the `git` metadata directory (typically `.git` child of your
    /// project working tree)
    pub fn git_dir<P: AsRef<Path>>(mut self, d: P) -> Changelog {
        self.git_dir = Some(d.as_ref().to_path_buf());
        self
    }

    /// Sets the `git` working tree directory (typically your project
    /// directory)
    pub fn git_work_tree<P: AsRef<Path>>(mut self, d: P) -> Changelog {
        self.git_work_tree = Some(d.as_ref().to_path_buf());
        self
    }

    /// Sets whether or not this is a patch release (defaults to `false`)
    pub fn patch_ver(mut self, p: bool) -> Changelog {
        self.patch_ver = p;
        self
    }

    fn git(&self) -> GitRepo { GitRepo::with_dirs(self.git_dir.clone(), self.git_work_tree.clone()) }

    /// Retrieves the latest tag, or the first commit when nothing is tagged
    /// yet.
    pub fn get_latest_tag(&self) -> Result<String> { self.git().latest_tag() }

    /// Resolves the `from`/`to` bounds, looking up the latest tag when no
    /// start was given.
    pub fn range(&self) -> Result<(String, String)> {
        let from = match self.from {
            Some(ref from) => from.clone(),
            None => self.get_latest_tag()?,
        };
        Ok((from, self.to.clone()))
    }

    /// Retrieves the commits we care about, in history order.
    ///
    /// The whole history is searched with `grep`; the `from`/`to` bounds are
    /// not applied to the query.
    pub fn get_commits(&self) -> Result<Commits> {
        let output = self.git().log(&self.grep, &self.format)?;
        let commits = classify_all(&output);
        info!("Parsed {} commits", commits.len());
        Ok(commits)
    }

    /// Retrieves the section title for a given commit type, or the type
    /// itself when no section claims it.
    ///
    /// # Example
    ///
    /// ```
    /// # use changelog::Changelog;
    /// let changelog = Changelog::new();
    /// assert_eq!("Bug Fixes", changelog.section_for("fix"));
    /// assert_eq!("chore", changelog.section_for("chore"));
    /// ```
    pub fn section_for<'a>(&'a self, commit_type: &'a str) -> &'a str {
        self.section_map
            .iter()
            .find(|(_, v)| v.iter().any(|t| t == commit_type))
            .map_or(commit_type, |(k, _)| k.as_str())
    }

    /// Renders `commits` as a new release section on top of `existing`,
    /// returning the full new changelog content. Nothing is read or written.
    pub fn render(&self, existing: &str, commits: Commits) -> Result<String> {
        if self.version.is_none() {
            return Err(Error::MissingVersion);
        }

        let sm = SectionMap::from_commits(commits);
        let mut out = Vec::with_capacity(256 + existing.len());
        MarkdownWriter::new(&mut out).write_changelog(self, &sm)?;

        let mut content = String::from_utf8_lossy(&out).into_owned();
        content.push_str("\n\n\n");
        content.push_str(existing);
        Ok(content)
    }

    /// Prepends `commits` to the changelog file, creating the file if it
    /// doesn't exist.
    pub fn write_commits(&self, commits: Commits) -> Result<()> {
        debug!("Writing changelog to file: {:?}", self.file);
        let existing = match fs::read_to_string(&self.file) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{:?} doesn't exist yet, creating it", self.file);
                fs::File::create(&self.file)?;
                String::new()
            }
            Err(e) => return Err(e.into()),
        };

        let content = self.render(&existing, commits)?;
        fs::write(&self.file, content)?;
        Ok(())
    }

    /// Queries the history and prepends the new release to the changelog
    /// file, using whatever options have been specified thus far.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use changelog::Changelog;
    /// let changelog = Changelog::new().version("1.0.0");
    /// changelog.write_changelog().unwrap();
    /// ```
    pub fn write_changelog(&self) -> Result<()> {
        if self.version.is_none() {
            return Err(Error::MissingVersion);
        }

        let (from, to) = self.range()?;
        info!("Generating changelog from {from} to {to}...");

        let commits = self.get_commits()?;
        self.write_commits(commits)
    }
}

/// Renders `commits` as release `version` on top of `existing` with the
/// default options.
///
/// # Example
///
/// ```
/// # use changelog::render;
/// let first = render("", vec![], "1.0.0").unwrap();
/// let second = render(&first, vec![], "1.0.1").unwrap();
///
/// assert!(second.ends_with(&first));
/// ```
pub fn render(existing: &str, commits: Commits, version: &str) -> Result<String> {
    Changelog::new().version(version).render(existing, commits)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::parse::classify;

    const HASH: &str = "c1a4d6e5a8f04d3c9e0b7f2d1a9c8b7e6f5d4c3b";

    #[test]
    fn render_newest_first() {
        let first = render("", vec![], "1.0.0").unwrap();
        let second = render(&first, vec![], "1.0.1").unwrap();

        let newer = second.find("<a name=\"1.0.1\">").unwrap();
        let older = second.find("<a name=\"1.0.0\">").unwrap();
        assert!(newer < older);
        assert_eq!(&second[older..], first);
    }

    #[test]
    fn render_keeps_existing_content() {
        let existing = "# Changelog\n\nsome hand written notes ✓\n";
        let commits = vec![classify(&format!("{HASH}\nfix(io): retry Closes #7\n")).unwrap()];

        let out = render(existing, commits, "0.3.0").unwrap();
        assert!(out.starts_with("<a name=\"0.3.0\"></a>\n## 0.3.0\n"));
        assert!(out.contains("* **io:** retry (c1a4d6e5, closes #7)\n"));
        assert!(out.ends_with(&format!("\n\n\n{existing}")));
    }

    #[test]
    fn render_needs_version() {
        assert!(matches!(
            Changelog::new().render("", vec![]),
            Err(Error::MissingVersion)
        ));
    }

    #[test]
    fn write_changelog_needs_version_before_git() {
        // no version means the history is never queried
        let changelog = Changelog::new().git_dir("/does/not/exist/.git");
        assert!(matches!(
            changelog.write_changelog(),
            Err(Error::MissingVersion)
        ));
    }

    #[test]
    fn write_commits_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CHANGELOG.md");

        let commits = vec![classify(&format!("{HASH}\nfeat: first\n")).unwrap()];
        Changelog::new()
            .version("0.1.0")
            .file(&path)
            .write_commits(commits)
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<a name=\"0.1.0\"></a>\n"));
        assert!(content.contains("#### Features\n\n* first (c1a4d6e5)\n"));
    }

    #[test]
    fn write_commits_prepends_to_existing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<a name=\"0.1.0\"></a>\n## 0.1.0\n").unwrap();

        let changelog = Changelog::new().version("0.2.0").file(file.path());
        changelog.write_commits(vec![]).unwrap();

        let content = fs::read_to_string(file.path()).unwrap();
        assert!(content.starts_with("<a name=\"0.2.0\"></a>\n## 0.2.0\n"));
        assert!(content.ends_with("\n\n\n<a name=\"0.1.0\"></a>\n## 0.1.0\n"));
    }

    #[test]
    fn config_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            "[changelog]\nfile = \"HISTORY.md\"\nrepository = \"https://example.com/r\"\nlink-style = \
             \"stash\"\n\n[sections]\nFeatures = [\"feat\", \"ft\"]\n"
        )
        .unwrap();

        let changelog = Changelog::from_file(file.path()).unwrap();
        assert_eq!(changelog.file, PathBuf::from("HISTORY.md"));
        assert_eq!(changelog.repo.as_deref(), Some("https://example.com/r"));
        assert_eq!(changelog.link_style, LinkStyle::Stash);
        assert_eq!(changelog.grep, DEFAULT_GREP);
        assert_eq!(changelog.section_for("ft"), "Features");
        // sections replace the defaults as a whole
        assert_eq!(changelog.section_for("fix"), "fix");
    }

    #[test]
    fn malformed_config_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[changelog\nfile = ").unwrap();

        assert!(matches!(
            Changelog::from_file(file.path()),
            Err(Error::ConfigParse(..))
        ));
    }

    #[test]
    fn explicit_range_skips_tag_lookup() {
        let changelog = Changelog::new().from("v1.0.0").to("v1.1.0");
        assert_eq!(
            changelog.range().unwrap(),
            ("v1.0.0".to_owned(), "v1.1.0".to_owned())
        );
    }
}
