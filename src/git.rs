use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Command,
};

use log::debug;

use crate::error::{Error, Result};

/// The struct representation of a `Commit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// The 40 char hash
    pub hash: String,
    /// The commit subject, without issue references and at most 80 chars
    pub subject: String,
    /// The component (if any)
    pub component: String,
    /// Any issues this commit closes
    pub closes: Vec<u32>,
    /// Any breaking change notes attached to this commit
    pub breaks: Vec<String>,
    /// The commit type, e.g. `feat` or `fix`
    pub commit_type: String,
    /// The raw block this commit was classified from
    pub body: String,
}

/// A convienience type for multiple commits
pub type Commits = Vec<Commit>;

/// Thin wrapper around the `git` executable. Only ever reads from the
/// repository; the default uses whatever repository `git` discovers from the
/// current directory.
#[derive(Debug, Clone, Default)]
pub struct GitRepo {
    git_dir: Option<PathBuf>,
    work_tree: Option<PathBuf>,
}

impl GitRepo {
    /// Points `git` at an explicit metadata directory and/or working tree.
    pub fn with_dirs(git_dir: Option<PathBuf>, work_tree: Option<PathBuf>) -> Self {
        GitRepo { git_dir, work_tree }
    }

    /// Returns the name of the most recent tag, or the hash of the first
    /// commit if the repository has no tags yet.
    pub fn latest_tag(&self) -> Result<String> {
        let hash = match self.run(&["rev-list", "--tags", "--max-count=1"]) {
            Ok(out) => out.trim_matches(&['\r', '\n'][..]).to_owned(),
            Err(e) => {
                debug!("rev-list failed ({e}), falling back to first commit");
                String::new()
            }
        };

        if hash.is_empty() {
            debug!("No tags found, using first commit");
            return self.first_commit();
        }

        let tag = self.run(&["describe", "--tags", hash.as_str()])?;
        Ok(tag.trim_matches(&['\r', '\n'][..]).to_owned())
    }

    /// Returns the hash of the oldest commit in the history.
    pub fn first_commit(&self) -> Result<String> {
        let out = self.run(&["log", "--pretty=oneline", "--reverse"])?;
        Ok(out
            .lines()
            .next()
            .and_then(|l| l.split(' ').next())
            .unwrap_or_default()
            .trim()
            .to_owned())
    }

    /// Runs `git log` over the full history, keeping only the commits
    /// matching the extended regex `grep`, and returns the raw output
    /// formatted with `format`.
    pub fn log(&self, grep: &str, format: &str) -> Result<String> {
        self.run(&[
            "log",
            "-E",
            format!("--grep={grep}").as_str(),
            format!("--format={format}").as_str(),
        ])
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let mut full: Vec<OsString> = Vec::with_capacity(args.len() + 2);
        if let Some(dir) = self.git_dir.as_deref() {
            full.push(prefixed("--git-dir=", dir));
        }
        if let Some(dir) = self.work_tree.as_deref() {
            full.push(prefixed("--work-tree=", dir));
        }
        full.extend(args.iter().map(OsString::from));

        debug!("Running git {:?}", full);
        let output = Command::new("git").args(&full).output()?;

        if !output.status.success() {
            return Err(Error::Git {
                cmd: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn prefixed(flag: &str, path: &Path) -> OsString {
    let mut s = OsString::from(flag);
    s.push(path.as_os_str());
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_flags_are_prefixed() {
        assert_eq!(
            prefixed("--git-dir=", Path::new("/myproject/.git")),
            OsString::from("--git-dir=/myproject/.git")
        );
    }

    #[test]
    fn missing_git_dir_is_a_git_error() {
        let repo = GitRepo::with_dirs(Some("/does/not/exist/.git".into()), None);
        match repo.log("^feat", "%H") {
            Err(Error::Git { cmd, .. }) => assert!(cmd.starts_with("log -E")),
            // no git executable on this machine
            Err(Error::Io(_)) => {}
            other => panic!("unexpected {other:?}"),
        }
    }
}
