use std::{result::Result as StdResult, str::FromStr};

use strum::{Display, EnumString};

/// Determines the hyperlink style used in commit and issue links. Defaults to
/// `LinkStyle::Github`
///
/// # Example
///
/// ```no_run
/// # use changelog::{Changelog, LinkStyle};
/// let changelog = Changelog::new().link_style(LinkStyle::Stash);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum LinkStyle {
    #[default]
    Github,
    Gitlab,
    Stash,
    Cgit,
    Gitweb,
}

impl<'de> serde::de::Deserialize<'de> for LinkStyle {
    fn deserialize<D>(deserializer: D) -> StdResult<Self, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl LinkStyle {
    /// Gets a hyperlink url to an issue in the specified format, or `None`
    /// when there is no repository or the style has no issue tracker.
    ///
    /// # Example
    ///
    /// ```
    /// # use changelog::LinkStyle;
    /// let link = LinkStyle::Github;
    /// let issue = link.issue_link(141, Some("https://github.com/sebastianm/changelog"));
    ///
    /// assert_eq!(Some("https://github.com/sebastianm/changelog/issues/141".to_owned()), issue);
    /// ```
    pub fn issue_link(&self, issue: u32, repo: Option<&str>) -> Option<String> {
        let link = repo.filter(|r| !r.is_empty())?;
        match *self {
            LinkStyle::Github | LinkStyle::Gitlab => Some(format!("{link}/issues/{issue}")),
            // stash, cgit and gitweb do not track issues
            LinkStyle::Stash | LinkStyle::Cgit | LinkStyle::Gitweb => None,
        }
    }

    /// Gets a hyperlink url to a commit in the specified format, or `None`
    /// when there is no repository.
    ///
    /// # Example
    /// Note that for `LinkStyle::Gitweb` the actual repository name has to be
    /// given as part of the parameter string of the URL:
    ///
    /// ```
    /// # use changelog::LinkStyle;
    /// let link = LinkStyle::Gitweb;
    /// let commit = link.commit_link("deadbeef", Some("http://example.com/gitweb/?p=foo.git"));
    ///
    /// assert_eq!(Some("http://example.com/gitweb/?p=foo.git;a=commit;h=deadbeef".to_owned()), commit);
    /// ```
    pub fn commit_link(&self, hash: &str, repo: Option<&str>) -> Option<String> {
        let link = repo.filter(|r| !r.is_empty())?;
        Some(match *self {
            LinkStyle::Github | LinkStyle::Gitlab => format!("{link}/commit/{hash}"),
            LinkStyle::Stash => format!("{link}/commits/{hash}"),
            LinkStyle::Cgit => format!("{link}/commit/?id={hash}"),
            LinkStyle::Gitweb => format!("{link};a=commit;h={hash}"),
        })
    }
}
