use indexmap::IndexMap;

use crate::git::Commit;

/// Groups commits by their type, i.e. the first level of the changelog
pub struct SectionMap {
    /// commit type -> commits, both in the order they were first seen
    pub sections: IndexMap<String, Vec<Commit>>,
}

impl SectionMap {
    /// Creates a section map from a vector of commits, which we can then
    /// iterate through and write. Grouping is stable: types keep the order of
    /// their first commit and commits keep their relative (history) order
    /// within a type.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use changelog::{Changelog, SectionMap};
    /// let changelog = Changelog::new().version("1.0.0");
    ///
    /// // Get the commits we're interested in...
    /// let sm = SectionMap::from_commits(changelog.get_commits().unwrap());
    /// ```
    pub fn from_commits(commits: Vec<Commit>) -> SectionMap {
        let mut sm = SectionMap {
            sections: IndexMap::new(),
        };

        for entry in commits {
            sm.sections
                .entry(entry.commit_type.clone())
                .or_insert_with(Vec::new)
                .push(entry);
        }

        sm
    }

    /// All commits carrying at least one breaking change note, in section
    /// order
    pub fn breaking(&self) -> impl Iterator<Item = &Commit> {
        self.sections
            .values()
            .flatten()
            .filter(|c| !c.breaks.is_empty())
    }

    pub fn is_empty(&self) -> bool { self.sections.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(commit_type: &str, subject: &str) -> Commit {
        Commit {
            hash: "0123456789abcdef".into(),
            subject: subject.into(),
            component: String::new(),
            closes: vec![],
            breaks: vec![],
            commit_type: commit_type.into(),
            body: String::new(),
        }
    }

    #[test]
    fn groups_keep_first_seen_order() {
        let sm = SectionMap::from_commits(vec![
            commit("fix", "a"),
            commit("feat", "b"),
            commit("fix", "c"),
            commit("perf", "d"),
            commit("feat", "e"),
        ]);

        let types: Vec<_> = sm.sections.keys().map(String::as_str).collect();
        assert_eq!(types, ["fix", "feat", "perf"]);

        let fixes: Vec<_> = sm.sections["fix"].iter().map(|c| c.subject.as_str()).collect();
        assert_eq!(fixes, ["a", "c"]);
        let feats: Vec<_> = sm.sections["feat"].iter().map(|c| c.subject.as_str()).collect();
        assert_eq!(feats, ["b", "e"]);
    }

    #[test]
    fn breaking_lists_only_annotated_commits() {
        let mut breaking = commit("feat", "b");
        breaking.breaks.push("api changed\n".into());

        let sm = SectionMap::from_commits(vec![commit("fix", "a"), breaking]);
        let subjects: Vec<_> = sm.breaking().map(|c| c.subject.as_str()).collect();
        assert_eq!(subjects, ["b"]);
    }

    #[test]
    fn empty() {
        assert!(SectionMap::from_commits(vec![]).is_empty());
    }
}
