//! Turns raw `git log` output into structured [`Commit`] records.
//!
//! The history is expected in the `%H%n%s%n%b%n==END==` format: one block per
//! commit holding the hash, the subject line and the free form body. Blocks
//! whose subject does not follow the `type(component): description` grammar
//! are dropped without error.

use std::sync::LazyLock;

use log::trace;
use regex::Regex;

use crate::git::{Commit, Commits};

/// Delimiter written after every commit by the default log format
pub const COMMIT_DELIMITER: &str = "==END==";

/// Longest subject (in chars) kept on a record
pub const MAX_SUBJECT_LENGTH: usize = 80;

/// The compiled grammars, built once on first use
struct Patterns {
    /// `type(component): description`
    subject: Regex,
    /// A single issue reference embedded in the subject line
    subject_close: Regex,
    /// One or more comma separated issue references in the body
    body_closes: Regex,
    number: Regex,
    breaking: Regex,
}

static PATTERNS: LazyLock<Patterns> = LazyLock::new(|| Patterns {
    subject: regex!(r"^(\w*)(\(([\w$.\-* ]*)\))?: (.*)$"),
    subject_close: regex!(r"\s*(?:Closes|Fixes|Resolves)\s#(\d+)"),
    body_closes: regex!(r"(?:Closes|Fixes|Resolves)\s((?:#\d+(?:,\s)?)+)"),
    number: regex!(r"\d+"),
    breaking: regex!(r"BREAKING CHANGE:\s([\s\S]*)"),
});

/// Classifies a single raw commit block.
///
/// Returns `None` when the block has fewer than three lines or when its
/// subject does not match the commit grammar. Issue references found in the
/// subject are moved into `closes`, and subjects longer than
/// [`MAX_SUBJECT_LENGTH`] chars are cut on a char boundary.
///
/// # Example
///
/// ```
/// # use changelog::parse::classify;
/// let commit = classify("8a3f0c2\nfeat(parser): add support for x. Closes #42\nsome body").unwrap();
///
/// assert_eq!("feat", commit.commit_type);
/// assert_eq!("parser", commit.component);
/// assert_eq!("add support for x.", commit.subject);
/// assert_eq!(vec![42], commit.closes);
/// ```
pub fn classify(raw: &str) -> Option<Commit> {
    let block = raw.strip_prefix('\n').unwrap_or(raw);
    let lines: Vec<&str> = block.split('\n').collect();

    if lines.len() < 3 {
        trace!("Dropping short block {:?}", block);
        return None;
    }

    let patterns = &*PATTERNS;
    let hash = lines[0];
    let mut closes = Vec::new();

    let subject = patterns.subject_close.replace_all(lines[1], |caps: &regex::Captures| {
        if let Some(no) = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) {
            closes.push(no);
        }
        ""
    });

    for line in &lines[2..] {
        for caps in patterns.body_closes.captures_iter(line) {
            let Some(refs) = caps.get(1) else { continue };
            closes.extend(
                patterns
                    .number
                    .find_iter(refs.as_str())
                    .filter_map(|m| m.as_str().parse::<u32>().ok()),
            );
        }
    }

    let mut breaks = Vec::new();
    if let Some(note) = patterns.breaking.captures(block).and_then(|c| c.get(1)) {
        breaks.push(format!("{}\n", note.as_str().trim_end()));
    }

    let Some(caps) = patterns.subject.captures(&subject) else {
        trace!("Dropping block with non-conventional subject {:?}", lines[1]);
        return None;
    };

    let description = caps.get(4).map_or("", |m| m.as_str()).trim_end();

    Some(Commit {
        hash: hash.to_owned(),
        subject: truncate(description, MAX_SUBJECT_LENGTH),
        component: caps.get(3).map_or("", |m| m.as_str()).to_owned(),
        closes,
        breaks,
        commit_type: caps.get(1).map_or("", |m| m.as_str()).to_owned(),
        body: block.to_owned(),
    })
}

/// Splits a full `git log` stream on [`COMMIT_DELIMITER`] and classifies
/// every block, keeping history order.
pub fn classify_all(output: &str) -> Commits {
    output.split(COMMIT_DELIMITER).filter_map(classify).collect()
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_owned(),
        None => s.to_owned(),
    }
}
