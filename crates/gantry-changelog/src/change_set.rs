//! Classified, revert-aware sets of changes

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use gantry_core::config::{ChangelogConfig, IssueNumberSuffix};
use gantry_core::semver::Semver;
use gantry_core::version::Version;
use gantry_git::CommitInfo;

use crate::parser::{parse_line, Directive};

/// Trailing `(#123)` issue reference
static ISSUE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\(#(?P<number>\d+)\)$").expect("Invalid regex")
});

/// What one significant commit contributes
#[derive(Debug, Clone, Serialize)]
pub struct Input {
    sha: Option<String>,
    changes: Vec<(String, String)>,
    breaks: Vec<String>,
    semver: Semver,
    semver_locked: bool,
    reverts: Vec<String>,
}

impl Input {
    fn new(sha: Option<&str>) -> Self {
        Self {
            sha: sha.map(|s| s.to_lowercase()),
            changes: Vec::new(),
            breaks: Vec::new(),
            semver: Semver::None,
            semver_locked: false,
            reverts: Vec::new(),
        }
    }

    /// Source commit; `None` for entries the release engine synthesised
    pub fn sha(&self) -> Option<&str> {
        self.sha.as_deref()
    }

    /// `(header, description)` pairs
    pub fn changes(&self) -> &[(String, String)] {
        &self.changes
    }

    /// Breaking-change descriptions
    pub fn breaks(&self) -> &[String] {
        &self.breaks
    }

    /// Significance of the commit
    pub fn semver(&self) -> Semver {
        self.semver
    }

    /// Whether a `semver-change` line fixed the level
    pub fn is_semver_locked(&self) -> bool {
        self.semver_locked
    }

    /// Sha prefixes this commit reverts
    pub fn reverts(&self) -> &[String] {
        &self.reverts
    }

    /// Whether the commit affects the change set at all
    pub fn is_significant(&self) -> bool {
        self.semver.is_significant()
            || !self.reverts.is_empty()
            || !self.changes.is_empty()
            || !self.breaks.is_empty()
    }

    fn raise(&mut self, level: Semver) {
        if !self.semver_locked {
            self.semver = self.semver.max(level);
        }
    }

    fn lock(&mut self, level: Semver) {
        self.semver = level;
        self.semver_locked = true;
    }

    fn is_reverted_by(&self, skip: &HashSet<String>) -> bool {
        match &self.sha {
            Some(sha) => skip.iter().any(|prefix| sha.starts_with(prefix.as_str())),
            None => false,
        }
    }
}

/// Changes rendered under one changelog header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    /// Header; `None` for the bare "no significant updates" notice
    pub header: Option<String>,
    /// Normalised change descriptions, oldest first
    pub changes: Vec<String>,
}

impl Group {
    fn new(header: Option<&str>) -> Self {
        Self {
            header: header.map(str::to_string),
            changes: Vec::new(),
        }
    }
}

/// Changes accumulated for one component release.
///
/// Commits are added while the set is open. [`finish`](Self::finish) applies
/// reverts, groups the surviving changes and freezes the set; mutating a
/// finished set panics.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeSet {
    #[serde(skip)]
    config: ChangelogConfig,
    inputs: Vec<Input>,
    groups: Vec<Group>,
    semver: Semver,
    finished: bool,
}

impl ChangeSet {
    /// Create an open change set
    pub fn new(config: &ChangelogConfig) -> Self {
        Self {
            config: config.clone(),
            inputs: Vec::new(),
            groups: Vec::new(),
            semver: Semver::None,
            finished: false,
        }
    }

    /// Add a commit
    pub fn add_commit(&mut self, commit: &CommitInfo) -> &mut Self {
        self.add_message(&commit.hash, &commit.full_message())
    }

    /// Add a commit message by sha
    pub fn add_message(&mut self, sha: &str, message: &str) -> &mut Self {
        assert!(!self.finished, "cannot add to a finished ChangeSet");

        let mut input = Input::new(Some(sha));
        for line in message.lines() {
            let Some(directive) = parse_line(line) else {
                continue;
            };
            match directive {
                Directive::Breaking(description) => {
                    input.raise(Semver::Major);
                    input.breaks.push(self.normalize(&description));
                }
                Directive::SemverChange(name) => match Semver::for_name(&name) {
                    Some(level) => input.lock(level),
                    None => warn!(sha, level = %name, "ignoring unknown semver-change level"),
                },
                Directive::Revert(shas) => input.reverts.extend(shas),
                Directive::Change {
                    tag,
                    scope,
                    breaking,
                    description,
                } => {
                    let Some(settings) = self.config.commit_tag(&tag) else {
                        continue;
                    };
                    let (level, header) = settings.classify(scope.as_deref());
                    let header = header.map(str::to_string);
                    let description = self.normalize(&description);
                    input.raise(level);
                    if let Some(header) = header {
                        input.changes.push((header, description.clone()));
                    }
                    if breaking {
                        input.raise(Semver::Major);
                        input.breaks.push(description);
                    }
                }
            }
        }

        if input.is_significant() {
            debug!(sha, semver = %input.semver, "significant commit");
            self.inputs.push(input);
        }
        self
    }

    /// Add a change that no commit carries, such as a dependency update
    pub fn add_change(&mut self, header: &str, description: &str, semver: Semver) -> &mut Self {
        assert!(!self.finished, "cannot add to a finished ChangeSet");

        let mut input = Input::new(None);
        input.raise(semver);
        input
            .changes
            .push((header.to_string(), self.normalize(description)));
        self.inputs.push(input);
        self
    }

    /// Apply reverts, group changes and freeze the set
    pub fn finish(&mut self) -> &mut Self {
        assert!(!self.finished, "ChangeSet is already finished");

        // Newest first, so a directive always applies to older commits and
        // a reverted revert still removes its own target.
        let mut skip: HashSet<String> = HashSet::new();
        let mut surviving = Vec::new();
        for input in std::mem::take(&mut self.inputs).into_iter().rev() {
            let reverted = input.is_reverted_by(&skip);
            skip.extend(input.reverts.iter().cloned());
            if reverted {
                debug!(sha = ?input.sha, "dropping reverted commit");
            } else {
                surviving.push(input);
            }
        }
        surviving.reverse();
        self.inputs = surviving;

        self.semver = self
            .inputs
            .iter()
            .map(Input::semver)
            .max()
            .unwrap_or(Semver::None);

        let mut breaking = Group::new(Some(&self.config.breaking_change_header));
        for input in &self.inputs {
            breaking.changes.extend(input.breaks.iter().cloned());
        }
        if !breaking.changes.is_empty() {
            self.groups.push(breaking);
        }

        let mut headers: Vec<String> = self
            .config
            .headers()
            .into_iter()
            .map(str::to_string)
            .collect();
        for input in &self.inputs {
            for (header, _) in &input.changes {
                if !headers.contains(header) {
                    headers.push(header.clone());
                }
            }
        }
        for header in &headers {
            let mut group = Group::new(Some(header));
            for input in &self.inputs {
                group.changes.extend(
                    input
                        .changes
                        .iter()
                        .filter(|(h, _)| h == header)
                        .map(|(_, text)| text.clone()),
                );
            }
            if !group.changes.is_empty() {
                self.groups.push(group);
            }
        }

        if self.groups.is_empty() && self.semver.is_significant() {
            self.push_notice();
        }

        self.finished = true;
        debug!(
            semver = %self.semver,
            inputs = self.inputs.len(),
            groups = self.groups.len(),
            "change set finished"
        );
        self
    }

    /// Promote a finished set with nothing to release to a patch release.
    ///
    /// Calling it again, or on a set that already releases, changes nothing.
    pub fn force_release(&mut self) -> &mut Self {
        assert!(self.finished, "force_release requires a finished ChangeSet");

        if !self.semver.is_significant() {
            self.semver = Semver::Patch;
            if self.groups.is_empty() {
                self.push_notice();
            }
            debug!("forced patch release");
        }
        self
    }

    /// Whether `finish` has been called
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether the set has neither content nor a releasable level
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && !self.semver.is_significant()
    }

    /// Aggregate level of the surviving changes
    pub fn semver(&self) -> Semver {
        self.semver
    }

    /// Groups in render order: breaking first, then configured tag order
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Significant inputs (after `finish`, only those that survived reverts)
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    /// Next version after `last`, or `None` when nothing needs releasing
    pub fn suggested_version(&self, last: Option<&Version>) -> Option<Version> {
        if self.semver.is_significant() {
            Some(self.semver.bump(last))
        } else {
            None
        }
    }

    fn push_notice(&mut self) {
        let mut notice = Group::new(None);
        notice
            .changes
            .push(self.config.no_significant_updates_notice.clone());
        self.groups.push(notice);
    }

    fn normalize(&self, description: &str) -> String {
        let description = description.trim();
        let description = match self.config.issue_number_suffix {
            IssueNumberSuffix::Keep => description.to_string(),
            IssueNumberSuffix::Delete => ISSUE_SUFFIX.replace(description, "").to_string(),
            IssueNumberSuffix::Link => match &self.config.repo {
                Some(repo) => ISSUE_SUFFIX
                    .replace(description, |caps: &regex::Captures<'_>| {
                        let number = &caps["number"];
                        format!(
                            " ([#{}](https://github.com/{}/pull/{}))",
                            number, repo, number
                        )
                    })
                    .to_string(),
                None => description.to_string(),
            },
        };
        capitalize(&description)
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
