//! Conventional commit line grammar
//!
//! Every line of a commit message is matched independently against
//! `tag(scope)!: description`, so a single commit can carry several
//! changes, footers and directives.

use regex::Regex;
use std::sync::LazyLock;

/// Regex for a conventional commit line
static LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<tag>BREAKING CHANGE|[\w-]+)(?:\((?P<scope>[^()]*)\))?(?P<bang>!)?:\s+(?P<description>.*\S)\s*$",
    )
    .expect("Invalid regex")
});

/// Regex for a revert directive written without a colon
static REVERT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^revert-commit\s+(?P<shas>[0-9A-Fa-f][0-9A-Fa-f\s]*)$").expect("Invalid regex")
});

/// What one message line means
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `BREAKING CHANGE: ...` footer
    Breaking(String),
    /// `semver-change: <level>` override
    SemverChange(String),
    /// `revert-commit: <sha-prefix>...`
    Revert(Vec<String>),
    /// Any other `tag(scope)!: description` line
    Change {
        tag: String,
        scope: Option<String>,
        breaking: bool,
        description: String,
    },
}

/// Parse one line; `None` for lines that follow no recognised shape
pub fn parse_line(line: &str) -> Option<Directive> {
    let line = line.trim();

    if let Some(caps) = REVERT_REGEX.captures(line) {
        return Some(Directive::Revert(split_shas(&caps["shas"])));
    }

    let caps = LINE_REGEX.captures(line)?;
    let tag = caps.name("tag")?.as_str();
    let description = caps.name("description")?.as_str().trim().to_string();

    let directive = match tag {
        "BREAKING CHANGE" | "BREAKING-CHANGE" => Directive::Breaking(description),
        "semver-change" => Directive::SemverChange(description),
        "revert-commit" => Directive::Revert(split_shas(&description)),
        _ => Directive::Change {
            tag: tag.to_string(),
            scope: caps
                .name("scope")
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty()),
            breaking: caps.name("bang").is_some(),
            description,
        },
    };
    Some(directive)
}

fn split_shas(raw: &str) -> Vec<String> {
    raw.split_whitespace()
        .map(|s| s.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_feat() {
        assert_eq!(
            parse_line("feat: add new feature"),
            Some(Directive::Change {
                tag: "feat".to_string(),
                scope: None,
                breaking: false,
                description: "add new feature".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_with_scope_and_bang() {
        match parse_line("refactor(core)!: major refactoring").unwrap() {
            Directive::Change {
                tag,
                scope,
                breaking,
                ..
            } => {
                assert_eq!(tag, "refactor");
                assert_eq!(scope.as_deref(), Some("core"));
                assert!(breaking);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_tags_are_case_sensitive() {
        match parse_line("Feat: shouting").unwrap() {
            Directive::Change { tag, .. } => assert_eq!(tag, "Feat"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_breaking_footer() {
        assert_eq!(
            parse_line("BREAKING CHANGE: removes the old API"),
            Some(Directive::Breaking("removes the old API".to_string()))
        );
        assert_eq!(
            parse_line("BREAKING-CHANGE: also works"),
            Some(Directive::Breaking("also works".to_string()))
        );
    }

    #[test]
    fn test_parse_semver_change() {
        assert_eq!(
            parse_line("semver-change: minor"),
            Some(Directive::SemverChange("minor".to_string()))
        );
    }

    #[test]
    fn test_parse_revert_forms() {
        assert_eq!(
            parse_line("revert-commit: abc1234 DEF5678"),
            Some(Directive::Revert(vec![
                "abc1234".to_string(),
                "def5678".to_string()
            ]))
        );
        assert_eq!(
            parse_line("revert-commit abc1234"),
            Some(Directive::Revert(vec!["abc1234".to_string()]))
        );
    }

    #[test]
    fn test_parse_non_conventional() {
        assert_eq!(parse_line("Just a regular commit message"), None);
        assert_eq!(parse_line("feat:missing space"), None);
        assert_eq!(parse_line("feat: "), None);
        assert_eq!(parse_line(""), None);
    }
}
