use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The single file compared between branches.
pub const TRACKED_FILE: &str = "requirements.txt";

/// Branch the candidate is compared against.
pub const BASELINE_BRANCH: &str = "main";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid GitHub repository URL: {0:?}")]
pub struct ParseRepositoryError(pub String);

impl RepositoryRef {
    /// Takes the last two non-empty `/`-separated segments of a repository URL.
    pub fn parse(url: &str) -> Result<Self, ParseRepositoryError> {
        let mut segments = url.trim().split('/').filter(|s| !s.is_empty()).rev();
        let (Some(name), Some(owner)) = (segments.next(), segments.next()) else {
            return Err(ParseRepositoryError(url.to_string()));
        };
        let name = name.strip_suffix(".git").unwrap_or(name);
        if name.is_empty() {
            return Err(ParseRepositoryError(url.to_string()));
        }
        Ok(Self { owner: owner.to_string(), name: name.to_string() })
    }
}

impl FromStr for RepositoryRef {
    type Err = ParseRepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse(s) }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    #[serde(rename = "head", deserialize_with = "head_ref")]
    pub head_branch: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

fn head_ref<'de, D>(deserializer: D) -> Result<String, D::Error>
where D: serde::Deserializer<'de> {
    #[derive(Deserialize)]
    struct Head {
        #[serde(rename = "ref")]
        branch: String,
    }
    Head::deserialize(deserializer).map(|head| head.branch)
}

/// The tracked file's content on one branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSnapshot {
    Present(Vec<u8>),
    /// The branch has no such file, or the API didn't return its content.
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonResult {
    Unchanged,
    Changed,
    Indeterminate,
}

impl ComparisonResult {
    /// Exact byte equality; anything other than two present snapshots is indeterminate.
    pub fn of(candidate: &FileSnapshot, baseline: &FileSnapshot) -> Self {
        match (candidate, baseline) {
            (FileSnapshot::Present(a), FileSnapshot::Present(b)) if a == b => Self::Unchanged,
            (FileSnapshot::Present(_), FileSnapshot::Present(_)) => Self::Changed,
            _ => Self::Indeterminate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TickStatus {
    Accepted,
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickOutcome {
    pub status: TickStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_number: Option<u64>,
}

impl TickOutcome {
    pub fn accepted(repo: &RepositoryRef) -> Self {
        Self {
            status: TickStatus::Accepted,
            message: format!("Check of {repo} accepted"),
            pr_number: None,
        }
    }

    pub fn no_pull_requests() -> Self {
        Self {
            status: TickStatus::Success,
            message: "No open pull requests found".to_string(),
            pr_number: None,
        }
    }

    pub fn checked(pr_number: u64) -> Self {
        Self {
            status: TickStatus::Success,
            message: format!("Checked PR #{pr_number} for {TRACKED_FILE} changes"),
            pr_number: Some(pr_number),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self { status: TickStatus::Failed, message: message.into(), pr_number: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repository() {
        let cases: &[(&str, Option<(&str, &str)>)] = &[
            ("https://github.com/acme/widget", Some(("acme", "widget"))),
            ("https://github.com/acme/widget/", Some(("acme", "widget"))),
            ("https://github.com/acme/widget.git", Some(("acme", "widget"))),
            ("acme/widget", Some(("acme", "widget"))),
            ("https://github.com/acme", Some(("github.com", "acme"))),
            ("widget", None),
            ("widget/", None),
            ("", None),
            ("///", None),
            ("acme/.git", None),
        ];
        for &(url, expected) in cases {
            let parsed = RepositoryRef::parse(url).ok();
            let parsed = parsed.as_ref().map(|r| (r.owner.as_str(), r.name.as_str()));
            assert_eq!(parsed, expected, "{url}");
        }
    }

    #[test]
    fn test_comparison_table() {
        use FileSnapshot::*;
        let present = |s: &str| Present(s.as_bytes().to_vec());
        let cases = [
            (present("flask==1.0"), present("flask==1.0"), ComparisonResult::Unchanged),
            (present(""), present(""), ComparisonResult::Unchanged),
            (present("flask==2.0"), present("flask==1.0"), ComparisonResult::Changed),
            (present("a\n"), present("a\r\n"), ComparisonResult::Changed),
            (present(""), present("a"), ComparisonResult::Changed),
            (Absent, present("a"), ComparisonResult::Indeterminate),
            (present("a"), Absent, ComparisonResult::Indeterminate),
            (Absent, Absent, ComparisonResult::Indeterminate),
        ];
        for (candidate, baseline, expected) in cases {
            assert_eq!(ComparisonResult::of(&candidate, &baseline), expected);
        }
    }

    #[test]
    fn test_pull_request_from_listing() {
        let json = r#"[{
            "number": 42,
            "state": "open",
            "head": {"ref": "feature-x", "sha": "abc"},
            "updated_at": "2025-02-20T12:00:00Z"
        }]"#;
        let pulls: Vec<PullRequest> = serde_json::from_str(json).unwrap();
        assert_eq!(pulls.len(), 1);
        assert_eq!(pulls[0].number, 42);
        assert_eq!(pulls[0].head_branch, "feature-x");
        assert_eq!(pulls[0].updated_at.map(|t| t.unix_timestamp()), Some(1740052800));
    }

    #[test]
    fn test_outcome_json() {
        let json = serde_json::to_value(TickOutcome::checked(42)).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["message"], "Checked PR #42 for requirements.txt changes");
        assert_eq!(json["pr_number"], 42);
        let json = serde_json::to_value(TickOutcome::no_pull_requests()).unwrap();
        assert!(json.get("pr_number").is_none());
    }
}
