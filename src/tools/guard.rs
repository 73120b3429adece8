//! Heuristic query guard for the execute tool.
//!
//! Two independent checks run before a query reaches the database:
//!
//! - a **mutation check** (read-only mode only) that looks for data- or
//!   schema-changing keywords, and
//! - an **injection check** that matches a fixed list of suspicious patterns.
//!
//! Both are plain text heuristics. They are defense in depth, not a parser:
//! a keyword inside a string literal surrounded by spaces is a false positive,
//! and a keyword glued to punctuation (`(DELETE`) slips through. The injection
//! patterns also flag ordinary `SELECT ... FROM ...` queries. Enforce real
//! permissions with database roles.

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;
use tracing::warn;

/// Keywords that mark a statement as mutating, in reporting order.
pub const MUTATING_KEYWORDS: &[&str] = &[
    "INSERT",
    "UPDATE",
    "DELETE",
    "MERGE",
    "TRUNCATE",
    "CREATE",
    "DROP",
    "ALTER",
    "RENAME",
    "GRANT",
    "REVOKE",
    "COMMENT ON",
    "SECURITY LABEL",
    "CREATE EXTENSION",
    "CREATE FUNCTION",
    "INSTALL",
    "CLUSTER",
    "REINDEX",
    "VACUUM",
    "ANALYZE",
];

/// Suspicious patterns, in reporting order.
pub const SUSPICIOUS_PATTERNS: &[&str] = &[
    // statement keywords followed by a clause keyword
    r"(\b(union|select|insert|update|delete|drop|create|alter|exec|execute)\b.*\b(from|into|where|table)\b)",
    // comments and statement separators
    r"(--|\#|\/\*|\*\/|;)",
    // tautologies such as `or 1=1`
    r"(\b(or|and)\b\s*\d+\s*=\s*\d+)",
    // timing
    r"(\b(sleep|benchmark|waitfor)\b)",
    // information gathering
    r"(@@version|version\(\)|database\(\)|user\(\))",
    // file output
    r"(\binto\s+(outfile|dumpfile)\b)",
    r"(xp_cmdshell|sp_executesql)",
];

/// Characters of a pattern quoted in a finding.
const FINDING_PATTERN_CHARS: usize = 50;

static COMPILED_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    SUSPICIOUS_PATTERNS
        .iter()
        .filter_map(|pattern| {
            match RegexBuilder::new(pattern).case_insensitive(true).build() {
                Ok(re) => Some((*pattern, re)),
                Err(e) => {
                    warn!(pattern = %pattern, error = %e, "Skipping invalid guard pattern");
                    None
                }
            }
        })
        .collect()
});

/// Outcome of vetting one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardVerdict {
    Allowed,
    /// Matched mutating keywords, in keyword-list order
    BlockedMutation(Vec<String>),
    /// One finding per matched suspicious pattern
    BlockedInjection(Vec<String>),
}

impl GuardVerdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Message shown to the caller for a blocked query.
    pub fn rejection_reason(&self) -> Option<String> {
        match self {
            Self::Allowed => None,
            Self::BlockedMutation(keywords) => Some(format!(
                "Read-only mode is enabled. Detected mutating keywords: {}",
                keywords.join(", ")
            )),
            Self::BlockedInjection(findings) => Some(format!(
                "Query contains suspicious patterns: {}",
                findings.join(", ")
            )),
        }
    }
}

/// Find mutating keywords in a query.
///
/// The query is uppercased and trimmed; a keyword matches when the query starts
/// with it or contains it surrounded by single spaces.
///
/// # Examples
///
/// ```
/// use pg_mcp_gateway::tools::guard::detect_mutating_keywords;
///
/// assert_eq!(detect_mutating_keywords("delete from orders"), vec!["DELETE"]);
/// assert!(detect_mutating_keywords("SELECT * FROM orders").is_empty());
/// ```
pub fn detect_mutating_keywords(query: &str) -> Vec<String> {
    let normalized = query.trim().to_uppercase();
    MUTATING_KEYWORDS
        .iter()
        .filter(|kw| normalized.starts_with(**kw) || normalized.contains(&format!(" {} ", kw)))
        .map(|kw| kw.to_string())
        .collect()
}

/// Finding reported when `pattern` matches.
pub fn pattern_finding(pattern: &str) -> String {
    let quoted: String = pattern.chars().take(FINDING_PATTERN_CHARS).collect();
    format!("Suspicious pattern detected: {}...", quoted)
}

/// Match the query against the suspicious pattern list.
///
/// Returns one finding per matching pattern, quoting its first 50 characters.
pub fn check_injection_risk(query: &str) -> Vec<String> {
    let lowered = query.to_lowercase();
    COMPILED_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(&lowered))
        .map(|(pattern, _)| pattern_finding(pattern))
        .collect()
}

/// Query guard applied by `execute_sql`.
#[derive(Debug, Clone, Copy)]
pub struct QueryGuard {
    read_only: bool,
}

impl QueryGuard {
    pub fn new(read_only: bool) -> Self {
        Self { read_only }
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    /// Vet a query. The mutation check runs first and wins.
    pub fn evaluate(&self, query: &str) -> GuardVerdict {
        if self.read_only {
            let keywords = detect_mutating_keywords(query);
            if !keywords.is_empty() {
                return GuardVerdict::BlockedMutation(keywords);
            }
        }

        let findings = check_injection_risk(query);
        if !findings.is_empty() {
            return GuardVerdict::BlockedInjection(findings);
        }

        GuardVerdict::Allowed
    }
}
