use regex::Regex;

use crate::config::{PredicateConfig, PredicateKind, DEFAULT_PATTERN};
use crate::errors::{ScanError, ScanResult};

/// Strategy for testing a line
#[derive(Debug, Clone)]
pub enum MatchStrategy {
    Substring(String),
    Regex(Regex),
}

/// Decides whether a decoded line is reported.
///
/// A line containing the pattern as quoted data (one log line embedding
/// another) still matches; there is no escaping.
#[derive(Debug, Clone)]
pub struct MatchPredicate {
    strategy: MatchStrategy,
}

impl MatchPredicate {
    /// Case-sensitive literal substring match
    pub fn substring(pattern: impl Into<String>) -> Self {
        Self {
            strategy: MatchStrategy::Substring(pattern.into()),
        }
    }

    /// Regular expression match anywhere in the line
    pub fn regex(pattern: &str) -> ScanResult<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| ScanError::invalid_pattern(format!("{}: {}", pattern, e)))?;
        Ok(Self {
            strategy: MatchStrategy::Regex(regex),
        })
    }

    /// Builds the predicate described by configuration
    pub fn from_config(config: &PredicateConfig) -> ScanResult<Self> {
        match config.kind {
            PredicateKind::Substring => Ok(Self::substring(config.pattern.clone())),
            PredicateKind::Regex => Self::regex(&config.pattern),
        }
    }

    pub fn strategy(&self) -> &MatchStrategy {
        &self.strategy
    }

    /// Tests one line
    pub fn is_match(&self, line: &str) -> bool {
        match &self.strategy {
            MatchStrategy::Substring(pattern) => line.contains(pattern.as_str()),
            MatchStrategy::Regex(regex) => regex.is_match(line),
        }
    }
}

impl Default for MatchPredicate {
    fn default() -> Self {
        Self::substring(DEFAULT_PATTERN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_error_substring() {
        let predicate = MatchPredicate::default();
        assert!(predicate.is_match("ERROR disk full"));
        assert!(predicate.is_match("2024-01-01 [ERROR] timeout"));
        assert!(predicate.is_match("xERRORx"));
        assert!(!predicate.is_match("INFO ok"));
    }

    #[test]
    fn test_substring_is_case_sensitive() {
        let predicate = MatchPredicate::default();
        assert!(!predicate.is_match("error: lowercase"));
        assert!(!predicate.is_match("Error: mixed"));
    }

    #[test]
    fn test_substring_is_not_regex() {
        let predicate = MatchPredicate::substring("ERR.R");
        assert!(!predicate.is_match("ERROR"));
        assert!(predicate.is_match("literal ERR.R here"));
    }

    #[test]
    fn test_quoted_pattern_still_matches() {
        let predicate = MatchPredicate::default();
        assert!(predicate.is_match(r#"INFO replaying "ERROR disk full""#));
    }

    #[test]
    fn test_regex_predicate() {
        let predicate = MatchPredicate::regex(r"^(ERROR|FATAL)\b").unwrap();
        assert!(predicate.is_match("FATAL out of memory"));
        assert!(predicate.is_match("ERROR disk full"));
        assert!(!predicate.is_match("INFO ERROR later in line"));
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let err = MatchPredicate::regex("ERROR(").unwrap_err();
        assert!(matches!(err, ScanError::InvalidPattern(_)));
    }

    #[test]
    fn test_from_config() {
        let predicate = MatchPredicate::from_config(&PredicateConfig {
            kind: PredicateKind::Regex,
            pattern: r"code=\d+".to_string(),
        })
        .unwrap();
        assert!(matches!(predicate.strategy(), MatchStrategy::Regex(_)));
        assert!(predicate.is_match("failed code=42"));

        let predicate = MatchPredicate::from_config(&PredicateConfig::default()).unwrap();
        assert!(matches!(predicate.strategy(), MatchStrategy::Substring(p) if p == "ERROR"));
    }
}
