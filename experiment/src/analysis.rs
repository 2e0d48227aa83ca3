use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of checking the hypothesis against the collected metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Supported,
    Refuted,
    #[default]
    Inconclusive,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Supported => write!(f, "supported"),
            Verdict::Refuted => write!(f, "refuted"),
            Verdict::Inconclusive => write!(f, "inconclusive"),
        }
    }
}

/// What the analysis phase concluded. Carries no statistics of its own;
/// experiments record their interpretation as notes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub verdict: Verdict,
    pub notes: Vec<String>,
}

impl Analysis {
    pub fn new(verdict: Verdict) -> Self {
        Self {
            verdict,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_inconclusive() {
        let analysis = Analysis::default();
        assert_eq!(analysis.verdict, Verdict::Inconclusive);
        assert!(analysis.notes.is_empty());
    }

    #[test]
    fn test_builder_and_display() {
        let analysis = Analysis::new(Verdict::Refuted).with_note("effect below threshold");
        assert_eq!(analysis.verdict.to_string(), "refuted");
        assert_eq!(analysis.notes, vec!["effect below threshold".to_string()]);
    }

    #[test]
    fn test_verdict_serialization() {
        let json = serde_json::to_string(&Verdict::Supported).unwrap();
        assert_eq!(json, "\"supported\"");
    }
}
