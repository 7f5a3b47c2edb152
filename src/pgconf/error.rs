use thiserror::Error;

/// Errors raised by the configuration-state engine.
#[derive(Error, Debug)]
pub enum ConfError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid setting pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A compiled line pattern produced a capture count other than the fixed
    /// four groups. This is a defect in pattern construction, not bad input.
    #[error("Pattern {pattern:?} yielded {groups} capture groups, expected 4")]
    PatternGroups { pattern: String, groups: usize },

    #[error("Recommended value {value:?} for {key} is not a number")]
    UnparseableRecommendation { key: String, value: String },

    #[error("Line {index} out of range ({len} lines)")]
    LineOutOfRange { index: usize, len: usize },
}

impl ConfError {
    /// True for internal invariant violations that callers should treat as fatal.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, ConfError::PatternGroups { .. })
    }
}
