//! @ai:module:intent Parse and validate annotation directive lines of the form `<entity>>><digit>`
//! @ai:module:layer domain
//! @ai:module:public_api Directive, ValidationError, RejectReason, validate, read_directives, DELIMITER
//! @ai:module:depends_on label, error
//! @ai:module:stateless true

use crate::error::Result;
use crate::label::LabelSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::BufRead;
use thiserror::Error;

/// Two-character token separating entity text from the label digit.
pub const DELIMITER: &str = ">>";

const DELIMITER_CHARS: [char; 2] = ['>', '>'];

/// @ai:intent One validated instruction mapping a literal substring to a label
/// @ai:invariant entity_text is non-empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    pub line_number: usize,
    pub entity_text: String,
    pub label_index: u32,
}

/// @ai:intent Why a directive line was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RejectReason {
    TooShort,
    MissingDelimiter,
    NonNumericLabel(char),
    LabelOutOfRange(u32),
}

/// @ai:intent Line-scoped, recoverable rejection of a directive line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("Line no: {line_number} not long enough (should be at least 4 characters).")]
    TooShort { line_number: usize },

    #[error("No delimiter >> in line no: {line_number}")]
    MissingDelimiter { line_number: usize },

    #[error("label_idx {label} in line {line_number} is NaN.")]
    NonNumericLabel { line_number: usize, label: char },

    #[error("label_idx {label} in line {line_number} is out of bounds.")]
    LabelOutOfRange { line_number: usize, label: u32 },
}

impl ValidationError {
    /// @ai:intent Line number of the rejected directive
    pub fn line_number(&self) -> usize {
        match self {
            Self::TooShort { line_number }
            | Self::MissingDelimiter { line_number }
            | Self::NonNumericLabel { line_number, .. }
            | Self::LabelOutOfRange { line_number, .. } => *line_number,
        }
    }

    /// @ai:intent Reason for the rejection, without the line number
    pub fn reason(&self) -> RejectReason {
        match *self {
            Self::TooShort { .. } => RejectReason::TooShort,
            Self::MissingDelimiter { .. } => RejectReason::MissingDelimiter,
            Self::NonNumericLabel { label, .. } => RejectReason::NonNumericLabel(label),
            Self::LabelOutOfRange { label, .. } => RejectReason::LabelOutOfRange(label),
        }
    }

    /// @ai:intent Stable short code used in reports
    pub fn code(&self) -> &'static str {
        match self {
            Self::TooShort { .. } => "D001",
            Self::MissingDelimiter { .. } => "D002",
            Self::NonNumericLabel { .. } => "D003",
            Self::LabelOutOfRange { .. } => "D004",
        }
    }
}

/// @ai:intent Parse one raw directive line against the configured label set
/// @ai:pre line_number is the 1-based position of line in the directive source
/// @ai:post Ok(d) => format!("{}", d) == line when entity text has no trailing delimiter ambiguity
/// @ai:example ("foo>>1", 1, default) -> Ok(Directive { entity_text: "foo", label_index: 1 })
/// @ai:example ("x>>0", 2, default) -> Err(LabelOutOfRange)
/// @ai:effects pure
/// @ai:edge_cases lengths are measured in characters, not bytes
pub fn validate(
    line: &str,
    line_number: usize,
    labels: &LabelSet,
) -> std::result::Result<Directive, ValidationError> {
    let chars: Vec<char> = line.chars().collect();
    let len = chars.len();

    if len <= DELIMITER_CHARS.len() + 1 {
        return Err(ValidationError::TooShort { line_number });
    }

    if chars[len - 3..len - 1] != DELIMITER_CHARS {
        return Err(ValidationError::MissingDelimiter { line_number });
    }

    let last = chars[len - 1];
    let label = match last.to_digit(10) {
        Some(digit) if last.is_ascii_digit() => digit,
        _ => {
            return Err(ValidationError::NonNumericLabel {
                line_number,
                label: last,
            })
        }
    };

    if !labels.contains_index(label) {
        return Err(ValidationError::LabelOutOfRange { line_number, label });
    }

    Ok(Directive {
        line_number,
        entity_text: chars[..len - 3].iter().collect(),
        label_index: label,
    })
}

/// @ai:intent Read directive lines until the first empty line or end of stream
/// @ai:post every returned line is trimmed and non-empty
/// @ai:effects io:read
pub fn read_directives<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            break;
        }
        lines.push(trimmed.to_string());
    }
    Ok(lines)
}

impl Directive {
    /// @ai:intent Create a directive without going through line validation
    pub fn new(line_number: usize, entity_text: impl Into<String>, label_index: u32) -> Self {
        Self {
            line_number,
            entity_text: entity_text.into(),
            label_index,
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.entity_text, DELIMITER, self.label_index)
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort => f.write_str("too short"),
            Self::MissingDelimiter => f.write_str("missing delimiter"),
            Self::NonNumericLabel(c) => write!(f, "non-numeric label `{}`", c),
            Self::LabelOutOfRange(n) => write!(f, "label {} out of range", n),
        }
    }
}
