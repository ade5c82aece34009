//! Question ids and uids
//!
//!     A question id has the textual form `topic:qNN` (basic level) or `advance<topic>:qNN`
//!     (advanced level). It always decomposes into (topic, level, number); an id that fits
//!     neither form is rejected, never defaulted.
//!
//!     The uid `<scheme>:<courseCode>:<id>` is the identity a question keeps across formats.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(advance)?([A-Za-z][A-Za-z0-9_-]*):q([0-9]+)$").expect("id pattern is valid")
});

/// Errors for id and uid grammar violations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The id matches neither `topic:qNN` nor `advance<topic>:qNN`
    InvalidId(String),
    /// The question number does not fit the counter type
    NumberOutOfRange(String),
    /// The uid does not have the `<scheme>:<courseCode>:<id>` shape
    InvalidUid(String),
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdError::InvalidId(id) => write!(
                f,
                "Invalid question id '{}': expected 'topic:qNN' or 'advance<topic>:qNN'",
                id
            ),
            IdError::NumberOutOfRange(id) => {
                write!(f, "Question number out of range in id '{}'", id)
            }
            IdError::InvalidUid(uid) => write!(
                f,
                "Invalid uid '{}': expected '<scheme>:<courseCode>:<id>'",
                uid
            ),
        }
    }
}

impl std::error::Error for IdError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Basic,
    Advance,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Basic => f.write_str("basic"),
            Level::Advance => f.write_str("advance"),
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Level::Basic),
            "advance" | "advanced" => Ok(Level::Advance),
            other => Err(format!("Unknown level '{}'", other)),
        }
    }
}

/// A parsed question id
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId {
    pub raw: String,
    pub topic: String,
    pub level: Level,
    pub number: u32,
}

impl QuestionId {
    pub fn parse(raw: &str) -> Result<Self, IdError> {
        let raw = raw.trim();
        let caps = ID_PATTERN
            .captures(raw)
            .ok_or_else(|| IdError::InvalidId(raw.to_string()))?;

        let level = if caps.get(1).is_some() {
            Level::Advance
        } else {
            Level::Basic
        };
        let number = caps[3]
            .parse::<u32>()
            .map_err(|_| IdError::NumberOutOfRange(raw.to_string()))?;

        Ok(QuestionId {
            raw: raw.to_string(),
            topic: caps[2].to_string(),
            level,
            number,
        })
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Durable cross-format identity: `<scheme>:<courseCode>:<id>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Uid {
    pub scheme: String,
    pub course_code: String,
    pub id: QuestionId,
}

impl Uid {
    pub fn new(scheme: impl Into<String>, course_code: impl Into<String>, id: QuestionId) -> Self {
        Uid {
            scheme: scheme.into(),
            course_code: course_code.into(),
            id,
        }
    }

    pub fn parse(raw: &str) -> Result<Self, IdError> {
        let mut parts = raw.trim().splitn(3, ':');
        let (Some(scheme), Some(course_code), Some(id)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(IdError::InvalidUid(raw.to_string()));
        };
        if scheme.is_empty() || course_code.is_empty() {
            return Err(IdError::InvalidUid(raw.to_string()));
        }
        Ok(Uid::new(scheme, course_code, QuestionId::parse(id)?))
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.scheme, self.course_code, self.id)
    }
}

impl From<Uid> for String {
    fn from(uid: Uid) -> Self {
        uid.to_string()
    }
}

impl TryFrom<String> for Uid {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Uid::parse(&value)
    }
}

impl FromStr for Uid {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uid::parse(s)
    }
}
