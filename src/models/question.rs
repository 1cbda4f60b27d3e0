use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One daily-lesson tag within a study week. The weekly quiz draws a
/// question set covering every day from Sunday through Friday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayTag {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl DayTag {
    pub const ALL: [DayTag; 6] = [
        DayTag::Sunday,
        DayTag::Monday,
        DayTag::Tuesday,
        DayTag::Wednesday,
        DayTag::Thursday,
        DayTag::Friday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayTag::Sunday => "sunday",
            DayTag::Monday => "monday",
            DayTag::Tuesday => "tuesday",
            DayTag::Wednesday => "wednesday",
            DayTag::Thursday => "thursday",
            DayTag::Friday => "friday",
        }
    }
}

impl std::str::FromStr for DayTag {
    type Err = UnknownDayTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sunday" => Ok(DayTag::Sunday),
            "monday" => Ok(DayTag::Monday),
            "tuesday" => Ok(DayTag::Tuesday),
            "wednesday" => Ok(DayTag::Wednesday),
            "thursday" => Ok(DayTag::Thursday),
            "friday" => Ok(DayTag::Friday),
            other => Err(UnknownDayTag(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown lesson day tag: {0}")]
pub struct UnknownDayTag(pub String);

/// A quiz question, immutable once loaded from the content store.
/// `quiz_id` is the study-week identifier the question belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub day: DayTag,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option: usize,
}

impl Question {
    /// A well-formed question offers at least two options and its
    /// answer key points at one of them.
    pub fn is_well_formed(&self) -> bool {
        self.options.len() >= 2 && self.correct_option < self.options.len()
    }
}
