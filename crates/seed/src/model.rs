//! Seed records as they appear on disk, and the canonical records written to the CMS.
//!
//! The `Raw*` types accept both historical seed schemas at once. Every field
//! is optional so the normalizer can decide which name wins.
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A field given either as one string or as a list of strings
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TextOrList {
    Text(String),
    List(Vec<String>),
}

impl TextOrList {
    /// Flatten to a list. Text is split on newlines, blank lines dropped.
    pub fn into_list(self) -> Vec<String> {
        let items = match self {
            TextOrList::Text(s) => s.lines().map(str::to_string).collect(),
            TextOrList::List(l) => l,
        };
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Flatten to text, one list item per line
    pub fn into_text(self) -> String {
        match self {
            TextOrList::Text(s) => s,
            TextOrList::List(l) => l.join("\n"),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawCourse {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,

    pub age_tier: Option<String>,
    pub target_audience: Option<String>,

    pub subject: Option<String>,
    pub category: Option<String>,

    pub difficulty: Option<String>,
    pub difficulty_level: Option<String>,

    pub duration_weeks: Option<u32>,
    pub estimated_duration_weeks: Option<u32>,

    pub schedule: Option<String>,
    pub instructor: Option<String>,
    pub prerequisites: Option<TextOrList>,
    pub learning_outcomes: Option<TextOrList>,
    pub featured: Option<bool>,
    pub is_featured: Option<bool>,

    /// Lessons embedded in the course itself. Kept raw so one bad lesson fails alone.
    #[serde(default)]
    pub lessons: Vec<Value>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawLesson {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,

    pub lesson_type: Option<String>,
    pub content_type: Option<String>,

    pub lesson_order: Option<u32>,
    pub order_index: Option<u32>,

    pub duration_minutes: Option<u32>,
    pub is_preview: Option<bool>,
    pub preview: Option<bool>,
    pub learning_objectives: Option<TextOrList>,

    pub quiz: Option<Value>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawQuiz {
    pub title: Option<String>,
    pub description: Option<String>,
    pub passing_score: Option<u32>,
    pub time_limit: Option<u32>,
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub questions: Vec<RawQuestion>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawQuestion {
    pub question: Option<String>,
    pub text: Option<String>,
    pub question_type: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: Option<Value>,
    pub explanation: Option<String>,
    pub points: Option<u32>,
}

/// A course in canonical form. Identity is `slug`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Course {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub subject: String,
    pub age_tier: String,
    pub difficulty: String,
    pub duration_weeks: u32,
    pub schedule: Option<String>,
    pub instructor: Option<String>,
    pub prerequisites: Option<String>,
    pub learning_outcomes: Vec<String>,
    pub featured: bool,
}

/// A lesson in canonical form. Identity is `slug` within its course.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Lesson {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub lesson_type: String,
    pub lesson_order: u32,
    pub duration_minutes: u32,
    pub is_preview: bool,
    pub learning_objectives: Vec<String>,
}

/// A quiz in canonical form. Identity is the lesson it belongs to.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Quiz {
    pub title: String,
    pub description: Option<String>,
    pub passing_score: u32,
    pub time_limit: Option<u32>,
    pub max_attempts: u32,
    pub questions: Vec<Question>,
    pub total_points: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Question {
    pub question: String,
    pub question_type: String,
    pub options: Vec<String>,
    pub correct_answer: Value,
    pub explanation: Option<String>,
    pub points: u32,
}
