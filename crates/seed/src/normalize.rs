//! Maps both historical seed schemas onto the canonical records.
//!
//! For each attribute the canonical field wins when present; otherwise the
//! legacy field goes through a lookup table; otherwise a fixed default is used.
//! Every function here is pure.
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::model::{
    Course, Lesson, Question, Quiz, RawCourse, RawLesson, RawQuestion, RawQuiz, TextOrList,
};

pub const DEFAULT_AGE_TIER: &str = "adults";
pub const DEFAULT_DIFFICULTY: &str = "beginner";
pub const DEFAULT_SUBJECT: &str = "quran";
pub const DEFAULT_DURATION_WEEKS: u32 = 12;
pub const DEFAULT_LESSON_TYPE: &str = "reading";
pub const DEFAULT_LESSON_MINUTES: u32 = 30;
pub const DEFAULT_PASSING_SCORE: u32 = 70;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_QUESTION_TYPE: &str = "multiple_choice";
pub const DEFAULT_QUESTION_POINTS: u32 = 10;

static NON_SLUG_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("record has no title")]
    MissingTitle,

    #[error("title {:?} does not produce a usable slug", .0)]
    EmptySlug(String),

    #[error("question {} has no text", .0 + 1)]
    MissingQuestion(usize),

    #[error("question points add up to more than {}", u32::MAX)]
    PointsOverflow,
}

/// Lowercase, collapse every run of non-alphanumerics to one hyphen, trim hyphens.
pub fn slugify(s: &str) -> String {
    NON_SLUG_RUN
        .replace_all(&s.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Legacy `target_audience` values
pub fn age_tier_for_audience(audience: &str) -> Option<&'static str> {
    match audience.trim().to_ascii_uppercase().as_str() {
        "ELEMENTARY" => Some("children"),
        "MIDDLE_SCHOOL" | "HIGH_SCHOOL" => Some("youth"),
        "ADULTS" | "COLLEGE" => Some("adults"),
        "SENIORS" => Some("seniors"),
        _ => None,
    }
}

/// Legacy `difficulty_level` values
pub fn difficulty_for_level(level: &str) -> Option<&'static str> {
    match level.trim().to_ascii_uppercase().as_str() {
        "BEGINNER" => Some("beginner"),
        "INTERMEDIATE" => Some("intermediate"),
        "ADVANCED" => Some("advanced"),
        _ => None,
    }
}

/// Legacy `category` values
pub fn subject_for_category(category: &str) -> Option<&'static str> {
    match category.trim().to_ascii_uppercase().as_str() {
        "QURAN_STUDIES" => Some("quran"),
        "ARABIC_LANGUAGE" => Some("arabic"),
        "FIQH" => Some("fiqh"),
        "HADITH" => Some("hadith"),
        "SEERAH" => Some("seerah"),
        "AQEEDAH" => Some("aqeedah"),
        "AKHLAQ" => Some("akhlaq"),
        "TAJWEED" => Some("tajweed"),
        _ => None,
    }
}

/// Legacy `content_type` values
pub fn lesson_type_for_content(content_type: &str) -> Option<&'static str> {
    match content_type.trim().to_ascii_uppercase().as_str() {
        "TEXT" | "READING" => Some("reading"),
        "VIDEO" => Some("video"),
        "AUDIO" => Some("audio"),
        "INTERACTIVE" => Some("interactive"),
        "QUIZ" => Some("quiz"),
        "ASSIGNMENT" => Some("assignment"),
        _ => None,
    }
}

/// Treats blank strings the same as absent ones
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn owned(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Canonical value if present, else the legacy value through `lookup`, else `default`
fn resolve(
    field: &str,
    canonical: &Option<String>,
    legacy: &Option<String>,
    lookup: fn(&str) -> Option<&'static str>,
    default: &str,
) -> String {
    if let Some(v) = present(canonical) {
        return v.to_lowercase();
    }

    match present(legacy) {
        Some(v) => match lookup(v) {
            Some(mapped) => mapped.to_string(),
            None => {
                debug!("unknown {} {:?}, using {:?}", field, v, default);
                default.to_string()
            }
        },
        None => default.to_string(),
    }
}

fn title_and_slug(
    title: &Option<String>,
    slug: &Option<String>,
) -> Result<(String, String), NormalizeError> {
    let title = present(title).ok_or(NormalizeError::MissingTitle)?;
    let slug = match present(slug) {
        Some(s) => s.to_string(),
        None => slugify(title),
    };
    if slug.is_empty() {
        return Err(NormalizeError::EmptySlug(title.to_string()));
    }

    Ok((title.to_string(), slug))
}

pub fn normalize_course(raw: RawCourse) -> Result<Course, NormalizeError> {
    let (title, slug) = title_and_slug(&raw.title, &raw.slug)?;

    Ok(Course {
        age_tier: resolve(
            "target_audience",
            &raw.age_tier,
            &raw.target_audience,
            age_tier_for_audience,
            DEFAULT_AGE_TIER,
        ),
        subject: resolve(
            "category",
            &raw.subject,
            &raw.category,
            subject_for_category,
            DEFAULT_SUBJECT,
        ),
        difficulty: resolve(
            "difficulty_level",
            &raw.difficulty,
            &raw.difficulty_level,
            difficulty_for_level,
            DEFAULT_DIFFICULTY,
        ),
        duration_weeks: raw
            .duration_weeks
            .or(raw.estimated_duration_weeks)
            .unwrap_or(DEFAULT_DURATION_WEEKS),
        title,
        slug,
        description: owned(raw.description),
        schedule: owned(raw.schedule),
        instructor: owned(raw.instructor),
        prerequisites: raw
            .prerequisites
            .map(TextOrList::into_text)
            .and_then(|s| owned(Some(s))),
        learning_outcomes: raw
            .learning_outcomes
            .map(TextOrList::into_list)
            .unwrap_or_default(),
        featured: raw.featured.or(raw.is_featured).unwrap_or(false),
    })
}

/// `position` is the lesson's zero-based place in its list, used when no order is given.
pub fn normalize_lesson(raw: RawLesson, position: usize) -> Result<Lesson, NormalizeError> {
    let (title, slug) = title_and_slug(&raw.title, &raw.slug)?;

    Ok(Lesson {
        lesson_type: resolve(
            "content_type",
            &raw.lesson_type,
            &raw.content_type,
            lesson_type_for_content,
            DEFAULT_LESSON_TYPE,
        ),
        lesson_order: raw
            .lesson_order
            .or(raw.order_index)
            .unwrap_or(position as u32 + 1),
        title,
        slug,
        description: owned(raw.description),
        content: raw.content.filter(|s| !s.trim().is_empty()),
        duration_minutes: raw.duration_minutes.unwrap_or(DEFAULT_LESSON_MINUTES),
        is_preview: raw.is_preview.or(raw.preview).unwrap_or(false),
        learning_objectives: raw
            .learning_objectives
            .map(TextOrList::into_list)
            .unwrap_or_default(),
    })
}

fn normalize_question(raw: RawQuestion, idx: usize) -> Result<Question, NormalizeError> {
    let question = present(&raw.question)
        .or_else(|| present(&raw.text))
        .ok_or(NormalizeError::MissingQuestion(idx))?
        .to_string();

    Ok(Question {
        question,
        question_type: present(&raw.question_type)
            .or_else(|| present(&raw.kind))
            .map(str::to_lowercase)
            .unwrap_or_else(|| DEFAULT_QUESTION_TYPE.to_string()),
        options: raw.options,
        correct_answer: raw.correct_answer.unwrap_or(Value::Null),
        explanation: owned(raw.explanation),
        points: raw.points.unwrap_or(DEFAULT_QUESTION_POINTS),
    })
}

/// Sum of question points, counting absent points as the default
pub fn total_points(questions: &[RawQuestion]) -> Result<u32, NormalizeError> {
    questions
        .iter()
        .map(|q| q.points.unwrap_or(DEFAULT_QUESTION_POINTS))
        .try_fold(0u32, |total, points| {
            total
                .checked_add(points)
                .ok_or(NormalizeError::PointsOverflow)
        })
}

/// Quizzes without a title are named after their lesson.
pub fn normalize_quiz(raw: RawQuiz, lesson_title: &str) -> Result<Quiz, NormalizeError> {
    let total_points = total_points(&raw.questions)?;
    let questions = raw
        .questions
        .into_iter()
        .enumerate()
        .map(|(i, q)| normalize_question(q, i))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Quiz {
        title: present(&raw.title)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} Quiz", lesson_title)),
        description: owned(raw.description),
        passing_score: raw.passing_score.unwrap_or(DEFAULT_PASSING_SCORE),
        time_limit: raw.time_limit,
        max_attempts: raw.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
        questions,
        total_points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Test Course!!"), "test-course");
        assert_eq!(slugify("  Intro to Tajweed -- Part 1 "), "intro-to-tajweed-part-1");
        assert_eq!(slugify("already-a-slug"), "already-a-slug");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_idempotent() {
        for s in [
            "Test Course!!",
            "Seerah: The Makkan Period",
            "a__b  c",
            "--x--",
            "Ünïcode Title",
        ] {
            let once = slugify(s);
            assert_eq!(slugify(&once), once);
        }
    }

    #[test]
    fn test_lookups() {
        assert_eq!(age_tier_for_audience("ELEMENTARY"), Some("children"));
        assert_eq!(age_tier_for_audience("high_school"), Some("youth"));
        assert_eq!(age_tier_for_audience("COLLEGE"), Some("adults"));
        assert_eq!(age_tier_for_audience("TODDLERS"), None);
        assert_eq!(subject_for_category("ARABIC_LANGUAGE"), Some("arabic"));
        assert_eq!(difficulty_for_level("ADVANCED"), Some("advanced"));
        assert_eq!(lesson_type_for_content("TEXT"), Some("reading"));
    }

    #[test]
    fn test_blank_title_is_missing() {
        let raw = RawCourse {
            title: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(normalize_course(raw), Err(NormalizeError::MissingTitle));
    }

    #[test]
    fn test_unsluggable_title() {
        let raw = RawCourse {
            title: Some("تجويد".to_string()),
            ..Default::default()
        };
        assert_eq!(
            normalize_course(raw),
            Err(NormalizeError::EmptySlug("تجويد".to_string()))
        );
    }
}
