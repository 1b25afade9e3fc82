//! Discovers and parses seed files.
use std::{collections::HashMap, fs};

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("seed directory {} is not readable: {}", .0, .1)]
    Unreadable(Utf8PathBuf, std::io::Error),

    #[error("seed path {} is not a directory", .0)]
    NotADirectory(Utf8PathBuf),
}

/// One parsed seed file.
///
/// Records are kept as raw JSON so a malformed course, lesson or quiz only
/// fails itself when it is imported.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SeedDocument {
    #[serde(skip)]
    pub source: Utf8PathBuf,

    #[serde(default)]
    pub courses: Vec<Value>,

    /// Lessons keyed by course slug
    #[serde(default)]
    pub lessons: HashMap<String, Vec<Value>>,

    /// Quizzes keyed by lesson slug
    #[serde(default)]
    pub quizzes: HashMap<String, Value>,
}

impl SeedDocument {
    pub fn parse(source: &Utf8Path, text: &str) -> serde_json::Result<Self> {
        let mut doc: SeedDocument = serde_json::from_str(text)?;
        doc.source = source.to_path_buf();
        Ok(doc)
    }

    /// File name, for messages
    pub fn name(&self) -> &str {
        self.source.file_name().unwrap_or(self.source.as_str())
    }
}

/// Reads every `*.json` file in one directory
#[derive(Debug, Clone)]
pub struct SeedLoader {
    dir: Utf8PathBuf,
}

impl SeedLoader {
    /// Fails if `dir` is not a readable directory.
    pub fn open(dir: impl Into<Utf8PathBuf>) -> Result<Self, LoadError> {
        let dir = dir.into();
        let meta = fs::metadata(&dir).map_err(|e| LoadError::Unreadable(dir.clone(), e))?;
        if !meta.is_dir() {
            return Err(LoadError::NotADirectory(dir));
        }
        fs::read_dir(&dir).map_err(|e| LoadError::Unreadable(dir.clone(), e))?;

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Seed files in name order. Returns an empty list if the directory can't be read.
    pub fn seed_files(&self) -> Vec<Utf8PathBuf> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(e) => e,
            Err(e) => {
                warn!("could not read seed directory {}: {}", self.dir, e);
                return vec![];
            }
        };

        let mut files = entries
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.path()),
                Err(e) => {
                    warn!("skipping unreadable entry in {}: {}", self.dir, e);
                    None
                }
            })
            .filter_map(|path| match Utf8PathBuf::from_path_buf(path) {
                Ok(p) => Some(p),
                Err(p) => {
                    warn!("skipping non utf-8 path {}", p.display());
                    None
                }
            })
            .filter(|p| p.extension() == Some("json") && p.is_file())
            .collect::<Vec<_>>();
        files.sort();

        files
    }

    /// Parse every seed file, skipping any that can't be read or parsed
    pub fn load(&self) -> Vec<SeedDocument> {
        self.seed_files()
            .into_iter()
            .filter_map(|path| {
                let text = match fs::read_to_string(&path) {
                    Ok(t) => t,
                    Err(e) => {
                        warn!("skipping {}: {}", path, e);
                        return None;
                    }
                };

                match SeedDocument::parse(&path, &text) {
                    Ok(doc) => {
                        debug!("loaded {} with {} courses", path, doc.courses.len());
                        Some(doc)
                    }
                    Err(e) => {
                        warn!("skipping malformed seed file {}: {}", path, e);
                        None
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_side_maps() {
        let doc = SeedDocument::parse(
            Utf8Path::new("seed/arabic.json"),
            r#"{
                "courses": [{"title": "Arabic 1"}],
                "lessons": {"arabic-1": [{"title": "Alphabet"}]},
                "quizzes": {"alphabet": {"questions": []}}
            }"#,
        )
        .unwrap();

        assert_eq!(doc.name(), "arabic.json");
        assert_eq!(doc.courses.len(), 1);
        assert_eq!(doc.lessons["arabic-1"].len(), 1);
        assert!(doc.quizzes.contains_key("alphabet"));
    }

    #[test]
    fn test_parse_without_courses() {
        let doc = SeedDocument::parse(Utf8Path::new("empty.json"), "{}").unwrap();
        assert!(doc.courses.is_empty());
    }

    #[test]
    fn test_courses_must_be_a_list() {
        assert!(SeedDocument::parse(Utf8Path::new("bad.json"), r#"{"courses": 3}"#).is_err());
    }
}
