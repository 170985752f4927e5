// src/seed.rs

//! Catalog import. The quiz protocol never creates questions or quiz types;
//! they are loaded from a seed file at boot instead.

use std::{collections::HashSet, fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

use crate::{
    models::{Question, QuizType},
    store::{Collections, StoreError},
};

#[derive(Debug, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub quiz_types: Vec<QuizType>,
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Read(#[from] std::io::Error),

    #[error("seed file is not a valid catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("quiz type '{quiz_type}' references unknown question '{question}'")]
    UnknownQuestion { quiz_type: String, question: String },

    #[error("quiz type name '{0}' must not be empty or contain ':'")]
    InvalidQuizType(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// How many entities an import actually added.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub questions: usize,
    pub quiz_types: usize,
}

pub fn seed_catalog(collections: &Collections, path: &Path) -> Result<SeedReport, SeedError> {
    let raw = fs::read(path)?;
    let catalog: Catalog = serde_json::from_slice(&raw)?;
    import(collections, catalog)
}

/// Inserts every question and quiz type whose identity is not taken yet.
/// Existing entries are left untouched.
pub fn import(collections: &Collections, catalog: Catalog) -> Result<SeedReport, SeedError> {
    let known: HashSet<&str> = catalog.questions.iter().map(|q| q.id.as_str()).collect();
    for quiz_type in &catalog.quiz_types {
        if quiz_type.name.is_empty() || quiz_type.name.contains(':') {
            return Err(SeedError::InvalidQuizType(quiz_type.name.clone()));
        }
        if let Some(missing) = quiz_type
            .question_ids
            .iter()
            .find(|id| !known.contains(id.as_str()) && !collections.questions.contains(id))
        {
            return Err(SeedError::UnknownQuestion {
                quiz_type: quiz_type.name.clone(),
                question: missing.clone(),
            });
        }
    }

    let mut report = SeedReport::default();

    for question in catalog.questions {
        if collections.questions.contains(&question.id) {
            continue;
        }
        collections.questions.save(question)?;
        report.questions += 1;
    }

    for quiz_type in catalog.quiz_types {
        if collections.quiz_types.contains(&quiz_type.name) {
            continue;
        }
        collections.quiz_types.save(quiz_type)?;
        report.quiz_types += 1;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn catalog(value: serde_json::Value) -> Catalog {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn imports_only_missing_entries() {
        let dir = TempDir::new().unwrap();
        let collections = Collections::open(dir.path()).unwrap();

        let first = catalog(json!({
            "questions": [
                { "id": "q1", "prompt": "2 + 2?", "options": ["A: 3", "B: 4"], "answer": "B" }
            ],
            "quiz_types": [ { "name": "math", "question_ids": ["q1"] } ]
        }));
        assert_eq!(
            import(&collections, first).unwrap(),
            SeedReport {
                questions: 1,
                quiz_types: 1
            }
        );

        let second = catalog(json!({
            "questions": [
                { "id": "q1", "prompt": "changed", "options": [], "answer": "A" },
                { "id": "q2", "prompt": "3 + 3?", "options": ["A: 6"], "answer": "A" }
            ],
            "quiz_types": [ { "name": "math", "question_ids": ["q2"] } ]
        }));
        assert_eq!(
            import(&collections, second).unwrap(),
            SeedReport {
                questions: 1,
                quiz_types: 0
            }
        );

        assert_eq!(collections.questions.get("q1").unwrap().answer, "B");
        assert_eq!(
            collections.quiz_types.get("math").unwrap().question_ids,
            vec!["q1".to_string()]
        );
    }

    #[test]
    fn rejects_dangling_question_references() {
        let dir = TempDir::new().unwrap();
        let collections = Collections::open(dir.path()).unwrap();

        let bad = catalog(json!({
            "quiz_types": [ { "name": "math", "question_ids": ["nope"] } ]
        }));

        let err = import(&collections, bad).unwrap_err();
        assert!(matches!(err, SeedError::UnknownQuestion { ref question, .. } if question == "nope"));
        assert!(collections.quiz_types.is_empty());
    }

    #[test]
    fn rejects_quiz_type_names_with_separator() {
        let dir = TempDir::new().unwrap();
        let collections = Collections::open(dir.path()).unwrap();

        let bad = catalog(json!({
            "questions": [
                { "id": "q1", "prompt": "2 + 2?", "options": ["A: 3", "B: 4"], "answer": "B" }
            ],
            "quiz_types": [ { "name": "b:c", "question_ids": ["q1"] } ]
        }));

        let err = import(&collections, bad).unwrap_err();
        assert!(matches!(err, SeedError::InvalidQuizType(ref name) if name == "b:c"));
        assert!(collections.questions.is_empty());
        assert!(collections.quiz_types.is_empty());
    }

    #[test]
    fn shipped_catalog_is_valid() {
        let dir = TempDir::new().unwrap();
        let collections = Collections::open(dir.path()).unwrap();
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("seed/catalog.json");

        let report = seed_catalog(&collections, &path).unwrap();
        assert!(report.quiz_types > 0);
        assert!(report.questions > 0);
    }
}
