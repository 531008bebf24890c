//! Question catalog and brain type profiles
//!
//! The catalog is static content: the ordered questions, their options and
//! the profile shown for each brain type. A default catalog is embedded in
//! the binary; a TOML file with the same layout can replace it.

mod color;

pub use color::Rgb;

use crate::models::{BrainType, BrainTypeProfile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

const DEFAULT_CATALOG: &str = include_str!("../../assets/catalog.toml");

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Catalog has no questions")]
    NoQuestions,

    #[error("Question {question} needs at least 2 options (has {count})")]
    TooFewOptions { question: usize, count: usize },

    #[error("Missing profile for brain type '{0}'")]
    MissingProfile(BrainType),

    #[error("Duplicate profile for brain type '{0}'")]
    DuplicateProfile(BrainType),

    #[error("Profile '{brain_type}' has invalid color '{color}' (expected #RRGGBB)")]
    InvalidColor { brain_type: BrainType, color: String },
}

/// One selectable answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub label: String,
    pub brain_type: BrainType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub options: Vec<AnswerOption>,
}

/// On-disk layout
#[derive(Debug, Deserialize)]
struct CatalogFile {
    questions: Vec<Question>,
    profiles: Vec<BrainTypeProfile>,
}

/// Validated questions and profiles
#[derive(Debug, Clone)]
pub struct Catalog {
    questions: Vec<Question>,
    profiles: BTreeMap<BrainType, BrainTypeProfile>,
}

impl Catalog {
    /// The catalog shipped with the binary
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml(DEFAULT_CATALOG)
    }

    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::new(file.questions, file.profiles)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_toml(&content)?;
        debug!(
            "Loaded catalog from {} ({} questions)",
            path.display(),
            catalog.len()
        );
        Ok(catalog)
    }

    /// Load `path` if given, the builtin catalog otherwise
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(p) => Self::load(p),
            None => Self::builtin(),
        }
    }

    pub fn new(
        questions: Vec<Question>,
        profiles: Vec<BrainTypeProfile>,
    ) -> Result<Self, CatalogError> {
        if questions.is_empty() {
            return Err(CatalogError::NoQuestions);
        }
        for (i, q) in questions.iter().enumerate() {
            if q.options.len() < 2 {
                return Err(CatalogError::TooFewOptions {
                    question: i + 1,
                    count: q.options.len(),
                });
            }
        }

        let mut by_type = BTreeMap::new();
        for profile in profiles {
            if Rgb::from_hex(&profile.color).is_none() {
                return Err(CatalogError::InvalidColor {
                    brain_type: profile.brain_type,
                    color: profile.color,
                });
            }
            let brain_type = profile.brain_type;
            if by_type.insert(brain_type, profile).is_some() {
                return Err(CatalogError::DuplicateProfile(brain_type));
            }
        }
        if let Some(missing) = BrainType::all().iter().find(|t| !by_type.contains_key(*t)) {
            return Err(CatalogError::MissingProfile(*missing));
        }

        Ok(Self {
            questions,
            profiles: by_type,
        })
    }

    /// Number of questions (N)
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Every brain type has a profile once the catalog is validated
    pub fn profile(&self, brain_type: BrainType) -> &BrainTypeProfile {
        &self.profiles[&brain_type]
    }

    /// Resolve an answer token for question `index`: a brain type name
    /// (`owl`) or a 1-based option number (`2`).
    pub fn resolve_answer(&self, index: usize, token: &str) -> Option<BrainType> {
        let question = self.question(index)?;
        let token = token.trim();
        if let Ok(n) = token.parse::<usize>() {
            return n
                .checked_sub(1)
                .and_then(|i| question.options.get(i))
                .map(|o| o.brain_type);
        }
        token.parse().ok()
    }
}
