//! Core data models for braintype
//!
//! These models are shared by the state machine, the scoring engine and
//! the export pipeline: brain type categories, the answer set, tallies,
//! diagnostic results and the finalized declaration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

/// Minimum number of characters (after trimming) a commitment needs.
pub const MIN_COMMITMENT_CHARS: usize = 5;

/// Brain type categories
///
/// Declaration order is the tie-break priority used by the scoring engine:
/// when two categories have the same count, the one declared first ranks
/// higher. `Ord` follows the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrainType {
    Cheetah,
    Owl,
    Dolphin,
    Elephant,
}

impl BrainType {
    /// Every category, in tie-break priority order.
    pub const TIE_BREAK_ORDER: [BrainType; 4] = [
        BrainType::Cheetah,
        BrainType::Owl,
        BrainType::Dolphin,
        BrainType::Elephant,
    ];

    pub fn all() -> &'static [BrainType] {
        &Self::TIE_BREAK_ORDER
    }

    /// Position in the tie-break order (0 = highest priority)
    pub fn priority(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BrainType::Cheetah => "cheetah",
            BrainType::Owl => "owl",
            BrainType::Dolphin => "dolphin",
            BrainType::Elephant => "elephant",
        }
    }
}

impl std::fmt::Display for BrainType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrainType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cheetah" => Ok(BrainType::Cheetah),
            "owl" => Ok(BrainType::Owl),
            "dolphin" => Ok(BrainType::Dolphin),
            "elephant" => Ok(BrainType::Elephant),
            _ => Err(anyhow::anyhow!(
                "Unknown brain type '{}'. Valid types: cheetah, owl, dolphin, elephant",
                s
            )),
        }
    }
}

/// Per-question record of the chosen category
///
/// The length is fixed when the set is created. Slots only ever go from
/// unanswered to answered (or are overwritten with another choice).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSet {
    slots: Vec<Option<BrainType>>,
}

impl AnswerSet {
    /// Create an answer set with `len` unanswered slots
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    /// Build a fully answered set (handy for scoring outside a session)
    pub fn from_answers(answers: &[BrainType]) -> Self {
        Self {
            slots: answers.iter().copied().map(Some).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<BrainType> {
        self.slots.get(index).copied().flatten()
    }

    pub fn is_answered(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    pub fn answered_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn first_unanswered(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    pub fn slots(&self) -> &[Option<BrainType>] {
        &self.slots
    }

    /// Record an answer. Out-of-range writes are ignored; the session never
    /// issues them because the cursor is always a valid index.
    pub(crate) fn set(&mut self, index: usize, brain_type: BrainType) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(brain_type);
        }
    }
}

/// Count of answers per category
///
/// Every category is always present, zero when never chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tally {
    counts: BTreeMap<BrainType, usize>,
}

impl Default for Tally {
    fn default() -> Self {
        Self {
            counts: BrainType::all().iter().map(|&t| (t, 0)).collect(),
        }
    }
}

impl Tally {
    pub fn from_answers(answers: &AnswerSet) -> Self {
        let mut tally = Self::default();
        for brain_type in answers.slots().iter().flatten() {
            tally.increment(*brain_type);
        }
        tally
    }

    pub fn increment(&mut self, brain_type: BrainType) {
        *self.counts.entry(brain_type).or_insert(0) += 1;
    }

    pub fn get(&self, brain_type: BrainType) -> usize {
        self.counts.get(&brain_type).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Iterate in tie-break priority order
    pub fn iter(&self) -> impl Iterator<Item = (BrainType, usize)> + '_ {
        self.counts.iter().map(|(t, c)| (*t, *c))
    }
}

/// Outcome of scoring a completed answer set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticResult {
    pub primary: BrainType,
    pub secondary: BrainType,
    pub tally: Tally,
    /// Every category, highest first
    pub ranking: Vec<BrainType>,
}

/// Best partner pairing for a brain type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chemistry {
    pub partner: String,
    pub synergy: String,
}

/// Static content describing one brain type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrainTypeProfile {
    pub brain_type: BrainType,
    pub name: String,
    pub english_name: String,
    pub description: String,
    /// `#RRGGBB`
    pub color: String,
    #[serde(default)]
    pub reading_strategy: Vec<String>,
    #[serde(default)]
    pub memory_strategy: Vec<String>,
    #[serde(default)]
    pub decision_strategy: Vec<String>,
    pub chemistry: Chemistry,
    pub blind_spot: String,
    pub recommended_action: String,
}

/// Rejected user input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter your name to continue")]
    EmptyName,

    #[error("Write a commitment of at least {min} characters (got {actual})")]
    CommitmentTooShort { min: usize, actual: usize },
}

/// Check a display name, returning the trimmed value
pub fn validate_display_name(name: &str) -> Result<&str, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(trimmed)
}

/// Check a commitment, returning the trimmed value
///
/// Length is counted in characters, so "다짐합니다!" passes.
pub fn validate_commitment(commitment: &str) -> Result<&str, ValidationError> {
    let trimmed = commitment.trim();
    let actual = trimmed.chars().count();
    if actual < MIN_COMMITMENT_CHARS {
        return Err(ValidationError::CommitmentTooShort {
            min: MIN_COMMITMENT_CHARS,
            actual,
        });
    }
    Ok(trimmed)
}

/// A finalized commitment paired with the primary profile, ready for export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    display_name: String,
    profile: BrainTypeProfile,
    commitment: String,
}

impl Declaration {
    pub fn new(
        display_name: &str,
        profile: BrainTypeProfile,
        commitment: &str,
    ) -> Result<Self, ValidationError> {
        let display_name = validate_display_name(display_name)?.to_string();
        let commitment = validate_commitment(commitment)?.to_string();
        Ok(Self {
            display_name,
            profile,
            commitment,
        })
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn profile(&self) -> &BrainTypeProfile {
        &self.profile
    }

    pub fn commitment(&self) -> &str {
        &self.commitment
    }
}
