//! Brain Type Scoring Engine
//!
//! Turns a completed answer set into a ranked diagnostic result.
//!
//! # Algorithm
//!
//! ```text
//! Tally[t]  = number of answers equal to t   (every t starts at 0)
//! Ranking   = categories sorted by Tally desc, then by tie-break priority
//! Primary   = Ranking[0]
//! Secondary = Ranking[1]
//! ```
//!
//! # Tie-break
//!
//! Equal counts are ordered by [`crate::models::BrainType::TIE_BREAK_ORDER`]:
//! Cheetah, Owl, Dolphin, Elephant. The order never depends on the
//! order in which answers were given, so identical answer sets always
//! produce identical results.
//!
//! # Example
//!
//! Answers `[cheetah, cheetah, owl, cheetah, dolphin]`:
//! - Tally: cheetah 3, owl 1, dolphin 1, elephant 0
//! - Owl and Dolphin tie at 1, Owl wins on priority
//! - Primary = Cheetah, Secondary = Owl

mod engine;

pub use engine::{rank, score, tally, ScoringError};
