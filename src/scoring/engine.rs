//! Tally, rank and pick primary/secondary brain types

use crate::models::{AnswerSet, BrainType, DiagnosticResult, Tally};
use thiserror::Error;
use tracing::debug;

/// Scoring was invoked on an answer set it cannot score
///
/// The state machine only scores complete answer sets, so seeing one of
/// these means a logic bug upstream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    #[error("Cannot score an empty answer set")]
    Empty,

    #[error("Question {} is unanswered", .index + 1)]
    Unanswered { index: usize },
}

/// Count answers per category. Works on partial answer sets too.
pub fn tally(answers: &AnswerSet) -> Tally {
    Tally::from_answers(answers)
}

/// Order every category by count (highest first), breaking ties by priority
pub fn rank(tally: &Tally) -> Vec<BrainType> {
    let mut ranking = BrainType::TIE_BREAK_ORDER.to_vec();
    ranking.sort_by(|a, b| {
        tally
            .get(*b)
            .cmp(&tally.get(*a))
            .then_with(|| a.priority().cmp(&b.priority()))
    });
    ranking
}

/// Score a completed answer set
pub fn score(answers: &AnswerSet) -> Result<DiagnosticResult, ScoringError> {
    if answers.is_empty() {
        return Err(ScoringError::Empty);
    }
    if let Some(index) = answers.first_unanswered() {
        return Err(ScoringError::Unanswered { index });
    }

    let tally = tally(answers);
    let ranking = rank(&tally);
    let (primary, secondary) = (ranking[0], ranking[1]);

    debug!(
        "Scored {} answers: primary={} secondary={} tally={:?}",
        answers.len(),
        primary,
        secondary,
        tally
    );

    Ok(DiagnosticResult {
        primary,
        secondary,
        tally,
        ranking,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use BrainType::*;

    #[test]
    fn test_reference_scenario() {
        let answers = AnswerSet::from_answers(&[Cheetah, Cheetah, Owl, Cheetah, Dolphin]);
        let result = score(&answers).unwrap();

        assert_eq!(result.tally.get(Cheetah), 3);
        assert_eq!(result.tally.get(Owl), 1);
        assert_eq!(result.tally.get(Dolphin), 1);
        assert_eq!(result.tally.get(Elephant), 0);
        assert_eq!(result.primary, Cheetah);
        assert_eq!(result.secondary, Owl);
        assert_eq!(result.ranking, vec![Cheetah, Owl, Dolphin, Elephant]);
    }

    #[test]
    fn test_tally_sums_to_question_count() {
        let patterns: [&[BrainType]; 4] = [
            &[Owl],
            &[Elephant, Elephant, Dolphin],
            &[Cheetah, Owl, Dolphin, Elephant, Owl, Owl],
            &[Dolphin; 20],
        ];
        for answers in patterns {
            let result = score(&AnswerSet::from_answers(answers)).unwrap();
            assert_eq!(result.tally.total(), answers.len());
        }
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let answers = AnswerSet::from_answers(&[Elephant, Dolphin, Dolphin, Elephant]);
        assert_eq!(score(&answers).unwrap(), score(&answers).unwrap());
    }

    #[test]
    fn test_tie_break_ignores_answer_order() {
        let forward = score(&AnswerSet::from_answers(&[Elephant, Dolphin, Owl])).unwrap();
        let reversed = score(&AnswerSet::from_answers(&[Owl, Dolphin, Elephant])).unwrap();

        assert_eq!(forward.ranking, reversed.ranking);
        assert_eq!(forward.primary, Owl);
        assert_eq!(forward.secondary, Dolphin);
        // Cheetah has no votes, so it ranks last despite top priority
        assert_eq!(forward.ranking.last(), Some(&Cheetah));
    }

    #[test]
    fn test_all_tied_uses_priority_order() {
        let result = score(&AnswerSet::from_answers(&[Elephant, Dolphin, Owl, Cheetah])).unwrap();
        assert_eq!(result.ranking, BrainType::TIE_BREAK_ORDER.to_vec());
    }

    #[test]
    fn test_zero_count_never_primary_or_secondary_when_avoidable() {
        let result = score(&AnswerSet::from_answers(&[Owl, Owl, Dolphin])).unwrap();
        assert_eq!(result.primary, Owl);
        assert_eq!(result.secondary, Dolphin);
    }

    #[test]
    fn test_incomplete_answers_fail_fast() {
        let mut answers = AnswerSet::new(3);
        answers.set(0, Owl);
        assert_eq!(score(&answers), Err(ScoringError::Unanswered { index: 1 }));
        assert_eq!(score(&AnswerSet::new(0)), Err(ScoringError::Empty));
    }

    #[test]
    fn test_partial_tally_counts_answered_slots() {
        let mut answers = AnswerSet::new(4);
        answers.set(1, Dolphin);
        answers.set(3, Dolphin);
        assert_eq!(tally(&answers).total(), answers.answered_count());
    }
}
