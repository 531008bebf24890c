//! Assessment state machine
//!
//! An [`AssessmentSession`] is an owned value. [`AssessmentSession::apply`]
//! is a pure transition function: it takes an [`Event`] and returns the next
//! session plus the [`Effect`]s the caller should perform (timers, view
//! resets). Nothing here touches a terminal, a clock or a renderer.
//!
//! # Stages
//!
//! ```text
//! Intro ─Start─▶ NameCapture ─SubmitName─▶ Quiz ─Next@last─▶ Scoring ─RevealResult─▶ Result
//!   ▲                                                                                  │
//!   └──────────────────────────────────── Reset ───────────────────────────────────────┘
//! ```

mod driver;
mod timer;

pub use driver::SessionDriver;
pub use timer::{ScheduledTransition, TimerKind, Timeline};

use crate::models::{
    validate_commitment, validate_display_name, AnswerSet, BrainType, DiagnosticResult,
    ValidationError,
};
use crate::scoring::{self, ScoringError};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default pause before the quiz moves on after a selection
pub const DEFAULT_AUTO_ADVANCE: Duration = Duration::from_millis(300);

/// Default length of the "analyzing" phase
pub const DEFAULT_ANALYSIS_DELAY: Duration = Duration::from_millis(2500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Intro,
    NameCapture,
    Quiz,
    Scoring,
    Result,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Intro => write!(f, "intro"),
            Stage::NameCapture => write!(f, "name capture"),
            Stage::Quiz => write!(f, "quiz"),
            Stage::Scoring => write!(f, "scoring"),
            Stage::Result => write!(f, "result"),
        }
    }
}

/// Timer delays used by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub auto_advance: Duration,
    pub analysis_delay: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            auto_advance: DEFAULT_AUTO_ADVANCE,
            analysis_delay: DEFAULT_ANALYSIS_DELAY,
        }
    }
}

impl Timings {
    /// No delays at all (non-interactive runs)
    pub fn immediate() -> Self {
        Self {
            auto_advance: Duration::ZERO,
            analysis_delay: Duration::ZERO,
        }
    }
}

/// Something that happened to the session: user input or a fired timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start,
    SubmitName(String),
    Select(BrainType),
    Next,
    Previous,
    AutoAdvance { from: usize },
    RevealResult,
    SubmitCommitment(String),
    EditCommitment,
    Reset,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Start => "start",
            Event::SubmitName(_) => "submit_name",
            Event::Select(_) => "select",
            Event::Next => "next",
            Event::Previous => "previous",
            Event::AutoAdvance { .. } => "auto_advance",
            Event::RevealResult => "reveal_result",
            Event::SubmitCommitment(_) => "submit_commitment",
            Event::EditCommitment => "edit_commitment",
            Event::Reset => "reset",
        }
    }
}

/// Side effects requested by a transition, performed outside the pure core
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fire `event` after `after`, replacing any pending timer of the same kind
    Schedule {
        kind: TimerKind,
        after: Duration,
        event: Event,
    },
    Cancel(TimerKind),
    CancelAll,
    /// Scroll back to the top and reset focus
    ResetView,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("'{event}' is not allowed during the {stage} stage")]
    InvalidEvent { event: &'static str, stage: Stage },

    #[error("Scoring failed: {0}")]
    Scoring(#[from] ScoringError),

    #[error("The quiz has no questions")]
    NoQuestions,
}

/// Result of applying one event
#[derive(Debug, Clone)]
pub struct Transition {
    pub session: AssessmentSession,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(session: AssessmentSession) -> Self {
        Self {
            session,
            effects: Vec::new(),
        }
    }

    fn with(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// One run through the assessment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentSession {
    stage: Stage,
    display_name: String,
    cursor: usize,
    answers: AnswerSet,
    result: Option<DiagnosticResult>,
    commitment: String,
    declaration_visible: bool,
    timings: Timings,
}

impl AssessmentSession {
    /// Start a session over `question_count` questions
    pub fn new(question_count: usize, timings: Timings) -> Self {
        Self {
            stage: Stage::Intro,
            display_name: String::new(),
            cursor: 0,
            answers: AnswerSet::new(question_count),
            result: None,
            commitment: String::new(),
            declaration_visible: false,
            timings,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Current question index (meaningful during the quiz)
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn question_count(&self) -> usize {
        self.answers.len()
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn current_answer(&self) -> Option<BrainType> {
        self.answers.get(self.cursor)
    }

    pub fn is_last_question(&self) -> bool {
        self.cursor + 1 >= self.answers.len()
    }

    pub fn result(&self) -> Option<&DiagnosticResult> {
        self.result.as_ref()
    }

    pub fn commitment(&self) -> &str {
        &self.commitment
    }

    pub fn declaration_visible(&self) -> bool {
        self.declaration_visible
    }

    pub fn timings(&self) -> Timings {
        self.timings
    }

    /// Apply an event, returning the next session and requested effects.
    ///
    /// `self` is left untouched, so a rejected event keeps the old state.
    pub fn apply(&self, event: Event) -> Result<Transition, SessionError> {
        let event_name = event.name();
        let transition = match (self.stage, event) {
            (Stage::Intro, Event::Start) => {
                let mut next = self.clone();
                next.stage = Stage::NameCapture;
                Transition::to(next)
            }

            (Stage::NameCapture, Event::SubmitName(name)) => {
                let name = validate_display_name(&name)?;
                if self.answers.is_empty() {
                    return Err(SessionError::NoQuestions);
                }
                let mut next = self.clone();
                next.display_name = name.to_string();
                next.cursor = 0;
                next.stage = Stage::Quiz;
                Transition::to(next)
            }

            (Stage::Quiz, Event::Select(brain_type)) => self.select(brain_type),

            (Stage::Quiz, Event::Next) => self.advance_or_submit()?,

            (Stage::Quiz, Event::Previous) => {
                let mut next = self.clone();
                next.cursor = self.cursor.saturating_sub(1);
                Transition::to(next).with(Effect::Cancel(TimerKind::AutoAdvance))
            }

            (Stage::Quiz, Event::AutoAdvance { from }) => {
                let mut next = self.clone();
                if self.cursor == from && self.answers.is_answered(from) && !self.is_last_question()
                {
                    next.cursor = from + 1;
                }
                Transition::to(next)
            }

            // A stale auto-advance that outlived the quiz is harmless
            (_, Event::AutoAdvance { .. }) => Transition::to(self.clone()),

            (Stage::Scoring, Event::RevealResult) => {
                let mut next = self.clone();
                next.stage = Stage::Result;
                Transition::to(next).with(Effect::ResetView)
            }

            (Stage::Result, Event::SubmitCommitment(text)) => {
                let commitment = validate_commitment(&text)?;
                let mut next = self.clone();
                next.commitment = commitment.to_string();
                next.declaration_visible = true;
                Transition::to(next)
            }

            (Stage::Result, Event::EditCommitment) => {
                let mut next = self.clone();
                next.declaration_visible = false;
                Transition::to(next)
            }

            (Stage::Result, Event::Reset) => {
                Transition::to(Self::new(self.answers.len(), self.timings)).with(Effect::CancelAll)
            }

            (stage, _) => {
                return Err(SessionError::InvalidEvent {
                    event: event_name,
                    stage,
                })
            }
        };

        debug!(
            "{} -> {} on '{}' (cursor {})",
            self.stage,
            transition.session.stage,
            event_name,
            transition.session.cursor
        );
        Ok(transition)
    }

    fn select(&self, brain_type: BrainType) -> Transition {
        let mut next = self.clone();
        next.answers.set(self.cursor, brain_type);
        let transition = Transition::to(next);
        if self.is_last_question() {
            // The final question waits for an explicit submit
            return transition;
        }
        transition.with(Effect::Schedule {
            kind: TimerKind::AutoAdvance,
            after: self.timings.auto_advance,
            event: Event::AutoAdvance { from: self.cursor },
        })
    }

    fn advance_or_submit(&self) -> Result<Transition, SessionError> {
        if !self.answers.is_answered(self.cursor) {
            return Ok(Transition::to(self.clone()));
        }

        let mut next = self.clone();
        if !self.is_last_question() {
            next.cursor = self.cursor + 1;
            return Ok(Transition::to(next).with(Effect::Cancel(TimerKind::AutoAdvance)));
        }

        // Every slot before the cursor is answered, so the set is complete here
        debug_assert!(self.answers.is_complete(), "submitting incomplete answers");
        let result = scoring::score(&self.answers)?;
        next.result = Some(result);
        next.stage = Stage::Scoring;
        Ok(Transition::to(next)
            .with(Effect::Cancel(TimerKind::AutoAdvance))
            .with(Effect::Schedule {
                kind: TimerKind::RevealResult,
                after: self.timings.analysis_delay,
                event: Event::RevealResult,
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BrainType::*;

    fn apply(session: &AssessmentSession, event: Event) -> AssessmentSession {
        session.apply(event).unwrap().session
    }

    fn in_quiz(questions: usize) -> AssessmentSession {
        let session = AssessmentSession::new(questions, Timings::default());
        let session = apply(&session, Event::Start);
        apply(&session, Event::SubmitName("Lee".into()))
    }

    #[test]
    fn test_intro_to_quiz() {
        let session = AssessmentSession::new(5, Timings::default());
        assert_eq!(session.stage(), Stage::Intro);

        let session = apply(&session, Event::Start);
        assert_eq!(session.stage(), Stage::NameCapture);

        let session = apply(&session, Event::SubmitName("  Lee  ".into()));
        assert_eq!(session.stage(), Stage::Quiz);
        assert_eq!(session.display_name(), "Lee");
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let session = apply(&AssessmentSession::new(5, Timings::default()), Event::Start);
        let err = session.apply(Event::SubmitName(" \t ".into())).unwrap_err();
        assert_eq!(err, SessionError::Validation(ValidationError::EmptyName));
        assert_eq!(session.stage(), Stage::NameCapture);
    }

    #[test]
    fn test_empty_quiz_never_enters_quiz_stage() {
        let session = apply(&AssessmentSession::new(0, Timings::default()), Event::Start);
        let err = session.apply(Event::SubmitName("Lee".into())).unwrap_err();
        assert_eq!(err, SessionError::NoQuestions);
        assert_eq!(session.stage(), Stage::NameCapture);
    }

    #[test]
    fn test_previous_at_zero_is_noop() {
        let session = in_quiz(3);
        let after = apply(&session, Event::Previous);
        assert_eq!(after.cursor(), 0);
        assert_eq!(after.stage(), Stage::Quiz);
    }

    #[test]
    fn test_next_before_answer_is_noop() {
        let session = in_quiz(3);
        let transition = session.apply(Event::Next).unwrap();
        assert_eq!(transition.session, session);
        assert!(transition.effects.is_empty());
    }

    #[test]
    fn test_select_schedules_auto_advance() {
        let session = in_quiz(3);
        let transition = session.apply(Event::Select(Owl)).unwrap();

        assert_eq!(transition.session.current_answer(), Some(Owl));
        assert_eq!(transition.session.cursor(), 0);
        assert_eq!(
            transition.effects,
            vec![Effect::Schedule {
                kind: TimerKind::AutoAdvance,
                after: DEFAULT_AUTO_ADVANCE,
                event: Event::AutoAdvance { from: 0 },
            }]
        );

        let advanced = apply(&transition.session, Event::AutoAdvance { from: 0 });
        assert_eq!(advanced.cursor(), 1);
    }

    #[test]
    fn test_stale_auto_advance_is_ignored() {
        let session = in_quiz(3);
        let session = apply(&session, Event::Select(Owl));
        let session = apply(&session, Event::Next);
        assert_eq!(session.cursor(), 1);

        // Timer scheduled from question 0 fires late
        let after = apply(&session, Event::AutoAdvance { from: 0 });
        assert_eq!(after.cursor(), 1);
    }

    #[test]
    fn test_last_question_does_not_auto_advance() {
        let session = in_quiz(1);
        let transition = session.apply(Event::Select(Dolphin)).unwrap();
        assert!(transition.effects.is_empty());
        assert_eq!(transition.session.stage(), Stage::Quiz);
    }

    #[test]
    fn test_submit_scores_and_schedules_reveal() {
        let mut session = in_quiz(2);
        session = apply(&session, Event::Select(Elephant));
        session = apply(&session, Event::Next);
        session = apply(&session, Event::Select(Elephant));

        let transition = session.apply(Event::Next).unwrap();
        let scored = transition.session;
        assert_eq!(scored.stage(), Stage::Scoring);
        assert_eq!(scored.result().map(|r| r.primary), Some(Elephant));
        assert!(transition.effects.contains(&Effect::Schedule {
            kind: TimerKind::RevealResult,
            after: DEFAULT_ANALYSIS_DELAY,
            event: Event::RevealResult,
        }));

        let revealed = scored.apply(Event::RevealResult).unwrap();
        assert_eq!(revealed.session.stage(), Stage::Result);
        assert_eq!(revealed.effects, vec![Effect::ResetView]);
    }

    #[test]
    fn test_events_outside_their_stage_are_rejected() {
        let session = AssessmentSession::new(2, Timings::default());
        assert_eq!(
            session.apply(Event::Next).unwrap_err(),
            SessionError::InvalidEvent {
                event: "next",
                stage: Stage::Intro
            }
        );
        assert!(session.apply(Event::Reset).is_err());
        assert!(session.apply(Event::SubmitCommitment("Practice".into())).is_err());
    }

    #[test]
    fn test_commitment_gate() {
        let mut session = in_quiz(1);
        session = apply(&session, Event::Select(Owl));
        session = apply(&session, Event::Next);
        session = apply(&session, Event::RevealResult);

        let err = session.apply(Event::SubmitCommitment("abcd".into())).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Validation(ValidationError::CommitmentTooShort { .. })
        ));
        assert!(!session.declaration_visible());

        let session = apply(&session, Event::SubmitCommitment(" abcde ".into()));
        assert!(session.declaration_visible());
        assert_eq!(session.commitment(), "abcde");

        let session = apply(&session, Event::EditCommitment);
        assert!(!session.declaration_visible());
        assert_eq!(session.commitment(), "abcde");
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = in_quiz(2);
        session = apply(&session, Event::Select(Owl));
        session = apply(&session, Event::Next);
        session = apply(&session, Event::Select(Cheetah));
        session = apply(&session, Event::Next);
        session = apply(&session, Event::RevealResult);
        session = apply(&session, Event::SubmitCommitment("Practice daily".into()));

        let transition = session.apply(Event::Reset).unwrap();
        let reset = transition.session;
        assert_eq!(transition.effects, vec![Effect::CancelAll]);
        assert_eq!(reset.stage(), Stage::Intro);
        assert_eq!(reset.answers().len(), 2);
        assert_eq!(reset.answers().answered_count(), 0);
        assert!(reset.result().is_none());
        assert!(reset.display_name().is_empty());
        assert!(reset.commitment().is_empty());
        assert!(!reset.declaration_visible());
        assert_eq!(reset, AssessmentSession::new(2, Timings::default()));
    }
}
