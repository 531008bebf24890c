//! Couples a session with its timeline
//!
//! The driver applies events, performs the timer effects itself and hands
//! every other effect back to the caller.

use super::{AssessmentSession, Effect, Event, SessionError, Timeline};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SessionDriver {
    session: AssessmentSession,
    timeline: Timeline,
}

impl SessionDriver {
    pub fn new(session: AssessmentSession) -> Self {
        Self {
            session,
            timeline: Timeline::new(),
        }
    }

    pub fn session(&self) -> &AssessmentSession {
        &self.session
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Apply one event. On error the session is unchanged.
    ///
    /// Returns the effects the driver does not handle itself (view resets).
    pub fn dispatch(&mut self, event: Event) -> Result<Vec<Effect>, SessionError> {
        let transition = self.session.apply(event)?;
        self.session = transition.session;

        let mut outward = Vec::new();
        for effect in transition.effects {
            match effect {
                Effect::Schedule { kind, after, event } => {
                    self.timeline.schedule(kind, after, event)
                }
                Effect::Cancel(kind) => {
                    self.timeline.cancel(kind);
                }
                Effect::CancelAll => self.timeline.cancel_all(),
                Effect::ResetView => outward.push(Effect::ResetView),
            }
        }
        Ok(outward)
    }

    /// Let time pass, dispatching every timer that comes due
    pub fn advance(&mut self, elapsed: Duration) -> Result<Vec<Effect>, SessionError> {
        let mut outward = Vec::new();
        for event in self.timeline.advance(elapsed) {
            outward.extend(self.dispatch(event)?);
        }
        Ok(outward)
    }

    /// Fire pending timers until none are left
    pub fn settle(&mut self) -> Result<Vec<Effect>, SessionError> {
        let mut outward = Vec::new();
        while let Some(wait) = self.timeline.next_due_in() {
            outward.extend(self.advance(wait)?);
        }
        Ok(outward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BrainType::*;
    use crate::session::{Stage, TimerKind, Timings, DEFAULT_ANALYSIS_DELAY};

    fn quiz_driver(questions: usize) -> SessionDriver {
        let mut driver = SessionDriver::new(AssessmentSession::new(questions, Timings::default()));
        driver.dispatch(Event::Start).unwrap();
        driver.dispatch(Event::SubmitName("Lee".into())).unwrap();
        driver
    }

    #[test]
    fn test_auto_advance_waits_for_delay() {
        let mut driver = quiz_driver(3);
        driver.dispatch(Event::Select(Owl)).unwrap();

        driver.advance(Duration::from_millis(299)).unwrap();
        assert_eq!(driver.session().cursor(), 0);

        driver.advance(Duration::from_millis(1)).unwrap();
        assert_eq!(driver.session().cursor(), 1);
    }

    #[test]
    fn test_previous_cancels_pending_auto_advance() {
        let mut driver = quiz_driver(3);
        driver.dispatch(Event::Select(Owl)).unwrap();
        driver.advance(Duration::from_millis(300)).unwrap();
        driver.dispatch(Event::Select(Dolphin)).unwrap();
        assert!(driver.timeline().is_pending(TimerKind::AutoAdvance));

        driver.dispatch(Event::Previous).unwrap();
        assert!(!driver.timeline().is_pending(TimerKind::AutoAdvance));

        driver.advance(Duration::from_secs(1)).unwrap();
        assert_eq!(driver.session().cursor(), 0);
    }

    #[test]
    fn test_reveal_after_analysis_delay() {
        let mut driver = quiz_driver(1);
        driver.dispatch(Event::Select(Elephant)).unwrap();
        driver.dispatch(Event::Next).unwrap();
        assert_eq!(driver.session().stage(), Stage::Scoring);

        let effects = driver
            .advance(DEFAULT_ANALYSIS_DELAY - Duration::from_millis(1))
            .unwrap();
        assert!(effects.is_empty());
        assert_eq!(driver.session().stage(), Stage::Scoring);

        let effects = driver.advance(Duration::from_millis(1)).unwrap();
        assert_eq!(effects, vec![Effect::ResetView]);
        assert_eq!(driver.session().stage(), Stage::Result);
    }

    #[test]
    fn test_rejected_event_keeps_session() {
        let mut driver = quiz_driver(2);
        let before = driver.session().clone();
        assert!(driver.dispatch(Event::Reset).is_err());
        assert_eq!(driver.session(), &before);
    }

    #[test]
    fn test_settle_runs_immediate_timers() {
        let mut driver = SessionDriver::new(AssessmentSession::new(2, Timings::immediate()));
        driver.dispatch(Event::Start).unwrap();
        driver.dispatch(Event::SubmitName("Lee".into())).unwrap();
        driver.dispatch(Event::Select(Cheetah)).unwrap();
        driver.settle().unwrap();
        assert_eq!(driver.session().cursor(), 1);

        driver.dispatch(Event::Select(Owl)).unwrap();
        driver.dispatch(Event::Next).unwrap();
        let effects = driver.settle().unwrap();
        assert_eq!(effects, vec![Effect::ResetView]);
        assert_eq!(driver.session().stage(), Stage::Result);
    }
}
