//! Shared setup for the quiz commands
//!
//! Loads the user config and the catalog once, and runs a complete session
//! from command-line answers without any timer delays.

use crate::catalog::Catalog;
use crate::config::UserConfig;
use crate::models::Declaration;
use crate::reporters::ResultReport;
use crate::session::{AssessmentSession, Event, SessionDriver, Stage, Timings};
use anyhow::{anyhow, bail, Context, Result};
use std::path::Path;
use tracing::debug;

pub(crate) struct QuizEnv {
    pub config: UserConfig,
    pub catalog: Catalog,
}

impl QuizEnv {
    /// `catalog_override` (from `--catalog`) wins over the configured catalog
    pub fn load(catalog_override: Option<&Path>) -> Result<Self> {
        let config = UserConfig::load()?;
        let catalog_path = catalog_override.or(config.catalog_path());
        let catalog = Catalog::load_or_builtin(catalog_path).with_context(|| match catalog_path {
            Some(p) => format!("Failed to load catalog {}", p.display()),
            None => "Failed to load built-in catalog".to_string(),
        })?;
        Ok(Self { config, catalog })
    }

    /// Start a session with the configured delays
    pub fn new_session(&self) -> AssessmentSession {
        AssessmentSession::new(self.catalog.len(), self.config.timings())
    }

    /// Answer every question in order and settle on the result
    pub fn diagnose(&self, name: &str, answers: &[String]) -> Result<SessionDriver> {
        if answers.len() != self.catalog.len() {
            bail!(
                "Expected {} answers, got {}. Run `braintype questions` to see them.",
                self.catalog.len(),
                answers.len()
            );
        }

        let mut driver = SessionDriver::new(AssessmentSession::new(
            self.catalog.len(),
            Timings::immediate(),
        ));
        driver.dispatch(Event::Start)?;
        driver.dispatch(Event::SubmitName(name.to_string()))?;

        let last = answers.len() - 1;
        for (index, token) in answers.iter().enumerate() {
            let option_count = self.catalog.question(index).map_or(0, |q| q.options.len());
            let brain_type = self.catalog.resolve_answer(index, token).ok_or_else(|| {
                anyhow!(
                    "Answer {} ('{}') is neither a brain type nor an option number 1-{}",
                    index + 1,
                    token.trim(),
                    option_count
                )
            })?;
            driver.dispatch(Event::Select(brain_type))?;
            if index == last {
                driver.dispatch(Event::Next)?;
            }
            driver.settle()?;
        }

        if driver.session().stage() != Stage::Result {
            bail!(
                "Quiz ended in the {} stage instead of showing a result",
                driver.session().stage()
            );
        }
        debug!("Diagnosed {} non-interactively", driver.session().display_name());
        Ok(driver)
    }

    /// Report for a session that reached the result stage
    pub fn report(&self, session: &AssessmentSession) -> Result<ResultReport> {
        let result = session
            .result()
            .ok_or_else(|| anyhow!("No result available yet"))?;
        let report = ResultReport::new(session.display_name(), result, &self.catalog);
        Ok(if session.declaration_visible() {
            report.with_commitment(session.commitment())
        } else {
            report
        })
    }

    /// Declaration for a session with a submitted commitment
    pub fn declaration(&self, session: &AssessmentSession) -> Result<Declaration> {
        let result = session
            .result()
            .ok_or_else(|| anyhow!("No result available yet"))?;
        let profile = self.catalog.profile(result.primary).clone();
        Ok(Declaration::new(
            session.display_name(),
            profile,
            session.commitment(),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BrainType;

    fn env() -> QuizEnv {
        QuizEnv {
            config: UserConfig::default(),
            catalog: Catalog::builtin().unwrap(),
        }
    }

    fn answers(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_diagnose_by_type_names() {
        let env = env();
        let mut tokens = vec!["owl"; 20];
        tokens[0] = "cheetah";
        let driver = env.diagnose("Lee", &answers(&tokens)).unwrap();
        let result = driver.session().result().unwrap();
        assert_eq!(result.primary, BrainType::Owl);
        assert_eq!(result.secondary, BrainType::Cheetah);
        assert_eq!(result.tally.total(), 20);
    }

    #[test]
    fn test_diagnose_by_option_numbers() {
        let env = env();
        // Option 1 of every builtin question
        let driver = env.diagnose("Lee", &answers(&["1"; 20])).unwrap();
        let expected: Vec<BrainType> = env
            .catalog
            .questions()
            .iter()
            .map(|q| q.options[0].brain_type)
            .collect();
        assert_eq!(
            driver.session().answers().slots(),
            expected.into_iter().map(Some).collect::<Vec<_>>().as_slice()
        );
    }

    #[test]
    fn test_diagnose_rejects_wrong_count() {
        let err = env().diagnose("Lee", &answers(&["owl"; 3])).unwrap_err();
        assert!(err.to_string().contains("Expected 20 answers, got 3"));
    }

    #[test]
    fn test_diagnose_rejects_unknown_answer() {
        let mut tokens = vec!["owl"; 20];
        tokens[4] = "tiger";
        let err = env().diagnose("Lee", &answers(&tokens)).unwrap_err();
        assert!(err.to_string().contains("Answer 5 ('tiger')"));
    }

    #[test]
    fn test_diagnose_rejects_blank_name() {
        assert!(env().diagnose("  ", &answers(&["owl"; 20])).is_err());
    }

    #[test]
    fn test_declaration_needs_commitment() {
        let env = env();
        let mut driver = env.diagnose("Lee", &answers(&["dolphin"; 20])).unwrap();
        assert!(env.declaration(driver.session()).is_err());

        driver
            .dispatch(Event::SubmitCommitment("Finish one idea a week".into()))
            .unwrap();
        let declaration = env.declaration(driver.session()).unwrap();
        assert_eq!(declaration.profile().brain_type, BrainType::Dolphin);

        let report = env.report(driver.session()).unwrap();
        assert_eq!(report.commitment.as_deref(), Some("Finish one idea a week"));
    }
}
