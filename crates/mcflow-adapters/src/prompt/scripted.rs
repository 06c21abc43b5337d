//! Prompt that replays a fixed list of answers.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use mcflow_core::{
    application::{ApplicationError, ports::Prompt},
    error::McflowResult,
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    /// Index into the options of a `select`.
    Pick(usize),
    /// Take whatever default the question offers.
    Default,
}

/// Scripted answers for tests and piped input.
///
/// Each question consumes one answer. Running out of answers is a
/// `PromptFailed` error, so a test notices unexpected questions.
/// Clones share the queue and the transcript.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompt {
    answers: Arc<Mutex<VecDeque<Answer>>>,
    asked: Arc<Mutex<Vec<String>>>,
}

impl ScriptedPrompt {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: Arc::new(Mutex::new(answers.into_iter().collect())),
            asked: Arc::default(),
        }
    }

    /// Questions asked so far, in order.
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().map(|q| q.clone()).unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.answers.lock().map(|a| a.len()).unwrap_or(0)
    }

    fn next(&self, message: &str) -> McflowResult<Answer> {
        self.asked
            .lock()
            .map_err(|_| ApplicationError::LockPoisoned)?
            .push(message.to_string());
        let answer = self
            .answers
            .lock()
            .map_err(|_| ApplicationError::LockPoisoned)?
            .pop_front()
            .ok_or_else(|| ApplicationError::PromptFailed {
                reason: format!("no scripted answer for: {message}"),
            })?;
        debug!(question = message, ?answer, "Scripted answer");
        Ok(answer)
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&self, message: &str, default: bool) -> McflowResult<bool> {
        Ok(match self.next(message)? {
            Answer::Yes => true,
            Answer::No => false,
            Answer::Default => default,
            Answer::Pick(i) => i == 0,
        })
    }

    fn select(&self, message: &str, options: &[String], default: usize) -> McflowResult<usize> {
        let picked = match self.next(message)? {
            Answer::Pick(i) => i,
            Answer::Yes | Answer::Default => default,
            Answer::No => options.len().saturating_sub(1),
        };
        if picked >= options.len() {
            return Err(ApplicationError::PromptFailed {
                reason: format!("choice {picked} out of range for: {message}"),
            }
            .into());
        }
        Ok(picked)
    }
}
