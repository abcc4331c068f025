//! Interactive confirmation prompts.
//!
//! The coordinator asks one question per deletion candidate through the
//! [`Prompt`] trait. [`StdinPrompt`] talks to the terminal; [`ScriptedPrompt`]
//! replays canned answers.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Source of user answers.
pub trait Prompt {
    /// Show `text` and return the user's raw answer (line terminator removed).
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt could not be written or the answer
    /// could not be read.
    fn ask(&mut self, text: &str) -> io::Result<String>;
}

impl<P: Prompt + ?Sized> Prompt for &mut P {
    fn ask(&mut self, text: &str) -> io::Result<String> {
        (**self).ask(text)
    }
}

/// Prompt on stdout, answer from stdin.
///
/// End of input yields an empty answer, which the coordinator treats as an
/// invalid choice.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl StdinPrompt {
    /// Create a new stdin prompt.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Prompt for StdinPrompt {
    fn ask(&mut self, text: &str) -> io::Result<String> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()?;
        drop(stdout);

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Prompt that replays a fixed list of answers.
///
/// Once the script is exhausted every further question is answered with an
/// empty string.
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompt {
    /// Create a prompt answering with `answers` in order.
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Questions asked so far, in order.
    #[must_use]
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    /// Answers not consumed yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&mut self, text: &str) -> io::Result<String> {
        self.asked.push(text.to_string());
        Ok(self.answers.pop_front().unwrap_or_default())
    }
}
