//! Yes/no confirmation.
//!
//! `check` and `cleanup` ask before changing anything unless `--force` is
//! given. The question is asked through [`Confirm`] so batch logic can be
//! driven by a closure in tests instead of a terminal.

use std::io::{self, BufRead, Write};

pub trait Confirm {
    /// Ask `question`; `true` means go ahead.
    fn confirm(&mut self, question: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, question: &str) -> bool {
        self(question)
    }
}

/// Asks on stdout and reads one line from stdin. Only `y`/`yes` accept.
#[derive(Debug, Default)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&mut self, question: &str) -> bool {
        let mut stdout = io::stdout().lock();
        if write!(stdout, "{question} (y/N) ").and_then(|_| stdout.flush()).is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(_) => false,
        }
    }
}

/// Accepts everything; used for `--force`.
#[derive(Debug, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _question: &str) -> bool {
        true
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
