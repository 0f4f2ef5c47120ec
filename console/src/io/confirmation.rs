//! # Confirmation Prompt
//!
//! Synchronous yes/no questions asked before discarding unsaved work.

use log::warn;
use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub trait Confirmer: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

/// Always gives the same answer and counts how often it was asked
#[derive(Debug)]
pub struct StaticConfirmer {
    answer: bool,
    asked: AtomicUsize,
    last_message: Mutex<Option<String>>,
}

impl StaticConfirmer {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            asked: AtomicUsize::new(0),
            last_message: Mutex::new(None),
        }
    }

    pub fn accepting() -> Self {
        Self::new(true)
    }

    pub fn declining() -> Self {
        Self::new(false)
    }

    pub fn times_asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }

    pub fn last_message(&self) -> Option<String> {
        self.last_message.lock().ok().and_then(|m| m.clone())
    }
}

impl Confirmer for StaticConfirmer {
    fn confirm(&self, message: &str) -> bool {
        self.asked.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_message.lock() {
            *last = Some(message.to_string());
        }
        self.answer
    }
}

/// Asks on stdout and reads a `y`/`yes` answer from stdin; anything else,
/// including a read failure, declines
#[derive(Debug, Default, Clone)]
pub struct StdinConfirmer;

impl StdinConfirmer {
    pub fn new() -> Self {
        Self
    }
}

impl Confirmer for StdinConfirmer {
    fn confirm(&self, message: &str) -> bool {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        ask(message, &mut stdin.lock(), &mut stdout)
    }
}

fn ask(message: &str, input: &mut impl BufRead, output: &mut impl Write) -> bool {
    if write!(output, "{message} [y/N] ").and_then(|_| output.flush()).is_err() {
        warn!("Could not write confirmation prompt");
        return false;
    }
    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(e) => {
            warn!("Could not read confirmation answer: {}", e);
            false
        }
    }
}
