use super::*;
use super::tokenizer::{Separators, Tokenizer};
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub separators: Separators,
    pub history_size: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            separators: Separators::default(),
            history_size: DEFAULT_HISTORY_SIZE,
        }
    }
}

/// A line of input, classified before anything reaches the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Empty,
    Environment,
    History,
    Quit,
    Evaluate(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Command<'a> {
        match line.trim() {
            "" => Command::Empty,
            "env" => Command::Environment,
            "history" => Command::History,
            "quit" | "exit" => Command::Quit,
            expr => Command::Evaluate(expr),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Nothing,
    Value(f64),
    Environment(String),
    History(Vec<String>),
    Quit,
}

/// The most recent successfully evaluated lines, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: VecDeque<String>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> History {
        History {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Records `line` unless it repeats the latest entry. Returns whether it
    /// was recorded.
    pub fn push(&mut self, line: &str) -> bool {
        if self.entries.back().map(String::as_str) == Some(line) {
            return false;
        }
        self.entries.push_back(line.to_string());
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'_ str> + '_ {
        self.entries.iter().map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    env: Environment,
    history: History,
    tokenizer: Tokenizer,
}

impl Session {
    pub fn new(config: Config) -> Session {
        Session {
            env: Environment::new(),
            history: History::new(config.history_size),
            tokenizer: Tokenizer::new(config.separators),
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn handle(&mut self, line: &str) -> Result<Reply, Error> {
        Ok(match Command::parse(line) {
            Command::Empty => Reply::Nothing,
            Command::Environment => Reply::Environment(format!("{}", self.env)),
            Command::History => Reply::History(self.history.iter().map(String::from).collect()),
            Command::Quit => Reply::Quit,
            Command::Evaluate(expr) => Reply::Value(self.evaluate(expr)?),
        })
    }

    fn evaluate(&mut self, line: &str) -> Result<f64, Error> {
        let tokens = self.tokenizer.tokenize(line);
        let expr = parser::parse(&tokens)?;
        let value = interpreter::evaluate(&expr, &mut self.env)?;
        self.history.push(line);
        Ok(value)
    }
}

impl Default for Session {
    fn default() -> Session {
        Session::new(Config::default())
    }
}
