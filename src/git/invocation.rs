//! Structured external command invocations

use regex::{NoExpand, Regex};
use std::cmp::Reverse;
use std::fmt;

/// Text shown instead of a credential
pub const SECRET_PLACEHOLDER: &str = "<secret password>";

/// One external command: program, argument vector and extra environment
///
/// Values registered with [`Invocation::secret`] are replaced by
/// [`SECRET_PLACEHOLDER`] whenever the invocation is formatted, so the
/// `Display` and `Debug` renderings are safe to log.
#[derive(Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
    secrets: Vec<String>,
    best_effort: bool,
}

impl Invocation {
    /// Invocation of `program` with no arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            secrets: Vec::new(),
            best_effort: false,
        }
    }

    /// `git` with the given arguments
    pub fn git<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new("git").args(args)
    }

    /// Append one argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append arguments
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for this command only
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Register a value that must never appear when formatted
    #[must_use]
    pub fn secret(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() && !self.secrets.contains(&value) {
            self.secrets.push(value);
        }
        self
    }

    /// Mark as best-effort: a non-zero exit never fails the step
    #[must_use]
    pub fn best_effort(mut self) -> Self {
        self.best_effort = true;
        self
    }

    /// Program to execute
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Real arguments, secrets included. Never log these.
    pub fn raw_args(&self) -> &[String] {
        &self.args
    }

    /// Extra environment
    pub fn envs(&self) -> &[(String, String)] {
        &self.env
    }

    /// Whether failure is ignored
    pub const fn is_best_effort(&self) -> bool {
        self.best_effort
    }

    /// Replace every registered secret in `text` with the placeholder
    ///
    /// One left-to-right pass, longest secret first, so text inserted for one
    /// secret is never matched by another. Placeholders already in `text` are
    /// kept intact, which makes redacting twice the same as redacting once.
    pub fn redact(&self, text: &str) -> String {
        if self.secrets.is_empty() {
            return text.to_string();
        }

        let mut needles: Vec<&str> = self
            .secrets
            .iter()
            .map(String::as_str)
            .chain([SECRET_PLACEHOLDER])
            .collect();
        needles.sort_by_key(|s| Reverse(s.len()));
        let pattern = needles
            .iter()
            .map(|s| regex::escape(s))
            .collect::<Vec<_>>()
            .join("|");

        // Failing closed: a pattern that cannot be built hides everything
        Regex::new(&pattern).map_or_else(
            |_| SECRET_PLACEHOLDER.to_string(),
            |re| re.replace_all(text, NoExpand(SECRET_PLACEHOLDER)).into_owned(),
        )
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut line = String::new();
        for (key, value) in &self.env {
            line.push_str(key);
            line.push('=');
            line.push_str(value);
            line.push(' ');
        }
        line.push_str(&self.program);
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        f.write_str(&self.redact(&line))
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("command", &self.to_string())
            .field("best_effort", &self.best_effort)
            .finish()
    }
}
