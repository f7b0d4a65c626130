use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use crossterm::style::{Color, Stylize};

/// A single reply from the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Empty input: the schema default stays as-is.
    Keep,
    /// A non-empty replacement value for this key only.
    Value(String),
    /// End of input or an explicit interrupt; collection stops and
    /// nothing reaches disk.
    Abort,
}

/// Synchronous request/response seam for override collection, so the
/// collector can run against a scripted implementation in tests.
pub trait Prompter {
    fn begin_section(&mut self, name: &str) -> Result<()>;
    fn prompt(&mut self, key: &str, default: &str) -> Result<Reply>;
}

/// Prompts on stdout and reads replies line by line from stdin.
pub struct TerminalPrompter {
    color: bool,
    started: bool,
}

impl TerminalPrompter {
    pub fn new(color: bool) -> Self {
        Self {
            color,
            started: false,
        }
    }

    fn paint(&self, text: String, color: Color) -> String {
        if self.color {
            text.with(color).bold().to_string()
        } else {
            text
        }
    }
}

fn section_color(name: &str) -> Color {
    match name {
        "Unit" => Color::Yellow,
        "Service" => Color::Blue,
        "Install" => Color::Magenta,
        _ => Color::Cyan,
    }
}

impl Prompter for TerminalPrompter {
    fn begin_section(&mut self, name: &str) -> Result<()> {
        let mut stdout = io::stdout();
        if self.started {
            writeln!(stdout).context("failed to write section banner")?;
        }
        self.started = true;
        let banner = self.paint(
            format!("[{name}] section configuration:"),
            section_color(name),
        );
        writeln!(stdout, "{banner}").context("failed to write section banner")?;
        Ok(())
    }

    fn prompt(&mut self, key: &str, default: &str) -> Result<Reply> {
        let label = self.paint(key.to_string(), Color::Green);
        let mut stdout = io::stdout();
        write!(stdout, "{label} [{default}] = ").context("failed to write prompt")?;
        stdout.flush().context("failed to flush prompt")?;

        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .context("failed to read reply")?;
        if read == 0 {
            return Ok(Reply::Abort);
        }
        let value = line.trim();
        if value.is_empty() {
            Ok(Reply::Keep)
        } else {
            Ok(Reply::Value(value.to_string()))
        }
    }
}

/// Replays a fixed list of replies instead of reading a terminal, and
/// records which keys were presented. Running out of replies behaves
/// like the operator closing stdin.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    replies: VecDeque<String>,
    /// Keys presented so far, in prompt order.
    pub presented: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: replies.into_iter().map(Into::into).collect(),
            presented: Vec::new(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn begin_section(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }

    fn prompt(&mut self, key: &str, _default: &str) -> Result<Reply> {
        self.presented.push(key.to_string());
        match self.replies.pop_front() {
            None => Ok(Reply::Abort),
            Some(reply) if reply.is_empty() => Ok(Reply::Keep),
            Some(reply) => Ok(Reply::Value(reply)),
        }
    }
}
