//! Line-oriented terminal I/O.
//!
//! [`Console`] is generic over its reader and writer so menus can be driven
//! from a `Cursor` in tests and from locked stdin/stdout in the binary.

use std::fmt::Display;
use std::io::{self, BufRead, Write};

/// How many times a prompt accepts invalid input before giving up.
pub const MAX_PROMPT_ATTEMPTS: usize = 3;

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Writes one line.
    pub fn say(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "{text}")
    }

    /// Writes a block of text as-is.
    pub fn print(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes())?;
        self.output.flush()
    }

    /// Prints `label` and reads one line without its line terminator.
    ///
    /// Returns `None` at end of input.
    pub fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        self.print(label)?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    /// Reads a single-letter menu choice, lowercased.
    ///
    /// Blank lines prompt again; `None` means end of input.
    pub fn choice(&mut self, label: &str) -> io::Result<Option<char>> {
        loop {
            let Some(line) = self.prompt(label)? else {
                return Ok(None);
            };
            if let Some(key) = line.trim().chars().next() {
                return Ok(Some(key.to_ascii_lowercase()));
            }
        }
    }

    /// Prompts until `parse` accepts the answer.
    ///
    /// Each rejection is reported. After [`MAX_PROMPT_ATTEMPTS`] rejections,
    /// or at end of input, returns `None`.
    pub fn ask<T, E, F>(&mut self, label: &str, parse: F) -> io::Result<Option<T>>
    where
        E: Display,
        F: Fn(&str) -> Result<T, E>,
    {
        for _ in 0..MAX_PROMPT_ATTEMPTS {
            let Some(line) = self.prompt(label)? else {
                return Ok(None);
            };
            match parse(line.trim()) {
                Ok(value) => return Ok(Some(value)),
                Err(err) => self.say(format!("Sorry, {err}. Please try again."))?,
            }
        }
        self.say("Too many invalid answers.")?;
        Ok(None)
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_prompt_strips_line_endings() {
        let mut c = console("ada\r\nbob");
        assert_eq!(c.prompt("> ").unwrap().as_deref(), Some("ada"));
        assert_eq!(c.prompt("> ").unwrap().as_deref(), Some("bob"));
        assert_eq!(c.prompt("> ").unwrap(), None);
        assert_eq!(String::from_utf8(c.into_output()).unwrap(), "> > > ");
    }

    #[test]
    fn test_choice_skips_blank_lines() {
        let mut c = console("\n   \nB\n");
        assert_eq!(c.choice("? ").unwrap(), Some('b'));
        assert_eq!(c.choice("? ").unwrap(), None);
    }

    #[test]
    fn test_ask_retries_then_gives_up() {
        let mut c = console("x\ny\nz\n4\n");
        let parsed = c.ask("n: ", |raw| raw.parse::<i64>()).unwrap();
        assert_eq!(parsed, None);
        let out = String::from_utf8(c.into_output()).unwrap();
        assert_eq!(out.matches("Please try again.").count(), 3);
        assert!(out.contains("Too many invalid answers."));
    }

    #[test]
    fn test_ask_accepts_after_retry() {
        let mut c = console("abc\n 42 \n");
        assert_eq!(c.ask("n: ", |raw| raw.parse::<i64>()).unwrap(), Some(42));
    }
}
