//! Console prompts
//!
//! Every question re-asks until it gets a usable answer. End of input is
//! the only way out and surfaces as `UnexpectedEof`.

use colored::Colorize;
use std::fmt::Display;
use std::io::{self, BufRead, IsTerminal, StdinLock, Stdout, Write};

pub struct Prompt<R, W> {
    input: R,
    output: W,
    /// Read secrets from the terminal without echo
    hide_secrets: bool,
}

impl Prompt<StdinLock<'static>, Stdout> {
    /// Prompt on the process console
    pub fn console() -> Self {
        let stdin = io::stdin();
        Self {
            hide_secrets: stdin.is_terminal(),
            input: stdin.lock(),
            output: io::stdout(),
        }
    }
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            hide_secrets: false,
        }
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.output
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    /// Print `label` and read one trimmed line
    pub fn ask(&mut self, label: &str) -> io::Result<String> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "end of input"));
        }
        Ok(line.trim().to_string())
    }

    /// Like [`ask`](Self::ask), without echo when attached to a terminal
    pub fn secret(&mut self, label: &str) -> io::Result<String> {
        if !self.hide_secrets {
            return self.ask(label);
        }
        self.output.flush()?;
        rpassword::prompt_password(label)
    }

    /// Numbered menu; returns the 0-based index of the picked item
    pub fn choose<T: Display>(&mut self, title: &str, items: &[T]) -> io::Result<usize> {
        writeln!(self.output, "\n=== {} ===", title)?;
        for (idx, item) in items.iter().enumerate() {
            writeln!(self.output, "{}. {}", idx + 1, item)?;
        }
        self.number("Number: ", items.len()).map(|n| n - 1)
    }

    /// Integer in `1..=max`
    pub fn number(&mut self, label: &str, max: usize) -> io::Result<usize> {
        loop {
            let answer = self.ask(label)?;
            match answer.parse::<usize>() {
                Ok(n) if (1..=max).contains(&n) => return Ok(n),
                _ => self.invalid(&format!("Invalid choice. Enter a number from 1 to {}.", max))?,
            }
        }
    }

    /// Yes/no question; accepts English and French answers
    pub fn confirm(&mut self, label: &str) -> io::Result<bool> {
        loop {
            let answer = self.ask(label)?.to_lowercase();
            match answer.as_str() {
                "y" | "yes" | "o" | "oui" => return Ok(true),
                "n" | "no" | "non" => return Ok(false),
                _ => self.invalid("Answer yes or no.")?,
            }
        }
    }

    pub fn invalid(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{} {}", "❌".red(), message.red())
    }
}
