//! Yes/no confirmation prompts.
use std::io::{self, BufRead, Write};

/// Question asked before a destructive or out-of-tree step.
pub const CONTINUE_QUESTION: &str = "Do you want to continue? [Y/n]";

/// Asks the user to confirm an action.
pub trait Confirm {
    /// Show `message`, ask [`CONTINUE_QUESTION`] and return whether the
    /// answer was affirmative.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be written or the answer read.
    fn confirm(&mut self, message: &str) -> io::Result<bool>;
}

/// [`Confirm`] over any reader and writer, e.g. stdin and stderr, or a byte
/// buffer in tests.
#[derive(Debug)]
pub struct ReaderPrompt<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> ReaderPrompt<R, W> {
    /// Prompt reading answers from `reader` and writing questions to `writer`.
    pub const fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Give back the writer, e.g. to inspect what was asked.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

/// Prompt on the process's stdin, asking on stderr.
#[must_use]
pub fn stdio() -> ReaderPrompt<io::StdinLock<'static>, io::Stderr> {
    ReaderPrompt::new(io::stdin().lock(), io::stderr())
}

impl<R: BufRead, W: Write> Confirm for ReaderPrompt<R, W> {
    fn confirm(&mut self, message: &str) -> io::Result<bool> {
        if !message.is_empty() {
            writeln!(self.writer, "{message}")?;
        }
        write!(self.writer, "{CONTINUE_QUESTION} ")?;
        self.writer.flush()?;

        let mut answer = String::new();
        if self.reader.read_line(&mut answer)? == 0 {
            writeln!(self.writer)?;
            return Ok(false);
        }
        Ok(is_affirmative(&answer))
    }
}

/// Empty input, `y` and `yes` (any case) are affirmative.
fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "" | "y" | "yes")
}
