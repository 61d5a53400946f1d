use std::collections::VecDeque;
use std::io::{self, stdin, BufWriter, IsTerminal, Read, Stdout, Write};

use console::Term;
use log::warn;

/// Character I/O available to the machine, only ever reached through traps.
///
/// None of these operations fail observably. A transport which cannot perform one either ignores
/// the failure or aborts the host process.
pub trait Console {
    /// Block until one character is available.
    fn input_char(&mut self) -> u8;
    /// Does not flush.
    fn output_char(&mut self, ch: u8);
    /// Does not flush.
    fn output_chars(&mut self, text: &str);
    /// Diagnostic stream, separate from program output.
    fn error_output_chars(&mut self, text: &str);
    fn flush(&mut self);
}

/// Console attached to the process's standard streams.
pub struct Terminal {
    out: BufWriter<Stdout>,
    /// Present if keys can be read unbuffered from an interactive terminal.
    term: Option<Term>,
}

/// Terminal stream able to read single keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum KeyStream {
    Stdout,
    Stderr,
}

/// Keys are only read from a terminal when stdin is one, and the stream used to read them must be
/// attached to a terminal too. Otherwise stdin is read byte by byte.
fn key_stream(stdin_tty: bool, stdout_tty: bool, stderr_tty: bool) -> Option<KeyStream> {
    match (stdin_tty, stdout_tty, stderr_tty) {
        (false, _, _) => None,
        (true, true, _) => Some(KeyStream::Stdout),
        (true, false, true) => Some(KeyStream::Stderr),
        (true, false, false) => None,
    }
}

/// Characters outside of a single byte read as NUL.
fn char_to_byte(ch: char) -> u8 {
    u8::try_from(ch).unwrap_or(0)
}

impl Terminal {
    pub fn new() -> Self {
        let (stdout, stderr) = (Term::stdout(), Term::stderr());
        let term = match key_stream(stdin().is_terminal(), stdout.is_term(), stderr.is_term()) {
            Some(KeyStream::Stdout) => Some(stdout),
            Some(KeyStream::Stderr) => Some(stderr),
            None => None,
        };
        Self {
            out: BufWriter::new(io::stdout()),
            term,
        }
    }

    fn read_byte() -> u8 {
        let mut buf = [0; 1];
        match stdin().read_exact(&mut buf) {
            Ok(()) => buf[0],
            // Closed input reads as NUL rather than blocking forever
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => 0,
            Err(err) => {
                warn!("Failed to read from stdin: {err}");
                0
            }
        }
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for Terminal {
    // Read one byte from stdin or unbuffered terminal
    fn input_char(&mut self) -> u8 {
        if let Some(term) = &self.term {
            match term.read_char() {
                Ok(ch) => return char_to_byte(ch),
                Err(err) => warn!("Failed to read key, reading stdin instead: {err}"),
            }
            self.term = None;
        }
        Self::read_byte()
    }

    fn output_char(&mut self, ch: u8) {
        self.out
            .write_all(&[ch])
            .expect("write to stdout should not fail");
    }

    fn output_chars(&mut self, text: &str) {
        self.out
            .write_all(text.as_bytes())
            .expect("write to stdout should not fail");
    }

    fn error_output_chars(&mut self, text: &str) {
        // Keep program output ordered before the diagnostic
        self.flush();
        eprint!("{text}");
    }

    fn flush(&mut self) {
        self.out.flush().expect("flush of stdout should not fail");
    }
}

/// In-memory console with scripted input.
///
/// Input past the end of the script reads as NUL.
#[derive(Debug, Default)]
pub struct BufferConsole {
    input: VecDeque<u8>,
    output: Vec<u8>,
    /// Length of `output` at the most recent flush.
    flushed: usize,
    flush_count: usize,
    errors: String,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(input: impl AsRef<[u8]>) -> Self {
        Self {
            input: input.as_ref().iter().copied().collect(),
            ..Self::default()
        }
    }

    /// Everything written to the primary stream, flushed or not.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// The part of the primary stream which a flush has made visible.
    pub fn visible(&self) -> &[u8] {
        &self.output[..self.flushed]
    }

    pub fn flush_count(&self) -> usize {
        self.flush_count
    }

    pub fn errors(&self) -> &str {
        &self.errors
    }

    /// Characters of scripted input not yet consumed.
    pub fn remaining_input(&self) -> usize {
        self.input.len()
    }
}

impl Console for BufferConsole {
    fn input_char(&mut self) -> u8 {
        self.input.pop_front().unwrap_or(0)
    }

    fn output_char(&mut self, ch: u8) {
        self.output.push(ch);
    }

    fn output_chars(&mut self, text: &str) {
        self.output.extend_from_slice(text.as_bytes());
    }

    fn error_output_chars(&mut self, text: &str) {
        self.errors.push_str(text);
    }

    fn flush(&mut self) {
        self.flushed = self.output.len();
        self.flush_count += 1;
    }
}
