//! Heuristic command-boundary detection for interactive recording.
//!
//! There is no reliable signal from a shell about when one command ends and
//! the next begins short of instrumenting `PS1` the way a persistent session
//! would (see the `exec`/marker approach in shell-session style tooling) --
//! but rewindtty's interactive mode records a real, unmodified shell, so it
//! falls back to watching for a prompt. A [`Segmenter`] is deliberately a
//! narrow interface (`observe_output` / `observe_input`) so a future,
//! smarter implementation (OSC 133 shell integration, for example) can drop
//! in without touching the recorder.

const PROMPT_MARKERS: [&str; 4] = ["$ ", "# ", "% ", "> "];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// No prompt has been seen yet (or the previous command's output is
    /// still arriving); no session is open.
    WaitingForPrompt,
    /// A prompt was just seen; no session is open yet, waiting for the
    /// user's first keystroke.
    WaitingForInput,
    /// A session is open and the user is still typing the command line.
    InCommand,
    /// The command line was submitted (`\r`/`\n` seen); the session stays
    /// open, absorbing output, until the next prompt appears.
    AwaitingClose,
}

/// Detects command boundaries in an interactive shell's byte streams by
/// watching for a trailing-space prompt in output and input submission.
#[derive(Debug)]
pub struct Segmenter {
    state: State,
    input_buffer: Vec<u8>,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Segmenter {
    pub fn new() -> Self {
        Self {
            state: State::WaitingForPrompt,
            input_buffer: Vec::new(),
        }
    }

    /// Feed PTY output bytes. Returns `true` exactly when a prompt was just
    /// recognized and a previously-open command session should be closed.
    pub fn observe_output(&mut self, bytes: &[u8]) -> bool {
        let scanning_for_prompt = matches!(self.state, State::WaitingForPrompt | State::AwaitingClose);
        if !scanning_for_prompt || !contains_prompt(bytes) {
            return false;
        }

        let should_close = self.state == State::AwaitingClose;
        self.state = State::WaitingForInput;
        should_close
    }

    /// Feed keystrokes. Returns `true` exactly when the first keystroke
    /// after a prompt opens a new command session; call [`Segmenter::command`]
    /// immediately after to get its initial (and, at submission time, final)
    /// text.
    pub fn observe_input(&mut self, bytes: &[u8]) -> bool {
        let mut opened = false;
        for &b in bytes {
            match self.state {
                State::WaitingForInput => {
                    self.input_buffer.clear();
                    self.input_buffer.push(b);
                    self.state = State::InCommand;
                    opened = true;
                    if b == b'\r' || b == b'\n' {
                        self.state = State::AwaitingClose;
                    }
                }
                State::InCommand => {
                    self.input_buffer.push(b);
                    if b == b'\r' || b == b'\n' {
                        self.state = State::AwaitingClose;
                    }
                }
                State::WaitingForPrompt | State::AwaitingClose => {
                    // Typed ahead of a prompt; the heuristic has nowhere
                    // sound to attribute these keystrokes, so they're
                    // dropped. This is the documented imprecision of a
                    // prompt-detection segmenter.
                }
            }
        }
        opened
    }

    /// The cleaned command text accumulated so far: printable ASCII only,
    /// trailing whitespace trimmed.
    #[must_use]
    pub fn command(&self) -> String {
        let printable: String = self
            .input_buffer
            .iter()
            .filter(|&&b| (0x20..=0x7e).contains(&b))
            .map(|&b| b as char)
            .collect();
        printable.trim_end().to_string()
    }

    /// True if a command session is currently open (submitted or not).
    #[must_use]
    pub fn has_open_command(&self) -> bool {
        matches!(self.state, State::InCommand | State::AwaitingClose)
    }
}

fn contains_prompt(bytes: &[u8]) -> bool {
    let Ok(text) = std::str::from_utf8(bytes) else {
        return false;
    };
    PROMPT_MARKERS.iter().any(|marker| text.contains(marker))
}
