//! Allocates a PTY, execs a shell under it, and multiplexes real stdin, the
//! PTY master, and the child's exit between the two recording modes.
//!
//! The protocol is the same either way: snapshot the caller's terminal
//! attributes, switch stdin to raw mode, drive a loop that reads whichever
//! of {PTY master, stdin} is ready (or notices the child exited), and
//! restore attributes on the way out. What differs between command mode and
//! interactive mode is only how output bytes get attributed to a
//! [`CommandSession`] -- a single session for the whole run in command
//! mode, versus one per shell prompt in interactive mode, tracked by a
//! [`Segmenter`].
//!
//! The multiplex is built on `pty-process` plus `tokio::select!` rather than
//! a synchronous poll-with-timeout loop: the `select!` over {master read,
//! stdin read, child exit} is the async rendering of that same
//! bounded-latency multiplex.

use std::os::fd::{AsFd, AsRawFd};
use std::sync::Arc;

use nix::sys::termios::{self, SetArg};
use nix::unistd::Pid;
use pty_process::{Command as PtyCommand, Size};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::Duration;

use crate::document::CommandSession;
use crate::error::{RewindError, Result};
use crate::segmenter::Segmenter;
use crate::signals::{self, Shared};
use crate::{clock, document};

const READ_CHUNK: usize = 8192;
const DRAIN_TIMEOUT: Duration = Duration::from_millis(50);

/// Restores the caller's terminal attributes when dropped. A no-op if
/// stdin isn't a TTY (e.g. when rewindtty's own output is piped).
struct RawModeGuard {
    original: Option<termios::Termios>,
}

impl RawModeGuard {
    fn enable() -> Result<Self> {
        let stdin = std::io::stdin();
        let fd = stdin.as_fd();

        if unsafe { libc::isatty(fd.as_raw_fd()) } != 1 {
            return Ok(Self { original: None });
        }

        let original = termios::tcgetattr(fd)?;
        let mut raw = original.clone();
        termios::cfmakeraw(&mut raw);
        termios::tcsetattr(fd, SetArg::TCSANOW, &raw)?;
        Ok(Self {
            original: Some(original),
        })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Some(original) = &self.original {
            let stdin = std::io::stdin();
            let _ = termios::tcsetattr(stdin.as_fd(), SetArg::TCSANOW, original);
        }
    }
}

/// Where output bytes go as they arrive from the PTY master.
enum Routing {
    /// Command mode: exactly one session for the whole run.
    Single(CommandSession),
    /// Interactive mode: sessions open and close as the segmenter detects
    /// prompts and submitted command lines.
    Segmented {
        segmenter: Segmenter,
        current: Option<CommandSession>,
    },
}

/// Runs `shell -c command` under a fresh PTY and appends the resulting
/// single command session to `shared`'s store once the child exits.
pub async fn run_command(shared: &Arc<Shared>, shell: &str, command: &str) -> Result<()> {
    let routing = Routing::Single(CommandSession::new(command, clock::now()));
    run(shared, shell, &["-c", command], routing).await
}

/// Runs an interactive login shell under a fresh PTY, segmenting its output
/// into per-command sessions as prompts come and go, for as long as the
/// shell stays alive.
pub async fn run_interactive(shared: &Arc<Shared>, shell: &str) -> Result<()> {
    let routing = Routing::Segmented {
        segmenter: Segmenter::new(),
        current: None,
    };
    run(shared, shell, &["-i"], routing).await
}

async fn run(shared: &Arc<Shared>, shell: &str, args: &[&str], mut routing: Routing) -> Result<()> {
    let (pty, pts) = pty_process::open().map_err(|e| RewindError::Pty(e.to_string()))?;
    pty.resize(Size::new(24, 80))
        .map_err(|e| RewindError::Pty(e.to_string()))?;

    let mut cmd = PtyCommand::new(shell);
    for arg in args {
        cmd = cmd.arg(arg);
    }

    let mut child = cmd.spawn(pts).map_err(|e| RewindError::Pty(e.to_string()))?;
    let pid = child.id().map(|raw| Pid::from_raw(raw as i32));
    signals::set_child_pid(shared, pid).await;

    let (mut read_pty, mut write_pty) = pty.into_split();
    let _raw_guard = RawModeGuard::enable()?;

    let mut stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut master_buf = [0u8; READ_CHUNK];
    let mut stdin_buf = [0u8; READ_CHUNK];

    loop {
        tokio::select! {
            status = child.wait() => {
                status.map_err(RewindError::Io)?;
                break;
            }
            read_res = read_pty.read(&mut master_buf) => {
                match read_res {
                    Ok(0) => break,
                    Ok(n) => handle_master_read(&mut routing, shared, &mut stdout, &master_buf[..n]).await?,
                    Err(e) if would_block(&e) => {}
                    Err(e) => return Err(e.into()),
                }
            }
            read_res = stdin.read(&mut stdin_buf) => {
                match read_res {
                    Ok(0) => break,
                    Ok(n) => {
                        let data = &stdin_buf[..n];
                        if write_pty.write_all(data).await.is_err() {
                            break;
                        }
                        handle_stdin_read(&mut routing, data);
                    }
                    Err(_) => break,
                }
            }
        }
    }

    signals::set_child_pid(shared, None).await;
    drain_remaining(&mut read_pty, &mut routing, shared, &mut stdout).await?;
    finalize(routing, shared).await?;

    Ok(())
}

async fn handle_master_read(
    routing: &mut Routing,
    shared: &Arc<Shared>,
    stdout: &mut tokio::io::Stdout,
    data: &[u8],
) -> Result<()> {
    stdout.write_all(data).await.ok();
    stdout.flush().await.ok();

    let ts = clock::now();
    match routing {
        Routing::Single(session) => session.push_chunk(ts, data),
        Routing::Segmented { segmenter, current } => {
            let should_close = segmenter.observe_output(data);
            if should_close {
                if let Some(mut session) = current.take() {
                    session.command = segmenter.command();
                    session.finish(ts);
                    signals::push_and_persist(shared, session).await?;
                }
            }
            if let Some(session) = current {
                session.push_chunk(ts, data);
            }
        }
    }
    Ok(())
}

fn handle_stdin_read(routing: &mut Routing, data: &[u8]) {
    if let Routing::Segmented { segmenter, current } = routing {
        let opened = segmenter.observe_input(data);
        if opened {
            *current = Some(document::CommandSession::new(segmenter.command(), clock::now()));
        } else if let Some(session) = current {
            session.command = segmenter.command();
        }
    }
}

async fn drain_remaining(
    read_pty: &mut pty_process::OwnedReadPty,
    routing: &mut Routing,
    shared: &Arc<Shared>,
    stdout: &mut tokio::io::Stdout,
) -> Result<()> {
    let mut buf = [0u8; READ_CHUNK];
    loop {
        match tokio::time::timeout(DRAIN_TIMEOUT, read_pty.read(&mut buf)).await {
            Ok(Ok(0)) | Err(_) => break,
            Ok(Ok(n)) => handle_master_read(routing, shared, stdout, &buf[..n]).await?,
            Ok(Err(e)) if would_block(&e) => break,
            Ok(Err(e)) => return Err(e.into()),
        }
    }
    Ok(())
}

async fn finalize(routing: Routing, shared: &Arc<Shared>) -> Result<()> {
    match routing {
        Routing::Single(mut session) => {
            session.finish(clock::now());
            signals::push_and_persist(shared, session).await?;
        }
        Routing::Segmented { current: Some(mut session), .. } => {
            // Interactive shell exited mid-command: finalize whatever was
            // open rather than silently dropping it.
            session.finish(clock::now());
            signals::push_and_persist(shared, session).await?;
        }
        Routing::Segmented { current: None, .. } => {}
    }
    Ok(())
}

fn would_block(e: &std::io::Error) -> bool {
    matches!(e.kind(), std::io::ErrorKind::WouldBlock)
}
