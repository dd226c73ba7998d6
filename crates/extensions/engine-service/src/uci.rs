//! UCI engine subprocess.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, trace, warn};

use movesync_config::{ConfigLoader, ServiceConfig};

use crate::error::ServiceError;

/// Time allowed for a reply on top of any requested thinking time.
const REPLY_TIMEOUT: Duration = Duration::from_secs(10);

/// Something that picks the next move for a position given in UCI moves.
#[async_trait]
pub trait MoveEngine: Send + Sync {
    /// `Ok(None)` when the position has no legal move.
    async fn best_move(&self, uci_moves: &[String]) -> Result<Option<String>, ServiceError>;
}

/// `position startpos [moves ...]`.
pub fn position_command(uci_moves: &[String]) -> String {
    if uci_moves.is_empty() {
        "position startpos".to_string()
    } else {
        format!("position startpos moves {}", uci_moves.join(" "))
    }
}

/// Move from a `bestmove` line. `(none)` and the null move mean no move.
pub fn parse_bestmove(line: &str) -> Option<String> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("bestmove") {
        return None;
    }
    match tokens.next() {
        Some("(none)") | Some("0000") | None => None,
        Some(mv) => Some(mv.to_string()),
    }
}

/// Line-oriented UCI conversation over any reader/writer pair.
pub struct UciSession<R, W> {
    lines: Lines<R>,
    writer: W,
    reply_timeout: Duration,
    /// A `go` was sent and its `bestmove` has not been read yet.
    searching: bool,
}

impl<R, W> UciSession<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            lines: reader.lines(),
            writer,
            reply_timeout: REPLY_TIMEOUT,
            searching: false,
        }
    }

    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    /// `uci`, engine options, `isready`.
    pub async fn handshake(&mut self, threads: u32, hash_mb: u32) -> Result<(), ServiceError> {
        self.send("uci").await?;
        self.wait_for("uciok", self.reply_timeout).await?;
        self.send(&format!("setoption name Threads value {}", threads))
            .await?;
        self.send(&format!("setoption name Hash value {}", hash_mb))
            .await?;
        self.send("isready").await?;
        self.wait_for("readyok", self.reply_timeout).await?;
        Ok(())
    }

    /// Search the position for `movetime`.
    pub async fn best_move(
        &mut self,
        uci_moves: &[String],
        movetime: Duration,
    ) -> Result<Option<String>, ServiceError> {
        self.settle().await?;
        self.send(&position_command(uci_moves)).await?;
        self.searching = true;
        self.send(&format!("go movetime {}", movetime.as_millis()))
            .await?;
        match self.wait_for("bestmove", movetime + self.reply_timeout).await {
            Ok(line) => {
                self.searching = false;
                Ok(parse_bestmove(&line))
            }
            Err(e) => {
                if let Err(settle) = self.settle().await {
                    warn!("Abandoned search did not stop: {}", settle);
                }
                Err(e)
            }
        }
    }

    /// Stop a search whose caller gave up and discard its `bestmove`.
    ///
    /// A request dropped mid-search leaves `searching` set, so the next
    /// request settles it before sending a new position.
    async fn settle(&mut self) -> Result<(), ServiceError> {
        if !self.searching {
            return Ok(());
        }
        debug!("Stopping abandoned search");
        self.send("stop").await?;
        let stale = self.wait_for("bestmove", self.reply_timeout).await?;
        trace!("Discarded {}", stale);
        self.searching = false;
        Ok(())
    }

    async fn send(&mut self, command: &str) -> Result<(), ServiceError> {
        trace!("uci > {}", command);
        self.writer.write_all(command.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn wait_for(&mut self, token: &str, limit: Duration) -> Result<String, ServiceError> {
        match tokio::time::timeout(limit, self.read_until(token)).await {
            Ok(result) => result,
            Err(_) => Err(ServiceError::Timeout(limit)),
        }
    }

    /// Skip output until a line starting with `token`.
    async fn read_until(&mut self, token: &str) -> Result<String, ServiceError> {
        while let Some(line) = self.lines.next_line().await? {
            trace!("uci < {}", line);
            if line.split_whitespace().next() == Some(token) {
                return Ok(line);
            }
        }
        Err(ServiceError::Engine(format!(
            "engine closed its output while waiting for {}",
            token
        )))
    }
}

/// A UCI engine process. Searches are serialized.
pub struct UciEngine {
    session: Mutex<UciSession<BufReader<ChildStdout>, ChildStdin>>,
    movetime: Duration,
    // Killed on drop.
    _child: Child,
}

impl UciEngine {
    /// Start the engine binary and complete the UCI handshake.
    pub async fn spawn(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let path = ConfigLoader::expand_path(&config.engine_path);
        let mut child = Command::new(&path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ServiceError::Spawn {
                path: path.clone(),
                source,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ServiceError::Engine("engine stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ServiceError::Engine("engine stdout unavailable".to_string()))?;

        let mut session = UciSession::new(BufReader::new(stdout), stdin);
        session.handshake(config.threads, config.hash_mb).await?;
        info!("Engine {} ready", path);

        Ok(Self {
            session: Mutex::new(session),
            movetime: Duration::from_millis(config.movetime_ms),
            _child: child,
        })
    }
}

#[async_trait]
impl MoveEngine for UciEngine {
    async fn best_move(&self, uci_moves: &[String]) -> Result<Option<String>, ServiceError> {
        let mut session = self.session.lock().await;
        debug!("Searching after {} plies", uci_moves.len());
        session.best_move(uci_moves, self.movetime).await
    }
}

#[cfg(test)]
#[path = "uci_tests.rs"]
mod tests;
