//! Newline-delimited JSON-RPC transport (stdio).
//!
//! - Each message is one line of UTF-8 JSON
//! - Blank lines are skipped
//! - Every non-blank line produces exactly one response line
//! - stderr is left to logging
//!
//! The stdio transport is for local use by a parent process and does not
//! run the auth gate.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::mcp::dispatcher::Dispatcher;
use crate::mcp::protocol::JsonRpcResponse;
use crate::mcp::server::shutdown_signal;

/// A line-oriented transport over any async reader/writer pair.
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
}

/// The transport bound to the process's stdin and stdout.
pub type StdioTransport = LineTransport<BufReader<tokio::io::Stdin>, tokio::io::Stdout>;

impl StdioTransport {
    /// Creates a transport over stdin/stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a transport over `reader` and `writer`.
    pub const fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Reads the next message line.
    ///
    /// Returns `None` at EOF.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let bytes_read = self.reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            return Ok(None);
        }

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }

        Ok(Some(line))
    }

    /// Writes a response followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub async fn write_response(&mut self, response: &JsonRpcResponse) -> io::Result<()> {
        let json = serde_json::to_string(response)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        debug_assert!(!json.contains('\n'), "JSON message must not contain embedded newlines");

        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await
    }

    /// Serves requests until EOF.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn serve(&mut self, dispatcher: &Dispatcher) -> io::Result<()> {
        while let Some(line) = self.read_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let response = dispatcher.handle(line.as_bytes()).await;
            self.write_response(&response).await?;
        }
        tracing::info!("Input closed, stopping stdio transport");
        Ok(())
    }
}

/// Serves `dispatcher` over stdin/stdout until EOF or a shutdown signal.
///
/// # Errors
///
/// Returns an error if transport I/O fails or signal handlers cannot be installed.
pub async fn serve_stdio(dispatcher: &Dispatcher) -> io::Result<()> {
    let mut transport = StdioTransport::stdio();
    tracing::info!("Serving MCP over stdio");

    tokio::select! {
        result = transport.serve(dispatcher) => result,
        result = shutdown_signal() => result,
    }
}
