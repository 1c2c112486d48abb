//! Unix socket server.
//!
//! Each connection gets its own thread. Input is read line by line; every
//! line is dispatched against the shared table and answered with the
//! response blob followed by a NUL byte.

use std::fs;
use std::io::{BufRead, BufReader, ErrorKind, Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use cmdtree_core::CommandTable;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::error::Result;

/// Byte terminating every response on the wire.
pub const FRAME_TERMINATOR: u8 = 0;

/// Listening control socket bound to a command table.
#[derive(Debug)]
pub struct Server {
    listener: UnixListener,
    socket_path: PathBuf,
    table: Arc<CommandTable>,
    max_line: usize,
}

impl Server {
    /// Binds the socket named in `config`, replacing a stale socket file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::ServerError::Io) if the stale file cannot be
    /// removed or the socket cannot be bound.
    pub fn bind(config: &ServerConfig, table: impl Into<Arc<CommandTable>>) -> Result<Self> {
        let socket_path = config.socket_path.clone();
        match fs::remove_file(&socket_path) {
            Ok(()) => debug!(path = %socket_path.display(), "Removed stale socket"),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }

        let listener = UnixListener::bind(&socket_path)?;
        info!(path = %socket_path.display(), "Listening for commands");
        Ok(Self {
            listener,
            socket_path,
            table: table.into(),
            max_line: config.read_buffer_size.max(1),
        })
    }

    /// Path the server is bound to.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// The shared table.
    pub fn table(&self) -> &Arc<CommandTable> {
        &self.table
    }

    /// Accepts connections forever, serving each on its own thread.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::ServerError::Io) only if a handler thread cannot
    /// be spawned. Failed accepts are logged and skipped.
    pub fn run(&self) -> Result<()> {
        for (id, stream) in self.listener.incoming().enumerate() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(err) => {
                    warn!(error = %err, "Accept failed");
                    continue;
                }
            };
            self.spawn_connection(id, stream)?;
        }
        Ok(())
    }

    /// Accepts and serves exactly one connection on the calling thread.
    pub fn serve_one(&self) -> Result<()> {
        let (stream, _) = self.listener.accept()?;
        info!(connection = 0, "Client connected");
        serve_connection(&self.table, stream, self.max_line)?;
        info!(connection = 0, "Client disconnected");
        Ok(())
    }

    fn spawn_connection(&self, id: usize, stream: UnixStream) -> Result<()> {
        let table = Arc::clone(&self.table);
        let max_line = self.max_line;
        thread::Builder::new()
            .name(format!("cmdtree-conn-{id}"))
            .spawn(move || {
                info!(connection = id, "Client connected");
                match serve_connection(&table, stream, max_line) {
                    Ok(()) => info!(connection = id, "Client disconnected"),
                    Err(err) => error!(connection = id, error = %err, "Connection failed"),
                }
            })?;
        Ok(())
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.socket_path);
    }
}

/// Serves one connection until the peer closes it.
///
/// Each input line (without its line ending, truncated to `max_line`
/// bytes) is submitted to `table`; the response blob is written back
/// followed by [`FRAME_TERMINATOR`]. At most `max_line + 1` bytes of a
/// line are held in memory; the rest is skipped up to the next newline.
///
/// # Errors
///
/// Returns [`Io`](crate::ServerError::Io) on read or write failures.
pub fn serve_connection<S: Read + Write>(
    table: &CommandTable,
    stream: S,
    max_line: usize,
) -> Result<()> {
    let mut reader = BufReader::new(stream);
    let mut line = Vec::new();
    loop {
        line.clear();
        let limit = (max_line as u64).saturating_add(1);
        if reader.by_ref().take(limit).read_until(b'\n', &mut line)? == 0 {
            return Ok(());
        }
        if line.last() == Some(&b'\n') {
            line.pop();
        } else if line.len() > max_line {
            let dropped = discard_line(&mut reader)?;
            warn!(len = line.len() + dropped, max_line, "Input line truncated");
            line.truncate(max_line);
        }

        let response = table.submit(&line);
        debug!(
            line = %String::from_utf8_lossy(&line),
            ok = response.is_ok(),
            input_error = matches!(response.outcome(), Err(err) if err.is_input_error()),
            "Command dispatched"
        );

        let writer = reader.get_mut();
        response.write_to(writer)?;
        writer.write_all(&[FRAME_TERMINATOR])?;
        writer.flush()?;
    }
}

// Consumes input through the next newline without buffering it. Returns
// the number of bytes dropped, newline excluded.
fn discard_line<R: BufRead>(reader: &mut R) -> Result<usize> {
    let mut dropped = 0;
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(dropped);
        }
        match buf.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                reader.consume(pos + 1);
                return Ok(dropped + pos);
            }
            None => {
                let len = buf.len();
                reader.consume(len);
                dropped += len;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use cmdtree_core::{CommandSpec, LineMode};

    use super::*;

    /// In-memory duplex stream: reads from `input`, collects writes.
    struct Duplex {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl Read for Duplex {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for Duplex {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.output.write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn echo_table() -> CommandTable {
        CommandTable::builder()
            .command(CommandSpec::new("echo").handler(|ctx| {
                let rest = ctx.remaining().to_string();
                ctx.print(LineMode::New, &rest);
                Ok(())
            }))
            .build()
            .unwrap()
    }

    #[test]
    fn test_each_line_gets_a_framed_response() {
        let table = echo_table();
        let mut stream = Duplex {
            input: Cursor::new(b"echo hi\necho\nnope\n".to_vec()),
            output: Vec::new(),
        };
        serve_connection(&table, &mut stream, 1024).unwrap();
        assert_eq!(stream.output, b"hi\0#\0 command not found\0".to_vec());
    }

    #[test]
    fn test_long_lines_are_truncated() {
        let table = echo_table();
        let mut stream = Duplex {
            input: Cursor::new(b"echo abcdefgh".to_vec()),
            output: Vec::new(),
        };
        serve_connection(&table, &mut stream, 8).unwrap();
        assert_eq!(stream.output, b"abc\0".to_vec());
    }

    #[test]
    fn test_overlong_line_is_dropped_up_to_newline() {
        let table = echo_table();
        let mut input = b"echo ".to_vec();
        input.extend(std::iter::repeat_n(b'a', 10_000));
        input.extend_from_slice(b"\necho hi\n");
        let mut stream = Duplex {
            input: Cursor::new(input),
            output: Vec::new(),
        };
        serve_connection(&table, &mut stream, 8).unwrap();
        assert_eq!(stream.output, b"aaa\0hi\0".to_vec());
    }

    #[test]
    fn test_line_at_limit_keeps_its_newline() {
        let table = echo_table();
        let mut stream = Duplex {
            input: Cursor::new(b"echo abc\necho d\n".to_vec()),
            output: Vec::new(),
        };
        serve_connection(&table, &mut stream, 8).unwrap();
        assert_eq!(stream.output, b"abc\0d\0".to_vec());
    }
}
