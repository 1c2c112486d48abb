//! Line client for a command socket.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;

use cmdtree_core::EMPTY_RESPONSE;
use tracing::debug;

use crate::error::{Result, ServerError};
use crate::server::FRAME_TERMINATOR;

/// Connection to a running [`Server`](crate::Server).
#[derive(Debug)]
pub struct Client {
    reader: BufReader<UnixStream>,
}

impl Client {
    /// Connects to the socket at `path`.
    pub fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let stream = UnixStream::connect(path)?;
        debug!(path = %path.display(), "Connected to command socket");
        Ok(Self::from_stream(stream))
    }

    /// Wraps an already connected stream.
    pub fn from_stream(stream: UnixStream) -> Self {
        Self {
            reader: BufReader::new(stream),
        }
    }

    /// Sends one command line and waits for its response.
    ///
    /// The empty-response placeholder is returned as an empty string.
    ///
    /// # Errors
    ///
    /// Returns [`Disconnected`](ServerError::Disconnected) if the server
    /// closes the connection before the response terminator arrives.
    pub fn send_line(&mut self, line: &str) -> Result<String> {
        let line = line.trim_end_matches(['\r', '\n']);
        let stream = self.reader.get_mut();
        stream.write_all(line.as_bytes())?;
        stream.write_all(b"\n")?;
        stream.flush()?;

        let mut frame = Vec::new();
        self.reader.read_until(FRAME_TERMINATOR, &mut frame)?;
        if frame.pop() != Some(FRAME_TERMINATOR) {
            return Err(ServerError::Disconnected);
        }
        if frame == [EMPTY_RESPONSE] {
            frame.clear();
        }
        Ok(String::from_utf8_lossy(&frame).into_owned())
    }
}
