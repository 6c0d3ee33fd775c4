//! Line-delimited byte channel
//!
//! Wraps a reader/writer pair in buffered halves. Writes are buffered and
//! reach the peer on [`Channel::flush`]; reads yield one line at a time
//! as raw bytes with the line terminator stripped. Text decoding belongs
//! to the codec.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::ConnectionError;

/// Channel over a TCP connection to the exchange.
pub type TcpChannel = Channel<OwnedReadHalf, OwnedWriteHalf>;

pub struct Channel<R, W> {
    reader: BufReader<R>,
    writer: BufWriter<W>,
    read_timeout: Option<Duration>,
    line: Vec<u8>,
    lines_received: u64,
    lines_sent: u64,
}

impl TcpChannel {
    /// Open a TCP connection to the configured exchange.
    pub async fn connect(config: &ClientConfig) -> Result<Self, ConnectionError> {
        let addr = config.address();
        let stream = timeout(config.connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| ConnectionError::ConnectTimeout {
                addr: addr.clone(),
                timeout: config.connect_timeout,
            })?
            .map_err(|source| ConnectionError::Connect {
                addr: addr.clone(),
                source,
            })?;
        stream.set_nodelay(true)?;

        info!(addr = %addr, read_timeout = ?config.read_timeout, "Connected to exchange");

        let (reader, writer) = stream.into_split();
        Ok(Channel::new(reader, writer, config.read_timeout))
    }
}

impl<R, W> Channel<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, read_timeout: Option<Duration>) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer: BufWriter::new(writer),
            read_timeout,
            line: Vec::new(),
            lines_received: 0,
            lines_sent: 0,
        }
    }

    /// Buffer one line, appending the terminator if missing.
    pub async fn send_line(&mut self, text: &str) -> Result<(), ConnectionError> {
        self.writer.write_all(text.as_bytes()).await?;
        if !text.ends_with('\n') {
            self.writer.write_all(b"\n").await?;
        }
        self.lines_sent += 1;
        Ok(())
    }

    pub async fn flush(&mut self) -> Result<(), ConnectionError> {
        self.writer.flush().await?;
        Ok(())
    }

    /// Read the next non-empty line.
    ///
    /// End of stream is [`ConnectionError::Closed`]; a read that outlasts
    /// the configured timeout is [`ConnectionError::ReadTimeout`].
    pub async fn receive_line(&mut self) -> Result<Vec<u8>, ConnectionError> {
        loop {
            self.line.clear();
            let read = self.reader.read_until(b'\n', &mut self.line);
            let n = match self.read_timeout {
                Some(limit) => timeout(limit, read)
                    .await
                    .map_err(|_| ConnectionError::ReadTimeout(limit))??,
                None => read.await?,
            };
            if n == 0 {
                debug!(lines_received = self.lines_received, "Peer closed the stream");
                return Err(ConnectionError::Closed);
            }

            while matches!(self.line.last(), Some(b'\n' | b'\r')) {
                self.line.pop();
            }
            if self.line.is_empty() {
                continue;
            }
            self.lines_received += 1;
            return Ok(self.line.clone());
        }
    }

    pub fn lines_received(&self) -> u64 {
        self.lines_received
    }

    pub fn lines_sent(&self) -> u64 {
        self.lines_sent
    }
}
