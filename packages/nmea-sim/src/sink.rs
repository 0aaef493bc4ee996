//! Output sink abstraction: a line of generated telemetry can be written
//! to stdout, appended to a file, or streamed out over a TCP connection
//! the same way a real instrument's serial-to-socket bridge would.

use std::path::PathBuf;

use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

pub enum SinkTarget {
    Stdout,
    File(PathBuf),
    Tcp(String),
}

pub enum Sink {
    Stdout(tokio::io::Stdout),
    File(File),
    Tcp(TcpStream),
}

impl Sink {
    pub async fn open(target: &SinkTarget) -> anyhow::Result<Self> {
        match target {
            SinkTarget::Stdout => Ok(Sink::Stdout(tokio::io::stdout())),
            SinkTarget::File(path) => {
                let file = tokio::fs::OpenOptions::new().create(true).append(true).open(path).await?;
                Ok(Sink::File(file))
            }
            SinkTarget::Tcp(addr) => {
                let stream = TcpStream::connect(addr).await?;
                Ok(Sink::Tcp(stream))
            }
        }
    }

    /// Writes one already-checksummed sentence followed by a CRLF
    /// terminator, or a raw binary-noise burst with no terminator.
    pub async fn write_line(&mut self, bytes: &[u8]) -> anyhow::Result<()> {
        let writer: &mut (dyn AsyncWrite + Unpin + Send) = match self {
            Sink::Stdout(w) => w,
            Sink::File(w) => w,
            Sink::Tcp(w) => w,
        };
        writer.write_all(bytes).await?;
        writer.flush().await?;
        Ok(())
    }
}
