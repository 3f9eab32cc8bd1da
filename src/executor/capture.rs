//! Bounded stream capture.
//!
//! Each child stream is read until end-of-file, but only the first
//! `limit` bytes are kept. The remainder is drained and discarded so the
//! child never blocks on a full pipe, and the bridge cannot be
//! memory-exhausted by a runaway process.

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::warn;

/// Scratch buffer size for each read.
const READ_CHUNK_BYTES: usize = 4096;

/// Bytes captured from one stream, with a count of what was thrown away.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedStream {
    /// Up to the capture bound of the stream's output.
    pub bytes: Vec<u8>,

    /// Bytes read past the bound and discarded.
    pub discarded_bytes: u64,
}

impl CapturedStream {
    /// Whether any output was discarded.
    pub fn is_truncated(&self) -> bool {
        self.discarded_bytes > 0
    }
}

/// Read `reader` to end-of-file, keeping at most `limit` bytes.
///
/// Zero bytes is an empty capture, not an error. A read error mid-stream
/// degrades to whatever was captured so far; process output capture is never
/// a bridge fault.
pub async fn capture_stream<R>(mut reader: R, limit: usize) -> CapturedStream
where
    R: AsyncRead + Unpin,
{
    let mut captured = Vec::with_capacity(limit.min(READ_CHUNK_BYTES));
    let mut discarded: u64 = 0;
    let mut chunk = [0u8; READ_CHUNK_BYTES];

    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                let keep = n.min(limit - captured.len());
                captured.extend_from_slice(&chunk[..keep]);
                discarded += (n - keep) as u64;
            }
            Err(error) => {
                warn!(%error, "stream capture read failed");
                break;
            }
        }
    }

    CapturedStream {
        bytes: captured,
        discarded_bytes: discarded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capture_small_stream() {
        let captured = capture_stream(&b"hello"[..], 64).await;
        assert_eq!(captured.bytes, b"hello");
        assert_eq!(captured.discarded_bytes, 0);
        assert!(!captured.is_truncated());
    }

    #[tokio::test]
    async fn test_capture_empty_stream() {
        let captured = capture_stream(&b""[..], 64).await;
        assert!(captured.bytes.is_empty());
        assert!(!captured.is_truncated());
    }

    #[tokio::test]
    async fn test_capture_truncates_at_limit() {
        let input = vec![b'x'; 10_000];
        let captured = capture_stream(&input[..], 4095).await;
        assert_eq!(captured.bytes.len(), 4095);
        assert_eq!(captured.discarded_bytes, 10_000 - 4095);
        assert!(captured.is_truncated());
    }

    #[tokio::test]
    async fn test_capture_exact_limit_not_truncated() {
        let input = vec![b'x'; 4095];
        let captured = capture_stream(&input[..], 4095).await;
        assert_eq!(captured.bytes.len(), 4095);
        assert!(!captured.is_truncated());
    }

    #[tokio::test]
    async fn test_capture_limit_boundary_within_chunk() {
        // Limit smaller than a single read chunk still splits correctly.
        let input = vec![b'y'; 100];
        let captured = capture_stream(&input[..], 10).await;
        assert_eq!(captured.bytes, vec![b'y'; 10]);
        assert_eq!(captured.discarded_bytes, 90);
    }
}
