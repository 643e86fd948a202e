//! Observing decorators for raw tokio byte streams.
//!
//! For adapters that sit below the `http` body abstraction and hand the
//! engine a plain `AsyncRead`/`AsyncWrite`. Same contract as the body
//! decorator: every byte the real consumer reads or writes is duplicated
//! into the capture handle, end-of-stream and errors are untouched.

use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use pin_project::{pin_project, pinned_drop};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use crate::capture::buffer::CaptureHandle;

/// Wrap a readable stream, returning the passthrough reader and the handle
/// resolving to the captured bytes.
pub fn observe_reader<R: AsyncRead>(inner: R, limit: usize) -> (ObservedReader<R>, CaptureHandle) {
    let handle = CaptureHandle::new(limit);
    (
        ObservedReader {
            inner,
            handle: handle.clone(),
        },
        handle,
    )
}

/// Wrap a writable stream, returning the passthrough writer and the handle
/// resolving to the captured bytes.
pub fn observe_writer<W: AsyncWrite>(inner: W, limit: usize) -> (ObservedWriter<W>, CaptureHandle) {
    let handle = CaptureHandle::new(limit);
    (
        ObservedWriter {
            inner,
            handle: handle.clone(),
        },
        handle,
    )
}

#[pin_project(PinnedDrop)]
pub struct ObservedReader<R> {
    #[pin]
    inner: R,
    handle: CaptureHandle,
}

impl<R: AsyncRead> AsyncRead for ObservedReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.project();
        let before = buf.filled().len();
        ready!(this.inner.poll_read(cx, buf))?;
        let filled = buf.filled();
        if filled.len() == before {
            // 0-byte read is end-of-stream
            this.handle.finalize();
        } else {
            this.handle.record(&filled[before..]);
        }
        Poll::Ready(Ok(()))
    }
}

#[pinned_drop]
impl<R> PinnedDrop for ObservedReader<R> {
    fn drop(self: Pin<&mut Self>) {
        self.handle.finalize();
    }
}

#[pin_project(PinnedDrop)]
pub struct ObservedWriter<W> {
    #[pin]
    inner: W,
    handle: CaptureHandle,
}

impl<W: AsyncWrite> AsyncWrite for ObservedWriter<W> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.project();
        let written = ready!(this.inner.poll_write(cx, buf))?;
        this.handle.record(&buf[..written]);
        Poll::Ready(Ok(written))
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.project().inner.poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.project();
        ready!(this.inner.poll_shutdown(cx))?;
        this.handle.finalize();
        Poll::Ready(Ok(()))
    }
}

#[pinned_drop]
impl<W> PinnedDrop for ObservedWriter<W> {
    fn drop(self: Pin<&mut Self>) {
        self.handle.finalize();
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;

    #[tokio::test]
    async fn test_reader_passthrough_is_byte_identical() {
        let source: &[u8] = b"GET / HTTP/1.1\r\n\r\n";
        let (mut reader, handle) = observe_reader(source, 1024);

        let mut seen = Vec::new();
        reader.read_to_end(&mut seen).await.unwrap();

        assert_eq!(seen, source);
        let captured = handle.finished().await;
        assert_eq!(&captured.bytes[..], source);
    }

    #[tokio::test]
    async fn test_reader_truncates_capture_not_stream() {
        let source: &[u8] = b"Hello, world!";
        let (mut reader, handle) = observe_reader(source, 5);

        let mut seen = Vec::new();
        reader.read_to_end(&mut seen).await.unwrap();

        assert_eq!(seen, source);
        let captured = handle.finished().await;
        assert_eq!(&captured.bytes[..], b"Hello");
        assert!(captured.truncated);
        assert_eq!(captured.total_len, 13);
    }

    #[tokio::test]
    async fn test_writer_observes_written_bytes() {
        let mut sink = std::io::Cursor::new(Vec::new());
        {
            let (mut writer, handle) = observe_writer(&mut sink, 1024);
            writer.write_all(b"response body").await.unwrap();
            writer.shutdown().await.unwrap();

            let captured = handle.finished().await;
            assert_eq!(&captured.bytes[..], b"response body");
        }
        assert_eq!(sink.into_inner(), b"response body");
    }
}
