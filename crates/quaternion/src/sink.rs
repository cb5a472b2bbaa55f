use std::io::Write;

use crate::{Error, Result};

/// Delivers produced bytes to the requesting context.
///
/// A sink either accepts the whole buffer or fails with
/// [`Error::CopyFailed`]; there is no partial success. Implementations that
/// can fail half-way should treat whatever reached the destination as
/// undefined.
pub trait TransferSink {
    /// Copies `buf` to the destination.
    ///
    /// # Errors
    /// - [`Error::CopyFailed`] if the bytes cannot be delivered.
    fn write_out(&mut self, buf: &[u8]) -> Result<()>;
}

impl<S> TransferSink for &mut S
where
    S: TransferSink + ?Sized,
{
    fn write_out(&mut self, buf: &[u8]) -> Result<()> {
        (**self).write_out(buf)
    }
}

/// Accumulates deliveries in memory. Never fails.
impl TransferSink for Vec<u8> {
    fn write_out(&mut self, buf: &[u8]) -> Result<()> {
        self.extend_from_slice(buf);
        Ok(())
    }
}

/// Copies into a caller-provided slice, filling it front to back.
///
/// A delivery that does not fit in the remaining space fails and leaves the
/// slice untouched.
#[derive(Debug)]
pub struct SliceSink<'a> {
    dst: &'a mut [u8],
    written: usize,
}

impl<'a> SliceSink<'a> {
    pub fn new(dst: &'a mut [u8]) -> Self {
        Self { dst, written: 0 }
    }

    /// Bytes delivered so far.
    pub const fn written(&self) -> usize {
        self.written
    }

    pub const fn remaining(&self) -> usize {
        self.dst.len() - self.written
    }
}

impl TransferSink for SliceSink<'_> {
    fn write_out(&mut self, buf: &[u8]) -> Result<()> {
        if buf.len() > self.remaining() {
            return Err(Error::CopyFailed { len: buf.len() });
        }
        self.dst[self.written..self.written + buf.len()].copy_from_slice(buf);
        self.written += buf.len();
        Ok(())
    }
}

/// Forwards deliveries to any [`std::io::Write`].
///
/// Each delivery is written in full and flushed; an I/O failure is reported
/// as [`Error::CopyFailed`].
#[derive(Debug)]
pub struct WriterSink<W>
where
    W: Write,
{
    inner: W,
}

impl<W> WriterSink<W>
where
    W: Write,
{
    pub const fn new(inner: W) -> Self {
        Self { inner }
    }

    pub const fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W> TransferSink for WriterSink<W>
where
    W: Write,
{
    fn write_out(&mut self, buf: &[u8]) -> Result<()> {
        self.inner
            .write_all(buf)
            .and_then(|()| self.inner.flush())
            .map_err(|_e| {
                #[cfg(feature = "tracing")]
                tracing::debug!("Writer sink failed after {} byte delivery: {_e}", buf.len());

                Error::CopyFailed { len: buf.len() }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn slice_sink_fills_front_to_back() {
        let mut dst = [0_u8; 8];
        let mut sink = SliceSink::new(&mut dst);

        sink.write_out(b"abc").unwrap();
        sink.write_out(b"de").unwrap();
        assert_eq!(sink.written(), 5);
        assert_eq!(sink.remaining(), 3);
        assert_eq!(&dst[..5], b"abcde");
    }

    #[test]
    fn slice_sink_rejects_overflow_untouched() {
        let mut dst = [0_u8; 4];
        let mut sink = SliceSink::new(&mut dst);

        assert_eq!(sink.write_out(b"hello"), Err(Error::CopyFailed { len: 5 }));
        assert_eq!(sink.written(), 0);
        assert_eq!(dst, [0; 4]);
    }

    #[test]
    fn empty_delivery_always_fits() {
        let mut dst: [u8; 0] = [];
        let mut sink = SliceSink::new(&mut dst);
        assert_eq!(sink.write_out(b""), Ok(()));
    }

    #[test]
    fn vec_sink_appends() {
        let mut sink = b"x".to_vec();
        sink.write_out(b"yz").unwrap();
        assert_eq!(sink, b"xyz");
    }

    #[test]
    fn writer_sink_forwards() {
        let mut sink = WriterSink::new(Vec::new());
        sink.write_out(b"0.00 0.00 0.00 0.00\n").unwrap();
        assert_eq!(sink.get_ref().as_slice(), b"0.00 0.00 0.00 0.00\n");
        assert_eq!(sink.into_inner().len(), 20);
    }

    #[test]
    fn writer_failure_is_copy_failed() {
        let mut sink = WriterSink::new(BrokenPipe);
        assert_eq!(sink.write_out(b"data"), Err(Error::CopyFailed { len: 4 }));
    }
}
