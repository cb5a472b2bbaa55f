//! The read-oriented front of the generator.
//!
//! [`QuaternionDevice`] is what a host exposes as `/dev/quaternion`: a read of
//! `n` bytes runs one production sized by `n` and hands the bytes to a
//! [`TransferSink`]. Open and release carry no state and only log.
//!
//! Registration of the device node itself belongs to the host.

use std::io;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    BufferAllocator, HeapAllocator, RandSource, Result, SliceSink, StreamProducer, TransferSink,
};

/// Name under which hosts register the device.
pub const DEVICE_NAME: &str = "quaternion";

/// A stateless quaternion stream.
///
/// Concurrent readers may share one device through `&QuaternionDevice`; each
/// read owns its buffer until it is delivered, and the random source is the
/// only thing the readers share.
///
/// # Example
/// ```
/// use quaternion::{QuaternionDevice, ThreadRandom};
///
/// let device = QuaternionDevice::new(ThreadRandom);
/// device.open().unwrap();
///
/// let mut out = Vec::new();
/// let written = device.read(&mut out, 640).unwrap();
///
/// assert_eq!(written, out.len());
/// assert_eq!(out.iter().filter(|&&b| b == b'\n').count(), 10);
///
/// device.release().unwrap();
/// ```
#[derive(Clone, Debug, Default)]
pub struct QuaternionDevice<R, A = HeapAllocator>
where
    R: RandSource<u32>,
    A: BufferAllocator,
{
    producer: StreamProducer<R, A>,
}

impl<R> QuaternionDevice<R>
where
    R: RandSource<u32>,
{
    pub const fn new(rng: R) -> Self {
        Self::from_producer(StreamProducer::new(rng))
    }
}

impl<R, A> QuaternionDevice<R, A>
where
    R: RandSource<u32>,
    A: BufferAllocator,
{
    pub const fn with_allocator(rng: R, allocator: A) -> Self {
        Self::from_producer(StreamProducer::with_allocator(rng, allocator))
    }

    pub const fn from_producer(producer: StreamProducer<R, A>) -> Self {
        Self { producer }
    }

    pub const fn producer(&self) -> &StreamProducer<R, A> {
        &self.producer
    }

    /// Open hook. Nothing to initialize.
    ///
    /// # Errors
    /// Infallible; the `Result` matches the host's hook signature.
    pub fn open(&self) -> Result<()> {
        #[cfg(feature = "tracing")]
        tracing::info!("Quaternion device opened");
        Ok(())
    }

    /// Release hook. Nothing to tear down.
    ///
    /// # Errors
    /// Infallible; the `Result` matches the host's hook signature.
    pub fn release(&self) -> Result<()> {
        #[cfg(feature = "tracing")]
        tracing::info!("Quaternion device closed");
        Ok(())
    }

    /// Produces up to `requested_len` bytes and delivers them to `sink`.
    ///
    /// Returns the number of bytes delivered, which may be less than
    /// `requested_len` (and is `0` below one record's budget).
    ///
    /// The call is all-or-nothing: on error nothing was handed to the sink
    /// (or, for [`Error::CopyFailed`], the sink rejected the delivery), and no
    /// byte count is reported.
    ///
    /// # Errors
    /// - [`Error::OutOfMemory`] if the output buffer cannot be reserved.
    /// - [`Error::RandomSourceUnavailable`] if the random source fails.
    /// - [`Error::CopyFailed`] if the sink cannot take the bytes.
    ///
    /// [`Error::OutOfMemory`]: crate::Error::OutOfMemory
    /// [`Error::RandomSourceUnavailable`]: crate::Error::RandomSourceUnavailable
    /// [`Error::CopyFailed`]: crate::Error::CopyFailed
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self, sink)))]
    pub fn read<S>(&self, sink: &mut S, requested_len: usize) -> Result<usize>
    where
        S: TransferSink + ?Sized,
    {
        let production = self.producer.produce(requested_len).inspect_err(|_e| {
            #[cfg(feature = "tracing")]
            tracing::error!("Failed to produce quaternion records: {_e}");
        })?;

        sink.write_out(production.as_bytes()).inspect_err(|_e| {
            #[cfg(feature = "tracing")]
            tracing::error!("Failed to copy quaternion data to the caller: {_e}");
        })?;

        Ok(production.bytes_written())
    }

    /// Returns a [`std::io::Read`] view of the device.
    pub const fn reader(&self) -> DeviceReader<'_, R, A> {
        DeviceReader { device: self }
    }
}

/// [`std::io::Read`] adapter over a [`QuaternionDevice`].
///
/// Every `read(buf)` is one production sized by `buf.len()`, copied into
/// `buf`. A buffer shorter than one record's budget reads `Ok(0)`, which
/// `std::io` callers treat as end of stream.
#[derive(Debug)]
pub struct DeviceReader<'a, R, A = HeapAllocator>
where
    R: RandSource<u32>,
    A: BufferAllocator,
{
    device: &'a QuaternionDevice<R, A>,
}

impl<R, A> io::Read for DeviceReader<'_, R, A>
where
    R: RandSource<u32>,
    A: BufferAllocator,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let requested_len = buf.len();
        let mut sink = SliceSink::new(buf);
        Ok(self.device.read(&mut sink, requested_len)?)
    }
}
