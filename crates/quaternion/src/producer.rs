#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{ComponentGenerator, Error, RECORD_BUDGET, RandSource, Result};

/// Hard cap on the number of records in one production.
pub const MAX_RECORDS: usize = 128;

/// Maps a requested byte length to a record count:
/// `min(requested_len / RECORD_BUDGET, MAX_RECORDS)`.
///
/// # Example
/// ```
/// use quaternion::record_count;
///
/// assert_eq!(record_count(63), 0);
/// assert_eq!(record_count(64), 1);
/// assert_eq!(record_count(1_000_000), 128);
/// ```
pub const fn record_count(requested_len: usize) -> usize {
    let count = requested_len / RECORD_BUDGET;
    if count > MAX_RECORDS {
        MAX_RECORDS
    } else {
        count
    }
}

/// Reserves output buffers for productions.
///
/// The producer asks for exactly `record_count * RECORD_BUDGET` bytes before
/// generating anything; an allocator that cannot serve the request must
/// return [`Error::OutOfMemory`].
pub trait BufferAllocator {
    /// Returns a buffer able to hold `capacity` bytes. Any contents it
    /// already holds are discarded by the producer.
    ///
    /// # Errors
    /// - [`Error::OutOfMemory`] if the capacity cannot be reserved.
    fn allocate(&self, capacity: usize) -> Result<Vec<u8>>;
}

/// Allocates from the global heap, reporting failure instead of aborting.
#[derive(Default, Clone, Copy, Debug)]
pub struct HeapAllocator;

impl BufferAllocator for HeapAllocator {
    fn allocate(&self, capacity: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(capacity)
            .map_err(|_| Error::OutOfMemory {
                requested: capacity,
            })?;
        Ok(buf)
    }
}

impl<A> BufferAllocator for &A
where
    A: BufferAllocator + ?Sized,
{
    fn allocate(&self, capacity: usize) -> Result<Vec<u8>> {
        (**self).allocate(capacity)
    }
}

/// The encoded output of one production.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Production {
    bytes: Vec<u8>,
    bytes_written: usize,
    records: usize,
}

impl Production {
    /// The valid bytes; exactly [`Self::bytes_written`] long.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.bytes_written]
    }

    pub fn into_bytes(mut self) -> Vec<u8> {
        self.bytes.truncate(self.bytes_written);
        self.bytes
    }

    /// Number of valid bytes. Never the reserved capacity.
    pub const fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Number of records encoded.
    pub const fn records(&self) -> usize {
        self.records
    }

    pub const fn is_empty(&self) -> bool {
        self.bytes_written == 0
    }
}

/// Turns a requested byte length into a batch of encoded records.
///
/// A producer holds no per-call state: each [`Self::produce`] call reserves
/// its own buffer and shares only the random source with other calls, so one
/// producer can serve concurrent readers as long as the source and allocator
/// are `Sync`.
///
/// # Example
/// ```
/// use quaternion::{StreamProducer, ThreadRandom};
///
/// let producer = StreamProducer::new(ThreadRandom);
/// let production = producer.produce(256).unwrap();
///
/// assert_eq!(production.records(), 4);
/// assert_eq!(production.as_bytes().iter().filter(|&&b| b == b'\n').count(), 4);
/// ```
#[derive(Clone, Debug, Default)]
pub struct StreamProducer<R, A = HeapAllocator>
where
    R: RandSource<u32>,
    A: BufferAllocator,
{
    generator: ComponentGenerator<R>,
    allocator: A,
}

impl<R> StreamProducer<R>
where
    R: RandSource<u32>,
{
    /// Creates a producer that allocates from the heap.
    pub const fn new(rng: R) -> Self {
        Self::with_allocator(rng, HeapAllocator)
    }
}

impl<R, A> StreamProducer<R, A>
where
    R: RandSource<u32>,
    A: BufferAllocator,
{
    pub const fn with_allocator(rng: R, allocator: A) -> Self {
        Self {
            generator: ComponentGenerator::new(rng),
            allocator,
        }
    }

    pub const fn generator(&self) -> &ComponentGenerator<R> {
        &self.generator
    }

    /// Produces `record_count(requested_len)` encoded records.
    ///
    /// A request shorter than [`RECORD_BUDGET`] yields an empty production,
    /// which is not an error.
    ///
    /// # Errors
    /// - [`Error::OutOfMemory`] if the output buffer cannot be reserved;
    ///   nothing is generated.
    /// - [`Error::RandomSourceUnavailable`] if the source fails mid-batch; the
    ///   partial batch is dropped.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn produce(&self, requested_len: usize) -> Result<Production> {
        let records = record_count(requested_len);
        let mut bytes = self.allocator.allocate(records * RECORD_BUDGET)?;
        bytes.clear();

        let mut bytes_written = 0;
        for _ in 0..records {
            let record = self.generator.next_record()?;
            bytes_written += record.encode_into(&mut bytes);
        }
        debug_assert_eq!(bytes_written, bytes.len());
        debug_assert!(bytes_written <= records * RECORD_BUDGET);

        Ok(Production {
            bytes,
            bytes_written,
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{
        CountingAllocator, DirtyAllocator, DrainingRand, FailingAllocator, MinRand, StepRand,
    };
    use crate::{FixedPoint, Quaternion, parse_stream};

    #[test]
    fn record_count_policy() {
        assert_eq!(record_count(0), 0);
        assert_eq!(record_count(1), 0);
        assert_eq!(record_count(63), 0);
        assert_eq!(record_count(64), 1);
        assert_eq!(record_count(127), 1);
        assert_eq!(record_count(128), 2);
        assert_eq!(record_count(8191), 127);
        assert_eq!(record_count(8192), 128);
        assert_eq!(record_count(8256), 128);
        assert_eq!(record_count(usize::MAX), MAX_RECORDS);
    }

    #[test]
    fn short_request_is_empty_not_error() {
        let producer = StreamProducer::new(MinRand);
        for len in [0, 1, 32, 63] {
            let production = producer.produce(len).unwrap();
            assert!(production.is_empty());
            assert_eq!(production.records(), 0);
            assert_eq!(production.bytes_written(), 0);
            assert!(production.as_bytes().is_empty());
        }
    }

    #[test]
    fn single_record_is_one_line() {
        let producer = StreamProducer::new(MinRand);
        let production = producer.produce(64).unwrap();

        assert_eq!(production.records(), 1);
        assert_eq!(production.as_bytes(), b"-16.00 -16.00 -16.00 -16.00\n");
        assert_eq!(production.bytes_written(), 28);
    }

    #[test]
    fn full_request_caps_at_max_records() {
        let producer = StreamProducer::new(StepRand::new((0..3200).collect()));
        let production = producer.produce(8192).unwrap();

        assert_eq!(production.records(), MAX_RECORDS);
        let lines = production
            .as_bytes()
            .split(|&b| b == b'\n')
            .filter(|line| !line.is_empty())
            .count();
        assert_eq!(lines, MAX_RECORDS);
        assert!(production.as_bytes().ends_with(b"\n"));

        let oversized = producer.produce(1 << 20).unwrap();
        assert_eq!(oversized.records(), MAX_RECORDS);
    }

    #[test]
    fn bytes_written_within_budget() {
        let producer = StreamProducer::new(StepRand::new(vec![0, 1, 1599, 3199, 7, 1234]));
        for len in [0, 64, 100, 640, 4096, 8192, 100_000] {
            let production = producer.produce(len).unwrap();
            assert_eq!(production.bytes_written(), production.as_bytes().len());
            assert!(production.bytes_written() <= record_count(len) * RECORD_BUDGET);
        }
    }

    #[test]
    fn output_follows_generation_order() {
        let rng = StepRand::new(vec![0, 1600, 3199, 1750, 1601, 1450, 1700, 1500]);
        let producer = StreamProducer::new(&rng);
        let production = producer.produce(128).unwrap();

        let records: Vec<Quaternion> = parse_stream(production.as_bytes())
            .collect::<Result<_, _>>()
            .unwrap();
        let raw = |r: [i32; 4]| Quaternion::from(r.map(FixedPoint::from_raw));
        assert_eq!(
            records,
            vec![raw([-1600, 0, 1599, 150]), raw([1, -150, 100, -100])]
        );
        assert_eq!(
            production.as_bytes(),
            b"-16.00 0.00 15.99 1.50\n0.01 -1.50 1.00 -1.00\n"
        );
        assert_eq!(rng.draws(), 8);
    }

    #[test]
    fn reserves_exact_budget() {
        let allocator = CountingAllocator::default();
        let producer = StreamProducer::with_allocator(MinRand, &allocator);

        producer.produce(10).unwrap();
        producer.produce(640).unwrap();
        producer.produce(9000).unwrap();

        assert_eq!(*allocator.requests.borrow(), vec![0, 640, 8192]);
    }

    #[test]
    fn allocation_failure_generates_nothing() {
        let rng = StepRand::new(vec![0]);
        let producer = StreamProducer::with_allocator(&rng, FailingAllocator);

        assert_eq!(
            producer.produce(8192),
            Err(Error::OutOfMemory { requested: 8192 })
        );
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn recycled_buffer_contents_are_discarded() {
        let producer = StreamProducer::with_allocator(MinRand, DirtyAllocator);
        let production = producer.produce(64).unwrap();

        assert_eq!(production.as_bytes(), b"-16.00 -16.00 -16.00 -16.00\n");
        assert_eq!(production.bytes_written(), 28);
        assert_eq!(production.into_bytes(), b"-16.00 -16.00 -16.00 -16.00\n");
    }

    #[test]
    fn source_failure_mid_batch_drops_the_batch() {
        // Enough entropy for two records and half of a third.
        let producer = StreamProducer::new(DrainingRand::new(10));
        assert!(matches!(
            producer.produce(640),
            Err(Error::RandomSourceUnavailable { .. })
        ));
    }

    #[test]
    fn heap_allocator_reserves_capacity() {
        let buf = HeapAllocator.allocate(4096).unwrap();
        assert!(buf.is_empty());
        assert!(buf.capacity() >= 4096);

        assert_eq!(
            HeapAllocator.allocate(usize::MAX),
            Err(Error::OutOfMemory {
                requested: usize::MAX
            })
        );
    }

    #[test]
    fn into_bytes_drops_spare_capacity_contents() {
        let producer = StreamProducer::new(MinRand);
        let production = producer.produce(192).unwrap();
        let expected = production.as_bytes().to_vec();
        assert_eq!(production.into_bytes(), expected);
    }
}
