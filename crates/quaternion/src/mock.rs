//! Collaborators for tests: fixed and scripted random sources, plus
//! allocators and sinks that fail on demand.

use core::cell::Cell;

use crate::{BufferAllocator, Error, RandSource, Result, TransferSink};

pub struct MockRand {
    pub rand: u32,
}

impl RandSource<u32> for MockRand {
    fn try_rand(&self) -> Result<u32> {
        Ok(self.rand)
    }
}

pub struct MinRand;
impl RandSource<u32> for MinRand {
    fn try_rand(&self) -> Result<u32> {
        Ok(0)
    }
}

pub struct MaxRand;
impl RandSource<u32> for MaxRand {
    fn try_rand(&self) -> Result<u32> {
        Ok(u32::MAX)
    }
}

/// Replays `values` in order, wrapping around at the end.
pub struct StepRand {
    values: Vec<u32>,
    index: Cell<usize>,
}

impl StepRand {
    pub fn new(values: Vec<u32>) -> Self {
        Self {
            values,
            index: Cell::new(0),
        }
    }

    pub fn draws(&self) -> usize {
        self.index.get()
    }
}

impl RandSource<u32> for StepRand {
    fn try_rand(&self) -> Result<u32> {
        let idx = self.index.get();
        self.index.set(idx + 1);
        Ok(self.values[idx % self.values.len()])
    }
}

/// Succeeds `budget` times, then reports the source as unavailable.
pub struct DrainingRand {
    budget: Cell<usize>,
}

impl DrainingRand {
    pub fn new(budget: usize) -> Self {
        Self {
            budget: Cell::new(budget),
        }
    }
}

impl RandSource<u32> for DrainingRand {
    fn try_rand(&self) -> Result<u32> {
        match self.budget.get() {
            0 => Err(Error::RandomSourceUnavailable {
                reason: "entropy exhausted".to_string(),
            }),
            left => {
                self.budget.set(left - 1);
                Ok(0)
            }
        }
    }
}

pub struct FailingAllocator;
impl BufferAllocator for FailingAllocator {
    fn allocate(&self, capacity: usize) -> Result<Vec<u8>> {
        Err(Error::OutOfMemory {
            requested: capacity,
        })
    }
}

/// Records the capacity of every allocation it serves.
#[derive(Default)]
pub struct CountingAllocator {
    pub requests: core::cell::RefCell<Vec<usize>>,
}

impl BufferAllocator for CountingAllocator {
    fn allocate(&self, capacity: usize) -> Result<Vec<u8>> {
        self.requests.borrow_mut().push(capacity);
        Ok(Vec::with_capacity(capacity))
    }
}

/// Hands back a recycled buffer that still holds stale bytes.
pub struct DirtyAllocator;
impl BufferAllocator for DirtyAllocator {
    fn allocate(&self, capacity: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(capacity + 4);
        buf.extend_from_slice(b"XXXX");
        Ok(buf)
    }
}

/// Rejects every write; counts attempts.
#[derive(Default)]
pub struct FailingSink {
    pub attempts: usize,
}

impl TransferSink for FailingSink {
    fn write_out(&mut self, buf: &[u8]) -> Result<()> {
        self.attempts += 1;
        Err(Error::CopyFailed { len: buf.len() })
    }
}
