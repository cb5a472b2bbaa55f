#![doc = include_str!("../README.md")]

mod config;
mod telemetry;

use std::io::{self, Write};

use anyhow::Context;
use clap::Parser;
use config::{CliArgs, Config};
use quaternion::{
    BufferAllocator, DEVICE_NAME, Quaternion, QuaternionDevice, RandSource, Summary, TransferSink,
    WriterSink, parse_stream, record_count,
};
use telemetry::init_telemetry;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = Config::try_from(args)?;

    init_telemetry()?;
    log_startup_info(&config);

    let device = QuaternionDevice::new(config.source.build());
    device.open()?;
    let result = run(&device, &config, io::stdout);
    device.release()?;

    let tally = result?;
    io::stdout().flush().context("failed to flush stdout")?;

    if config.stats {
        eprint!("{}", tally.summary);
        if let Some(distances) = tally.summary.distances(&tally.records) {
            eprint!("{distances}");
        }
    }
    Ok(())
}

fn log_startup_info(config: &Config) {
    if cfg!(debug_assertions) {
        tracing::info!(
            "Reading from {} with full config: {:#?}",
            DEVICE_NAME,
            config
        );
    } else {
        tracing::info!(
            "Reading from {} with {} readers x {} reads of {} bytes",
            DEVICE_NAME,
            config.readers,
            config.reads,
            config.read_size
        );
    }

    if record_count(config.read_size) == 0 {
        tracing::warn!(
            "READ_SIZE {} is below one record's budget; every read will be empty",
            config.read_size
        );
    }
}

/// Records seen by the readers. Empty unless statistics are enabled.
#[derive(Debug, Default)]
struct Tally {
    summary: Summary,
    records: Vec<Quaternion>,
}

impl Tally {
    fn push(&mut self, record: Quaternion) {
        self.summary.push(&record);
        self.records.push(record);
    }

    fn merge(&mut self, other: Self) {
        self.summary.merge(&other.summary);
        self.records.extend(other.records);
    }
}

/// Runs every reader to completion and merges what they saw.
///
/// Each reader writes to its own writer from `make_writer`. The first reader
/// error is returned once all readers have stopped.
fn run<R, A, F, W>(
    device: &QuaternionDevice<R, A>,
    config: &Config,
    make_writer: F,
) -> anyhow::Result<Tally>
where
    R: RandSource<u32> + Sync,
    A: BufferAllocator + Sync,
    F: Fn() -> W + Sync,
    W: Write,
{
    let make_writer = &make_writer;
    let results: Vec<anyhow::Result<Tally>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..config.readers)
            .map(|reader_id| {
                s.spawn(move || reader_loop(reader_id, device, config, make_writer()))
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| anyhow::anyhow!("reader thread panicked"))
                    .and_then(|result| result)
            })
            .collect()
    });

    let mut tally = Tally::default();
    for result in results {
        tally.merge(result?);
    }
    Ok(tally)
}

/// Performs `config.reads` reads, writing each production to `writer` as one
/// delivery.
fn reader_loop<R, A, W>(
    reader_id: usize,
    device: &QuaternionDevice<R, A>,
    config: &Config,
    writer: W,
) -> anyhow::Result<Tally>
where
    R: RandSource<u32>,
    A: BufferAllocator,
    W: Write,
{
    tracing::debug!("Reader {reader_id} started");

    // Every production is one `write_all`; on stdout that call holds the
    // lock for the whole delivery, so readers never interleave lines.
    let mut sink = WriterSink::new(writer);
    let mut tally = Tally::default();
    let mut buf = Vec::new();

    for read in 0..config.reads {
        let written = if config.stats {
            buf.clear();
            let written = device
                .read(&mut buf, config.read_size)
                .with_context(|| format!("reader {reader_id} failed on read {read}"))?;
            for record in parse_stream(buf.as_slice()) {
                tally.push(record.context("device produced an unparsable record")?);
            }
            sink.write_out(&buf)
                .with_context(|| format!("reader {reader_id} failed to write {written} bytes"))?;
            written
        } else {
            device
                .read(&mut sink, config.read_size)
                .with_context(|| format!("reader {reader_id} failed on read {read}"))?
        };

        tracing::trace!("Reader {reader_id} delivered {written} bytes on read {read}");
    }

    tracing::debug!("Reader {reader_id} stopped");
    Ok(tally)
}
