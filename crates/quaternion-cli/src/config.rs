use anyhow::bail;
use clap::{Parser, ValueEnum};
use quaternion::{OsRandom, RandSource, SeededRandom, ThreadRandom};

/// Runtime configuration for the `quaternion-cli` binary.
///
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file in the working directory is honored), with defaults that match
/// a single `cat /dev/quaternion`.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "quaternion-cli",
    version,
    about = "Streams synthetic quaternion records to stdout"
)]
pub struct CliArgs {
    /// Number of bytes requested per read.
    ///
    /// Each read yields `min(READ_SIZE / 64, 128)` records, so values above
    /// 8192 do not produce more output per read, and values below 64 produce
    /// none.
    ///
    /// Environment variable: `READ_SIZE`
    #[arg(long, env = "READ_SIZE", default_value_t = 8192)]
    pub read_size: usize,

    /// Number of reads each reader performs.
    ///
    /// Environment variable: `READS`
    #[arg(long, env = "READS", default_value_t = 1)]
    pub reads: usize,

    /// Number of reader threads sharing the device.
    ///
    /// Readers write whole productions to stdout, so lines never interleave,
    /// but the order of productions across readers is unspecified.
    ///
    /// Environment variable: `READERS`
    #[arg(long, env = "READERS", default_value_t = 1)]
    pub readers: usize,

    /// Entropy source backing the device.
    ///
    /// Ignored when `--seed` is given.
    ///
    /// Environment variable: `SOURCE`
    #[arg(long, env = "SOURCE", value_enum, default_value_t = SourceKind::Os)]
    pub source: SourceKind,

    /// Seed for a deterministic source. Output is reproducible with a single
    /// reader.
    ///
    /// Environment variable: `SEED`
    #[arg(long, env = "SEED")]
    pub seed: Option<u64>,

    /// Print per-component statistics, the correlation matrix and the
    /// Mahalanobis distance summary to stderr once all reads complete.
    ///
    /// Environment variable: `STATS`
    #[arg(long, env = "STATS", default_value_t = false)]
    pub stats: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Operating-system entropy on every draw.
    Os,
    /// Thread-local CSPRNG, seeded from the OS.
    Thread,
}

/// The entropy source a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Os,
    Thread,
    Seeded(u64),
}

/// Boxed source shared by every reader thread.
pub type SharedSource = Box<dyn RandSource<u32> + Send + Sync>;

impl Source {
    pub fn build(self) -> SharedSource {
        match self {
            Self::Os => Box::new(OsRandom),
            Self::Thread => Box::new(ThreadRandom),
            Self::Seeded(seed) => Box::new(SeededRandom::new(seed)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub read_size: usize,
    pub reads: usize,
    pub readers: usize,
    pub source: Source,
    pub stats: bool,
}

impl TryFrom<CliArgs> for Config {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.readers == 0 {
            bail!("READERS must be greater than 0");
        }

        if args.reads == 0 {
            bail!("READS must be greater than 0");
        }

        let source = match (args.seed, args.source) {
            (Some(seed), _) => Source::Seeded(seed),
            (None, SourceKind::Os) => Source::Os,
            (None, SourceKind::Thread) => Source::Thread,
        };

        Ok(Self {
            read_size: args.read_size,
            reads: args.reads,
            readers: args.readers,
            source,
            stats: args.stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<Config> {
        let argv = core::iter::once("quaternion-cli").chain(args.iter().copied());
        let args = CliArgs::try_parse_from(argv)?;
        Config::try_from(args)
    }

    #[test]
    fn defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.read_size, 8192);
        assert_eq!(config.reads, 1);
        assert_eq!(config.readers, 1);
        assert_eq!(config.source, Source::Os);
        assert!(!config.stats);
    }

    #[test]
    fn seed_overrides_source() {
        let config = parse(&["--source", "thread", "--seed", "42"]).unwrap();
        assert_eq!(config.source, Source::Seeded(42));

        let config = parse(&["--source", "thread"]).unwrap();
        assert_eq!(config.source, Source::Thread);
    }

    #[test]
    fn rejects_zero_readers_and_reads() {
        assert!(parse(&["--readers", "0"]).is_err());
        assert!(parse(&["--reads", "0"]).is_err());
    }

    #[test]
    fn accepts_short_reads() {
        let config = parse(&["--read-size", "10", "--stats"]).unwrap();
        assert_eq!(config.read_size, 10);
        assert!(config.stats);
    }

    #[test]
    fn rejects_unknown_source() {
        assert!(parse(&["--source", "dice"]).is_err());
    }
}
