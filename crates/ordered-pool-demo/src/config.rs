use anyhow::bail;
use clap::Parser;

/// Runtime configuration for the `ordered-pool-demo` binary.
///
/// Every job sleeps for a random time before returning its index, so jobs
/// complete out of order. The ordered pool still prints results in order; the
/// `--unordered` mode shows what happens without it.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ordered-pool-demo",
    version,
    about = "Runs randomly delayed jobs through an ordered thread pool"
)]
pub struct CliArgs {
    /// Number of worker threads. `0` runs every job on the main thread.
    ///
    /// Environment variable: `NUM_WORKERS`
    #[arg(long, env = "NUM_WORKERS", default_value_t = 10)]
    pub workers: usize,

    /// Jobs allowed to wait in the queue before submission blocks. `0`
    /// disables throttling.
    ///
    /// Environment variable: `QUEUE_CAPACITY`
    #[arg(long, env = "QUEUE_CAPACITY", default_value_t = 5)]
    pub queue_capacity: usize,

    /// Number of jobs to submit.
    ///
    /// Environment variable: `NUM_JOBS`
    #[arg(long, env = "NUM_JOBS", default_value_t = 50)]
    pub jobs: usize,

    /// Upper bound (exclusive) of each job's random delay, in milliseconds.
    ///
    /// Environment variable: `MAX_DELAY_MS`
    #[arg(long, env = "MAX_DELAY_MS", default_value_t = 200)]
    pub max_delay_ms: u64,

    /// Use the plain thread pool and print from inside each job.
    #[arg(short, long, default_value_t = false)]
    pub unordered: bool,
}

#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub workers: usize,
    pub queue_capacity: usize,
    pub jobs: usize,
    pub max_delay_ms: u64,
    pub unordered: bool,
}

impl TryFrom<CliArgs> for DemoConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.max_delay_ms == 0 {
            bail!("MAX_DELAY_MS must be greater than 0");
        }

        if args.unordered && args.workers == 0 {
            bail!("--unordered needs at least one worker to show reordering");
        }

        Ok(Self {
            workers: args.workers,
            queue_capacity: args.queue_capacity,
            jobs: args.jobs,
            max_delay_ms: args.max_delay_ms,
            unordered: args.unordered,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<DemoConfig> {
        let argv = std::iter::once("ordered-pool-demo").chain(args.iter().copied());
        let args = CliArgs::try_parse_from(argv)?;
        DemoConfig::try_from(args)
    }

    #[test]
    fn defaults_match_reference_run() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.workers, 10);
        assert_eq!(config.queue_capacity, 5);
        assert_eq!(config.jobs, 50);
        assert_eq!(config.max_delay_ms, 200);
        assert!(!config.unordered);
    }

    #[test]
    fn rejects_zero_delay() {
        assert!(parse(&["--max-delay-ms", "0"]).is_err());
    }

    #[test]
    fn rejects_unordered_without_workers() {
        assert!(parse(&["--workers", "0", "--unordered"]).is_err());
        assert!(parse(&["--workers", "0"]).is_ok());
    }
}
