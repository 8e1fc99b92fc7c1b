use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use microbench::benches;
use microbench::schema::{RunMeta, SuiteReport, SCHEMA_VERSION};
use microbench::{
    Bench, BenchConfig, BenchError, BenchmarkResult, Clock, ClockKind, CycleCounter, Profile,
    RegressionPolicy, WallClock,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProfileArg {
    Quick,
    Full,
}

impl From<ProfileArg> for Profile {
    fn from(v: ProfileArg) -> Self {
        match v {
            ProfileArg::Quick => Profile::Quick,
            ProfileArg::Full => Profile::Full,
        }
    }
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Reference scenarios: empty body and a 1ms sleep.
    Scenarios,

    /// SHA-256 over 64 B, 1 KiB and 64 KiB seeded buffers.
    Hash,

    /// Sort seeded u64 vectors (permutation and random keys).
    Sort,

    /// Run every suite.
    Suite,
}

#[derive(Parser, Debug)]
#[command(name = "microbench")]
#[command(about = "Per-iteration microbenchmarks with min/max/avg reporting")]
struct Args {
    #[arg(long, value_enum, default_value_t = ProfileArg::Quick, global = true)]
    profile: ProfileArg,

    #[arg(long, default_value_t = 0, global = true)]
    seed: u64,

    /// Timestamp source for every benchmark in this run.
    #[arg(long, value_enum, default_value_t = ClockKind::Wall, global = true)]
    clock: ClockKind,

    /// What to do when a sample's end reading precedes its start.
    #[arg(long, value_enum, default_value_t = RegressionPolicy::Discard, global = true)]
    policy: RegressionPolicy,

    /// Emit a JSON report instead of text.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Where to write the JSON report. Implies --json.
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

fn now_utc() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("unix:{secs}")
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_suites<C: Clock>(
    cmd: Command,
    cfg: &BenchConfig,
    bench: &Bench<C>,
) -> Result<Vec<BenchmarkResult>, BenchError> {
    info!(
        clock = bench.clock().name(),
        unit = %C::UNIT,
        profile = cfg.profile.as_str(),
        seed = cfg.seed,
        "running {:?}",
        cmd
    );

    let mut results = Vec::new();
    match cmd {
        Command::Scenarios => results.extend(benches::scenarios::run(cfg, bench)?),
        Command::Hash => results.extend(benches::hashing::run(cfg, bench)?),
        Command::Sort => results.extend(benches::sorting::run(cfg, bench)?),
        Command::Suite => {
            results.extend(benches::scenarios::run(cfg, bench)?);
            results.extend(benches::hashing::run(cfg, bench)?);
            results.extend(benches::sorting::run(cfg, bench)?);
        }
    }
    Ok(results)
}

fn main() -> Result<(), BenchError> {
    let args = Args::parse();
    init_tracing();

    let cfg = BenchConfig {
        profile: args.profile.into(),
        seed: args.seed,
        policy: args.policy,
    };

    let results = match args.clock {
        ClockKind::Wall => {
            let bench = Bench::new(WallClock::new()?).with_policy(cfg.policy);
            run_suites(args.cmd, &cfg, &bench)?
        }
        ClockKind::Cycles => {
            let bench = Bench::new(CycleCounter::new()?).with_policy(cfg.policy);
            run_suites(args.cmd, &cfg, &bench)?
        }
    };

    if args.json || args.out.is_some() {
        let report = SuiteReport {
            run: RunMeta {
                schema_version: SCHEMA_VERSION,
                bench_version: env!("CARGO_PKG_VERSION").to_string(),
                profile: cfg.profile.as_str().to_string(),
                seed: cfg.seed,
                clock: args.clock.as_str().to_string(),
                timestamp_utc: now_utc(),
            },
            results,
        };
        report.write_json(args.out.as_deref())?;
        if let Some(out) = &args.out {
            info!("report written to {}", out.display());
        }
    } else {
        for result in &results {
            println!("{result}");
        }
    }

    Ok(())
}
