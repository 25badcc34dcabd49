use anyhow::{Context, Result};
use clap::Parser;
use mologger::logging::{MemoryEngine, TaggedLogging};
use mologger::{exporter, BuiltContext, CrashReporter, LoggingConfig, Tag};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON5 logging configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Expose engine counters on this address for Prometheus
    #[arg(long, global = true)]
    prometheus_addr: Option<SocketAddr>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser, Debug, PartialEq)]
enum Command {
    /// Log a sample of tagged messages through every configured engine
    Demo,
    /// Log concurrently from many tasks and report what arrived
    Stress {
        #[arg(long, default_value_t = 8)]
        tasks: usize,
        #[arg(long, default_value_t = 1000)]
        messages: usize,
    },
    /// Forward a diagnostics payload file (object or array) as log calls
    Report { payload: PathBuf },
}

fn load_config(path: Option<&PathBuf>) -> Result<LoggingConfig> {
    let mut config = match path {
        Some(path) => LoggingConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => LoggingConfig::default(),
    };
    config.apply_env().context("Invalid environment override")?;
    Ok(config)
}

fn run_demo(built: &BuiltContext) {
    let ctx = &built.context;

    ctx.info("Application started");
    ctx.info_tagged(Tag::Network, "GET /api/feed -> 200 (120ms)");
    ctx.info_tagged(Tag::Performance, "Slow frame render: 48ms");
    ctx.warn_tagged(Tag::Memory, "disk low");
    ctx.error_tagged(Tag::Database, "migration 12 failed: table locked");
    ctx.debug("cache warmed with 42 entries");

    let auth = ctx.tagged(Tag::Auth);
    auth.log_info("token refreshed");
    auth.log_warn("token expires in 60s");

    mologger::log_info!(ctx, tag = Tag::Ui, "presented {} cells", 24);
    ctx.crash("simulated fatal error from demo");

    if let Some(metrics) = &built.metrics {
        let snapshot = metrics.snapshot();
        println!(
            "metrics: {} info, {} warnings, {} errors, {} tracked events",
            snapshot.infos, snapshot.warnings, snapshot.errors, snapshot.tracked_events
        );
    }
    if let Some(memory) = &built.memory {
        println!("memory engine holds {} records", memory.len());
        for record in memory.recent(3) {
            println!("  {} [{}] {}", record.timestamp, record.severity, record.message);
        }
    }
}

async fn run_stress(built: &BuiltContext, tasks: usize, messages: usize) -> Result<()> {
    let total = tasks
        .checked_mul(messages)
        .with_context(|| format!("{} tasks x {} messages overflows", tasks, messages))?;
    let ctx = built.context.clone();
    // A private memory engine sized to hold everything, so loss is visible
    let capture = Arc::new(MemoryEngine::new(total));
    let capture_id = ctx.add_engine(capture.clone());

    let mut handles = Vec::with_capacity(tasks);
    for task in 0..tasks {
        let ctx = ctx.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..messages {
                ctx.info_tagged(Tag::Test, &format!("task {} message {}", task, i));
                if i % 100 == 0 {
                    tokio::task::yield_now().await;
                }
            }
        }));
    }
    for handle in handles {
        handle.await.context("Stress task panicked")?;
    }

    println!(
        "delivered {} of {} messages across {} engines ({} isolated failures)",
        capture.len(),
        total,
        ctx.engine_count(),
        ctx.isolated_failures()
    );
    ctx.remove_engine(capture_id);
    Ok(())
}

fn run_report(built: &BuiltContext, payload: &PathBuf) -> Result<()> {
    let bytes = std::fs::read(payload)
        .with_context(|| format!("Failed to read payload {}", payload.display()))?;
    let reporter = CrashReporter::new(built.context.clone());
    let is_array = bytes
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'[');
    if is_array {
        let forwarded = reporter.receive_batch(&bytes);
        println!("forwarded {} diagnostic payloads", forwarded);
    } else {
        reporter.receive_json(&bytes);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(addr) = args.prometheus_addr {
        exporter::install_prometheus_recorder(addr)
            .with_context(|| format!("Failed to start Prometheus exporter on {}", addr))?;
    }

    let config = load_config(args.config.as_ref())?;
    let built = config.build_context().context("Failed to build logging context")?;

    match &args.command {
        Command::Demo => run_demo(&built),
        Command::Stress { tasks, messages } => run_stress(&built, *tasks, *messages).await?,
        Command::Report { payload } => run_report(&built, payload)?,
    }

    built.context.flush();
    Ok(())
}
