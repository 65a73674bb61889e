use std::num::NonZeroUsize;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use eyre::Result;
use log::info;

use tricycle::arb::scanner::{CancelFlag, ScanOutcome, Scanner};
use tricycle::arb::symbol::{AssetSplitter, FixedWidthSplitter, VocabularySplitter};
use tricycle::config::{
    ExchangeConfig, ScanConfig, DEFAULT_INITIAL_AMOUNT, DEFAULT_MIN_PROFIT_PERCENTAGE,
    DEFAULT_MIN_PROFIT_THRESHOLD,
};
use tricycle::gateway::binance::BinanceGateway;
use tricycle::report::console::ConsoleSink;
use tricycle::report::json::JsonSink;
use tricycle::report::ReportSink;
use tricycle::utils::logger::setup_logger;

/// The scanner type the binary assembles: Binance on both gateway seats,
/// sink chosen at runtime.
type AppScanner = Scanner<BinanceGateway, BinanceGateway, Box<dyn ReportSink>>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scan pass over the current universe
    Scan {
        #[command(flatten)]
        args: ScanArgs,
    },
    /// Scan repeatedly until an opportunity clears the thresholds
    Watch {
        #[command(flatten)]
        args: ScanArgs,
        /// Seconds to wait between passes
        #[arg(long, default_value_t = 10)]
        interval: u64,
    },
    /// Check exchange connectivity and universe size
    Check,
}

#[derive(Args, Clone)]
struct ScanArgs {
    /// Amount of the start asset to trade into the first leg
    #[arg(long, default_value_t = DEFAULT_INITIAL_AMOUNT)]
    amount: f64,

    /// Absolute profit required to stop the scan
    #[arg(long, default_value_t = DEFAULT_MIN_PROFIT_THRESHOLD)]
    min_profit: f64,

    /// Profit percentage also required to stop the scan
    #[arg(long, default_value_t = DEFAULT_MIN_PROFIT_PERCENTAGE)]
    min_percent: f64,

    /// How many candidates may have prices in flight at once
    #[arg(long, default_value_t = NonZeroUsize::MIN)]
    prefetch: NonZeroUsize,

    /// Split pair identifiers against the exchange's asset vocabulary
    /// instead of a fixed three-character base
    #[arg(long)]
    vocab: bool,

    /// Emit findings as line-delimited JSON on stdout
    #[arg(long)]
    json: bool,
}

impl Default for ScanArgs {
    fn default() -> Self {
        Self {
            amount: DEFAULT_INITIAL_AMOUNT,
            min_profit: DEFAULT_MIN_PROFIT_THRESHOLD,
            min_percent: DEFAULT_MIN_PROFIT_PERCENTAGE,
            prefetch: NonZeroUsize::MIN,
            vocab: false,
            json: false,
        }
    }
}

impl ScanArgs {
    fn to_config(&self) -> ScanConfig {
        ScanConfig {
            initial_amount: self.amount,
            min_profit_threshold: self.min_profit,
            min_profit_percentage: self.min_percent,
            prefetch: self.prefetch,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    setup_logger()?;

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Scan { args }) => run_scan(&args).await,
        Some(Commands::Watch { args, interval }) => {
            run_watch(&args, Duration::from_secs(interval)).await
        }
        Some(Commands::Check) => run_check().await,
        None => {
            // Default behavior when no subcommand is provided
            run_scan(&ScanArgs::default()).await
        }
    }
}

async fn run_scan(args: &ScanArgs) -> Result<()> {
    let scanner = build_scanner(args).await?;
    scanner.scan(&cancel_on_ctrl_c()).await?;
    Ok(())
}

async fn run_watch(args: &ScanArgs, interval: Duration) -> Result<()> {
    let scanner = build_scanner(args).await?;
    let cancel = cancel_on_ctrl_c();

    loop {
        match scanner.scan(&cancel).await? {
            ScanOutcome::Stopped(_) | ScanOutcome::Cancelled(_) => return Ok(()),
            ScanOutcome::Exhausted(_) | ScanOutcome::NoPairsAvailable => {
                info!("Next pass in {}s", interval.as_secs());
                tokio::time::sleep(interval).await;
            }
        }
    }
}

async fn run_check() -> Result<()> {
    let gateway = BinanceGateway::new(ExchangeConfig::from_env()?)?;
    gateway.ping().await?;

    let universe = gateway.exchange_universe().await?;
    info!(
        "Exchange reachable: {} tradable pairs over {} assets",
        universe.symbols().len(),
        universe.assets().len()
    );
    Ok(())
}

async fn build_scanner(args: &ScanArgs) -> Result<AppScanner> {
    let gateway = BinanceGateway::new(ExchangeConfig::from_env()?)?;
    let splitter = resolve_splitter(&gateway, args.vocab).await?;
    let sink: Box<dyn ReportSink> = if args.json {
        Box::new(JsonSink::stdout())
    } else {
        Box::new(ConsoleSink)
    };

    let scanner = Scanner::new(gateway.clone(), gateway, sink, splitter, args.to_config())?;
    Ok(scanner)
}

async fn resolve_splitter(
    gateway: &BinanceGateway,
    vocab: bool,
) -> Result<Box<dyn AssetSplitter>> {
    if !vocab {
        return Ok(Box::new(FixedWidthSplitter::default()));
    }

    let assets = gateway.exchange_universe().await?.into_assets();
    info!("Splitting pairs against {} exchange assets", assets.len());
    Ok(Box::new(VocabularySplitter::new(assets)))
}

/// Hands back a flag that a Ctrl-C trips.
fn cancel_on_ctrl_c() -> CancelFlag {
    let cancel = CancelFlag::new();
    let handle = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping after the current candidate");
            handle.cancel();
        }
    });
    cancel
}
