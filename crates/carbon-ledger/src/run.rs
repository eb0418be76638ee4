use {
    crate::{
        simulator::{Analytics, Simulator},
        token,
    },
    clap::Parser,
    rust_decimal::Decimal,
    std::fmt::{self, Display, Formatter},
};

pub const DEMO_FARMER: &str = "farmer_001";
pub const DEMO_BATCH: &str = "demo_batch_001";
pub const DEMO_WASTE_KG: i64 = 5000;

/// Indicative market price used to value demo balances.
pub const USD_PER_TOKEN: i64 = 75;

shared_arguments::logging_args_with_default_filter!(LoggingArguments, "warn,carbon_ledger=info");

#[derive(clap::Parser)]
#[group(skip)]
pub struct Arguments {
    #[clap(flatten)]
    pub logging: LoggingArguments,

    /// Process a single demo batch for farmer_001.
    #[clap(long)]
    pub demo: bool,

    /// Number of batches of a simulated pilot program.
    #[clap(long, default_value = "0")]
    pub pilot: usize,
}

impl Display for Arguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            logging,
            demo,
            pilot,
        } = self;

        write!(f, "{logging}")?;
        writeln!(f, "demo: {demo}")?;
        writeln!(f, "pilot: {pilot}")?;
        Ok(())
    }
}

pub fn start(args: impl Iterator<Item = String>) {
    let args = Arguments::parse_from(args);
    observe::tracing::initialize(&args.logging.observe_config());
    tracing::info!("running simulate with validated arguments:\n{args}");

    let mut simulator = Simulator::default();
    if args.demo {
        demo(&mut simulator);
    }
    if args.pilot > 0 {
        let processed = simulator.simulate_pilot_program(args.pilot);
        tracing::info!(
            batches = processed.len(),
            requested = args.pilot,
            "pilot completed"
        );
    }
    match simulator.analytics() {
        Some(analytics) => log_analytics(&analytics),
        None if args.demo || args.pilot > 0 => {
            tracing::warn!("no processing data available for analysis")
        }
        None => tracing::info!("nothing to simulate, pass --demo or --pilot <BATCHES>"),
    }
}

fn demo(simulator: &mut Simulator) {
    match simulator.process_agricultural_waste(
        DEMO_FARMER,
        Decimal::from(DEMO_WASTE_KG),
        Some(DEMO_BATCH.to_string()),
    ) {
        Ok(record) => tracing::info!(
            waste_kg = %record.waste_input,
            biochar_kg = %record.biochar_output.round_dp(2),
            co2_t = %record.co2_sequestered.round_dp(3),
            tokens = %record.tokens_minted.round_dp(3),
            "demo minted tokens"
        ),
        Err(err) => tracing::warn!(?err, "demo batch rejected"),
    }

    let balance = simulator.ledger().balance(DEMO_FARMER);
    tracing::info!(
        farmer = DEMO_FARMER,
        balance = %balance.round_dp(token::DECIMALS),
        symbol = token::SYMBOL,
        usd = %(balance * Decimal::from(USD_PER_TOKEN)).round_dp(2),
        "demo balance"
    );
}

fn log_analytics(analytics: &Analytics) {
    tracing::info!(
        batches = analytics.batches,
        mean_quality = analytics.mean_quality,
        min_quality = analytics.min_quality,
        max_quality = analytics.max_quality,
        below_threshold = analytics.min_quality < f64::from(token::MIN_QUALITY_SCORE),
        total_tokens = %analytics.total_tokens.round_dp(token::DECIMALS),
        mean_efficiency = analytics.mean_efficiency,
        "processing analytics"
    );
    for (i, total) in analytics.cumulative_co2.iter().enumerate() {
        tracing::debug!(batch = i + 1, cumulative_co2_t = %total, "sequestration");
    }
}
