use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use logwarden_client::{
    unescape_markup, AnalysisClient, CyclePhase, DashboardSession, NotifyLevel, RenderPlan,
    ResultBody, StatsView,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "logwarden", about = "Security log analysis CLI", version)]
struct Cli {
    /// Analysis server base URL (defaults to LOGWARDEN_SERVER or http://127.0.0.1:8080).
    #[arg(short, long)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze log text and print the threat report.
    Analyze {
        /// File to read logs from; stdin when omitted.
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Fetch server-generated sample logs and analyze them.
    Sample,

    /// Show model stats.
    Stats,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let server = cli.server.unwrap_or_else(|| {
        std::env::var("LOGWARDEN_SERVER").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string())
    });

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to start runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let client = AnalysisClient::new(server);
    let result = runtime.block_on(async {
        match cli.command {
            Commands::Analyze { file } => cmd_analyze(client, file).await,
            Commands::Sample => cmd_sample(client).await,
            Commands::Stats => cmd_stats(client).await,
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(1)
        }
    }
}

async fn cmd_analyze(client: AnalysisClient, file: Option<PathBuf>) -> Result<(), String> {
    let logs = match file {
        Some(path) => std::fs::read_to_string(&path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("failed to read stdin: {e}"))?;
            buf
        }
    };

    let mut session = DashboardSession::new(client);
    session.set_input(logs);
    run_submission(&mut session).await
}

async fn cmd_sample(client: AnalysisClient) -> Result<(), String> {
    let mut session = DashboardSession::new(client);

    let note = session.load_samples().await;
    if note.level == NotifyLevel::Danger {
        return Err(note.message);
    }
    println!("== sample logs ==");
    println!("{}", session.input());
    println!();

    run_submission(&mut session).await
}

async fn cmd_stats(client: AnalysisClient) -> Result<(), String> {
    match client.fetch_stats().await {
        StatsView::Ready(stats) => {
            println!("features:      {}", stats.feature_count);
            println!("estimators:    {}", stats.rf_estimators);
            println!("feature names: {}", stats.feature_names.join(", "));
            Ok(())
        }
        StatsView::Training => {
            println!("model is still training; try again shortly");
            Ok(())
        }
        StatsView::Unavailable => Err("stats endpoint unreachable".to_string()),
    }
}

async fn run_submission(session: &mut DashboardSession) -> Result<(), String> {
    println!("analyzing...");
    let note = session.submit().await;
    debug_assert_eq!(session.phase(), CyclePhase::Idle);

    if note.level == NotifyLevel::Danger {
        return Err(note.message);
    }
    match session.displayed() {
        Some(plan) => {
            print_plan(plan);
            Ok(())
        }
        None => Err(note.message),
    }
}

fn print_plan(plan: &RenderPlan) {
    println!("logs analyzed:    {}", plan.total_logs);
    println!("threats detected: {}", plan.threats_detected);
    println!(
        "risk score:       {} ({})",
        plan.risk_score,
        plan.risk_tier.label()
    );
    println!();

    match &plan.body {
        ResultBody::AllClear => {
            println!("no threats detected - logs appear normal");
        }
        ResultBody::Threats { cards, distribution } => {
            println!("threat distribution:");
            for (category, count) in distribution {
                println!("  {category}: {count}");
            }
            println!();
            for (i, card) in cards.iter().enumerate() {
                let anomaly = if card.is_anomaly { " [anomaly]" } else { "" };
                println!(
                    "#{} {} ({}% confidence){anomaly}",
                    i + 1,
                    card.category_display,
                    card.confidence_percent
                );
                println!("   time:   {}", card.timestamp);
                println!("   source: {}", card.source_ip);
                // Cards carry markup-escaped text; the terminal wants it raw.
                println!("   log:    {}", unescape_markup(&card.log_escaped));
            }
        }
    }
}
