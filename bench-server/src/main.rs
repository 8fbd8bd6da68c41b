use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use bench_core::config::BenchConfig;
use bench_server::logging::{init_logging, LoggingConfig};
use bench_server::{build_router, AppState};

/// Scanner-bait fixture server - deliberately vulnerable endpoints for
/// grading static-analysis and DAST tools
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1")]
    listen: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8008)]
    port: u16,

    /// Properties file (benchmark.properties format)
    #[arg(long, default_value = "benchmark.properties")]
    properties: PathBuf,

    /// Directory for test artifacts (overrides the properties file)
    #[arg(long)]
    testfiles_dir: Option<String>,

    /// Optional log file (logs go to stdout when unset)
    #[arg(long)]
    log_file: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let logging = LoggingConfig {
        log_file: args.log_file.clone(),
        ..LoggingConfig::default()
    };
    let _guard = init_logging(&logging)?;

    let mut config = BenchConfig::from_properties_file(&args.properties)?;
    config.listen_address = args.listen.clone();
    config.listen_port = args.port;
    if let Some(dir) = args.testfiles_dir {
        config.testfiles_dir = dir;
    }

    let addr = config.listen_addr();
    let state = AppState::from_config(config.clone()).await?;
    let app = build_router(state);

    let listener = TcpListener::bind(&addr).await?;

    println!("🎯 Scanner-bait fixture server running on http://{addr}");
    println!("   🔐 Weak crypto: /crypto/cookie, /crypto/param, /crypto/stream");
    println!("   🎲 Weak randomness: /weakrand/remember-me/:id");
    println!("   💉 SQL injection: /sqli/user-lookup");
    println!("   📄 Password file: {}/passwordFile.txt", config.testfiles_dir);
    println!("   🔧 Cipher (cryptoAlg1): {}", config.crypto_alg1);
    println!();
    println!("💡 Tip: Use --help to see all available options");

    axum::serve(listener, app).await?;
    Ok(())
}
