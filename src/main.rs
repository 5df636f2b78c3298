use banter::core::config;
use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "banter", about = "Terminal chat client for an Nhost/Hasura chat backend")]
struct Args {
    /// Backend project subdomain (overrides config file and NHOST_SUBDOMAIN)
    #[arg(short, long)]
    subdomain: Option<String>,

    /// Backend project region (overrides config file and NHOST_REGION)
    #[arg(short, long)]
    region: Option<String>,

    /// Explicit GraphQL endpoint, e.g. for a local backend
    #[arg(long)]
    graphql_url: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // File logger - writes to banter.log in the current directory. The
    // terminal itself belongs to the TUI.
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("banter.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        eprintln!("{e}");
        std::process::exit(1);
    });
    let overrides = config::CliOverrides {
        subdomain: args.subdomain,
        region: args.region,
        graphql_url: args.graphql_url,
    };
    let resolved = config::resolve(&file_config, &overrides).unwrap_or_else(|e| {
        eprintln!("{e}");
        std::process::exit(1);
    });

    log::info!("Banter starting up against {}", resolved.graphql_url);
    banter::tui::run(resolved)
}
