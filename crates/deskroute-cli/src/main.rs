use clap::Parser;
use deskroute_cli::cli::{Cli, Commands};
use deskroute_cli::commands::{ask, eval, feedback, stats, train};
use deskroute_router::DeskConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    let config = DeskConfig::load(&cli.config, &cli.overrides())?;
    tracing::debug!("Configuration: {:?}", config);

    match cli.command {
        Commands::Train {
            data,
            alpha,
            max_features,
            ..
        } => {
            let summary = train::run(&config, &data, alpha, max_features)?;
            train::print(&summary);
        }
        Commands::Ask { query, json, .. } => {
            let route = ask::run(&config, &query)?;
            ask::print(&route, json)?;
        }
        Commands::Eval { cases } => {
            let report = eval::run(&config, cases.as_deref())?;
            eval::print(&report);
        }
        Commands::Feedback { query, useful, .. } => {
            let record = feedback::run(&config, &query, useful)?;
            feedback::print(&record);
        }
        Commands::Stats => {
            let report = stats::run(&config)?;
            stats::print(&report);
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("deskroute=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("deskroute=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
