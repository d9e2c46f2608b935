//! cilium-status - Aggregated Kubernetes status of a Cilium installation

use anyhow::Result;
use cilium_status::cli::{Cli, Command};
use cilium_status::{commands, config, defaults};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    let mut config = config::load_config()?;
    if cli.no_color {
        config.colors = false;
    }

    let output = cli.output.unwrap_or(config.default_output);
    let namespace = cli
        .namespace
        .clone()
        .or_else(|| config.namespace.clone())
        .unwrap_or_else(|| defaults::NAMESPACE.to_string());
    let context = cli.context.as_deref();

    let result = match cli.command {
        Command::Status(ref args) => {
            commands::run_status(context, &namespace, args, output, &config).await
        }
        Command::Clustermesh(ref args) => {
            commands::run_clustermesh(context, &namespace, args, output, &config).await
        }
        Command::Version(ref args) => {
            commands::run_version(context, &namespace, args, output, &config).await
        }
        Command::Completions(ref args) => {
            generate_completions(args.shell);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn setup_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;

    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "cilium-status", &mut std::io::stdout());
}
