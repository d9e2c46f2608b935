//! Status command implementation

use crate::cli::{OutputFormat, StatusArgs};
use crate::client::{create_client, KubeStatusClient};
use crate::config::AppConfig;
use crate::defaults;
use crate::error::Result;
use crate::output::{format_structured, print_text};
use crate::status::{K8sStatusCollector, Status, StatusParameters};
use std::sync::Arc;
use tracing::info;

/// Build collector parameters from flags layered over the config file
pub fn status_parameters(
    namespace: &str,
    args: &StatusArgs,
    output: OutputFormat,
    config: &AppConfig,
) -> Result<StatusParameters> {
    let wait_duration = match args.wait_duration {
        Some(d) => d,
        None => config.wait_duration()?.unwrap_or_default(),
    };

    Ok(StatusParameters {
        namespace: namespace.to_string(),
        wait: args.wait,
        wait_duration,
        warning_free_pods: args.warning_free_pods.clone(),
        ignore_warnings: args.ignore_warnings,
        worker_count: args
            .worker_count
            .or(config.worker_count)
            .unwrap_or(defaults::WORKER_COUNT),
        output: output.into(),
        helm_release_name: args
            .helm_release_name
            .clone()
            .or_else(|| config.helm_release_name.clone())
            .unwrap_or_else(|| defaults::HELM_RELEASE_NAME.to_string()),
        interactive: args.interactive,
        verbose: args.verbose_logs,
    })
}

/// Execute the status command
pub async fn run_status(
    context: Option<&str>,
    namespace: &str,
    args: &StatusArgs,
    output: OutputFormat,
    config: &AppConfig,
) -> Result<()> {
    let params = status_parameters(namespace, args, output, config)?;
    info!(namespace, wait = params.wait, "collecting Cilium status");

    let client = create_client(context).await?;
    let collector = K8sStatusCollector::new(Arc::new(KubeStatusClient::new(client)), params);

    match collector.status().await {
        Ok(status) => print_status(&status, output, config.colors),
        Err(e) => {
            // still show what was collected before the wait gave up
            if let Some(last) = e.last_status() {
                print_status(last, output, config.colors)?;
            }
            Err(e)
        }
    }
}

fn print_status(status: &Status, output: OutputFormat, colors: bool) -> Result<()> {
    match format_structured(status, output)? {
        Some(text) => println!("{text}"),
        None => print_text(&status.format(), colors),
    }
    Ok(())
}
