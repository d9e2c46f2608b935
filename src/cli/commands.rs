//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::status::StatusOutput;

#[derive(Parser)]
#[command(
    name = "cilium-status",
    version,
    about = "Aggregated Kubernetes status of a Cilium installation",
    long_about = None,
)]
pub struct Cli {
    /// Kubernetes context to use
    #[arg(long, global = true, env = "CILIUM_STATUS_CONTEXT")]
    pub context: Option<String>,

    /// Namespace Cilium is running in
    #[arg(short = 'n', long, global = true, env = "CILIUM_NAMESPACE")]
    pub namespace: Option<String>,

    /// Output format
    #[arg(short = 'o', long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Summary,
    Json,
    Yaml,
}

impl From<OutputFormat> for StatusOutput {
    fn from(o: OutputFormat) -> Self {
        match o {
            OutputFormat::Summary => StatusOutput::Summary,
            OutputFormat::Json => StatusOutput::Json,
            OutputFormat::Yaml => StatusOutput::Yaml,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Display the status of the Cilium installation
    #[command(alias = "st")]
    Status(StatusArgs),

    /// Display ClusterMesh connectivity of every agent
    #[command(alias = "cm")]
    Clustermesh(ClusterMeshArgs),

    /// Display client, Helm chart and image versions
    Version(VersionArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    /// Wait for the status to report success (no errors)
    #[arg(long)]
    pub wait: bool,

    /// Maximum time to wait for the status, e.g. 5m
    #[arg(long, value_parser = humantime::parse_duration)]
    pub wait_duration: Option<Duration>,

    /// Components required to be free of warnings (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub warning_free_pods: Vec<String>,

    /// Ignore warnings when waiting for the status to report success
    #[arg(long)]
    pub ignore_warnings: bool,

    /// Number of workers used to collect the status
    #[arg(long)]
    pub worker_count: Option<usize>,

    /// Helm release name
    #[arg(long)]
    pub helm_release_name: Option<String>,

    /// Refresh the summary after each retry while waiting
    #[arg(long)]
    pub interactive: bool,

    /// Keep every error line of collected container logs
    #[arg(long)]
    pub verbose_logs: bool,
}

#[derive(Args, Debug, Default)]
pub struct ClusterMeshArgs {
    /// Query the KVStoreMesh sidecars of the clustermesh-apiserver instead of the agents
    #[arg(long)]
    pub kvstoremesh: bool,

    /// Maximum time to wait for each agent, e.g. 1m
    #[arg(long, value_parser = humantime::parse_duration)]
    pub wait_duration: Option<Duration>,
}

#[derive(Args, Debug, Default)]
pub struct VersionArgs {
    /// Only print the client version
    #[arg(long)]
    pub client: bool,

    /// Helm release name
    #[arg(long)]
    pub helm_release_name: Option<String>,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
