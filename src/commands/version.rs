//! Version command implementation
//!
//! Shows the client version, the Helm chart version of the installation and
//! the images its agent and operator run.

use crate::cli::{OutputFormat, VersionArgs};
use crate::client::{create_client, KubeStatusClient, StatusClient};
use crate::config::AppConfig;
use crate::defaults;
use crate::error::Result;
use crate::output::{format_structured, print_text};
use k8s_openapi::api::core::v1::PodTemplateSpec;
use owo_colors::OwoColorize;
use serde::Serialize;

/// Versions reported by the version command
#[derive(Debug, Clone, Default, Serialize)]
pub struct VersionInfo {
    pub client: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub helm_chart: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub agent_images: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub operator_images: Vec<String>,
}

fn template_images(template: &PodTemplateSpec) -> Vec<String> {
    template
        .spec
        .iter()
        .flat_map(|s| s.containers.iter())
        .filter_map(|c| c.image.clone())
        .collect()
}

/// Gather installation versions, missing pieces are left empty
pub async fn cluster_versions(
    client: &dyn StatusClient,
    namespace: &str,
    release: &str,
) -> Result<VersionInfo> {
    let mut info = VersionInfo {
        client: env!("CARGO_PKG_VERSION").to_string(),
        ..Default::default()
    };

    info.helm_chart = client.helm_chart_version(namespace, release).await.ok();

    if let Some(ds) = client
        .get_daemon_set(namespace, defaults::AGENT_DAEMONSET_NAME)
        .await?
    {
        if let Some(spec) = &ds.spec {
            info.agent_images = template_images(&spec.template);
        }
    }

    if let Some(d) = client
        .get_deployment(namespace, defaults::OPERATOR_DEPLOYMENT_NAME)
        .await?
    {
        if let Some(spec) = &d.spec {
            info.operator_images = template_images(&spec.template);
        }
    }

    Ok(info)
}

/// Execute the version command
pub async fn run_version(
    context: Option<&str>,
    namespace: &str,
    args: &VersionArgs,
    output: OutputFormat,
    config: &AppConfig,
) -> Result<()> {
    let info = if args.client {
        VersionInfo {
            client: env!("CARGO_PKG_VERSION").to_string(),
            ..Default::default()
        }
    } else {
        let client = KubeStatusClient::new(create_client(context).await?);
        let release = args
            .helm_release_name
            .clone()
            .or_else(|| config.helm_release_name.clone())
            .unwrap_or_else(|| defaults::HELM_RELEASE_NAME.to_string());
        cluster_versions(&client, namespace, &release).await?
    };

    match format_structured(&info, output)? {
        Some(text) => println!("{text}"),
        None => print_text(&format_version(&info), config.colors),
    }
    Ok(())
}

fn format_version(info: &VersionInfo) -> String {
    let name = env!("CARGO_PKG_NAME");
    let mut out = format!("{} version {}\n", name.bold(), info.client.green());

    if let Some(chart) = &info.helm_chart {
        out.push_str(&format!("Helm chart version: {}\n", chart.cyan()));
    }
    for image in &info.agent_images {
        out.push_str(&format!("Agent image:        {image}\n"));
    }
    for image in &info.operator_images {
        out.push_str(&format!("Operator image:     {image}\n"));
    }

    out.trim_end().to_string()
}
