//! ClusterMesh connectivity command

use crate::cli::{ClusterMeshArgs, OutputFormat};
use crate::client::{create_client, KubeStatusClient, StatusClient};
use crate::config::AppConfig;
use crate::defaults;
use crate::error::{Result, StatusError};
use crate::output::{colorize_ready, format_structured, format_table_raw, print_text};
use crate::status::{ClusterMeshAgentConnectivityStatus, K8sStatusCollector, StatusParameters};
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Connectivity of every running agent (or KVStoreMesh instance), keyed by pod
pub async fn collect_connectivity(
    client: Arc<dyn StatusClient>,
    namespace: &str,
    args: &ClusterMeshArgs,
) -> Result<BTreeMap<String, ClusterMeshAgentConnectivityStatus>> {
    let selector = if args.kvstoremesh {
        defaults::CLUSTERMESH_POD_SELECTOR
    } else {
        defaults::AGENT_POD_SELECTOR
    };

    let pods: Vec<String> = client
        .list_pods(Some(namespace), Some(selector))
        .await?
        .into_iter()
        .filter(|p| p.status.as_ref().and_then(|s| s.phase.as_deref()) == Some("Running"))
        .filter_map(|p| p.metadata.name)
        .collect();
    if pods.is_empty() {
        return Err(StatusError::NoPods);
    }

    let params = StatusParameters {
        namespace: namespace.to_string(),
        wait_duration: args.wait_duration.unwrap_or_default(),
        ..Default::default()
    };
    let collector = K8sStatusCollector::new(client, params);

    let results = join_all(pods.iter().map(|pod| {
        let collector = &collector;
        async move {
            if args.kvstoremesh {
                collector.kvstore_mesh_connectivity(pod).await
            } else {
                collector.cluster_mesh_connectivity(pod).await
            }
        }
    }))
    .await;

    Ok(pods
        .into_iter()
        .zip(results)
        .map(|(pod, result)| {
            let status = result.unwrap_or_else(|e| {
                let mut status = ClusterMeshAgentConnectivityStatus::default();
                status
                    .errors
                    .entry(pod.clone())
                    .or_default()
                    .errors
                    .push(e.to_string());
                status
            });
            (pod, status)
        })
        .collect())
}

/// Table rows: one per (pod, remote cluster), plus one per pod error
pub fn connectivity_rows(
    report: &BTreeMap<String, ClusterMeshAgentConnectivityStatus>,
) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for (pod, status) in report {
        for cluster in status.clusters.values() {
            rows.push(vec![
                pod.clone(),
                cluster.name.clone(),
                colorize_ready(cluster.ready),
                cluster.status.clone(),
                cluster.num_nodes.to_string(),
                cluster.num_endpoints.to_string(),
                cluster.num_failures.to_string(),
                status.global_services.to_string(),
            ]);
        }
        for err in status.errors.values().flat_map(|c| c.errors.iter()) {
            rows.push(vec![
                pod.clone(),
                "-".to_string(),
                colorize_ready(false),
                err.clone(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
            ]);
        }
    }
    rows
}

/// Execute the clustermesh command
pub async fn run_clustermesh(
    context: Option<&str>,
    namespace: &str,
    args: &ClusterMeshArgs,
    output: OutputFormat,
    config: &AppConfig,
) -> Result<()> {
    let client = Arc::new(KubeStatusClient::new(create_client(context).await?));
    let report = collect_connectivity(client, namespace, args).await?;

    match format_structured(&report, output)? {
        Some(text) => println!("{text}"),
        None => {
            let headers = [
                "POD",
                "CLUSTER",
                "READY",
                "STATUS",
                "NODES",
                "ENDPOINTS",
                "FAILURES",
                "GLOBAL SERVICES",
            ];
            print_text(&format_table_raw(&headers, &connectivity_rows(&report)), config.colors);
        }
    }

    let not_ready: usize = report.values().map(|s| s.not_ready().len()).sum();
    if not_ready > 0 {
        return Err(StatusError::NotReady(format!(
            "{not_ready} remote cluster connections are not ready"
        )));
    }
    Ok(())
}
