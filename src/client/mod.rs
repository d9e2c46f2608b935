//! Kubernetes client abstraction
//!
//! [`StatusClient`] is everything the status collector needs from a
//! cluster. [`KubeStatusClient`] implements it on top of `kube`.

pub mod helm;
mod kube_client;

pub use kube_client::KubeStatusClient;

use crate::error::{Result, StatusError};
use crate::status::models::{Endpoint, RemoteCluster, StatusResponse};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment};
use k8s_openapi::api::core::v1::{ConfigMap, Pod};
use kube::api::DynamicObject;
use kube::{config::KubeConfigOptions, Client, Config};

/// Read-only cluster queries used to build a status report
#[async_trait]
pub trait StatusClient: Send + Sync {
    /// `cilium-dbg status` of the agent running in `pod`
    async fn cilium_status(&self, namespace: &str, pod: &str) -> Result<StatusResponse>;

    /// Remote clusters known to the KVStoreMesh sidecar of `pod`
    async fn kvstoremesh_status(&self, namespace: &str, pod: &str) -> Result<Vec<RemoteCluster>>;

    /// Endpoints managed by the agent running in `pod`
    async fn cilium_endpoints(&self, namespace: &str, pod: &str) -> Result<Vec<Endpoint>>;

    async fn get_config_map(&self, namespace: &str, name: &str) -> Result<ConfigMap>;

    /// `None` when the DaemonSet does not exist
    async fn get_daemon_set(&self, namespace: &str, name: &str) -> Result<Option<DaemonSet>>;

    /// `None` when the Deployment does not exist
    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Option<Deployment>>;

    /// List pods in `namespace` (all namespaces when `None`)
    async fn list_pods(&self, namespace: Option<&str>, selector: Option<&str>) -> Result<Vec<Pod>>;

    /// List CiliumEndpoints, `None` when the CRD is not registered
    async fn list_cilium_endpoints(
        &self,
        namespace: Option<&str>,
    ) -> Result<Option<Vec<DynamicObject>>>;

    async fn container_logs(
        &self,
        namespace: &str,
        pod: &str,
        container: &str,
        since: DateTime<Utc>,
        previous: bool,
    ) -> Result<String>;

    /// Chart version of the latest revision of a Helm release
    async fn helm_chart_version(&self, namespace: &str, release: &str) -> Result<String>;
}

/// Create a Kubernetes client for the specified context
pub async fn create_client(context: Option<&str>) -> Result<Client> {
    let config = load_config(context).await?;
    Client::try_from(config).map_err(StatusError::from)
}

/// Load Kubernetes configuration, falling back to the in-cluster config
async fn load_config(context: Option<&str>) -> Result<Config> {
    if context.is_none() {
        return Config::infer()
            .await
            .map_err(|e| StatusError::Config(format!("Failed to infer kubeconfig: {e}")));
    }

    let options = KubeConfigOptions {
        context: context.map(String::from),
        ..Default::default()
    };

    Config::from_kubeconfig(&options)
        .await
        .map_err(|e| StatusError::Config(format!("Failed to load kubeconfig: {e}")))
}
