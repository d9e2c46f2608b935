//! [`StatusClient`] backed by the Kubernetes API

use super::helm;
use super::StatusClient;
use crate::defaults;
use crate::error::{Result, StatusError};
use crate::status::models::{Endpoint, RemoteCluster, StatusResponse};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment};
use k8s_openapi::api::core::v1::{ConfigMap, Pod, Secret};
use kube::api::{ApiResource, AttachParams, DynamicObject, GroupVersionKind, ListParams, LogParams};
use kube::{Api, Client};
use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

const STATUS_COMMAND: &[&str] = &["cilium-dbg", "status", "-o", "json"];
const ENDPOINT_LIST_COMMAND: &[&str] = &["cilium-dbg", "endpoint", "list", "-o", "json"];
const KVSTOREMESH_STATUS_COMMAND: &[&str] = &["kvstoremesh-dbg", "status", "-o", "json"];

/// Status queries against a live cluster
#[derive(Clone)]
pub struct KubeStatusClient {
    client: Client,
}

impl KubeStatusClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn pods(&self, namespace: Option<&str>) -> Api<Pod> {
        match namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        }
    }

    /// Run `command` in a container and parse its stdout as JSON
    async fn exec_json<T: DeserializeOwned>(
        &self,
        namespace: &str,
        pod: &str,
        container: &str,
        command: &[&str],
    ) -> Result<T> {
        debug!(namespace, pod, container, command = ?command, "exec");

        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let params = AttachParams::default()
            .container(container)
            .stdout(true)
            .stderr(true);
        let mut attached = api.exec(pod, command.iter().copied(), &params).await?;

        let exec_err = |message: String| StatusError::Exec {
            pod: pod.to_string(),
            container: container.to_string(),
            message,
        };

        let stdout = attached.stdout();
        let stderr = attached.stderr();
        let status = attached.take_status();
        let (out, err) = tokio::join!(read_to_string(stdout), read_to_string(stderr));
        let out = out?;
        let err = err?;

        if let Some(status) = status {
            if let Some(status) = status.await {
                if status.status.as_deref() == Some("Failure") {
                    let message = if err.trim().is_empty() {
                        status.message.unwrap_or_default()
                    } else {
                        err.trim().to_string()
                    };
                    return Err(exec_err(message));
                }
            }
        }

        attached
            .join()
            .await
            .map_err(|e| exec_err(e.to_string()))?;

        serde_json::from_str(&out).map_err(|e| exec_err(format!("unable to parse output: {e}")))
    }
}

async fn read_to_string<R: AsyncRead + Unpin>(reader: Option<R>) -> Result<String> {
    let mut buf = String::new();
    if let Some(mut reader) = reader {
        reader.read_to_string(&mut buf).await?;
    }
    Ok(buf)
}

#[async_trait]
impl StatusClient for KubeStatusClient {
    async fn cilium_status(&self, namespace: &str, pod: &str) -> Result<StatusResponse> {
        self.exec_json(namespace, pod, defaults::AGENT_CONTAINER_NAME, STATUS_COMMAND)
            .await
    }

    async fn kvstoremesh_status(&self, namespace: &str, pod: &str) -> Result<Vec<RemoteCluster>> {
        self.exec_json(
            namespace,
            pod,
            defaults::KVSTOREMESH_CONTAINER_NAME,
            KVSTOREMESH_STATUS_COMMAND,
        )
        .await
    }

    async fn cilium_endpoints(&self, namespace: &str, pod: &str) -> Result<Vec<Endpoint>> {
        self.exec_json(
            namespace,
            pod,
            defaults::AGENT_CONTAINER_NAME,
            ENDPOINT_LIST_COMMAND,
        )
        .await
    }

    async fn get_config_map(&self, namespace: &str, name: &str) -> Result<ConfigMap> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get(name).await?)
    }

    async fn get_daemon_set(&self, namespace: &str, name: &str) -> Result<Option<DaemonSet>> {
        let api: Api<DaemonSet> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get_opt(name).await?)
    }

    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Option<Deployment>> {
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get_opt(name).await?)
    }

    async fn list_pods(&self, namespace: Option<&str>, selector: Option<&str>) -> Result<Vec<Pod>> {
        let mut params = ListParams::default();
        if let Some(selector) = selector {
            params = params.labels(selector);
        }
        Ok(self.pods(namespace).list(&params).await?.items)
    }

    async fn list_cilium_endpoints(
        &self,
        namespace: Option<&str>,
    ) -> Result<Option<Vec<DynamicObject>>> {
        let gvk = GroupVersionKind::gvk("cilium.io", "v2", "CiliumEndpoint");
        let resource = ApiResource::from_gvk(&gvk);
        let api: Api<DynamicObject> = match namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &resource),
            None => Api::all_with(self.client.clone(), &resource),
        };

        match api.list(&ListParams::default()).await {
            Ok(list) => Ok(Some(list.items)),
            Err(kube::Error::Api(resp)) if resp.code == 404 => {
                debug!("CiliumEndpoint CRD is not registered");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn container_logs(
        &self,
        namespace: &str,
        pod: &str,
        container: &str,
        since: DateTime<Utc>,
        previous: bool,
    ) -> Result<String> {
        let since_seconds = (Utc::now() - since).num_seconds().max(1);
        let params = LogParams {
            container: Some(container.to_string()),
            previous,
            since_seconds: Some(since_seconds),
            ..Default::default()
        };
        Ok(self.pods(Some(namespace)).logs(pod, &params).await?)
    }

    async fn helm_chart_version(&self, namespace: &str, release: &str) -> Result<String> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let params = ListParams::default().labels(&helm::release_selector(release));
        let secrets = api.list(&params).await?.items;

        let latest = helm::latest_revision(&secrets)
            .ok_or_else(|| StatusError::Helm(format!("release {release}: not found")))?;
        let decoded = helm::release_from_secret(latest)?;

        decoded
            .chart_version()
            .map(String::from)
            .ok_or_else(|| StatusError::Helm(format!("release {release} has no chart metadata")))
    }
}
