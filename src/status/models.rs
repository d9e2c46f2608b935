//! Agent API models
//!
//! Subset of the JSON documents printed by `cilium-dbg status -o json`,
//! `cilium-dbg endpoint list -o json` and `kvstoremesh-dbg status -o json`.
//! Only the fields the status report reads are modelled, everything else
//! is ignored on deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State reported by the agent for itself and its subsystems
pub const STATE_OK: &str = "Ok";
pub const STATE_WARNING: &str = "Warning";
pub const STATE_FAILURE: &str = "Failure";
pub const STATE_DISABLED: &str = "Disabled";

/// Endpoint states that need attention
pub const ENDPOINT_STATE_INVALID: &str = "invalid";
pub const ENDPOINT_STATE_NOT_READY: &str = "not-ready";

/// Agent status response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct StatusResponse {
    pub cilium: Option<ComponentStatus>,
    pub kvstore: Option<ComponentStatus>,
    pub kubernetes: Option<ComponentStatus>,
    pub container_runtime: Option<ComponentStatus>,
    pub controllers: Vec<ControllerStatus>,
    pub cluster_mesh: Option<ClusterMeshStatus>,
}

/// State of a single agent subsystem
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ComponentStatus {
    pub state: String,
    pub msg: String,
}

impl ComponentStatus {
    pub fn new(state: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            msg: msg.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ControllerStatus {
    pub name: String,
    pub status: Option<ControllerRunStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ControllerRunStatus {
    pub consecutive_failure_count: i64,
    pub failure_count: i64,
    pub success_count: i64,
    pub last_failure_msg: String,
    pub last_failure_timestamp: Option<DateTime<Utc>>,
    pub last_success_timestamp: Option<DateTime<Utc>>,
}

/// ClusterMesh state as seen by one agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ClusterMeshStatus {
    pub clusters: Vec<RemoteCluster>,
    pub num_global_services: i64,
}

/// Connectivity to a single remote cluster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RemoteCluster {
    pub name: String,
    pub ready: bool,
    pub status: String,
    pub num_nodes: i64,
    pub num_endpoints: i64,
    pub num_identities: i64,
    pub num_shared_services: i64,
    pub num_failures: i64,
    pub last_failure: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Endpoint {
    pub id: i64,
    pub status: Option<EndpointStatus>,
}

impl Endpoint {
    /// Endpoint state, empty when the agent did not report one
    pub fn state(&self) -> &str {
        self.status.as_ref().map(|s| s.state.as_str()).unwrap_or("")
    }

    /// `namespace/pod` of the workload behind this endpoint, if known
    pub fn pod_name(&self) -> Option<String> {
        let ids = self.status.as_ref()?.external_identifiers.as_ref()?;
        match (&ids.k8s_namespace, &ids.k8s_pod_name) {
            (Some(ns), Some(pod)) => Some(format!("{ns}/{pod}")),
            (None, Some(pod)) => Some(pod.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EndpointStatus {
    pub state: String,
    pub identity: Option<EndpointIdentity>,
    pub external_identifiers: Option<EndpointIdentifiers>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EndpointIdentity {
    pub id: i64,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EndpointIdentifiers {
    pub k8s_namespace: Option<String>,
    pub k8s_pod_name: Option<String>,
    pub container_id: Option<String>,
}
