//! Cilium installation status
//!
//! Collects the state of the agent DaemonSet, the Envoy DaemonSet, the
//! operator, Hubble and ClusterMesh Deployments, their pods and the agents
//! themselves into a single [`Status`] report.

pub mod collector;
pub mod format;
pub mod models;
pub mod pool;
pub mod types;

pub use collector::{
    ClusterMeshAgentConnectivityStatus, K8sStatusCollector, StatusOutput, StatusParameters,
};
pub use types::*;
