//! Well-known names and timings of a Cilium installation

use std::time::Duration;

pub const NAMESPACE: &str = "kube-system";

pub const AGENT_DAEMONSET_NAME: &str = "cilium";
pub const AGENT_CONTAINER_NAME: &str = "cilium-agent";
pub const AGENT_POD_SELECTOR: &str = "k8s-app=cilium";

pub const ENVOY_DAEMONSET_NAME: &str = "cilium-envoy";
pub const ENVOY_POD_SELECTOR: &str = "name=cilium-envoy";

pub const OPERATOR_DEPLOYMENT_NAME: &str = "cilium-operator";
pub const OPERATOR_CONTAINER_NAME: &str = "cilium-operator";
pub const OPERATOR_POD_SELECTOR: &str = "io.cilium/app=operator";

pub const RELAY_DEPLOYMENT_NAME: &str = "hubble-relay";
pub const RELAY_CONTAINER_NAME: &str = "hubble-relay";
pub const RELAY_POD_SELECTOR: &str = "k8s-app=hubble-relay";

pub const HUBBLE_UI_DEPLOYMENT_NAME: &str = "hubble-ui";
pub const HUBBLE_UI_POD_SELECTOR: &str = "k8s-app=hubble-ui";

pub const CLUSTERMESH_DEPLOYMENT_NAME: &str = "clustermesh-apiserver";
pub const CLUSTERMESH_CONTAINER_NAME: &str = "apiserver";
pub const CLUSTERMESH_POD_SELECTOR: &str = "k8s-app=clustermesh-apiserver";
pub const KVSTOREMESH_CONTAINER_NAME: &str = "kvstoremesh";

pub const CONFIG_MAP_NAME: &str = "cilium-config";

/// Annotations on the agent ConfigMap carrying configuration errors
pub const CONFIG_ANNOTATION_PREFIX: &str = "config.cilium.io";

pub const HELM_RELEASE_NAME: &str = "cilium";

/// Maximum number of concurrent status queries
pub const WORKER_COUNT: usize = 5;

pub const WAIT_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const WAIT_RETRY_INTERVAL: Duration = Duration::from_secs(2);

/// How far before the last container termination to start pulling logs
pub const LOG_LOOKBACK: Duration = Duration::from_secs(2 * 60);
