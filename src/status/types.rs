//! Status report types
//!
//! [`Status`] is the shared report every collection task writes into.
//! Errors and warnings are aggregated per component (DaemonSet or
//! Deployment name) and per pod.

use super::models::{
    Endpoint, StatusResponse, ENDPOINT_STATE_INVALID, ENDPOINT_STATE_NOT_READY, STATE_FAILURE,
    STATE_OK, STATE_WARNING,
};
use crate::error::Result;
use k8s_openapi::api::core::v1::Pod;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pod phase names as reported by the API server
pub const PHASE_PENDING: &str = "Pending";
pub const PHASE_RUNNING: &str = "Running";
pub const PHASE_FAILED: &str = "Failed";

/// Count of occurrences per key (pod phase, container image)
pub type MapCount = BTreeMap<String, usize>;

/// Replica counts of a DaemonSet or Deployment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodStateCount {
    #[serde(rename = "type")]
    pub kind: String,
    pub desired: i64,
    pub ready: i64,
    pub available: i64,
    pub unavailable: i64,
}

impl PodStateCount {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }
}

/// Number of workload pods in the cluster and how many Cilium manages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodsCount {
    pub all: usize,
    pub by_cilium: usize,
}

/// Errors and warnings collected for one pod of one component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCount {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub disabled: bool,
}

/// pod -> findings
pub type ErrorCountMap = BTreeMap<String, ErrorCount>;

/// Aggregated status of a Cilium installation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    /// component -> image -> count
    pub image_count: BTreeMap<String, MapCount>,
    /// component -> phase -> count
    pub phase_count: BTreeMap<String, MapCount>,
    pub pod_state: BTreeMap<String, PodStateCount>,
    pub pods_count: PodsCount,
    /// agent pod -> `cilium-dbg status` response
    pub cilium_status: BTreeMap<String, Option<StatusResponse>>,
    /// agent pod -> endpoints managed by that agent
    pub cilium_endpoints: BTreeMap<String, Option<Vec<Endpoint>>>,
    /// component -> pod -> findings
    pub errors: BTreeMap<String, ErrorCountMap>,
    pub collection_errors: Vec<String>,
    pub helm_chart_version: String,
    pub config_errors: Vec<String>,
}

impl Status {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the findings for `pod` of `component`
    pub fn aggregated_error_count(&mut self, component: &str, pod: &str) -> &mut ErrorCount {
        self.errors
            .entry(component.to_string())
            .or_default()
            .entry(pod.to_string())
            .or_default()
    }

    pub fn set_disabled(&mut self, component: &str, pod: &str, disabled: bool) {
        self.aggregated_error_count(component, pod).disabled = disabled;
    }

    pub fn add_aggregated_error(&mut self, component: &str, pod: &str, msg: impl Into<String>) {
        self.aggregated_error_count(component, pod)
            .errors
            .push(msg.into());
    }

    pub fn add_aggregated_warning(&mut self, component: &str, pod: &str, msg: impl Into<String>) {
        self.aggregated_error_count(component, pod)
            .warnings
            .push(msg.into());
    }

    /// Record a failure to gather part of the status
    pub fn collection_error(&mut self, msg: impl Into<String>) {
        self.collection_errors.push(msg.into());
    }

    pub fn total_errors(&self) -> usize {
        self.errors
            .values()
            .flat_map(|pods| pods.values())
            .map(|c| c.errors.len())
            .sum()
    }

    pub fn total_warnings(&self) -> usize {
        self.errors
            .values()
            .flat_map(|pods| pods.values())
            .map(|c| c.warnings.len())
            .sum()
    }

    /// Whether every pod entry of `component` is marked disabled
    pub fn is_disabled(&self, component: &str) -> bool {
        self.errors
            .get(component)
            .is_some_and(|pods| !pods.is_empty() && pods.values().all(|c| c.disabled))
    }

    /// Count phases and images of `pods` and flag pending or failed ones
    pub fn record_pods(&mut self, component: &str, pods: &[Pod]) {
        let mut phases = MapCount::new();
        let mut images = MapCount::new();

        for pod in pods {
            let name = pod.metadata.name.as_deref().unwrap_or_default();
            let status = pod.status.as_ref();
            let phase = status.and_then(|s| s.phase.as_deref()).unwrap_or_default();
            *phases.entry(phase.to_string()).or_default() += 1;

            match phase {
                PHASE_PENDING => self.add_aggregated_warning(component, name, "pod is pending"),
                PHASE_FAILED => {
                    let reason = status.and_then(|s| s.reason.as_deref()).unwrap_or_default();
                    let message = status.and_then(|s| s.message.as_deref()).unwrap_or_default();
                    self.add_aggregated_error(
                        component,
                        name,
                        format!("pod has failed: {reason} - {message}"),
                    );
                }
                _ => {}
            }

            for container in pod.spec.iter().flat_map(|s| s.containers.iter()) {
                let image = container.image.as_deref().unwrap_or_default();
                *images.entry(image.to_string()).or_default() += 1;
            }
        }

        self.phase_count.insert(component.to_string(), phases);
        self.image_count.insert(component.to_string(), images);
    }

    /// Fold an agent status response (or the failure to get one) into the report
    pub fn parse_status_response(
        &mut self,
        component: &str,
        pod: &str,
        response: &Result<StatusResponse>,
    ) {
        let r = match response {
            Ok(r) => r,
            Err(e) => {
                self.add_aggregated_error(
                    component,
                    pod,
                    format!("unable to retrieve cilium status: {e}"),
                );
                return;
            }
        };

        if let Some(agent) = &r.cilium {
            if agent.state != STATE_OK {
                self.add_aggregated_error(
                    component,
                    pod,
                    format!("cilium agent {}: {}", agent.state, agent.msg),
                );
            }
        }

        let subsystems = [
            ("kubernetes", &r.kubernetes),
            ("kvstore", &r.kvstore),
            ("container runtime", &r.container_runtime),
        ];
        for (what, subsystem) in subsystems {
            let Some(s) = subsystem else { continue };
            match s.state.as_str() {
                STATE_FAILURE => {
                    self.add_aggregated_error(component, pod, format!("{what}: {}", s.msg))
                }
                STATE_WARNING => {
                    self.add_aggregated_warning(component, pod, format!("{what}: {}", s.msg))
                }
                _ => {}
            }
        }

        for ctrl in &r.controllers {
            let Some(run) = &ctrl.status else { continue };
            if run.consecutive_failure_count == 0 {
                continue;
            }
            let since = run
                .last_success_timestamp
                .map(|ts| ts.to_rfc3339())
                .unwrap_or_else(|| "never".to_string());
            self.add_aggregated_error(
                component,
                pod,
                format!(
                    "controller {} is failing since {} ({}x): {}",
                    ctrl.name, since, run.consecutive_failure_count, run.last_failure_msg
                ),
            );
        }
    }

    /// Fold an agent endpoint listing (or the failure to get one) into the report
    pub fn parse_endpoints_response(
        &mut self,
        component: &str,
        pod: &str,
        response: &Result<Vec<Endpoint>>,
    ) {
        let endpoints = match response {
            Ok(eps) => eps,
            Err(e) => {
                self.add_aggregated_error(
                    component,
                    pod,
                    format!("unable to retrieve endpoints: {e}"),
                );
                return;
            }
        };

        for ep in endpoints {
            let owner = ep
                .pod_name()
                .map(|p| format!(" ({p})"))
                .unwrap_or_default();
            match ep.state() {
                ENDPOINT_STATE_INVALID => self.add_aggregated_error(
                    component,
                    pod,
                    format!("endpoint {}{owner} is in invalid state", ep.id),
                ),
                ENDPOINT_STATE_NOT_READY => self.add_aggregated_warning(
                    component,
                    pod,
                    format!("endpoint {}{owner} is not ready", ep.id),
                ),
                _ => {}
            }
        }
    }
}
