//! Kubernetes status collector
//!
//! One collection pass fans a fixed set of read-only queries out over a
//! bounded [`WorkerPool`]. Every task merges its findings into a shared
//! [`Status`] behind a single lock. [`K8sStatusCollector::status`] repeats
//! the pass until the report is ready or the wait deadline elapses.

use super::format::{count_wrapped_lines, cursor_up, terminal_width};
use super::models::RemoteCluster;
use super::pool::WorkerPool;
use super::types::{
    ErrorCountMap, PodStateCount, PodsCount, Status, PHASE_PENDING, PHASE_RUNNING,
};
use crate::client::StatusClient;
use crate::defaults;
use crate::error::{Result, StatusError};
use crate::logfilter;
use chrono::{TimeDelta, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use k8s_openapi::api::core::v1::{ContainerStatus, Pod};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const CRASH_LOOP_BACK_OFF: &str = "CrashLoopBackOff";

/// How a status report is rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusOutput {
    #[default]
    Summary,
    Json,
    Yaml,
}

/// Parameters of a status collection
#[derive(Debug, Clone)]
pub struct StatusParameters {
    /// Namespace Cilium is installed in
    pub namespace: String,
    /// Poll until the status is ready
    pub wait: bool,
    /// Deadline for the whole collection, [`defaults::WAIT_TIMEOUT`] when zero
    pub wait_duration: Duration,
    /// Components required to be free of warnings and errors. Takes
    /// precedence over `ignore_warnings`.
    pub warning_free_pods: Vec<String>,
    /// Ignore warnings when deciding readiness. Meaningless when
    /// `warning_free_pods` is set.
    pub ignore_warnings: bool,
    /// Number of concurrent queries, [`defaults::WORKER_COUNT`] when zero
    pub worker_count: usize,
    pub output: StatusOutput,
    pub helm_release_name: String,
    /// Redraw the summary after each retry while waiting
    pub interactive: bool,
    /// Keep every error line of collected container logs
    pub verbose: bool,
}

impl Default for StatusParameters {
    fn default() -> Self {
        Self {
            namespace: defaults::NAMESPACE.to_string(),
            wait: false,
            wait_duration: Duration::ZERO,
            warning_free_pods: Vec::new(),
            ignore_warnings: false,
            worker_count: defaults::WORKER_COUNT,
            output: StatusOutput::Summary,
            helm_release_name: defaults::HELM_RELEASE_NAME.to_string(),
            interactive: false,
            verbose: false,
        }
    }
}

impl StatusParameters {
    pub fn wait_timeout(&self) -> Duration {
        if self.wait_duration.is_zero() {
            defaults::WAIT_TIMEOUT
        } else {
            self.wait_duration
        }
    }
}

/// Connectivity of one agent (or KVStoreMesh instance) to remote clusters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterMeshAgentConnectivityStatus {
    pub global_services: i64,
    pub clusters: BTreeMap<String, RemoteCluster>,
    pub errors: ErrorCountMap,
}

impl ClusterMeshAgentConnectivityStatus {
    /// Names of remote clusters that are not ready
    pub fn not_ready(&self) -> Vec<&str> {
        self.clusters
            .values()
            .filter(|c| !c.ready)
            .map(|c| c.name.as_str())
            .collect()
    }
}

type SharedStatus = Arc<Mutex<Status>>;

struct StatusTask {
    name: String,
    task: BoxFuture<'static, Result<()>>,
}

impl StatusTask {
    fn new<F>(name: impl Into<String>, task: F) -> Self
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            task: task.boxed(),
        }
    }
}

/// Replica counts and rollout progress shared by DaemonSets and Deployments
struct Rollout {
    state: PodStateCount,
    generation: i64,
    observed_generation: i64,
    updated: i64,
}

impl Rollout {
    /// Record the counts and flag unready, unavailable or unrolled pods
    fn apply(self, status: &mut Status, name: &str) {
        let kind = self.state.kind.clone();
        let lower = kind.to_lowercase();
        let desired = self.state.desired;
        let not_ready = desired - self.state.ready;
        let unavailable = self.state.unavailable - not_ready;

        status.pod_state.insert(name.to_string(), self.state);

        if not_ready > 0 {
            status.add_aggregated_error(
                name,
                name,
                format!("{not_ready} pods of {kind} {name} are not ready"),
            );
        }
        if unavailable > 0 {
            status.add_aggregated_warning(
                name,
                name,
                format!("{unavailable} pods of {kind} {name} are not available"),
            );
        }
        if self.generation != self.observed_generation {
            status.add_aggregated_error(
                name,
                name,
                format!("{lower} {name} is updated but rollout has not started"),
            );
        }
        if self.updated < desired {
            status.add_aggregated_error(
                name,
                name,
                format!(
                    "{lower} {name} is rolling out - {} out of {desired} pods updated",
                    self.updated
                ),
            );
        }
    }
}

fn container_status<'a>(pod: &'a Pod, container: &str) -> Option<&'a ContainerStatus> {
    pod.status
        .as_ref()?
        .container_statuses
        .as_ref()?
        .iter()
        .find(|c| c.name == container)
}

fn is_running(container: Option<&ContainerStatus>) -> bool {
    container
        .and_then(|c| c.state.as_ref())
        .and_then(|s| s.running.as_ref())
        .is_some()
}

fn in_crash_loop(container: &ContainerStatus) -> bool {
    container
        .state
        .as_ref()
        .and_then(|s| s.waiting.as_ref())
        .and_then(|w| w.reason.as_deref())
        == Some(CRASH_LOOP_BACK_OFF)
}

fn pod_phase(pod: &Pod) -> &str {
    pod.status
        .as_ref()
        .and_then(|s| s.phase.as_deref())
        .unwrap_or_default()
}

fn pod_name(pod: &Pod) -> String {
    pod.metadata.name.clone().unwrap_or_default()
}

/// Collects the status of a Cilium installation
#[derive(Clone)]
pub struct K8sStatusCollector {
    client: Arc<dyn StatusClient>,
    params: Arc<StatusParameters>,
}

impl K8sStatusCollector {
    pub fn new(client: Arc<dyn StatusClient>, params: StatusParameters) -> Self {
        Self {
            client,
            params: Arc::new(params),
        }
    }

    pub fn params(&self) -> &StatusParameters {
        &self.params
    }

    fn namespace(&self) -> &str {
        &self.params.namespace
    }

    /// ClusterMesh connectivity as reported by the agent in `agent_pod`
    pub async fn cluster_mesh_connectivity(
        &self,
        agent_pod: &str,
    ) -> Result<ClusterMeshAgentConnectivityStatus> {
        let status = tokio::time::timeout(
            self.params.wait_timeout(),
            self.client.cilium_status(self.namespace(), agent_pod),
        )
        .await
        .map_err(|_| StatusError::WaitTimeout { last: None })??;

        let mesh = status
            .cluster_mesh
            .ok_or(StatusError::ClusterMeshStatusNotAvailable)?;

        Ok(ClusterMeshAgentConnectivityStatus {
            global_services: mesh.num_global_services,
            clusters: mesh
                .clusters
                .into_iter()
                .map(|c| (c.name.clone(), c))
                .collect(),
            errors: ErrorCountMap::new(),
        })
    }

    /// Remote cluster connectivity of the KVStoreMesh sidecar in `pod`
    pub async fn kvstore_mesh_connectivity(
        &self,
        pod: &str,
    ) -> Result<ClusterMeshAgentConnectivityStatus> {
        let clusters = tokio::time::timeout(
            self.params.wait_timeout(),
            self.client.kvstoremesh_status(self.namespace(), pod),
        )
        .await
        .map_err(|_| StatusError::WaitTimeout { last: None })??;

        Ok(ClusterMeshAgentConnectivityStatus {
            global_services: 0,
            clusters: clusters.into_iter().map(|c| (c.name.clone(), c)).collect(),
            errors: ErrorCountMap::new(),
        })
    }

    /// Whether `status` satisfies the readiness requirements of the parameters
    pub fn status_is_ready(&self, status: &Status) -> bool {
        if status.total_errors() > 0 {
            return false;
        }

        if !self.params.ignore_warnings
            && self.params.warning_free_pods.is_empty()
            && status.total_warnings() > 0
        {
            return false;
        }

        self.params.warning_free_pods.iter().all(|name| {
            status.errors.get(name).map_or(true, |pods| {
                pods.values()
                    .all(|c| c.warnings.is_empty() && c.errors.is_empty())
            })
        })
    }

    /// Collect the status, polling until ready when waiting is requested
    pub async fn status(&self) -> Result<Status> {
        let deadline = Instant::now() + self.params.wait_timeout();
        let cancel = CancellationToken::new();
        let mut most_recent: Option<Status> = None;
        let mut lines = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(StatusError::WaitCanceled {
                    last: most_recent.map(Box::new),
                });
            }
            if Instant::now() >= deadline {
                return Err(StatusError::WaitTimeout {
                    last: most_recent.map(Box::new),
                });
            }

            let shared: SharedStatus = Arc::new(Mutex::new(Status::new()));
            let status = match tokio::time::timeout_at(deadline, self.collect(&shared, &cancel))
                .await
            {
                Ok(status) => status,
                Err(_) => {
                    // queries still pending at the deadline are abandoned
                    let mut partial = shared.lock().await.clone();
                    partial.collection_error(format!(
                        "status collection did not complete within {}",
                        humantime::format_duration(self.params.wait_timeout())
                    ));
                    if self.params.wait {
                        return Err(StatusError::WaitTimeout {
                            last: Some(Box::new(partial)),
                        });
                    }
                    cursor_up(lines)?;
                    return Ok(partial);
                }
            };

            if !self.params.wait || self.status_is_ready(&status) {
                cursor_up(lines)?;
                return Ok(status);
            }

            info!(
                errors = status.total_errors(),
                warnings = status.total_warnings(),
                "status not ready, retrying"
            );
            let retry_at = (Instant::now() + defaults::WAIT_RETRY_INTERVAL).min(deadline);
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep_until(retry_at) => {}
            }

            if self.params.output == StatusOutput::Summary && self.params.interactive {
                let text = status.format();
                cursor_up(lines)?;
                lines = count_wrapped_lines(&text, terminal_width());
                print!("{text}");
                std::io::stdout().flush()?;
            }

            most_recent = Some(status);
        }
    }

    /// One collection pass, merging into `status` as results arrive
    async fn collect(&self, status: &SharedStatus, cancel: &CancellationToken) -> Status {
        let mut tasks = self.component_tasks(status);
        tasks.extend(self.pod_tasks(status, cancel).await);

        let mut pool = WorkerPool::new(self.params.worker_count);
        debug!(tasks = tasks.len(), workers = pool.workers(), "collecting status");
        for StatusTask { name, task } in tasks {
            if let Err(e) = pool.submit(name, task) {
                status.lock().await.collection_error(e.to_string());
            }
        }

        let results = pool.drain().await;
        let mut s = status.lock().await;
        for result in results {
            if let Err(e) = result.result {
                s.collection_error(format!("{}: {e}", result.name));
            }
        }
        s.clone()
    }

    /// Tasks that do not depend on the pods of the installation
    fn component_tasks(&self, status: &SharedStatus) -> Vec<StatusTask> {
        let mut tasks = Vec::new();

        let (c, s) = (self.clone(), status.clone());
        tasks.push(StatusTask::new(defaults::AGENT_DAEMONSET_NAME, async move {
            let name = defaults::AGENT_DAEMONSET_NAME;
            let result = match c.daemon_set_status(&s, name).await {
                Ok(true) => Err(StatusError::NotFound {
                    kind: "DaemonSet".to_string(),
                    name: name.to_string(),
                }),
                Ok(false) => Ok(()),
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                let mut s = s.lock().await;
                s.add_aggregated_error(name, name, e.to_string());
                s.collection_error(e.to_string());
            }
            Ok(())
        }));

        let (c, s) = (self.clone(), status.clone());
        tasks.push(StatusTask::new(defaults::ENVOY_DAEMONSET_NAME, async move {
            let name = defaults::ENVOY_DAEMONSET_NAME;
            match c.daemon_set_status(&s, name).await {
                Ok(true) => {
                    s.lock().await.set_disabled(name, name, true);
                    return Ok(());
                }
                Ok(false) => {}
                Err(e) => {
                    let mut s = s.lock().await;
                    s.add_aggregated_error(name, name, e.to_string());
                    s.collection_error(e.to_string());
                }
            }
            if let Err(e) = c.pod_status(&s, name, defaults::ENVOY_POD_SELECTOR).await {
                s.lock().await.collection_error(e.to_string());
            }
            Ok(())
        }));

        let (c, s) = (self.clone(), status.clone());
        tasks.push(StatusTask::new(defaults::OPERATOR_DEPLOYMENT_NAME, async move {
            let name = defaults::OPERATOR_DEPLOYMENT_NAME;
            let result = c.deployment_status(&s, name).await;
            {
                let mut s = s.lock().await;
                s.set_disabled(name, name, matches!(result, Ok(true)));
                if let Err(e) = &result {
                    s.add_aggregated_error(name, name, e.to_string());
                    s.collection_error(e.to_string());
                }
            }
            c.pod_status(&s, name, defaults::OPERATOR_POD_SELECTOR)
                .await
                .map(|_| ())
        }));

        let optional = [
            (
                defaults::RELAY_DEPLOYMENT_NAME,
                defaults::RELAY_POD_SELECTOR,
                "hubble relay is not deployed",
            ),
            (
                defaults::HUBBLE_UI_DEPLOYMENT_NAME,
                defaults::HUBBLE_UI_POD_SELECTOR,
                "hubble ui is not deployed",
            ),
            (
                defaults::CLUSTERMESH_DEPLOYMENT_NAME,
                defaults::CLUSTERMESH_POD_SELECTOR,
                "clustermesh is not deployed",
            ),
        ];
        for (name, selector, not_deployed) in optional {
            tasks.push(self.optional_deployment_task(status, name, selector, not_deployed));
        }

        let (c, s) = (self.clone(), status.clone());
        tasks.push(StatusTask::new("pod count", async move {
            if let Err(e) = c.pod_count(&s).await {
                s.lock().await.collection_error(e.to_string());
            }
            Ok(())
        }));

        let (c, s) = (self.clone(), status.clone());
        tasks.push(StatusTask::new(defaults::CONFIG_MAP_NAME, async move {
            if let Err(e) = c.config_annotations(&s).await {
                s.lock().await.collection_error(e.to_string());
            }
            Ok(())
        }));

        let (c, s) = (self.clone(), status.clone());
        tasks.push(StatusTask::new("Helm chart version", async move {
            match c
                .client
                .helm_chart_version(c.namespace(), &c.params.helm_release_name)
                .await
            {
                Ok(version) => s.lock().await.helm_chart_version = version,
                Err(e) => debug!(error = %e, "no Helm chart version"),
            }
            Ok(())
        }));

        tasks
    }

    /// Hubble Relay, Hubble UI and ClusterMesh may legitimately be absent
    fn optional_deployment_task(
        &self,
        status: &SharedStatus,
        name: &'static str,
        selector: &'static str,
        not_deployed: &'static str,
    ) -> StatusTask {
        let (c, s) = (self.clone(), status.clone());
        StatusTask::new(name, async move {
            let result = c.deployment_status(&s, name).await;
            let exists = {
                let mut s = s.lock().await;
                s.set_disabled(name, name, matches!(result, Ok(true)));
                let exists = s.pod_state.contains_key(name);
                if let Err(e) = &result {
                    if exists {
                        s.add_aggregated_error(name, name, e.to_string());
                        s.collection_error(e.to_string());
                    } else {
                        s.add_aggregated_warning(name, name, not_deployed);
                    }
                }
                exists
            };

            if exists {
                if let Err(e) = c.pod_status(&s, name, selector).await {
                    s.lock().await.collection_error(e.to_string());
                }
            }
            Ok(())
        })
    }

    /// Tasks derived from the pods of the agent and the optional components
    async fn pod_tasks(&self, status: &SharedStatus, cancel: &CancellationToken) -> Vec<StatusTask> {
        let mut tasks = Vec::new();

        match self
            .pod_status(status, defaults::AGENT_DAEMONSET_NAME, defaults::AGENT_POD_SELECTOR)
            .await
        {
            Ok(pods) => {
                let mut logs_scheduled = false;
                for pod in pods.iter().filter(|p| pod_phase(p) == PHASE_RUNNING) {
                    let container = container_status(pod, defaults::AGENT_CONTAINER_NAME).cloned();
                    tasks.push(self.agent_task(status, cancel, pod, container.clone()));
                    if !logs_scheduled {
                        logs_scheduled = true;
                        tasks.push(self.log_component_task(
                            status,
                            defaults::AGENT_DAEMONSET_NAME,
                            pod,
                            defaults::AGENT_CONTAINER_NAME,
                            container,
                        ));
                    }
                }
            }
            Err(e) => status.lock().await.collection_error(e.to_string()),
        }

        let components = [
            (
                defaults::OPERATOR_DEPLOYMENT_NAME,
                defaults::OPERATOR_POD_SELECTOR,
                defaults::OPERATOR_CONTAINER_NAME,
            ),
            (
                defaults::RELAY_DEPLOYMENT_NAME,
                defaults::RELAY_POD_SELECTOR,
                defaults::RELAY_CONTAINER_NAME,
            ),
            (
                defaults::CLUSTERMESH_DEPLOYMENT_NAME,
                defaults::CLUSTERMESH_POD_SELECTOR,
                defaults::CLUSTERMESH_CONTAINER_NAME,
            ),
        ];
        for (component, selector, container_name) in components {
            // phase and image counts of these pods are recorded by the component tasks
            match self
                .client
                .list_pods(Some(self.namespace()), Some(selector))
                .await
            {
                Ok(pods) => {
                    for pod in pods.iter().filter(|p| pod_phase(p) == PHASE_RUNNING) {
                        let container = container_status(pod, container_name).cloned();
                        tasks.push(self.log_component_task(
                            status,
                            component,
                            pod,
                            container_name,
                            container,
                        ));
                    }
                }
                Err(e) => status.lock().await.collection_error(e.to_string()),
            }
        }

        tasks
    }

    /// Query a running agent, or explain why its container is not running
    fn agent_task(
        &self,
        status: &SharedStatus,
        cancel: &CancellationToken,
        pod: &Pod,
        container: Option<ContainerStatus>,
    ) -> StatusTask {
        let (c, s, cancel) = (self.clone(), status.clone(), cancel.clone());
        let name = pod_name(pod);
        let pod_namespace = pod
            .metadata
            .namespace
            .clone()
            .unwrap_or_else(|| self.namespace().to_string());

        StatusTask::new(name.clone(), async move {
            let component = defaults::AGENT_DAEMONSET_NAME;
            let mut terminated = false;

            let (response, endpoints) = if is_running(container.as_ref()) {
                let (response, endpoints) = tokio::join!(
                    c.client.cilium_status(c.namespace(), &name),
                    c.client.cilium_endpoints(c.namespace(), &name),
                );
                (response, Some(endpoints))
            } else {
                let mut desc = "is not running".to_string();
                let mut last_log = format!(
                    "try 'kubectl -n {pod_namespace} logs -c {} {name}'",
                    defaults::AGENT_CONTAINER_NAME
                );

                if let Some(cs) = &container {
                    if in_crash_loop(cs) {
                        desc = format!("is in {CRASH_LOOP_BACK_OFF}");
                        terminated = true;
                    }
                    if let Some(last) = cs.last_state.as_ref().and_then(|s| s.terminated.as_ref()) {
                        desc = format!("{desc}, exited with code {}", last.exit_code);
                        if let Some(msg) = last.message.as_deref().filter(|m| !m.is_empty()) {
                            last_log = msg.trim().to_string();
                        }
                    }
                }

                let err = StatusError::Container(format!(
                    "container {} {desc}: {last_log}",
                    defaults::AGENT_CONTAINER_NAME
                ));
                (Err(err), None)
            };

            let mut s = s.lock().await;
            s.parse_status_response(component, &name, &response);
            if let Some(endpoints) = &endpoints {
                s.parse_endpoints_response(component, &name, endpoints);
            }
            s.cilium_status.insert(name.clone(), response.ok());
            s.cilium_endpoints
                .insert(name.clone(), endpoints.and_then(|e| e.ok()));

            // retrying is pointless while the agent keeps crashing
            if terminated {
                cancel.cancel();
            }
            Ok(())
        })
    }

    /// Pull recent logs of a crashed container of `component`
    fn log_component_task(
        &self,
        status: &SharedStatus,
        component: &'static str,
        pod: &Pod,
        container_name: &'static str,
        container: Option<ContainerStatus>,
    ) -> StatusTask {
        let (c, s) = (self.clone(), status.clone());
        let name = pod_name(pod);
        let namespace = pod
            .metadata
            .namespace
            .clone()
            .unwrap_or_else(|| self.namespace().to_string());

        StatusTask::new(format!("{name} logs"), async move {
            if is_running(container.as_ref()) {
                return Ok(());
            }
            let Some(cs) = container else {
                return Ok(());
            };
            let Some(last) = cs.last_state.as_ref().and_then(|s| s.terminated.as_ref()) else {
                return Ok(());
            };

            let mut desc = if in_crash_loop(&cs) {
                format!("is in {CRASH_LOOP_BACK_OFF}")
            } else {
                "is not running".to_string()
            };
            desc.push_str(", pulling previous Pod logs for further investigation");

            let finished = last
                .finished_at
                .as_ref()
                .map(|t| t.0)
                .unwrap_or_else(Utc::now);
            let lookback = TimeDelta::seconds(defaults::LOG_LOOKBACK.as_secs() as i64);
            let previous = cs.restart_count > 0;

            match c
                .client
                .container_logs(&namespace, &name, container_name, finished - lookback, previous)
                .await
            {
                Ok(logs) if logs.is_empty() => {}
                Ok(logs) => {
                    let reduced = logfilter::reduce(&logs, c.params.verbose);
                    s.lock().await.add_aggregated_error(
                        component,
                        &name,
                        format!("container {container_name} {desc}:\n{reduced}"),
                    );
                }
                Err(e) => s.lock().await.collection_error(format!(
                    "failed to gather logs from {namespace}:{name}:{container_name}: {e}"
                )),
            }
            Ok(())
        })
    }

    /// Record the state of DaemonSet `name`, returns true when it does not exist
    async fn daemon_set_status(&self, status: &Mutex<Status>, name: &str) -> Result<bool> {
        let Some(ds) = self.client.get_daemon_set(self.namespace(), name).await? else {
            return Ok(true);
        };

        let st = ds.status.unwrap_or_default();
        let rollout = Rollout {
            state: PodStateCount {
                kind: "DaemonSet".to_string(),
                desired: st.desired_number_scheduled.into(),
                ready: st.number_ready.into(),
                available: st.number_available.unwrap_or_default().into(),
                unavailable: st.number_unavailable.unwrap_or_default().into(),
            },
            generation: ds.metadata.generation.unwrap_or_default(),
            observed_generation: st.observed_generation.unwrap_or_default(),
            updated: st.updated_number_scheduled.unwrap_or_default().into(),
        };

        rollout.apply(&mut *status.lock().await, name);
        Ok(false)
    }

    /// Record the state of Deployment `name`, returns true when it does not exist
    async fn deployment_status(&self, status: &Mutex<Status>, name: &str) -> Result<bool> {
        let Some(d) = self.client.get_deployment(self.namespace(), name).await? else {
            return Ok(true);
        };

        let st = d.status.unwrap_or_default();
        let rollout = Rollout {
            state: PodStateCount {
                kind: "Deployment".to_string(),
                desired: st.replicas.unwrap_or_default().into(),
                ready: st.ready_replicas.unwrap_or_default().into(),
                available: st.available_replicas.unwrap_or_default().into(),
                unavailable: st.unavailable_replicas.unwrap_or_default().into(),
            },
            generation: d.metadata.generation.unwrap_or_default(),
            observed_generation: st.observed_generation.unwrap_or_default(),
            updated: st.updated_replicas.unwrap_or_default().into(),
        };

        rollout.apply(&mut *status.lock().await, name);
        Ok(false)
    }

    /// Record phase and image counts of the pods matching `selector`
    async fn pod_status(
        &self,
        status: &Mutex<Status>,
        component: &str,
        selector: &str,
    ) -> Result<Vec<Pod>> {
        let pods = self
            .client
            .list_pods(Some(self.namespace()), Some(selector))
            .await?;
        status.lock().await.record_pods(component, &pods);
        Ok(pods)
    }

    /// Count workload pods and the CiliumEndpoints managing them
    async fn pod_count(&self, status: &Mutex<Status>) -> Result<()> {
        let pods = self.client.list_pods(None, None).await?;
        let all = pods
            .iter()
            .filter(|p| {
                let host_network = p
                    .spec
                    .as_ref()
                    .and_then(|s| s.host_network)
                    .unwrap_or(false);
                let phase = pod_phase(p);
                !host_network && (phase == PHASE_RUNNING || phase == PHASE_PENDING)
            })
            .count();

        // no pod can be managed by Cilium before the CRD is registered
        let by_cilium = self
            .client
            .list_cilium_endpoints(None)
            .await?
            .map_or(0, |eps| eps.len());

        status.lock().await.pods_count = PodsCount { all, by_cilium };
        Ok(())
    }

    /// Collect configuration errors the agent reports as ConfigMap annotations
    async fn config_annotations(&self, status: &Mutex<Status>) -> Result<()> {
        let cm = self
            .client
            .get_config_map(self.namespace(), defaults::CONFIG_MAP_NAME)
            .await
            .map_err(|e| StatusError::ConfigMap {
                name: defaults::CONFIG_MAP_NAME.to_string(),
                source: Box::new(e),
            })?;

        let errors = cm
            .metadata
            .annotations
            .unwrap_or_default()
            .into_iter()
            .filter(|(k, _)| k.starts_with(defaults::CONFIG_ANNOTATION_PREFIX))
            .map(|(_, v)| v);

        let mut s = status.lock().await;
        s.config_errors.extend(errors);
        s.config_errors.sort();
        Ok(())
    }
}
