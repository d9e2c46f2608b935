//! Tests for src/status/types.rs - Status aggregation

use cilium_status::error::StatusError;
use cilium_status::status::models::{
    ComponentStatus, ControllerRunStatus, ControllerStatus, Endpoint, EndpointIdentifiers,
    EndpointStatus, StatusResponse, STATE_DISABLED, STATE_FAILURE, STATE_OK, STATE_WARNING,
};
use cilium_status::status::{PodStateCount, Status};
use k8s_openapi::api::core::v1::{Container, Pod, PodSpec, PodStatus};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

fn pod(name: &str, phase: &str, image: &str) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers: vec![Container {
                name: "main".to_string(),
                image: Some(image.to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }),
        status: Some(PodStatus {
            phase: Some(phase.to_string()),
            reason: Some("Evicted".to_string()),
            message: Some("node ran out of memory".to_string()),
            ..Default::default()
        }),
    }
}

fn endpoint(id: i64, state: &str) -> Endpoint {
    Endpoint {
        id,
        status: Some(EndpointStatus {
            state: state.to_string(),
            external_identifiers: Some(EndpointIdentifiers {
                k8s_namespace: Some("default".to_string()),
                k8s_pod_name: Some(format!("web-{id}")),
                ..Default::default()
            }),
            ..Default::default()
        }),
    }
}

// ============================================================================
// Aggregation
// ============================================================================

#[test]
fn test_new_status_is_empty() {
    let s = Status::new();
    assert_eq!(s.total_errors(), 0);
    assert_eq!(s.total_warnings(), 0);
    assert!(s.collection_errors.is_empty());
}

#[test]
fn test_findings_are_grouped_by_component_and_pod() {
    let mut s = Status::new();
    s.add_aggregated_error("cilium", "cilium-a", "one");
    s.add_aggregated_error("cilium", "cilium-a", "two");
    s.add_aggregated_warning("cilium", "cilium-b", "three");

    assert_eq!(s.errors["cilium"]["cilium-a"].errors, vec!["one", "two"]);
    assert_eq!(s.errors["cilium"]["cilium-b"].warnings, vec!["three"]);
    assert_eq!(s.total_errors(), 2);
    assert_eq!(s.total_warnings(), 1);
}

#[test]
fn test_disabled_requires_every_pod_disabled() {
    let mut s = Status::new();
    assert!(!s.is_disabled("hubble-relay"));

    s.set_disabled("hubble-relay", "hubble-relay", true);
    assert!(s.is_disabled("hubble-relay"));

    s.add_aggregated_warning("hubble-relay", "hubble-relay-abc", "pod is pending");
    assert!(!s.is_disabled("hubble-relay"));
}

#[test]
fn test_collection_errors_do_not_count_as_findings() {
    let mut s = Status::new();
    s.collection_error("pod count: forbidden");
    assert_eq!(s.collection_errors.len(), 1);
    assert_eq!(s.total_errors(), 0);
}

// ============================================================================
// Pods
// ============================================================================

#[test]
fn test_record_pods_counts_phases_and_images() {
    let mut s = Status::new();
    let pods = vec![
        pod("cilium-a", "Running", "cilium:v1"),
        pod("cilium-b", "Running", "cilium:v2"),
        pod("cilium-c", "Running", "cilium:v1"),
    ];
    s.record_pods("cilium", &pods);

    assert_eq!(s.phase_count["cilium"]["Running"], 3);
    assert_eq!(s.image_count["cilium"]["cilium:v1"], 2);
    assert_eq!(s.image_count["cilium"]["cilium:v2"], 1);
    assert_eq!(s.total_errors(), 0);
}

#[test]
fn test_record_pods_flags_pending_and_failed() {
    let mut s = Status::new();
    let pods = vec![
        pod("cilium-a", "Pending", "cilium:v1"),
        pod("cilium-b", "Failed", "cilium:v1"),
    ];
    s.record_pods("cilium", &pods);

    assert_eq!(s.errors["cilium"]["cilium-a"].warnings, vec!["pod is pending"]);
    assert_eq!(
        s.errors["cilium"]["cilium-b"].errors,
        vec!["pod has failed: Evicted - node ran out of memory"]
    );
}

#[test]
fn test_record_pods_without_pods() {
    let mut s = Status::new();
    s.record_pods("hubble-ui", &[]);
    assert!(s.phase_count["hubble-ui"].is_empty());
    assert!(s.image_count["hubble-ui"].is_empty());
}

// ============================================================================
// Agent responses
// ============================================================================

#[test]
fn test_parse_status_response_error() {
    let mut s = Status::new();
    let response = Err(StatusError::Container("container cilium-agent is not running".into()));
    s.parse_status_response("cilium", "cilium-a", &response);

    assert_eq!(
        s.errors["cilium"]["cilium-a"].errors,
        vec!["unable to retrieve cilium status: container cilium-agent is not running"]
    );
}

#[test]
fn test_parse_status_response_subsystems() {
    let mut s = Status::new();
    let response = Ok(StatusResponse {
        cilium: Some(ComponentStatus::new(STATE_OK, "")),
        kubernetes: Some(ComponentStatus::new(STATE_WARNING, "slow")),
        kvstore: Some(ComponentStatus::new(STATE_FAILURE, "etcd down")),
        container_runtime: Some(ComponentStatus::new(STATE_DISABLED, "")),
        ..Default::default()
    });
    s.parse_status_response("cilium", "cilium-a", &response);

    let counts = &s.errors["cilium"]["cilium-a"];
    assert_eq!(counts.errors, vec!["kvstore: etcd down"]);
    assert_eq!(counts.warnings, vec!["kubernetes: slow"]);
}

#[test]
fn test_parse_status_response_agent_not_ok() {
    let mut s = Status::new();
    let response = Ok(StatusResponse {
        cilium: Some(ComponentStatus::new(STATE_WARNING, "degraded")),
        ..Default::default()
    });
    s.parse_status_response("cilium", "cilium-a", &response);
    assert_eq!(
        s.errors["cilium"]["cilium-a"].errors,
        vec!["cilium agent Warning: degraded"]
    );
}

#[test]
fn test_parse_status_response_failing_controllers() {
    let mut s = Status::new();
    let response = Ok(StatusResponse {
        controllers: vec![
            ControllerStatus {
                name: "sync-policy".to_string(),
                status: Some(ControllerRunStatus {
                    consecutive_failure_count: 3,
                    last_failure_msg: "timeout".to_string(),
                    ..Default::default()
                }),
            },
            ControllerStatus {
                name: "healthy".to_string(),
                status: Some(ControllerRunStatus {
                    success_count: 10,
                    ..Default::default()
                }),
            },
        ],
        ..Default::default()
    });
    s.parse_status_response("cilium", "cilium-a", &response);

    assert_eq!(
        s.errors["cilium"]["cilium-a"].errors,
        vec!["controller sync-policy is failing since never (3x): timeout"]
    );
}

#[test]
fn test_parse_endpoints_response() {
    let mut s = Status::new();
    let response = Ok(vec![
        endpoint(1, "ready"),
        endpoint(2, "invalid"),
        endpoint(3, "not-ready"),
    ]);
    s.parse_endpoints_response("cilium", "cilium-a", &response);

    let counts = &s.errors["cilium"]["cilium-a"];
    assert_eq!(counts.errors, vec!["endpoint 2 (default/web-2) is in invalid state"]);
    assert_eq!(counts.warnings, vec!["endpoint 3 (default/web-3) is not ready"]);
}

#[test]
fn test_parse_endpoints_response_error() {
    let mut s = Status::new();
    let response: Result<Vec<Endpoint>, StatusError> = Err(StatusError::NoPods);
    s.parse_endpoints_response("cilium", "cilium-a", &response);
    assert_eq!(
        s.errors["cilium"]["cilium-a"].errors,
        vec!["unable to retrieve endpoints: no pods found"]
    );
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_pod_state_serializes_kind_as_type() {
    let mut state = PodStateCount::new("DaemonSet");
    state.desired = 3;
    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json["type"], "DaemonSet");
    assert_eq!(json["desired"], 3);
}

#[test]
fn test_agent_status_document_deserializes() {
    let doc = r#"{
        "cilium": {"state": "Ok", "msg": ""},
        "kube-proxy-replacement": {"mode": "True"},
        "controllers": [{"name": "sync", "status": {"consecutive-failure-count": 2, "last-failure-msg": "x"}}],
        "cluster-mesh": {"num-global-services": 4, "clusters": [{"name": "east", "ready": true, "num-nodes": 2}]}
    }"#;
    let response: StatusResponse = serde_json::from_str(doc).unwrap();

    assert_eq!(response.cilium.unwrap().state, STATE_OK);
    assert_eq!(response.controllers[0].status.as_ref().unwrap().consecutive_failure_count, 2);
    let mesh = response.cluster_mesh.unwrap();
    assert_eq!(mesh.num_global_services, 4);
    assert_eq!(mesh.clusters[0].num_nodes, 2);
}
