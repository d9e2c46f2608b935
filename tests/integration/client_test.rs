//! Integration tests for KubeStatusClient
//!
//! Run with: cargo test integration::client_test -- --ignored

use cilium_status::client::{create_client, KubeStatusClient, StatusClient};
use cilium_status::defaults;

async fn client() -> KubeStatusClient {
    KubeStatusClient::new(create_client(None).await.expect("Should create client"))
}

#[tokio::test]
#[ignore]
async fn test_get_agent_daemon_set() {
    let client = client().await;
    let ds = client
        .get_daemon_set(defaults::NAMESPACE, defaults::AGENT_DAEMONSET_NAME)
        .await
        .expect("Should query DaemonSet");
    assert!(ds.is_some(), "cilium DaemonSet should exist");
}

#[tokio::test]
#[ignore]
async fn test_missing_deployment_is_none() {
    let client = client().await;
    let d = client
        .get_deployment(defaults::NAMESPACE, "does-not-exist")
        .await
        .expect("Should query Deployment");
    assert!(d.is_none());
}

#[tokio::test]
#[ignore]
async fn test_agent_status_via_exec() {
    let client = client().await;
    let pods = client
        .list_pods(Some(defaults::NAMESPACE), Some(defaults::AGENT_POD_SELECTOR))
        .await
        .expect("Should list agent pods");
    let pod = pods
        .first()
        .and_then(|p| p.metadata.name.clone())
        .expect("At least one agent pod");

    let status = client
        .cilium_status(defaults::NAMESPACE, &pod)
        .await
        .expect("Should exec cilium-dbg status");
    assert!(status.cilium.is_some());
}

#[tokio::test]
#[ignore]
async fn test_list_cilium_endpoints() {
    let client = client().await;
    let endpoints = client
        .list_cilium_endpoints(None)
        .await
        .expect("Should list CiliumEndpoints");
    assert!(endpoints.is_some(), "CiliumEndpoint CRD should be registered");
}
