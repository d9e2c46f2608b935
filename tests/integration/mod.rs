//! Integration tests module
//!
//! These tests require a real Kubernetes cluster with Cilium installed in
//! kube-system and are marked with #[ignore].
//! Run them with: cargo test -- --ignored

mod client_test;
