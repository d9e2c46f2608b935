//! cilium-status - Aggregated Kubernetes status of a Cilium installation

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod defaults;
pub mod error;
pub mod logfilter;
pub mod output;
pub mod status;
