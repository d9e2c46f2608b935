//! Helm v3 release storage
//!
//! Helm keeps every release revision in a Secret of type
//! `helm.sh/release.v1` labelled `owner=helm,name=<release>,version=<n>`.
//! The `release` key holds the release document, gzipped and base64
//! encoded on top of the encoding Kubernetes applies to Secret data.

use crate::error::{Result, StatusError};
use base64::Engine;
use flate2::read::GzDecoder;
use k8s_openapi::api::core::v1::Secret;
use serde::{Deserialize, Serialize};
use std::io::Read;

const GZIP_MAGIC: [u8; 3] = [0x1f, 0x8b, 0x08];

/// Label selector matching every revision of `release`
pub fn release_selector(release: &str) -> String {
    format!("owner=helm,name={release}")
}

/// Decoded Helm release document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Release {
    pub name: String,
    pub namespace: String,
    pub version: i64,
    pub info: Option<ReleaseInfo>,
    pub chart: Option<Chart>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseInfo {
    pub status: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Chart {
    pub metadata: Option<ChartMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartMetadata {
    pub name: String,
    pub version: String,
    pub app_version: String,
}

impl Release {
    pub fn chart_version(&self) -> Option<&str> {
        self.chart
            .as_ref()
            .and_then(|c| c.metadata.as_ref())
            .map(|m| m.version.as_str())
            .filter(|v| !v.is_empty())
    }
}

/// Revision number stored in the `version` label of a release Secret
fn revision(secret: &Secret) -> Option<i64> {
    secret
        .metadata
        .labels
        .as_ref()?
        .get("version")?
        .parse()
        .ok()
}

/// The release Secret with the highest revision
pub fn latest_revision(secrets: &[Secret]) -> Option<&Secret> {
    secrets
        .iter()
        .filter_map(|s| revision(s).map(|rev| (rev, s)))
        .max_by_key(|(rev, _)| *rev)
        .map(|(_, s)| s)
}

/// Decode the `release` payload of a release Secret
pub fn decode_release(payload: &[u8]) -> Result<Release> {
    let raw = base64::engine::general_purpose::STANDARD
        .decode(payload.trim_ascii())
        .map_err(|e| StatusError::Helm(format!("invalid release encoding: {e}")))?;

    let json = if raw.starts_with(&GZIP_MAGIC) {
        let mut out = Vec::new();
        GzDecoder::new(raw.as_slice()).read_to_end(&mut out)?;
        out
    } else {
        raw
    };

    Ok(serde_json::from_slice(&json)?)
}

/// Decode the release stored in `secret`
pub fn release_from_secret(secret: &Secret) -> Result<Release> {
    let name = secret.metadata.name.as_deref().unwrap_or_default();
    let payload = secret
        .data
        .as_ref()
        .and_then(|d| d.get("release"))
        .ok_or_else(|| StatusError::Helm(format!("secret {name} has no release data")))?;
    decode_release(&payload.0)
}
