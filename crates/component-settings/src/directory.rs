//! Sources of cluster records for the capability resolver.

use std::future::Future;
use std::path::PathBuf;

use kube::{Api, Client, api::ListParams};
use serde_yaml::Value;
use tracing::{debug, warn};

use crate::crds::cluster::{Cluster, ClusterSpec};
use crate::error::DirectoryError;

pub trait ClusterDirectory {
    fn list_clusters(&self) -> impl Future<Output = Result<Vec<ClusterSpec>, DirectoryError>> + Send;
}

/// Lists `Cluster` resources from the API server.
#[derive(Clone)]
pub struct KubeClusterDirectory {
    pub client: Client,
}

impl ClusterDirectory for KubeClusterDirectory {
    async fn list_clusters(&self) -> Result<Vec<ClusterSpec>, DirectoryError> {
        let api: Api<Cluster> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;
        debug!(count = list.items.len(), "listed clusters from api server");
        Ok(list.items.into_iter().map(|c| c.spec).collect())
    }
}

/// Reads cluster records from a YAML or JSON file.
#[derive(Debug, Clone)]
pub struct FileClusterDirectory {
    pub path: PathBuf,
}

impl ClusterDirectory for FileClusterDirectory {
    async fn list_clusters(&self) -> Result<Vec<ClusterSpec>, DirectoryError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        parse_clusters(&text)
    }
}

/// Parses a list of cluster records.
///
/// Accepts a bare sequence or a `kind: List`-style object with `items`;
/// entries may be plain records or full resources with a `spec`. Entries
/// that do not decode are skipped.
pub fn parse_clusters(text: &str) -> Result<Vec<ClusterSpec>, DirectoryError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let doc: Value = serde_yaml::from_str(text)?;
    let entries = match doc {
        Value::Sequence(entries) => entries,
        Value::Mapping(mut map) => match map.remove("items") {
            Some(Value::Sequence(entries)) => entries,
            Some(Value::Null) | None if map.is_empty() => Vec::new(),
            _ => return Err(DirectoryError::Shape),
        },
        Value::Null => Vec::new(),
        _ => return Err(DirectoryError::Shape),
    };

    let mut clusters = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let record = match entry {
            Value::Mapping(mut map) if map.contains_key("spec") => {
                map.remove("spec").unwrap_or(Value::Null)
            }
            other => other,
        };
        match serde_yaml::from_value::<ClusterSpec>(record) {
            Ok(spec) => clusters.push(spec),
            Err(err) => warn!(index, error = %err, "skipping malformed cluster record"),
        }
    }
    Ok(clusters)
}
