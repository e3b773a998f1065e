use std::path::PathBuf;

use anyhow::{Context, bail};

use crate::validation::SubmitMode;

pub const ENVIRONMENT_VAR: &str = "COMPONENT_ENVIRONMENT_ID";
pub const CLUSTER_SOURCE_VAR: &str = "CLUSTER_SOURCE";
pub const MODE_VAR: &str = "SETTINGS_MODE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterSource {
    /// List `Cluster` resources from the current kube context
    Kube,
    File(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Print reconciled settings and the exposure options
    Reconcile,
    Submit(SubmitMode),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub environment_id: String,
    pub cluster_source: ClusterSource,
    pub mode: Mode,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let environment_id = lookup(ENVIRONMENT_VAR)
            .filter(|v| !v.trim().is_empty())
            .with_context(|| format!("{ENVIRONMENT_VAR} must be set"))?;
        let cluster_source = match lookup(CLUSTER_SOURCE_VAR).as_deref().map(str::trim) {
            None | Some("") | Some("kube") => ClusterSource::Kube,
            Some(path) => ClusterSource::File(PathBuf::from(path)),
        };
        let mode = match lookup(MODE_VAR).as_deref().map(str::trim) {
            None | Some("") | Some("reconcile") => Mode::Reconcile,
            Some("create") => Mode::Submit(SubmitMode::Create),
            Some("update") => Mode::Submit(SubmitMode::Update),
            Some(other) => bail!("{MODE_VAR}={other} is not one of reconcile, create, update"),
        };
        Ok(Self {
            environment_id: environment_id.trim().to_string(),
            cluster_source,
            mode,
        })
    }
}
