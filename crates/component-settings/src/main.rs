use std::io::Write;

use component_settings::{
    ComponentStore, ExposureOptions, StoredComponent, Submission,
    config::{ClusterSource, Config, Mode},
    crds::cluster::ClusterSpec,
    directory::{ClusterDirectory, FileClusterDirectory, KubeClusterDirectory},
    resolve, submit,
};
use kube::Client;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Writes the accepted submission to stdout for the persistence API client.
struct StdoutStore;

impl ComponentStore for StdoutStore {
    fn save(&mut self, submission: &Submission) -> anyhow::Result<()> {
        let mut out = std::io::stdout().lock();
        serde_json::to_writer_pretty(&mut out, submission)?;
        writeln!(out)?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let input = std::io::read_to_string(std::io::stdin())?;
    let stored: StoredComponent = serde_json::from_str(&input)?;
    info!(environment = %config.environment_id, kind = %stored.kind, "reconciling component settings");

    let clusters = list_clusters(&config.cluster_source).await;
    let capabilities = resolve(&clusters, &config.environment_id);
    let draft = stored.load(&capabilities);

    match config.mode {
        Mode::Reconcile => {
            let options = draft
                .settings
                .exposure()
                .map(|e| ExposureOptions::evaluate(e, &capabilities));
            let out = serde_json::json!({
                "name": draft.name,
                "kind": draft.settings.kind(),
                "settings": draft.settings,
                "capabilities": capabilities,
                "exposureOptions": options,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Mode::Submit(mode) => {
            submit(&mut StdoutStore, draft, &capabilities, mode)?;
        }
    }
    Ok(())
}

/// Cluster data is advisory: when it cannot be read, every capability is
/// treated as unavailable instead of failing the run.
async fn list_clusters(source: &ClusterSource) -> Vec<ClusterSpec> {
    let listed = match source {
        ClusterSource::Kube => match Client::try_default().await {
            Ok(client) => KubeClusterDirectory { client }.list_clusters().await,
            Err(e) => Err(e.into()),
        },
        ClusterSource::File(path) => {
            FileClusterDirectory { path: path.clone() }
                .list_clusters()
                .await
        }
    };
    listed.unwrap_or_else(|e| {
        warn!(error = ?e, "cluster directory unavailable, exposure capabilities disabled");
        Vec::new()
    })
}
