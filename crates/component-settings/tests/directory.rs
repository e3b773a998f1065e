use std::path::PathBuf;

use component_settings::{
    GatewayReference, RouteKind, StoredComponent, Visibility,
    directory::{ClusterDirectory, FileClusterDirectory},
    resolve,
};
use serde_json::json;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[tokio::test]
async fn file_directory_feeds_the_resolver() {
    let dir = FileClusterDirectory {
        path: fixture("clusters.yaml"),
    };
    let clusters = dir.list_clusters().await.unwrap();
    assert_eq!(clusters.len(), 3, "malformed record is skipped");

    let prod = resolve(&clusters, "prod");
    assert!(prod.gateway_available);
    assert_eq!(
        prod.supported_route_kinds.iter().copied().collect::<Vec<_>>(),
        vec![RouteKind::Http, RouteKind::Tcp]
    );
    assert_eq!(
        prod.gateway_reference,
        Some(GatewayReference {
            namespace: "gateways".into(),
            name: "edge".into(),
        })
    );

    let staging = resolve(&clusters, "staging");
    assert!(staging.gateway_available);
    assert!(!staging.gateway_usable());
}

#[tokio::test]
async fn loading_a_component_against_file_clusters() {
    let clusters = FileClusterDirectory {
        path: fixture("clusters.yaml"),
    }
    .list_clusters()
    .await
    .unwrap();
    let stored: StoredComponent = serde_json::from_value(json!({
        "name": "api",
        "kind": "webapp",
        "settings": {"exposure": {"type": "udp", "port": 53, "visibility": "public"}}
    }))
    .unwrap();

    let prod = stored.clone().load(&resolve(&clusters, "prod"));
    let e = prod.settings.exposure().unwrap();
    assert_eq!(e.kind, RouteKind::Http);
    assert_eq!(e.visibility, Visibility::Public);

    let staging = stored.load(&resolve(&clusters, "staging"));
    let e = staging.settings.exposure().unwrap();
    assert_eq!(e.kind, RouteKind::Udp);
    assert_eq!(e.visibility, Visibility::Cluster);
}

#[tokio::test]
async fn missing_file_is_an_error() {
    let dir = FileClusterDirectory {
        path: fixture("does-not-exist.yaml"),
    };
    assert!(dir.list_clusters().await.is_err());
}
