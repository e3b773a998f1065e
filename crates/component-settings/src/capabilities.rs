//! Exposure capabilities derived from the clusters of an environment.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::crds::cluster::ClusterSpec;

/// Route protocol category a component can be exposed with.
///
/// Declaration order is the substitution preference: `http > tcp > udp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    Http,
    Tcp,
    Udp,
}

impl RouteKind {
    pub const ALL: [RouteKind; 3] = [Self::Http, Self::Tcp, Self::Udp];

    /// Maps a Gateway API resource name to the route kind it serves.
    ///
    /// Accepts both the short form (`HTTP`) and the resource kind
    /// (`HTTPRoute`), case-insensitively. Anything else yields `None`.
    pub fn from_resource(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "http" | "httproute" => Some(Self::Http),
            "tcp" | "tcproute" => Some(Self::Tcp),
            "udp" | "udproute" => Some(Self::Udp),
            _ => None,
        }
    }
}

impl std::fmt::Display for RouteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Tcp => write!(f, "tcp"),
            Self::Udp => write!(f, "udp"),
        }
    }
}

/// Namespace and name of the gateway routes attach to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayReference {
    pub namespace: String,
    pub name: String,
}

impl GatewayReference {
    /// Builds a reference only when both parts are non-empty.
    pub fn usable(namespace: Option<&str>, name: Option<&str>) -> Option<Self> {
        let namespace = namespace.map(str::trim).filter(|s| !s.is_empty())?;
        let name = name.map(str::trim).filter(|s| !s.is_empty())?;
        Some(Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }
}

/// What the clusters of one environment can do for exposure.
///
/// The default value is the fully unavailable set, which is also what any
/// missing or malformed cluster data degrades to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposureCapabilities {
    pub gateway_available: bool,
    pub supported_route_kinds: BTreeSet<RouteKind>,
    pub gateway_reference: Option<GatewayReference>,
}

impl ExposureCapabilities {
    /// True when private/public exposure can actually be rendered.
    pub fn gateway_usable(&self) -> bool {
        self.gateway_available && self.gateway_reference.is_some()
    }
}

/// Derives the capabilities of `environment_id` from the known clusters.
///
/// Clusters are scanned in input order; the first complete gateway binding
/// wins. Route kinds are only collected from gateway-enabled clusters.
pub fn resolve(clusters: &[ClusterSpec], environment_id: &str) -> ExposureCapabilities {
    let mut caps = ExposureCapabilities::default();
    for cluster in clusters
        .iter()
        .filter(|c| c.environment_id() == Some(environment_id))
    {
        if cluster.gateway_api_enabled() {
            caps.gateway_available = true;
            for resource in cluster.gateway_resources() {
                match RouteKind::from_resource(resource) {
                    Some(kind) => {
                        caps.supported_route_kinds.insert(kind);
                    }
                    None => debug!(resource = %resource, "ignoring unknown gateway resource"),
                }
            }
        }
        if caps.gateway_reference.is_none()
            && let Some(reference) = cluster.gateway_reference()
        {
            caps.gateway_reference =
                GatewayReference::usable(reference.namespace.as_deref(), reference.name.as_deref());
        }
    }
    debug!(
        environment = %environment_id,
        gateway_available = caps.gateway_available,
        route_kinds = ?caps.supported_route_kinds,
        has_reference = caps.gateway_reference.is_some(),
        "resolved exposure capabilities"
    );
    caps
}
