use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A cluster known to the console, as listed by the cluster directory.
///
/// Every field is optional: records coming from older directories routinely
/// omit the gateway block, and a missing value must read as "not available".
#[derive(CustomResource, Debug, Serialize, Deserialize, Clone, Default, PartialEq, JsonSchema)]
#[kube(
    group = "components.tron.dev",
    version = "v1alpha1",
    kind = "Cluster",
    plural = "clusters",
    shortname = "tcl"
)]
pub struct ClusterSpec {
    /// Environment this cluster is grouped into
    pub environment: Option<EnvironmentRef>,
    /// Gateway API support and binding
    pub gateway: Option<GatewaySpec>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, JsonSchema)]
pub struct EnvironmentRef {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, JsonSchema)]
pub struct GatewaySpec {
    pub api: Option<GatewayApiSpec>,
    /// Gateway that routes for this cluster attach to
    pub reference: Option<GatewayReferenceSpec>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, JsonSchema)]
pub struct GatewayApiSpec {
    pub enabled: Option<bool>,
    /// Route resources installed, e.g. ["HTTPRoute", "TCPRoute"]
    pub resources: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, JsonSchema)]
pub struct GatewayReferenceSpec {
    pub namespace: Option<String>,
    pub name: Option<String>,
}

impl ClusterSpec {
    pub fn environment_id(&self) -> Option<&str> {
        self.environment.as_ref()?.id.as_deref()
    }

    pub fn gateway_api_enabled(&self) -> bool {
        self.gateway
            .as_ref()
            .and_then(|g| g.api.as_ref())
            .and_then(|api| api.enabled)
            .unwrap_or(false)
    }

    pub fn gateway_resources(&self) -> &[String] {
        self.gateway
            .as_ref()
            .and_then(|g| g.api.as_ref())
            .and_then(|api| api.resources.as_deref())
            .unwrap_or_default()
    }

    pub fn gateway_reference(&self) -> Option<&GatewayReferenceSpec> {
        self.gateway.as_ref()?.reference.as_ref()
    }
}
