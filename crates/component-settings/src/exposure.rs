//! Constraints tying a component's exposure to its environment's gateway.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::info;

use crate::capabilities::{ExposureCapabilities, RouteKind};
use crate::settings::{ExposureSettings, Visibility};

/// Route kinds selectable for `visibility` under `caps`.
pub fn available_types(visibility: Visibility, caps: &ExposureCapabilities) -> BTreeSet<RouteKind> {
    if visibility.needs_gateway() {
        caps.supported_route_kinds.clone()
    } else {
        RouteKind::ALL.into_iter().collect()
    }
}

/// Rewrites `exposure` to the nearest state allowed by `caps`.
///
/// Order matters: the type is checked against the visibility as stored, then
/// the visibility is downgraded, and only then is the url re-evaluated since
/// either rewrite can invalidate it. Running this on its own output is a
/// no-op.
pub fn enforce(mut exposure: ExposureSettings, caps: &ExposureCapabilities) -> ExposureSettings {
    let available = available_types(exposure.visibility, caps);
    if !available.contains(&exposure.kind)
        && let Some(&first) = available.first()
    {
        info!(
            from = %exposure.kind,
            to = %first,
            visibility = %exposure.visibility,
            "exposure type not available, substituting"
        );
        exposure.kind = first;
    }

    if exposure.visibility.needs_gateway() && !caps.gateway_usable() {
        info!(
            from = %exposure.visibility,
            gateway_available = caps.gateway_available,
            has_reference = caps.gateway_reference.is_some(),
            "no usable gateway, downgrading visibility to cluster"
        );
        exposure.visibility = Visibility::Cluster;
    }

    let takes_url = exposure.takes_url();
    let url = exposure
        .url
        .take()
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty());
    if url.is_some() && !takes_url {
        info!(kind = %exposure.kind, visibility = %exposure.visibility, "clearing url");
    }
    exposure.url = url.filter(|_| takes_url);
    exposure
}

/// Condition the form should surface next to the exposure fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExposureNotice {
    GatewayApiUnavailable,
    GatewayReferenceMissing,
    NoRouteKindsAvailable,
    UrlRequired,
}

impl std::fmt::Display for ExposureNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GatewayApiUnavailable => write!(
                f,
                "Gateway API is not available. Only \"cluster\" visibility can be used."
            ),
            Self::GatewayReferenceMissing => write!(
                f,
                "No gateway is configured for this environment. Only \"cluster\" visibility can be used."
            ),
            Self::NoRouteKindsAvailable => write!(
                f,
                "No Gateway API route resources are available. Use \"cluster\" visibility instead."
            ),
            Self::UrlRequired => write!(f, "A URL is required for http exposure through the gateway."),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Choice<T> {
    pub value: T,
    pub selectable: bool,
}

/// What the exposure form may offer for the current edit state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposureOptions {
    pub types: Vec<Choice<RouteKind>>,
    pub visibilities: Vec<Choice<Visibility>>,
    pub url_required: bool,
    pub notices: Vec<ExposureNotice>,
}

impl ExposureOptions {
    pub fn evaluate(exposure: &ExposureSettings, caps: &ExposureCapabilities) -> Self {
        let available = available_types(exposure.visibility, caps);
        let gateway = caps.gateway_usable();

        let mut notices = Vec::new();
        if !caps.gateway_available {
            notices.push(ExposureNotice::GatewayApiUnavailable);
        } else if caps.gateway_reference.is_none() {
            notices.push(ExposureNotice::GatewayReferenceMissing);
        }
        if exposure.visibility.needs_gateway() && available.is_empty() {
            notices.push(ExposureNotice::NoRouteKindsAvailable);
        }
        let url_required = exposure.takes_url();
        if url_required && exposure.url.is_none() {
            notices.push(ExposureNotice::UrlRequired);
        }

        Self {
            types: RouteKind::ALL
                .into_iter()
                .map(|value| Choice {
                    value,
                    selectable: available.contains(&value),
                })
                .collect(),
            visibilities: Visibility::ALL
                .into_iter()
                .map(|value| Choice {
                    value,
                    selectable: !value.needs_gateway() || gateway,
                })
                .collect(),
            url_required,
            notices,
        }
    }
}
