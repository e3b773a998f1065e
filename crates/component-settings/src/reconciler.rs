//! Normalizes stored settings into schema-current, capability-consistent form.

use tracing::debug;

use crate::capabilities::{ExposureCapabilities, RouteKind};
use crate::exposure::enforce;
use crate::migration::{RawSettings, merge_over};
use crate::settings::{ComponentSettings, Visibility, WebappSettings};

/// Reconciles stored settings against `defaults` and `capabilities`.
///
/// The kind of the result is the kind of `defaults`. Legacy endpoint records
/// are migrated first, then the stored fields are merged over the defaults,
/// bounds are clamped and, for webapps, the exposure constraints are
/// enforced. Never fails; the output of a reconcile is a fixed point.
pub fn reconcile(
    stored: RawSettings,
    capabilities: &ExposureCapabilities,
    defaults: ComponentSettings,
) -> ComponentSettings {
    if stored.is_legacy() {
        debug!(kind = %defaults.kind(), "migrating legacy endpoint settings");
    }
    let fields = stored.into_current();
    let mut settings = match defaults {
        ComponentSettings::Webapp(d) => ComponentSettings::Webapp(merge_over(d, fields)),
        ComponentSettings::Worker(d) => ComponentSettings::Worker(merge_over(d, fields)),
        ComponentSettings::Cron(d) => ComponentSettings::Cron(merge_over(d, fields)),
    };
    settings.normalize_bounds();
    apply_capability_change(settings, capabilities)
}

/// User picked a visibility. Gateway visibilities fall back to `cluster`
/// when the environment has no usable gateway.
pub fn apply_visibility_change(
    mut settings: WebappSettings,
    requested: Visibility,
    capabilities: &ExposureCapabilities,
) -> WebappSettings {
    settings.exposure.visibility = if requested.needs_gateway() && !capabilities.gateway_usable() {
        debug!(requested = %requested, "gateway visibility requested without a usable gateway");
        Visibility::Cluster
    } else {
        requested
    };
    settings.exposure = enforce(settings.exposure, capabilities);
    settings
}

/// User picked an exposure type.
pub fn apply_type_change(
    mut settings: WebappSettings,
    requested: RouteKind,
    capabilities: &ExposureCapabilities,
) -> WebappSettings {
    settings.exposure.kind = requested;
    settings.exposure = enforce(settings.exposure, capabilities);
    settings
}

/// User edited the url. An empty value clears it.
pub fn apply_url_change(
    mut settings: WebappSettings,
    url: Option<String>,
    capabilities: &ExposureCapabilities,
) -> WebappSettings {
    settings.exposure.url = url;
    settings.exposure = enforce(settings.exposure, capabilities);
    settings
}

/// Capabilities changed, e.g. another environment or an updated cluster list.
/// Only webapps carry exposure, other kinds come back untouched.
pub fn apply_capability_change(
    settings: ComponentSettings,
    capabilities: &ExposureCapabilities,
) -> ComponentSettings {
    match settings {
        ComponentSettings::Webapp(mut s) => {
            s.exposure = enforce(s.exposure, capabilities);
            ComponentSettings::Webapp(s)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::GatewayReference;
    use crate::settings::{Autoscaling, ComponentKind, CronSettings, ExposureSettings};
    use serde_json::json;

    fn caps(kinds: &[RouteKind]) -> ExposureCapabilities {
        ExposureCapabilities {
            gateway_available: true,
            supported_route_kinds: kinds.iter().copied().collect(),
            gateway_reference: Some(GatewayReference {
                namespace: "gateways".into(),
                name: "edge".into(),
            }),
        }
    }

    fn webapp(settings: ComponentSettings) -> WebappSettings {
        match settings {
            ComponentSettings::Webapp(s) => s,
            other => panic!("expected webapp, got {}", other.kind()),
        }
    }

    #[test]
    fn empty_store_yields_defaults() {
        let out = reconcile(
            RawSettings::from_value(json!({})),
            &ExposureCapabilities::default(),
            ComponentKind::Webapp.default_settings(),
        );
        assert_eq!(out, ComponentKind::Webapp.default_settings());
    }

    #[test]
    fn cron_only_gets_defaulting() {
        let out = reconcile(
            RawSettings::from_value(json!({"schedule": "*/5 * * * *", "memory": 20})),
            &ExposureCapabilities::default(),
            ComponentKind::Cron.default_settings(),
        );
        assert_eq!(
            out,
            ComponentSettings::Cron(CronSettings {
                schedule: "*/5 * * * *".into(),
                memory: 128,
                ..Default::default()
            })
        );
    }

    #[test]
    fn worker_ignores_exposure_fields() {
        let out = reconcile(
            RawSettings::from_value(json!({
                "autoscaling": {"min": 4, "max": 3},
                "exposure": {"type": "tcp", "port": 9000, "visibility": "public"}
            })),
            &caps(&[RouteKind::Tcp]),
            ComponentKind::Worker.default_settings(),
        );
        let ComponentSettings::Worker(w) = out else {
            panic!("expected worker");
        };
        assert_eq!(w.autoscaling, Autoscaling { min: 4, max: 4 });
        let v = serde_json::to_value(&w).unwrap();
        assert!(v.get("exposure").is_none());
    }

    #[test]
    fn stored_public_http_survives_with_gateway() {
        let out = webapp(reconcile(
            RawSettings::from_value(json!({
                "exposure": {"type": "http", "port": 8080, "visibility": "public", "url": "shop.example.com"}
            })),
            &caps(&[RouteKind::Http]),
            ComponentKind::Webapp.default_settings(),
        ));
        assert_eq!(
            out.exposure,
            ExposureSettings {
                kind: RouteKind::Http,
                port: 8080,
                visibility: Visibility::Public,
                url: Some("shop.example.com".into()),
            }
        );
    }

    #[test]
    fn visibility_change_without_gateway_stays_cluster() {
        let settings = WebappSettings::default();
        let out = apply_visibility_change(settings, Visibility::Public, &ExposureCapabilities::default());
        assert_eq!(out.exposure.visibility, Visibility::Cluster);
    }

    #[test]
    fn visibility_change_reselects_type() {
        let settings = WebappSettings::default();
        let out = apply_visibility_change(settings, Visibility::Private, &caps(&[RouteKind::Udp]));
        assert_eq!(out.exposure.visibility, Visibility::Private);
        assert_eq!(out.exposure.kind, RouteKind::Udp);
    }

    #[test]
    fn switching_to_tcp_clears_url() {
        let c = caps(&[RouteKind::Http, RouteKind::Tcp]);
        let settings = apply_visibility_change(WebappSettings::default(), Visibility::Public, &c);
        let settings = apply_url_change(settings, Some("api.example.com".into()), &c);
        assert_eq!(settings.exposure.url.as_deref(), Some("api.example.com"));
        let settings = apply_type_change(settings, RouteKind::Tcp, &c);
        assert_eq!(settings.exposure.kind, RouteKind::Tcp);
        assert_eq!(settings.exposure.url, None);
    }

    #[test]
    fn losing_the_gateway_downgrades_existing_edit() {
        let c = caps(&[RouteKind::Http]);
        let settings = apply_visibility_change(WebappSettings::default(), Visibility::Public, &c);
        let settings = apply_url_change(settings, Some("web.example.com".into()), &c);
        let out = webapp(apply_capability_change(
            ComponentSettings::Webapp(settings),
            &ExposureCapabilities::default(),
        ));
        assert_eq!(out.exposure.visibility, Visibility::Cluster);
        assert_eq!(out.exposure.url, None);
    }

    #[test]
    fn capability_change_leaves_cron_alone() {
        let cron = ComponentKind::Cron.default_settings();
        assert_eq!(apply_capability_change(cron.clone(), &caps(&[])), cron);
    }
}
