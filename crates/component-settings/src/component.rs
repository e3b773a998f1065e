//! Loading components for editing and handing them back for persistence.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::capabilities::ExposureCapabilities;
use crate::error::SubmitError;
use crate::migration::RawSettings;
use crate::reconciler::{apply_capability_change, apply_url_change, reconcile};
use crate::settings::{ComponentKind, ComponentSettings};
use crate::validation::{SubmitMode, validate_submission};

/// A component as returned by the persistence API, settings in any shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredComponent {
    pub name: Option<String>,
    pub kind: ComponentKind,
    /// Older records keep the vhost on the component instead of the exposure
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub settings: Value,
}

impl StoredComponent {
    /// Reconciles the stored settings into an editable draft.
    pub fn load(self, capabilities: &ExposureCapabilities) -> ComponentDraft {
        let settings = match reconcile(
            RawSettings::from_value(self.settings),
            capabilities,
            self.kind.default_settings(),
        ) {
            ComponentSettings::Webapp(s) if s.exposure.url.is_none() && self.url.is_some() => {
                ComponentSettings::Webapp(apply_url_change(s, self.url, capabilities))
            }
            other => other,
        };
        ComponentDraft {
            name: self.name,
            settings,
        }
    }
}

/// In-progress edit state of one component.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDraft {
    pub name: Option<String>,
    pub settings: ComponentSettings,
}

/// Payload handed to the persistence API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub name: Option<String>,
    pub kind: ComponentKind,
    pub settings: ComponentSettings,
}

/// Persistence collaborator.
pub trait ComponentStore {
    fn save(&mut self, submission: &Submission) -> anyhow::Result<()>;
}

/// Validates `draft` and saves it. Capability constraints are enforced once
/// more first, so a stale draft can never persist a gateway visibility the
/// environment cannot serve. Nothing reaches `store` when validation fails.
pub fn submit<S: ComponentStore>(
    store: &mut S,
    draft: ComponentDraft,
    capabilities: &ExposureCapabilities,
    mode: SubmitMode,
) -> Result<Submission, SubmitError> {
    let draft = ComponentDraft {
        settings: apply_capability_change(draft.settings, capabilities),
        ..draft
    };
    if let Err(err) = validate_submission(&draft, mode) {
        warn!(error = %err, name = ?draft.name, "submission blocked");
        return Err(err.into());
    }
    let submission = Submission {
        name: draft.name.map(|n| n.trim().to_string()),
        kind: draft.settings.kind(),
        settings: draft.settings,
    };
    store.save(&submission)?;
    info!(name = ?submission.name, kind = %submission.kind, "component submitted");
    Ok(submission)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{GatewayReference, RouteKind};
    use crate::error::ValidationError;
    use crate::settings::{Visibility, WebappSettings};
    use serde_json::json;

    #[derive(Default)]
    struct RecordingStore {
        saved: Vec<Submission>,
    }

    impl ComponentStore for RecordingStore {
        fn save(&mut self, submission: &Submission) -> anyhow::Result<()> {
            self.saved.push(submission.clone());
            Ok(())
        }
    }

    struct FailingStore;

    impl ComponentStore for FailingStore {
        fn save(&mut self, _submission: &Submission) -> anyhow::Result<()> {
            anyhow::bail!("backend unavailable")
        }
    }

    fn http_gateway() -> ExposureCapabilities {
        ExposureCapabilities {
            gateway_available: true,
            supported_route_kinds: [RouteKind::Http].into_iter().collect(),
            gateway_reference: Some(GatewayReference {
                namespace: "gw".into(),
                name: "public".into(),
            }),
        }
    }

    #[test]
    fn component_level_url_is_carried_into_exposure() {
        let stored: StoredComponent = serde_json::from_value(json!({
            "name": "shop",
            "kind": "webapp",
            "url": "shop.example.com",
            "settings": {"exposure": {"type": "http", "port": 80, "visibility": "public"}}
        }))
        .unwrap();
        let draft = stored.load(&http_gateway());
        assert_eq!(
            draft.settings.exposure().and_then(|e| e.url.as_deref()),
            Some("shop.example.com")
        );
    }

    #[test]
    fn missing_settings_load_as_defaults() {
        let stored: StoredComponent = serde_json::from_value(json!({"name": "jobs", "kind": "worker"})).unwrap();
        let draft = stored.load(&ExposureCapabilities::default());
        assert_eq!(draft.settings, ComponentKind::Worker.default_settings());
    }

    #[test]
    fn invalid_submission_never_reaches_store() {
        let mut store = RecordingStore::default();
        let mut settings = WebappSettings::default();
        settings.exposure.visibility = Visibility::Public;
        let draft = ComponentDraft {
            name: Some("web".into()),
            settings: ComponentSettings::Webapp(settings),
        };
        let err = submit(&mut store, draft, &http_gateway(), SubmitMode::Create).unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Validation(ValidationError::MissingUrl { .. })
        ));
        assert!(store.saved.is_empty());
    }

    #[test]
    fn stale_gateway_visibility_is_downgraded_before_save() {
        let mut store = RecordingStore::default();
        let mut settings = WebappSettings::default();
        settings.exposure.visibility = Visibility::Private;
        settings.exposure.url = Some("old.example.com".into());
        let draft = ComponentDraft {
            name: Some("web".into()),
            settings: ComponentSettings::Webapp(settings),
        };
        let saved = submit(&mut store, draft, &ExposureCapabilities::default(), SubmitMode::Update).unwrap();
        let exposure = saved.settings.exposure().unwrap();
        assert_eq!(exposure.visibility, Visibility::Cluster);
        assert_eq!(exposure.url, None);
        assert_eq!(store.saved, vec![saved]);
    }

    #[test]
    fn store_failure_surfaces() {
        let draft = ComponentDraft {
            name: Some("jobs".into()),
            settings: ComponentKind::Worker.default_settings(),
        };
        let err = submit(&mut FailingStore, draft, &ExposureCapabilities::default(), SubmitMode::Create)
            .unwrap_err();
        assert!(matches!(err, SubmitError::Store(_)));
    }
}
