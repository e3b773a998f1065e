//! Reconciliation of component settings against the exposure capabilities
//! of the environment a component is deployed to.

pub mod capabilities;
pub mod component;
pub mod config;
pub mod crds;
pub mod directory;
pub mod error;
pub mod exposure;
pub mod migration;
pub mod reconciler;
pub mod settings;
pub mod validation;

pub use capabilities::{ExposureCapabilities, GatewayReference, RouteKind, resolve};
pub use component::{ComponentDraft, ComponentStore, StoredComponent, Submission, submit};
pub use error::{DirectoryError, SubmitError, ValidationError};
pub use exposure::{ExposureNotice, ExposureOptions};
pub use migration::RawSettings;
pub use reconciler::{
    apply_capability_change, apply_type_change, apply_url_change, apply_visibility_change,
    reconcile,
};
pub use settings::{ComponentKind, ComponentSettings, ExposureSettings, Visibility};
pub use validation::{SubmitMode, validate_submission};
