use thiserror::Error;

use crate::settings::Visibility;

/// Submit-time failure the user has to fix before the component is saved.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("component name is required")]
    MissingName,
    #[error("component name cannot contain spaces: {0:?}")]
    NameContainsSpaces(String),
    #[error("url is required for http exposure with {visibility} visibility")]
    MissingUrl { visibility: Visibility },
    #[error("schedule is required for cron components")]
    MissingSchedule,
    #[error("schedule {0:?} is not a cron expression (five fields or an @ macro)")]
    InvalidSchedule(String),
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error(transparent)]
    Kube(#[from] kube::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error("cluster document must be a list or an object with `items`")]
    Shape,
}
