//! Component settings as persisted by the console, per component kind.

use serde::{Deserialize, Serialize};

use crate::capabilities::RouteKind;

pub const MIN_REPLICAS: u32 = 1;
pub const MAX_REPLICAS: u32 = 20;
pub const MIN_CPU: f64 = 0.1;
pub const MAX_CPU: f64 = 8.0;
pub const MIN_MEMORY_MB: u32 = 128;
pub const MAX_MEMORY_MB: u32 = 16384;
pub const MIN_THRESHOLD: u32 = 1;
pub const MAX_THRESHOLD: u32 = 100;
pub const DEFAULT_EXPOSURE_PORT: u16 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Webapp,
    Worker,
    Cron,
}

impl ComponentKind {
    /// Fresh settings for a component of this kind.
    pub fn default_settings(self) -> ComponentSettings {
        match self {
            Self::Webapp => ComponentSettings::Webapp(WebappSettings::default()),
            Self::Worker => ComponentSettings::Worker(WorkerSettings::default()),
            Self::Cron => ComponentSettings::Cron(CronSettings::default()),
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Webapp => write!(f, "webapp"),
            Self::Worker => write!(f, "worker"),
            Self::Cron => write!(f, "cron"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Reachable only through the in-cluster service
    Cluster,
    /// Routed through the gateway without a public endpoint
    Private,
    /// Public endpoint through the gateway
    Public,
}

impl Visibility {
    pub const ALL: [Visibility; 3] = [Self::Cluster, Self::Private, Self::Public];

    /// True for visibilities that need a gateway.
    pub fn needs_gateway(self) -> bool {
        !matches!(self, Self::Cluster)
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cluster => write!(f, "cluster"),
            Self::Private => write!(f, "private"),
            Self::Public => write!(f, "public"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposureSettings {
    #[serde(rename = "type")]
    pub kind: RouteKind,
    pub port: u16,
    pub visibility: Visibility,
    /// Virtual host, only meaningful for http behind the gateway
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ExposureSettings {
    /// Whether this exposure both accepts and requires a url.
    pub fn takes_url(&self) -> bool {
        self.kind == RouteKind::Http && self.visibility.needs_gateway()
    }
}

impl Default for ExposureSettings {
    fn default() -> Self {
        Self {
            kind: RouteKind::Http,
            port: DEFAULT_EXPOSURE_PORT,
            visibility: Visibility::Cluster,
            url: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Autoscaling {
    pub min: u32,
    pub max: u32,
}

impl Autoscaling {
    /// Min-replicas handler: never lets max fall below the new min.
    pub fn with_min(self, min: u32) -> Self {
        let min = min.clamp(MIN_REPLICAS, MAX_REPLICAS);
        Self {
            min,
            max: self.max.clamp(MIN_REPLICAS, MAX_REPLICAS).max(min),
        }
    }

    /// Max-replicas handler: never lets min rise above the new max.
    pub fn with_max(self, max: u32) -> Self {
        let max = max.clamp(MIN_REPLICAS, MAX_REPLICAS);
        Self {
            min: self.min.clamp(MIN_REPLICAS, MAX_REPLICAS).min(max),
            max,
        }
    }

    pub fn normalized(self) -> Self {
        self.with_min(self.min)
    }
}

impl Default for Autoscaling {
    fn default() -> Self {
        Self { min: 2, max: 10 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthcheckProtocol {
    Http,
    Tcp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Healthcheck {
    pub path: String,
    pub protocol: HealthcheckProtocol,
    pub port: u16,
    pub timeout: u32,
    pub interval: u32,
    pub initial_interval: u32,
    pub failure_threshold: u32,
}

impl Default for Healthcheck {
    fn default() -> Self {
        Self {
            path: "/healthcheck".into(),
            protocol: HealthcheckProtocol::Http,
            port: 80,
            timeout: 3,
            interval: 15,
            initial_interval: 15,
            failure_threshold: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomMetrics {
    pub enabled: bool,
    pub path: String,
    pub port: u16,
}

impl Default for CustomMetrics {
    fn default() -> Self {
        Self {
            enabled: false,
            path: "/metrics".into(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub key: String,
    pub value: String,
}

/// Key of a Kubernetes secret mounted into the component environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRef {
    pub name: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebappSettings {
    pub cpu: f64,
    /// Memory in MB
    pub memory: u32,
    pub cpu_scaling_threshold: u32,
    pub memory_scaling_threshold: u32,
    pub autoscaling: Autoscaling,
    pub healthcheck: Healthcheck,
    pub custom_metrics: CustomMetrics,
    pub envs: Vec<EnvVar>,
    pub secrets: Vec<SecretRef>,
    pub command: Option<String>,
    pub exposure: ExposureSettings,
}

impl Default for WebappSettings {
    fn default() -> Self {
        Self {
            cpu: 0.5,
            memory: 512,
            cpu_scaling_threshold: 80,
            memory_scaling_threshold: 80,
            autoscaling: Autoscaling::default(),
            healthcheck: Healthcheck::default(),
            custom_metrics: CustomMetrics::default(),
            envs: Vec::new(),
            secrets: Vec::new(),
            command: None,
            exposure: ExposureSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerSettings {
    pub cpu: f64,
    pub memory: u32,
    pub cpu_scaling_threshold: u32,
    pub memory_scaling_threshold: u32,
    pub autoscaling: Autoscaling,
    pub custom_metrics: CustomMetrics,
    pub envs: Vec<EnvVar>,
    pub command: Option<String>,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            cpu: 0.5,
            memory: 512,
            cpu_scaling_threshold: 80,
            memory_scaling_threshold: 80,
            autoscaling: Autoscaling::default(),
            custom_metrics: CustomMetrics::default(),
            envs: Vec::new(),
            command: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CronSettings {
    pub cpu: f64,
    pub memory: u32,
    /// Cron expression, e.g. "*/5 * * * *"
    pub schedule: String,
    pub command: Option<String>,
    pub envs: Vec<EnvVar>,
}

impl Default for CronSettings {
    fn default() -> Self {
        Self {
            cpu: 0.5,
            memory: 512,
            schedule: "0 0 * * *".into(),
            command: None,
            envs: Vec::new(),
        }
    }
}

/// Settings of one component. Serializes as the bare settings object; the
/// kind travels next to it on the component record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ComponentSettings {
    Webapp(WebappSettings),
    Worker(WorkerSettings),
    Cron(CronSettings),
}

impl ComponentSettings {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Webapp(_) => ComponentKind::Webapp,
            Self::Worker(_) => ComponentKind::Worker,
            Self::Cron(_) => ComponentKind::Cron,
        }
    }

    pub fn exposure(&self) -> Option<&ExposureSettings> {
        match self {
            Self::Webapp(s) => Some(&s.exposure),
            _ => None,
        }
    }

    /// Clamps resource and scaling values into their allowed ranges.
    pub fn normalize_bounds(&mut self) {
        match self {
            Self::Webapp(s) => {
                s.cpu = clamp_cpu(s.cpu);
                s.memory = s.memory.clamp(MIN_MEMORY_MB, MAX_MEMORY_MB);
                s.cpu_scaling_threshold = s.cpu_scaling_threshold.clamp(MIN_THRESHOLD, MAX_THRESHOLD);
                s.memory_scaling_threshold =
                    s.memory_scaling_threshold.clamp(MIN_THRESHOLD, MAX_THRESHOLD);
                s.autoscaling = s.autoscaling.normalized();
                if s.exposure.port == 0 {
                    s.exposure.port = DEFAULT_EXPOSURE_PORT;
                }
            }
            Self::Worker(s) => {
                s.cpu = clamp_cpu(s.cpu);
                s.memory = s.memory.clamp(MIN_MEMORY_MB, MAX_MEMORY_MB);
                s.cpu_scaling_threshold = s.cpu_scaling_threshold.clamp(MIN_THRESHOLD, MAX_THRESHOLD);
                s.memory_scaling_threshold =
                    s.memory_scaling_threshold.clamp(MIN_THRESHOLD, MAX_THRESHOLD);
                s.autoscaling = s.autoscaling.normalized();
            }
            Self::Cron(s) => {
                s.cpu = clamp_cpu(s.cpu);
                s.memory = s.memory.clamp(MIN_MEMORY_MB, MAX_MEMORY_MB);
            }
        }
    }
}

fn clamp_cpu(cpu: f64) -> f64 {
    if cpu.is_nan() {
        return MIN_CPU;
    }
    cpu.clamp(MIN_CPU, MAX_CPU)
}
