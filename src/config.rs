//! Service configuration.
//!
//! Every field has a default, so an empty JSON object is a valid configuration.
use serde::de::Error;
use std::time::Duration;

/// Query service configuration
///
/// # Example
///
/// ```rust
/// use poimap::Config;
///
/// let config = Config::from_json(r#"{ "zoom_threshold": 6, "seed": 42 }"#).unwrap();
/// assert_eq!(config.zoom_threshold, 6);
/// assert_eq!(config.cluster_count, 200);
/// assert_eq!(config.max_iterations, 5);
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Zoom levels strictly below this are answered with the cluster view
    #[serde(default = "Config::default_zoom_threshold")]
    pub zoom_threshold: i32,

    /// Number of cluster centers in the zoomed-out view
    #[serde(default = "Config::default_cluster_count")]
    pub cluster_count: usize,

    /// Upper bound on assign/update rounds. The default is a coarse, fast
    /// approximation rather than a converged clustering.
    #[serde(default = "Config::default_max_iterations")]
    pub max_iterations: usize,

    /// Fixed seed for cluster initialisation; `None` seeds from OS entropy
    #[serde(default)]
    pub seed: Option<u64>,

    /// How long a request waits for an in-flight cluster computation
    #[serde(default)]
    pub cluster_wait_timeout_ms: Option<u64>,
}

impl Config {
    const fn default_zoom_threshold() -> i32 {
        8
    }

    const fn default_cluster_count() -> usize {
        200
    }

    const fn default_max_iterations() -> usize {
        5
    }

    pub fn with_zoom_threshold(mut self, threshold: i32) -> Self {
        self.zoom_threshold = threshold;
        self
    }

    pub fn with_cluster_count(mut self, count: usize) -> Self {
        assert!(count > 0, "Cluster count must be greater than zero");
        self.cluster_count = count;
        self
    }

    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Bound how long a request waits for an in-flight cluster computation.
    ///
    /// The timeout is stored in whole milliseconds, rounded up.
    pub fn with_cluster_wait_timeout(mut self, timeout: Duration) -> Self {
        assert!(!timeout.is_zero(), "Cluster wait timeout must be greater than zero");
        let millis = timeout.as_nanos().div_ceil(1_000_000);
        self.cluster_wait_timeout_ms = Some(u64::try_from(millis).unwrap_or(u64::MAX));
        self
    }

    pub fn cluster_wait_timeout(&self) -> Option<Duration> {
        self.cluster_wait_timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.cluster_count == 0 {
            return Err("Cluster count must be greater than zero".to_string());
        }

        if self.cluster_count > 100_000 {
            log::warn!(
                "Cluster count of {} is very large; the zoomed-out view will be slow to compute",
                self.cluster_count
            );
        }

        if self.cluster_wait_timeout_ms == Some(0) {
            return Err("Cluster wait timeout must be greater than zero".to_string());
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            zoom_threshold: Self::default_zoom_threshold(),
            cluster_count: Self::default_cluster_count(),
            max_iterations: Self::default_max_iterations(),
            seed: None,
            cluster_wait_timeout_ms: None,
        }
    }
}
