//! Alert thresholds, loadable from TOML with the standard limits as
//! defaults.

use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Thresholds {
    /// CPU usage limit in percent
    #[serde(default = "default_cpu")]
    pub cpu_percent: f32,

    /// Memory usage limit in percent
    #[serde(default = "default_memory")]
    pub memory_percent: f32,

    /// Disk usage limit in percent
    #[serde(default = "default_disk")]
    pub disk_percent: f32,

    /// Running process count limit
    #[serde(default = "default_processes")]
    pub process_count: usize,
}

fn default_cpu() -> f32 {
    80.0
}

fn default_memory() -> f32 {
    80.0
}

fn default_disk() -> f32 {
    80.0
}

fn default_processes() -> usize {
    300
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpu_percent: default_cpu(),
            memory_percent: default_memory(),
            disk_percent: default_disk(),
            process_count: default_processes(),
        }
    }
}

impl Thresholds {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let thresholds = toml::from_str(&content)?;
        Ok(thresholds)
    }
}
