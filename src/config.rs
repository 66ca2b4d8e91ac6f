use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::{eyre::eyre, Result};
use tracing::{debug, info, warn};

use crate::controller::event_collector::CollectorSettings;

const CONFIG_DIR: &str = ".config/joyshim";
const CONFIG_FILE: &str = "config.toml";

/// Settings shared by all display modes
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Joystick device node
    pub device: PathBuf,
    /// Button whose press ends the cursor, trigger and poll loops
    pub exit_button: u8,
    /// Redraw interval of the threaded cursor visualizer
    pub render_interval_ms: u64,
    /// Interval between polls of the poll mode
    pub poll_interval_ms: u64,
    /// How often the collector logs throughput statistics
    pub stats_interval_secs: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/input/js0"),
            exit_button: 7,
            render_interval_ms: 10,
            poll_interval_ms: 100,
            stats_interval_secs: 10,
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        let mut path = get_home_dir();
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        path
    }

    /// Read the config file, falling back to defaults when it does not exist
    pub async fn load(path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(path)
            .await
            .map_err(|e| eyre!("Failed to check if config file exists: {}", e))?
        {
            warn!(
                "Config file {} does not exist, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

        config
            .validate()
            .map_err(|e| eyre!("Invalid config file {}: {}", path.display(), e))?;

        info!("Loaded config from {}", path.display());
        debug!("Config: {:?}", config);
        Ok(config)
    }

    // Timers reject a zero period
    fn validate(&self) -> Result<()> {
        if self.render_interval_ms == 0 {
            return Err(eyre!("render_interval_ms must be at least 1"));
        }
        if self.poll_interval_ms == 0 {
            return Err(eyre!("poll_interval_ms must be at least 1"));
        }
        Ok(())
    }

    pub fn with_device(mut self, device: Option<PathBuf>) -> Self {
        if let Some(device) = device {
            debug!("Device overridden on command line: {}", device.display());
            self.device = device;
        }
        self
    }

    pub fn collector_settings(&self) -> CollectorSettings {
        CollectorSettings {
            exit_button: self.exit_button,
            stats_interval_secs: self.stats_interval_secs,
        }
    }

    pub fn render_interval(&self) -> Duration {
        Duration::from_millis(self.render_interval_ms.max(1))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

fn get_home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| {
        warn!("Could not determine home directory, using current directory");
        PathBuf::from(".")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(name: &str, content: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("joyshim-{}-{}.toml", name, std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn missing_file_uses_defaults() {
        let config = Config::load(Path::new("/nonexistent/joyshim/config.toml"))
            .await
            .unwrap();
        assert_eq!(config, Config::default());
    }

    #[tokio::test]
    async fn partial_file_keeps_other_defaults() {
        let path = temp_config("partial", "device = \"/dev/input/js1\"\nexit_button = 6\n");
        let config = Config::load(&path).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.device, PathBuf::from("/dev/input/js1"));
        assert_eq!(config.exit_button, 6);
        assert_eq!(config.render_interval(), Duration::from_millis(10));
        assert_eq!(config.collector_settings().exit_button, 6);
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let path = temp_config("malformed", "exit_button = \"seven\"\n");
        let result = Config::load(&path).await;
        std::fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn zero_intervals_are_rejected() {
        let path = temp_config("zero-render", "render_interval_ms = 0\n");
        let result = Config::load(&path).await;
        std::fs::remove_file(&path).unwrap();
        let err = result.unwrap_err().to_string();
        assert!(err.contains("render_interval_ms"), "{err}");

        let path = temp_config("zero-poll", "poll_interval_ms = 0\n");
        let result = Config::load(&path).await;
        std::fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn interval_accessors_never_return_zero() {
        let config: Config = toml::from_str("render_interval_ms = 0\npoll_interval_ms = 0\n").unwrap();
        assert_eq!(config.render_interval(), Duration::from_millis(1));
        assert_eq!(config.poll_interval(), Duration::from_millis(1));
    }

    #[tokio::test]
    async fn out_of_range_stats_interval_is_rejected() {
        for (name, value) in [("stats-huge", "9223372036854775807"), ("stats-negative", "-1")] {
            let path = temp_config(name, &format!("stats_interval_secs = {value}\n"));
            let result = Config::load(&path).await;
            std::fs::remove_file(&path).unwrap();
            assert!(result.is_err(), "stats_interval_secs = {value} was accepted");
        }

        let path = temp_config("stats-max", &format!("stats_interval_secs = {}\n", u32::MAX));
        let config = Config::load(&path).await.unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.collector_settings().stats_interval_secs, u32::MAX);
    }

    #[test]
    fn command_line_device_wins() {
        let config = Config::default().with_device(Some(PathBuf::from("/dev/input/js2")));
        assert_eq!(config.device, PathBuf::from("/dev/input/js2"));
        let config = config.with_device(None);
        assert_eq!(config.device, PathBuf::from("/dev/input/js2"));
        assert!(Config::default_path().ends_with(".config/joyshim/config.toml"));
    }
}
