/*!
 * Scheduler Configuration
 *
 * Boot-time parameters for the scheduler context and its dispatch loops.
 */

use crate::core::errors::ConfigError;
use crate::core::limits::{
    priority_in_range, DEFAULT_CORES, DEFAULT_PRIO, DEFAULT_QUANTUM_TICKS, DEFAULT_TICK_INTERVAL,
    MAX_CORES,
};
use crate::core::types::Priority;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SchedulerConfig {
    /// Number of execution cores, one dispatch loop each (default: 1)
    pub cores: usize,

    /// Ticks per quantum (default: 5)
    pub quantum_ticks: u32,

    /// Simulated timer period (default: 1ms)
    pub tick_interval: Duration,

    /// Priority for processes spawned without one (default: 10)
    pub default_priority: Priority,
}

impl SchedulerConfig {
    /// Create default configuration
    pub fn new() -> Self {
        Self {
            cores: DEFAULT_CORES,
            quantum_ticks: DEFAULT_QUANTUM_TICKS,
            tick_interval: DEFAULT_TICK_INTERVAL,
            default_priority: DEFAULT_PRIO,
        }
    }

    /// Single core, one-tick quantum: every tick is a scheduling point
    pub fn deterministic() -> Self {
        Self {
            cores: 1,
            quantum_ticks: 1,
            ..Self::new()
        }
    }

    pub fn with_cores(mut self, cores: usize) -> Self {
        self.cores = cores;
        self
    }

    pub fn with_quantum_ticks(mut self, ticks: u32) -> Self {
        self.quantum_ticks = ticks;
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_default_priority(mut self, priority: Priority) -> Self {
        self.default_priority = priority;
        self
    }

    /// Check that every field is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cores == 0 || self.cores > MAX_CORES {
            return Err(ConfigError::OutOfRange(format!(
                "cores must be between 1 and {}, got {}",
                MAX_CORES, self.cores
            )));
        }
        if self.quantum_ticks == 0 {
            return Err(ConfigError::OutOfRange(
                "quantum_ticks must be at least 1".to_string(),
            ));
        }
        if self.tick_interval.is_zero() {
            return Err(ConfigError::OutOfRange(
                "tick_interval must be non-zero".to_string(),
            ));
        }
        if !priority_in_range(self.default_priority as i64) {
            return Err(ConfigError::OutOfRange(format!(
                "default_priority {} outside priority range",
                self.default_priority
            )));
        }
        Ok(())
    }

    /// Load configuration from the environment on top of the defaults
    ///
    /// Environment variables:
    /// - KERNEL_CORES
    /// - KERNEL_QUANTUM_TICKS
    /// - KERNEL_TICK_MICROS
    /// - KERNEL_DEFAULT_PRIORITY
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new();

        if let Some(cores) = env_parse::<usize>("KERNEL_CORES")? {
            config.cores = cores;
        }
        if let Some(ticks) = env_parse::<u32>("KERNEL_QUANTUM_TICKS")? {
            config.quantum_ticks = ticks;
        }
        if let Some(micros) = env_parse::<u64>("KERNEL_TICK_MICROS")? {
            config.tick_interval = Duration::from_micros(micros);
        }
        if let Some(priority) = env_parse::<Priority>("KERNEL_DEFAULT_PRIORITY")? {
            config.default_priority = priority;
        }

        config.validate()?;
        Ok(config)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn env_parse<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(None),
    }
}
