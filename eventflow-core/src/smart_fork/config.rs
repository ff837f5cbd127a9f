// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The default number of upstream pulls between two garbage collection passes.
pub const DEFAULT_CLEAN_INTERVAL: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartForkConfig {
    /// Number of events pulled from upstream before fully consumed events are discarded.
    ///
    /// Smaller values keep less memory around at the cost of cleaning more often. Events are
    /// never discarded before every output read them, no matter how this is set.
    pub clean_interval: usize,
}

impl SmartForkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clean_interval == 0 {
            return Err(ConfigError::ZeroCleanInterval);
        }
        Ok(())
    }
}

impl Default for SmartForkConfig {
    fn default() -> Self {
        Self {
            clean_interval: DEFAULT_CLEAN_INTERVAL,
        }
    }
}
