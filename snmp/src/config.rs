/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::time::Duration;

use serde::{Deserialize, Serialize};

/* Config */

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct Config {
    pub port: u16,
    /// Request timeout in seconds.
    pub timeout: f64,
    /// How walks react to agents returning non-increasing OIDs.
    pub errors: ErrorHandling,
    pub bulk: BulkConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 161,
            timeout: 2.0,
            errors: ErrorHandling::Strict,
            bulk: BulkConfig::default(),
        }
    }
}

impl Config {
    pub(crate) fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout)
    }
}

#[derive(
    Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Debug,
)]
#[serde(rename_all = "snake_case")]
pub enum ErrorHandling {
    /// Propagate agent misbehaviour to the caller.
    Strict,
    /// Log a warning, finish the offending subtree and continue the
    /// others.
    Warn,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct BulkConfig {
    /// Repetitions requested per bulk walk round.
    pub bulk_size: u32,
    /// Default list length for a single bulk get.
    pub max_list_size: u32,
}

impl Default for BulkConfig {
    fn default() -> Self {
        BulkConfig {
            bulk_size: 10,
            max_list_size: 1,
        }
    }
}
