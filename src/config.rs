// In: src/config.rs

//! The single source of truth for obfuscation job configuration.
//!
//! This module defines the unified `SamarConfig` struct, which is designed
//! to be created once at the application boundary (e.g., from a CLI parser
//! or a user's JSON file) and then handed to [`crate::Obfuscator`].

use serde::{Deserialize, Serialize};

use chrono_tz::Tz;

use crate::error::SamarError;
use crate::kernels::sip::SipState64;
use crate::markov::MarkovModelParameters;

/// The unified configuration for one obfuscation job.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "snake_case")]
pub struct SamarConfig {
    /// Arbitrary seed string. The 64-bit root seed every per-column seed
    /// derives from is its keyed hash; keep it secret and at least 10 bytes
    /// long if the input must not be recoverable.
    #[serde(default)]
    pub seed: String,

    /// Tuning knobs of the string model. Carried inside persisted models.
    #[serde(default)]
    pub markov: MarkovModelParameters,

    /// Calendar used to split DateTime values into date and time-of-day.
    /// Defaults to UTC; servers typically pass their local timezone.
    #[serde(default = "default_timezone")]
    pub timezone: Tz,

    /// Number of output rows the driver should produce. `None` means one
    /// full pass over the source. A larger value makes the driver loop over
    /// the input with a seed rotation between passes.
    #[serde(default)]
    pub limit: Option<u64>,
}

fn default_timezone() -> Tz {
    Tz::UTC
}

impl Default for SamarConfig {
    fn default() -> Self {
        Self {
            seed: String::new(),
            markov: MarkovModelParameters::default(),
            timezone: default_timezone(),
            limit: None,
        }
    }
}

impl SamarConfig {
    /// Parses a config from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, SamarError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The 64-bit root seed: the keyed hash of the seed string.
    pub fn root_seed(&self) -> u64 {
        let mut state = SipState64::new();
        state.update_bytes(self.seed.as_bytes());
        state.finish()
    }
}
