//! Flow timeout configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounds on the flow's two suspension points: waiting for a counterparty's
/// signature response and waiting for the notary's commit result. Neither
/// wait may hang indefinitely.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Maximum seconds to wait for each counterparty's signature reply.
    #[serde(default = "default_sign_timeout_secs")]
    pub sign_timeout_secs: u64,

    /// Maximum seconds to wait for the notary's commit result.
    #[serde(default = "default_notary_timeout_secs")]
    pub notary_timeout_secs: u64,
}

fn default_sign_timeout_secs() -> u64 {
    30
}

fn default_notary_timeout_secs() -> u64 {
    30
}

impl FlowConfig {
    pub fn sign_timeout(&self) -> Duration {
        Duration::from_secs(self.sign_timeout_secs)
    }

    pub fn notary_timeout(&self) -> Duration {
        Duration::from_secs(self.notary_timeout_secs)
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            sign_timeout_secs: default_sign_timeout_secs(),
            notary_timeout_secs: default_notary_timeout_secs(),
        }
    }
}
