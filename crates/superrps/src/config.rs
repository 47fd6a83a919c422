//! Session configuration.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use superrps_engine::RulesConfig;
use superrps_protocol::{Framer, BUFFER_SIZE};

/// Everything a peer needs to know before a session starts.
///
/// Both peers must agree on `unit_size`; the rest is local.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Address the server listens on.
    ///
    /// Default: `0.0.0.0:8011`.
    pub bind_addr: String,

    /// Address the client dials.
    ///
    /// Default: `127.0.0.1:8011`.
    pub server_addr: String,

    pub rules: RulesConfig,

    /// Seed for regeneration. `None` seeds from the OS.
    pub rng_seed: Option<u64>,

    /// GELA372 unit size in bytes, flag included.
    pub unit_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8011".to_string(),
            server_addr: "127.0.0.1:8011".to_string(),
            rules: RulesConfig::default(),
            rng_seed: None,
            unit_size: BUFFER_SIZE,
        }
    }
}

impl SessionConfig {
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// The RNG a session should regenerate with.
    pub fn rng(&self) -> StdRng {
        match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    pub fn framer(&self) -> Framer {
        Framer::new(self.unit_size)
    }
}

/// Builder for [`SessionConfig`].
///
/// ```
/// use superrps::SessionConfig;
///
/// let config = SessionConfig::builder()
///     .server("192.168.1.20:8011")
///     .seed(7)
///     .build();
/// assert_eq!(config.rng_seed, Some(7));
/// assert_eq!(config.bind_addr, "0.0.0.0:8011");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    /// Sets the address the server listens on.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets the address the client dials.
    pub fn server(mut self, addr: &str) -> Self {
        self.config.server_addr = addr.to_string();
        self
    }

    pub fn rules(mut self, rules: RulesConfig) -> Self {
        self.config.rules = rules;
        self
    }

    /// Makes regeneration deterministic.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.rng_seed = Some(seed);
        self
    }

    /// Sets or clears the regeneration seed.
    pub fn rng_seed(mut self, seed: Option<u64>) -> Self {
        self.config.rng_seed = seed;
        self
    }

    pub fn unit_size(mut self, unit_size: usize) -> Self {
        self.config.unit_size = unit_size;
        self
    }

    pub fn build(self) -> SessionConfig {
        self.config
    }
}
