//! Tool configuration from environment.
//!
//! Environment values override whatever the optional JSON engine file sets;
//! anything left unset keeps the engine defaults.

use anyhow::{Context, Result};
use soar_core::{EngineConfig, PolarConfig};
use std::env;
use std::fs;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub mc: Option<f64>,
    pub cruise_efficiency: Option<f64>,
    pub polar_v_ref: Option<f64>,
    pub safety_height: Option<f64>,
    /// Default `tracing` filter directive
    pub log: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let number = |key: &str| lookup(key).and_then(|s| s.trim().parse::<f64>().ok());
        Self {
            mc: number("SOAR_MC"),
            cruise_efficiency: number("SOAR_CRUISE_EFFICIENCY"),
            polar_v_ref: number("SOAR_POLAR_VREF"),
            safety_height: number("SOAR_SAFETY_HEIGHT"),
            log: lookup("SOAR_LOG").unwrap_or_else(|| "soar_core=info".to_string()),
        }
    }

    /// Engine configuration: the JSON file at `path` if given, then the
    /// environment overrides.
    pub fn engine_config(&self, path: Option<&Path>) -> Result<EngineConfig> {
        let mut config = match path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading engine config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing engine config {}", path.display()))?
            }
            None => EngineConfig::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    pub fn apply(&self, config: &mut EngineConfig) {
        if let Some(mc) = self.mc {
            config.glide.mc = mc.max(0.0);
        }
        if let Some(efficiency) = self.cruise_efficiency {
            config.glide.cruise_efficiency = efficiency;
        }
        if let Some(height) = self.safety_height {
            config.task.safety_height_arrival = height;
        }
        if let Some(v) = self.polar_v_ref {
            match &mut config.polar {
                PolarConfig::Parabolic { v_ref, .. } => *v_ref = v,
                PolarConfig::Measured { .. } => {
                    tracing::warn!("SOAR_POLAR_VREF ignored for a measured polar")
                }
            }
        }
    }
}

/// Install the global subscriber. `RUST_LOG` directives come first and
/// `directive` is added on top; `json` switches to JSON lines.
pub fn init_tracing(directive: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(directive.parse()?);
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()?;
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()?;
    }
    Ok(())
}
