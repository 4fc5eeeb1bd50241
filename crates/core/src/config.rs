use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::operator::Operator;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Key lookup with profile support: tries `{PROFILE}_{KEY}` first, falls back to `{KEY}`.
struct Lookup<'a> {
    profile: &'a str,
    source: &'a dyn Fn(&str) -> Option<String>,
}

impl Lookup<'_> {
    fn opt(&self, key: &str) -> Option<String> {
        if !self.profile.is_empty() {
            let prefixed = format!("{}_{}", self.profile, key);
            if let Some(v) = (self.source)(&prefixed).filter(|s| !s.is_empty()) {
                return Some(v);
            }
        }
        (self.source)(key).filter(|s| !s.is_empty())
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.opt(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T: FromStr + Copy>(&self, key: &str, default: T) -> T {
        match self.opt(key) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(key, value = %raw, "unparseable config value, using default");
                default
            }),
            None => default,
        }
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub operations: OperationTimes,
    pub agent: AgentConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_source("", &|_: &str| None)
    }
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `DISTCALC_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_opt("DISTCALC_PROFILE").unwrap_or_default().to_uppercase();
        Self::from_source(&profile, &env_opt)
    }

    /// Build config for a named profile from an arbitrary key source.
    pub fn from_source(profile: &str, source: &dyn Fn(&str) -> Option<String>) -> Self {
        let profile = profile.to_uppercase();
        let lookup = Lookup {
            profile: &profile,
            source,
        };
        Self {
            server: ServerConfig::from_lookup(&lookup),
            operations: OperationTimes::from_lookup(&lookup),
            agent: AgentConfig::from_lookup(&lookup),
            profile,
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Reject values that would make the orchestrator or the agent misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tol = self.server.verify_tolerance;
        if !tol.is_finite() || tol <= 0.0 {
            return Err(ConfigError::Invalid {
                key: "VERIFY_TOLERANCE",
                reason: format!("must be a positive finite number, got {}", tol),
            });
        }
        if self.agent.computing_power == 0 {
            return Err(ConfigError::Invalid {
                key: "COMPUTING_POWER",
                reason: "must be at least 1".to_string(),
            });
        }
        let url = &self.agent.orchestrator_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: "ORCHESTRATOR_URL",
                reason: format!("expected an http(s) URL, got '{}'", url),
            });
        }
        Ok(())
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:      {}:{}", self.server.host, self.server.port);
        tracing::info!(
            "  operations:  +{}ms -{}ms *{}ms /{}ms",
            self.operations.addition_ms,
            self.operations.subtraction_ms,
            self.operations.multiplication_ms,
            self.operations.division_ms
        );
        tracing::info!("  verify:      tolerance={:e}", self.server.verify_tolerance);
        tracing::info!(
            "  agent:       computing_power={}, orchestrator={}",
            self.agent.computing_power,
            self.agent.orchestrator_url
        );
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// How often the queue depth is logged while tasks are waiting.
    pub queue_report_interval_secs: u64,
    /// Relative tolerance when cross-checking a finished expression.
    pub verify_tolerance: f64,
}

impl ServerConfig {
    fn from_lookup(l: &Lookup<'_>) -> Self {
        Self {
            host: l.or("HOST", "0.0.0.0"),
            port: l.parsed("PORT", 8080),
            queue_report_interval_secs: l.parsed("QUEUE_REPORT_INTERVAL_SECS", 4),
            verify_tolerance: l.parsed("VERIFY_TOLERANCE", 1e-9),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ── Operation durations ───────────────────────────────────────

/// Per-operator duration hints surfaced to workers as `operation_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationTimes {
    pub addition_ms: u64,
    pub subtraction_ms: u64,
    pub multiplication_ms: u64,
    pub division_ms: u64,
}

impl Default for OperationTimes {
    fn default() -> Self {
        Self {
            addition_ms: 200,
            subtraction_ms: 152,
            multiplication_ms: 228,
            division_ms: 300,
        }
    }
}

impl OperationTimes {
    fn from_lookup(l: &Lookup<'_>) -> Self {
        let d = Self::default();
        Self {
            addition_ms: l.parsed("TIME_ADDITION_MS", d.addition_ms),
            subtraction_ms: l.parsed("TIME_SUBTRACTION_MS", d.subtraction_ms),
            multiplication_ms: l.parsed("TIME_MULTIPLICATIONS_MS", d.multiplication_ms),
            division_ms: l.parsed("TIME_DIVISIONS_MS", d.division_ms),
        }
    }

    /// Same hint for every operator (handy for tests and demos).
    pub fn uniform(ms: u64) -> Self {
        Self {
            addition_ms: ms,
            subtraction_ms: ms,
            multiplication_ms: ms,
            division_ms: ms,
        }
    }

    pub fn for_operator(&self, op: Operator) -> u64 {
        match op {
            Operator::Add => self.addition_ms,
            Operator::Sub => self.subtraction_ms,
            Operator::Mul => self.multiplication_ms,
            Operator::Div => self.division_ms,
        }
    }
}

// ── Agent ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Number of concurrent pollers.
    pub computing_power: usize,
    pub orchestrator_url: String,
    /// Pause after an empty poll or a transport failure.
    pub idle_backoff_ms: u64,
    pub request_timeout_ms: u64,
}

impl AgentConfig {
    fn from_lookup(l: &Lookup<'_>) -> Self {
        Self {
            computing_power: l.parsed("COMPUTING_POWER", 1),
            orchestrator_url: l.or("ORCHESTRATOR_URL", "http://localhost:8080"),
            idle_backoff_ms: l.parsed("AGENT_IDLE_BACKOFF_MS", 2000),
            request_timeout_ms: l.parsed("AGENT_REQUEST_TIMEOUT_MS", 5000),
        }
    }

    pub fn idle_backoff(&self) -> Duration {
        Duration::from_millis(self.idle_backoff_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
