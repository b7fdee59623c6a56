use std::env;

use serde::{Deserialize, Serialize};

use crate::model::Operation;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub timings: OperationTimings,
    pub agent: AgentConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `CALCFLOW_PROFILE`. When set (e.g. `DEV`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("CALCFLOW_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        let server = ServerConfig::from_env_profiled(p);
        let agent = AgentConfig::from_env_profiled(p, &server);
        Self {
            profile: p.to_string(),
            timings: OperationTimings::from_env_profiled(p),
            server,
            agent,
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:   {}:{} (cors: {})", self.server.host, self.server.port, self.server.cors_origin);
        tracing::info!(
            "  timings:  +={}ms -={}ms *={}ms /={}ms",
            self.timings.addition_ms,
            self.timings.subtraction_ms,
            self.timings.multiplication_ms,
            self.timings.division_ms
        );
        tracing::info!(
            "  agent:    computing_power={}, wait_time={}ms, orchestrator={}",
            self.agent.computing_power,
            self.agent.wait_time_ms,
            self.agent.orchestrator_url
        );
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "ORCHESTRATOR_PORT", 8080),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", "*"),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ── Operation timings ─────────────────────────────────────────

/// Simulated per-operator cost in milliseconds, handed to workers with each task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationTimings {
    pub addition_ms: u64,
    pub subtraction_ms: u64,
    pub multiplication_ms: u64,
    pub division_ms: u64,
}

impl OperationTimings {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            addition_ms: profiled_env_u64(p, "TIME_ADDITION_MS", 0),
            subtraction_ms: profiled_env_u64(p, "TIME_SUBTRACTION_MS", 0),
            multiplication_ms: profiled_env_u64(p, "TIME_MULTIPLICATIONS_MS", 0),
            division_ms: profiled_env_u64(p, "TIME_DIVISIONS_MS", 0),
        }
    }

    pub fn for_operation(&self, operation: Operation) -> u64 {
        match operation {
            Operation::Add => self.addition_ms,
            Operation::Subtract => self.subtraction_ms,
            Operation::Multiply => self.multiplication_ms,
            Operation::Divide => self.division_ms,
        }
    }
}

// ── Agent (worker) ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Number of concurrent polling loops.
    pub computing_power: usize,
    /// Pause between polls, in milliseconds.
    pub wait_time_ms: u64,
    pub orchestrator_url: String,
}

impl AgentConfig {
    fn from_env_profiled(p: &str, server: &ServerConfig) -> Self {
        let default_url = format!("http://localhost:{}", server.port);
        Self {
            computing_power: profiled_env_usize(p, "COMPUTING_POWER", 1).max(1),
            wait_time_ms: profiled_env_u64(p, "WAIT_TIME", 100),
            orchestrator_url: profiled_env_or(p, "ORCHESTRATOR_URL", &default_url),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            computing_power: 1,
            wait_time_ms: 100,
            orchestrator_url: "http://localhost:8080".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timings_lookup_by_operation() {
        let timings = OperationTimings {
            addition_ms: 1,
            subtraction_ms: 2,
            multiplication_ms: 3,
            division_ms: 4,
        };
        assert_eq!(timings.for_operation(Operation::Add), 1);
        assert_eq!(timings.for_operation(Operation::Subtract), 2);
        assert_eq!(timings.for_operation(Operation::Multiply), 3);
        assert_eq!(timings.for_operation(Operation::Divide), 4);
        assert_eq!(OperationTimings::default().for_operation(Operation::Divide), 0);
    }

    #[test]
    fn profiled_lookup_prefers_prefixed_key() {
        // Unique key names so parallel tests don't race on the environment.
        env::set_var("CFTEST_PROFILED_KEY", "plain");
        env::set_var("QA_CFTEST_PROFILED_KEY", "prefixed");
        assert_eq!(profiled_env_or("QA", "CFTEST_PROFILED_KEY", "d"), "prefixed");
        assert_eq!(profiled_env_or("", "CFTEST_PROFILED_KEY", "d"), "plain");
        assert_eq!(profiled_env_or("QA", "CFTEST_MISSING_KEY", "d"), "d");
        env::remove_var("CFTEST_PROFILED_KEY");
        env::remove_var("QA_CFTEST_PROFILED_KEY");
    }

    #[test]
    fn bad_numbers_fall_back_to_default() {
        env::set_var("CFTEST_BAD_NUMBER", "not-a-number");
        assert_eq!(profiled_env_u64("", "CFTEST_BAD_NUMBER", 42), 42);
        env::remove_var("CFTEST_BAD_NUMBER");
    }

    #[test]
    fn bind_addr_joins_host_and_port() {
        let server = ServerConfig {
            host: "127.0.0.1".into(),
            port: 9000,
            cors_origin: "*".into(),
        };
        assert_eq!(server.bind_addr(), "127.0.0.1:9000");
    }
}
