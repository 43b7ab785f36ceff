//! Run-level configuration: the fields the slave command line and blueprint
//! configuration expose, layered on top of [`op_core::RunConfig`].

use clap::Parser;
use op_core::RunConfig;

/// Top-level configuration for one slave invocation.
///
/// Mirrors the slave command line's defaults (§6): all fields but the run
/// window itself are optional in practice, so every one carries a sane
/// default via [`Default`].
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Start/end time, update-rate window width, and RNG seed.
    pub run: RunConfig,

    /// 0..5, clamped; mapped to a `tracing` filter directive rather than a
    /// bespoke level enum.
    pub log_level: u8,

    pub log_file: String,
    pub lib_path: String,
    pub configs_path: String,
    pub results_path: String,

    /// Assumed maximum deceleration (m/s^2) used by spawn control's
    /// collision-avoidance gate.
    pub max_deceleration: f64,
    /// Assumed time-to-brake (s) used by the same gate.
    pub assumed_time_to_brake_s: f64,
}

impl SimConfig {
    pub fn new(run: RunConfig) -> Self {
        Self::default_with_run(run)
    }

    fn default_with_run(run: RunConfig) -> Self {
        Self {
            run,
            log_level: 0,
            log_file: "OpenPassSlave.log".to_string(),
            lib_path: "lib".to_string(),
            configs_path: "configs".to_string(),
            results_path: "results".to_string(),
            max_deceleration: 6.0,
            assumed_time_to_brake_s: 2.0,
        }
    }

    /// Clamp `log_level` into the documented `0..5` range and turn it into a
    /// `tracing-subscriber` env-filter directive, most-verbose at 5.
    pub fn tracing_filter_directive(&self) -> &'static str {
        match self.log_level.min(5) {
            0 => "error",
            1 => "warn",
            2 => "info",
            3 => "debug",
            _ => "trace",
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::default_with_run(RunConfig::new(0, 0, 0))
    }
}

/// The slave command line (§6): every flag optional, with the same defaults
/// `SimConfig` itself carries.
#[derive(Parser, Clone, Debug)]
#[command(name = "OpenPassSlave")]
pub struct SlaveArgs {
    #[arg(long = "logLevel", default_value_t = 0)]
    pub log_level: u8,

    #[arg(long = "logFile", default_value = "OpenPassSlave.log")]
    pub log_file: String,

    #[arg(long = "lib", default_value = "lib")]
    pub lib_path: String,

    #[arg(long = "configs", default_value = "configs")]
    pub configs_path: String,

    #[arg(long = "results", default_value = "results")]
    pub results_path: String,
}

impl SlaveArgs {
    /// Layer the parsed command line onto an otherwise-default `SimConfig`.
    /// `run` still has to come from the resolved scenario/profile
    /// configuration, which this crate doesn't parse (§1 Non-goals).
    pub fn into_config(self, run: RunConfig) -> SimConfig {
        SimConfig {
            run,
            log_level: self.log_level,
            log_file: self.log_file,
            lib_path: self.lib_path,
            configs_path: self.configs_path,
            results_path: self.results_path,
            ..SimConfig::default_with_run(RunConfig::new(0, 0, 0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_slave_command_line() {
        let config = SimConfig::default();
        assert_eq!(config.log_level, 0);
        assert_eq!(config.log_file, "OpenPassSlave.log");
        assert_eq!(config.lib_path, "lib");
        assert_eq!(config.configs_path, "configs");
        assert_eq!(config.results_path, "results");
    }

    #[test]
    fn log_level_clamps_and_maps_to_a_filter() {
        let mut config = SimConfig::default();
        config.log_level = 9;
        assert_eq!(config.tracing_filter_directive(), "trace");
    }

    #[test]
    fn slave_args_with_no_flags_match_the_documented_defaults() {
        let args = SlaveArgs::parse_from(["OpenPassSlave"]);
        let config = args.into_config(RunConfig::new(0, 10_000, 0));
        assert_eq!(config.log_level, 0);
        assert_eq!(config.log_file, "OpenPassSlave.log");
        assert_eq!(config.lib_path, "lib");
        assert_eq!(config.configs_path, "configs");
        assert_eq!(config.results_path, "results");
        assert_eq!(config.run.end_time_ms, 10_000);
    }

    #[test]
    fn slave_args_override_individual_flags() {
        let args = SlaveArgs::parse_from(["OpenPassSlave", "--logLevel", "3", "--results", "out"]);
        let config = args.into_config(RunConfig::new(0, 0, 0));
        assert_eq!(config.log_level, 3);
        assert_eq!(config.results_path, "out");
        assert_eq!(config.lib_path, "lib");
    }
}
