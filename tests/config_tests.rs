use std::io::Write;
use std::time::Duration;

use polyedge::application::engine::{ArbitrageEngine, EngineConfig};
use polyedge::domain::market_state::Normalization;
use polyedge::error::{ConfigError, Error};
use polyedge::infrastructure::config::settings::Config;
use tempfile::NamedTempFile;

const ENGINE: &str = r#"
[engine]
alpha = 0.9
min_divergence = 0.025
max_iterations = 100
tolerance = 1e-6
solver_timeout_seconds = 5.0
min_profit_after_costs = 0.01
execution_cost = 0.02
liquidity_param = 100.0
"#;

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes())
        .expect("write temp config");
    file
}

#[test]
fn config_loads_full_file() {
    let toml = r#"
[engine]
alpha = 0.8
min_divergence = 0.05
max_iterations = 250
tolerance = 1e-7
solver_timeout_seconds = 2.5
min_profit_after_costs = 0.02
execution_cost = 0.01
liquidity_param = 50.0
max_step = 0.25
trade_threshold = 0.005
position_scale = 10.0
normalization = "per_market"

[service]
analysis_interval_ms = 250
channel_capacity = 64

[logging]
level = "debug"
format = "json"
"#;
    let file = write_temp_config(toml);
    let config = Config::load(file.path()).expect("valid config");

    let engine = config.engine_config().unwrap();
    assert_eq!(engine.alpha, 0.8);
    assert_eq!(engine.max_iterations, 250);
    assert_eq!(engine.solver_timeout(), Duration::from_millis(2500));
    assert_eq!(engine.max_step, 0.25);
    assert_eq!(engine.normalization, Normalization::PerMarket);
    assert_eq!(
        config.service_config().analysis_interval,
        Duration::from_millis(250)
    );
    assert_eq!(config.service.channel_capacity, 64);
    assert_eq!(config.logging.format, "json");

    assert!(ArbitrageEngine::new(engine).is_ok());
}

#[test]
fn config_rejects_alpha_outside_unit_interval() {
    let toml = ENGINE.replace("alpha = 0.9", "alpha = 1.5");
    let file = write_temp_config(&toml);

    match Config::load(file.path()) {
        Err(Error::Config(ConfigError::InvalidValue { field: "alpha", .. })) => {}
        Err(err) => panic!("Expected invalid alpha error, got {err}"),
        Ok(_) => panic!("Expected alpha 1.5 to be rejected"),
    }
}

#[test]
fn config_rejects_non_positive_liquidity() {
    let toml = ENGINE.replace("liquidity_param = 100.0", "liquidity_param = 0.0");
    let file = write_temp_config(&toml);

    assert!(matches!(
        Config::load(file.path()),
        Err(Error::Config(ConfigError::InvalidValue {
            field: "liquidity_param",
            ..
        }))
    ));
}

#[test]
fn config_rejects_zero_analysis_interval() {
    let toml = format!("{ENGINE}\n[service]\nanalysis_interval_ms = 0\n");
    let file = write_temp_config(&toml);

    assert!(matches!(
        Config::load(file.path()),
        Err(Error::Config(ConfigError::InvalidValue {
            field: "analysis_interval_ms",
            ..
        }))
    ));
}

#[test]
fn config_requires_engine_section() {
    let file = write_temp_config("[logging]\nlevel = \"info\"\n");

    assert!(matches!(
        Config::load(file.path()),
        Err(Error::Config(ConfigError::MissingField { field: "engine" }))
    ));
}

#[test]
fn config_reports_unreadable_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("absent.toml");

    assert!(matches!(
        Config::load(&missing),
        Err(Error::Config(ConfigError::ReadFile(_)))
    ));
}

#[test]
fn engine_rejects_invalid_update() {
    let engine = ArbitrageEngine::new(EngineConfig::default()).unwrap();

    let result = engine.update_config(EngineConfig {
        tolerance: -1.0,
        ..EngineConfig::default()
    });

    assert!(matches!(
        result,
        Err(ConfigError::InvalidValue {
            field: "tolerance",
            ..
        })
    ));
    assert_eq!(engine.config(), EngineConfig::default());
}
