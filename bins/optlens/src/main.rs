//! OptionLens CLI Binary
//!
//! Entry point for the `optlens` tool: runs analysis passes over option
//! chain snapshots, inspects the volatility history and manages the
//! configuration file.

use analytics::history::{create_store, HistoryStore, StoreType};
use analytics::{
    build_strategies, MetricsEngine, MetricsResult, OptionChainSnapshot, PricingParams,
    StrategyTemplate, VolatilityTracker,
};
use anyhow::{Context, Result};
use cli::{Cli, Commands};
use config::{
    generate_default_config, load_config_or_default, save_config, validate_config,
    AnalyticsConfig, AppConfig, HistoryConfig, ValidationReport,
};
use observability::{init_logging, LogFormat};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Output of `analyze`; `strategies` is null unless requested
#[derive(Serialize)]
struct AnalysisReport {
    metrics: MetricsResult,
    strategies: Option<Vec<StrategyTemplate>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let config_found = cli.config.exists();
    let app_config = match cli.command {
        Commands::Init { .. } => AppConfig::default(),
        _ => load_config_or_default(&cli.config)?,
    };

    let format = match cli.log_format {
        Some(arg) => LogFormat::parse(arg.as_str()),
        None => LogFormat::parse(&app_config.logging().format),
    }
    .unwrap_or_default();
    init_logging("optlens", format)?;

    debug!(?cli, "CLI arguments parsed");
    if !config_found && !matches!(cli.command, Commands::Init { .. }) {
        warn!(path = ?cli.config, "Config file not found, using built-in defaults");
    }

    match cli.command {
        Commands::Analyze {
            symbol,
            chain,
            spot,
            vix,
            days,
            rate,
            strategies,
        } => {
            info!("Executing 'analyze' command");
            let overrides = PricingOverrides { days, rate };
            analyze_command(&app_config, &symbol, &chain, spot, vix, overrides, strategies).await
        }
        Commands::History => {
            info!("Executing 'history' command");
            history_command(&app_config).await
        }
        Commands::Validate => {
            info!("Executing 'validate' command");
            validate_command(&app_config)
        }
        Commands::Init { output } => {
            info!("Executing 'init' command");
            init_command(output)
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct PricingOverrides {
    days: Option<u32>,
    rate: Option<f64>,
}

fn pricing_params(analytics: &AnalyticsConfig, overrides: PricingOverrides) -> PricingParams {
    PricingParams {
        strike_step: analytics.strike_step,
        risk_free_rate: overrides.rate.unwrap_or(analytics.risk_free_rate),
        dividend_yield: analytics.dividend_yield,
        days_to_expiry: overrides.days.unwrap_or(analytics.days_to_expiry),
    }
}

/// Pricing parameters after CLI overrides, rejected when out of domain
fn analysis_params(
    analytics: &AnalyticsConfig,
    overrides: PricingOverrides,
) -> Result<PricingParams> {
    let params = pricing_params(analytics, overrides);
    params
        .validate()
        .context("Invalid pricing parameters after applying overrides")?;
    Ok(params)
}

fn history_store(history: &HistoryConfig) -> Result<Arc<dyn HistoryStore>> {
    let store_type = StoreType::parse(&history.backend, Some(PathBuf::from(&history.path)))
        .with_context(|| format!("Unsupported history backend: {}", history.backend))?;
    Ok(create_store(store_type))
}

/// Refuse to run against a configuration with errors
fn ensure_valid(config: &AppConfig) -> Result<()> {
    let report = validate_config(config);

    for warning in &report.warnings {
        warn!(field = %warning.field, message = %warning.message, "Configuration warning");
    }

    if !report.is_valid() {
        error!(
            error_count = report.errors.len(),
            "Configuration validation failed"
        );
        for err in &report.errors {
            error!("{}", err);
        }
        anyhow::bail!("Cannot run due to configuration errors");
    }

    Ok(())
}

async fn analyze_command(
    config: &AppConfig,
    symbol: &str,
    chain_path: &Path,
    spot: Option<f64>,
    vix: Option<f64>,
    overrides: PricingOverrides,
    with_strategies: bool,
) -> Result<()> {
    ensure_valid(config)?;
    let params = analysis_params(&config.analytics(), overrides)?;

    let content = tokio::fs::read_to_string(chain_path)
        .await
        .with_context(|| format!("Failed to read option chain: {:?}", chain_path))?;
    let snapshot = OptionChainSnapshot::from_json_str(&content)
        .with_context(|| format!("Failed to parse option chain: {:?}", chain_path))?;

    let spot = spot.or(snapshot.underlying_value);
    if spot.is_none() {
        warn!(symbol, "No spot price given and none in the chain document");
    }

    let history = config.history();
    let tracker = VolatilityTracker::with_window(history_store(&history)?, history.window);
    let engine = MetricsEngine::from_tracker(tracker, params);

    let metrics = engine.compute(symbol, spot, vix, Some(&snapshot)).await;

    let strategies = with_strategies.then(|| {
        let strategy = config.strategy();
        build_strategies(
            symbol,
            &metrics,
            strategy.capital,
            strategy.risk_pct,
            strategy.fallback_expected_move,
        )
    });

    let report = AnalysisReport {
        metrics,
        strategies,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

async fn history_command(config: &AppConfig) -> Result<()> {
    ensure_valid(config)?;

    let history = config.history();
    let engine = MetricsEngine::from_tracker(
        VolatilityTracker::with_window(history_store(&history)?, history.window),
        pricing_params(&config.analytics(), PricingOverrides::default()),
    );

    let snapshot = engine.history().await?;

    println!("\n=== Volatility History ===\n");
    println!("Backend: {} ({})", history.backend, history.path);
    println!("Window: {}", history.window);
    println!();
    print_series("vix", &snapshot.vix);
    print_series("atm_iv", &snapshot.atm_iv);

    Ok(())
}

fn print_series(name: &str, series: &[f64]) {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        println!("{:<8} empty", name);
        return;
    };

    let (min, max) = series
        .iter()
        .fold((*first, *first), |(lo, hi), v| (lo.min(*v), hi.max(*v)));

    println!(
        "{:<8} n={:<4} min={:.2} max={:.2} last={:.2}",
        name,
        series.len(),
        min,
        max,
        last
    );
}

fn validate_command(config: &AppConfig) -> Result<()> {
    let report = validate_config(config);
    print_report(&report);

    if !report.is_valid() {
        anyhow::bail!("Configuration validation failed");
    }

    let analytics = config.analytics();
    let history = config.history();

    println!("[ok] Configuration is valid!");
    println!();
    println!("Strike step: {}", analytics.strike_step);
    println!("Risk-free rate: {}", analytics.risk_free_rate);
    println!("Days to expiry: {}", analytics.days_to_expiry);
    println!("History: {} ({}), window {}", history.backend, history.path, history.window);
    println!("Log format: {}", config.logging().format);

    Ok(())
}

fn print_report(report: &ValidationReport) {
    println!("\n=== Configuration Validation Report ===\n");

    if !report.defaults_applied.is_empty() {
        println!("Defaults Applied ({}):", report.defaults_applied.len());
        for default in &report.defaults_applied {
            println!("  [info] {} = {}", default.field, default.value);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
    }
}

fn init_command<P: AsRef<Path>>(output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!(?output_path, "Initializing new configuration file");

    let config = generate_default_config();
    save_config(&config, output_path)?;

    println!("[ok] Configuration file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!();
    println!("Next steps:");
    println!("  1. Edit the strike step and rate for your underlying");
    println!(
        "  2. Run 'optlens --config {:?} validate' to check configuration",
        output_path
    );
    println!(
        "  3. Run 'optlens --config {:?} analyze --symbol NIFTY --chain chain.json'",
        output_path
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::history::InMemoryHistoryStore;

    #[test]
    fn test_overrides_replace_configured_values() {
        let overrides = PricingOverrides {
            days: Some(3),
            rate: Some(0.065),
        };

        let params = analysis_params(&AnalyticsConfig::default(), overrides).unwrap();

        assert_eq!(params.days_to_expiry, 3);
        assert_eq!(params.risk_free_rate, 0.065);
        assert_eq!(params.strike_step, 100.0);
    }

    #[test]
    fn test_rate_override_is_validated() {
        for rate in [-0.05, f64::NAN, f64::INFINITY] {
            let overrides = PricingOverrides {
                days: None,
                rate: Some(rate),
            };
            assert!(analysis_params(&AnalyticsConfig::default(), overrides).is_err());
        }
    }

    #[tokio::test]
    async fn test_report_shape_is_stable() {
        let engine = MetricsEngine::new(
            Arc::new(InMemoryHistoryStore::new()),
            PricingParams::default(),
        );
        let metrics = engine.compute("NIFTY", Some(48700.0), Some(13.0), None).await;

        let plain = serde_json::to_value(AnalysisReport {
            metrics: metrics.clone(),
            strategies: None,
        })
        .unwrap();
        assert_eq!(plain["metrics"]["symbol"], "NIFTY");
        assert!(plain["strategies"].is_null());

        let templates = build_strategies("NIFTY", &metrics, 100_000.0, 2.0, 400.0);
        let full = serde_json::to_value(AnalysisReport {
            metrics,
            strategies: Some(templates),
        })
        .unwrap();
        assert_eq!(full["metrics"]["symbol"], "NIFTY");
        assert_eq!(full["strategies"].as_array().map(Vec::len), Some(3));
    }
}
