//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Installment planning configuration.
    #[serde(default)]
    pub planner: PlannerConfig,
    /// Report configuration.
    #[serde(default)]
    pub reports: ReportsConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Installment planning configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PlannerConfig {
    /// Days between installments when a request does not specify them.
    #[serde(default = "default_interval_days")]
    pub default_interval_days: u32,
    /// Largest installment count accepted in a single plan.
    #[serde(default = "default_max_installments")]
    pub max_installments: u32,
}

fn default_interval_days() -> u32 {
    30
}

fn default_max_installments() -> u32 {
    360
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            default_interval_days: default_interval_days(),
            max_installments: default_max_installments(),
        }
    }
}

/// Report configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportsConfig {
    /// Flat tax rate applied to positive pre-tax results in the DRE.
    #[serde(default = "default_tax_rate")]
    pub estimated_tax_rate: Decimal,
    /// Forecast window in days.
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u32,
    /// Payable category names classified as cost of goods sold.
    #[serde(default = "default_cost_categories")]
    pub cost_of_goods_categories: Vec<String>,
}

fn default_tax_rate() -> Decimal {
    Decimal::new(10, 2)
}

fn default_forecast_days() -> u32 {
    30
}

fn default_cost_categories() -> Vec<String> {
    [
        "Custo dos Produtos",
        "Matéria Prima",
        "Mão de Obra Direta",
        "Custos de Produção",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            estimated_tax_rate: default_tax_rate(),
            forecast_days: default_forecast_days(),
            cost_of_goods_categories: default_cost_categories(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "caixa=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `CAIXA__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("CAIXA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
