use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `OUD_REWARDS__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub program: ProgramConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

/// Loyalty program business constants. The defaults are part of the
/// externally observable API contract — change them deliberately.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgramConfig {
    #[serde(default = "default_program_name")]
    pub name: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Base points per AED spent, pre-multiplier (0.10 => 10 pts per 100 AED per 1%).
    #[serde(default = "default_base_points_rate")]
    pub base_points_rate: f64,
    /// AED value of one redeemed point.
    #[serde(default = "default_redemption_rate")]
    pub redemption_rate: f64,
    /// Multiplier applied to points and cashback on premium categories.
    #[serde(default = "default_special_category_multiplier")]
    pub special_category_multiplier: f64,
    /// Earned points expire this many days after the earn.
    #[serde(default = "default_points_expiry_days")]
    pub points_expiry_days: i64,
    /// Flat points granted per successful referral, tier-independent.
    #[serde(default = "default_referral_bonus_points")]
    pub referral_bonus_points: u64,
}

// Default functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_metrics_port() -> u16 {
    9091
}
fn default_program_name() -> String {
    "Oud Rewards".to_string()
}
fn default_currency() -> String {
    "AED".to_string()
}
fn default_base_points_rate() -> f64 {
    0.10
}
fn default_redemption_rate() -> f64 {
    0.1
}
fn default_special_category_multiplier() -> f64 {
    1.5
}
fn default_points_expiry_days() -> i64 {
    365
}
fn default_referral_bonus_points() -> u64 {
    500
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            port: default_metrics_port(),
        }
    }
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            name: default_program_name(),
            currency: default_currency(),
            base_points_rate: default_base_points_rate(),
            redemption_rate: default_redemption_rate(),
            special_category_multiplier: default_special_category_multiplier(),
            points_expiry_days: default_points_expiry_days(),
            referral_bonus_points: default_referral_bonus_points(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            program: ProgramConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("OUD_REWARDS")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_constants_hold_by_default() {
        let cfg = ProgramConfig::default();
        assert_eq!(cfg.base_points_rate, 0.10);
        assert_eq!(cfg.redemption_rate, 0.1);
        assert_eq!(cfg.special_category_multiplier, 1.5);
        assert_eq!(cfg.points_expiry_days, 365);
        assert_eq!(cfg.referral_bonus_points, 500);
        assert_eq!(cfg.currency, "AED");
    }
}
