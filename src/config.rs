use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub billing: BillingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingConfig {
    /// Plan assigned to users with no subscription row.
    #[serde(default = "default_free_plan_slug")]
    pub free_plan_slug: String,
    /// Seconds between period-rollover sweeps.
    #[serde(default = "default_rollover_interval_secs")]
    pub rollover_interval_secs: u64,
    #[serde(default = "default_true")]
    pub seed_catalog: bool,
    #[serde(default = "default_products_table")]
    pub products_table: String,
    #[serde(default = "default_product_owner_column")]
    pub product_owner_column: String,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            free_plan_slug: default_free_plan_slug(),
            rollover_interval_secs: default_rollover_interval_secs(),
            seed_catalog: true,
            products_table: default_products_table(),
            product_owner_column: default_product_owner_column(),
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_free_plan_slug() -> String {
    "free".to_string()
}

fn default_rollover_interval_secs() -> u64 {
    24 * 3600
}

fn default_true() -> bool {
    true
}

fn default_products_table() -> String {
    "products".to_string()
}

fn default_product_owner_column() -> String {
    "user_id".to_string()
}

impl Config {
    pub fn from_toml() -> AppResult<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::parse(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // 数据库 URL 在无配置文件时必须提供
                let database_url = env::var("DATABASE_URL").map_err(|_| {
                    AppError::ConfigError(format!(
                        "DATABASE_URL is not set and {config_path} does not exist"
                    ))
                })?;
                Config {
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: default_max_connections(),
                    },
                    billing: BillingConfig::default(),
                }
            }
            Err(e) => {
                return Err(AppError::ConfigError(format!(
                    "Failed to read {config_path}: {e}"
                )));
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn parse(config_str: &str) -> AppResult<Self> {
        toml::from_str(config_str)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config: {e}")))
    }

    // 环境变量覆盖（即便文件存在时也覆盖）
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("BILLING_FREE_PLAN_SLUG") {
            self.billing.free_plan_slug = v;
        }
        if let Ok(v) = env::var("BILLING_ROLLOVER_INTERVAL_SECS")
            && let Ok(n) = v.parse()
        {
            self.billing.rollover_interval_secs = n;
        }
        if let Ok(v) = env::var("BILLING_SEED_CATALOG")
            && let Ok(b) = v.parse()
        {
            self.billing.seed_catalog = b;
        }
        if let Ok(v) = env::var("BILLING_PRODUCTS_TABLE") {
            self.billing.products_table = v;
        }
        if let Ok(v) = env::var("BILLING_PRODUCT_OWNER_COLUMN") {
            self.billing.product_owner_column = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn billing_section_is_optional() {
        let config = Config::parse(
            r#"
            [database]
            url = "postgres://localhost/shop"
            "#,
        )
        .unwrap();
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.billing.free_plan_slug, "free");
        assert_eq!(config.billing.rollover_interval_secs, 86_400);
        assert!(config.billing.seed_catalog);
    }

    #[test]
    fn billing_values_are_read() {
        let config = Config::parse(
            r#"
            [database]
            url = "postgres://localhost/shop"
            max_connections = 4

            [billing]
            free_plan_slug = "hobby"
            rollover_interval_secs = 3600
            seed_catalog = false
            products_table = "store_products"
            "#,
        )
        .unwrap();
        assert_eq!(config.database.max_connections, 4);
        assert_eq!(config.billing.free_plan_slug, "hobby");
        assert_eq!(config.billing.rollover_interval_secs, 3600);
        assert!(!config.billing.seed_catalog);
        assert_eq!(config.billing.products_table, "store_products");
        assert_eq!(config.billing.product_owner_column, "user_id");
    }

    #[test]
    fn missing_database_section_is_a_config_error() {
        let err = Config::parse("[billing]\nfree_plan_slug = \"free\"").unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }
}
