//! Migration configuration management.

use chrono::NaiveDate;
use serde::Deserialize;

/// Top-level migration configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MigrationConfig {
    /// Source API connection settings.
    pub source: SourceConfig,
    /// Target-side defaults (company, accounts, cost center).
    pub target: TargetConfig,
    /// Feature flags controlling which phases run.
    #[serde(default)]
    pub flags: FeatureFlags,
}

/// Source API connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the source REST API.
    pub api_url: String,
    /// Long-lived access token used to mint session tokens.
    pub access_token: String,
    /// Application identifier sent when creating a session.
    #[serde(default = "default_source_application")]
    pub source_application: String,
}

fn default_source_application() -> String {
    "ebmig".to_string()
}

/// Target-side defaults consumed by resolvers and builders.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// Company all created documents belong to.
    pub default_company: String,
    /// Default non-group cost center.
    pub default_cost_center: String,
    /// Default bank account for payment and journal legs.
    pub default_bank_account: String,
    /// Default receivable account.
    pub default_receivable: String,
    /// Default payable account.
    pub default_payable: String,
    /// Default income account for fallback invoice lines.
    #[serde(default = "default_income_account")]
    pub default_income_account: String,
    /// Default expense account for fallback invoice lines.
    #[serde(default = "default_expense_account")]
    pub default_expense_account: String,
}

fn default_income_account() -> String {
    "Sales".to_string()
}

fn default_expense_account() -> String {
    "Miscellaneous Expenses".to_string()
}

/// Feature flags controlling which phases of a run execute.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    /// Build the chart of accounts from source categories.
    #[serde(default = "default_true")]
    pub migrate_accounts: bool,
    /// Create customers from source relations.
    #[serde(default = "default_true")]
    pub migrate_customers: bool,
    /// Create suppliers from source relations.
    #[serde(default = "default_true")]
    pub migrate_suppliers: bool,
    /// Import mutations as target documents.
    #[serde(default = "default_true")]
    pub migrate_transactions: bool,
    /// Build documents without persisting them.
    #[serde(default)]
    pub dry_run: bool,
    /// Only import mutations dated on or after this date.
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    /// Only import mutations dated on or before this date.
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
}

fn default_true() -> bool {
    true
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            migrate_accounts: true,
            migrate_customers: true,
            migrate_suppliers: true,
            migrate_transactions: true,
            dry_run: false,
            date_from: None,
            date_to: None,
        }
    }
}

impl MigrationConfig {
    /// Loads configuration from config files and environment.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or is incomplete.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("EBMIG").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_flags_default() {
        let flags = FeatureFlags::default();
        assert!(flags.migrate_accounts);
        assert!(flags.migrate_customers);
        assert!(flags.migrate_suppliers);
        assert!(flags.migrate_transactions);
        assert!(!flags.dry_run);
        assert!(flags.date_from.is_none());
        assert!(flags.date_to.is_none());
    }

    #[test]
    fn test_flags_deserialize_defaults() {
        let flags: FeatureFlags = serde_json::from_str("{}").unwrap();
        assert!(flags.migrate_transactions);
        assert!(!flags.dry_run);
    }

    #[test]
    fn test_config_deserialize() {
        let json = serde_json::json!({
            "source": {
                "api_url": "https://api.example.test/v1",
                "access_token": "secret"
            },
            "target": {
                "default_company": "Acme",
                "default_cost_center": "Main - A",
                "default_bank_account": "Bank - A",
                "default_receivable": "Debtors - A",
                "default_payable": "Creditors - A"
            },
            "flags": { "dry_run": true }
        });

        let cfg: MigrationConfig = serde_json::from_value(json).unwrap();
        assert_eq!(cfg.source.source_application, "ebmig");
        assert_eq!(cfg.target.default_income_account, "Sales");
        assert!(cfg.flags.dry_run);
    }
}
