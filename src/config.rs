// Site configuration
// Everything the estimator and contact desk read at start-up, loadable from JSON.

use crate::contact::{ContactDesk, MailerConfig};
use crate::estimator::CostEstimator;
use crate::mailer::{MailComposer, MailSender};
use crate::rates::{CurrencyFormat, RateTable, RateTableError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Invalid rate table: {0}")]
    InvalidRates(#[from] RateTableError),
}

// Missing sections fall back to the reference values
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    pub rates: RateTable,
    pub currency: CurrencyFormat,
    pub mailer: MailerConfig,
}

impl SiteConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SiteConfig = serde_json::from_str(json)?;
        config.rates.check()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;
        info!(
            path = %path.display(),
            destinations = config.rates.destinations.len(),
            mail_configured = config.mailer.credentials().is_some(),
            "loaded site configuration"
        );
        Ok(config)
    }

    pub fn estimator(&self) -> CostEstimator {
        CostEstimator::new(self.rates.clone(), self.currency.clone())
    }

    pub fn contact_desk(
        &self,
        sender: Option<Arc<dyn MailSender>>,
        composer: Arc<dyn MailComposer>,
    ) -> ContactDesk {
        ContactDesk::new(self.mailer.clone(), sender, composer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::DeliveryState;
    use crate::mailer::mock_mailer::MockComposer;
    use crate::rates::{Destination, TravelStyle};
    use rust_decimal::Decimal;
    use std::io::Write;

    #[test]
    fn test_empty_json_gives_reference_config() {
        let config = SiteConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SiteConfig::default());
        assert_eq!(config.currency.code, "AUD");
        assert_eq!(config.mailer.support_address, "hello@wanderlux.example");
        assert!(config.mailer.credentials().is_none());
    }

    #[test]
    fn test_custom_rates_drive_the_estimator() -> anyhow::Result<()> {
        let config = SiteConfig::from_json_str(
            r#"{
                "rates": {
                    "destinations": [
                        { "destination": "Bali", "daily_per_traveller": 100, "accommodation_per_night": 50 }
                    ],
                    "styles": [
                        { "style": "Standard", "multiplier": "1.10" }
                    ]
                },
                "currency": { "code": "NZD", "symbol": "NZ$" }
            }"#,
        )?;

        assert_eq!(
            config.rates.style_for(TravelStyle::Standard).unwrap().multiplier,
            Decimal::new(110, 2)
        );

        // 100*2*2 + 50*1 = 450, * 1.10 = 495
        let estimator = config.estimator();
        let quote = estimator.estimate_trip(Destination::Bali, 2, 2, TravelStyle::Standard)?;
        assert_eq!(quote.total, 495);
        assert!(quote.summary.contains("NZ$495.00"));

        assert!(estimator
            .estimate_trip(Destination::Tokyo, 2, 2, TravelStyle::Standard)
            .is_err());
        assert!(estimator
            .estimate_trip(Destination::Bali, 2, 2, TravelStyle::Luxury)
            .is_err());
        Ok(())
    }

    #[test]
    fn test_invalid_rates_are_rejected() {
        let result = SiteConfig::from_json_str(
            r#"{ "rates": { "destinations": [
                { "destination": "Paris", "daily_per_traveller": 0, "accommodation_per_night": 300 }
            ], "styles": [] } }"#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::InvalidRates(RateTableError::NonPositiveRate(
                Destination::Paris
            )))
        ));
    }

    #[test]
    fn test_malformed_json() {
        let result = SiteConfig::from_json_str(r#"{ "rates": "#);
        assert!(matches!(result, Err(ConfigError::JsonParseError(_))));
    }

    #[test]
    fn test_from_path_and_contact_desk() -> anyhow::Result<()> {
        let mut path = std::env::temp_dir();
        path.push(format!("trip_desk_config_{}.json", std::process::id()));
        let mut file = std::fs::File::create(&path)?;
        write!(
            file,
            r#"{{ "mailer": {{ "public_key": "pk", "service_id": "svc", "template_id": "tpl",
                 "support_address": "trips@example.com" }} }}"#
        )?;
        drop(file);

        let config = SiteConfig::from_path(&path);
        std::fs::remove_file(&path)?;
        let config = config?;

        assert_eq!(config.mailer.support_address, "trips@example.com");
        let desk = config.contact_desk(None, Arc::new(MockComposer::default()));
        // Credentials alone are not enough without a sender
        assert_eq!(desk.state(), DeliveryState::Unconfigured);
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let result = SiteConfig::from_path("/definitely/not/here/site.json");
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
