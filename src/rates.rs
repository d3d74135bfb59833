// Rate tables behind the trip cost estimator
// Destinations and travel styles are closed sets; the amounts attached to them are configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// Returned when a raw form value does not name a known destination or style
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownKey {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateTableError {
    #[error("Rates for {0} must be positive")]
    NonPositiveRate(Destination),

    #[error("Multiplier for {0} must be positive")]
    NonPositiveMultiplier(TravelStyle),

    #[error("Destination listed twice: {0}")]
    DuplicateDestination(Destination),

    #[error("Travel style listed twice: {0}")]
    DuplicateStyle(TravelStyle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Destination {
    Bali,
    Tokyo,
    Paris,
    Dubai,
    Auckland,
}

impl Destination {
    pub const ALL: [Destination; 5] = [
        Destination::Bali,
        Destination::Tokyo,
        Destination::Paris,
        Destination::Dubai,
        Destination::Auckland,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Destination::Bali => "Bali",
            Destination::Tokyo => "Tokyo",
            Destination::Paris => "Paris",
            Destination::Dubai => "Dubai",
            Destination::Auckland => "Auckland",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Form values are matched exactly, the way the select options are written
impl FromStr for Destination {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|destination| destination.name() == s)
            .ok_or_else(|| UnknownKey {
                kind: "destination",
                value: s.to_string(),
            })
    }
}

// Declaration order is price order: Budget < Standard < Luxury
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum TravelStyle {
    Budget,
    Standard,
    Luxury,
}

impl TravelStyle {
    pub const ALL: [TravelStyle; 3] = [TravelStyle::Budget, TravelStyle::Standard, TravelStyle::Luxury];

    pub fn name(&self) -> &'static str {
        match self {
            TravelStyle::Budget => "Budget",
            TravelStyle::Standard => "Standard",
            TravelStyle::Luxury => "Luxury",
        }
    }
}

impl fmt::Display for TravelStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TravelStyle {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|style| style.name() == s)
            .ok_or_else(|| UnknownKey {
                kind: "travel style",
                value: s.to_string(),
            })
    }
}

// Whole currency units per traveller per day, and per night of accommodation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct DestinationRate {
    pub destination: Destination,
    pub daily_per_traveller: u32,
    pub accommodation_per_night: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct StyleMultiplier {
    pub style: TravelStyle,
    pub multiplier: Decimal,
}

/// Immutable pricing table shared by every estimate.
///
/// A destination or style missing from the table is treated exactly like an
/// unknown one: the estimator rejects the request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RateTable {
    pub destinations: Vec<DestinationRate>,
    pub styles: Vec<StyleMultiplier>,
}

impl Default for RateTable {
    fn default() -> Self {
        let rate = |destination, daily_per_traveller, accommodation_per_night| DestinationRate {
            destination,
            daily_per_traveller,
            accommodation_per_night,
        };

        Self {
            destinations: vec![
                rate(Destination::Bali, 120, 160),
                rate(Destination::Tokyo, 190, 260),
                rate(Destination::Paris, 210, 300),
                rate(Destination::Dubai, 200, 280),
                rate(Destination::Auckland, 150, 220),
            ],
            styles: vec![
                StyleMultiplier {
                    style: TravelStyle::Budget,
                    multiplier: Decimal::new(90, 2),
                },
                StyleMultiplier {
                    style: TravelStyle::Standard,
                    multiplier: Decimal::ONE,
                },
                StyleMultiplier {
                    style: TravelStyle::Luxury,
                    multiplier: Decimal::new(135, 2),
                },
            ],
        }
    }
}

impl RateTable {
    pub fn rate_for(&self, destination: Destination) -> Option<&DestinationRate> {
        self.destinations
            .iter()
            .find(|rate| rate.destination == destination)
    }

    pub fn style_for(&self, style: TravelStyle) -> Option<&StyleMultiplier> {
        self.styles.iter().find(|entry| entry.style == style)
    }

    // Run once when a table is loaded; estimates assume a checked table
    pub fn check(&self) -> Result<(), RateTableError> {
        let mut seen = HashSet::new();
        for rate in &self.destinations {
            if !seen.insert(rate.destination) {
                return Err(RateTableError::DuplicateDestination(rate.destination));
            }
            if rate.daily_per_traveller == 0 || rate.accommodation_per_night == 0 {
                return Err(RateTableError::NonPositiveRate(rate.destination));
            }
        }

        let mut seen = HashSet::new();
        for entry in &self.styles {
            if !seen.insert(entry.style) {
                return Err(RateTableError::DuplicateStyle(entry.style));
            }
            if entry.multiplier <= Decimal::ZERO {
                return Err(RateTableError::NonPositiveMultiplier(entry.style));
            }
        }

        Ok(())
    }
}

// Display-only currency rendering; amounts are already whole units
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CurrencyFormat {
    pub code: String,
    pub symbol: String,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            code: "AUD".to_string(),
            symbol: "$".to_string(),
        }
    }
}

impl CurrencyFormat {
    // en-AU style: symbol first, comma thousands separator, two decimals
    pub fn format(&self, amount: u64) -> String {
        let digits = amount.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        format!("{}{}.00", self.symbol, grouped)
    }
}
