// Trip cost estimator
// Turns the raw calculator form into a validated request and prices it against the rate table.

use crate::rates::{
    CurrencyFormat, Destination, DestinationRate, RateTable, StyleMultiplier, TravelStyle,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use thiserror::Error;
use tracing::debug;

pub const TRAVELLERS_RANGE: RangeInclusive<u32> = 1..=20;
pub const DAYS_RANGE: RangeInclusive<u32> = 1..=60;

// Validation errors carry the message shown under the calculator, plus the rejected value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EstimateError {
    #[error("Please select a valid destination.")]
    UnknownDestination(String),

    #[error("Travellers must be between 1 and 20.")]
    TravellersOutOfRange(String),

    #[error("Days must be between 1 and 60.")]
    DaysOutOfRange(String),

    #[error("Please choose a travel style.")]
    UnknownStyle(String),

    #[error("The estimated total is too large to quote.")]
    TotalOutOfRange,
}

/// Calculator form values exactly as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TripInput {
    pub destination: String,
    pub travellers: String,
    pub days: String,
    pub style: String,
}

impl TripInput {
    pub fn new(
        destination: impl Into<String>,
        travellers: impl ToString,
        days: impl ToString,
        style: impl Into<String>,
    ) -> Self {
        Self {
            destination: destination.into(),
            travellers: travellers.to_string(),
            days: days.to_string(),
            style: style.into(),
        }
    }
}

/// A request that passed every check. Only [`CostEstimator::request`] builds one,
/// so pricing never runs on out-of-range input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripRequest {
    rate: DestinationRate,
    travellers: u32,
    days: u32,
    style: StyleMultiplier,
}

impl TripRequest {
    pub fn destination(&self) -> Destination {
        self.rate.destination
    }

    pub fn travellers(&self) -> u32 {
        self.travellers
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn style(&self) -> TravelStyle {
        self.style.style
    }

    // Nights billed for accommodation: a same-day trip has none
    pub fn accommodation_nights(&self) -> u32 {
        self.days.saturating_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TripQuote {
    pub destination: Destination,
    pub travellers: u32,
    pub days: u32,
    pub style: TravelStyle,
    pub accommodation_nights: u32,
    pub base: u64,
    pub multiplier: Decimal,
    pub total: u64,
    pub summary: String,
}

pub struct CostEstimator {
    rates: RateTable,
    currency: CurrencyFormat,
}

impl Default for CostEstimator {
    fn default() -> Self {
        Self::new(RateTable::default(), CurrencyFormat::default())
    }
}

impl CostEstimator {
    pub fn new(rates: RateTable, currency: CurrencyFormat) -> Self {
        Self { rates, currency }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    // Checks run in a fixed order and stop at the first failure:
    // destination, travellers, days, style
    pub fn request(&self, input: &TripInput) -> Result<TripRequest, EstimateError> {
        let rate = input
            .destination
            .parse::<Destination>()
            .ok()
            .and_then(|destination| self.rates.rate_for(destination))
            .copied()
            .ok_or_else(|| EstimateError::UnknownDestination(input.destination.clone()))?;

        let travellers = parse_count(&input.travellers, &TRAVELLERS_RANGE)
            .ok_or_else(|| EstimateError::TravellersOutOfRange(input.travellers.clone()))?;

        let days = parse_count(&input.days, &DAYS_RANGE)
            .ok_or_else(|| EstimateError::DaysOutOfRange(input.days.clone()))?;

        let style = input
            .style
            .parse::<TravelStyle>()
            .ok()
            .and_then(|style| self.rates.style_for(style))
            .copied()
            .ok_or_else(|| EstimateError::UnknownStyle(input.style.clone()))?;

        Ok(TripRequest {
            rate,
            travellers,
            days,
            style,
        })
    }

    pub fn estimate(&self, input: &TripInput) -> Result<TripQuote, EstimateError> {
        let request = self.request(input).map_err(|err| {
            debug!(?input, reason = %err, "trip estimate rejected");
            err
        })?;
        self.quote(&request)
    }

    pub fn estimate_trip(
        &self,
        destination: Destination,
        travellers: u32,
        days: u32,
        style: TravelStyle,
    ) -> Result<TripQuote, EstimateError> {
        self.estimate(&TripInput::new(
            destination.name(),
            travellers,
            days,
            style.name(),
        ))
    }

    // base = daily * travellers * days + nightly * (days - 1), then scaled by the style.
    // The product is exact decimal arithmetic; halves round away from zero.
    pub fn quote(&self, request: &TripRequest) -> Result<TripQuote, EstimateError> {
        let travellers = u64::from(request.travellers);
        let days = u64::from(request.days);
        let nights = request.accommodation_nights();

        let base = u64::from(request.rate.daily_per_traveller) * travellers * days
            + u64::from(request.rate.accommodation_per_night) * u64::from(nights);

        let total = Decimal::from(base)
            .checked_mul(request.style.multiplier)
            .map(|amount| amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|amount| amount.to_u64())
            .ok_or(EstimateError::TotalOutOfRange)?;

        let summary = format!(
            "Estimated cost for {} {} to {} for {} {}: {} \u{2013} {} Travel Package.",
            travellers,
            plural(travellers, "traveller"),
            request.destination(),
            days,
            plural(days, "day"),
            self.currency.format(total),
            request.style(),
        );

        debug!(
            destination = %request.destination(),
            travellers,
            days,
            style = %request.style(),
            base,
            total,
            "trip quoted"
        );

        Ok(TripQuote {
            destination: request.destination(),
            travellers: request.travellers,
            days: request.days,
            style: request.style(),
            accommodation_nights: nights,
            base,
            multiplier: request.style.multiplier,
            total,
            summary,
        })
    }
}

// Empty or non-integer text fails the range check like any other bad count
fn parse_count(raw: &str, range: &RangeInclusive<u32>) -> Option<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|count| range.contains(count))
}

fn plural(count: u64, noun: &str) -> String {
    if count > 1 {
        format!("{}s", noun)
    } else {
        noun.to_string()
    }
}
