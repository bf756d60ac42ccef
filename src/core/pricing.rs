//! Per-provider token pricing

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::models::ProviderId;

const TOKENS_PER_UNIT: u64 = 1_000_000;

/// Largest accepted rate or conversion factor
pub const MAX_RATE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// USD rates per one million tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingEntry {
    /// USD per million prompt tokens
    pub input_per_million: Decimal,
    /// USD per million completion tokens
    pub output_per_million: Decimal,
}

impl PricingEntry {
    /// Entry from input and output rates
    pub fn new(input_per_million: Decimal, output_per_million: Decimal) -> Self {
        Self {
            input_per_million,
            output_per_million,
        }
    }
}

/// Static rate table plus the USD to local currency multiplier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingTable {
    /// Gemini rates
    pub gemini: PricingEntry,
    /// Grok rates
    pub grok: PricingEntry,
    /// Local currency units per USD
    pub usd_to_local: Decimal,
}

impl Default for PricingTable {
    fn default() -> Self {
        Self {
            gemini: PricingEntry::new(Decimal::new(50, 2), Decimal::new(300, 2)),
            grok: PricingEntry::new(Decimal::new(20, 2), Decimal::new(50, 2)),
            usd_to_local: Decimal::new(1520, 1),
        }
    }
}

impl PricingTable {
    /// Rates for a provider
    pub fn entry(&self, provider: ProviderId) -> &PricingEntry {
        match provider {
            ProviderId::Gemini => &self.gemini,
            ProviderId::Grok => &self.grok,
        }
    }

    /// Cost of one call in local currency, `None` if it does not fit a `Decimal`
    pub fn cost(&self, provider: ProviderId, tokens_in: u64, tokens_out: u64) -> Option<Decimal> {
        let entry = self.entry(provider);
        let input = Decimal::from(tokens_in).checked_mul(entry.input_per_million)?;
        let output = Decimal::from(tokens_out).checked_mul(entry.output_per_million)?;
        let usd = input
            .checked_add(output)?
            .checked_div(Decimal::from(TOKENS_PER_UNIT))?;
        usd.checked_mul(self.usd_to_local)
    }

    /// Rates must lie in `0..=MAX_RATE` and the conversion factor in `(0, MAX_RATE]`
    pub fn validate(&self) -> Result<(), String> {
        for (provider, entry) in [(ProviderId::Gemini, &self.gemini), (ProviderId::Grok, &self.grok)] {
            for rate in [entry.input_per_million, entry.output_per_million] {
                if rate.is_sign_negative() {
                    return Err(format!("{} rates must not be negative", provider));
                }
                if rate > MAX_RATE {
                    return Err(format!("{} rates must not exceed {}", provider, MAX_RATE));
                }
            }
        }
        if self.usd_to_local <= Decimal::ZERO {
            return Err("usd_to_local must be greater than 0".to_string());
        }
        if self.usd_to_local > MAX_RATE {
            return Err(format!("usd_to_local must not exceed {}", MAX_RATE));
        }
        Ok(())
    }
}
