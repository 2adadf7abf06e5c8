//! Synthetic stock quotes for the finance demo table.

use chrono::{Local, NaiveTime, Timelike};
use log::debug;
use rand::prelude::*;
use serde::Serialize;
use std::fmt;

use crate::error::GenerateError;
use crate::generator::validate_count;

use self::Sector::{
    CommunicationServices as Comm, ConsumerDiscretionary as Discretionary,
    ConsumerStaples as Staples, FinancialServices as Financial, Healthcare as Health,
    Technology as Tech,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Sector {
    Technology,
    #[serde(rename = "Consumer Discretionary")]
    ConsumerDiscretionary,
    #[serde(rename = "Consumer Staples")]
    ConsumerStaples,
    #[serde(rename = "Communication Services")]
    CommunicationServices,
    #[serde(rename = "Financial Services")]
    FinancialServices,
    Healthcare,
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sector::Technology => "Technology",
            Sector::ConsumerDiscretionary => "Consumer Discretionary",
            Sector::ConsumerStaples => "Consumer Staples",
            Sector::CommunicationServices => "Communication Services",
            Sector::FinancialServices => "Financial Services",
            Sector::Healthcare => "Healthcare",
        })
    }
}

/// A listed company the quotes are generated for.
#[derive(Clone, Copy, Debug)]
pub struct Listing {
    pub symbol: &'static str,
    pub company: &'static str,
    pub sector: Sector,
    pub base_price: f64,
}

const fn listing(
    symbol: &'static str,
    company: &'static str,
    sector: Sector,
    base_price: f64,
) -> Listing {
    Listing {
        symbol,
        company,
        sector,
        base_price,
    }
}

pub const LISTINGS: [Listing; 50] = [
    listing("AAPL", "Apple Inc.", Tech, 150.0),
    listing("GOOGL", "Alphabet Inc.", Tech, 2800.0),
    listing("MSFT", "Microsoft Corp.", Tech, 300.0),
    listing("AMZN", "Amazon.com Inc.", Discretionary, 3200.0),
    listing("TSLA", "Tesla Inc.", Discretionary, 200.0),
    listing("META", "Meta Platforms", Tech, 320.0),
    listing("NVDA", "NVIDIA Corp.", Tech, 450.0),
    listing("NFLX", "Netflix Inc.", Comm, 400.0),
    listing("ADBE", "Adobe Inc.", Tech, 500.0),
    listing("CRM", "Salesforce Inc.", Tech, 180.0),
    listing("ORCL", "Oracle Corp.", Tech, 80.0),
    listing("IBM", "IBM Corp.", Tech, 130.0),
    listing("INTC", "Intel Corp.", Tech, 50.0),
    listing("AMD", "AMD Inc.", Tech, 90.0),
    listing("QCOM", "Qualcomm Inc.", Tech, 150.0),
    listing("UBER", "Uber Technologies", Tech, 40.0),
    listing("LYFT", "Lyft Inc.", Tech, 15.0),
    listing("SNAP", "Snap Inc.", Comm, 25.0),
    listing("TWTR", "Twitter Inc.", Comm, 45.0),
    listing("SQ", "Block Inc.", Financial, 80.0),
    listing("PYPL", "PayPal Holdings", Financial, 90.0),
    listing("V", "Visa Inc.", Financial, 220.0),
    listing("MA", "Mastercard Inc.", Financial, 350.0),
    listing("JPM", "JPMorgan Chase", Financial, 140.0),
    listing("GS", "Goldman Sachs", Financial, 350.0),
    listing("MS", "Morgan Stanley", Financial, 85.0),
    listing("BAC", "Bank of America", Financial, 35.0),
    listing("WFC", "Wells Fargo", Financial, 45.0),
    listing("C", "Citigroup Inc.", Financial, 50.0),
    listing("AXP", "American Express", Financial, 160.0),
    listing("KO", "Coca-Cola Co.", Staples, 60.0),
    listing("PEP", "PepsiCo Inc.", Staples, 170.0),
    listing("MCD", "McDonald's Corp.", Discretionary, 250.0),
    listing("SBUX", "Starbucks Corp.", Discretionary, 100.0),
    listing("NKE", "Nike Inc.", Discretionary, 120.0),
    listing("DIS", "Walt Disney Co.", Comm, 100.0),
    listing("CMCSA", "Comcast Corp.", Comm, 45.0),
    listing("VZ", "Verizon Comm.", Comm, 40.0),
    listing("T", "AT&T Inc.", Comm, 20.0),
    listing("TMUS", "T-Mobile US", Comm, 120.0),
    listing("JNJ", "Johnson & Johnson", Health, 170.0),
    listing("PFE", "Pfizer Inc.", Health, 50.0),
    listing("MRK", "Merck & Co.", Health, 90.0),
    listing("ABBV", "AbbVie Inc.", Health, 140.0),
    listing("BMY", "Bristol Myers", Health, 65.0),
    listing("LLY", "Eli Lilly", Health, 310.0),
    listing("UNH", "UnitedHealth", Health, 480.0),
    listing("CVS", "CVS Health", Health, 95.0),
    listing("WMT", "Walmart Inc.", Staples, 150.0),
    listing("TGT", "Target Corp.", Discretionary, 220.0),
];

pub const SPARKLINE_POINTS: usize = 30;

/// One row of the finance demo table.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockQuote {
    pub symbol: &'static str,
    pub company: &'static str,
    pub sector: Sector,
    pub price: f64,
    pub change: f64,
    pub change_pct: f64,
    pub volume: u64,
    pub market_cap_billions: f64,
    pub week52_low: f64,
    pub week52_high: f64,
    pub pe_ratio: Option<f64>,
    pub dividend_yield_pct: f64,
    pub sparkline: Vec<f64>,
    pub last_updated: NaiveTime,
}

/// Generates [`StockQuote`]s over the fixed [`LISTINGS`].
#[derive(Debug, Clone)]
pub struct MarketDataGenerator {
    as_of: NaiveTime,
}

impl Default for MarketDataGenerator {
    fn default() -> Self {
        Self {
            as_of: Local::now().time(),
        }
    }
}

impl MarketDataGenerator {
    pub fn new(as_of: NaiveTime) -> Self {
        Self { as_of }
    }

    /// Quotes for the first `num_stocks` listings (at most 50).
    ///
    /// # Errors
    /// * [`GenerateError::InvalidArgument`] when `num_stocks` is negative
    pub fn generate(
        &self,
        num_stocks: i64,
        seed: Option<u64>,
    ) -> Result<Vec<StockQuote>, GenerateError> {
        let count = validate_count("num_stocks", num_stocks)?.min(LISTINGS.len());
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let last_updated = self.as_of.with_nanosecond(0).unwrap_or(self.as_of);
        let quotes = LISTINGS[..count]
            .iter()
            .map(|listing| quote(listing, last_updated, &mut rng))
            .collect::<Vec<_>>();

        debug!("generated {} stock quotes (seed={:?})", quotes.len(), seed);
        Ok(quotes)
    }
}

fn quote<R: Rng>(listing: &Listing, last_updated: NaiveTime, rng: &mut R) -> StockQuote {
    let base = listing.base_price;

    let change_pct = rng.gen_range(-10.0..10.0);
    let change = base * change_pct / 100.0;
    let price = base + change;

    let volume = rng.gen_range(100_000..10_000_000u64);
    let shares_outstanding = rng.gen_range(1_000..5_000u64) * 1_000_000;
    let market_cap_billions = price * shares_outstanding as f64 / 1e9;

    let week52_low = base * rng.gen_range(0.7..0.9);
    let week52_high = base * rng.gen_range(1.1..1.5);

    let pe_ratio = if listing.sector == Sector::Technology {
        rng.gen_range(20.0..80.0)
    } else {
        rng.gen_range(10.0..35.0)
    };

    let dividend_yield_pct = if rng.gen_bool(0.7) {
        rng.gen_range(0.0..4.0)
    } else {
        0.0
    };

    let mut walk = base;
    let sparkline = (0..SPARKLINE_POINTS)
        .map(|_| {
            walk *= 1.0 + rng.gen_range(-0.05..0.05);
            round2(walk)
        })
        .collect();

    StockQuote {
        symbol: listing.symbol,
        company: listing.company,
        sector: listing.sector,
        price: round2(price),
        change: round2(change),
        change_pct: round2(change_pct),
        volume,
        market_cap_billions: round2(market_cap_billions),
        week52_low: round2(week52_low),
        week52_high: round2(week52_high),
        pe_ratio: (pe_ratio > 0.0).then(|| round2(pe_ratio)),
        dividend_yield_pct: round2(dividend_yield_pct),
        sparkline,
        last_updated,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
