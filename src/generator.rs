//! Synthetic sales data.
//!
//! Every call to [`SampleDataGenerator::generate`] builds its own random source, so two
//! calls never share RNG state and a seeded call is reproducible on its own.

use chrono::{Duration, Local, NaiveDate};
use log::debug;
use rand::prelude::*;

use crate::dataset::SalesDataset;
use crate::error::GenerateError;
use crate::record::{Amount, Percent, Product, Region, SalesRecord, SalesRep};

/// Quantities offered per order together with their weight in percent.
pub const QUANTITY_WEIGHTS: [(u32, u32); 7] =
    [(1, 40), (2, 25), (3, 15), (4, 10), (5, 5), (10, 3), (20, 2)];

/// Row count of the smaller dataset used by the aggregation demo.
pub const AGGREGATION_DEMO_ROWS: i64 = 500;

/// Configuration for the sales data generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Last day a transaction may fall on
    pub anchor_date: NaiveDate,
    /// How many days before the anchor the date range starts
    pub history_days: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            anchor_date: Local::now().date_naive(),
            history_days: 365,
        }
    }
}

impl GeneratorConfig {
    /// Fixed anchor, handy when output must not depend on the wall clock.
    pub fn anchored_at(anchor_date: NaiveDate) -> Self {
        Self {
            anchor_date,
            ..Default::default()
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        self.anchor_date - Duration::days(i64::from(self.history_days))
    }
}

/// Produces synthetic [`SalesRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct SampleDataGenerator {
    config: GeneratorConfig,
}

impl SampleDataGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate `row_count` records.
    ///
    /// With `Some(seed)` the output only depends on `row_count`, the seed and the
    /// generator's configuration. With `None` a fresh entropy-seeded source is used.
    ///
    /// # Errors
    /// * [`GenerateError::InvalidArgument`] when `row_count` is negative or too large to
    ///   allocate
    pub fn generate(
        &self,
        row_count: i64,
        seed: Option<u64>,
    ) -> Result<SalesDataset, GenerateError> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let dataset = self.generate_with_rng(row_count, &mut rng)?;
        debug!(
            "generated {} sales records (seed={:?})",
            dataset.len(),
            seed
        );
        Ok(dataset)
    }

    /// Same as [`generate`](Self::generate) but draws from a caller-owned random source.
    pub fn generate_with_rng<R: Rng>(
        &self,
        row_count: i64,
        rng: &mut R,
    ) -> Result<SalesDataset, GenerateError> {
        let row_count = validate_count("row_count", row_count)?;

        let mut records = Vec::new();
        records.try_reserve_exact(row_count).map_err(|_| {
            GenerateError::InvalidArgument(format!("row_count {} is too large", row_count))
        })?;
        records.extend((0..row_count).map(|_| self.sample_record(rng)));

        Ok(SalesDataset::new(records))
    }

    /// The 500-row dataset the grouping and aggregation demos run on.
    pub fn aggregation_demo_data(&self, seed: Option<u64>) -> Result<SalesDataset, GenerateError> {
        self.generate(AGGREGATION_DEMO_ROWS, seed)
    }

    fn sample_record<R: Rng>(&self, rng: &mut R) -> SalesRecord {
        let offset = rng.gen_range(0..=self.config.history_days);
        let date = self.config.start_date() + Duration::days(i64::from(offset));

        let product = Product::ALL[rng.gen_range(0..Product::ALL.len())];
        let category = product.category();

        let quantity = sample_quantity(rng);
        let unit_price = Amount::from_cents(rng.gen_range(category.price_band()));
        let profit_margin = Percent::from_tenths(rng.gen_range(category.margin_band()));

        let region = Region::ALL[rng.gen_range(0..Region::ALL.len())];
        let sales_rep = SalesRep::ALL[rng.gen_range(0..SalesRep::ALL.len())];

        SalesRecord::new(
            date,
            product,
            region,
            sales_rep,
            quantity,
            unit_price,
            profit_margin,
        )
    }
}

/// Picks a quantity by walking the cumulative weights, so small orders dominate.
fn sample_quantity<R: Rng>(rng: &mut R) -> u32 {
    let total: u32 = QUANTITY_WEIGHTS.iter().map(|(_, w)| w).sum();
    let mut r = rng.gen_range(0..total);
    for (quantity, weight) in QUANTITY_WEIGHTS {
        if r < weight {
            return quantity;
        }
        r -= weight;
    }
    QUANTITY_WEIGHTS[0].0
}

pub(crate) fn validate_count(name: &str, count: i64) -> Result<usize, GenerateError> {
    usize::try_from(count)
        .map_err(|_| {
            GenerateError::InvalidArgument(format!("{} must not be negative, got {}", name, count))
        })
}

/// Generate `row_count` records anchored at today's date.
pub fn generate_sample_data(
    row_count: i64,
    seed: Option<u64>,
) -> Result<SalesDataset, GenerateError> {
    SampleDataGenerator::default().generate(row_count, seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Category;
    use std::collections::HashSet;

    fn fixed_generator() -> SampleDataGenerator {
        SampleDataGenerator::new(GeneratorConfig::anchored_at(
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        ))
    }

    #[test]
    fn five_rows_with_seed_42() {
        let data = fixed_generator().generate(5, Some(42)).unwrap();
        assert_eq!(data.len(), 5);
    }

    #[test]
    fn same_seed_gives_identical_bytes() {
        let sales = fixed_generator();
        let a = sales.generate(200, Some(42)).unwrap();
        let b = sales.generate(200, Some(42)).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_vec(&a).unwrap(),
            serde_json::to_vec(&b).unwrap()
        );
    }

    #[test]
    fn different_seed_gives_different_rows() {
        let sales = fixed_generator();
        let a = sales.generate(5, Some(42)).unwrap();
        let b = sales.generate(5, Some(43)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn seeded_prefix_is_stable() {
        // Row i only depends on the draws before it.
        let sales = fixed_generator();
        let short = sales.generate(10, Some(7)).unwrap();
        let long = sales.generate(50, Some(7)).unwrap();
        assert_eq!(short.records(), &long.records()[..10]);
    }

    #[test]
    fn zero_rows_is_empty_not_error() {
        let data = fixed_generator().generate(0, Some(42)).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn negative_rows_is_invalid_argument() {
        let err = fixed_generator().generate(-1, Some(42)).unwrap_err();
        assert!(matches!(err, GenerateError::InvalidArgument(_)));
    }

    #[test]
    fn every_row_respects_the_invariants() {
        let sales = fixed_generator();
        let start = sales.config().start_date();
        let end = sales.config().anchor_date;
        let quantities: HashSet<u32> = QUANTITY_WEIGHTS.iter().map(|(q, _)| *q).collect();

        for seed in [1, 2, 3] {
            for record in sales.generate(1000, Some(seed)).unwrap().iter() {
                assert!(record.is_consistent(), "{:?}", record);
                assert_eq!(
                    record.total_amount().cents(),
                    record.unit_price().cents() * i64::from(record.quantity())
                );
                assert_eq!(record.category(), record.product().category());
                assert!(record.date() >= start && record.date() <= end);
                assert!(quantities.contains(&record.quantity()));
                assert!(record.category().price_band().contains(&record.unit_price().cents()));
                assert!(record.category().margin_band().contains(&record.profit_margin().tenths()));
            }
        }
    }

    #[test]
    fn unseeded_calls_still_satisfy_invariants() {
        let sales = fixed_generator();
        let a = sales.generate(100, None).unwrap();
        let b = sales.generate(100, None).unwrap();
        assert_eq!(a.len(), b.len());
        assert!(a.iter().chain(b.iter()).all(SalesRecord::is_consistent));
    }

    #[test]
    fn caller_supplied_rng_matches_seeded_generate() {
        let sales = fixed_generator();
        let mut rng = StdRng::seed_from_u64(99);
        let via_rng = sales.generate_with_rng(25, &mut rng).unwrap();
        let via_seed = sales.generate(25, Some(99)).unwrap();
        assert_eq!(via_rng, via_seed);
    }

    #[test]
    fn quantities_lean_small() {
        let data = fixed_generator().generate(2000, Some(5)).unwrap();
        let ones = data.iter().filter(|r| r.quantity() == 1).count();
        let twenties = data.iter().filter(|r| r.quantity() == 20).count();
        assert!(ones > twenties * 5);
    }

    #[test]
    fn large_dataset_covers_all_categories() {
        let data = fixed_generator().generate(2000, Some(11)).unwrap();
        let seen: HashSet<Category> = data.iter().map(|r| r.category()).collect();
        assert_eq!(seen.len(), Category::ALL.len());
    }

    #[test]
    fn oversized_row_count_is_an_error() {
        match fixed_generator().generate(i64::MAX, Some(1)) {
            Err(GenerateError::InvalidArgument(message)) => assert!(message.contains("too large")),
            other => panic!("expected InvalidArgument, got {:?}", other),
        }
    }

    #[test]
    fn aggregation_demo_has_500_rows() {
        let data = fixed_generator().aggregation_demo_data(Some(42)).unwrap();
        assert_eq!(data.len(), 500);
    }
}
