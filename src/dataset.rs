use chrono::NaiveDate;
use serde::Serialize;

use crate::error::DatasetError;
use crate::record::{Amount, Category, SalesRecord};

/// An immutable, ordered set of generated sales records
///
/// Views such as [`head`](SalesDataset::head) or [`filtered`](SalesDataset::filtered)
/// return new datasets and leave the original untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SalesDataset {
    records: Vec<SalesRecord>,
}

/// Pre-filter applied by the page before rows reach the grid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SalesFilter {
    pub category: Option<Category>,
    pub min_total_amount: Option<Amount>,
}

impl SalesFilter {
    pub fn matches(&self, record: &SalesRecord) -> bool {
        self.category.is_none_or(|c| record.category() == c)
            && self.min_total_amount.is_none_or(|min| record.total_amount() >= min)
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.min_total_amount.is_none()
    }
}

/// Headline figures shown above the grid.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    pub total_orders: usize,
    pub total_sales: Amount,
    pub average_order: Amount,
    pub total_quantity: u64,
    pub average_profit_margin: f64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

impl SalesDataset {
    pub fn new(records: Vec<SalesRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SalesRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The first `n` rows (all of them when `n` exceeds the length).
    pub fn head(&self, n: usize) -> SalesDataset {
        SalesDataset::new(self.records.iter().take(n).cloned().collect())
    }

    pub fn filtered(&self, filter: &SalesFilter) -> SalesDataset {
        SalesDataset::new(
            self.records
                .iter()
                .filter(|r| filter.matches(r))
                .cloned()
                .collect(),
        )
    }

    /// Rows at `indices`, in the order given. Used for "export selected".
    pub fn select(&self, indices: &[usize]) -> Result<SalesDataset, DatasetError> {
        let len = self.records.len();
        indices
            .iter()
            .map(|&index| {
                self.records
                    .get(index)
                    .cloned()
                    .ok_or(DatasetError::RowOutOfRange { index, len })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(SalesDataset::new)
    }

    pub fn summary(&self) -> DatasetSummary {
        let total_orders = self.records.len();
        let total_cents: i64 = self.records.iter().map(|r| r.total_amount().cents()).sum();
        let total_quantity: u64 = self.records.iter().map(|r| u64::from(r.quantity())).sum();
        let margin_tenths: u64 = self
            .records
            .iter()
            .map(|r| u64::from(r.profit_margin().tenths()))
            .sum();

        let (average_order, average_profit_margin) = if total_orders == 0 {
            (Amount::ZERO, 0.0)
        } else {
            let n = total_orders as f64;
            (
                Amount::from_cents((total_cents as f64 / n).round() as i64),
                (margin_tenths as f64 / n).round() / 10.0,
            )
        };

        DatasetSummary {
            total_orders,
            total_sales: Amount::from_cents(total_cents),
            average_order,
            total_quantity,
            average_profit_margin,
            first_date: self.records.iter().map(|r| r.date()).min(),
            last_date: self.records.iter().map(|r| r.date()).max(),
        }
    }
}

impl<'a> IntoIterator for &'a SalesDataset {
    type Item = &'a SalesRecord;
    type IntoIter = std::slice::Iter<'a, SalesRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl From<Vec<SalesRecord>> for SalesDataset {
    fn from(records: Vec<SalesRecord>) -> Self {
        SalesDataset::new(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Percent, Product, Region, SalesRep};

    fn record(day: u32, product: Product, quantity: u32, cents: i64, margin: u16) -> SalesRecord {
        SalesRecord::new(
            NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            product,
            Region::North,
            SalesRep::BobSmith,
            quantity,
            Amount::from_cents(cents),
            Percent::from_tenths(margin),
        )
    }

    fn sample() -> SalesDataset {
        SalesDataset::new(vec![
            record(3, Product::LaptopPro, 1, 100_000, 200),
            record(1, Product::UsbHub, 10, 2_500, 450),
            record(7, Product::SmartWatch, 2, 30_000, 300),
        ])
    }

    #[test]
    fn summary_matches_hand_computed_values() {
        let summary = sample().summary();
        assert_eq!(summary.total_orders, 3);
        // 1000.00 + 250.00 + 600.00
        assert_eq!(summary.total_sales, Amount::from_cents(185_000));
        assert_eq!(summary.average_order, Amount::from_cents(61_667));
        assert_eq!(summary.total_quantity, 13);
        assert!((summary.average_profit_margin - 31.7).abs() < 1e-9);
        assert_eq!(summary.first_date, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(summary.last_date, NaiveDate::from_ymd_opt(2025, 1, 7));
    }

    #[test]
    fn summary_of_empty_dataset() {
        let summary = SalesDataset::default().summary();
        assert_eq!(summary.total_orders, 0);
        assert_eq!(summary.total_sales, Amount::ZERO);
        assert_eq!(summary.average_order, Amount::ZERO);
        assert_eq!(summary.average_profit_margin, 0.0);
        assert_eq!(summary.first_date, None);
    }

    #[test]
    fn filter_by_category_and_minimum() {
        let data = sample();
        let by_category = data.filtered(&SalesFilter {
            category: Some(Category::Accessories),
            min_total_amount: None,
        });
        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category.records()[0].product(), Product::UsbHub);

        let by_amount = data.filtered(&SalesFilter {
            category: None,
            min_total_amount: Some(Amount::from_cents(60_000)),
        });
        assert_eq!(by_amount.len(), 2);

        // the source dataset is untouched
        assert_eq!(data.len(), 3);
        assert_eq!(data.filtered(&SalesFilter::default()), data);
    }

    #[test]
    fn head_and_select() {
        let data = sample();
        assert_eq!(data.head(2).len(), 2);
        assert_eq!(data.head(10), data);

        let picked = data.select(&[2, 0]).unwrap();
        assert_eq!(picked.records()[0].product(), Product::SmartWatch);
        assert_eq!(picked.records()[1].product(), Product::LaptopPro);

        assert_eq!(
            data.select(&[3]),
            Err(DatasetError::RowOutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn serializes_as_plain_array() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(3));
    }
}
