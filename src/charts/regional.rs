//! Store distribution by state, small states folded into a capped "Others" slice

use crate::data::StoreTable;
use crate::figure::{Figure, PieChart, PieSlice};

use super::value_counts;

/// States below this share of all stores are folded into "Others"
pub const MIN_SHARE: f64 = 0.02;

/// Largest share of all stores the "Others" slice may show
pub const MAX_OTHERS_SHARE: f64 = 0.14;

pub const OTHERS_LABEL: &str = "Others";

const START_ANGLE: f64 = 140.0;

/// Count rows per raw region value, most frequent first (ties in first-seen order)
pub fn count_regions(table: &StoreTable, region_column: &str) -> crate::Result<Vec<(String, usize)>> {
    value_counts(table.select(&[region_column])?, region_column, None)
}

/// Keep regions at or above 2% of the total and fold the rest into "Others"
///
/// The "Others" value is capped at 14% of the total; anything above the cap
/// is dropped, so the slices may account for less than every row.
pub fn bucket_regions(counts: &[(String, usize)]) -> Vec<PieSlice> {
    let total: usize = counts.iter().map(|(_, count)| count).sum();
    if total == 0 {
        return Vec::new();
    }
    let total_f = total as f64;
    let percent = |value: f64| value / total_f * 100.0;

    let mut slices = Vec::new();
    let mut others = 0usize;
    for (region, count) in counts {
        // count / total >= 1 / 50, kept in integers so exactly 2% stays in
        if count * 50 >= total {
            let value = *count as f64;
            slices.push(PieSlice {
                label: region.clone(),
                value,
                percent: percent(value),
            });
        } else {
            others += count;
        }
    }

    let others = (others as f64).min(MAX_OTHERS_SHARE * total_f);
    if others > 0.0 {
        slices.push(PieSlice {
            label: OTHERS_LABEL.to_string(),
            value: others,
            percent: percent(others),
        });
    }
    slices
}

pub fn build(table: &StoreTable, region_column: &str) -> crate::Result<Figure> {
    let slices = bucket_regions(&count_regions(table, region_column)?);

    Ok(Figure::Pie {
        stem: "store_distribution",
        chart: PieChart {
            title: "Store Distribution by State".to_string(),
            slices,
            start_angle: START_ANGLE,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::df;

    fn counts(pairs: &[(&str, usize)]) -> Vec<(String, usize)> {
        pairs.iter().map(|(name, c)| (name.to_string(), *c)).collect()
    }

    fn labels(slices: &[PieSlice]) -> Vec<&str> {
        slices.iter().map(|s| s.label.as_str()).collect()
    }

    #[test]
    fn test_exactly_two_percent_is_kept() {
        let slices = bucket_regions(&counts(&[("A", 50), ("B", 30), ("D", 18), ("C", 2)]));
        assert_eq!(labels(&slices), vec!["A", "B", "D", "C"]);
        assert_eq!(slices[3].value, 2.0);
        assert!((slices[3].percent - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_others_is_capped_at_fourteen_percent() {
        let mut pairs = vec![("Big".to_string(), 80)];
        for i in 0..20 {
            pairs.push((format!("small{i}"), 1));
        }
        let slices = bucket_regions(&pairs);
        assert_eq!(labels(&slices), vec!["Big", "Others"]);
        assert!((slices[1].value - 14.0).abs() < 1e-9);

        let shown: f64 = slices.iter().map(|s| s.percent).sum();
        assert!((shown - 94.0).abs() < 1e-9);
    }

    #[test]
    fn test_others_below_cap_is_kept_whole() {
        let slices = bucket_regions(&counts(&[("A", 95), ("B", 1), ("C", 1), ("D", 1), ("E", 1), ("F", 1)]));
        assert_eq!(labels(&slices), vec!["A", "Others"]);
        assert_eq!(slices[1].value, 5.0);
    }

    #[test]
    fn test_no_others_slice_when_every_region_is_large() {
        let slices = bucket_regions(&counts(&[("A", 3), ("B", 1)]));
        assert_eq!(labels(&slices), vec!["A", "B"]);
        assert!(bucket_regions(&[]).is_empty());
    }

    #[test]
    fn test_count_regions_keys_raw_values() {
        let frame = df!("state" => &[Some("CA"), None, Some("NY"), Some("CA"), Some("TX"), Some("CA ")]).unwrap();
        let table = StoreTable::from_frame(frame);
        // Missing cells are skipped; a trailing space makes a separate region
        assert_eq!(
            count_regions(&table, "state").unwrap(),
            counts(&[("CA", 2), ("NY", 1), ("TX", 1), ("CA ", 1)])
        );
    }
}
