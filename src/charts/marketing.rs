//! Top 10 marketing apps by number of stores with the app installed

use crate::data::{StoreTable, APPS_COLUMN};
use crate::figure::{BarChart, Figure, Palette};

use super::{rank_descending, TOP_N};

/// A catalogued app and the lower-case substrings that identify it
#[derive(Debug, Clone, Copy)]
pub struct MarketingApp {
    pub name: &'static str,
    pub needles: &'static [&'static str],
}

impl MarketingApp {
    /// `text` must already be lower-cased
    fn matches(&self, text: &str) -> bool {
        self.needles.iter().any(|needle| text.contains(needle))
    }
}

pub const MARKETING_APPS: [MarketingApp; 13] = [
    MarketingApp { name: "Klaviyo", needles: &["klaviyo"] },
    MarketingApp { name: "Omnisend", needles: &["omnisend"] },
    MarketingApp { name: "Yotpo", needles: &["yotpo"] },
    MarketingApp { name: "Judge.me", needles: &["judge.me"] },
    MarketingApp { name: "Loox", needles: &["loox"] },
    MarketingApp { name: "Rebuy", needles: &["rebuy"] },
    MarketingApp { name: "Privy", needles: &["privy"] },
    MarketingApp { name: "Pop Convert", needles: &["pop convert"] },
    MarketingApp { name: "UpPromote", needles: &["uppromote"] },
    MarketingApp { name: "Algolia", needles: &["algolia"] },
    MarketingApp { name: "PushOwl/Brevo", needles: &["pushowl", "brevo"] },
    MarketingApp { name: "Stamped.io", needles: &["stamped.io"] },
    MarketingApp { name: "Mailchimp", needles: &["mailchimp"] },
];

/// Count, per catalogued app, the rows whose app list mentions it
///
/// Counts are independent: one row may count towards several apps.
/// Results are in catalog order.
pub fn count_marketing_apps(rows: &[Option<String>]) -> Vec<(&'static str, usize)> {
    let mut counts: Vec<(&'static str, usize)> =
        MARKETING_APPS.iter().map(|app| (app.name, 0)).collect();

    for text in rows.iter().flatten() {
        let lowered = text.to_lowercase();
        for (app, (_, count)) in MARKETING_APPS.iter().zip(counts.iter_mut()) {
            if app.matches(&lowered) {
                *count += 1;
            }
        }
    }
    counts
}

pub fn top_marketing_apps(rows: &[Option<String>]) -> Vec<(&'static str, usize)> {
    rank_descending(count_marketing_apps(rows), TOP_N)
}

pub fn build(table: &StoreTable) -> crate::Result<Figure> {
    let rows = table.text_column(APPS_COLUMN)?;
    let bars = top_marketing_apps(&rows)
        .into_iter()
        .map(|(name, count)| (name.to_string(), count as f64))
        .collect();

    Ok(Figure::Bar {
        stem: "marketing_apps",
        chart: BarChart {
            title: "Top 10 Marketing Apps".to_string(),
            x_label: "Count".to_string(),
            y_label: "Marketing App".to_string(),
            bars,
            palette: Palette::Deep,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    fn count_for(counts: &[(&'static str, usize)], name: &str) -> usize {
        counts.iter().find(|(app, _)| *app == name).map(|(_, c)| *c).unwrap()
    }

    #[test]
    fn test_one_row_counts_towards_several_apps() {
        let counts = count_marketing_apps(&rows(&[Some("Klaviyo: Email Marketing, Brevo SMS")]));
        assert_eq!(count_for(&counts, "Klaviyo"), 1);
        assert_eq!(count_for(&counts, "PushOwl/Brevo"), 1);
        assert_eq!(count_for(&counts, "Yotpo"), 0);
    }

    #[test]
    fn test_either_needle_counts_once_per_row() {
        let counts = count_marketing_apps(&rows(&[
            Some("PushOwl Web Push; Brevo"),
            Some("pushowl"),
            None,
            Some("Judge.me Product Reviews"),
        ]));
        assert_eq!(count_for(&counts, "PushOwl/Brevo"), 2);
        assert_eq!(count_for(&counts, "Judge.me"), 1);
    }

    #[test]
    fn test_matching_is_substring_and_case_insensitive() {
        let counts = count_marketing_apps(&rows(&[Some("MAILCHIMP for shopify"), Some("stamped.io reviews")]));
        assert_eq!(count_for(&counts, "Mailchimp"), 1);
        assert_eq!(count_for(&counts, "Stamped.io"), 1);
    }

    #[test]
    fn test_top_ten_sorted_with_catalog_order_ties() {
        let top = top_marketing_apps(&rows(&[
            Some("Loox, Klaviyo"),
            Some("Loox"),
            Some("Mailchimp"),
        ]));
        assert_eq!(top.len(), 10);
        assert_eq!(top[0], ("Loox", 2));
        assert_eq!(top[1], ("Klaviyo", 1));
        assert_eq!(top[2], ("Mailchimp", 1));
        // Zero-count apps fill the remaining slots in catalog order
        assert_eq!(top[3], ("Omnisend", 0));
    }
}
