//! Top 10 technologies across all stores

use polars::prelude::*;

use crate::data::{parse_tokens, StoreTable, TECHNOLOGIES_COLUMN};
use crate::figure::{BarChart, Figure, Palette};

use super::{value_counts, TOP_N};

const TOKEN_COLUMN: &str = "technology";

/// One row per technology token, rows exploded in order
fn token_frame(rows: &[Option<String>]) -> crate::Result<DataFrame> {
    let tokens: Vec<String> = rows
        .iter()
        .flat_map(|row| parse_tokens(row.as_deref()))
        .collect();
    Ok(DataFrame::new(vec![Column::new(TOKEN_COLUMN.into(), tokens)])?)
}

/// Count exact tokens across every row, most frequent first
pub fn count_technologies(rows: &[Option<String>]) -> crate::Result<Vec<(String, usize)>> {
    value_counts(token_frame(rows)?, TOKEN_COLUMN, None)
}

pub fn top_technologies(rows: &[Option<String>]) -> crate::Result<Vec<(String, usize)>> {
    value_counts(token_frame(rows)?, TOKEN_COLUMN, Some(TOP_N))
}

pub fn build(table: &StoreTable) -> crate::Result<Figure> {
    let rows = table.text_column(TECHNOLOGIES_COLUMN)?;
    let bars = top_technologies(&rows)?
        .into_iter()
        .map(|(name, count)| (name, count as f64))
        .collect();

    Ok(Figure::Bar {
        stem: "technologies",
        chart: BarChart {
            title: "Top 10 Technologies".to_string(),
            x_label: "Count".to_string(),
            y_label: "Technology".to_string(),
            bars,
            palette: Palette::Rocket,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    #[test]
    fn test_counts_exact_tokens() {
        let counts = count_technologies(&rows(&[
            Some("Shopify Pay: Google Analytics"),
            Some("Google Analytics; Klaviyo"),
            None,
            Some("google analytics,"),
        ]))
        .unwrap();
        assert_eq!(
            counts,
            vec![
                ("Google Analytics".to_string(), 2),
                ("Shopify Pay".to_string(), 1),
                ("Klaviyo".to_string(), 1),
                ("google analytics".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_top_technologies_keeps_ten() {
        let row = (0..15).map(|i| format!("tech{i}")).collect::<Vec<_>>().join(",");
        let top = top_technologies(&rows(&[Some(row.as_str()), Some("tech14")])).unwrap();
        assert_eq!(top.len(), 10);
        assert_eq!(top[0], ("tech14".to_string(), 2));
        assert_eq!(top[1], ("tech0".to_string(), 1));
        assert_eq!(top[9], ("tech8".to_string(), 1));
    }

    #[test]
    fn test_no_tokens_gives_no_bars() {
        assert!(top_technologies(&rows(&[None, Some(" ; ,")])).unwrap().is_empty());
    }
}
