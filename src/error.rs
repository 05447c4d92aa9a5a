//! Fatal errors that abort a report run

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("'{}' was not found", display_name(.path))]
    FileNotFound { path: PathBuf },

    #[error("error reading CSV {}: {source}", .path.display())]
    Unparsable {
        path: PathBuf,
        #[source]
        source: polars::prelude::PolarsError,
    },

    #[error("no state column found (neither {})", quoted_list(.candidates))]
    MissingRegionColumn { candidates: Vec<&'static str> },
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

fn quoted_list(names: &[&'static str]) -> String {
    names
        .iter()
        .map(|name| format!("'{name}'"))
        .collect::<Vec<_>>()
        .join(" nor ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_not_found_message_uses_file_name() {
        let err = ReportError::FileNotFound {
            path: PathBuf::from("/home/me/Desktop/Shopifycleaned_US.csv"),
        };
        assert_eq!(err.to_string(), "'Shopifycleaned_US.csv' was not found");
    }

    #[test]
    fn test_missing_region_message_lists_candidates() {
        let err = ReportError::MissingRegionColumn {
            candidates: vec!["pm_state", "state"],
        };
        assert_eq!(
            err.to_string(),
            "no state column found (neither 'pm_state' nor 'state')"
        );
    }
}
