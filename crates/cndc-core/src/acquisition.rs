//! Where each monthly release lives on the publisher's site. Fetching is left
//! to external tooling; this only plans the URLs.

use cndc_parser::CanonicalPeriod;
use serde::Serialize;

use crate::config::AcquisitionConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseUrls {
    pub period: CanonicalPeriod,
    /// `MMYY` code embedded in the file names.
    pub code: String,
    pub archive: String,
    pub workbook: String,
}

/// Every month from `start` to `end`, inclusive. Empty when `start > end`.
pub fn release_months(start: CanonicalPeriod, end: CanonicalPeriod) -> Vec<CanonicalPeriod> {
    let mut months = Vec::new();
    let mut current = Some(start);
    while let Some(period) = current {
        if period > end {
            break;
        }
        months.push(period);
        current = period.next();
    }
    months
}

pub fn release_code(period: CanonicalPeriod) -> String {
    format!("{:02}{:02}", period.month(), period.year().rem_euclid(100))
}

pub fn release_urls(
    config: &AcquisitionConfig,
    start: CanonicalPeriod,
    end: CanonicalPeriod,
) -> Vec<ReleaseUrls> {
    release_months(start, end)
        .into_iter()
        .map(|period| {
            let code = release_code(period);
            let stem = format!("{}{}{}", config.base_url, config.prefix, code);
            ReleaseUrls {
                period,
                archive: format!("{stem}.zip"),
                workbook: format!("{stem}.xlsx"),
                code,
            }
        })
        .collect()
}
