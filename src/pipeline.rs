use chrono::NaiveDate;

use crate::filter::{Filter, FilterConfig};
use crate::output::{render_listing, render_sql};
use crate::parser::extract;
use crate::record::Record;

/// Filtered records with both renderings, in input order.
#[derive(Debug, Clone, Default)]
pub struct Output {
    pub records: Vec<Record>,
    pub listing: String,
    pub sql: String,
}

/// Normalized dump in, listing and SQL out.
pub fn run(normalized: &str, config: &FilterConfig, today: NaiveDate) -> Output {
    filter_and_render(extract(normalized, today), config)
}

/// Apply the configured filter and render what survives.
pub fn filter_and_render(records: impl IntoIterator<Item = Record>, config: &FilterConfig) -> Output {
    let filter = Filter::new(config);
    let records: Vec<Record> = records.into_iter().filter(|r| filter.matches(r)).collect();
    let listing = render_listing(&records);
    let sql = render_sql(&records);
    Output {
        records,
        listing,
        sql,
    }
}
