//! Turns text dumps from lookup bots into normalized person records,
//! filters them and renders a listing plus SQL inserts.

pub mod db;
pub mod filter;
pub mod input;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod record;

pub use filter::{Filter, FilterConfig, NameFilter, NameMode};
pub use pipeline::{run, Output};
pub use record::{age_in_years, Record, Sex};
