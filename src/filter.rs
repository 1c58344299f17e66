use anyhow::{ensure, Result};

use crate::parser::normalize::fold_upper;
use crate::record::{Record, Sex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameMode {
    #[default]
    Exact,
    Contains,
    StartsWith,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameFilter {
    pub text: String,
    pub mode: NameMode,
}

/// Filter options handed over by the command line. Everything is off by default.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    pub name: Option<NameFilter>,
    pub sex: Option<Sex>,
    pub age_min: Option<u32>,
    pub age_max: Option<u32>,
    pub print_to_console: bool,
}

impl FilterConfig {
    pub fn validate(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.age_min, self.age_max) {
            ensure!(min <= max, "idade minima ({min}) maior que a maxima ({max})");
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Criterion {
    Name { query: String, mode: NameMode },
    Sex(Sex),
    Age { min: Option<u32>, max: Option<u32> },
}

impl Criterion {
    fn matches(&self, record: &Record) -> bool {
        match self {
            Criterion::Name { query, mode } => {
                let name = fold_upper(record.name());
                match mode {
                    NameMode::Exact => name == *query,
                    NameMode::Contains => name.contains(query.as_str()),
                    NameMode::StartsWith => name.starts_with(query.as_str()),
                }
            }
            Criterion::Sex(sex) => record.sex() == *sex,
            Criterion::Age { min, max } => record.age().is_some_and(|age| {
                min.map_or(true, |m| age >= m) && max.map_or(true, |m| age <= m)
            }),
        }
    }
}

/// Conjunction of the active criteria. With none active every record passes.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    criteria: Vec<Criterion>,
}

impl Filter {
    pub fn new(config: &FilterConfig) -> Self {
        let mut criteria = Vec::new();
        if let Some(name) = &config.name {
            let query = fold_upper(&name.text);
            if !query.is_empty() {
                criteria.push(Criterion::Name {
                    query,
                    mode: name.mode,
                });
            }
        }
        if let Some(sex) = config.sex {
            criteria.push(Criterion::Sex(sex));
        }
        if config.age_min.is_some() || config.age_max.is_some() {
            criteria.push(Criterion::Age {
                min: config.age_min,
                max: config.age_max,
            });
        }
        Filter { criteria }
    }

    pub fn and(mut self, other: Filter) -> Filter {
        self.criteria.extend(other.criteria);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.criteria.iter().all(|c| c.matches(record))
    }
}
