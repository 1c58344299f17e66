use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

impl Sex {
    /// Single-letter code used in the listing and the SQL output.
    pub fn code(self) -> Option<&'static str> {
        match self {
            Sex::Male => Some("M"),
            Sex::Female => Some("F"),
            Sex::Unknown => None,
        }
    }
}

/// Field values captured from one block, before the age is derived.
#[derive(Debug, Clone, Default)]
pub struct Fields {
    pub name: String,
    pub identifier: String,
    pub birth_date: Option<NaiveDate>,
    pub sex: Option<Sex>,
}

/// One person extracted from one block. Read-only after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    name: String,
    identifier: String,
    birth_date: Option<NaiveDate>,
    sex: Sex,
    age: Option<u32>,
    raw_block: String,
}

pub const IDENTIFIER_LEN: usize = 11;

impl Record {
    pub fn new(fields: Fields, raw_block: impl Into<String>, today: NaiveDate) -> Self {
        let age = fields.birth_date.and_then(|b| age_in_years(b, today));
        Record {
            name: fields.name,
            identifier: fields.identifier,
            birth_date: fields.birth_date,
            sex: fields.sex.unwrap_or(Sex::Unknown),
            age,
            raw_block: raw_block.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn birth_date(&self) -> Option<NaiveDate> {
        self.birth_date
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn age(&self) -> Option<u32> {
        self.age
    }

    pub fn raw_block(&self) -> &str {
        &self.raw_block
    }

    /// False when a non-empty identifier does not have the CPF length.
    pub fn identifier_is_well_formed(&self) -> bool {
        self.identifier.is_empty() || self.identifier.len() == IDENTIFIER_LEN
    }

    /// Number of fields that ended up empty or unknown.
    pub fn missing_fields(&self) -> usize {
        [
            self.name.is_empty(),
            self.identifier.is_empty(),
            self.birth_date.is_none(),
            self.sex == Sex::Unknown,
        ]
        .iter()
        .filter(|m| **m)
        .count()
    }
}

/// Completed years between `birth` and `reference`.
/// Returns `None` for birth dates after the reference date.
pub fn age_in_years(birth: NaiveDate, reference: NaiveDate) -> Option<u32> {
    if birth > reference {
        return None;
    }
    let mut years = reference.year() - birth.year();
    if (reference.month(), reference.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}
