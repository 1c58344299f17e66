use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use super::blocks::Blocks;
use super::labels::{self, Field};
use super::normalize::fold_upper;
use crate::record::{Fields, Record, Sex};

static DATE_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:\d{1,2}[/.\-]\d{1,2}[/.\-]\d{4}|\d{4}[/.\-]\d{1,2}[/.\-]\d{1,2}|\d{8})\b")
        .unwrap()
});

/// Phrases bots print in place of a missing field, compared folded.
const PLACEHOLDERS: &[&str] = &[
    "SEM INFORMACAO",
    "NAO INFORMADO",
    "NENHUM",
    "NULL",
    "INDEFINIDO",
    "N A",
];

#[derive(Debug, Clone, Copy)]
enum DateFormat {
    Pattern(&'static str),
    CompactDmy,
    CompactYmd,
}

/// Tried in order; the first calendar-valid parse wins.
const DATE_FORMATS: &[DateFormat] = &[
    DateFormat::Pattern("%d/%m/%Y"),
    DateFormat::Pattern("%d-%m-%Y"),
    DateFormat::Pattern("%d.%m.%Y"),
    DateFormat::Pattern("%Y-%m-%d"),
    DateFormat::Pattern("%Y/%m/%d"),
    DateFormat::CompactDmy,
    DateFormat::CompactYmd,
];

const MALE: &[&str] = &["M", "MASC", "MASCULINO", "MALE", "HOMEM"];
const FEMALE: &[&str] = &["F", "FEM", "FEMININO", "FEMALE", "MULHER"];

impl DateFormat {
    fn parse(self, s: &str) -> Option<NaiveDate> {
        match self {
            DateFormat::Pattern(fmt) => NaiveDate::parse_from_str(s, fmt).ok(),
            DateFormat::CompactDmy => compact(s, (4..8, 2..4, 0..2)),
            DateFormat::CompactYmd => compact(s, (0..4, 4..6, 6..8)),
        }
    }
}

type Slices = (std::ops::Range<usize>, std::ops::Range<usize>, std::ops::Range<usize>);

fn compact(s: &str, (y, m, d): Slices) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::from_ymd_opt(s[y].parse().ok()?, s[m].parse().ok()?, s[d].parse().ok()?)
}

/// Lazy, consume-once sequence of records over a normalized dump.
pub struct Records<'a> {
    blocks: Blocks<'a>,
    today: NaiveDate,
}

impl Iterator for Records<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        let today = self.today;
        self.blocks.by_ref().find_map(|b| parse_block(b, today))
    }
}

pub fn extract(text: &str, today: NaiveDate) -> Records<'_> {
    Records {
        blocks: Blocks::new(text),
        today,
    }
}

/// Parse one block. `None` when the block carries no known label.
pub fn parse_block(block: &str, today: NaiveDate) -> Option<Record> {
    let mut seen: HashSet<Field> = HashSet::new();
    let mut fields = Fields::default();

    for line in block.lines() {
        let Some(m) = labels::match_line(line) else {
            continue;
        };
        if !seen.insert(m.field) {
            continue;
        }
        let value = m.value.trim();
        if is_placeholder(value) {
            continue;
        }
        match m.field {
            Field::Name => fields.name = value.to_string(),
            Field::Identifier => fields.identifier = digits_only(value),
            Field::BirthDate => fields.birth_date = parse_date(value),
            Field::Sex => fields.sex = Some(parse_sex(value)),
        }
    }

    if seen.is_empty() {
        return None;
    }
    Some(Record::new(fields, block, today))
}

/// Folding drops digits and punctuation, so values carrying digits are
/// never placeholders and the bare dash is matched as typed.
fn is_placeholder(value: &str) -> bool {
    if value.is_empty() || value == "-" {
        return true;
    }
    if value.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    PLACEHOLDERS.contains(&fold_upper(value).as_str())
}

pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let token = DATE_TOKEN_RE.find(value)?.as_str();
    DATE_FORMATS.iter().find_map(|f| f.parse(token))
}

pub fn parse_sex(value: &str) -> Sex {
    let folded = fold_upper(value);
    let token = folded.split(' ').next().unwrap_or_default();
    if MALE.contains(&token) {
        Sex::Male
    } else if FEMALE.contains(&token) {
        Sex::Female
    } else {
        Sex::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 16).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    const JOAO: &str = "Nome: JOAO DA SILVA\nCPF: 123.456.789-01\nNascimento: 15/04/1985\nSexo: M";

    #[test]
    fn full_block() {
        let r = parse_block(JOAO, today()).unwrap();
        assert_eq!(r.name(), "JOAO DA SILVA");
        assert_eq!(r.identifier(), "12345678901");
        assert_eq!(r.birth_date(), date(1985, 4, 15));
        assert_eq!(r.sex(), Sex::Male);
        assert_eq!(r.age(), Some(40));
        assert_eq!(r.raw_block(), JOAO);
    }

    #[test]
    fn impossible_date_keeps_other_fields() {
        let block = JOAO.replace("15/04/1985", "31/02/1990");
        let r = parse_block(&block, today()).unwrap();
        assert_eq!(r.birth_date(), None);
        assert_eq!(r.age(), None);
        assert_eq!(r.name(), "JOAO DA SILVA");
        assert_eq!(r.identifier(), "12345678901");
        assert_eq!(r.sex(), Sex::Male);
    }

    #[test]
    fn date_formats() {
        assert_eq!(parse_date("15/04/1985"), date(1985, 4, 15));
        assert_eq!(parse_date("15-04-1985"), date(1985, 4, 15));
        assert_eq!(parse_date("15.04.1985"), date(1985, 4, 15));
        assert_eq!(parse_date("1985-04-15"), date(1985, 4, 15));
        assert_eq!(parse_date("1985/04/15"), date(1985, 4, 15));
        assert_eq!(parse_date("15041985"), date(1985, 4, 15));
        assert_eq!(parse_date("19850415"), date(1985, 4, 15));
        assert_eq!(parse_date("15/04/1985 (40 anos)"), date(1985, 4, 15));
    }

    #[test]
    fn rejected_dates() {
        assert_eq!(parse_date("31/04/1985"), None);
        assert_eq!(parse_date("29/02/2023"), None);
        assert_eq!(parse_date("15/04/85"), None);
        assert_eq!(parse_date("abril de 1985"), None);
        assert_eq!(parse_date("1985"), None);
    }

    #[test]
    fn sex_tokens() {
        assert_eq!(parse_sex("M"), Sex::Male);
        assert_eq!(parse_sex("masculino"), Sex::Male);
        assert_eq!(parse_sex("Fem."), Sex::Female);
        assert_eq!(parse_sex("Feminino (F)"), Sex::Female);
        assert_eq!(parse_sex("X"), Sex::Unknown);
        assert_eq!(parse_sex("MF"), Sex::Unknown);
        assert_eq!(parse_sex(""), Sex::Unknown);
    }

    #[test]
    fn first_label_wins() {
        let block = "Nome: ANA\nSexo: F\nSexo: M\nCPF: 111\nCPF: 222";
        let r = parse_block(block, today()).unwrap();
        assert_eq!(r.sex(), Sex::Female);
        assert_eq!(r.identifier(), "111");
    }

    #[test]
    fn partial_and_placeholder_fields() {
        let block = "Nome: ANA\nCPF: Sem informação\nSexo: ?";
        let r = parse_block(block, today()).unwrap();
        assert_eq!(r.name(), "ANA");
        assert_eq!(r.identifier(), "");
        assert_eq!(r.birth_date(), None);
        assert_eq!(r.sex(), Sex::Unknown);
    }

    #[test]
    fn dashed_identifier_is_kept() {
        for cpf in ["123.456.789-01", "123456789-01", "-12345678901-"] {
            let r = parse_block(&format!("Nome: ANA\nCPF: {cpf}"), today()).unwrap();
            assert_eq!(r.identifier(), "12345678901", "{cpf}");
        }
        assert!(!is_placeholder("111.222.333-44"));
    }

    #[test]
    fn placeholder_spellings() {
        for value in ["", "-", "Sem informação", "NÃO INFORMADO", "nenhum", "NULL", "N/A"] {
            assert!(is_placeholder(value), "{value:?}");
        }
        for value in ["--", "MASCULINO", "15/04/1985", "JOAO"] {
            assert!(!is_placeholder(value), "{value:?}");
        }
    }

    #[test]
    fn short_identifier_is_flagged_not_dropped() {
        let r = parse_block("CPF: 123.456", today()).unwrap();
        assert_eq!(r.identifier(), "123456");
        assert!(!r.identifier_is_well_formed());
    }

    #[test]
    fn unlabeled_block_is_noise() {
        assert!(parse_block("CONSULTA REALIZADA\nBY: @bot", today()).is_none());
    }

    #[test]
    fn skips_noise_between_records() {
        let text = format!("{JOAO}\n• RESULTADO: 2\nnada por aqui\nTelefone: 1199");
        let records: Vec<_> = extract(&text, today()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), "JOAO DA SILVA");
    }
}
