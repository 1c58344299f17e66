use crate::record::Record;

pub const SEPARATOR: &str = "------------------------";
pub const TABLE: &str = "people";
pub const COLUMNS: [&str; 4] = ["name", "identifier", "birth_date", "sex"];

const NOT_INFORMED: &str = "Não informado";

/// Readable stanza for one record; every label is always present.
pub fn stanza(record: &Record) -> String {
    let name = non_empty(record.name()).unwrap_or(NOT_INFORMED);
    let mut identifier = non_empty(record.identifier()).unwrap_or("Nenhum").to_string();
    if !record.identifier_is_well_formed() {
        identifier.push_str(" (tamanho inválido)");
    }
    let birth = record
        .birth_date()
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| NOT_INFORMED.to_string());
    let sex = record.sex().code().unwrap_or(NOT_INFORMED);
    let age = record
        .age()
        .map(|a| a.to_string())
        .unwrap_or_else(|| "Indefinida".to_string());

    format!("Nome: {name}\nCPF: {identifier}\nNascimento: {birth}\nSexo: {sex}\nIdade: {age}")
}

pub fn render_listing<'a>(records: impl IntoIterator<Item = &'a Record>) -> String {
    records
        .into_iter()
        .map(stanza)
        .collect::<Vec<_>>()
        .join(&format!("\n{SEPARATOR}\n"))
}

/// One `INSERT` per record. Strings are quoted literals; absent values are `NULL`.
pub fn insert_statement(record: &Record) -> String {
    let values = [
        non_empty(record.name()).map(sql_literal),
        non_empty(record.identifier()).map(sql_literal),
        record
            .birth_date()
            .map(|d| sql_literal(&d.format("%Y-%m-%d").to_string())),
        record.sex().code().map(sql_literal),
    ];
    let values: Vec<String> = values
        .into_iter()
        .map(|v| v.unwrap_or_else(|| "NULL".to_string()))
        .collect();
    format!(
        "INSERT INTO {TABLE} ({}) VALUES ({});",
        COLUMNS.join(", "),
        values.join(", ")
    )
}

pub fn render_sql<'a>(records: impl IntoIterator<Item = &'a Record>) -> String {
    let mut sql = String::new();
    for record in records {
        sql.push_str(&insert_statement(record));
        sql.push('\n');
    }
    sql
}

/// Single-quoted SQL string literal. Quotes are doubled and NUL is dropped,
/// so the value can never end the literal early.
pub fn sql_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\'' => out.push_str("''"),
            '\0' => {}
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}
