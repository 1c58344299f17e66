use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Identifier,
    BirthDate,
    Sex,
}

/// A field tag plus the line pattern that recognizes one label spelling.
/// Group 1 of `re` captures the value after the colon.
pub struct LabelMatcher {
    pub field: Field,
    re: Regex,
}

/// Leading decoration allowed before a label: emoji, bullets, dashes.
const LEAD: &str = r"^[^\p{L}\p{N}]*";

fn matcher(field: Field, label: &str) -> LabelMatcher {
    let re = Regex::new(&format!(r"(?i){LEAD}(?:{label})\s*:\s*(.*)$")).unwrap();
    LabelMatcher { field, re }
}

/// Tried in order; longer spellings come before their prefixes.
static LABELS: LazyLock<Vec<LabelMatcher>> = LazyLock::new(|| {
    vec![
        matcher(Field::Name, r"nome\s+completo"),
        matcher(Field::Name, r"nome"),
        matcher(Field::Name, r"name"),
        matcher(Field::Identifier, r"cpf\s*/\s*cnpj"),
        matcher(Field::Identifier, r"cpf"),
        matcher(Field::Identifier, r"cnpj"),
        matcher(Field::Identifier, r"documento"),
        matcher(Field::BirthDate, r"data\s+de\s+nascimento"),
        matcher(Field::BirthDate, r"data\s+nascimento"),
        matcher(Field::BirthDate, r"dt\.?\s*nasc\.?"),
        matcher(Field::BirthDate, r"nascimento"),
        matcher(Field::BirthDate, r"nasc\.?"),
        matcher(Field::BirthDate, r"birth\s*date"),
        matcher(Field::Sex, r"sexo"),
        matcher(Field::Sex, r"g[eê]nero"),
        matcher(Field::Sex, r"gender"),
    ]
});

pub struct LabelMatch<'a> {
    pub field: Field,
    pub value: &'a str,
    /// Byte range of the value within the line.
    pub span: Range<usize>,
}

/// Match `line` against the label table, first matcher wins.
pub fn match_line(line: &str) -> Option<LabelMatch<'_>> {
    LABELS.iter().find_map(|m| {
        let caps = m.re.captures(line)?;
        let value = caps.get(1)?;
        Some(LabelMatch {
            field: m.field,
            value: value.as_str(),
            span: value.range(),
        })
    })
}

pub fn is_name_line(line: &str) -> bool {
    matches!(match_line(line), Some(m) if m.field == Field::Name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(line: &str) -> Option<Field> {
        match_line(line).map(|m| m.field)
    }

    #[test]
    fn plain_labels() {
        assert_eq!(field_of("Nome: JOAO"), Some(Field::Name));
        assert_eq!(field_of("CPF: 123"), Some(Field::Identifier));
        assert_eq!(field_of("Nascimento: 01/01/2000"), Some(Field::BirthDate));
        assert_eq!(field_of("Sexo: M"), Some(Field::Sex));
    }

    #[test]
    fn case_and_decoration() {
        assert_eq!(field_of("👤 NOME: X"), Some(Field::Name));
        assert_eq!(field_of("• cpf/cnpj : 1"), Some(Field::Identifier));
        assert_eq!(field_of("- Data de Nascimento: 1"), Some(Field::BirthDate));
        assert_eq!(field_of("Gênero: F"), Some(Field::Sex));
    }

    #[test]
    fn value_span_points_into_line() {
        let line = "Nome Completo:   maria souza";
        let m = match_line(line).unwrap();
        assert_eq!(m.value, "maria souza");
        assert_eq!(&line[m.span], "maria souza");
    }

    #[test]
    fn related_labels_are_not_names() {
        assert_eq!(field_of("Nome da Mae: MARIA"), None);
        assert_eq!(field_of("Nome do Pai: JOSE"), None);
        assert_eq!(field_of("Telefone: 1199999"), None);
        assert_eq!(field_of("• RESULTADO: 2"), None);
    }
}
