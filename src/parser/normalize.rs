use std::borrow::Cow;

use super::labels::{self, Field};
use super::spelling::Dictionary;

/// Clean a raw dump: repair mis-decoded tokens, drop invisible characters,
/// trim lines, collapse blank runs, and rewrite name values.
/// Labels and line/block boundaries are kept as they are.
pub fn normalize(text: &str, dict: &Dictionary) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut out: Vec<String> = Vec::new();
    let mut pending_blank = false;

    for raw in text.split('\n') {
        let line = clean_line(raw);
        if line.is_empty() {
            pending_blank = !out.is_empty();
            continue;
        }
        if pending_blank {
            out.push(String::new());
            pending_blank = false;
        }
        out.push(rewrite_name_value(line, dict));
    }

    out.join("\n")
}

/// Fold, uppercase and spell-correct a free-text name.
pub fn normalize_name(value: &str, dict: &Dictionary) -> String {
    fold_upper(value)
        .split(' ')
        .map(|token| dict.correct(token).unwrap_or(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Accent-folded, uppercased text with single spaces. Keeps letters, `'` and `-`.
pub fn fold_upper(value: &str) -> String {
    let mut folded = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_ascii_alphabetic() {
            folded.push(c.to_ascii_uppercase());
        } else if let Some(base) = fold_accent(c) {
            folded.push(base);
        } else if c == '\'' || c == '’' || c == '`' {
            folded.push('\'');
        } else if c == '-' {
            folded.push('-');
        } else if c.is_alphabetic() {
            folded.extend(c.to_uppercase());
        } else {
            folded.push(' ');
        }
    }
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn fold_accent(c: char) -> Option<char> {
    let base = match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' | 'Á' | 'À' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'ø' | 'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => 'O',
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' | 'Ç' => 'C',
        'ñ' | 'Ñ' => 'N',
        'ý' | 'ÿ' | 'Ý' => 'Y',
        'ł' | 'Ł' => 'L',
        _ => return None,
    };
    Some(base)
}

fn rewrite_name_value(line: String, dict: &Dictionary) -> String {
    let span = labels::match_line(&line)
        .filter(|m| m.field == Field::Name)
        .map(|m| m.span);
    let Some(span) = span else {
        return line;
    };
    let value = normalize_name(&line[span.clone()], dict);
    let mut rebuilt = String::with_capacity(line.len());
    rebuilt.push_str(&line[..span.start]);
    rebuilt.push_str(&value);
    rebuilt.truncate(rebuilt.trim_end().len());
    rebuilt
}

fn clean_line(raw: &str) -> String {
    let repaired: Vec<Cow<'_, str>> = raw.split(' ').map(repair_token).collect();
    let joined = repaired.join(" ");
    let visible: String = joined.chars().filter(|c| !is_invisible(*c)).collect();
    visible.trim().to_string()
}

fn is_invisible(c: char) -> bool {
    matches!(c, '\u{FEFF}' | '\u{200B}'..='\u{200D}' | '\u{2060}') || (c.is_control() && c != '\t')
}

/// Undo UTF-8 text that was decoded as Latin-1 / Windows-1252.
/// Repeats until nothing changes, so tokens mangled several times come back
/// whole. Each successful pass leaves fewer chars, which bounds the loop.
fn repair_token(token: &str) -> Cow<'_, str> {
    let mut current = Cow::Borrowed(token);
    while let Some(fixed) = redecode(&current) {
        current = Cow::Owned(fixed);
    }
    current
}

fn redecode(token: &str) -> Option<String> {
    if token.is_ascii() {
        return None;
    }
    let bytes = token.chars().map(single_byte).collect::<Option<Vec<u8>>>()?;
    let decoded = String::from_utf8(bytes).ok()?;
    (decoded != token).then_some(decoded)
}

fn single_byte(c: char) -> Option<u8> {
    let code = c as u32;
    if code <= 0xFF {
        return Some(code as u8);
    }
    let byte = match c {
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(byte)
}
