use std::collections::{HashMap, HashSet};

const BUILTIN_WORDS: &str = include_str!("../../data/nomes.txt");

/// Read-only word list used to correct name tokens.
/// Words are stored folded and uppercased, bucketed by length.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    words: HashSet<String>,
    by_len: HashMap<usize, Vec<String>>,
}

impl Dictionary {
    pub fn builtin() -> Self {
        Self::from_word_list(BUILTIN_WORDS)
    }

    /// One word per line; blank lines and `#` comments are skipped.
    pub fn from_word_list(text: &str) -> Self {
        let mut dict = Dictionary::default();
        dict.extend_from_word_list(text);
        dict
    }

    pub fn extend_from_word_list(&mut self, text: &str) {
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            for word in line.split_whitespace() {
                self.insert(word);
            }
        }
    }

    pub fn insert(&mut self, word: &str) {
        let word = super::normalize::fold_upper(word);
        if word.is_empty() || !self.words.insert(word.clone()) {
            return;
        }
        self.by_len.entry(word.chars().count()).or_default().push(word);
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// The unique dictionary word one edit away from `token`, if any.
    /// Known words and tokens with non-letters are left alone. So are tokens
    /// under three letters: particles like `DA`, `DE` and `DO` sit one edit
    /// from each other and from most short words.
    pub fn correct(&self, token: &str) -> Option<&str> {
        let len = token.chars().count();
        if len < 3 || self.contains(token) || !token.chars().all(|c| c.is_ascii_uppercase()) {
            return None;
        }
        let mut found: Option<&str> = None;
        for bucket in [len - 1, len, len + 1] {
            let Some(words) = self.by_len.get(&bucket) else {
                continue;
            };
            for word in words {
                if within_one_edit(token, word) {
                    if found.is_some() {
                        return None;
                    }
                    found = Some(word.as_str());
                }
            }
        }
        found
    }
}

/// True when `a` and `b` differ by at most one insertion, deletion or substitution.
fn within_one_edit(a: &str, b: &str) -> bool {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    if long.len() - short.len() > 1 {
        return false;
    }
    let prefix = short.iter().zip(long.iter()).take_while(|(x, y)| x == y).count();
    if prefix == short.len() {
        return true;
    }
    if short.len() == long.len() {
        short[prefix + 1..] == long[prefix + 1..]
    } else {
        short[prefix..] == long[prefix + 1..]
    }
}
