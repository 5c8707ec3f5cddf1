//! Command parser — `key=value` arguments inside a fenced block.
//!
//! Grammar (line oriented):
//! - a line that starts with a recognized key immediately followed by `=`
//!   opens a new argument; the rest of the line is the first value line
//! - any other line continues the current value (joined with `\n`)
//! - lines before the first key are ignored
//!
//! Only exact `key=` prefixes open arguments, so SQL such as
//! `WHERE level='ERROR'` or an indented `limit=5` inside a query body stays
//! part of the value.

/// Ordered argument list produced from one block.
///
/// A key that appears twice keeps its first position but takes the later
/// value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolArgs {
    entries: Vec<(String, String)>,
}

impl ToolArgs {
    /// Value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Insert or overwrite.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse a block body into arguments.
///
/// `keys` lists the argument names the tool understands. With an empty list
/// any identifier (`[A-Za-z0-9_]+`) followed by `=` opens an argument.
pub fn parse_block(block: &str, keys: &[&str]) -> ToolArgs {
    let mut args = ToolArgs::default();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in block.trim().lines() {
        if let Some((key, first)) = split_key_line(line, keys) {
            if let Some((k, lines)) = current.take() {
                args.insert(k, lines.join("\n").trim());
            }
            current = Some((key.to_string(), vec![first]));
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        }
    }

    if let Some((k, lines)) = current {
        args.insert(k, lines.join("\n").trim());
    }
    args
}

/// `Some((key, value))` when `line` opens a new argument.
fn split_key_line<'a>(line: &'a str, keys: &[&str]) -> Option<(&'a str, &'a str)> {
    let (key, value) = line.split_once('=')?;
    let recognized = if keys.is_empty() {
        is_identifier(key)
    } else {
        keys.contains(&key)
    };
    recognized.then(|| (key, value.trim()))
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse a file list argument.
///
/// Accepts a bracketed list of quoted or bare items (`['a.parquet',
/// "b.parquet"]`) or a single path. The text is scanned, never evaluated.
pub fn parse_file_list(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix('[') else {
        let single = strip_quotes(trimmed);
        return if single.is_empty() {
            Vec::new()
        } else {
            vec![single.to_string()]
        };
    };
    let inner = inner.strip_suffix(']').unwrap_or(inner);

    let mut items = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in inner.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None => match c {
                '\'' | '"' => quote = Some(c),
                ',' => push_item(&mut items, &mut current),
                _ => current.push(c),
            },
        }
    }
    push_item(&mut items, &mut current);
    items
}

fn push_item(items: &mut Vec<String>, current: &mut String) {
    let item = current.trim();
    if !item.is_empty() {
        items.push(item.to_string());
    }
    current.clear();
}

fn strip_quotes(s: &str) -> &str {
    for q in ['\'', '"'] {
        if let Some(inner) = s.strip_prefix(q).and_then(|r| r.strip_suffix(q)) {
            return inner;
        }
    }
    s
}


