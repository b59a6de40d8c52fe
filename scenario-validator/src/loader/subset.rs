//! Flat-subset parser for scenario files.
//!
//! Understands exactly the shapes scenario files use:
//! - `key: value` top-level scalars, plain or quoted
//! - `key: >` / `key: |` block scalars with an indented body
//! - `key: [a, "b"]` inline lists
//! - `key:` followed by `- item` or `- step_type: argument` entries
//!
//! A leading `---` and a trailing `...` marker are accepted. Nested mappings,
//! flow mappings, anchors and multi-document streams are rejected as parse
//! errors.

use serde_json::{Map, Number, Value};

use crate::error::LoadError;

/// A field whose value continues on the following lines.
#[derive(Debug)]
enum Open {
    Nothing,
    /// `key:` with no inline value; collects `- item` lines.
    Sequence { key: String, items: Vec<Value> },
    /// `key: >` or `key: |`; collects the indented body.
    Block {
        key: String,
        folded: bool,
        indent: Option<usize>,
        lines: Vec<String>,
    },
}

#[derive(Debug)]
struct SubsetParser {
    fields: Map<String, Value>,
    open: Open,
    /// Set once the `...` document-end marker has been seen.
    ended: bool,
}

pub(super) fn parse(content: &str) -> Result<Value, LoadError> {
    let mut parser = SubsetParser {
        fields: Map::new(),
        open: Open::Nothing,
        ended: false,
    };
    for (idx, line) in content.lines().enumerate() {
        parser.feed(idx + 1, line)?;
    }
    parser.close();
    Ok(Value::Object(parser.fields))
}

impl SubsetParser {
    fn feed(&mut self, line_no: usize, raw: &str) -> Result<(), LoadError> {
        if self.ended {
            return Self::feed_after_end(line_no, raw.trim());
        }

        let indent = raw.len() - raw.trim_start_matches([' ', '\t']).len();
        if self.feed_block(raw, indent) {
            return Ok(());
        }
        if matches!(self.open, Open::Block { .. }) {
            self.close();
        }

        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(());
        }

        let top_level_item =
            matches!(self.open, Open::Sequence { .. }) && dash_item(trimmed).is_some();
        if indent > 0 || top_level_item {
            return self.feed_item(line_no, trimmed);
        }

        if trimmed == "..." {
            self.close();
            self.ended = true;
            return Ok(());
        }

        if trimmed == "---" {
            if self.fields.is_empty() && matches!(self.open, Open::Nothing) {
                return Ok(());
            }
            return Err(LoadError::parse_at(
                line_no,
                "multiple documents are not supported",
            ));
        }

        self.close();
        self.feed_field(line_no, trimmed)
    }

    /// Only comments and blank lines may follow the document-end marker.
    fn feed_after_end(line_no: usize, trimmed: &str) -> Result<(), LoadError> {
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(());
        }
        Err(LoadError::parse_at(
            line_no,
            "multiple documents are not supported",
        ))
    }

    /// Append a line to an open block scalar. Returns `false` when the line ends the block.
    fn feed_block(&mut self, raw: &str, indent: usize) -> bool {
        let Open::Block {
            indent: block_indent,
            lines,
            ..
        } = &mut self.open
        else {
            return false;
        };
        if raw.trim().is_empty() {
            lines.push(String::new());
            return true;
        }
        if indent == 0 {
            return false;
        }
        let base = *block_indent.get_or_insert(indent);
        if indent < base {
            return false;
        }
        lines.push(raw[base..].trim_end().to_owned());
        true
    }

    fn feed_item(&mut self, line_no: usize, trimmed: &str) -> Result<(), LoadError> {
        let Open::Sequence { items, .. } = &mut self.open else {
            return Err(LoadError::parse_at(
                line_no,
                "indented content is only supported as '- item' entries under an empty field",
            ));
        };
        let Some(item) = dash_item(trimmed) else {
            return Err(LoadError::parse_at(
                line_no,
                format!("expected a '- item' entry, found '{trimmed}'"),
            ));
        };
        items.push(parse_item(line_no, item)?);
        Ok(())
    }

    fn feed_field(&mut self, line_no: usize, line: &str) -> Result<(), LoadError> {
        let Some((key, rest)) = split_key(line) else {
            return Err(LoadError::parse_at(
                line_no,
                format!("expected 'key: value', found '{line}'"),
            ));
        };
        if self.fields.contains_key(key) {
            return Err(LoadError::parse_at(
                line_no,
                format!("duplicate field '{key}'"),
            ));
        }

        let rest = rest.trim();
        if rest.is_empty() || rest.starts_with('#') {
            self.open = Open::Sequence {
                key: key.to_owned(),
                items: Vec::new(),
            };
            return Ok(());
        }
        if let Some(folded) = block_indicator(rest) {
            self.open = Open::Block {
                key: key.to_owned(),
                folded,
                indent: None,
                lines: Vec::new(),
            };
            return Ok(());
        }

        let value = parse_value(line_no, rest)?;
        self.fields.insert(key.to_owned(), value);
        Ok(())
    }

    fn close(&mut self) {
        match std::mem::replace(&mut self.open, Open::Nothing) {
            Open::Nothing => {}
            Open::Sequence { key, items } => {
                let value = if items.is_empty() {
                    Value::Null
                } else {
                    Value::Array(items)
                };
                self.fields.insert(key, value);
            }
            Open::Block {
                key, folded, lines, ..
            } => {
                self.fields
                    .insert(key, Value::String(render_block(&lines, folded)));
            }
        }
    }
}

/// `- rest` or a bare `-`.
fn dash_item(trimmed: &str) -> Option<&str> {
    if trimmed == "-" {
        return Some("");
    }
    trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("-\t"))
        .map(str::trim)
}

/// Split `key: rest` at the first colon followed by whitespace or end of line.
fn split_key(line: &str) -> Option<(&str, &str)> {
    if line.starts_with(['"', '\'', '-', '[', '{', '&', '*', '!']) {
        return None;
    }
    let mut search = 0;
    while let Some(pos) = line[search..].find(':') {
        let at = search + pos;
        let after = &line[at + 1..];
        if after.is_empty() || after.starts_with([' ', '\t']) {
            let key = line[..at].trim_end();
            return (!key.is_empty()).then_some((key, after));
        }
        search = at + 1;
    }
    None
}

/// `>` / `|` with optional chomping or indentation indicators. `Some(true)` when folded.
fn block_indicator(rest: &str) -> Option<bool> {
    let folded = match rest.as_bytes().first() {
        Some(b'>') => true,
        Some(b'|') => false,
        _ => return None,
    };
    let modifiers = strip_comment(&rest[1..]);
    modifiers
        .chars()
        .all(|c| c == '+' || c == '-' || c.is_ascii_digit())
        .then_some(folded)
}

fn render_block(lines: &[String], folded: bool) -> String {
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    let lines = &lines[..end];
    if lines.is_empty() {
        return String::new();
    }

    let mut out = if folded {
        let mut text = String::new();
        for line in lines {
            if line.is_empty() {
                text.push('\n');
                continue;
            }
            if !text.is_empty() && !text.ends_with('\n') {
                text.push(' ');
            }
            text.push_str(line);
        }
        text
    } else {
        lines.join("\n")
    };
    out.push('\n');
    out
}

fn parse_item(line_no: usize, item: &str) -> Result<Value, LoadError> {
    if item.is_empty() || item.starts_with('#') {
        return Ok(Value::Null);
    }
    if let Some((key, rest)) = split_key(item) {
        let rest = rest.trim();
        let value = if rest.is_empty() || rest.starts_with('#') {
            Value::Null
        } else {
            parse_value(line_no, rest)?
        };
        let mut entry = Map::new();
        entry.insert(key.to_owned(), value);
        return Ok(Value::Object(entry));
    }
    parse_value(line_no, item)
}

fn parse_value(line_no: usize, rest: &str) -> Result<Value, LoadError> {
    if rest.starts_with('{') {
        return Err(LoadError::parse_at(
            line_no,
            "flow mappings are not supported",
        ));
    }
    if rest.starts_with('[') {
        return parse_inline_list(line_no, rest);
    }
    parse_scalar(line_no, rest)
}

fn parse_inline_list(line_no: usize, rest: &str) -> Result<Value, LoadError> {
    let body = &rest[1..];
    let Some(close) = find_unquoted(body, ']') else {
        return Err(LoadError::parse_at(line_no, "unterminated inline list"));
    };
    check_trailing(line_no, &body[close + 1..], "inline list")?;

    split_unquoted(&body[..close], ',')
        .into_iter()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| parse_scalar(line_no, entry))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

fn parse_scalar(line_no: usize, s: &str) -> Result<Value, LoadError> {
    let unterminated = |what: &str| LoadError::parse_at(line_no, format!("unterminated {what}"));
    match s.as_bytes().first() {
        Some(b'"') => {
            let (text, rest) =
                double_quoted(&s[1..]).ok_or_else(|| unterminated("double-quoted string"))?;
            check_trailing(line_no, rest, "quoted string")?;
            Ok(Value::String(text))
        }
        Some(b'\'') => {
            let (text, rest) =
                single_quoted(&s[1..]).ok_or_else(|| unterminated("single-quoted string"))?;
            check_trailing(line_no, rest, "quoted string")?;
            Ok(Value::String(text))
        }
        _ => Ok(plain_scalar(strip_comment(s))),
    }
}

fn check_trailing(line_no: usize, rest: &str, what: &str) -> Result<(), LoadError> {
    let rest = rest.trim();
    if rest.is_empty() || rest.starts_with('#') {
        Ok(())
    } else {
        Err(LoadError::parse_at(
            line_no,
            format!("unexpected '{rest}' after {what}"),
        ))
    }
}

fn double_quoted(s: &str) -> Option<(String, &str)> {
    let mut out = String::new();
    let mut chars = s.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some((out, &s[i + 1..])),
            '\\' => match chars.next()?.1 {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                other @ ('"' | '\\' | '/') => out.push(other),
                other => {
                    out.push('\\');
                    out.push(other);
                }
            },
            other => out.push(other),
        }
    }
    None
}

fn single_quoted(s: &str) -> Option<(String, &str)> {
    let mut out = String::new();
    let mut chars = s.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '\'' {
            out.push(c);
            continue;
        }
        if chars.peek().is_some_and(|&(_, next)| next == '\'') {
            out.push('\'');
            chars.next();
            continue;
        }
        return Some((out, &s[i + 1..]));
    }
    None
}

/// Drop a trailing ` # comment` from a plain scalar.
fn strip_comment(s: &str) -> &str {
    let cut = s
        .char_indices()
        .find(|&(i, c)| c == '#' && (i == 0 || s[..i].ends_with([' ', '\t'])))
        .map_or(s.len(), |(i, _)| i);
    s[..cut].trim()
}

/// Type a plain scalar the way YAML's core schema does for the cases scenario files hit.
fn plain_scalar(s: &str) -> Value {
    match s {
        "" | "~" | "null" | "Null" | "NULL" => return Value::Null,
        "true" | "True" | "TRUE" => return Value::Bool(true),
        "false" | "False" | "FALSE" => return Value::Bool(false),
        _ => {}
    }
    let digits = s.strip_prefix('-').unwrap_or(s);
    let is_int = !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit());
    if is_int && let Ok(n) = s.parse::<i64>() {
        return Value::from(n);
    }
    let is_float = digits.split_once('.').is_some_and(|(whole, frac)| {
        !whole.is_empty()
            && !frac.is_empty()
            && whole.bytes().all(|b| b.is_ascii_digit())
            && frac.bytes().all(|b| b.is_ascii_digit())
    });
    if is_float && let Some(n) = s.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }
    Value::String(s.to_owned())
}

fn find_unquoted(s: &str, target: char) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == target => return Some(i),
            None => {}
        }
    }
    None
}

fn split_unquoted(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = s;
    while let Some(pos) = find_unquoted(rest, sep) {
        parts.push(&rest[..pos]);
        rest = &rest[pos + sep.len_utf8()..];
    }
    parts.push(rest);
    parts
}
