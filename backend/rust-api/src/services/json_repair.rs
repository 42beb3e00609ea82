//! Best-effort repair of near-valid JSON emitted by language models.
//!
//! Handles Markdown code fences, bare object keys, single-quoted strings and
//! trailing commas. Rewrites only happen outside double-quoted string
//! literals, so text that already parses keeps its value.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LEADING_FENCE: Regex = Regex::new(r"^\s*```[A-Za-z0-9_-]*[ \t]*").unwrap();
    static ref TRAILING_FENCE: Regex = Regex::new(r"```\s*$").unwrap();
}

pub fn repair_json(raw: &str) -> String {
    let without_leading = LEADING_FENCE.replace(raw, "");
    let unfenced = TRAILING_FENCE.replace(&without_leading, "");
    rewrite_structure(unfenced.trim())
}

#[derive(Clone, Copy)]
enum State {
    Structure,
    DoubleQuoted { escaped: bool },
    SingleQuoted,
}

fn rewrite_structure(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 16);
    let mut state = State::Structure;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match state {
            State::DoubleQuoted { escaped } => {
                out.push(c);
                state = match (escaped, c) {
                    (true, _) => State::DoubleQuoted { escaped: false },
                    (false, '\\') => State::DoubleQuoted { escaped: true },
                    (false, '"') => State::Structure,
                    (false, _) => State::DoubleQuoted { escaped: false },
                };
            }
            State::SingleQuoted => match c {
                '\\' if chars.get(i + 1) == Some(&'\'') => {
                    out.push('\'');
                    i += 1;
                }
                '\\' => {
                    out.push('\\');
                    if let Some(&next) = chars.get(i + 1) {
                        out.push(next);
                        i += 1;
                    }
                }
                '"' => out.push_str("\\\""),
                '\'' if closes_single_quote(&chars, i + 1) => {
                    out.push('"');
                    state = State::Structure;
                }
                _ => out.push(c),
            },
            State::Structure => match c {
                '"' => {
                    out.push(c);
                    state = State::DoubleQuoted { escaped: false };
                }
                '\'' => {
                    out.push('"');
                    state = State::SingleQuoted;
                }
                ',' if matches!(next_significant(&chars, i + 1), Some('}') | Some(']')) => {}
                c if is_ident_start(c) && follows_key_position(&out) => {
                    let end = identifier_end(&chars, i);
                    let ident: String = chars[i..end].iter().collect();
                    if next_significant(&chars, end) == Some(':') {
                        out.push('"');
                        out.push_str(&ident);
                        out.push('"');
                    } else {
                        out.push_str(&ident);
                    }
                    i = end;
                    continue;
                }
                _ => out.push(c),
            },
        }
        i += 1;
    }

    out
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn identifier_end(chars: &[char], start: usize) -> usize {
    let mut end = start;
    while end < chars.len() && (chars[end].is_ascii_alphanumeric() || chars[end] == '_') {
        end += 1;
    }
    end
}

fn next_significant(chars: &[char], from: usize) -> Option<char> {
    chars[from.min(chars.len())..]
        .iter()
        .copied()
        .find(|c| !c.is_whitespace())
}

/// True when the last non-whitespace character already emitted opens an
/// object or separates members.
fn follows_key_position(out: &str) -> bool {
    matches!(out.trim_end().chars().last(), Some('{') | Some(','))
}

/// A single quote ends a single-quoted string only when structure follows it.
fn closes_single_quote(chars: &[char], from: usize) -> bool {
    matches!(
        next_significant(chars, from),
        None | Some(',') | Some('}') | Some(']') | Some(':')
    )
}
