use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

use crate::unique::UniqueStrings;

/// Appended by [`abbreviate`] and [`shorten`] to cut strings.
pub const ABBREVIATION_POSTFIX: &str = " [...]";

lazy_static! {
    static ref FIRST_WORD: Regex = compile("(.)([A-Z][a-z]+)");
    static ref REST_WORDS: Regex = compile("([a-z0-9])([A-Z])");
}

/// Compile a pattern literal. Every literal passed here is exercised by the
/// unit tests.
#[allow(clippy::expect_used)]
pub(crate) fn compile(pattern: &'static str) -> Regex {
    Regex::new(pattern).expect("pattern literal compiles")
}

/// Every letter in `s` is uppercase. Non-letters are ignored.
pub fn is_uppercase(s: &str) -> bool {
    s.chars().all(|c| !c.is_alphabetic() || c.is_uppercase())
}

/// Every letter in `s` is lowercase. Non-letters are ignored.
pub fn is_lowercase(s: &str) -> bool {
    s.chars().all(|c| !c.is_alphabetic() || c.is_lowercase())
}

/// `s` holds only digits and the letters a-f in either case. The empty
/// string passes.
pub fn is_hexadecimal(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_numeric() || ('a'..='f').contains(&c) || ('A'..='F').contains(&c))
}

/// Remove the first occurrence of `item`, case sensitive. Returns whether
/// anything was removed.
pub fn remove(items: &mut Vec<String>, item: &str) -> bool {
    match items.iter().position(|other| other == item) {
        Some(index) => {
            items.remove(index);
            true
        }
        None => false,
    }
}

/// Items not listed in `to_remove`, case sensitive, in their original order.
pub fn remove_bulk<S: AsRef<str>>(items: &[S], to_remove: &[S]) -> Vec<String> {
    let to_remove: HashSet<&str> = to_remove.iter().map(AsRef::as_ref).collect();

    items
        .iter()
        .map(AsRef::as_ref)
        .filter(|item| !to_remove.contains(item))
        .map(str::to_string)
        .collect()
}

pub fn has_duplicates<S: AsRef<str>>(items: &[S]) -> bool {
    let mut visited = HashSet::with_capacity(items.len());
    items.iter().any(|item| !visited.insert(item.as_ref()))
}

/// Look `key` up in `obj` and in the objects nested in it, ignoring case.
/// Entries are visited in order and each nested object is searched before
/// moving to the next entry.
pub fn find_element<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    let key = key.to_lowercase();
    find_lowercase(obj, &key)
}

fn find_lowercase<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    for (name, value) in obj {
        if name.to_lowercase() == key {
            return Some(value);
        }

        if let Value::Object(nested) = value {
            if let Some(found) = find_lowercase(nested, key) {
                return Some(found);
            }
        }
    }

    None
}

pub fn first_not_empty<'a>(values: &[&'a str]) -> &'a str {
    values.iter().copied().find(|value| !value.is_empty()).unwrap_or_default()
}

/// Cut `s` to `max_length` characters, the last six of which become
/// [`ABBREVIATION_POSTFIX`]. `s` comes back unchanged when it already fits or
/// when `max_length` leaves no room for anything but the postfix.
pub fn abbreviate(s: &str, max_length: usize) -> String {
    let postfix_length = ABBREVIATION_POSTFIX.chars().count();
    if max_length <= postfix_length || s.chars().count() <= max_length {
        return s.to_string();
    }

    let mut abbreviated: String = s.chars().take(max_length - postfix_length).collect();
    abbreviated.push_str(ABBREVIATION_POSTFIX);
    abbreviated
}

/// Keep the first `max_length` characters of `s` and mark the cut with
/// [`ABBREVIATION_POSTFIX`].
pub fn shorten(s: &str, max_length: usize) -> String {
    if s.chars().count() <= max_length {
        return s.to_string();
    }

    let mut shortened: String = s.chars().take(max_length).collect();
    shortened.push_str(ABBREVIATION_POSTFIX);
    shortened
}

pub fn trim_length(s: &str, max_length: usize) -> String {
    s.chars().take(max_length).collect()
}

/// Split `s` on `separator` and strip any of the characters in `cut_set`
/// from both ends of each part.
pub fn split_trim(s: &str, separator: &str, cut_set: &str) -> Vec<String> {
    s.split(separator)
        .map(|part| part.trim_matches(|c| cut_set.contains(c)).to_string())
        .collect()
}

/// Append each of `items` that `list` does not hold yet.
pub fn append_if_missing(list: &mut Vec<String>, items: &[&str]) {
    for item in items {
        if !list.iter().any(|known| known == item) {
            list.push((*item).to_string());
        }
    }
}

/// `CreatedAt` becomes `created_at`, `HTTPServer` becomes `http_server`.
pub fn camel_to_snake(s: &str) -> String {
    let snake = FIRST_WORD.replace_all(s, "${1}_${2}");
    let snake = REST_WORDS.replace_all(&snake, "${1}_${2}");
    snake.to_lowercase()
}

/// Values of `map` sorted and joined with `", "`.
pub fn join_map_values(map: &HashMap<String, String>) -> String {
    let mut values: Vec<&str> = map.values().map(String::as_str).collect();
    values.sort_unstable();
    values.join(", ")
}

/// `all` without repeats, first occurrence wins.
pub fn unique<S: AsRef<str>>(all: &[S]) -> Vec<String> {
    let mut set = UniqueStrings::with_capacity(all.len());
    for item in all {
        set.append(item.as_ref());
    }
    set.into_items()
}
