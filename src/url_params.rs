use reqwest::Url;
use serde_json::{Map, Value};

use crate::config::ConfigMap;

/// Remove HTML-tag-like substrings from a value. A tag is `<`, an optional
/// `/`, at least one character that is not `>`, then `>`.
pub fn strip_tags(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find('<') {
        let after = &rest[start + 1..];
        let body = after.strip_prefix('/').unwrap_or(after);
        match body.find('>') {
            Some(end) if end > 0 => {
                out.push_str(&rest[..start]);
                let consumed = start + 1 + (after.len() - body.len()) + end + 1;
                rest = &rest[consumed..];
            }
            _ => {
                // Not a tag; keep the '<' and continue past it.
                out.push_str(&rest[..=start]);
                rest = &rest[start + 1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Decode a query string into a flat map of raw string values.
pub fn parse_query(query: &str) -> Map<String, Value> {
    let mut map = Map::new();
    let trimmed = query.trim_start_matches('?');
    let Ok(url) = Url::parse(&format!("http://localhost/?{trimmed}")) else {
        return map;
    };
    for (key, value) in url.query_pairs() {
        map.insert(key.into_owned(), Value::String(value.into_owned()));
    }
    map
}

/// Build the URL-parameter config layer: keep only allow-listed keys, strip
/// tag-like substrings from every value, and coerce case-insensitive
/// `"true"`/`"false"` into booleans. Empty values are dropped.
pub fn url_param_values(query: &str, allow_list: &[String]) -> ConfigMap {
    let raw = parse_query(query);
    let mut out = Map::new();

    for key in allow_list {
        let Some(Value::String(value)) = raw.get(key) else {
            continue;
        };
        let cleaned = strip_tags(value);
        let coerced = match cleaned.to_lowercase().as_str() {
            "" => continue,
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(cleaned),
        };
        out.insert(key.clone(), coerced);
    }

    ConfigMap::from(out)
}
