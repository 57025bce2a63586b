//! Deterministic encoders for query strings, form bodies and path templates.

use std::collections::BTreeMap;

/// Render `params` as `k=v&k=v`, keys sorted, both sides percent-encoded.
pub fn query_string(params: &BTreeMap<String, String>) -> String {
    encode_pairs(params)
}

/// Render form fields as `application/x-www-form-urlencoded`, keys sorted.
pub fn form_encode(fields: &BTreeMap<String, String>) -> String {
    encode_pairs(fields)
}

fn encode_pairs(pairs: &BTreeMap<String, String>) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Decode a `application/x-www-form-urlencoded` payload.
///
/// `+` is read as a space. Pairs that fail to decode are skipped.
pub fn form_decode(payload: &str) -> BTreeMap<String, String> {
    payload
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            let k = urlencoding::decode(&k.replace('+', " ")).ok()?.into_owned();
            let v = urlencoding::decode(&v.replace('+', " ")).ok()?.into_owned();
            Some((k, v))
        })
        .collect()
}

/// Substitute `{name}` segments of an endpoint template.
///
/// Values are percent-encoded; unknown placeholders are left untouched.
pub fn expand_path(template: &str, params: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in params {
        out = out.replace(&format!("{{{name}}}"), &urlencoding::encode(value));
    }
    out
}
