//! Form-encoded body parsing module
//!
//! Parses `application/x-www-form-urlencoded` payloads (and query
//! strings, which share the syntax) into a flat key/value map. Later
//! occurrences of a key win, matching what browsers submit for
//! single-valued form controls.

use std::collections::HashMap;

/// Parsed form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: HashMap<String, String>,
}

impl FormData {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Parse a urlencoded payload. Pairs without `=` become empty-valued
/// fields; empty segments are skipped.
pub fn parse(input: &str) -> FormData {
    let mut fields = HashMap::new();
    for pair in input.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (raw_key, raw_value) = match pair.split_once('=') {
            Some((k, v)) => (k, v),
            None => (pair, ""),
        };
        let key = percent_decode(raw_key);
        if key.is_empty() {
            continue;
        }
        fields.insert(key, percent_decode(raw_value));
    }
    FormData { fields }
}

/// Parse the body bytes of a form submission. Non-UTF-8 bodies yield an
/// empty form; the handler treats the fields as missing.
pub fn parse_body(body: &[u8]) -> FormData {
    std::str::from_utf8(body).map_or_else(|_| FormData::default(), parse)
}

/// Decode percent escapes and `+` as space. Malformed escapes pass
/// through literally rather than failing the whole field.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                if let (Some(hi), Some(lo)) = (
                    bytes.get(i + 1).copied().and_then(hex_value),
                    bytes.get(i + 2).copied().and_then(hex_value),
                ) {
                    out.push(hi * 16 + lo);
                    i += 3;
                } else {
                    out.push(b'%');
                    i += 1;
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

const fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_pairs() {
        let form = parse("name=Ana&age=30&gender=Female&mobile=555-0100");
        assert_eq!(form.get("name"), Some("Ana"));
        assert_eq!(form.get("age"), Some("30"));
        assert_eq!(form.get("gender"), Some("Female"));
        assert_eq!(form.get("mobile"), Some("555-0100"));
        assert_eq!(form.get("missing"), None);
    }

    #[test]
    fn test_parse_percent_decoding() {
        let form = parse("name=Ana%20Mar%C3%ADa&mobile=%2B1-555");
        assert_eq!(form.get("name"), Some("Ana María"));
        assert_eq!(form.get("mobile"), Some("+1-555"));
    }

    #[test]
    fn test_parse_plus_as_space() {
        let form = parse("name=Ana+Maria");
        assert_eq!(form.get("name"), Some("Ana Maria"));
    }

    #[test]
    fn test_parse_last_value_wins() {
        let form = parse("name=First&name=Second");
        assert_eq!(form.get("name"), Some("Second"));
    }

    #[test]
    fn test_parse_valueless_and_empty_segments() {
        let form = parse("&flag&name=Ana&");
        assert_eq!(form.get("flag"), Some(""));
        assert_eq!(form.get("name"), Some("Ana"));
    }

    #[test]
    fn test_parse_malformed_escape_passes_through() {
        let form = parse("name=50%25&bad=%zz&tail=%2");
        assert_eq!(form.get("name"), Some("50%"));
        assert_eq!(form.get("bad"), Some("%zz"));
        assert_eq!(form.get("tail"), Some("%2"));
    }

    #[test]
    fn test_parse_body_rejects_invalid_utf8() {
        let form = parse_body(&[0x80, 0xff, 0xfe]);
        assert!(form.is_empty());
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse("").is_empty());
    }
}
