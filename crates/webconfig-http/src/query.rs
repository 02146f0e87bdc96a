//! Query string and form body decoding.
//!
//! Two shapes of `key=value` data reach the server: arguments in the request
//! URL, which the parser collects into a map (repeated keys are joined with
//! `", "`), and `application/x-www-form-urlencoded` POST bodies, which
//! [`parse_form_body`] turns into an ordered list of pairs.

use std::collections::HashMap;

/// Separator used when a query key appears more than once.
pub const REPEATED_VALUE_SEPARATOR: &str = ", ";

/// Decodes a percent-encoded string, treating `+` as a space.
///
/// Invalid UTF-8 sequences are replaced rather than rejected.
///
/// # Examples
///
/// ```
/// use webconfig_http::percent_decode;
///
/// assert_eq!(percent_decode("show+stats%21"), "show stats!");
/// ```
pub fn percent_decode(input: &str) -> String {
    let plus_decoded = input.replace('+', " ");
    percent_encoding::percent_decode_str(&plus_decoded)
        .decode_utf8_lossy()
        .into_owned()
}

/// Decodes raw bytes collected by the parser.
pub(crate) fn percent_decode_bytes(input: &[u8]) -> String {
    percent_decode(&String::from_utf8_lossy(input))
}

/// Adds one argument to `args`, joining repeated keys in encounter order.
pub fn push_argument(args: &mut HashMap<String, String>, key: String, value: String) {
    args.entry(key)
        .and_modify(|existing| {
            existing.push_str(REPEATED_VALUE_SEPARATOR);
            existing.push_str(&value);
        })
        .or_insert(value);
}

/// Parses a form-encoded body into `(key, value)` pairs.
///
/// Pairs are separated by `&` or `;`. Keys and values are percent-decoded.
/// Entries without `=` and entries with an empty value are dropped, so an
/// untouched form field never overwrites a live value with an empty string.
///
/// # Examples
///
/// ```
/// use webconfig_http::parse_form_body;
///
/// let pairs = parse_form_body(b"input3=True&input5=7;input6=");
/// assert_eq!(pairs, vec![
///     ("input3".to_string(), "True".to_string()),
///     ("input5".to_string(), "7".to_string()),
/// ]);
/// ```
pub fn parse_form_body(body: &[u8]) -> Vec<(String, String)> {
    let text = String::from_utf8_lossy(body);
    text.split(['&', ';'])
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| pair.split_once('='))
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| (percent_decode(key), percent_decode(value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("a%20b"), "a b");
        assert_eq!(percent_decode("a+b"), "a b");
        assert_eq!(percent_decode("%2Fform1.cgi"), "/form1.cgi");
        assert_eq!(percent_decode("100%"), "100%");
    }

    #[test]
    fn test_push_argument_joins_repeats() {
        let mut args = HashMap::new();
        push_argument(&mut args, "color".into(), "red".into());
        push_argument(&mut args, "size".into(), "L".into());
        push_argument(&mut args, "color".into(), "blue".into());
        assert_eq!(args["color"], "red, blue");
        assert_eq!(args["size"], "L");
    }

    #[test]
    fn test_parse_form_body_separators() {
        let pairs = parse_form_body(b"a=1;b=2&c=3");
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[2], ("c".to_string(), "3".to_string()));
    }

    #[test]
    fn test_parse_form_body_drops_empty_and_bare() {
        let pairs = parse_form_body(b"&&a=&b&c=x=y");
        assert_eq!(pairs, vec![("c".to_string(), "x=y".to_string())]);
    }

    #[test]
    fn test_parse_form_body_decodes() {
        let pairs = parse_form_body(b"input1=Hello+World%21&na%6De=v");
        assert_eq!(pairs[0].1, "Hello World!");
        assert_eq!(pairs[1].0, "name");
    }

    #[test]
    fn test_parse_form_body_empty() {
        assert!(parse_form_body(b"").is_empty());
    }
}
