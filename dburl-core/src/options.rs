//! Query-string option assembly.

use crate::config::OptionMap;
use serde_json::Value;
use url::form_urlencoded;

/// Parse a query string into driver options.
///
/// Pairs follow `application/x-www-form-urlencoded` rules. Pairs with an
/// empty value are dropped, and when a key repeats the last value wins while
/// the key keeps the position of its first occurrence.
///
/// ```rust
/// use dburl_core::options::parse_query;
/// use serde_json::json;
///
/// let options = parse_query("timeout=20&sslmode=require&timeout=30&reconnect=true");
/// assert_eq!(options["timeout"], json!(30));
/// assert_eq!(options["sslmode"], json!("require"));
/// assert_eq!(options["reconnect"], json!(true));
/// ```
pub fn parse_query(query: &str) -> OptionMap {
    let mut options = OptionMap::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if value.is_empty() {
            continue;
        }
        options.insert(key.into_owned(), coerce(&value));
    }
    options
}

/// Coerce a scalar option value.
///
/// All-digit values become integers, `true`/`false` (any case) become
/// booleans, everything else stays a string. Integers wider than `u64` cannot
/// be represented as a JSON number here and stay strings.
pub fn coerce(value: &str) -> Value {
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(number) = value.parse::<i64>() {
            return Value::from(number);
        }
        if let Ok(number) = value.parse::<u64>() {
            return Value::from(number);
        }
    }
    if value.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if value.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    Value::String(value.to_string())
}

/// Render an option value the way a driver would receive it on a command line.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Keys of `left` that also appear in `right`, in `left` order.
pub fn overlapping_keys<'a>(left: &'a OptionMap, right: &OptionMap) -> Vec<&'a str> {
    left.keys()
        .filter(|key| right.contains_key(key.as_str()))
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_query_basic() {
        let options = parse_query("sslrootcert=rds-combined-ca-bundle.pem&sslmode=verify-full");
        let keys: Vec<_> = options.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["sslrootcert", "sslmode"]);
        assert_eq!(options["sslmode"], json!("verify-full"));
    }

    #[test]
    fn test_parse_query_last_value_wins_first_position_kept() {
        let options = parse_query("a=1&b=x&a=2");
        let keys: Vec<_> = options.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(options["a"], json!(2));
    }

    #[test]
    fn test_parse_query_drops_blank_values() {
        let options = parse_query("a=&b&c=3");
        assert_eq!(options.len(), 1);
        assert_eq!(options["c"], json!(3));
        assert!(parse_query("").is_empty());
    }

    #[test]
    fn test_parse_query_decodes() {
        let options = parse_query("driver=ODBC+Driver+13%20for+SQL+Server&path=%2Fcerts%2Fca.crt");
        assert_eq!(options["driver"], json!("ODBC Driver 13 for SQL Server"));
        assert_eq!(options["path"], json!("/certs/ca.crt"));
    }

    #[test]
    fn test_coerce() {
        assert_eq!(coerce("20"), json!(20));
        assert_eq!(coerce("007"), json!(7));
        assert_eq!(coerce("TRUE"), json!(true));
        assert_eq!(coerce("False"), json!(false));
        assert_eq!(coerce("my_service"), json!("my_service"));
        assert_eq!(coerce("-5"), json!("-5"));
        assert_eq!(coerce("1.5"), json!("1.5"));
        assert_eq!(coerce("9223372036854775808"), json!(9223372036854775808u64));
        assert_eq!(coerce("18446744073709551615"), json!(u64::MAX));
        assert_eq!(coerce("99999999999999999999"), json!("99999999999999999999"));
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("schema")), "schema");
        assert_eq!(display_value(&json!(42)), "42");
        assert_eq!(display_value(&json!(true)), "true");
    }

    #[test]
    fn test_overlapping_keys() {
        let left = parse_query("a=1&b=2&c=3");
        let right = parse_query("c=1&a=2&z=0");
        assert_eq!(overlapping_keys(&left, &right), vec!["a", "c"]);
    }
}
