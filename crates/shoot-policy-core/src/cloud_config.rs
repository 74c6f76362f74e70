//! Cloud provider config rewriting

use regex::{Captures, Regex};

/// Replace the value of `key` in a `key<separator>value` style config.
///
/// Key and separator match literally; the new value is written as a
/// double-quoted string with quotes and backslashes escaped.
pub fn replace_cloud_provider_config_key(
    config: &str,
    separator: &str,
    key: &str,
    value: &str,
) -> String {
    let pattern = format!(
        r"({}{})([^\n]*)",
        regex::escape(key),
        regex::escape(separator)
    );
    let Ok(re) = Regex::new(&pattern) else {
        // Escaped literals always form a valid pattern
        return config.to_string();
    };

    let quoted = quote(value);
    re.replace_all(config, |caps: &Captures| format!("{}{}", &caps[1], quoted))
        .into_owned()
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
