use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Substitute `{{ env.NAME }}` placeholders in raw config text
///
/// `{{ env.NAME | default("value") }}` falls back to `value` when `NAME` is
/// unset. Comment lines are left alone so commented-out secrets never need
/// to be present in the environment.
pub fn expand_env(input: &str) -> Result<String, String> {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

    let placeholder = PLACEHOLDER.get_or_init(|| {
        Regex::new(r#"\{\{\s*([A-Za-z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#)
            .expect("placeholder pattern must compile")
    });

    let mut expanded: Vec<String> = Vec::new();

    for line in input.split('\n') {
        if line.trim_start().starts_with('#') {
            expanded.push(line.to_string());
            continue;
        }

        let mut failure = None;

        let replaced = placeholder.replace_all(line, |caps: &Captures<'_>| {
            match resolve(&caps[1], caps.get(2).map(|m| m.as_str())) {
                Ok(value) => value,
                Err(err) => {
                    failure.get_or_insert(err);
                    String::new()
                }
            }
        });

        if let Some(err) = failure {
            return Err(err);
        }

        expanded.push(replaced.into_owned());
    }

    Ok(expanded.join("\n"))
}

fn resolve(key: &str, fallback: Option<&str>) -> Result<String, String> {
    let Some(name) = key.strip_prefix("env.").filter(|name| !name.contains('.')) else {
        return Err(format!("only variables scoped with 'env.' are supported: `{key}`"));
    };

    match (std::env::var(name), fallback) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(fallback)) => Ok(fallback.to_string()),
        (Err(_), None) => Err(format!("environment variable not found: `{name}`")),
    }
}
