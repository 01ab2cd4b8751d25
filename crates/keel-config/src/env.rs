use std::sync::LazyLock;

use regex::{Captures, Regex};

/// `{{ env.VAR }}` or `{{ env.VAR | default("fallback") }}`
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{\{\s*([A-Za-z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#).expect("must be valid regex")
});

/// Substitute environment placeholders in raw TOML text
///
/// Runs before deserialization so config structs only see plain strings.
/// Comment lines are copied verbatim, so a commented-out placeholder never
/// requires its variable to be set.
pub fn expand_env(input: &str) -> Result<String, String> {
    let mut output = String::with_capacity(input.len());

    for line in input.split_inclusive('\n') {
        if line.trim_start().starts_with('#') {
            output.push_str(line);
            continue;
        }

        let mut cursor = 0;
        for captures in PLACEHOLDER.captures_iter(line) {
            let Some(whole) = captures.get(0) else { continue };
            output.push_str(&line[cursor..whole.start()]);
            output.push_str(&resolve(&captures)?);
            cursor = whole.end();
        }
        output.push_str(&line[cursor..]);
    }

    Ok(output)
}

fn resolve(captures: &Captures<'_>) -> Result<String, String> {
    let key = &captures[1];

    let var_name = key
        .strip_prefix("env.")
        .filter(|name| !name.is_empty() && !name.contains('.'))
        .ok_or_else(|| format!("only variables scoped with 'env.' are supported: `{key}`"))?;

    match (std::env::var(var_name), captures.get(2)) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default.as_str().to_owned()),
        (Err(_), None) => Err(format!("environment variable not found: `{var_name}`")),
    }
}
