use anyhow::{anyhow, bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::env::VarMap;

static VARIABLE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").expect("valid regex"));

/// Replaces `{NAME}` with the value from `vars`, falling back to the process
/// environment. `\{` and `\}` produce literal braces. A `{` that is not
/// followed by a name character is copied through unchanged.
pub fn expand_placeholders(input: &str, vars: &VarMap) -> Result<String> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find(|c: char| c == '\\' || c == '{') {
        output.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(escaped) = tail.strip_prefix('\\') {
            match escaped.chars().next() {
                Some(brace @ ('{' | '}')) => {
                    output.push(brace);
                    rest = &escaped[1..];
                }
                _ => {
                    output.push('\\');
                    rest = escaped;
                }
            }
            continue;
        }

        let opened = &tail[1..];
        let starts_name = opened
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if !starts_name {
            output.push('{');
            rest = opened;
            continue;
        }

        let Some(close) = opened.find('}') else {
            bail!("Unterminated placeholder in {input:?}");
        };
        let name = &opened[..close];
        if !VARIABLE_NAME.is_match(name) {
            bail!("Invalid placeholder name: {name}");
        }

        let value = vars
            .get(name)
            .cloned()
            .or_else(|| std::env::var(name).ok())
            .ok_or_else(|| anyhow!("Missing value for placeholder {{{name}}}"))?;
        output.push_str(&value);
        rest = &opened[close + 1..];
    }

    output.push_str(rest);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> VarMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_known_variables() -> Result<()> {
        let vars = vars(&[("API_HOST", "api.example.com"), ("VERSION", "v2")]);
        let rendered = expand_placeholders("https://{API_HOST}/{VERSION}/", &vars)?;
        assert_eq!(rendered, "https://api.example.com/v2/");
        Ok(())
    }

    #[test]
    fn escaped_braces_are_literal() -> Result<()> {
        let rendered = expand_placeholders(r"\{API_HOST\} and \n", &VarMap::new())?;
        assert_eq!(rendered, r"{API_HOST} and \n");
        Ok(())
    }

    #[test]
    fn braces_without_a_name_pass_through() -> Result<()> {
        let rendered = expand_placeholders(r#"{"json": {1}}"#, &VarMap::new())?;
        assert_eq!(rendered, r#"{"json": {1}}"#);
        Ok(())
    }

    #[test]
    fn falls_back_to_process_environment() -> Result<()> {
        std::env::set_var("SCREENPLAY_REST_FALLBACK_HOST", "env.example.com");
        let rendered =
            expand_placeholders("https://{SCREENPLAY_REST_FALLBACK_HOST}", &VarMap::new());
        std::env::remove_var("SCREENPLAY_REST_FALLBACK_HOST");
        assert_eq!(rendered?, "https://env.example.com");
        Ok(())
    }

    #[test]
    fn explicit_variables_win_over_process_environment() -> Result<()> {
        std::env::set_var("SCREENPLAY_REST_SHADOWED", "from-env");
        let vars = vars(&[("SCREENPLAY_REST_SHADOWED", "from-file")]);
        let rendered = expand_placeholders("{SCREENPLAY_REST_SHADOWED}", &vars);
        std::env::remove_var("SCREENPLAY_REST_SHADOWED");
        assert_eq!(rendered?, "from-file");
        Ok(())
    }

    #[test]
    fn rejects_invalid_names() {
        let err = expand_placeholders("{BAD NAME}", &VarMap::new()).unwrap_err();
        assert!(err.to_string().contains("Invalid placeholder name"));
    }

    #[test]
    fn reports_missing_values() {
        let err = expand_placeholders("{SCREENPLAY_REST_UNSET_VAR}", &VarMap::new()).unwrap_err();
        assert!(err.to_string().contains("Missing value for placeholder"));
    }

    #[test]
    fn reports_unterminated_placeholders() {
        let err = expand_placeholders("https://{API_HOST", &VarMap::new()).unwrap_err();
        assert!(err.to_string().contains("Unterminated placeholder"));
    }
}
