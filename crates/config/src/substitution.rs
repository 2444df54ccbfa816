use anyhow::{Context, Result};
use regex::Regex;
use std::env;
use tracing::{debug, warn};

const ENV_VAR_PATTERN: &str = r"\$\{(\w+)\}|\$(\w+)";

/// Substitute environment variables in the format ${VAR_NAME} or $VAR_NAME.
///
/// Unset variables keep their placeholder so validation can report them.
pub fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(ENV_VAR_PATTERN).context("Invalid env var pattern")?;
    let mut missing_vars = Vec::new();

    let result = re.replace_all(content, |caps: &regex::Captures<'_>| {
        let placeholder = &caps[0];
        let var_name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map_or("", |m| m.as_str());

        match env::var(var_name) {
            Ok(value) => {
                debug!("Substituting environment variable: {} = \"{}\"", var_name, value);
                value
            }
            Err(_) => {
                warn!("Environment variable '{}' not set", var_name);
                missing_vars.push(var_name.to_string());
                placeholder.to_string()
            }
        }
    });

    if !missing_vars.is_empty() {
        debug!("Unresolved environment variables: {:?}", missing_vars);
    }

    Ok(result.into_owned())
}

/// Check if a string contains unresolved environment variable placeholders
pub fn has_unresolved_env_vars(content: &str) -> bool {
    Regex::new(ENV_VAR_PATTERN)
        .map(|re| re.is_match(content))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_braced_and_bare_vars() {
        env::set_var("OPTLENS_TEST_HISTORY_DIR", "/var/lib/optlens");
        env::set_var("OPTLENS_TEST_FORMAT", "json");

        let out = substitute_env_vars(
            "path: ${OPTLENS_TEST_HISTORY_DIR}/iv.json\nformat: $OPTLENS_TEST_FORMAT\n",
        )
        .unwrap();

        assert_eq!(out, "path: /var/lib/optlens/iv.json\nformat: json\n");
    }

    #[test]
    fn test_missing_var_keeps_placeholder() {
        let out = substitute_env_vars("path: ${OPTLENS_TEST_DEFINITELY_UNSET}/iv.json").unwrap();
        assert_eq!(out, "path: ${OPTLENS_TEST_DEFINITELY_UNSET}/iv.json");
        assert!(has_unresolved_env_vars(&out));
    }

    #[test]
    fn test_plain_text_has_no_placeholders() {
        assert!(!has_unresolved_env_vars("data/iv_history.json"));
    }
}
