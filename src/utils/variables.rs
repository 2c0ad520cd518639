use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref ENV_VAR_RE: Regex = Regex::new(r"\$\{([^}]+)\}|\$([A-Za-z0-9_]+)").unwrap();
}

pub struct VariablesUtils {}

impl VariablesUtils {
    /// Expands ${VAR} or $VAR patterns using the current environment.
    /// Unset variables expand to an empty string.
    pub fn expand_env_vars(input: &str) -> String {
        Self::expand_with(input, |key| std::env::var(key).ok())
    }

    pub fn expand_with<F>(input: &str, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        ENV_VAR_RE
            .replace_all(input, |caps: &Captures| {
                let key = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                lookup(key).unwrap_or_default()
            })
            .to_string()
    }

    /// Reads an environment variable, treating blank values as unset.
    pub fn non_blank_env(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(key: &str) -> Option<String> {
        match key {
            "HOST" => Some("files.example.org".to_owned()),
            "FILE_ID" => Some("abc123".to_owned()),
            _ => None,
        }
    }

    #[test]
    fn expands_both_forms() {
        let out = VariablesUtils::expand_with("https://${HOST}/dl?id=$FILE_ID", lookup);
        assert_eq!(out, "https://files.example.org/dl?id=abc123");
    }

    #[test]
    fn unset_variables_become_empty() {
        let out = VariablesUtils::expand_with("url: ${NOPE}", lookup);
        assert_eq!(out, "url: ");
    }
}
