//! Provider credential and endpoint resolution
//!
//! An explicit value from settings always wins; otherwise the provider's
//! environment variables are tried in order. `.env` files are loaded
//! beforehand by [`crate::config::load_env`].

use std::collections::HashMap;
use std::env;

use once_cell::sync::Lazy;

use super::error::{ProviderError, ProviderResult};

/// Environment variables consulted for a provider
#[derive(Debug, Clone, Copy)]
struct ProviderEnv {
    api_key: &'static [&'static str],
    endpoint: &'static [&'static str],
    /// A missing key is a construction error
    requires_api_key: bool,
    requires_endpoint: bool,
}

const fn keyed(api_key: &'static [&'static str], endpoint: &'static [&'static str]) -> ProviderEnv {
    ProviderEnv {
        api_key,
        endpoint,
        requires_api_key: true,
        requires_endpoint: false,
    }
}

static PROVIDER_ENV: Lazy<HashMap<&'static str, ProviderEnv>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("openai", keyed(&["OPENAI_API_KEY"], &["OPENAI_ENDPOINT"]));
    m.insert("anthropic", keyed(&["ANTHROPIC_API_KEY"], &[]));
    m.insert("gemini", keyed(&["GOOGLE_API_KEY", "GEMINI_API_KEY"], &[]));
    m.insert("google", keyed(&["GOOGLE_API_KEY", "GEMINI_API_KEY"], &[]));
    m.insert("deepseek", keyed(&["DEEPSEEK_API_KEY"], &["DEEPSEEK_ENDPOINT"]));
    m.insert("mistral", keyed(&["MISTRAL_API_KEY"], &["MISTRAL_ENDPOINT"]));
    m.insert(
        "azure",
        ProviderEnv {
            api_key: &["AZURE_OPENAI_API_KEY", "AZURE_API_KEY"],
            endpoint: &["AZURE_OPENAI_ENDPOINT"],
            requires_api_key: true,
            requires_endpoint: true,
        },
    );
    m.insert("groq", keyed(&["GROQ_API_KEY"], &[]));
    m.insert("xai", keyed(&["XAI_API_KEY"], &[]));
    m.insert("cohere", keyed(&["COHERE_API_KEY"], &[]));
    m.insert("openrouter", keyed(&["OPENROUTER_API_KEY"], &[]));
    m.insert(
        "ollama",
        ProviderEnv {
            api_key: &[],
            endpoint: &["OLLAMA_HOST"],
            requires_api_key: false,
            requires_endpoint: false,
        },
    );
    m
});

/// Resolved credentials for one provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
}

/// Environment variable names holding the API key for `provider`
pub fn api_key_env_vars(provider: &str) -> &'static [&'static str] {
    PROVIDER_ENV
        .get(provider.to_lowercase().as_str())
        .map(|e| e.api_key)
        .unwrap_or(&[])
}

/// Environment variable names holding a custom endpoint for `provider`
pub fn endpoint_env_vars(provider: &str) -> &'static [&'static str] {
    PROVIDER_ENV
        .get(provider.to_lowercase().as_str())
        .map(|e| e.endpoint)
        .unwrap_or(&[])
}

pub fn requires_api_key(provider: &str) -> bool {
    PROVIDER_ENV
        .get(provider.to_lowercase().as_str())
        .is_some_and(|e| e.requires_api_key)
}

fn first_set(vars: &[&str], lookup: &dyn Fn(&str) -> Option<String>) -> Option<String> {
    vars.iter()
        .filter_map(|var| lookup(var))
        .find(|value| !value.trim().is_empty())
}

/// Resolve credentials with a custom variable lookup
pub fn resolve_with(
    provider: &str,
    api_key: Option<&str>,
    endpoint: Option<&str>,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> ProviderResult<Credentials> {
    let id = provider.to_lowercase();
    let provider_env = PROVIDER_ENV.get(id.as_str()).copied();

    let api_key = api_key
        .filter(|k| !k.trim().is_empty())
        .map(str::to_string)
        .or_else(|| first_set(api_key_env_vars(&id), lookup));
    let endpoint = endpoint
        .filter(|e| !e.trim().is_empty())
        .map(str::to_string)
        .or_else(|| first_set(endpoint_env_vars(&id), lookup));

    if let Some(provider_env) = provider_env {
        if provider_env.requires_api_key && api_key.is_none() {
            return Err(ProviderError::MissingApiKey {
                provider: id,
                env_vars: provider_env.api_key.join(" or "),
            });
        }
        if provider_env.requires_endpoint && endpoint.is_none() {
            return Err(ProviderError::MissingEndpoint {
                provider: id,
                env_vars: provider_env.endpoint.join(" or "),
            });
        }
    }

    Ok(Credentials { api_key, endpoint })
}

/// Resolve credentials from explicit settings, then the process environment
pub fn resolve(provider: &str, api_key: Option<&str>, endpoint: Option<&str>) -> ProviderResult<Credentials> {
    resolve_with(provider, api_key, endpoint, &|var| env::var(var).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |var| {
            pairs
                .iter()
                .find(|(k, _)| *k == var)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_explicit_key_wins() {
        let lookup = lookup_from(&[("OPENAI_API_KEY", "sk-env")]);
        let creds = resolve_with("openai", Some("sk-explicit"), None, &lookup).unwrap();
        assert_eq!(creds.api_key.as_deref(), Some("sk-explicit"));
    }

    #[test]
    fn test_env_fallbacks() {
        let lookup = lookup_from(&[
            ("GEMINI_API_KEY", "g-key"),
            ("OPENAI_ENDPOINT", "http://proxy/v1/"),
            ("OPENAI_API_KEY", "sk-env"),
        ]);

        let gemini = resolve_with("Google", None, None, &lookup).unwrap();
        assert_eq!(gemini.api_key.as_deref(), Some("g-key"));

        let openai = resolve_with("openai", None, None, &lookup).unwrap();
        assert_eq!(openai.endpoint.as_deref(), Some("http://proxy/v1/"));
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let lookup = lookup_from(&[("ANTHROPIC_API_KEY", "  ")]);
        let err = resolve_with("anthropic", None, None, &lookup).unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey { .. }));
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_azure_requires_endpoint() {
        let lookup = lookup_from(&[("AZURE_OPENAI_API_KEY", "az")]);
        let err = resolve_with("azure", None, None, &lookup).unwrap_err();
        assert!(matches!(err, ProviderError::MissingEndpoint { .. }));

        let ok = resolve_with("azure", None, Some("https://res.openai.azure.com/"), &lookup).unwrap();
        assert_eq!(ok.api_key.as_deref(), Some("az"));
    }

    #[test]
    fn test_keyless_providers() {
        let lookup = lookup_from(&[]);
        assert_eq!(resolve_with("ollama", None, None, &lookup).unwrap(), Credentials::default());
        assert!(!requires_api_key("ollama"));
        assert!(requires_api_key("deepseek"));
        assert!(api_key_env_vars("unknown").is_empty());
    }
}
