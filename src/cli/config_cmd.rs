//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

use super::args::{is_valid_config_key, ConfigAction, SECRET_CONFIG_KEYS, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let path = store.init().await?;
    presenter.success(&format!("Config file created at: {}", path.display()));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    ensure_known_key(key)?;

    let mut config = store.load().await?;
    set_value(&mut config, key, value)?;
    store.save(&config).await?;

    tracing::info!(key, "config value updated");
    presenter.success(&format!("{} = {}", key, display_value(key, value)));
    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    ensure_known_key(key)?;

    let config = store.load().await?;
    match get_value(&config, key) {
        Some(v) => presenter.output(&display_value(key, &v)),
        None => presenter.output(NOT_SET),
    }
    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        let value = get_value(&config, key)
            .map(|v| display_value(key, &v))
            .unwrap_or_else(|| NOT_SET.to_string());
        presenter.key_value(key, &value);
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn ensure_known_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
        })
    }
}

/// Validate `value` for `key` and store it in `config`
fn set_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |message: &str| ConfigError::ValidationError {
        key: key.to_string(),
        message: message.to_string(),
    };

    if value.trim().is_empty() {
        return Err(invalid("Value must not be empty"));
    }

    match key {
        "api_url" | "sso_url" => {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(invalid("Value must start with http:// or https://"));
            }
            let url = Some(value.trim_end_matches('/').to_string());
            if key == "api_url" {
                config.api_url = url;
            } else {
                config.sso_url = url;
            }
        }
        "host" => config.host = Some(value.to_string()),
        "api_key" => config.api_key = Some(value.to_string()),
        "api_secret" => config.api_secret = Some(value.to_string()),
        "email" => {
            if !value.contains('@') {
                return Err(invalid("Value must be an email address"));
            }
            config.email = Some(value.to_string());
        }
        "output_dir" => config.output_dir = Some(value.to_string()),
        "page_size" => {
            let size = value
                .parse::<u32>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or_else(|| invalid("Value must be a positive integer"))?;
            config.page_size = Some(size);
        }
        "request_timeout_secs" | "download_timeout_secs" => {
            let secs = value
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| invalid("Value must be a positive number of seconds"))?;
            if key == "request_timeout_secs" {
                config.request_timeout_secs = Some(secs);
            } else {
                config.download_timeout_secs = Some(secs);
            }
        }
        "legacy_api" => {
            let enabled =
                parse_bool(value).ok_or_else(|| invalid("Value must be true or false"))?;
            config.legacy_api = Some(enabled);
        }
        _ => return Err(invalid("Unknown key")),
    }

    Ok(())
}

fn get_value(config: &AppConfig, key: &str) -> Option<String> {
    match key {
        "api_url" => config.api_url.clone(),
        "sso_url" => config.sso_url.clone(),
        "host" => config.host.clone(),
        "api_key" => config.api_key.clone(),
        "api_secret" => config.api_secret.clone(),
        "email" => config.email.clone(),
        "output_dir" => config.output_dir.clone(),
        "page_size" => config.page_size.map(|v| v.to_string()),
        "request_timeout_secs" => config.request_timeout_secs.map(|v| v.to_string()),
        "download_timeout_secs" => config.download_timeout_secs.map(|v| v.to_string()),
        "legacy_api" => config.legacy_api.map(|v| v.to_string()),
        _ => None,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn display_value(key: &str, value: &str) -> String {
    if SECRET_CONFIG_KEYS.contains(&key) {
        mask_secret(value)
    } else {
        value.to_string()
    }
}

/// Mask a secret for display (show first 4 and last 4 chars)
fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::XdgConfigStore;
    use tempfile::TempDir;

    #[test]
    fn mask_secret_long() {
        assert_eq!(mask_secret("abcdefghijklmnop"), "abcd...mnop");
    }

    #[test]
    fn mask_secret_short() {
        assert_eq!(mask_secret("short"), "*****");
    }

    #[test]
    fn display_value_masks_only_secrets() {
        assert_eq!(display_value("api_secret", "abcdefghijkl"), "abcd...ijkl");
        assert_eq!(display_value("host", "pbx.example.com"), "pbx.example.com");
    }

    #[test]
    fn page_size_must_be_positive() {
        let mut config = AppConfig::empty();
        assert!(set_value(&mut config, "page_size", "0").is_err());
        assert!(set_value(&mut config, "page_size", "abc").is_err());
        set_value(&mut config, "page_size", "250").unwrap();
        assert_eq!(config.page_size, Some(250));
    }

    #[test]
    fn timeouts_are_seconds() {
        let mut config = AppConfig::empty();
        assert!(set_value(&mut config, "download_timeout_secs", "-5").is_err());
        set_value(&mut config, "download_timeout_secs", "900").unwrap();
        set_value(&mut config, "request_timeout_secs", "30").unwrap();
        assert_eq!(config.download_timeout_secs, Some(900));
        assert_eq!(config.request_timeout_secs, Some(30));
    }

    #[test]
    fn legacy_api_takes_a_boolean() {
        let mut config = AppConfig::empty();
        assert!(set_value(&mut config, "legacy_api", "maybe").is_err());
        set_value(&mut config, "legacy_api", "yes").unwrap();
        assert_eq!(get_value(&config, "legacy_api").as_deref(), Some("true"));
        set_value(&mut config, "legacy_api", "false").unwrap();
        assert_eq!(config.legacy_api, Some(false));
    }

    #[test]
    fn urls_need_scheme_and_lose_trailing_slash() {
        let mut config = AppConfig::empty();
        assert!(set_value(&mut config, "api_url", "pbx.example.com").is_err());
        set_value(&mut config, "api_url", "https://pbx.example.com/api/").unwrap();
        assert_eq!(config.api_url.as_deref(), Some("https://pbx.example.com/api"));
    }

    #[test]
    fn email_is_checked() {
        let mut config = AppConfig::empty();
        assert!(set_value(&mut config, "email", "not-an-email").is_err());
        set_value(&mut config, "email", "me@example.com").unwrap();
        assert_eq!(
            get_value(&config, "email").as_deref(),
            Some("me@example.com")
        );
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(ensure_known_key("password").is_err());
        assert!(ensure_known_key("output_dir").is_ok());
    }

    #[tokio::test]
    async fn set_then_get_persists_value() {
        let dir = TempDir::new().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        let presenter = Presenter::new();

        handle_config_command(
            ConfigAction::Set {
                key: "output_dir".into(),
                value: "/srv/recordings".into(),
            },
            &store,
            &presenter,
        )
        .await
        .unwrap();

        let config = store.load().await.unwrap();
        assert_eq!(config.output_dir.as_deref(), Some("/srv/recordings"));
    }

    #[tokio::test]
    async fn invalid_set_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        let presenter = Presenter::new();

        let result = handle_config_command(
            ConfigAction::Set {
                key: "page_size".into(),
                value: "zero".into(),
            },
            &store,
            &presenter,
        )
        .await;

        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
        assert!(!store.exists());
    }
}
