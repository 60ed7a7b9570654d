//! Main app runner

use std::env;
use std::process::ExitCode;

use thiserror::Error;

use crate::application::ports::{ConfigStore, DownloadError};
use crate::application::{ExportCallbacks, ExportInput, ExportRecordingsUseCase, ExportStage};
use crate::domain::call::{parse_queue_list, CallFilter};
use crate::domain::config::AppConfig;
use crate::domain::export::DownloadTarget;
use crate::infrastructure::{
    ApiRoutes, AuthError, Credential, HttpRecordingDownloader, PbxApiClient, SsoClient,
    XdgConfigStore,
};

use super::args::{Cli, CredentialOptions, ExportOptions};
use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Invalid or missing command-line input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CliError {
    #[error("Missing required option --{0}")]
    MissingOption(&'static str),

    #[error(
        "Missing credentials. Use --email and --password, or --api-key and --api-secret with --host"
    )]
    MissingCredentials,

    #[error("--host (or --api-url) is required with API key credentials")]
    MissingHost,
}

/// Config values given on the command line
pub fn cli_config(cli: &Cli) -> AppConfig {
    AppConfig {
        api_url: cli.api_url.clone(),
        sso_url: cli.sso_url.clone(),
        host: cli.host.clone(),
        api_key: cli.api_key.clone(),
        api_secret: cli.api_secret.clone(),
        email: cli.email.clone(),
        output_dir: cli
            .output_dir
            .as_ref()
            .map(|dir| dir.to_string_lossy().into_owned()),
        page_size: cli.page_size,
        request_timeout_secs: None,
        download_timeout_secs: None,
        legacy_api: cli.legacy_api.then_some(true),
    }
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, path = %store.path().display(), "ignoring unreadable config file");
            AppConfig::empty()
        }
    };

    let env_config = AppConfig {
        api_key: non_empty_env("PBX_API_KEY"),
        api_secret: non_empty_env("PBX_API_SECRET"),
        email: non_empty_env("PBX_EMAIL"),
        ..Default::default()
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.is_empty())
}

/// Base URL of the API for a PBX host. A bare host name gets `https://`.
fn host_api_url(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{}/api", host)
    } else {
        format!("https://{}/api", host)
    }
}

/// Validate the arguments and merged config into options for a run.
///
/// Email and password take precedence over an API key when both are set.
pub fn resolve_options(cli: &Cli, config: &AppConfig) -> Result<ExportOptions, CliError> {
    let date_from = cli
        .date_from
        .clone()
        .filter(|s| !s.trim().is_empty())
        .ok_or(CliError::MissingOption("date-from"))?;
    let date_to = cli
        .date_to
        .clone()
        .filter(|s| !s.trim().is_empty())
        .ok_or(CliError::MissingOption("date-to"))?;

    let sso = config
        .email
        .clone()
        .zip(cli.password.clone().filter(|s| !s.is_empty()));
    let api_key = config.api_key.clone().zip(config.api_secret.clone());

    let (credentials, api_url) = match (sso, api_key) {
        (Some((email, password)), _) => (
            CredentialOptions::Sso { email, password },
            config.api_url_or_default().to_string(),
        ),
        (None, Some((key, secret))) => {
            let api_url = match (cli.api_url.as_deref(), config.host.as_deref()) {
                (Some(url), _) => url.to_string(),
                (None, Some(host)) if !host.trim().is_empty() => host_api_url(host),
                _ => return Err(CliError::MissingHost),
            };
            (CredentialOptions::ApiKey { key, secret }, api_url)
        }
        (None, None) => return Err(CliError::MissingCredentials),
    };
    // SSO accounts always go through the reports API
    let legacy_api = matches!(credentials, CredentialOptions::ApiKey { .. })
        && config.legacy_api_or_default();

    Ok(ExportOptions {
        date_from,
        date_to,
        queues: cli
            .queues
            .as_deref()
            .map(parse_queue_list)
            .unwrap_or_default(),
        extension: cli.extension.map(Into::into),
        download: cli.download,
        credentials,
        api_url,
        sso_url: config.sso_url_or_default().to_string(),
        output_dir: config.output_dir_or_default(),
        page_size: config.page_size_or_default(),
        legacy_api,
        request_timeout: config.request_timeout_or_default(),
        download_timeout: config.download_timeout(),
    })
}

/// Turn the configured credentials into an API credential, logging in first
/// in SSO mode
async fn authorize(
    options: &ExportOptions,
    presenter: &Presenter,
) -> Result<(Credential, Option<String>), AuthError> {
    match options.credentials {
        CredentialOptions::ApiKey { ref key, ref secret } => {
            Ok((Credential::basic(key.as_str(), secret.as_str()), None))
        }
        CredentialOptions::Sso {
            ref email,
            ref password,
        } => {
            let spinner = presenter.spinner("Signing in...");
            let sso = SsoClient::new(options.sso_url.as_str()).with_timeout(options.request_timeout);
            match sso.authenticate(email, password).await {
                Ok(session) => {
                    presenter.spinner_success(&spinner, &format!("Signed in as {}", email));
                    Ok((Credential::bearer(session.access_token), Some(session.pbx_id)))
                }
                Err(e) => {
                    presenter.spinner_fail(&spinner, "Sign-in failed");
                    Err(e)
                }
            }
        }
    }
}

/// Run an export: fetch the call history, then summarize or download
pub async fn run_export(options: ExportOptions) -> ExitCode {
    let presenter = Presenter::new();
    tracing::debug!(?options, "starting export");

    let (credential, pbx_id) = match authorize(&options, &presenter).await {
        Ok(authorized) => authorized,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut api = PbxApiClient::new(options.api_url.as_str(), credential)
        .with_page_size(options.page_size)
        .with_timeouts(options.request_timeout, options.download_timeout);
    if options.legacy_api {
        api = api.with_routes(ApiRoutes::Legacy);
    }
    if let Some(pbx_id) = pbx_id {
        api = api.with_pbx_id(pbx_id);
    }

    let downloader = HttpRecordingDownloader::new(api.clone());
    let use_case = ExportRecordingsUseCase::new(api, downloader);

    let input = ExportInput {
        filter: CallFilter::new(options.date_from.as_str(), options.date_to.as_str())
            .with_queues(options.queues.clone())
            .with_extension(options.extension),
        output_dir: options.output_dir.clone(),
        download: options.download,
    };

    let fetch_spinner = presenter.spinner(&Presenter::format_page_progress(1, None));
    let download_bar = presenter.download_bar();

    let callbacks = {
        let stage_spinner = fetch_spinner.clone();
        let page_spinner = fetch_spinner.clone();
        let start_bar = download_bar.clone();
        let item_bar = download_bar.clone();

        ExportCallbacks {
            on_stage: Some(Box::new(move |stage: ExportStage| {
                if stage == ExportStage::Filtering {
                    Presenter::new().spinner_success(&stage_spinner, "Call history fetched");
                }
            })),
            on_page: Some(Box::new(move |page: u32, total: Option<u32>| {
                page_spinner.set_message(Presenter::format_page_progress(page, total));
            })),
            on_downloads_start: Some(Box::new(move |total: usize| {
                Presenter::start_download_bar(&start_bar, total);
            })),
            on_download_finished: Some(Box::new(
                move |target: &DownloadTarget, result: Result<u64, &DownloadError>| {
                    let line = Presenter::format_download_result(target, result);
                    item_bar.suspend(|| eprintln!("{}", line));
                    item_bar.inc(1);
                },
            )),
        }
    };

    match use_case.execute(input, callbacks).await {
        Ok(output) => {
            download_bar.finish_and_clear();
            presenter.export_result(&output);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.spinner_fail(&fetch_spinner, "Fetching call history failed");
            download_bar.finish_and_clear();
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}
