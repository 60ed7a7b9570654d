//! Configuration domain module

mod app_config;

pub use app_config::{
    AppConfig, DEFAULT_API_URL, DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SSO_URL,
};
