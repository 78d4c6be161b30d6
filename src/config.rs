use std::env::var;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;
use lettre::message::Mailbox;
use thiserror::Error;

use crate::{
    application::handlers::dispatcher::{DEFAULT_MAX_CONCURRENCY, DEFAULT_SEND_TIMEOUT, DispatchConfig},
    infrastructure::{
        rate_limit::DEFAULT_REQUESTS_PER_MINUTE,
        smtp::{DEFAULT_SMTP_PORT, DEFAULT_SMTP_TIMEOUT, SmtpConfig, TlsMode},
    },
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("An error occured while getting {0} env param")]
    Missing(&'static str),
    #[error("An error occured while parsing {name} env param: {reason}")]
    Invalid { name: &'static str, reason: String },
}

pub struct Config {
    pub port: u16,
    pub scheme: String,
    pub host: String,
    pub smtp: SmtpConfig,
    pub sender: Mailbox,
    pub dispatch: DispatchConfig,
    pub rate_limit_per_minute: u32,
}

impl Config {
    pub fn try_parse() -> Result<Config, ConfigError> {
        let _ = dotenv();
        Self::from_lookup(|name| var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let smtp_user = required("SMTP_USER")?;
        let sender = match parsed::<Mailbox, _>(&lookup, "SMTP_FROM")? {
            Some(sender) => sender,
            None => smtp_user.trim().parse().map_err(|e: lettre::address::AddressError| {
                ConfigError::Invalid {
                    name: "SMTP_USER",
                    reason: format!("not usable as a sender address without SMTP_FROM: {e}"),
                }
            })?,
        };
        let smtp = SmtpConfig {
            host: required("SMTP_SERVER")?,
            port: parsed(&lookup, "SMTP_PORT")?.unwrap_or(DEFAULT_SMTP_PORT),
            password: required("SMTP_PASSWORD")?,
            tls: parsed::<TlsMode, _>(&lookup, "SMTP_TLS")?.unwrap_or_default(),
            timeout: DEFAULT_SMTP_TIMEOUT,
            username: smtp_user,
        };

        let dispatch = DispatchConfig {
            max_concurrency: parsed(&lookup, "MAX_CONCURRENCY")?.unwrap_or(DEFAULT_MAX_CONCURRENCY),
            send_timeout: parsed(&lookup, "SEND_TIMEOUT_SECONDS")?
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_SEND_TIMEOUT),
            batch_timeout: parsed(&lookup, "BATCH_TIMEOUT_SECONDS")?.map(Duration::from_secs),
        };

        Ok(Config {
            port: parsed(&lookup, "PORT")?.ok_or(ConfigError::Missing("PORT"))?,
            scheme: required("SCHEME")?,
            host: required("HOST")?,
            sender,
            smtp,
            dispatch,
            rate_limit_per_minute: parsed(&lookup, "RATE_LIMIT_PER_MINUTE")?
                .unwrap_or(DEFAULT_REQUESTS_PER_MINUTE),
        })
    }
}

fn parsed<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| {
            value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                name,
                reason: e.to_string(),
            })
        })
        .transpose()
}
