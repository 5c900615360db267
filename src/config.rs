use crate::constants::{DEFAULT_PER_PAGE, ONE_WEEK};
use anyhow::{anyhow, bail, Context};
use std::{env, str::FromStr};

#[derive(Debug, Clone)]
pub struct SmtpConfig {
	pub relay: String,
	pub username: String,
	pub password: String,
	pub from: String,
}

#[derive(Debug, Clone)]
pub struct Config {
	pub database_url: String,
	pub socket_url: String,
	pub pool_size: u32,
	pub jwt_secret: String,
	pub jwt_expiration_secs: usize,
	pub per_page: i64,
	pub smtp: SmtpConfig,
	pub karma_base_url: String,
	pub karma_api_key: String,
	pub checkout_base_url: String,
}

impl Config {
	/// Reads the process environment, loading `.env` first when one is present.
	pub fn from_env() -> anyhow::Result<Self> {
		dotenvy::dotenv().ok();
		Ok(Self {
			database_url: required("DATABASE_URL")?,
			socket_url: optional("SOCKET_URL").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
			pool_size: parsed("DB_POOL_SIZE", 10)?,
			jwt_secret: required("JWT_SECRET")?,
			jwt_expiration_secs: parsed("JWT_EXPIRATION_SECS", ONE_WEEK)?,
			per_page: positive("PER_PAGE", parsed("PER_PAGE", DEFAULT_PER_PAGE)?)?,
			smtp: SmtpConfig {
				relay: optional("SMTP_RELAY").unwrap_or_else(|| "smtp.gmail.com".to_string()),
				username: optional("SMTP_USERNAME").unwrap_or_default(),
				password: optional("SMTP_PASSWORD").unwrap_or_default(),
				from: optional("SMTP_FROM")
					.unwrap_or_else(|| "Wallet Ledger <no-reply@wallet-ledger.local>".to_string()),
			},
			karma_base_url: optional("KARMA_BASE_URL").unwrap_or_else(|| {
				"https://adjutor.lendsqr.com/v2/verification/karma".to_string()
			}),
			karma_api_key: optional("KARMA_API_KEY").unwrap_or_default(),
			checkout_base_url: optional("CHECKOUT_BASE_URL")
				.unwrap_or_else(|| "https://checkout.sandbox.local".to_string()),
		})
	}
}

fn optional(key: &str) -> Option<String> {
	env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn required(key: &str) -> anyhow::Result<String> {
	optional(key).ok_or_else(|| anyhow!("{} can not be found in the environment or .env file", key))
}

fn parsed<T>(key: &str, default: T) -> anyhow::Result<T>
where
	T: FromStr,
	T::Err: std::error::Error + Send + Sync + 'static,
{
	match optional(key) {
		Some(raw) => raw.parse::<T>().with_context(|| format!("{} has an invalid value: {}", key, raw)),
		None => Ok(default),
	}
}

fn positive(key: &str, value: i64) -> anyhow::Result<i64> {
	if value <= 0 {
		bail!("{} must be greater than zero, got {}", key, value);
	}
	Ok(value)
}
