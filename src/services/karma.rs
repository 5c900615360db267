use super::Blacklist;
use crate::error::AppError;
use reqwest::{blocking::Client, header::CONTENT_TYPE, StatusCode};
use std::time::Duration;

/// Karma lookup: 200 means the identity is listed, 404 means it is not.
pub struct KarmaClient {
	client: Client,
	base_url: String,
	api_key: String,
}

impl KarmaClient {
	pub fn new(base_url: &str, api_key: &str) -> Result<Self, reqwest::Error> {
		let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
		Ok(Self {
			client,
			base_url: base_url.trim_end_matches('/').to_string(),
			api_key: api_key.to_string(),
		})
	}
}

impl Blacklist for KarmaClient {
	fn is_blacklisted(&self, identity: &str) -> Result<bool, AppError> {
		let url = format!("{}/{}", self.base_url, identity);
		let response = self
			.client
			.get(&url)
			.bearer_auth(&self.api_key)
			.header(CONTENT_TYPE, "application/json")
			.send()
			.map_err(|e| AppError::Internal(format!("blacklist service unreachable: {}", e)))?;

		match response.status() {
			status if status.is_success() => Ok(true),
			StatusCode::NOT_FOUND => Ok(false),
			status => Err(AppError::Internal(format!("blacklist service answered {}", status))),
		}
	}
}
