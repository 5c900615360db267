use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse error classes the HTTP boundary maps to status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
	NotFound,
	BadRequest,
	Auth,
	Database,
	Internal,
}

#[derive(Debug, Error)]
pub enum AppError {
	#[error("{0}")]
	NotFound(String),
	#[error("Insufficient Balance")]
	InsufficientFunds,
	#[error("This transaction is already verified")]
	AlreadyVerified,
	#[error("Invalid payment id")]
	InvalidPayment,
	#[error("Invalid transaction amount")]
	InvalidAmount,
	#[error("{0}")]
	BadRequest(String),
	#[error("{0}")]
	Unauthorized(String),
	#[error("database error: {0}")]
	Database(#[from] diesel::result::Error),
	#[error("database pool error: {0}")]
	Pool(#[from] diesel::r2d2::PoolError),
	#[error("{0}")]
	Internal(String),
}

impl AppError {
	pub fn not_found(message: impl Into<String>) -> Self {
		Self::NotFound(message.into())
	}

	pub fn bad_request(message: impl Into<String>) -> Self {
		Self::BadRequest(message.into())
	}

	pub fn unauthorized(message: impl Into<String>) -> Self {
		Self::Unauthorized(message.into())
	}

	pub fn kind(&self) -> ErrorKind {
		match self {
			AppError::NotFound(_) => ErrorKind::NotFound,
			AppError::InsufficientFunds |
			AppError::AlreadyVerified |
			AppError::InvalidPayment |
			AppError::InvalidAmount |
			AppError::BadRequest(_) => ErrorKind::BadRequest,
			AppError::Unauthorized(_) => ErrorKind::Auth,
			AppError::Database(_) | AppError::Pool(_) => ErrorKind::Database,
			AppError::Internal(_) => ErrorKind::Internal,
		}
	}

	/// Finer grained code, stable across releases.
	pub fn code(&self) -> &'static str {
		match self {
			AppError::NotFound(_) => "not_found",
			AppError::InsufficientFunds => "insufficient_funds",
			AppError::AlreadyVerified => "already_verified",
			AppError::InvalidPayment => "invalid_payment",
			AppError::InvalidAmount => "invalid_amount",
			AppError::BadRequest(_) => "bad_request",
			AppError::Unauthorized(_) => "unauthorized",
			AppError::Database(_) | AppError::Pool(_) => "database_fault",
			AppError::Internal(_) => "internal",
		}
	}

	fn public_message(&self) -> String {
		match self.kind() {
			ErrorKind::Database => "Database error".to_string(),
			ErrorKind::Internal => "Internal server error".to_string(),
			_ => self.to_string(),
		}
	}
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub status: String,
	pub kind: ErrorKind,
	pub code: String,
	pub error: String,
}

impl ResponseError for AppError {
	fn status_code(&self) -> StatusCode {
		match self.kind() {
			ErrorKind::NotFound => StatusCode::NOT_FOUND,
			ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
			ErrorKind::Auth => StatusCode::UNAUTHORIZED,
			ErrorKind::Database | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn error_response(&self) -> HttpResponse {
		if matches!(self.kind(), ErrorKind::Database | ErrorKind::Internal) {
			log::error!("Request failed: {}", self);
		}
		HttpResponse::build(self.status_code()).json(ErrorResponse {
			status: "error".to_string(),
			kind: self.kind(),
			code: self.code().to_string(),
			error: self.public_message(),
		})
	}
}
