//! Outside collaborators the core calls. Each is injected as a trait object so tests can
//! substitute mocks.

pub mod email;
pub mod karma;
pub mod payment;

use crate::error::AppError;
use bigdecimal::BigDecimal;
use serde::Serialize;

/// An in-flight top-up or withdrawal awaiting settlement on the payment rail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Checkout {
	pub payment_id: String,
	pub checkout_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentVerification {
	pub success: bool,
	pub transaction_id: i32,
}

#[cfg_attr(test, mockall::automock)]
pub trait PaymentRail: Send + Sync {
	fn initiate_top_up(&self, amount: &BigDecimal, transaction_id: i32)
		-> Result<Checkout, AppError>;

	fn initiate_withdrawal(
		&self,
		amount: &BigDecimal,
		transaction_id: i32,
	) -> Result<Checkout, AppError>;

	fn verify(&self, payment_id: &str) -> Result<PaymentVerification, AppError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait Blacklist: Send + Sync {
	/// `Err` means the service could not answer.
	fn is_blacklisted(&self, identity: &str) -> Result<bool, AppError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
	fn send_otp(&self, to: &str, otp: &str, name: &str) -> Result<(), AppError>;
}
