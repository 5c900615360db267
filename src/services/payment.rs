use super::{Checkout, PaymentRail, PaymentVerification};
use crate::error::AppError;
use bigdecimal::BigDecimal;

/// Sandbox rail: the payment id is the local transaction id and every well-formed id settles.
pub struct SandboxPaymentRail {
	checkout_base_url: String,
}

impl SandboxPaymentRail {
	pub fn new(checkout_base_url: &str) -> Self {
		Self { checkout_base_url: checkout_base_url.trim_end_matches('/').to_string() }
	}

	fn checkout(&self, kind: &str, amount: &BigDecimal, transaction_id: i32) -> Checkout {
		log::info!("Initiating {} of {} for transaction {}", kind, amount, transaction_id);
		Checkout {
			payment_id: transaction_id.to_string(),
			checkout_url: format!("{}/{}/{}", self.checkout_base_url, kind, transaction_id),
		}
	}
}

impl PaymentRail for SandboxPaymentRail {
	fn initiate_top_up(
		&self,
		amount: &BigDecimal,
		transaction_id: i32,
	) -> Result<Checkout, AppError> {
		Ok(self.checkout("top-up", amount, transaction_id))
	}

	fn initiate_withdrawal(
		&self,
		amount: &BigDecimal,
		transaction_id: i32,
	) -> Result<Checkout, AppError> {
		Ok(self.checkout("withdrawal", amount, transaction_id))
	}

	fn verify(&self, payment_id: &str) -> Result<PaymentVerification, AppError> {
		Ok(match payment_id.trim().parse::<i32>() {
			Ok(transaction_id) if transaction_id > 0 =>
				PaymentVerification { success: true, transaction_id },
			_ => PaymentVerification { success: false, transaction_id: 0 },
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn checkout_uses_transaction_id_as_payment_id() {
		let rail = SandboxPaymentRail::new("https://pay.example/");
		let checkout = rail.initiate_top_up(&BigDecimal::from(10), 7).unwrap();
		assert_eq!(checkout.payment_id, "7");
		assert_eq!(checkout.checkout_url, "https://pay.example/top-up/7");
		let checkout = rail.initiate_withdrawal(&BigDecimal::from(10), 8).unwrap();
		assert_eq!(checkout.checkout_url, "https://pay.example/withdrawal/8");
	}

	#[test]
	fn malformed_payment_ids_fail_verification() {
		let rail = SandboxPaymentRail::new("https://pay.example");
		assert_eq!(
			rail.verify("12").unwrap(),
			PaymentVerification { success: true, transaction_id: 12 }
		);
		assert!(!rail.verify("abc").unwrap().success);
		assert!(!rail.verify("-3").unwrap().success);
	}
}
