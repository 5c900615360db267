use crate::constants::{OTP_EXPIRY_MS, OTP_LENGTH};
use chrono::{DateTime, Utc};
use rand::Rng;

pub fn generate_otp() -> String {
	let otp: u32 = rand::thread_rng().gen_range(0..1_000_000);
	format!("{:0width$}", otp, width = OTP_LENGTH)
}

/// An OTP is accepted when it matches exactly and was issued less than 30 minutes before `now`.
pub fn is_valid_otp(input: &str, generated: &str, issued_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
	let elapsed_ms = (now - issued_at).num_milliseconds();
	input == generated && (0..OTP_EXPIRY_MS).contains(&elapsed_ms)
}
