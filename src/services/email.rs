use super::Notifier;
use crate::{config::SmtpConfig, constants::OTP_EXPIRY_MS, error::AppError};
use lettre::{
	message::{header::ContentType, Mailbox},
	transport::smtp::authentication::Credentials,
	Message, SmtpTransport, Transport,
};

pub struct SmtpNotifier {
	mailer: SmtpTransport,
	from: Mailbox,
}

impl SmtpNotifier {
	pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
		let creds = Credentials::new(config.username.clone(), config.password.clone());
		let mailer = SmtpTransport::relay(&config.relay)?.credentials(creds).build();
		let from = config.from.parse::<Mailbox>()?;
		Ok(Self { mailer, from })
	}
}

pub fn otp_email_body(name: &str, otp: &str) -> String {
	format!(
		"Hi {},

Welcome to Wallet Ledger! To verify your email, please use the following One-Time Password (OTP):

OTP: {}

This OTP is valid for the next {} minutes. Please do not share this code with anyone.

If you did not request this, please ignore this message or contact our support team immediately.

Thank you,
The Wallet Ledger Team",
		name,
		otp,
		OTP_EXPIRY_MS / 60_000,
	)
}

impl Notifier for SmtpNotifier {
	fn send_otp(&self, to: &str, otp: &str, name: &str) -> Result<(), AppError> {
		log::info!("Sending OTP to {}", to);
		let to = to
			.parse::<Mailbox>()
			.map_err(|e| AppError::bad_request(format!("Invalid recipient address: {}", e)))?;
		let email = Message::builder()
			.from(self.from.clone())
			.reply_to(self.from.clone())
			.to(to)
			.subject("ONE TIME PASSWORD")
			.header(ContentType::TEXT_PLAIN)
			.body(otp_email_body(name, otp))
			.map_err(|e| AppError::Internal(format!("Could not build OTP email: {}", e)))?;

		self.mailer.send(&email).map_err(|e| {
			log::error!("Could not send OTP: {:?}", e);
			AppError::Internal(format!("Could not send OTP: {}", e))
		})?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn body_mentions_name_code_and_window() {
		let body = otp_email_body("Ada", "042133");
		assert!(body.starts_with("Hi Ada,"));
		assert!(body.contains("OTP: 042133"));
		assert!(body.contains("next 30 minutes"));
	}
}
