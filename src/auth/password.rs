use crate::{constants::PASSWORD_COST, error::AppError};

pub fn hash_password(password: &str) -> Result<String, AppError> {
	bcrypt::hash(password.as_bytes(), PASSWORD_COST).map_err(|e| {
		log::error!("Password hashing failed: {}", e);
		AppError::Internal("Failed to hash password".to_string())
	})
}

/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
	bcrypt::verify(password.as_bytes(), hash).unwrap_or(false)
}
