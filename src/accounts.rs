use crate::{
	auth::{
		otp::{generate_otp, is_valid_otp},
		password::{hash_password, verify_password},
	},
	constants::{
		ACCOUNT_NUMBER_BACKOFF_CAP_MS, ACCOUNT_NUMBER_BACKOFF_START_MS, ACCOUNT_NUMBER_MAX_ATTEMPTS,
		ACCOUNT_NUMBER_PREFIX, ACCOUNT_NUMBER_RANDOM_DIGITS,
	},
	error::AppError,
	midware::jwt::JWT,
	models::{AuthResp, NewUser, SignUpRequest, User, UserChanges, UserProfile, Wallet},
	services::{Blacklist, Notifier},
	store::{Repository, Store},
};
use chrono::Utc;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use rand::Rng;
use std::{sync::Arc, thread, time::Duration};

pub fn generate_account_number<G: Rng + ?Sized>(rng: &mut G) -> String {
	let mut number = String::with_capacity(ACCOUNT_NUMBER_PREFIX.len() + ACCOUNT_NUMBER_RANDOM_DIGITS);
	number.push_str(ACCOUNT_NUMBER_PREFIX);
	for _ in 0..ACCOUNT_NUMBER_RANDOM_DIGITS {
		number.push(char::from(b'0' + rng.gen_range(0..10u8)));
	}
	number
}

/// Attaches a zero-balance wallet with an unused account number to `owner`.
pub fn provision_wallet(store: &mut dyn Store, owner: i32) -> Result<Wallet, AppError> {
	provision_wallet_with(store, owner, || generate_account_number(&mut rand::thread_rng()))
}

/// Retries with a fresh candidate on every collision, backing off between attempts.
/// A candidate that slips past the lookup but loses the insert race is a collision too.
pub fn provision_wallet_with<F>(
	store: &mut dyn Store,
	owner: i32,
	mut next_candidate: F,
) -> Result<Wallet, AppError>
where
	F: FnMut() -> String,
{
	let mut backoff_ms = ACCOUNT_NUMBER_BACKOFF_START_MS;
	for attempt in 1..=ACCOUNT_NUMBER_MAX_ATTEMPTS {
		let candidate = next_candidate();
		if store.find_wallet_by_account_number(&candidate)?.is_none() {
			if let Some(wallet) = store.insert_wallet(owner, &candidate)? {
				log::info!("Provisioned wallet {} for user {}", wallet.account_number, owner);
				return Ok(wallet);
			}
		}
		log::warn!("Account number collision for user {} (attempt {})", owner, attempt);
		if attempt < ACCOUNT_NUMBER_MAX_ATTEMPTS {
			thread::sleep(Duration::from_millis(backoff_ms));
			backoff_ms = (backoff_ms * 2).min(ACCOUNT_NUMBER_BACKOFF_CAP_MS);
		}
	}
	Err(AppError::Internal(format!(
		"could not find a free account number for user {} after {} attempts",
		owner, ACCOUNT_NUMBER_MAX_ATTEMPTS
	)))
}

fn is_unique_violation(err: &AppError) -> bool {
	matches!(err, AppError::Database(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)))
}

/// Sign-up, email verification, sign-in and profile lookups.
pub struct Accounts<R> {
	repo: R,
	blacklist: Arc<dyn Blacklist>,
	notifier: Arc<dyn Notifier>,
	jwt: JWT,
}

impl<R: Repository> Accounts<R> {
	pub fn new(
		repo: R,
		blacklist: Arc<dyn Blacklist>,
		notifier: Arc<dyn Notifier>,
		jwt: JWT,
	) -> Self {
		Self { repo, blacklist, notifier, jwt }
	}

	/// Fails closed: an unreachable blacklist service rejects the identity.
	fn ensure_not_blacklisted(&self, identities: &[&str]) -> Result<(), AppError> {
		for identity in identities {
			match self.blacklist.is_blacklisted(identity) {
				Ok(false) => continue,
				Ok(true) => {
					log::warn!("Rejected blacklisted identity {}", identity);
					return Err(AppError::unauthorized("User is blacklisted"));
				},
				Err(e) => {
					log::error!("Blacklist lookup failed: {}", e);
					return Err(AppError::unauthorized(
						"Unable to access the blacklist service, please try again later.",
					));
				},
			}
		}
		Ok(())
	}

	fn send_otp(&self, to: &str, otp: &str, name: &str) {
		if let Err(e) = self.notifier.send_otp(to, otp, name) {
			log::error!("Failed to send OTP email to {}: {}", to, e);
		}
	}

	fn issue_token(&self, user: &User) -> Result<String, AppError> {
		self.jwt.create_jwt(user.id, &user.email).map_err(|e| {
			log::error!("JWT creation error: {:?}", e);
			AppError::Internal("Failed to create authentication token".to_string())
		})
	}

	pub fn sign_up(&self, req: SignUpRequest) -> Result<UserProfile, AppError> {
		let existing =
			self.repo.atomic(|store| store.find_user_by_email_or_phone(&req.email, &req.phone))?;
		if existing.is_some() {
			return Err(AppError::bad_request("User already exists!"));
		}

		self.ensure_not_blacklisted(&[req.email.as_str(), req.phone.as_str()])?;

		let otp = generate_otp();
		let new_user = NewUser {
			first_name: req.first_name.clone(),
			last_name: req.last_name.clone(),
			password: hash_password(&req.password)?,
			email: req.email.clone(),
			phone: req.phone.clone(),
			otp: otp.clone(),
			otp_issued_at: Utc::now(),
		};

		// A user never exists without a wallet: both rows commit together or not at all.
		let (user, wallet) = self
			.repo
			.atomic(|store| {
				let user = store.create_user(&new_user)?;
				let wallet = provision_wallet(store, user.id)?;
				Ok((user, wallet))
			})
			.map_err(|e| {
				if is_unique_violation(&e) {
					AppError::bad_request("User already exists!")
				} else {
					e
				}
			})?;

		log::info!("User {} signed up with wallet {}", user.id, wallet.account_number);
		self.send_otp(&user.email, &otp, &user.first_name);
		Ok(UserProfile::from(&user).with_wallet(&wallet))
	}

	pub fn verify_email(&self, email: &str, otp: &str) -> Result<AuthResp, AppError> {
		let user = self.repo.atomic(|store| {
			let mut user =
				store.find_user_by_email(email)?.ok_or_else(|| AppError::not_found("User not found!"))?;
			if !is_valid_otp(otp, &user.otp, user.otp_issued_at, Utc::now()) {
				return Err(AppError::unauthorized("Invalid otp"));
			}
			store.update_user(user.id, &UserChanges { is_verified: Some(true), ..Default::default() })?;
			user.is_verified = true;
			Ok(user)
		})?;

		log::info!("Email verified for user {}", user.id);
		let access_token = self.issue_token(&user)?;
		Ok(AuthResp { user: UserProfile::from(&user), access_token: Some(access_token) })
	}

	/// Unverified users get their profile back but no token.
	pub fn sign_in(&self, email: &str, password: &str) -> Result<AuthResp, AppError> {
		let user = self
			.repo
			.atomic(|store| store.find_user_by_email(email))?
			.ok_or_else(|| AppError::not_found("Invalid email or password."))?;

		if !verify_password(password, &user.password) {
			log::warn!("Failed sign in for user {}", user.id);
			return Err(AppError::unauthorized("Invalid email or password."));
		}

		let access_token = if user.is_verified { Some(self.issue_token(&user)?) } else { None };
		Ok(AuthResp { user: UserProfile::from(&user), access_token })
	}

	/// Moves the account to a new email, which must be verified again.
	pub fn update_email(&self, user_id: i32, email: &str) -> Result<UserProfile, AppError> {
		let otp = generate_otp();
		let user = self.repo.atomic(|store| {
			let possible_users = store.find_users_by_email_or_id(email, user_id)?;
			let mut user = possible_users
				.iter()
				.find(|u| u.id == user_id)
				.cloned()
				.ok_or_else(|| AppError::not_found("User not found!"))?;
			if possible_users.len() > 1 {
				return Err(AppError::unauthorized("The email is already in use"));
			}

			let issued_at = Utc::now();
			let changes = UserChanges {
				email: Some(email.to_string()),
				is_verified: Some(false),
				otp: Some(otp.clone()),
				otp_issued_at: Some(issued_at),
			};
			store.update_user(user_id, &changes)?;
			user.email = email.to_string();
			user.is_verified = false;
			user.otp = otp.clone();
			user.otp_issued_at = issued_at;
			Ok(user)
		})?;

		log::info!("Email updated for user {}", user.id);
		self.send_otp(&user.email, &otp, &user.first_name);
		Ok(UserProfile::from(&user))
	}

	pub fn verify_password(&self, user_id: i32, password: &str) -> Result<(), AppError> {
		let user = self
			.repo
			.atomic(|store| store.find_user(user_id))?
			.ok_or_else(|| AppError::not_found("Invalid user."))?;
		if !verify_password(password, &user.password) {
			return Err(AppError::unauthorized("Invalid password."));
		}
		Ok(())
	}

	pub fn profile(&self, user_id: i32) -> Result<UserProfile, AppError> {
		self.repo.atomic(|store| {
			let user = store
				.find_user(user_id)?
				.ok_or_else(|| AppError::not_found("This user does not exist in the database."))?;
			let profile = UserProfile::from(&user);
			Ok(match store.find_wallet_by_owner(user_id)? {
				Some(wallet) => profile.with_wallet(&wallet),
				None => profile,
			})
		})
	}

	pub fn user_by_wallet_number(&self, account_number: &str) -> Result<UserProfile, AppError> {
		self.repo
			.atomic(|store| store.find_verified_user_by_account_number(account_number))?
			.map(|user| UserProfile::from(&user))
			.ok_or_else(|| AppError::not_found("User not found"))
	}

	pub fn user_by_id(&self, user_id: i32) -> Result<UserProfile, AppError> {
		self.repo
			.atomic(|store| store.find_user(user_id))?
			.map(|user| UserProfile::from(&user))
			.ok_or_else(|| AppError::not_found("User not found"))
	}
}
