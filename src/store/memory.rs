//! In-memory repository for tests.
//!
//! `atomic` holds the state mutex for the whole unit and works on a copy that only
//! replaces the shared state when the closure succeeds, which gives the same
//! serialisation and rollback guarantees as the Postgres implementation.

use super::{Repository, Store, TransactionStore, UserStore, WalletStore};
use crate::{
	error::AppError,
	models::{
		NewTransaction, NewUser, Transaction, TransactionChanges, TransactionType, User,
		UserChanges, Wallet,
	},
};
use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::sync::Mutex;

/// Writes that should fail with a database error, to exercise rollback.
#[derive(Debug, Clone, Default)]
pub struct Faults {
	pub fail_transaction_insert: bool,
	pub fail_transaction_update: bool,
	pub fail_wallet_insert: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
	pub users: Vec<User>,
	pub wallets: Vec<Wallet>,
	pub transactions: Vec<Transaction>,
	pub faults: Faults,
}

#[derive(Default)]
pub struct MemoryRepository {
	state: Mutex<MemoryState>,
}

impl MemoryRepository {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn snapshot(&self) -> MemoryState {
		self.state.lock().expect("memory store poisoned").clone()
	}

	pub fn set_faults(&self, faults: Faults) {
		self.state.lock().expect("memory store poisoned").faults = faults;
	}

	pub fn wallet_of(&self, owner: i32) -> Option<Wallet> {
		self.snapshot().wallets.into_iter().find(|w| w.owner == owner)
	}

	pub fn transaction(&self, id: i32) -> Option<Transaction> {
		self.snapshot().transactions.into_iter().find(|t| t.id == id)
	}
}

impl Repository for MemoryRepository {
	fn atomic<T, F>(&self, f: F) -> Result<T, AppError>
	where
		F: FnOnce(&mut dyn Store) -> Result<T, AppError>,
	{
		let mut guard = self.state.lock().expect("memory store poisoned");
		let mut draft = guard.clone();
		let out = f(&mut draft)?;
		*guard = draft;
		Ok(out)
	}
}

fn fault(message: &str) -> AppError {
	AppError::Database(DieselError::DatabaseError(
		DatabaseErrorKind::Unknown,
		Box::new(message.to_string()),
	))
}

fn unique_violation(message: &str) -> AppError {
	AppError::Database(DieselError::DatabaseError(
		DatabaseErrorKind::UniqueViolation,
		Box::new(message.to_string()),
	))
}

fn newest_first(mut found: Vec<Transaction>) -> Vec<Transaction> {
	found.sort_by(|a, b| b.id.cmp(&a.id));
	found
}

fn involves(tx: &Transaction, user_id: i32) -> bool {
	tx.sender == Some(user_id) || tx.receiver == Some(user_id)
}

impl WalletStore for MemoryState {
	fn find_wallet_by_account_number(
		&mut self,
		account_number: &str,
	) -> Result<Option<Wallet>, AppError> {
		Ok(self.wallets.iter().find(|w| w.account_number == account_number).cloned())
	}

	fn find_wallet_by_owner(&mut self, owner: i32) -> Result<Option<Wallet>, AppError> {
		Ok(self.wallets.iter().find(|w| w.owner == owner).cloned())
	}

	fn lock_wallet_by_owner(&mut self, owner: i32) -> Result<Option<Wallet>, AppError> {
		self.find_wallet_by_owner(owner)
	}

	fn find_pair_for_transfer(&mut self, owners: [i32; 2]) -> Result<Vec<Wallet>, AppError> {
		Ok(self.wallets.iter().filter(|w| owners.contains(&w.owner)).cloned().collect())
	}

	fn update_balance(&mut self, owner: i32, balance: &BigDecimal) -> Result<(), AppError> {
		let wallet = self
			.wallets
			.iter_mut()
			.find(|w| w.owner == owner)
			.ok_or_else(|| AppError::not_found("Wallet not found."))?;
		wallet.balance = balance.clone();
		wallet.updated_at = Utc::now();
		Ok(())
	}

	fn insert_wallet(
		&mut self,
		owner: i32,
		account_number: &str,
	) -> Result<Option<Wallet>, AppError> {
		if self.faults.fail_wallet_insert {
			return Err(fault("wallet insert failed"));
		}
		if self.wallets.iter().any(|w| w.account_number == account_number) {
			return Ok(None);
		}
		if self.wallets.iter().any(|w| w.owner == owner) {
			return Err(unique_violation("wallets_owner_key"));
		}
		let now = Utc::now();
		let wallet = Wallet {
			id: self.wallets.iter().map(|w| w.id).max().unwrap_or(0) + 1,
			balance: BigDecimal::from(0),
			account_number: account_number.to_string(),
			owner,
			created_at: now,
			updated_at: now,
		};
		self.wallets.push(wallet.clone());
		Ok(Some(wallet))
	}
}

impl TransactionStore for MemoryState {
	fn create_transaction(&mut self, new_transaction: &NewTransaction) -> Result<i32, AppError> {
		if self.faults.fail_transaction_insert {
			return Err(fault("transaction insert failed"));
		}
		let now = Utc::now();
		let id = self.transactions.iter().map(|t| t.id).max().unwrap_or(0) + 1;
		self.transactions.push(Transaction {
			id,
			transaction_uuid: new_transaction.transaction_uuid,
			transaction_type: new_transaction.transaction_type,
			amount: new_transaction.amount.clone(),
			sender_balance: new_transaction.sender_balance.clone(),
			receiver_balance: new_transaction.receiver_balance.clone(),
			is_successful: new_transaction.is_successful,
			remark: new_transaction.remark.clone(),
			sender: new_transaction.sender,
			receiver: new_transaction.receiver,
			created_at: now,
			updated_at: now,
		});
		Ok(id)
	}

	fn find_transaction(&mut self, id: i32) -> Result<Option<Transaction>, AppError> {
		Ok(self.transactions.iter().find(|t| t.id == id).cloned())
	}

	fn lock_transaction(&mut self, id: i32) -> Result<Option<Transaction>, AppError> {
		self.find_transaction(id)
	}

	fn find_all_for_user(&mut self, user_id: i32) -> Result<Vec<Transaction>, AppError> {
		Ok(newest_first(self.transactions.iter().filter(|t| involves(t, user_id)).cloned().collect()))
	}

	fn find_for_user_by_type(
		&mut self,
		user_id: i32,
		transaction_type: TransactionType,
	) -> Result<Vec<Transaction>, AppError> {
		Ok(newest_first(
			self.transactions
				.iter()
				.filter(|t| t.transaction_type == transaction_type && involves(t, user_id))
				.cloned()
				.collect(),
		))
	}

	fn find_page(
		&mut self,
		user_id: i32,
		skip: i64,
		take: i64,
	) -> Result<Vec<Transaction>, AppError> {
		let all = self.find_all_for_user(user_id)?;
		Ok(all.into_iter().skip(skip.max(0) as usize).take(take.max(0) as usize).collect())
	}

	fn find_common(&mut self, user_a: i32, user_b: i32) -> Result<Vec<Transaction>, AppError> {
		Ok(newest_first(
			self.transactions
				.iter()
				.filter(|t| t.transaction_type == TransactionType::Transfer)
				.filter(|t| {
					(t.sender == Some(user_a) && t.receiver == Some(user_b)) ||
						(t.sender == Some(user_b) && t.receiver == Some(user_a))
				})
				.cloned()
				.collect(),
		))
	}

	fn update_transaction(
		&mut self,
		id: i32,
		changes: &TransactionChanges,
	) -> Result<(), AppError> {
		if self.faults.fail_transaction_update {
			return Err(fault("transaction update failed"));
		}
		let tx = self
			.transactions
			.iter_mut()
			.find(|t| t.id == id)
			.ok_or_else(|| AppError::not_found("Transaction not found."))?;
		if let Some(balance) = &changes.sender_balance {
			tx.sender_balance = Some(balance.clone());
		}
		if let Some(balance) = &changes.receiver_balance {
			tx.receiver_balance = Some(balance.clone());
		}
		if let Some(success) = changes.is_successful {
			tx.is_successful = success;
		}
		if let Some(remark) = &changes.remark {
			tx.remark = Some(remark.clone());
		}
		tx.updated_at = Utc::now();
		Ok(())
	}
}

impl UserStore for MemoryState {
	fn create_user(&mut self, new_user: &NewUser) -> Result<User, AppError> {
		if self.users.iter().any(|u| u.email == new_user.email) {
			return Err(unique_violation("users_email_key"));
		}
		if self.users.iter().any(|u| u.phone == new_user.phone) {
			return Err(unique_violation("users_phone_key"));
		}
		let user = User {
			id: self.users.iter().map(|u| u.id).max().unwrap_or(0) + 1,
			first_name: new_user.first_name.clone(),
			last_name: new_user.last_name.clone(),
			password: new_user.password.clone(),
			email: new_user.email.clone(),
			phone: new_user.phone.clone(),
			is_verified: false,
			otp: new_user.otp.clone(),
			otp_issued_at: new_user.otp_issued_at,
		};
		self.users.push(user.clone());
		Ok(user)
	}

	fn find_user(&mut self, id: i32) -> Result<Option<User>, AppError> {
		Ok(self.users.iter().find(|u| u.id == id).cloned())
	}

	fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, AppError> {
		Ok(self.users.iter().find(|u| u.email == email).cloned())
	}

	fn find_user_by_email_or_phone(
		&mut self,
		email: &str,
		phone: &str,
	) -> Result<Option<User>, AppError> {
		Ok(self.users.iter().find(|u| u.email == email || u.phone == phone).cloned())
	}

	fn find_users_by_email_or_id(&mut self, email: &str, id: i32) -> Result<Vec<User>, AppError> {
		Ok(self.users.iter().filter(|u| u.email == email || u.id == id).cloned().collect())
	}

	fn find_verified_user_by_account_number(
		&mut self,
		account_number: &str,
	) -> Result<Option<User>, AppError> {
		let owner = match self.wallets.iter().find(|w| w.account_number == account_number) {
			Some(wallet) => wallet.owner,
			None => return Ok(None),
		};
		Ok(self.users.iter().find(|u| u.id == owner && u.is_verified).cloned())
	}

	fn update_user(&mut self, id: i32, changes: &UserChanges) -> Result<(), AppError> {
		if let Some(email) = &changes.email {
			if self.users.iter().any(|u| u.id != id && &u.email == email) {
				return Err(unique_violation("users_email_key"));
			}
		}
		let user = self
			.users
			.iter_mut()
			.find(|u| u.id == id)
			.ok_or_else(|| AppError::not_found("User not found."))?;
		if let Some(email) = &changes.email {
			user.email = email.clone();
		}
		if let Some(verified) = changes.is_verified {
			user.is_verified = verified;
		}
		if let Some(otp) = &changes.otp {
			user.otp = otp.clone();
		}
		if let Some(issued_at) = changes.otp_issued_at {
			user.otp_issued_at = issued_at;
		}
		Ok(())
	}
}
