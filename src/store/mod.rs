//! Persistence seam for users, wallets and transactions.
//!
//! Every read and write happens inside [`Repository::atomic`]: the closure receives a
//! [`Store`] bound to one database transaction, and an `Err` from the closure rolls back
//! everything it wrote. Stores do no business validation.

#[cfg(test)]
pub mod memory;
pub mod pg;

use crate::{
	error::AppError,
	models::{
		NewTransaction, NewUser, Transaction, TransactionChanges, TransactionType, User,
		UserChanges, Wallet,
	},
};
use bigdecimal::BigDecimal;
use std::sync::Arc;

pub trait WalletStore {
	fn find_wallet_by_account_number(
		&mut self,
		account_number: &str,
	) -> Result<Option<Wallet>, AppError>;

	fn find_wallet_by_owner(&mut self, owner: i32) -> Result<Option<Wallet>, AppError>;

	/// Same as `find_wallet_by_owner` but holds a row lock until the unit ends.
	fn lock_wallet_by_owner(&mut self, owner: i32) -> Result<Option<Wallet>, AppError>;

	/// Locks and returns the wallets owned by either id. Zero to two rows, any order.
	fn find_pair_for_transfer(&mut self, owners: [i32; 2]) -> Result<Vec<Wallet>, AppError>;

	fn update_balance(&mut self, owner: i32, balance: &BigDecimal) -> Result<(), AppError>;

	/// Inserts a zero-balance wallet. `None` when the account number is already taken.
	fn insert_wallet(&mut self, owner: i32, account_number: &str)
		-> Result<Option<Wallet>, AppError>;
}

pub trait TransactionStore {
	fn create_transaction(&mut self, new_transaction: &NewTransaction) -> Result<i32, AppError>;

	fn find_transaction(&mut self, id: i32) -> Result<Option<Transaction>, AppError>;

	fn lock_transaction(&mut self, id: i32) -> Result<Option<Transaction>, AppError>;

	fn find_all_for_user(&mut self, user_id: i32) -> Result<Vec<Transaction>, AppError>;

	fn find_for_user_by_type(
		&mut self,
		user_id: i32,
		transaction_type: TransactionType,
	) -> Result<Vec<Transaction>, AppError>;

	/// Newest first (descending id).
	fn find_page(&mut self, user_id: i32, skip: i64, take: i64)
		-> Result<Vec<Transaction>, AppError>;

	/// Transfers between the two users, in either direction.
	fn find_common(&mut self, user_a: i32, user_b: i32) -> Result<Vec<Transaction>, AppError>;

	fn update_transaction(&mut self, id: i32, changes: &TransactionChanges)
		-> Result<(), AppError>;
}

pub trait UserStore {
	fn create_user(&mut self, new_user: &NewUser) -> Result<User, AppError>;

	fn find_user(&mut self, id: i32) -> Result<Option<User>, AppError>;

	fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, AppError>;

	fn find_user_by_email_or_phone(
		&mut self,
		email: &str,
		phone: &str,
	) -> Result<Option<User>, AppError>;

	fn find_users_by_email_or_id(&mut self, email: &str, id: i32) -> Result<Vec<User>, AppError>;

	fn find_verified_user_by_account_number(
		&mut self,
		account_number: &str,
	) -> Result<Option<User>, AppError>;

	fn update_user(&mut self, id: i32, changes: &UserChanges) -> Result<(), AppError>;
}

pub trait Store: WalletStore + TransactionStore + UserStore {}

impl<T: WalletStore + TransactionStore + UserStore> Store for T {}

pub trait Repository: Send + Sync {
	fn atomic<T, F>(&self, f: F) -> Result<T, AppError>
	where
		F: FnOnce(&mut dyn Store) -> Result<T, AppError>;
}

impl<R: Repository> Repository for Arc<R> {
	fn atomic<T, F>(&self, f: F) -> Result<T, AppError>
	where
		F: FnOnce(&mut dyn Store) -> Result<T, AppError>,
	{
		self.as_ref().atomic(f)
	}
}
