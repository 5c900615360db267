use super::{Repository, Store, TransactionStore, UserStore, WalletStore};
use crate::{
	db::DbPool,
	error::AppError,
	models::{
		NewTransaction, NewUser, NewWallet, Transaction, TransactionChanges, TransactionType,
		User, UserChanges, Wallet,
	},
	schema::{transactions, users, wallets},
};
use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::prelude::*;

#[derive(Clone)]
pub struct PgRepository {
	pool: DbPool,
}

impl PgRepository {
	pub fn new(pool: DbPool) -> Self {
		Self { pool }
	}
}

impl Repository for PgRepository {
	fn atomic<T, F>(&self, f: F) -> Result<T, AppError>
	where
		F: FnOnce(&mut dyn Store) -> Result<T, AppError>,
	{
		let mut pooled = self.pool.get()?;
		let conn: &mut PgConnection = &mut pooled;
		conn.transaction::<T, AppError, _>(|conn| {
			let mut store = PgStore { conn };
			f(&mut store)
		})
	}
}

/// Store bound to a connection that is already inside a transaction.
pub struct PgStore<'a> {
	conn: &'a mut PgConnection,
}

impl WalletStore for PgStore<'_> {
	fn find_wallet_by_account_number(
		&mut self,
		account_number: &str,
	) -> Result<Option<Wallet>, AppError> {
		let wallet = wallets::table
			.filter(wallets::account_number.eq(account_number))
			.select(Wallet::as_select())
			.first(self.conn)
			.optional()?;
		Ok(wallet)
	}

	fn find_wallet_by_owner(&mut self, owner: i32) -> Result<Option<Wallet>, AppError> {
		let wallet = wallets::table
			.filter(wallets::owner.eq(owner))
			.select(Wallet::as_select())
			.first(self.conn)
			.optional()?;
		Ok(wallet)
	}

	fn lock_wallet_by_owner(&mut self, owner: i32) -> Result<Option<Wallet>, AppError> {
		let wallet = wallets::table
			.filter(wallets::owner.eq(owner))
			.select(Wallet::as_select())
			.for_update()
			.first(self.conn)
			.optional()?;
		Ok(wallet)
	}

	fn find_pair_for_transfer(&mut self, owners: [i32; 2]) -> Result<Vec<Wallet>, AppError> {
		// Locks are taken in id order so two opposite transfers cannot deadlock.
		let pair = wallets::table
			.filter(wallets::owner.eq_any(owners.to_vec()))
			.order(wallets::id.asc())
			.select(Wallet::as_select())
			.for_update()
			.load(self.conn)?;
		Ok(pair)
	}

	fn update_balance(&mut self, owner: i32, balance: &BigDecimal) -> Result<(), AppError> {
		let updated = diesel::update(wallets::table.filter(wallets::owner.eq(owner)))
			.set((wallets::balance.eq(balance), wallets::updated_at.eq(Utc::now())))
			.execute(self.conn)?;
		if updated == 0 {
			return Err(AppError::not_found("Wallet not found."));
		}
		Ok(())
	}

	fn insert_wallet(
		&mut self,
		owner: i32,
		account_number: &str,
	) -> Result<Option<Wallet>, AppError> {
		let wallet = diesel::insert_into(wallets::table)
			.values(&NewWallet { account_number, owner })
			.on_conflict(wallets::account_number)
			.do_nothing()
			.returning(Wallet::as_returning())
			.get_result(self.conn)
			.optional()?;
		Ok(wallet)
	}
}

impl TransactionStore for PgStore<'_> {
	fn create_transaction(&mut self, new_transaction: &NewTransaction) -> Result<i32, AppError> {
		let id = diesel::insert_into(transactions::table)
			.values(new_transaction)
			.returning(transactions::id)
			.get_result::<i32>(self.conn)?;
		Ok(id)
	}

	fn find_transaction(&mut self, id: i32) -> Result<Option<Transaction>, AppError> {
		let transaction = transactions::table
			.find(id)
			.select(Transaction::as_select())
			.first(self.conn)
			.optional()?;
		Ok(transaction)
	}

	fn lock_transaction(&mut self, id: i32) -> Result<Option<Transaction>, AppError> {
		let transaction = transactions::table
			.find(id)
			.select(Transaction::as_select())
			.for_update()
			.first(self.conn)
			.optional()?;
		Ok(transaction)
	}

	fn find_all_for_user(&mut self, user_id: i32) -> Result<Vec<Transaction>, AppError> {
		let found = transactions::table
			.filter(transactions::sender.eq(user_id).or(transactions::receiver.eq(user_id)))
			.order(transactions::id.desc())
			.select(Transaction::as_select())
			.load(self.conn)?;
		Ok(found)
	}

	fn find_for_user_by_type(
		&mut self,
		user_id: i32,
		transaction_type: TransactionType,
	) -> Result<Vec<Transaction>, AppError> {
		let found = transactions::table
			.filter(transactions::transaction_type.eq(transaction_type))
			.filter(transactions::sender.eq(user_id).or(transactions::receiver.eq(user_id)))
			.order(transactions::id.desc())
			.select(Transaction::as_select())
			.load(self.conn)?;
		Ok(found)
	}

	fn find_page(
		&mut self,
		user_id: i32,
		skip: i64,
		take: i64,
	) -> Result<Vec<Transaction>, AppError> {
		let page = transactions::table
			.filter(transactions::sender.eq(user_id).or(transactions::receiver.eq(user_id)))
			.order(transactions::id.desc())
			.offset(skip)
			.limit(take)
			.select(Transaction::as_select())
			.load(self.conn)?;
		Ok(page)
	}

	fn find_common(&mut self, user_a: i32, user_b: i32) -> Result<Vec<Transaction>, AppError> {
		let found = transactions::table
			.filter(transactions::transaction_type.eq(TransactionType::Transfer))
			.filter(
				transactions::sender
					.eq(user_a)
					.and(transactions::receiver.eq(user_b))
					.or(transactions::sender.eq(user_b).and(transactions::receiver.eq(user_a))),
			)
			.order(transactions::id.desc())
			.select(Transaction::as_select())
			.load(self.conn)?;
		Ok(found)
	}

	fn update_transaction(
		&mut self,
		id: i32,
		changes: &TransactionChanges,
	) -> Result<(), AppError> {
		let updated = diesel::update(transactions::table.find(id))
			.set((changes, transactions::updated_at.eq(Utc::now())))
			.execute(self.conn)?;
		if updated == 0 {
			return Err(AppError::not_found("Transaction not found."));
		}
		Ok(())
	}
}

impl UserStore for PgStore<'_> {
	fn create_user(&mut self, new_user: &NewUser) -> Result<User, AppError> {
		let user = diesel::insert_into(users::table)
			.values(new_user)
			.returning(User::as_returning())
			.get_result(self.conn)?;
		Ok(user)
	}

	fn find_user(&mut self, id: i32) -> Result<Option<User>, AppError> {
		let user =
			users::table.find(id).select(User::as_select()).first(self.conn).optional()?;
		Ok(user)
	}

	fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, AppError> {
		let user = users::table
			.filter(users::email.eq(email))
			.select(User::as_select())
			.first(self.conn)
			.optional()?;
		Ok(user)
	}

	fn find_user_by_email_or_phone(
		&mut self,
		email: &str,
		phone: &str,
	) -> Result<Option<User>, AppError> {
		let user = users::table
			.filter(users::email.eq(email).or(users::phone.eq(phone)))
			.select(User::as_select())
			.first(self.conn)
			.optional()?;
		Ok(user)
	}

	fn find_users_by_email_or_id(&mut self, email: &str, id: i32) -> Result<Vec<User>, AppError> {
		let found = users::table
			.filter(users::email.eq(email).or(users::id.eq(id)))
			.select(User::as_select())
			.load(self.conn)?;
		Ok(found)
	}

	fn find_verified_user_by_account_number(
		&mut self,
		account_number: &str,
	) -> Result<Option<User>, AppError> {
		let user = users::table
			.inner_join(wallets::table)
			.filter(wallets::account_number.eq(account_number))
			.filter(users::is_verified.eq(true))
			.select(User::as_select())
			.first(self.conn)
			.optional()?;
		Ok(user)
	}

	fn update_user(&mut self, id: i32, changes: &UserChanges) -> Result<(), AppError> {
		let updated = diesel::update(users::table.find(id))
			.set((changes, users::updated_at.eq(Utc::now())))
			.execute(self.conn)?;
		if updated == 0 {
			return Err(AppError::not_found("User not found."));
		}
		Ok(())
	}
}
