//! Money movement between wallets.
//!
//! A transfer is single phase: both balances and the TRANSFER row are written in one
//! atomic unit. Top-ups and withdrawals are two phase: initiation records an unsuccessful
//! row and hands back a checkout from the payment rail, and `verify` applies the balance
//! change once the rail confirms it. Each operation reads and writes wallets inside the
//! same unit, under row locks, so concurrent calls on one wallet are serialised.

use crate::{
	constants::{MONEY_MAX_INTEGER_DIGITS, MONEY_SCALE},
	error::AppError,
	models::{NewTransaction, Transaction, TransactionChanges, TransactionType, TransactionView, Wallet},
	services::{Checkout, PaymentRail},
	store::{Repository, Store},
};
use bigdecimal::BigDecimal;
use std::{collections::BTreeMap, sync::Arc};

#[derive(Debug, Clone)]
pub struct InitiatedPayment {
	pub transaction: Transaction,
	pub checkout: Checkout,
}

pub struct Ledger<R> {
	repo: R,
	payments: Arc<dyn PaymentRail>,
	per_page: i64,
}

/// Amounts are strictly positive and fit the money precision. Trailing zeros do not count
/// against the scale, so `10.500` is accepted and `0.001` is not.
fn ensure_valid_amount(amount: &BigDecimal) -> Result<(), AppError> {
	if *amount <= BigDecimal::from(0) {
		return Err(AppError::InvalidAmount);
	}
	let normalized = amount.normalized();
	let (_, scale) = normalized.as_bigint_and_exponent();
	let integer_digits = normalized.digits() as i64 - scale;
	if scale > MONEY_SCALE || integer_digits > MONEY_MAX_INTEGER_DIGITS {
		return Err(AppError::InvalidAmount);
	}
	Ok(())
}

/// Picks sender and receiver out of whatever the pair lookup returned.
fn split_pair(wallets: Vec<Wallet>, sender: i32, receiver: i32) -> Option<(Wallet, Wallet)> {
	if sender == receiver || wallets.len() != 2 {
		return None;
	}
	let mut sender_wallet = None;
	let mut receiver_wallet = None;
	for wallet in wallets {
		if wallet.owner == sender {
			sender_wallet = Some(wallet);
		} else if wallet.owner == receiver {
			receiver_wallet = Some(wallet);
		}
	}
	Some((sender_wallet?, receiver_wallet?))
}

fn reload(store: &mut dyn Store, id: i32) -> Result<Transaction, AppError> {
	store
		.find_transaction(id)?
		.ok_or_else(|| AppError::Internal(format!("transaction {} vanished after write", id)))
}

fn log_rejection(operation: &str, user_id: i32, err: &AppError) {
	match err {
		AppError::Database(_) | AppError::Pool(_) | AppError::Internal(_) =>
			log::error!("{} for user {} failed: {}", operation, user_id, err),
		_ => log::warn!("{} for user {} rejected: {}", operation, user_id, err),
	}
}

impl<R: Repository> Ledger<R> {
	pub fn new(repo: R, payments: Arc<dyn PaymentRail>, per_page: i64) -> Self {
		Self { repo, payments, per_page }
	}

	pub fn transfer(
		&self,
		sender: i32,
		receiver: i32,
		amount: BigDecimal,
		remark: Option<String>,
	) -> Result<Transaction, AppError> {
		ensure_valid_amount(&amount)?;
		let transaction = self
			.repo
			.atomic(|store| {
				let wallets = store.find_pair_for_transfer([sender, receiver])?;
				// A self-transfer only finds one wallet and lands here too.
				let (sender_wallet, receiver_wallet) = split_pair(wallets, sender, receiver)
					.ok_or_else(|| AppError::not_found("Please make sure the id is valid."))?;

				if sender_wallet.balance < amount {
					return Err(AppError::InsufficientFunds);
				}

				let sender_balance = &sender_wallet.balance - &amount;
				let receiver_balance = &receiver_wallet.balance + &amount;
				store.update_balance(sender, &sender_balance)?;
				store.update_balance(receiver, &receiver_balance)?;

				let mut new_transaction = NewTransaction::new(TransactionType::Transfer, amount.clone());
				new_transaction.sender = Some(sender);
				new_transaction.receiver = Some(receiver);
				new_transaction.sender_balance = Some(sender_balance);
				new_transaction.receiver_balance = Some(receiver_balance);
				new_transaction.is_successful = true;
				new_transaction.remark = remark;
				let id = store.create_transaction(&new_transaction)?;
				reload(store, id)
			})
			.inspect_err(|e| log_rejection("Transfer", sender, e))?;

		log::info!(
			"Transfer {} of {} from user {} to user {} committed",
			transaction.transaction_uuid,
			amount,
			sender,
			receiver
		);
		Ok(transaction)
	}

	pub fn top_up(&self, owner: i32, amount: BigDecimal) -> Result<InitiatedPayment, AppError> {
		ensure_valid_amount(&amount)?;
		let transaction = self
			.repo
			.atomic(|store| {
				let wallet = store
					.find_wallet_by_owner(owner)?
					.ok_or_else(|| AppError::not_found("User not found."))?;

				// The balance only moves once the payment is verified.
				let mut new_transaction = NewTransaction::new(TransactionType::TopUp, amount.clone());
				new_transaction.receiver = Some(owner);
				new_transaction.receiver_balance = Some(wallet.balance);
				let id = store.create_transaction(&new_transaction)?;
				reload(store, id)
			})
			.inspect_err(|e| log_rejection("Top-up", owner, e))?;

		let checkout = self.payments.initiate_top_up(&amount, transaction.id)?;
		log::info!("Top-up {} initiated for user {}", transaction.id, owner);
		Ok(InitiatedPayment { transaction, checkout })
	}

	pub fn withdraw(&self, owner: i32, amount: BigDecimal) -> Result<InitiatedPayment, AppError> {
		ensure_valid_amount(&amount)?;
		let transaction = self
			.repo
			.atomic(|store| {
				let wallet = store
					.lock_wallet_by_owner(owner)?
					.ok_or_else(|| AppError::not_found("User not found."))?;
				if wallet.balance < amount {
					return Err(AppError::InsufficientFunds);
				}

				let mut new_transaction =
					NewTransaction::new(TransactionType::Withdrawal, amount.clone());
				new_transaction.sender = Some(owner);
				new_transaction.sender_balance = Some(wallet.balance);
				let id = store.create_transaction(&new_transaction)?;
				reload(store, id)
			})
			.inspect_err(|e| log_rejection("Withdrawal", owner, e))?;

		let checkout = self.payments.initiate_withdrawal(&amount, transaction.id)?;
		log::info!("Withdrawal {} initiated for user {}", transaction.id, owner);
		Ok(InitiatedPayment { transaction, checkout })
	}

	/// Settles a top-up or withdrawal confirmed by the payment rail. A transaction is only
	/// ever applied once: the row is locked and its success flag checked before any write.
	pub fn verify(&self, owner: i32, payment_id: &str) -> Result<Transaction, AppError> {
		let verification = self.payments.verify(payment_id)?;
		if !verification.success {
			log::warn!("Payment {} failed verification for user {}", payment_id, owner);
			return Err(AppError::InvalidPayment);
		}

		let transaction = self
			.repo
			.atomic(|store| {
				let transaction = store
					.lock_transaction(verification.transaction_id)?
					.ok_or_else(|| AppError::not_found("Transaction not found."))?;
				// Other users' transactions look absent whatever their state.
				let owning_side = match transaction.transaction_type {
					TransactionType::Withdrawal => transaction.sender,
					_ => transaction.receiver,
				};
				if owning_side != Some(owner) {
					return Err(AppError::not_found("Transaction not found."));
				}
				if transaction.is_successful {
					return Err(AppError::AlreadyVerified);
				}

				let wallet = store
					.lock_wallet_by_owner(owner)?
					.ok_or_else(|| AppError::not_found("User not found."))?;

				let amount = &transaction.amount;
				let mut changes = TransactionChanges { is_successful: Some(true), ..Default::default() };
				let balance = match transaction.transaction_type {
					TransactionType::Withdrawal => {
						if wallet.balance < *amount {
							return Err(AppError::InsufficientFunds);
						}
						let snapshot = transaction.sender_balance.as_ref().unwrap_or(&wallet.balance);
						changes.sender_balance = Some(snapshot - amount);
						&wallet.balance - amount
					},
					_ => {
						let snapshot =
							transaction.receiver_balance.as_ref().unwrap_or(&wallet.balance);
						changes.receiver_balance = Some(snapshot + amount);
						&wallet.balance + amount
					},
				};

				store.update_balance(owner, &balance)?;
				store.update_transaction(transaction.id, &changes)?;
				reload(store, transaction.id)
			})
			.inspect_err(|e| log_rejection("Verification", owner, e))?;

		log::info!(
			"{} {} verified for user {}",
			transaction.transaction_type,
			transaction.id,
			owner
		);
		Ok(transaction)
	}

	pub fn balance(&self, owner: i32) -> Result<BigDecimal, AppError> {
		self.repo.atomic(|store| {
			store
				.find_wallet_by_owner(owner)?
				.map(|wallet| wallet.balance)
				.ok_or_else(|| AppError::not_found("This user does not exist in the database."))
		})
	}

	/// The caller's transactions grouped by type, optionally restricted to one type.
	pub fn transactions_by_type(
		&self,
		user_id: i32,
		transaction_type: Option<TransactionType>,
	) -> Result<BTreeMap<TransactionType, Vec<TransactionView>>, AppError> {
		let found = self.repo.atomic(|store| match transaction_type {
			Some(transaction_type) => store.find_for_user_by_type(user_id, transaction_type),
			None => store.find_all_for_user(user_id),
		})?;

		let mut grouped: BTreeMap<TransactionType, Vec<TransactionView>> = BTreeMap::new();
		for tx in found {
			grouped.entry(tx.transaction_type).or_default().push(TransactionView::for_user(tx, user_id));
		}
		Ok(grouped)
	}

	/// One page of the caller's history, newest first. Pages start at 1.
	pub fn transactions_page(
		&self,
		user_id: i32,
		page_number: Option<i64>,
	) -> Result<Vec<TransactionView>, AppError> {
		let page = page_number.filter(|p| *p > 0).unwrap_or(1);
		let take = self.per_page;
		let skip = (page - 1).saturating_mul(take);
		let found = self.repo.atomic(|store| store.find_page(user_id, skip, take))?;
		Ok(found.into_iter().map(|tx| TransactionView::for_user(tx, user_id)).collect())
	}

	pub fn common_transactions(
		&self,
		user_id: i32,
		other_user: i32,
	) -> Result<Vec<TransactionView>, AppError> {
		let found = self.repo.atomic(|store| store.find_common(user_id, other_user))?;
		Ok(found.into_iter().map(|tx| TransactionView::for_user(tx, user_id)).collect())
	}
}
