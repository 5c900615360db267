use crate::schema::*;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::{
	deserialize::{self, FromSql, FromSqlRow},
	expression::AsExpression,
	pg::{Pg, PgValue},
	prelude::*,
	serialize::{self, IsNull, Output, ToSql},
	sql_types::Text,
};
use serde::{Deserialize, Serialize};
use std::{fmt, io::Write, str::FromStr};
use validator::Validate;

#[derive(
	Debug,
	Clone,
	Copy,
	PartialEq,
	Eq,
	Hash,
	PartialOrd,
	Ord,
	Serialize,
	Deserialize,
	AsExpression,
	FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
	TopUp,
	Withdrawal,
	Transfer,
}

impl TransactionType {
	pub fn as_str(&self) -> &'static str {
		match self {
			TransactionType::TopUp => "top_up",
			TransactionType::Withdrawal => "withdrawal",
			TransactionType::Transfer => "transfer",
		}
	}
}

impl fmt::Display for TransactionType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for TransactionType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"top_up" => Ok(TransactionType::TopUp),
			"withdrawal" => Ok(TransactionType::Withdrawal),
			"transfer" => Ok(TransactionType::Transfer),
			other => Err(format!("unknown transaction type: {}", other)),
		}
	}
}

impl ToSql<Text, Pg> for TransactionType {
	fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
		out.write_all(self.as_str().as_bytes())?;
		Ok(IsNull::No)
	}
}

impl FromSql<Text, Pg> for TransactionType {
	fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
		let raw = std::str::from_utf8(bytes.as_bytes())?;
		raw.parse::<TransactionType>().map_err(Into::into)
	}
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(Pg))]
pub struct User {
	pub id: i32,
	pub first_name: String,
	pub last_name: String,
	pub password: String,
	pub email: String,
	pub phone: String,
	pub is_verified: bool,
	pub otp: String,
	pub otp_issued_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = users)]
pub struct NewUser {
	pub first_name: String,
	pub last_name: String,
	pub password: String,
	pub email: String,
	pub phone: String,
	pub otp: String,
	pub otp_issued_at: DateTime<Utc>,
}

#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = users)]
pub struct UserChanges {
	pub email: Option<String>,
	pub is_verified: Option<bool>,
	pub otp: Option<String>,
	pub otp_issued_at: Option<DateTime<Utc>>,
}

#[derive(Queryable, Selectable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = wallets)]
#[diesel(check_for_backend(Pg))]
pub struct Wallet {
	pub id: i32,
	pub balance: BigDecimal,
	pub account_number: String,
	pub owner: i32,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = wallets)]
pub struct NewWallet<'a> {
	pub account_number: &'a str,
	pub owner: i32,
}

#[derive(Queryable, Selectable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = transactions)]
#[diesel(check_for_backend(Pg))]
pub struct Transaction {
	pub id: i32,
	pub transaction_uuid: uuid::Uuid,
	pub transaction_type: TransactionType,
	pub amount: BigDecimal,
	pub sender_balance: Option<BigDecimal>,
	pub receiver_balance: Option<BigDecimal>,
	pub is_successful: bool,
	pub remark: Option<String>,
	pub sender: Option<i32>,
	pub receiver: Option<i32>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// Insert shape for a transaction row; unset balances and parties stay NULL.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = transactions)]
pub struct NewTransaction {
	pub transaction_uuid: uuid::Uuid,
	pub transaction_type: TransactionType,
	pub amount: BigDecimal,
	pub sender_balance: Option<BigDecimal>,
	pub receiver_balance: Option<BigDecimal>,
	pub is_successful: bool,
	pub remark: Option<String>,
	pub sender: Option<i32>,
	pub receiver: Option<i32>,
}

impl NewTransaction {
	pub fn new(transaction_type: TransactionType, amount: BigDecimal) -> Self {
		Self {
			transaction_uuid: uuid::Uuid::new_v4(),
			transaction_type,
			amount,
			sender_balance: None,
			receiver_balance: None,
			is_successful: false,
			remark: None,
			sender: None,
			receiver: None,
		}
	}
}

#[derive(AsChangeset, Debug, Clone, Default, PartialEq)]
#[diesel(table_name = transactions)]
pub struct TransactionChanges {
	pub sender_balance: Option<BigDecimal>,
	pub receiver_balance: Option<BigDecimal>,
	pub is_successful: Option<bool>,
	pub remark: Option<String>,
}

/// What a user sees of a transaction: only the balance snapshot on their side.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TransactionView {
	pub id: i32,
	pub transaction_uuid: uuid::Uuid,
	pub transaction_type: TransactionType,
	pub amount: BigDecimal,
	pub wallet_balance: Option<BigDecimal>,
	pub is_successful: bool,
	pub remark: Option<String>,
	pub sender: Option<i32>,
	pub receiver: Option<i32>,
	pub created_at: DateTime<Utc>,
}

impl TransactionView {
	pub fn for_user(tx: Transaction, user_id: i32) -> Self {
		let wallet_balance = if tx.sender == Some(user_id) {
			tx.sender_balance
		} else {
			tx.receiver_balance
		};
		Self {
			id: tx.id,
			transaction_uuid: tx.transaction_uuid,
			transaction_type: tx.transaction_type,
			amount: tx.amount,
			wallet_balance,
			is_successful: tx.is_successful,
			remark: tx.remark,
			sender: tx.sender,
			receiver: tx.receiver,
			created_at: tx.created_at,
		}
	}
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserProfile {
	pub id: i32,
	pub first_name: String,
	pub last_name: String,
	pub email: String,
	pub phone: String,
	pub is_verified: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub balance: Option<BigDecimal>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub account_number: Option<String>,
}

impl UserProfile {
	pub fn with_wallet(mut self, wallet: &Wallet) -> Self {
		self.balance = Some(wallet.balance.clone());
		self.account_number = Some(wallet.account_number.clone());
		self
	}
}

impl From<&User> for UserProfile {
	fn from(user: &User) -> Self {
		Self {
			id: user.id,
			first_name: user.first_name.clone(),
			last_name: user.last_name.clone(),
			email: user.email.clone(),
			phone: user.phone.clone(),
			is_verified: user.is_verified,
			balance: None,
			account_number: None,
		}
	}
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AuthResp {
	pub user: UserProfile,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub access_token: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct BalanceResp {
	pub balance: BigDecimal,
}

#[derive(Serialize, Deserialize, Validate, Debug, Clone)]
pub struct SignUpRequest {
	#[validate(length(min = 1, max = 255))]
	pub first_name: String,
	#[validate(length(min = 1, max = 255))]
	pub last_name: String,
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 7, max = 20))]
	pub phone: String,
	#[validate(length(min = 5, max = 20))]
	pub password: String,
}

#[derive(Serialize, Deserialize, Validate, Debug)]
pub struct SignInRequest {
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 5, max = 20))]
	pub password: String,
}

#[derive(Serialize, Deserialize, Validate, Debug)]
pub struct VerifyEmailQuery {
	#[validate(email)]
	pub email: String,
	#[validate(length(equal = 6))]
	pub otp: String,
}

#[derive(Serialize, Deserialize, Validate, Debug)]
pub struct UpdateEmailRequest {
	#[validate(email)]
	pub email: String,
}

#[derive(Serialize, Deserialize, Validate, Debug)]
pub struct VerifyPasswordRequest {
	#[validate(length(min = 5, max = 20))]
	pub password: String,
}

#[derive(Serialize, Deserialize, Validate, Debug)]
pub struct TransferRequest {
	pub receiver_id: i32,
	pub amount: BigDecimal,
	#[validate(length(max = 255))]
	pub remark: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct InitiateTransactionRequest {
	pub amount: BigDecimal,
}

#[derive(Serialize, Deserialize, Validate, Debug)]
pub struct VerifyTransactionRequest {
	#[validate(length(min = 1, max = 64))]
	pub payment_id: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TransactionTypeQuery {
	pub transaction_type: Option<TransactionType>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PageQuery {
	pub page_number: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UserIdQuery {
	pub user_id: i32,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct WalletNumberQuery {
	pub wallet_number: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ApiResponse<T> {
	pub status: String,
	pub data: Option<T>,
	pub error: Option<String>,
}

impl<T> ApiResponse<T> {
	pub fn success(data: T) -> Self {
		Self { status: "success".to_string(), data: Some(data), error: None }
	}
}
