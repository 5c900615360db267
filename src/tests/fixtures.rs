use crate::{
	accounts::{provision_wallet, Accounts},
	auth::password::hash_password,
	ledger::Ledger,
	midware::jwt::JWT,
	models::{NewUser, SignUpRequest, User, UserChanges},
	services::{
		payment::SandboxPaymentRail, Blacklist, MockBlacklist, MockNotifier, Notifier, PaymentRail,
	},
	store::{memory::MemoryRepository, Repository},
};
use bigdecimal::BigDecimal;
use chrono::Utc;
use std::sync::Arc;

pub const TEST_SECRET: &str = "test_secret";
pub const TEST_PASSWORD: &str = "SecurePassword123!";

pub type TestRepo = Arc<MemoryRepository>;

pub struct TestFixtures;

impl TestFixtures {
	pub fn repo() -> TestRepo {
		Arc::new(MemoryRepository::new())
	}

	pub fn jwt() -> JWT {
		JWT::new(TEST_SECRET, 3600)
	}

	pub fn sign_up_request(email: &str, phone: &str) -> SignUpRequest {
		SignUpRequest {
			first_name: "Ada".to_string(),
			last_name: "Lovelace".to_string(),
			email: email.to_string(),
			phone: phone.to_string(),
			password: TEST_PASSWORD.to_string(),
		}
	}

	/// A verified user with a wallet holding `balance`.
	pub fn seeded_user(repo: &MemoryRepository, email: &str, balance: i64) -> User {
		let new_user = NewUser {
			first_name: "Test".to_string(),
			last_name: "User".to_string(),
			password: hash_password(TEST_PASSWORD).unwrap(),
			email: email.to_string(),
			phone: format!("+234800000{:04}", repo.snapshot().users.len()),
			otp: "123456".to_string(),
			otp_issued_at: Utc::now(),
		};
		repo.atomic(|store| {
			let mut user = store.create_user(&new_user)?;
			provision_wallet(store, user.id)?;
			store.update_balance(user.id, &BigDecimal::from(balance))?;
			store.update_user(user.id, &UserChanges { is_verified: Some(true), ..Default::default() })?;
			user.is_verified = true;
			Ok(user)
		})
		.unwrap()
	}

	pub fn balance_of(repo: &MemoryRepository, owner: i32) -> BigDecimal {
		repo.wallet_of(owner).expect("wallet exists").balance
	}

	pub fn sandbox_ledger(repo: &TestRepo) -> Ledger<TestRepo> {
		Self::ledger_with(repo, Arc::new(SandboxPaymentRail::new("https://pay.test")))
	}

	pub fn ledger_with(repo: &TestRepo, payments: Arc<dyn PaymentRail>) -> Ledger<TestRepo> {
		Ledger::new(repo.clone(), payments, 2)
	}

	pub fn clean_blacklist() -> MockBlacklist {
		let mut blacklist = MockBlacklist::new();
		blacklist.expect_is_blacklisted().returning(|_| Ok(false));
		blacklist
	}

	pub fn quiet_notifier() -> MockNotifier {
		let mut notifier = MockNotifier::new();
		notifier.expect_send_otp().returning(|_, _, _| Ok(()));
		notifier
	}

	pub fn accounts_with(
		repo: &TestRepo,
		blacklist: MockBlacklist,
		notifier: MockNotifier,
	) -> Accounts<TestRepo> {
		let blacklist: Arc<dyn Blacklist> = Arc::new(blacklist);
		let notifier: Arc<dyn Notifier> = Arc::new(notifier);
		Accounts::new(repo.clone(), blacklist, notifier, Self::jwt())
	}
}
