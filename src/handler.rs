use crate::{
	accounts::Accounts,
	error::AppError,
	ledger::{InitiatedPayment, Ledger},
	midware::jwt::Claims,
	models::{
		ApiResponse, BalanceResp, InitiateTransactionRequest, PageQuery, SignInRequest,
		SignUpRequest, TransactionTypeQuery, TransactionView, TransferRequest, UpdateEmailRequest,
		UserIdQuery, VerifyEmailQuery, VerifyPasswordRequest, VerifyTransactionRequest,
		WalletNumberQuery,
	},
	store::Repository,
};
use actix_web::{web, HttpResponse};
use validator::Validate;

pub struct AppState<R> {
	pub ledger: Ledger<R>,
	pub accounts: Accounts<R>,
}

/// Runs blocking store and collaborator work off the async workers.
async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
	F: FnOnce() -> Result<T, AppError> + Send + 'static,
	T: Send + 'static,
{
	web::block(f).await.map_err(|e| AppError::Internal(e.to_string()))?
}

fn validated<T: Validate>(req: &T) -> Result<(), AppError> {
	req.validate().map_err(|e| {
		log::warn!("Validation error: {:?}", e);
		AppError::bad_request(e.to_string())
	})
}

fn ok<T: serde::Serialize>(data: T) -> HttpResponse {
	HttpResponse::Ok().json(ApiResponse::success(data))
}

pub struct AuthHandler;

impl AuthHandler {
	pub async fn sign_up<R: Repository + 'static>(
		state: web::Data<AppState<R>>,
		req: web::Json<SignUpRequest>,
	) -> Result<HttpResponse, AppError> {
		validated(&*req)?;
		let req = req.into_inner();
		let profile = blocking(move || state.accounts.sign_up(req)).await?;
		Ok(HttpResponse::Created().json(ApiResponse::success(profile)))
	}

	pub async fn verify_email<R: Repository + 'static>(
		state: web::Data<AppState<R>>,
		query: web::Query<VerifyEmailQuery>,
	) -> Result<HttpResponse, AppError> {
		validated(&*query)?;
		let query = query.into_inner();
		let resp = blocking(move || state.accounts.verify_email(&query.email, &query.otp)).await?;
		Ok(ok(resp))
	}

	pub async fn sign_in<R: Repository + 'static>(
		state: web::Data<AppState<R>>,
		req: web::Json<SignInRequest>,
	) -> Result<HttpResponse, AppError> {
		validated(&*req)?;
		let req = req.into_inner();
		let resp = blocking(move || state.accounts.sign_in(&req.email, &req.password)).await?;
		Ok(ok(resp))
	}

	pub async fn update_email<R: Repository + 'static>(
		state: web::Data<AppState<R>>,
		claims: web::ReqData<Claims>,
		req: web::Json<UpdateEmailRequest>,
	) -> Result<HttpResponse, AppError> {
		validated(&*req)?;
		let user_id = claims.user_id()?;
		let req = req.into_inner();
		let profile = blocking(move || state.accounts.update_email(user_id, &req.email)).await?;
		Ok(ok(profile))
	}

	pub async fn verify_password<R: Repository + 'static>(
		state: web::Data<AppState<R>>,
		claims: web::ReqData<Claims>,
		req: web::Json<VerifyPasswordRequest>,
	) -> Result<HttpResponse, AppError> {
		validated(&*req)?;
		let user_id = claims.user_id()?;
		let req = req.into_inner();
		blocking(move || state.accounts.verify_password(user_id, &req.password)).await?;
		Ok(ok("Correct password."))
	}
}

pub struct UserHandler;

impl UserHandler {
	pub async fn my_profile<R: Repository + 'static>(
		state: web::Data<AppState<R>>,
		claims: web::ReqData<Claims>,
	) -> Result<HttpResponse, AppError> {
		let user_id = claims.user_id()?;
		let profile = blocking(move || state.accounts.profile(user_id)).await?;
		Ok(ok(profile))
	}

	pub async fn my_balance<R: Repository + 'static>(
		state: web::Data<AppState<R>>,
		claims: web::ReqData<Claims>,
	) -> Result<HttpResponse, AppError> {
		let user_id = claims.user_id()?;
		let balance = blocking(move || state.ledger.balance(user_id)).await?;
		Ok(ok(BalanceResp { balance }))
	}

	pub async fn transactions_by_type<R: Repository + 'static>(
		state: web::Data<AppState<R>>,
		claims: web::ReqData<Claims>,
		query: web::Query<TransactionTypeQuery>,
	) -> Result<HttpResponse, AppError> {
		let user_id = claims.user_id()?;
		let transaction_type = query.transaction_type;
		let grouped =
			blocking(move || state.ledger.transactions_by_type(user_id, transaction_type)).await?;
		Ok(ok(grouped))
	}

	pub async fn transactions<R: Repository + 'static>(
		state: web::Data<AppState<R>>,
		claims: web::ReqData<Claims>,
		query: web::Query<PageQuery>,
	) -> Result<HttpResponse, AppError> {
		let user_id = claims.user_id()?;
		let page_number = query.page_number;
		let page = blocking(move || state.ledger.transactions_page(user_id, page_number)).await?;
		Ok(ok(page))
	}

	pub async fn common_transactions<R: Repository + 'static>(
		state: web::Data<AppState<R>>,
		claims: web::ReqData<Claims>,
		query: web::Query<UserIdQuery>,
	) -> Result<HttpResponse, AppError> {
		let user_id = claims.user_id()?;
		let other = query.user_id;
		let common = blocking(move || state.ledger.common_transactions(user_id, other)).await?;
		Ok(ok(common))
	}

	pub async fn user_by_wallet_number<R: Repository + 'static>(
		state: web::Data<AppState<R>>,
		query: web::Query<WalletNumberQuery>,
	) -> Result<HttpResponse, AppError> {
		let number = query.into_inner().wallet_number;
		let profile = blocking(move || state.accounts.user_by_wallet_number(&number)).await?;
		Ok(ok(profile))
	}

	pub async fn user_by_id<R: Repository + 'static>(
		state: web::Data<AppState<R>>,
		query: web::Query<UserIdQuery>,
	) -> Result<HttpResponse, AppError> {
		let user_id = query.user_id;
		let profile = blocking(move || state.accounts.user_by_id(user_id)).await?;
		Ok(ok(profile))
	}
}

pub struct TransactionHandler;

impl TransactionHandler {
	pub async fn transfer<R: Repository + 'static>(
		state: web::Data<AppState<R>>,
		claims: web::ReqData<Claims>,
		req: web::Json<TransferRequest>,
	) -> Result<HttpResponse, AppError> {
		validated(&*req)?;
		let sender = claims.user_id()?;
		let req = req.into_inner();
		let transaction = blocking(move || {
			state.ledger.transfer(sender, req.receiver_id, req.amount, req.remark)
		})
		.await?;
		Ok(ok(TransactionView::for_user(transaction, sender)))
	}

	pub async fn top_up<R: Repository + 'static>(
		state: web::Data<AppState<R>>,
		claims: web::ReqData<Claims>,
		req: web::Json<InitiateTransactionRequest>,
	) -> Result<HttpResponse, AppError> {
		let owner = claims.user_id()?;
		let amount = req.into_inner().amount;
		let initiated: InitiatedPayment =
			blocking(move || state.ledger.top_up(owner, amount)).await?;
		Ok(ok(initiated.checkout))
	}

	pub async fn withdraw<R: Repository + 'static>(
		state: web::Data<AppState<R>>,
		claims: web::ReqData<Claims>,
		req: web::Json<InitiateTransactionRequest>,
	) -> Result<HttpResponse, AppError> {
		let owner = claims.user_id()?;
		let amount = req.into_inner().amount;
		let initiated: InitiatedPayment =
			blocking(move || state.ledger.withdraw(owner, amount)).await?;
		Ok(ok(initiated.checkout))
	}

	pub async fn verify<R: Repository + 'static>(
		state: web::Data<AppState<R>>,
		claims: web::ReqData<Claims>,
		req: web::Json<VerifyTransactionRequest>,
	) -> Result<HttpResponse, AppError> {
		validated(&*req)?;
		let owner = claims.user_id()?;
		let payment_id = req.into_inner().payment_id;
		let transaction = blocking(move || state.ledger.verify(owner, &payment_id)).await?;
		Ok(ok(TransactionView::for_user(transaction, owner)))
	}
}
