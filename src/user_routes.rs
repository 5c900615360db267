use crate::{handler::UserHandler, store::Repository};
use actix_web::web;

pub fn init<R: Repository + 'static>(cfg: &mut web::ServiceConfig) {
	cfg
		// user profile routes
		.route("/user/my/profile", web::get().to(UserHandler::my_profile::<R>))
		.route("/user/wallet", web::get().to(UserHandler::my_balance::<R>))
		.route("/user/profile/wallet", web::get().to(UserHandler::user_by_wallet_number::<R>))
		.route("/user/profile/id", web::get().to(UserHandler::user_by_id::<R>))
		// history
		.route("/user/transaction/type", web::get().to(UserHandler::transactions_by_type::<R>))
		.route("/user/transaction/all", web::get().to(UserHandler::transactions::<R>))
		.route("/user/transaction/common", web::get().to(UserHandler::common_transactions::<R>));
}
