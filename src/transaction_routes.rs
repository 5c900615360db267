use crate::{handler::TransactionHandler, store::Repository};
use actix_web::web;

pub fn init<R: Repository + 'static>(cfg: &mut web::ServiceConfig) {
	cfg.route("/transaction/transfer", web::post().to(TransactionHandler::transfer::<R>))
		.route("/transaction/topup", web::post().to(TransactionHandler::top_up::<R>))
		.route("/transaction/withdraw", web::post().to(TransactionHandler::withdraw::<R>))
		.route("/transaction/verify", web::post().to(TransactionHandler::verify::<R>));
}
