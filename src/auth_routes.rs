use crate::{handler::AuthHandler, store::Repository};
use actix_web::web;

pub fn init<R: Repository + 'static>(cfg: &mut web::ServiceConfig) {
	cfg
		// public
		.route("/auth/sign-up", web::post().to(AuthHandler::sign_up::<R>))
		.route("/auth/verification/email", web::patch().to(AuthHandler::verify_email::<R>))
		.route("/auth/sign-in", web::post().to(AuthHandler::sign_in::<R>))
		// signed in
		.route("/auth/update/email", web::put().to(AuthHandler::update_email::<R>))
		.route("/auth/password", web::post().to(AuthHandler::verify_password::<R>));
}
