mod accounts;
mod auth;
mod auth_routes;
mod config;
mod constants;
mod db;
mod error;
mod handler;
mod ledger;
mod midware;
mod models;
mod schema;
mod services;
mod store;
#[cfg(test)]
mod tests;
mod transaction_routes;
mod user_routes;

use accounts::Accounts;
use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use config::Config;
use env_logger::Env;
use handler::AppState;
use ledger::Ledger;
use midware::jwt::{Authentication, JWT};
use services::{email::SmtpNotifier, karma::KarmaClient, payment::SandboxPaymentRail};
use std::sync::Arc;
use store::pg::PgRepository;

#[derive(Parser, Debug)]
#[command(name = "wallet-ledger", about = "Wallet ledger backend")]
struct Cli {
	/// Address to listen on, overrides SOCKET_URL.
	#[arg(long)]
	bind: Option<String>,

	/// Apply pending migrations and exit.
	#[arg(long)]
	migrate_only: bool,
}

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	let config = Config::from_env()?;
	env_logger::init_from_env(Env::default().default_filter_or("info"));

	let pool = db::get_db_pool(&config)?;
	db::init(&pool).context("Unable to initialize the db")?;
	if cli.migrate_only {
		log::info!("Migrations applied, exiting");
		return Ok(());
	}

	let repo = PgRepository::new(pool);
	let jwt = JWT::new(&config.jwt_secret, config.jwt_expiration_secs);
	// Built outside the async runtime: the blocking HTTP client must not be created or
	// dropped on an async worker.
	let blacklist = Arc::new(KarmaClient::new(&config.karma_base_url, &config.karma_api_key)?);
	let notifier = Arc::new(SmtpNotifier::new(&config.smtp)?);
	let payments = Arc::new(SandboxPaymentRail::new(&config.checkout_base_url));

	let state = web::Data::new(AppState {
		ledger: Ledger::new(repo.clone(), payments, config.per_page),
		accounts: Accounts::new(repo, blacklist, notifier, jwt.clone()),
	});

	let sock_url = cli.bind.unwrap_or_else(|| config.socket_url.clone());
	log::info!("Listening on: {}..", sock_url);

	let server_state = state.clone();
	actix_web::rt::System::new().block_on(async move {
		HttpServer::new(move || {
			App::new()
				.app_data(server_state.clone())
				.wrap(Authentication::new(jwt.clone()))
				.wrap(
					Cors::default()
						.allow_any_origin()
						.allow_any_method()
						.allow_any_header()
						.supports_credentials()
						.max_age(3600),
				)
				.wrap(actix_web::middleware::Logger::default())
				.configure(auth_routes::init::<PgRepository>)
				.configure(user_routes::init::<PgRepository>)
				.configure(transaction_routes::init::<PgRepository>)
		})
		.bind(&sock_url)?
		.run()
		.await
	})?;

	drop(state);
	Ok(())
}
