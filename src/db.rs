use crate::config::Config;
use anyhow::Context;
use diesel::{
	prelude::*,
	r2d2::{self, ConnectionManager},
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub fn get_db_pool(config: &Config) -> anyhow::Result<DbPool> {
	let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
	r2d2::Pool::builder()
		.max_size(config.pool_size)
		.build(manager)
		.context("Failed to create pool.")
}

pub fn init(pool: &DbPool) -> anyhow::Result<()> {
	let mut conn = pool.get().context("can not get a connection from the pool")?;
	let applied = conn.run_pending_migrations(MIGRATIONS).map_err(anyhow::Error::msg)?;
	for version in applied {
		log::info!("Applied migration {}", version);
	}
	Ok(())
}
