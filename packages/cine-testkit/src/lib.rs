mod error;

pub use error::{Error, Result};

use std::{env, str::FromStr, thread};

use sqlx::{
	ConnectOptions, Connection, Executor,
	postgres::{PgConnectOptions, PgConnection},
};
use tokio::runtime::Builder;
use uuid::Uuid;

const ADMIN_DATABASES: [&str; 2] = ["postgres", "template1"];
const CATALOG_SCHEMA: &str = include_str!("../sql/catalog.sql");
const SAMPLE_CATALOG: &str = include_str!("../sql/sample_catalog.sql");

pub struct TestDatabase {
	name: String,
	dsn: String,
	admin_options: PgConnectOptions,
	cleaned: bool,
}
impl TestDatabase {
	/// Creates a uniquely named database and loads the reference catalog schema into it.
	pub async fn new(base_dsn: &str) -> Result<Self> {
		let base_options: PgConnectOptions = PgConnectOptions::from_str(base_dsn)
			.map_err(|err| Error::Message(format!("Failed to parse CINE_PG_DSN: {err}.")))?;
		let (admin_options, mut admin_conn) = connect_admin(&base_options).await?;
		let name = format!("cine_test_{}", Uuid::new_v4().simple());
		let create_sql = format!(r#"CREATE DATABASE "{}""#, name);

		admin_conn
			.execute(create_sql.as_str())
			.await
			.map_err(|err| Error::Message(format!("Failed to create test database: {err}.")))?;

		let options = base_options.clone().database(&name);
		let dsn = options.to_url_lossy().to_string();
		let db = Self { name, dsn, admin_options, cleaned: false };
		let mut conn = PgConnection::connect_with(&options).await?;

		bootstrap_schema(&mut conn).await?;

		Ok(db)
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	pub async fn connect(&self) -> Result<PgConnection> {
		let options = PgConnectOptions::from_str(&self.dsn)?;

		Ok(PgConnection::connect_with(&options).await?)
	}

	/// Loads the six-movie catalog documented in `sql/sample_catalog.sql`.
	pub async fn load_sample_catalog(&self) -> Result<()> {
		let mut conn = self.connect().await?;

		execute_script(&mut conn, SAMPLE_CATALOG).await
	}

	pub async fn cleanup(mut self) -> Result<()> {
		self.cleanup_inner().await
	}

	async fn cleanup_inner(&mut self) -> Result<()> {
		if self.cleaned {
			return Ok(());
		}

		cleanup_database(&self.name, &self.admin_options).await?;

		self.cleaned = true;

		Ok(())
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if self.cleaned {
			return;
		}

		let name = self.name.clone();
		let admin_options = self.admin_options.clone();
		let cleanup_thread = thread::spawn(move || {
			let runtime = match Builder::new_current_thread().enable_all().build() {
				Ok(runtime) => runtime,
				Err(err) => {
					eprintln!("Test database cleanup failed: {err}.");

					return;
				},
			};

			if let Err(err) = runtime.block_on(cleanup_database(&name, &admin_options)) {
				eprintln!("Test database cleanup failed: {err}.");
			}
		});
		let _ = cleanup_thread.join();
	}
}

pub fn env_dsn() -> Option<String> {
	env::var("CINE_PG_DSN").ok()
}

/// Executes a script of `;`-separated statements, one at a time.
pub async fn execute_script(conn: &mut PgConnection, script: &str) -> Result<()> {
	for statement in script.split(';') {
		let trimmed = statement.trim();

		if trimmed.lines().all(|line| line.trim().is_empty() || line.trim().starts_with("--")) {
			continue;
		}

		sqlx::query(trimmed).execute(&mut *conn).await?;
	}

	Ok(())
}

async fn bootstrap_schema(conn: &mut PgConnection) -> Result<()> {
	execute_script(conn, CATALOG_SCHEMA).await
}

async fn connect_admin(
	base_options: &PgConnectOptions,
) -> Result<(PgConnectOptions, PgConnection)> {
	let mut last_err = None;

	for database in ADMIN_DATABASES {
		let options = base_options.clone().database(database);

		match PgConnection::connect_with(&options).await {
			Ok(conn) => return Ok((options, conn)),
			Err(err) => {
				last_err = Some(err);
			},
		}
	}

	Err(Error::Message(format!("Failed to connect to an admin database: {last_err:?}.")))
}

async fn cleanup_database(name: &str, admin_options: &PgConnectOptions) -> Result<()> {
	let mut conn = PgConnection::connect_with(admin_options).await.map_err(|err| {
		Error::Message(format!("Failed to connect to admin database for cleanup: {err}."))
	})?;
	let drop_sql = format!(r#"DROP DATABASE IF EXISTS "{}""#, name);
	let _ = sqlx::query(
		"\
SELECT pg_terminate_backend(pid)
FROM pg_stat_activity
WHERE datname = $1 AND pid <> pg_backend_pid()",
	)
	.bind(name)
	.fetch_all(&mut conn)
	.await;

	sqlx::query(drop_sql.as_str())
		.execute(&mut conn)
		.await
		.map_err(|err| Error::Message(format!("Failed to drop test database: {err}.")))?;

	Ok(())
}
