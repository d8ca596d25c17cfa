use std::sync::Arc;

use cine_service::CineService;
use cine_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<CineService>,
}
impl AppState {
	pub async fn new(config: cine_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		Ok(Self::from_service(CineService::new(config, db)))
	}

	pub fn from_service(service: CineService) -> Self {
		Self { service: Arc::new(service) }
	}
}
