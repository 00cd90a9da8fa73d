use std::sync::Arc;

use recap_service::RecapService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<RecapService>,
}
impl AppState {
	pub fn new(config: recap_config::Config) -> color_eyre::Result<Self> {
		let service = RecapService::new(config)?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: RecapService) -> Self {
		Self { service: Arc::new(service) }
	}
}
