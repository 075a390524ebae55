use std::sync::Arc;

use crate::config::Config;
use crate::services::{DashboardService, SalesService, ScannerService};
use crate::store::TicketStore;
use crate::utils::Clock;

/// Services shared by every handler. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub scanner: ScannerService,
    pub sales: SalesService,
    pub dashboard: DashboardService,
}

impl AppState {
    pub fn new(store: Arc<dyn TicketStore>, clock: Arc<dyn Clock>, config: &Config) -> Self {
        Self {
            scanner: ScannerService::new(store.clone(), clock.clone()),
            sales: SalesService::new(store.clone()),
            dashboard: DashboardService::new(store, clock)
                .with_default_activity_limit(config.recent_activity_limit),
        }
    }
}
