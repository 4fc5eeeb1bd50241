use distcalc_core::Config;
use distcalc_scheduler::SessionStore;

pub struct AppState {
    pub sessions: SessionStore,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let sessions =
            SessionStore::with_tolerance(config.operations, config.server.verify_tolerance);
        Self { sessions, config }
    }
}
