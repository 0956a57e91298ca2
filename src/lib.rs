pub mod api;
pub mod config;
pub mod db;

pub use db::DbPool;

use config::Config;
use db::EmployeeStore;

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub employees: EmployeeStore,
}

impl AppState {
    pub fn new(config: Config, db: DbPool) -> Self {
        let employees = EmployeeStore::new(db.clone());
        Self {
            config,
            db,
            employees,
        }
    }
}
