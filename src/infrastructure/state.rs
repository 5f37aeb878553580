use std::sync::Arc;

use crate::infrastructure::config::Config;
use crate::schema::{build_schema, DiceSchema};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub schema: DiceSchema,
}

impl AppState {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            schema: build_schema(),
        }
    }
}
