use crate::config::AnalysisConfig;
use crate::store::Pool;

#[derive(Clone)]
pub struct AppState {
    pub pool: Pool,
    pub analysis: AnalysisConfig,
}
