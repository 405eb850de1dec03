use pollboard_db::DbPool;
use std::sync::Arc;
use tera::Tera;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub templates: Arc<Tera>,
}

impl AppState {
    pub fn new(db: DbPool) -> anyhow::Result<Self> {
        let templates = Arc::new(crate::templates::engine()?);
        Ok(Self { db, templates })
    }
}
