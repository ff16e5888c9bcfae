use sea_orm::DatabaseConnection;

/// Shared handle to the indexer's store. Cloned into the progress tracker,
/// the projector and the reader API.
#[derive(Clone, Debug)]
pub struct DbClient {
    pub primary: DatabaseConnection,
}

impl DbClient {
    pub fn new(primary: DatabaseConnection) -> Self {
        Self { primary }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.primary
    }
}
