use sea_orm::{
    ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    sea_query::{Expr, Func},
};
use serde::Serialize;

use crate::{
    client::DbClient,
    entities::{drug_history_events, drugs},
};

/// A drug together with its full, ordered history.
#[derive(Debug, Clone, Serialize)]
pub struct DrugVerification {
    pub drug: drugs::Model,
    pub history: Vec<drug_history_events::Model>,
}

impl DbClient {
    pub async fn find_drug(&self, drug_id: &str) -> Result<Option<drugs::Model>, DbErr> {
        drugs::Entity::find_by_id(drug_id.to_owned())
            .one(&self.primary)
            .await
    }

    pub async fn list_drugs(&self) -> Result<Vec<drugs::Model>, DbErr> {
        drugs::Entity::find()
            .order_by_asc(drugs::Column::Id)
            .all(&self.primary)
            .await
    }

    /// Drugs currently held by `owner`. Addresses compare case-insensitively.
    pub async fn find_drugs_by_owner(&self, owner: &str) -> Result<Vec<drugs::Model>, DbErr> {
        drugs::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(drugs::Column::CurrentOwnerAddress)))
                    .eq(owner.to_lowercase()),
            )
            .order_by_asc(drugs::Column::Id)
            .all(&self.primary)
            .await
    }

    pub async fn find_drugs_by_manufacturer(
        &self,
        manufacturer: &str,
    ) -> Result<Vec<drugs::Model>, DbErr> {
        drugs::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(drugs::Column::ManufacturerAddress)))
                    .eq(manufacturer.to_lowercase()),
            )
            .order_by_asc(drugs::Column::Id)
            .all(&self.primary)
            .await
    }

    /// History of one drug in chain order.
    pub async fn drug_history(
        &self,
        drug_id: &str,
    ) -> Result<Vec<drug_history_events::Model>, DbErr> {
        drug_history_events::Entity::find()
            .filter(drug_history_events::Column::DrugId.eq(drug_id))
            .order_by_asc(drug_history_events::Column::BlockNumber)
            .order_by_asc(drug_history_events::Column::LogIndex)
            .all(&self.primary)
            .await
    }

    pub async fn verify_drug(&self, drug_id: &str) -> Result<Option<DrugVerification>, DbErr> {
        let Some(drug) = self.find_drug(drug_id).await? else {
            return Ok(None);
        };
        let history = self.drug_history(drug_id).await?;

        Ok(Some(DrugVerification { drug, history }))
    }
}
