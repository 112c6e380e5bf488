//! Ward/bed inventory queries. Three fixed categories, each its own table;
//! the combined vacancy listing concatenates three independent queries and
//! tags each row with its originating ward.

use crate::error::ApiError;
use crate::models::ward::{Bed, VacantBed, WardCategory, STATUS_VACANT};

use super::Database;

impl Database {
    /// Full bed inventory for one ward category.
    pub async fn list_beds(&self, ward: WardCategory) -> Result<Vec<Bed>, ApiError> {
        // Table names come from the fixed category enum, never from input.
        let sql = format!("SELECT bed_id, status FROM {} ORDER BY bed_id", ward.table());
        let beds = sqlx::query_as::<_, Bed>(&sql).fetch_all(&self.pool).await?;
        Ok(beds)
    }

    /// Vacant beds across all three wards. No reservation semantics; the
    /// listing is advisory and may race with a concurrent assignment.
    pub async fn vacant_beds(&self) -> Result<Vec<VacantBed>, ApiError> {
        let mut vacant = Vec::new();

        for ward in WardCategory::ALL {
            let sql = format!(
                "SELECT bed_id, status FROM {} WHERE status = ? ORDER BY bed_id",
                ward.table()
            );
            let beds = sqlx::query_as::<_, Bed>(&sql)
                .bind(STATUS_VACANT)
                .fetch_all(&self.pool)
                .await?;

            vacant.extend(beds.into_iter().map(|bed| VacantBed {
                ward: ward.label(),
                bed_id: bed.bed_id,
            }));
        }

        Ok(vacant)
    }
}
