use serde::Serialize;
use sqlx::FromRow;

/// Bed status marker for an available bed.
pub const STATUS_VACANT: &str = "vacant";

/// The three fixed ward categories, each backed by its own bed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WardCategory {
    Ccu,
    Iccu,
    NormalWard,
}

impl WardCategory {
    pub const ALL: [WardCategory; 3] =
        [WardCategory::Ccu, WardCategory::Iccu, WardCategory::NormalWard];

    /// Bed inventory table for this category.
    pub fn table(self) -> &'static str {
        match self {
            WardCategory::Ccu => "ccu_beds",
            WardCategory::Iccu => "iccu_beds",
            WardCategory::NormalWard => "normal_ward_beds",
        }
    }

    /// Human-readable ward name used to tag combined listings.
    pub fn label(self) -> &'static str {
        match self {
            WardCategory::Ccu => "CCU",
            WardCategory::Iccu => "ICCU",
            WardCategory::NormalWard => "Normal Ward",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Bed {
    pub bed_id: i64,
    pub status: String,
}

/// A vacant bed tagged with its originating ward.
#[derive(Debug, Clone, Serialize)]
pub struct VacantBed {
    pub ward: &'static str,
    pub bed_id: i64,
}
