use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// School-wide counts for the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Students whose status is active
    pub total_students: i64,
    pub total_teachers: i64,
    /// Every class row counts as active
    pub active_classes: i64,
    /// Sum of completed payments; zero when there are none
    pub total_fee_collection: Decimal,
}
