use serde::{Deserialize, Serialize};

use super::time::ModifiedJulianDate;

/// One point of the campaign progress curve: how many of the active targets
/// were constrained below the accuracy threshold at `date`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CampaignSample {
    pub date: ModifiedJulianDate,
    /// Targets whose propagated milestone error is below the threshold.
    pub constrained: u32,
    /// Deep-enough targets with at least one observation before `date`.
    pub total: u32,
}
