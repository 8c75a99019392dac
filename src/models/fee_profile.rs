use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const DEFAULT_MONTHLY_FEE: i64 = 2000;
pub const DEFAULT_ANNUAL_CHARGES: i64 = 5000;
pub const DEFAULT_ADMISSION_FEE: i64 = 1000;

/// Per-student fee settings, keyed by the derived student identifier within
/// a school scope. Editing the name or class re-derives the key and moves
/// the profile.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct FeeProfile {
    pub school: String,
    pub student_id: String,
    pub student_name: String,
    pub class_category: String,
    pub monthly_fee: i64,
    pub annual_charges: i64,
    pub admission_fee: i64,
    pub updated_at: String,
}

/// The amounts a payment form should be pre-filled with: the student's
/// profile when one exists, otherwise the school-wide defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EffectiveFees {
    pub monthly_fee: i64,
    pub annual_charges: i64,
    pub admission_fee: i64,
}

impl Default for EffectiveFees {
    fn default() -> Self {
        Self {
            monthly_fee: DEFAULT_MONTHLY_FEE,
            annual_charges: DEFAULT_ANNUAL_CHARGES,
            admission_fee: DEFAULT_ADMISSION_FEE,
        }
    }
}

impl From<&FeeProfile> for EffectiveFees {
    fn from(profile: &FeeProfile) -> Self {
        Self {
            monthly_fee: profile.monthly_fee,
            annual_charges: profile.annual_charges,
            admission_fee: profile.admission_fee,
        }
    }
}
