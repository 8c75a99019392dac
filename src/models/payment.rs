use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Class categories offered by the schools this system serves.
pub const CLASS_CATEGORIES: [&str; 13] = [
    "Nursery",
    "KGI",
    "KGII",
    "Class 1",
    "Class 2",
    "Class 3",
    "Class 4",
    "Class 5",
    "Class 6",
    "Class 7",
    "Class 8",
    "Class 9",
    "Class 10 (Matric)",
];

pub const PAYMENT_METHODS: [&str; 5] =
    ["Cash", "Bank Transfer", "Cheque", "Online Payment", "Other"];

/// One row of the per-school payment ledger.
///
/// `month` is a month name for monthly-fee rows, or the `ANNUAL` /
/// `ADMISSION` sentinel. Exactly one of the three fee columns is nonzero on
/// rows written by this system, but edited rows are not re-checked.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: i64,
    pub school: String,
    pub student_id: String,
    pub student_name: String,
    pub class_category: String,
    pub class_section: String,
    pub month: String,
    pub monthly_fee: i64,
    pub annual_charges: i64,
    pub admission_fee: i64,
    pub received_amount: i64,
    pub payment_method: String,
    pub payment_date: String,
    pub signature: String,
    pub entry_timestamp: String,
    pub academic_year: String,
}

/// A ledger row ready for insertion (everything but the rowid and scope).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPaymentRecord {
    pub student_id: String,
    pub student_name: String,
    pub class_category: String,
    pub class_section: String,
    pub month: String,
    pub monthly_fee: i64,
    pub annual_charges: i64,
    pub admission_fee: i64,
    pub received_amount: i64,
    pub payment_method: String,
    pub payment_date: String,
    pub signature: String,
    pub entry_timestamp: String,
    pub academic_year: String,
}

/// Full-row edit from the record-editing view. The student identifier is
/// deliberately left untouched; edits never re-key a row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePaymentRecord {
    pub student_name: String,
    pub class_category: String,
    pub class_section: String,
    pub month: String,
    pub monthly_fee: i64,
    pub annual_charges: i64,
    pub admission_fee: i64,
    pub received_amount: i64,
    pub payment_method: String,
    pub payment_date: String,
    pub signature: String,
    pub entry_timestamp: String,
    pub academic_year: String,
}
