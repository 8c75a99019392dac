pub mod fee_profile;
pub mod payment;
pub mod user;

pub use fee_profile::{
    EffectiveFees, FeeProfile, DEFAULT_ADMISSION_FEE, DEFAULT_ANNUAL_CHARGES, DEFAULT_MONTHLY_FEE,
};
pub use payment::{
    NewPaymentRecord, PaymentRecord, UpdatePaymentRecord, CLASS_CATEGORIES, PAYMENT_METHODS,
};
pub use user::{Role, User};
