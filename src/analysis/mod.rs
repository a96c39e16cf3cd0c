//! Pure computations over the loaded coupon table. Every function here is a
//! function of its inputs only — re-run per interaction, nothing cached.

pub mod abc;
pub mod calendar;
pub mod fee;
pub mod insights;
pub mod promotions;
pub mod rollup;
