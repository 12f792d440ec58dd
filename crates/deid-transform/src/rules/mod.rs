//! Built-in rules.

mod age_band;
mod postcode;
mod trim_to_three;
mod trim_to_two;

pub use age_band::{AgeBandRule, AgeInput, band_label};
pub use postcode::is_uk_postcode;
pub use trim_to_three::PostCodeTrimToThreeRule;
pub use trim_to_two::{DEFAULT_MIN_GROUP_SIZE, PostCodeTrimToTwoRule};
