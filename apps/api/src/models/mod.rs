pub mod analysis;
pub mod assessment;
