pub mod loader;
pub mod types;

pub use loader::{load_dataset, read_dataset, save_regional_dataset};
pub use types::{Dataset, Indicator, IndicatorRow};
