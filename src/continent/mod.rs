//! Country name → continent resolution.

pub mod builtin;
pub mod cache;
pub mod classifier;
pub mod http;
pub mod label;
pub mod overrides;
pub mod resolver;
pub mod tagging;

pub use builtin::BuiltinClassifier;
pub use cache::{CacheConfig, CacheStats, Resolution, ResolutionCache};
pub use classifier::{Classification, Classifier, ContinentClassifier};
pub use http::HttpClassifier;
pub use label::ContinentLabel;
pub use overrides::{OverrideIndex, OverrideTable};
pub use resolver::ContinentResolver;
pub use tagging::{RegionalDataset, ResolutionReport, TaggedRow};
