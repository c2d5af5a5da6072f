pub mod normalize;
pub mod registry;
pub mod types;

pub use normalize::{normalize, normalize_all};
pub use registry::{ColumnBreakdown, SchemaRegistry};
pub use types::{field_key, Prefix, Record, Role, DATE, YEAR};
