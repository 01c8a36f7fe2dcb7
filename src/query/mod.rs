pub mod builder;
pub mod defaults;
pub mod error;
pub mod options;
pub mod params;
pub mod parse;

pub use builder::QueryBuilder;
pub use defaults::QueryDefaults;
pub use error::QueryError;
pub use options::{PaginationMeta, QueryOptions};
pub use params::{QueryParams, QueryValue};
