pub mod approval;
pub mod hours;
pub mod macros;
pub mod org;
pub mod query;
pub mod report;
pub mod time_entry;
pub mod user;
pub mod validation;
pub mod weekly;

pub use approval::*;
pub use hours::*;
pub use org::*;
pub use query::*;
pub use report::*;
pub use time_entry::*;
pub use user::*;
pub use validation::*;
pub use weekly::*;
