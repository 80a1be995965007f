//! fm-core: ethnicity classification and portrait allocation for Football Manager newgens.
//!
//! Reads a player report export, resolves each newgen's ethnic category from
//! its nationality codes, hands out an unused portrait from a per-category
//! image pool and persists the result into the mapping XML the game loads at
//! startup.

pub mod driver;
pub mod ethnic;
pub mod mapping;
pub mod pool;
pub mod report;

pub use driver::*;
pub use ethnic::*;
pub use mapping::*;
pub use pool::*;
pub use report::*;
