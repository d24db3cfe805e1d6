mod aggregate;
mod ledger;
mod money;
mod period;
mod table;
mod transaction;

pub use aggregate::*;
pub use ledger::*;
pub use money::*;
pub use period::*;
pub use table::*;
pub use transaction::*;
