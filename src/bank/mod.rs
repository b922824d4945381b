//! The mock bank feed and the endpoints that pull it into the database.

mod demo_endpoint;
mod statement;
mod sync;
mod sync_endpoint;

pub use demo_endpoint::generate_demo_data_endpoint;
pub use statement::{StatementEntry, generate_monthly_statement};
pub use sync::ingest_statement;
pub use sync_endpoint::sync_linked_account_endpoint;
