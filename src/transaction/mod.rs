//! Transactions: the core model, scope-filtered queries, the transactions
//! page, and manual categorization.

mod categorize_endpoint;
mod core;
mod query;
mod transactions_page;

pub use categorize_endpoint::set_transaction_category_endpoint;
pub use core::{
    Transaction, TransactionBuilder, TransactionId, TransactionKind, assign_category_if_unset,
    count_transactions, create_transaction, create_transaction_table, get_transaction,
    set_transaction_category,
};
pub use query::{
    delete_account_transactions, delete_user_transactions, get_scope_months,
    get_transactions_for_month, statement_entry_exists,
};
pub use transactions_page::get_transactions_page;

pub(crate) use transactions_page::{AccountOption, get_account_options, scope_selector_form};
