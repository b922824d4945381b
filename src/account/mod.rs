//! Bank accounts: the two historical schema variants, account management
//! endpoints, and the account-scope resolver used by every read path.

mod accounts_page;
mod core;
mod link_endpoint;
mod manage_endpoints;
mod scope;

pub use accounts_page::get_accounts_page;
pub use core::{
    AccountId, AccountRef, BankAccount, LinkedAccount, create_bank_account,
    create_bank_account_table, create_linked_account, create_linked_account_table,
    delete_linked_account, get_bank_account, get_bank_accounts, get_linked_account,
    get_linked_accounts, rename_bank_account, toggle_bank_account_active,
    touch_linked_account_sync,
};
pub use link_endpoint::link_account_endpoint;
pub use manage_endpoints::{
    delete_linked_account_endpoint, rename_account_endpoint, toggle_account_endpoint,
};
pub use scope::{
    AccountSelection, COMBINED_SELECTOR, ResolvedScope, ScopeQuery, TransactionScope,
    parse_account_selector, resolve_scope,
};
