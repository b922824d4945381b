//! Transaction categories and keyword-based auto-categorization.

mod categorizer;
mod core;
mod keywords;

pub use categorizer::{CategorizeOutcome, categorize_transaction, match_category};
pub use core::{
    Category, CategoryId, CategoryLookup, create_category_table, get_all_categories, get_category,
    seed_categories,
};
pub use keywords::{CATEGORY_KEYWORDS, KeywordTable};
