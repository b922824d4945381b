//! Keyword-based auto-categorization of transaction descriptions.

use rusqlite::Connection;

use crate::{
    Error,
    category::{
        CategoryId,
        core::CategoryLookup,
        keywords::KeywordTable,
    },
    transaction::{Transaction, assign_category_if_unset},
};

/// The result of running the categorizer over a single transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorizeOutcome {
    /// A keyword matched and the category was assigned.
    Assigned(CategoryId),
    /// The transaction already had a category, which is left untouched.
    AlreadyCategorized,
    /// No keyword matched; the transaction stays uncategorized.
    NoMatch,
}

/// Find the category whose keyword list first matches `description`.
///
/// Categories are tried in the declaration order of `keywords`, and within a
/// category its keywords are tried in order. The first keyword appearing
/// anywhere in the lowercased description wins; there is no scoring and no
/// preference for longer matches.
///
/// A category whose name is missing from `lookup` (drift between the static
/// table and the stored categories) is treated as having no match, and the
/// remaining categories are still tried.
pub fn match_category(
    description: &str,
    keywords: KeywordTable,
    lookup: &CategoryLookup,
) -> Option<CategoryId> {
    let description = description.to_lowercase();

    for (category_name, category_keywords) in keywords {
        let Some(category_id) = lookup.get(category_name) else {
            continue;
        };

        if category_keywords
            .iter()
            .any(|keyword| description.contains(keyword))
        {
            return Some(category_id);
        }
    }

    None
}

/// Auto-categorize a transaction, if it does not already have a category.
///
/// Assignment is sticky: a transaction that already has a category (manual
/// or automatic) is left untouched and reported as
/// [CategorizeOutcome::AlreadyCategorized]. The database update is
/// conditional on the category still being unset, so a concurrent writer
/// cannot overwrite an assignment that happened between the read and the
/// write.
///
/// # Errors
/// Returns a [Error::SqlError] if the conditional update fails.
pub fn categorize_transaction(
    transaction: &Transaction,
    keywords: KeywordTable,
    lookup: &CategoryLookup,
    connection: &Connection,
) -> Result<CategorizeOutcome, Error> {
    if transaction.category_id.is_some() {
        return Ok(CategorizeOutcome::AlreadyCategorized);
    }

    let Some(category_id) = match_category(&transaction.description, keywords, lookup) else {
        return Ok(CategorizeOutcome::NoMatch);
    };

    if assign_category_if_unset(transaction.id, category_id, connection)? {
        Ok(CategorizeOutcome::Assigned(category_id))
    } else {
        Ok(CategorizeOutcome::AlreadyCategorized)
    }
}
