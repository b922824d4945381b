//! The mock bank feed.
//!
//! There is no real bank or Account Aggregator behind this app: a monthly
//! "statement" is a batch of randomly generated payments to well-known
//! merchants, with amounts spread around each merchant's typical spend.

use rand::{Rng, seq::SliceRandom};
use time::{Date, Month};

/// Typical merchants and their base transaction amounts in rupees.
const MERCHANTS: &[(&str, f64)] = &[
    ("Zomato", 450.0),
    ("Swiggy", 380.0),
    ("McDonald's", 150.0),
    ("Dominos", 400.0),
    ("Starbucks", 250.0),
    ("Cafe Coffee Day", 180.0),
    ("Blinkit", 250.0),
    ("Zepto", 180.0),
    ("Big Basket", 1200.0),
    ("Dmart", 800.0),
    ("Flipkart", 1200.0),
    ("Amazon", 2500.0),
    ("Myntra", 800.0),
    ("Ajio", 600.0),
    ("Uber", 350.0),
    ("Ola", 280.0),
    ("MakeMyTrip", 5000.0),
    ("Electricity Bill", 1800.0),
    ("Water Bill", 400.0),
    ("Internet Bill", 799.0),
    ("Mobile Recharge", 499.0),
    ("Netflix", 199.0),
    ("Spotify", 79.0),
    ("Prime Video", 129.0),
    ("Gym Membership", 500.0),
    ("Rent Payment", 12000.0),
    ("Home Loan EMI", 25000.0),
    ("Petrol Pump", 1500.0),
    ("Shell Gas Station", 1200.0),
    ("BookMyShow", 400.0),
    ("PVR Cinema", 450.0),
    ("Airbnb", 2000.0),
    ("PharmEasy", 150.0),
    ("Apollo Pharmacy", 200.0),
    ("ATM Withdrawal", 5000.0),
    ("Transfer to Friend", 1000.0),
];

/// The smallest amount the feed will produce.
const MINIMUM_AMOUNT: f64 = 50.0;

/// A raw transaction candidate from the bank feed.
///
/// These are not yet stored: the sync path deduplicates candidates against
/// existing transactions before inserting.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementEntry {
    /// The calendar day the payment happened.
    pub date: Date,
    /// The feed's merchant line, e.g. "Payment to Zomato".
    pub description: String,
    /// The non-negative payment amount.
    pub amount: f64,
}

/// Generate a month's worth of statement entries.
///
/// Produces 15 to 25 entries dated between the 1st and the 28th of the month
/// (skipping day 29+ sidesteps short-month issues). Each amount is the
/// merchant's base amount with up to ±30% variance, floored at
/// [MINIMUM_AMOUNT].
pub fn generate_monthly_statement(
    year: i32,
    month: Month,
    rng: &mut impl Rng,
) -> Vec<StatementEntry> {
    let entry_count = rng.gen_range(15..=25);
    let mut entries = Vec::with_capacity(entry_count);

    for _ in 0..entry_count {
        let day = rng.gen_range(1..=28);

        let Ok(date) = Date::from_calendar_date(year, month, day) else {
            continue;
        };

        let Some((merchant, base_amount)) = MERCHANTS.choose(rng) else {
            continue;
        };

        let variance_percent = rng.gen_range(-30..=30);
        let amount = base_amount + base_amount * variance_percent as f64 / 100.0;
        let amount = amount.round().max(MINIMUM_AMOUNT);

        entries.push(StatementEntry {
            date,
            description: format!("Payment to {merchant}"),
            amount,
        });
    }

    entries
}

#[cfg(test)]
mod statement_tests {
    use rand::{SeedableRng, rngs::StdRng};
    use time::Month;

    use super::{MINIMUM_AMOUNT, generate_monthly_statement};

    #[test]
    fn generates_between_15_and_25_entries() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..20 {
            let entries = generate_monthly_statement(2025, Month::March, &mut rng);

            assert!(
                (15..=25).contains(&entries.len()),
                "want 15-25 entries, got {}",
                entries.len()
            );
        }
    }

    #[test]
    fn entries_stay_within_the_requested_month() {
        let mut rng = StdRng::seed_from_u64(42);

        let entries = generate_monthly_statement(2025, Month::February, &mut rng);

        for entry in entries {
            assert_eq!(entry.date.year(), 2025);
            assert_eq!(entry.date.month(), Month::February);
            assert!(entry.date.day() <= 28);
        }
    }

    #[test]
    fn amounts_are_at_least_the_minimum() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..10 {
            for entry in generate_monthly_statement(2025, Month::March, &mut rng) {
                assert!(
                    entry.amount >= MINIMUM_AMOUNT,
                    "amount {} is below the minimum",
                    entry.amount
                );
            }
        }
    }

    #[test]
    fn descriptions_name_a_merchant() {
        let mut rng = StdRng::seed_from_u64(42);

        for entry in generate_monthly_statement(2025, Month::March, &mut rng) {
            assert!(
                entry.description.starts_with("Payment to "),
                "unexpected description {}",
                entry.description
            );
        }
    }
}
