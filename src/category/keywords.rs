//! The static category-to-keyword table used for auto-categorization.

/// An ordered mapping from category name to lowercase keyword substrings.
///
/// Declaration order matters: categories earlier in the table win when a
/// description contains keywords from more than one category.
pub type KeywordTable = &'static [(&'static str, &'static [&'static str])];

/// Keywords for well-known Indian vendors and merchants, grouped by category.
pub const CATEGORY_KEYWORDS: KeywordTable = &[
    (
        "Food & Drink",
        &[
            "zomato",
            "swiggy",
            "mcdonalds",
            "mcd",
            "starbucks",
            "cafe coffee day",
            "ccd",
            "dominos",
            "pizza hut",
            "eatsure",
            "burger king",
            "kfc",
            "subway",
            "dunkin",
        ],
    ),
    (
        "Groceries",
        &[
            "bigbasket",
            "blinkit",
            "zepto",
            "grofers",
            "jiomart",
            "dmart",
            "reliance fresh",
            "more",
            "spencers",
            "nature basket",
            "star bazaar",
        ],
    ),
    (
        "Fuel",
        &[
            "indian oil",
            "ioc",
            "hpcl",
            "hindustan petroleum",
            "bharat petroleum",
            "bpcl",
            "shell",
            "essar",
            "reliance petroleum",
            "petrol",
            "diesel",
            "fuel",
        ],
    ),
    (
        "Subscriptions",
        &[
            "netflix",
            "spotify",
            "prime video",
            "amazon prime",
            "hotstar",
            "disney",
            "jiocinema",
            "sonyliv",
            "zee5",
            "apple music",
            "youtube premium",
            "voot",
        ],
    ),
    (
        "Utilities",
        &[
            "bses",
            "tata power",
            "bescom",
            "adani electricity",
            "airtel",
            "jio",
            "vodafone",
            "vi",
            "bsnl",
            "mtnl",
            "electricity",
            "water bill",
            "gas bill",
            "piped gas",
            "indraprastha gas",
            "mahanagar gas",
        ],
    ),
    (
        "Transport",
        &[
            "ola",
            "uber",
            "rapido",
            "redbus",
            "irctc",
            "metro",
            "delhi metro",
            "mumbai metro",
            "bangalore metro",
            "namma metro",
            "makemytrip",
            "goibibo",
            "yatra",
        ],
    ),
    (
        "Shopping",
        &[
            "amazon",
            "flipkart",
            "myntra",
            "meesho",
            "ajio",
            "nykaa",
            "reliance digital",
            "croma",
            "vijay sales",
            "lifestyle",
            "westside",
            "max fashion",
            "pantaloons",
        ],
    ),
    (
        "Payments",
        &[
            "paytm", "phonepe", "gpay", "google pay", "bhim", "upi", "mobikwik",
        ],
    ),
    (
        "Rent/EMI",
        &[
            "rent",
            "emi",
            "housing loan",
            "home loan",
            "hdfc",
            "icici",
            "sbi",
            "axis",
        ],
    ),
];
