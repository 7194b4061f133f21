//! Ordered keyword rules mapping a headline to a coarse topic tag.
//!
//! Matching is lowercase substring containment and nothing more: no
//! punctuation stripping, no tokenization. Short keywords can therefore hit
//! inside longer words ("eps", "rate"); that is kept behavior from the
//! original rule table, not something to correct here.

use serde::{Deserialize, Serialize};

/// Coarse topic tag attached to every collected headline.
///
/// Serializes to the lowercase tag used in the persisted news file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Earnings,
    Tech,
    Crypto,
    Fed,
    Energy,
    Market,
}

impl Category {
    /// Uppercase display label matching the tag.
    pub fn label(self) -> &'static str {
        match self {
            Category::Earnings => "EARNINGS",
            Category::Tech => "TECH",
            Category::Crypto => "CRYPTO",
            Category::Fed => "FED",
            Category::Energy => "ENERGY",
            Category::Market => "MARKET",
        }
    }

    /// Lowercase tag string, identical to the serialized form.
    pub fn tag(self) -> &'static str {
        match self {
            Category::Earnings => "earnings",
            Category::Tech => "tech",
            Category::Crypto => "crypto",
            Category::Fed => "fed",
            Category::Energy => "energy",
            Category::Market => "market",
        }
    }
}

struct Rule {
    keywords: &'static [&'static str],
    category: Category,
}

// Declaration order is the tie-break: the first rule with any matching
// keyword wins and remaining rules are not consulted. The fed rule sits
// ahead of tech because "ai" substring-matches inside words like "raises".
const RULES: &[Rule] = &[
    Rule {
        keywords: &["earnings", "revenue", "profit", "eps", "quarterly", "guidance"],
        category: Category::Earnings,
    },
    Rule {
        keywords: &["fed", "fomc", "rate", "inflation", "powell", "central bank", "treasury"],
        category: Category::Fed,
    },
    Rule {
        keywords: &["tech", "ai", "chip", "software", "cloud", "semiconductor", "apple", "google", "microsoft", "nvidia"],
        category: Category::Tech,
    },
    Rule {
        keywords: &["crypto", "bitcoin", "btc", "ethereum", "blockchain", "token", "coinbase"],
        category: Category::Crypto,
    },
    Rule {
        keywords: &["oil", "energy", "gas", "opec", "crude", "solar", "barrel"],
        category: Category::Energy,
    },
];

/// Classify a headline. Falls back to [`Category::Market`] when no rule
/// matches.
pub fn categorize(headline: &str) -> Category {
    let text = headline.to_lowercase();
    for rule in RULES {
        if rule.keywords.iter().any(|kw| text.contains(kw)) {
            return rule.category;
        }
    }
    Category::Market
}
