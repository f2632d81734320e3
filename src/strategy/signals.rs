use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of recommendation labels emitted by the analysis layers and
/// by the classifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    StrongBuy,
    Buy,
    WeakBuy,
    Hold,
    WeakSell,
    Sell,
    StrongSell,
    Neutral,
}

impl Recommendation {
    pub const ALL: [Recommendation; 8] = [
        Recommendation::StrongBuy,
        Recommendation::Buy,
        Recommendation::WeakBuy,
        Recommendation::Hold,
        Recommendation::WeakSell,
        Recommendation::Sell,
        Recommendation::StrongSell,
        Recommendation::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "STRONG_BUY",
            Recommendation::Buy => "BUY",
            Recommendation::WeakBuy => "WEAK_BUY",
            Recommendation::Hold => "HOLD",
            Recommendation::WeakSell => "WEAK_SELL",
            Recommendation::Sell => "SELL",
            Recommendation::StrongSell => "STRONG_SELL",
            Recommendation::Neutral => "NEUTRAL",
        }
    }

    /// Exact, case-insensitive match against the canonical labels.
    pub fn from_label(label: &str) -> Option<Self> {
        let upper = label.trim().to_ascii_uppercase();
        Self::ALL.iter().copied().find(|rec| rec.as_str() == upper)
    }

    pub fn family(&self) -> SignalFamily {
        SignalFamily::classify(self.as_str())
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Directional family of a recommendation label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalFamily {
    Buy,
    Sell,
    Neutral,
}

impl SignalFamily {
    /// Substring rule: anything containing "BUY" is buy-side, otherwise
    /// anything containing "SELL" is sell-side, everything else is neutral.
    /// Applies to arbitrary upstream labels, not only the canonical ones.
    pub fn classify(label: &str) -> Self {
        let upper = label.to_ascii_uppercase();
        if upper.contains("BUY") {
            SignalFamily::Buy
        } else if upper.contains("SELL") {
            SignalFamily::Sell
        } else {
            SignalFamily::Neutral
        }
    }

    pub fn direction(&self) -> i8 {
        match self {
            SignalFamily::Buy => 1,
            SignalFamily::Sell => -1,
            SignalFamily::Neutral => 0,
        }
    }
}

impl fmt::Display for SignalFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalFamily::Buy => write!(f, "BUY"),
            SignalFamily::Sell => write!(f, "SELL"),
            SignalFamily::Neutral => write!(f, "HOLD"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strength {
    Weak,
    Moderate,
    Strong,
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strength::Weak => write!(f, "WEAK"),
            Strength::Moderate => write!(f, "MODERATE"),
            Strength::Strong => write!(f, "STRONG"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parsing_is_case_insensitive() {
        assert_eq!(Recommendation::from_label("strong_buy"), Some(Recommendation::StrongBuy));
        assert_eq!(Recommendation::from_label(" Hold "), Some(Recommendation::Hold));
        assert_eq!(Recommendation::from_label("ACCUMULATE"), None);
        assert_eq!(Recommendation::from_label(""), None);
    }

    #[test]
    fn test_family_substring_rules() {
        assert_eq!(SignalFamily::classify("weak_buy"), SignalFamily::Buy);
        assert_eq!(SignalFamily::classify("STRONG_SELL"), SignalFamily::Sell);
        assert_eq!(SignalFamily::classify("NEUTRAL"), SignalFamily::Neutral);
        assert_eq!(SignalFamily::classify("BUYBACK"), SignalFamily::Buy);
        assert_eq!(SignalFamily::classify("غير محدد"), SignalFamily::Neutral);
    }

    #[test]
    fn test_canonical_families_match_substring_rule() {
        for rec in Recommendation::ALL {
            let expected = match rec {
                Recommendation::StrongBuy | Recommendation::Buy | Recommendation::WeakBuy => {
                    SignalFamily::Buy
                }
                Recommendation::StrongSell | Recommendation::Sell | Recommendation::WeakSell => {
                    SignalFamily::Sell
                }
                Recommendation::Hold | Recommendation::Neutral => SignalFamily::Neutral,
            };
            assert_eq!(rec.family(), expected, "{}", rec);
        }
    }

    #[test]
    fn test_serde_labels() {
        let json = serde_json::to_string(&Recommendation::StrongSell).unwrap();
        assert_eq!(json, "\"STRONG_SELL\"");
        assert_eq!(Recommendation::StrongSell.to_string(), "STRONG_SELL");
    }
}
