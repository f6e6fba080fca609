use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Business-data intent detected from the customer's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Order,
    Inventory,
    Product,
}

const ORDER_KEYWORDS: &[&str] = &[
    "order", "delivery", "shipment", "tracking", "parcel", "অর্ডার", "ডেলিভারি", "পার্সেল",
];
const INVENTORY_KEYWORDS: &[&str] = &[
    "stock", "inventory", "available", "availability", "স্টক", "আছে কি", "পাওয়া যাবে",
];
const PRODUCT_KEYWORDS: &[&str] = &[
    "product", "price", "cost", "catalog", "পণ্য", "প্রোডাক্ট", "দাম", "মূল্য",
];

impl Intent {
    /// Keyword heuristic; order lookups win over inventory, inventory over product.
    pub fn detect(text: &str) -> Option<Intent> {
        let lowered = text.to_lowercase();
        let matches = |keywords: &[&str]| keywords.iter().any(|k| lowered.contains(k));

        if matches(ORDER_KEYWORDS) {
            Some(Intent::Order)
        } else if matches(INVENTORY_KEYWORDS) {
            Some(Intent::Inventory)
        } else if matches(PRODUCT_KEYWORDS) {
            Some(Intent::Product)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Order => "order",
            Intent::Inventory => "inventory",
            Intent::Product => "product",
        }
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order" => Ok(Intent::Order),
            "inventory" => Ok(Intent::Inventory),
            "product" => Ok(Intent::Product),
            other => Err(format!("Unknown intent: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_english_and_bangla() {
        assert_eq!(Intent::detect("Where is my ORDER #123?"), Some(Intent::Order));
        assert_eq!(Intent::detect("আমার অর্ডার কোথায়?"), Some(Intent::Order));
        assert_eq!(Intent::detect("Is the blue shirt in stock"), Some(Intent::Inventory));
        assert_eq!(Intent::detect("এই পণ্যের দাম কত?"), Some(Intent::Product));
        assert_eq!(Intent::detect("hello there"), None);
    }

    #[test]
    fn test_order_takes_precedence() {
        assert_eq!(
            Intent::detect("order status for the product I bought"),
            Some(Intent::Order)
        );
    }
}
