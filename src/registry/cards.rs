use rust_decimal::Decimal;

use super::profile::{CardProfile, CategoryRule, ColumnMapping};

fn rule(name: &str, percentage: i64, limit: i64, keywords: &[&str]) -> CategoryRule {
    CategoryRule::new(name, Decimal::from(percentage), Decimal::from(limit), keywords)
}

/// Cards shipped with the crate, in display order.
pub(super) fn builtin_profiles() -> Vec<CardProfile> {
    vec![
        CardProfile {
            key: "cardA".to_string(),
            name: "Axis AIRTEL cc".to_string(),
            categories: vec![
                rule("Airtel 25%", 25, 250, &["airtel broadband", "airtel"]),
                rule("Utility 10%", 10, 250, &["electricity", "gas", "jio", "vi"]),
                rule("Preferred merchant 10%", 10, 500, &["big basket", "zomato", "swiggy"]),
            ],
            columns: ColumnMapping::default(),
        },
        CardProfile {
            key: "cardB".to_string(),
            name: "SBI Cashback cc".to_string(),
            categories: vec![rule("Online", 5, 5000, &["papa", "grocery"])],
            columns: ColumnMapping::default(),
        },
    ]
}
