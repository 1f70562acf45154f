//! Relevance filtering, keyword matching and cashback accumulation.

mod amount;
mod date;

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::errors::{CashbackError, CashbackResult};
use crate::registry::{CardProfile, CategoryRule, ColumnMapping};
use crate::types::{ClassificationSummary, ContributingTransaction, RawRow};

pub use amount::parse_amount;
pub use date::{NOT_AVAILABLE, format_date, serial_to_datetime};

const EXPENSE: &str = "expense";

/// Classifies `rows` against `profile` and totals cashback per category.
///
/// Fails without a summary when `rows` is empty or the first row lacks a
/// mapped column. Rows of other accounts, non-expense rows, rows with an
/// unusable amount and rows whose cashback would overflow are skipped.
pub fn classify(rows: &[RawRow], profile: &CardProfile) -> CashbackResult<ClassificationSummary> {
    let first = rows.first().ok_or(CashbackError::EmptyDataset)?;
    check_columns(first, &profile.columns)?;

    let columns = &profile.columns;
    let account_name = fold(&profile.name);
    let mut results = profile.fresh_spend_results();
    let mut relevant_count = 0;

    for (index, row) in rows.iter().enumerate() {
        if !is_relevant(row, columns, &account_name) {
            continue;
        }
        relevant_count += 1;

        let raw_amount = row.text(&columns.amount);
        let Some(amount) = parse_amount(&raw_amount) else {
            debug!(row = index, amount = %raw_amount, "skipping row with unusable amount");
            continue;
        };

        let description = row.text(&columns.description);
        let Some(slot) = match_category(&profile.categories, &description.to_lowercase()) else {
            continue;
        };

        let result = &mut results[slot];
        let Some(cashback) = cashback_for(amount, result.percentage) else {
            debug!(row = index, %amount, "skipping row whose cashback overflows");
            continue;
        };
        let date = format_date(row.get(&columns.date));

        let recorded = result.record(ContributingTransaction {
            id: format!("{index}-{date}-{amount}"),
            date,
            category: text_or_na(row, &columns.category),
            subcategory: text_or_na(row, &columns.subcategory),
            description: text_or_na(row, &columns.description),
            raw_amount,
            amount,
            cashback,
        });
        if !recorded {
            debug!(
                row = index,
                category = %result.name,
                "skipping row whose cashback overflows the category total"
            );
        }
    }

    let summary = ClassificationSummary {
        processed_count: rows.len(),
        relevant_count,
        results,
    };
    info!(
        card = %profile.key,
        processed = summary.processed_count,
        relevant = summary.relevant_count,
        matched = summary.matched_count(),
        "classification finished"
    );

    Ok(summary)
}

/// Verifies that `row` carries every mapped column.
pub fn check_columns(row: &RawRow, columns: &ColumnMapping) -> CashbackResult<()> {
    let missing: Vec<String> = columns
        .iter()
        .filter(|(_, header)| !row.contains_key(header))
        .map(|(field, header)| format!("{} ('{}')", field.label(), header))
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    Err(CashbackError::SchemaMismatch {
        missing,
        found: row.keys().map(str::to_string).collect(),
    })
}

/// Whether the row is an expense booked on the card's account.
pub fn is_relevant(row: &RawRow, columns: &ColumnMapping, account_name: &str) -> bool {
    fold(&row.text(&columns.account)) == account_name
        && fold(&row.text(&columns.transaction_type)) == EXPENSE
}

/// Index of the first category with a keyword inside `description`.
pub fn match_category(categories: &[CategoryRule], description: &str) -> Option<usize> {
    categories
        .iter()
        .position(|rule| rule.first_match(description).is_some())
}

/// `amount × percentage / 100`, or `None` on overflow.
pub fn cashback_for(amount: Decimal, percentage: Decimal) -> Option<Decimal> {
    amount
        .checked_mul(percentage)?
        .checked_div(Decimal::ONE_HUNDRED)
}

fn fold(value: &str) -> String {
    value.trim().to_lowercase()
}

fn text_or_na(row: &RawRow, key: &str) -> String {
    match row.get(key) {
        Some(cell) if !cell.is_blank() => cell.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CardRegistry;
    use crate::types::CellValue;
    use chrono::NaiveDate;
    use rstest::rstest;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn card_a() -> &'static CardProfile {
        CardRegistry::builtin().get_profile("cardA").unwrap()
    }

    fn row(account: &str, kind: &str, note: &str, amount: &str) -> RawRow {
        RawRow::new()
            .with("Date", "2025-01-05")
            .with("Account", account)
            .with("Category", "Bills")
            .with("Subcategory", "Mobile")
            .with("Note", note)
            .with("Amount", amount)
            .with("Income/Expense", kind)
    }

    fn expense(note: &str, amount: &str) -> RawRow {
        row("Axis AIRTEL cc", "Expense", note, amount)
    }

    #[test]
    fn test_matches_keyword_and_computes_cashback() {
        let summary = classify(&[expense("JIO RECHARGE", "100")], card_a()).unwrap();

        let utility = summary.result("Utility 10%").unwrap();
        assert_eq!(utility.cashback, dec("10.00"));
        assert_eq!(utility.contributing_transactions.len(), 1);

        let tx = &utility.contributing_transactions[0];
        assert_eq!(tx.description, "JIO RECHARGE");
        assert_eq!(tx.category, "Bills");
        assert_eq!(tx.subcategory, "Mobile");
        assert_eq!(tx.raw_amount, "100");
        assert_eq!(tx.amount, dec("100"));
        assert_eq!(tx.date, "2025-01-05");
        assert_eq!(tx.id, "0-2025-01-05-100");
    }

    #[test]
    fn test_currency_formatted_amount() {
        let summary = classify(&[expense("jio postpaid", "$1,234.50")], card_a()).unwrap();

        let utility = summary.result("Utility 10%").unwrap();
        assert_eq!(utility.contributing_transactions[0].amount, dec("1234.50"));
        assert_eq!(utility.contributing_transactions[0].raw_amount, "$1,234.50");
        assert_eq!(utility.cashback, dec("123.45"));
    }

    #[rstest]
    #[case("Other Card", "Expense")]
    #[case("Axis AIRTEL cc", "Income")]
    #[case("", "Expense")]
    #[case("Axis AIRTEL cc", "")]
    fn test_irrelevant_rows_are_excluded(#[case] account: &str, #[case] kind: &str) {
        let rows = vec![row(account, kind, "jio recharge", "100")];
        let summary = classify(&rows, card_a()).unwrap();

        assert_eq!(summary.processed_count, 1);
        assert_eq!(summary.relevant_count, 0);
        assert_eq!(summary.matched_count(), 0);
        assert!(summary.total_cashback().is_zero());
    }

    #[rstest]
    #[case("  axis airtel CC ", " EXPENSE")]
    #[case("AXIS AIRTEL CC", "expense\t")]
    fn test_relevance_ignores_case_and_padding(#[case] account: &str, #[case] kind: &str) {
        let summary = classify(&[row(account, kind, "swiggy", "200")], card_a()).unwrap();

        assert_eq!(summary.relevant_count, 1);
        assert_eq!(
            summary.result("Preferred merchant 10%").unwrap().cashback,
            dec("20")
        );
    }

    #[test]
    fn test_first_category_wins() {
        // "airtel" belongs to the first category, "jio" to the second
        let summary = classify(&[expense("Airtel and Jio combo", "400")], card_a()).unwrap();

        assert_eq!(summary.results[0].cashback, dec("100"));
        assert_eq!(summary.results[0].contributing_transactions.len(), 1);
        assert!(summary.results[1].contributing_transactions.is_empty());
        assert!(summary.results[1].cashback.is_zero());
    }

    #[rstest]
    #[case("0")]
    #[case("-250")]
    #[case("n/a")]
    #[case("")]
    fn test_bad_amount_is_relevant_but_earns_nothing(#[case] amount: &str) {
        let summary = classify(&[expense("jio recharge", amount)], card_a()).unwrap();

        assert_eq!(summary.relevant_count, 1);
        assert_eq!(summary.matched_count(), 0);
    }

    #[test]
    fn test_unmatched_description_is_relevant_but_earns_nothing() {
        let summary = classify(&[expense("rent", "25000")], card_a()).unwrap();

        assert_eq!(summary.relevant_count, 1);
        assert_eq!(summary.matched_count(), 0);
    }

    #[test]
    fn test_empty_dataset() {
        let result = classify(&[], card_a());
        assert!(matches!(result, Err(CashbackError::EmptyDataset)));
    }

    #[test]
    fn test_missing_description_column() {
        let mut first = RawRow::new();
        for key in ["Date", "Account", "Category", "Subcategory", "Amount", "Income/Expense"] {
            first.insert(key, "x");
        }
        let rows = vec![first, expense("jio", "100")];

        match classify(&rows, card_a()) {
            Err(CashbackError::SchemaMismatch { missing, found }) => {
                assert_eq!(missing, vec!["description ('Note')".to_string()]);
                assert_eq!(found.len(), 6);
                assert!(found.contains(&"Income/Expense".to_string()));
            }
            other => panic!("expected schema mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_check_reports_every_missing_column() {
        let first = RawRow::new().with("Date", "x").with("Account", "y");

        match check_columns(&first, &card_a().columns) {
            Err(CashbackError::SchemaMismatch { missing, found }) => {
                assert_eq!(missing.len(), 5);
                assert_eq!(missing[0], "category ('Category')");
                assert_eq!(missing[4], "transaction type ('Income/Expense')");
                assert_eq!(found, vec!["Date".to_string(), "Account".to_string()]);
            }
            other => panic!("expected schema mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_check_only_inspects_first_row() {
        let partial = RawRow::new().with("Account", "Axis AIRTEL cc");
        let rows = vec![expense("jio", "100"), partial];

        let summary = classify(&rows, card_a()).unwrap();
        assert_eq!(summary.processed_count, 2);
        assert_eq!(summary.relevant_count, 1);
    }

    #[test]
    fn test_result_order_follows_configuration() {
        let rows = vec![
            expense("zomato", "100"),
            expense("electricity", "100"),
            expense("airtel broadband", "100"),
        ];
        let summary = classify(&rows, card_a()).unwrap();

        let names: Vec<&str> = summary.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Airtel 25%", "Utility 10%", "Preferred merchant 10%"]);
        assert_eq!(summary.total_cashback(), dec("45"));
    }

    #[test]
    fn test_counts_and_uniqueness_over_mixed_input() {
        let rows = vec![
            expense("airtel jio", "100"),
            expense("big basket", "250.75"),
            row("SBI Cashback cc", "Expense", "grocery", "100"),
            expense("jio", "abc"),
            row("Axis AIRTEL cc", "Income", "airtel refund", "50"),
            expense("vi recharge", "299"),
        ];
        let summary = classify(&rows, card_a()).unwrap();

        assert_eq!(summary.processed_count, 6);
        assert_eq!(summary.relevant_count, 4);
        assert!(summary.matched_count() <= summary.relevant_count);
        assert_eq!(summary.matched_count(), 3);

        let mut ids: Vec<&str> = summary
            .results
            .iter()
            .flat_map(|r| r.contributing_transactions.iter().map(|t| t.id.as_str()))
            .collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let rows = vec![expense("jio", "100"), expense("zomato", "$99.90")];

        let first = classify(&rows, card_a()).unwrap();
        let second = classify(&rows, card_a()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_runs_do_not_leak_between_cards() {
        let rows = vec![
            expense("jio", "100"),
            row("SBI Cashback cc", "Expense", "papa grocery", "1000"),
        ];
        let registry = CardRegistry::builtin();

        let a = classify(&rows, registry.get_profile("cardA").unwrap()).unwrap();
        let b = classify(&rows, registry.get_profile("cardB").unwrap()).unwrap();

        assert_eq!(a.total_cashback(), dec("10"));
        assert_eq!(b.results.len(), 1);
        assert_eq!(b.results[0].cashback, dec("50"));
        assert!(registry.fresh_spend_results("cardA").unwrap()[1].cashback.is_zero());
    }

    #[test]
    fn test_numeric_and_date_cells() {
        let mut date_row = expense("jio", "");
        date_row.insert("Amount", 150.0);
        date_row.insert(
            "Date",
            CellValue::Date(NaiveDate::from_ymd_opt(2025, 3, 9).unwrap().and_hms_opt(0, 0, 0).unwrap()),
        );
        let mut serial_row = expense("swiggy", "100");
        serial_row.insert("Date", 45658.0);
        serial_row.insert("Note", "SWIGGY");

        let summary = classify(&[date_row, serial_row], card_a()).unwrap();

        let utility = &summary.results[1].contributing_transactions[0];
        assert_eq!(utility.date, "Mar 9, 2025");
        assert_eq!(utility.raw_amount, "150");
        assert_eq!(utility.cashback, dec("15"));

        let merchant = &summary.results[2].contributing_transactions[0];
        assert_eq!(merchant.date, "Jan 1, 2025");
        assert_eq!(merchant.id, "1-Jan 1, 2025-100");
    }

    #[test]
    fn test_blank_source_text_becomes_na() {
        let mut blank = expense("jio", "100");
        blank.insert("Category", "");
        blank.insert("Subcategory", "");
        blank.insert("Date", "");

        let summary = classify(&[blank], card_a()).unwrap();
        let tx = &summary.results[1].contributing_transactions[0];
        assert_eq!(tx.category, NOT_AVAILABLE);
        assert_eq!(tx.subcategory, NOT_AVAILABLE);
        assert_eq!(tx.date, NOT_AVAILABLE);
    }

    #[test]
    fn test_limit_does_not_cap_accumulation() {
        let summary = classify(&[expense("airtel", "2000")], card_a()).unwrap();

        let airtel = &summary.results[0];
        assert_eq!(airtel.cashback, dec("500"));
        assert!(airtel.is_limit_reached());
        assert_eq!(airtel.limit_progress(), dec("200"));
    }

    #[rstest]
    #[case::product_overflows(&["79228162514264337593543950335"], 0, "0")]
    #[case::total_overflows(
        &["3000000000000000000000000000"; 200],
        105,
        "78750000000000000000000000000"
    )]
    fn test_overflowing_rows_are_skipped(
        #[case] amounts: &[&str],
        #[case] matched: usize,
        #[case] cashback: &str,
    ) {
        let rows: Vec<RawRow> = amounts.iter().map(|a| expense("airtel", a)).collect();
        let summary = classify(&rows, card_a()).unwrap();

        assert_eq!(summary.relevant_count, amounts.len());
        assert_eq!(summary.matched_count(), matched);
        assert_eq!(summary.results[0].cashback, dec(cashback));
    }

    #[rstest]
    #[case::beyond_decimal_range(CellValue::Number(1e30), None)]
    #[case::trailing_currency_code(CellValue::from("100 INR"), Some("25"))]
    #[case::debit_marker(CellValue::from("100.00 Dr"), Some("25"))]
    #[case::underscore_ends_number(CellValue::from("1_000"), Some("0.25"))]
    fn test_amount_cells(#[case] amount: CellValue, #[case] cashback: Option<&str>) {
        let mut airtel = expense("airtel", "");
        airtel.insert("Amount", amount);
        let summary = classify(&[airtel], card_a()).unwrap();

        assert_eq!(summary.relevant_count, 1);
        match cashback {
            Some(cashback) => assert_eq!(summary.results[0].cashback, dec(cashback)),
            None => assert_eq!(summary.matched_count(), 0),
        }
    }

    #[test]
    fn test_rows_after_an_overflow_still_count() {
        let rows = vec![
            expense("airtel", "79228162514264337593543950335"),
            expense("jio", "100"),
        ];
        let summary = classify(&rows, card_a()).unwrap();

        assert_eq!(summary.results[1].cashback, dec("10"));
        assert!(summary.results[0].contributing_transactions.is_empty());
    }

    #[rstest]
    #[case("100", "25", Some("25"))]
    #[case("1234.50", "10", Some("123.45"))]
    #[case("79228162514264337593543950335", "10", None)]
    fn test_cashback_for(#[case] amount: &str, #[case] percentage: &str, #[case] expected: Option<&str>) {
        assert_eq!(cashback_for(dec(amount), dec(percentage)), expected.map(dec));
    }

    #[test]
    fn test_match_category() {
        let categories = &card_a().categories;
        assert_eq!(match_category(categories, "big basket weekly"), Some(2));
        assert_eq!(match_category(categories, "airtel broadband"), Some(0));
        assert_eq!(match_category(categories, "netflix"), None);
    }
}
