use cashback_tracker::{CardRegistry, CashbackBuilder};
use std::env;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        println!("Usage: summarize <card> <file.csv|file.xlsx>\n");
        println!("Available cards:");
        for (key, name) in CardRegistry::builtin().list_profiles() {
            println!("  {key:<8} {name}");
        }
        return Ok(());
    }

    let card = &args[1];
    let file_path = &args[2];

    let summary = CashbackBuilder::new()
        .card(card)
        .filename(file_path)
        .run()?;

    let name = &CardRegistry::builtin().get_profile(card)?.name;
    println!("Cashback status for {name}");
    println!(
        "Total rows in file: {}. Transactions relevant to this card & 'Expense' type: {}.\n",
        summary.processed_count, summary.relevant_count
    );

    for category in &summary.results {
        println!(
            "{} (applies {}% to transaction amount)",
            category.name, category.percentage
        );
        println!(
            "  Cashback earned: {:.2} / {:.2} limit ({:.1}% of limit reached){}",
            category.cashback,
            category.limit,
            category.limit_progress(),
            if category.is_limit_reached() { " LIMIT REACHED!" } else { "" }
        );
        for tx in &category.contributing_transactions {
            println!(
                "    {:<14} {:<30} {:<12} {:<12} {:>10.2} {:>8.2}",
                tx.date, tx.description, tx.category, tx.subcategory, tx.amount, tx.cashback
            );
        }
        println!();
    }

    if summary.matched_count() == 0 {
        println!("No cashback categories matched any relevant transactions.");
    }

    Ok(())
}
