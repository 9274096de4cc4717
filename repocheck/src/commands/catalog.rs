//! `repocheck rules` and `repocheck categories`.

use colored::Colorize;
use repocheck_common::config::ADAPTER_CATEGORIES;
use repocheck_common::{CheckPolicy, RejectionCode, RejectionEntry};

pub fn print_rules(explain: bool) {
    for entry in RejectionCode::all().iter().map(RejectionCode::entry) {
        if explain {
            println!("{}", entry.format_full());
        } else {
            println!("{}", rule_line(&entry));
        }
    }
}

fn rule_line(entry: &RejectionEntry) -> String {
    format!(
        "{}  {:<28} {:<12} {}",
        entry.code.bold(),
        entry.name,
        entry.category.to_string(),
        entry.message.dimmed()
    )
}

pub fn print_categories(policy: &CheckPolicy) {
    for category in policy.categories() {
        if ADAPTER_CATEGORIES.contains(&category) {
            println!("{category}");
        } else {
            println!("{} {}", category, "(configured)".dimmed());
        }
    }
}
