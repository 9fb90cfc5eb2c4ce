//! Terminal rendering of catalog items and profiles.

use console::style;
use sweetshop_client::{ItemActions, Sweet, UserProfile};

pub fn format_price(price: f64) -> String {
    format!("${:.2}", price)
}

pub fn stock_label(item: &Sweet) -> String {
    if item.is_out_of_stock() {
        style("Out of stock").red().to_string()
    } else {
        style(format!("In stock: {}", item.quantity)).green().to_string()
    }
}

fn action_hints(actions: ItemActions) -> String {
    let hints: Vec<&str> = [
        (actions.purchase, "purchase"),
        (actions.edit, "edit"),
        (actions.delete, "delete"),
        (actions.restock, "restock"),
    ]
    .into_iter()
    .filter_map(|(enabled, name)| enabled.then_some(name))
    .collect();

    hints.join(" ")
}

/// One line per item: id, name, category, price, stock and available actions
pub fn item_line(item: &Sweet, actions: ItemActions) -> String {
    format!(
        "{:>4}  {:<24} {:<12} {:>8}  {:<16} {}",
        style(format!("#{}", item.id)).dim(),
        style(&item.name).bold(),
        item.category,
        format_price(item.price),
        stock_label(item),
        style(action_hints(actions)).dim()
    )
}

pub fn item_details(item: &Sweet) -> String {
    format!(
        "{} {}\n  Category: {}\n  Price:    {}\n  Stock:    {}",
        style(format!("#{}", item.id)).dim(),
        style(&item.name).bold(),
        item.category,
        format_price(item.price),
        stock_label(item)
    )
}

pub fn empty_catalog_message(is_admin: bool) -> String {
    if is_admin {
        "No sweets found. Add some sweets to get started!".to_string()
    } else {
        "No sweets found.".to_string()
    }
}

pub fn role_badge(is_admin: bool) -> String {
    if is_admin {
        style("Admin").yellow().bold().to_string()
    } else {
        style("User").cyan().to_string()
    }
}

pub fn profile_line(profile: &UserProfile, is_admin: bool) -> String {
    let email = if profile.email.is_empty() {
        String::new()
    } else {
        format!(" <{}>", profile.email)
    };
    format!(
        "{}{} ({})",
        style(&profile.username).bold(),
        email,
        role_badge(is_admin)
    )
}
