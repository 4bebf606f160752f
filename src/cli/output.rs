use colored::Colorize;
use std::fmt;

pub fn info(message: impl fmt::Display) {
    println!("{} {}", "[i]".cyan(), message);
}

pub fn success(message: impl fmt::Display) {
    println!("{} {}", "[ok]".green().bold(), message);
}

pub fn warning(message: impl fmt::Display) {
    println!("{} {}", "[!]".yellow().bold(), message);
}

pub fn error(message: impl fmt::Display) {
    eprintln!("{} {}", "[x]".red().bold(), message);
}

pub fn section(title: impl fmt::Display) {
    println!("{}", title.to_string().bold().underline());
}

/// Prints an indented `label: value` row.
pub fn row(label: impl fmt::Display, value: impl fmt::Display) {
    println!("  {:<18} {}", format!("{}:", label), value);
}

pub fn money(currency: &str, amount: f64) -> String {
    format!("{} {:.2}", currency, amount)
}
