//! Terminal output utilities

use console::style;

/// Print a success message to stderr
pub fn success(msg: &str) {
    eprintln!("{} {}", style("✓").green().bold(), msg);
}

/// Print an error message as a single line
pub fn error(msg: &str) {
    let line = msg.replace(['\n', '\r'], " ");
    eprintln!("{} {}", style("Error:").red().bold(), line);
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", style(key).dim(), value);
}
