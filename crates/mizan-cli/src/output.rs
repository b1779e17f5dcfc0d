//! CLI output helpers
//!
//! Formatting for human and JSON output, plus the toast notifier that
//! implements the engine's side channel on a terminal.

use async_trait::async_trait;

use mizan_core::ports::notification::{INotifier, Toast, ToastLevel};

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Trait for formatting CLI output
pub trait OutputFormatter {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
    fn print_json(&self, value: &serde_json::Value);
}

/// Human-readable output formatter with checkmarks and indentation
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {}", message);
    }
    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {}", message);
    }
    fn warn(&self, message: &str) {
        eprintln!("\u{26a0} Warning: {}", message);
    }
    fn info(&self, message: &str) {
        println!("  {}", message);
    }
    fn print_json(&self, _value: &serde_json::Value) {
        // Human formatter doesn't print JSON
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, message: &str) {
        println!(
            "{}",
            serde_json::json!({"success": true, "message": message})
        );
    }
    fn error(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"success": false, "error": message})
        );
    }
    fn warn(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"level": "warning", "message": message})
        );
    }
    fn info(&self, _message: &str) {}
    fn print_json(&self, value: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_default()
        );
    }
}

pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(HumanFormatter)
    }
}

/// Terminal implementation of the engine's toast side channel
pub struct TerminalNotifier;

#[async_trait]
impl INotifier for TerminalNotifier {
    async fn toast(&self, toast: &Toast) -> anyhow::Result<()> {
        match toast.level {
            ToastLevel::Success => println!("\u{2713} {}", toast.body),
            ToastLevel::Warning => eprintln!("\u{26a0} {}", toast.body),
            ToastLevel::Error => eprintln!("\u{2717} {}", toast.body),
        }
        Ok(())
    }
}

/// Formats a monetary amount with thousands separators and two decimals
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return "0.00".to_string();
    }

    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u128;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}.{:02}", if negative { "-" } else { "" }, grouped, frac)
}
