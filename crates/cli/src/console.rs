//! Terminal output.

use eshop_storefront::{Notification, NotificationLevel, Notifier};

/// Prints notifications: successes to stdout, errors to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    #[allow(clippy::print_stdout, clippy::print_stderr)]
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => println!("✓ {}", notification.message),
            NotificationLevel::Error => eprintln!("✗ {}", notification.message),
        }
    }
}

/// Print command output to stdout.
#[allow(clippy::print_stdout)]
pub fn print(text: &str) {
    println!("{text}");
}
