//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init) and shared utilities (open_db)
//! - `parse` - CSV parse preview and shared parser option handling
//! - `import` - CSV import, local or against a remote server
//! - `serve` - Web server command
//! - `status` - Status and category listing commands
//! - `transactions` - Transaction listing command

pub mod core;
pub mod import;
pub mod parse;
pub mod serve;
pub mod status;
pub mod transactions;

// Re-export command functions for main.rs
pub use core::*;
pub use import::*;
pub use parse::*;
pub use serve::*;
pub use status::*;
pub use transactions::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        // Back off to a char boundary so multi-byte text can't split mid-char
        let mut cut = max.saturating_sub(3);
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &s[..cut])
    }
}
