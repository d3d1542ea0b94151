//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success/Done:  green   (final statuses, completed actions)
//!   - Warning/Active: yellow (in progress, active sprint)
//!   - Review:        blue    (testing, in review)
//!   - Error:         red     (rejected operations)
//!   - Info/Reference: cyan   (ids)
//!   - Accent:        magenta (epics)
//!   - Muted:         dimmed  (field labels, connectors)
//!   - Default:       white   (open status)

use crate::domain::{TicketStatus, TicketType};
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply color to status text based on how far along the workflow it is.
pub(crate) fn colorize_status(status: TicketStatus, config: &OutputConfig) -> String {
    let text = status.to_string();
    if !config.use_colors {
        return text;
    }
    match status {
        TicketStatus::Open => text.white().to_string(),
        TicketStatus::InProgress => text.yellow().to_string(),
        TicketStatus::Testing | TicketStatus::InReview => text.blue().to_string(),
        TicketStatus::Deployed | TicketStatus::Completed | TicketStatus::Resolved => {
            text.green().to_string()
        }
    }
}

/// Apply color to a ticket type label.
pub(crate) fn colorize_type(ticket_type: TicketType, config: &OutputConfig) -> String {
    let text = ticket_type.to_string();
    if !config.use_colors {
        return text;
    }
    match ticket_type {
        TicketType::Story => text.green().to_string(),
        TicketType::Epic => text.magenta().bold().to_string(),
        TicketType::OnCall => text.red().to_string(),
    }
}

/// Colorize an id (cyan).
pub(crate) fn colorize_id(id: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return id.to_string();
    }
    id.cyan().to_string()
}

/// Apply dimmed style to text (for labels/field names).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}
