//! CLI value enums and domain type conversions.

use clap::ValueEnum;

use crate::domain::TicketType;

/// Ticket type for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketTypeArg {
    /// Deliverable user-facing work
    Story,
    /// Large body of work
    Epic,
    /// Production incident
    #[value(name = "on-call", alias = "on_call")]
    OnCall,
}

impl std::fmt::Display for TicketTypeArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Story => write!(f, "story"),
            Self::Epic => write!(f, "epic"),
            Self::OnCall => write!(f, "on-call"),
        }
    }
}

impl From<TicketTypeArg> for TicketType {
    fn from(arg: TicketTypeArg) -> Self {
        match arg {
            TicketTypeArg::Story => TicketType::Story,
            TicketTypeArg::Epic => TicketType::Epic,
            TicketTypeArg::OnCall => TicketType::OnCall,
        }
    }
}
