pub mod dashboard;
pub mod event;
pub mod sales;
pub mod scanner;
pub mod ticket;

pub use event::Event;
pub use ticket::{Ticket, TicketStatus, TicketWithEvent};
