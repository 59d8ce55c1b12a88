pub mod auth;
pub mod comment;
pub mod event;
pub mod rsvp;
pub mod ticket;
pub mod user;

pub use auth::{AuthRequest, AuthResponse};
pub use comment::Comment;
pub use event::{Event, EventDraft, EventDto};
pub use rsvp::RsvpState;
pub use ticket::{
    CreateTicketRequest, SupportTicket, SupportTicketResponse, UpdateTicketRequest,
    DEFAULT_TICKET_STATUS,
};
pub use user::User;
