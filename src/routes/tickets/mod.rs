pub mod ticket_handlers;
pub mod ticket_models;
