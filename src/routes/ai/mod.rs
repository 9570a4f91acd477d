pub mod ai_client;
pub mod ai_handlers;
pub mod ai_models;
