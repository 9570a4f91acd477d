pub mod knowledge_handlers;
pub mod knowledge_models;
