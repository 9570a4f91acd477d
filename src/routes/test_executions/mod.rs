pub mod test_execution_handlers;
pub mod test_execution_models;
