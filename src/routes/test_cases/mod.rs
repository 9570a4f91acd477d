pub mod test_case_handlers;
pub mod test_case_models;
