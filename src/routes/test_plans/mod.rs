pub mod test_plan_handlers;
pub mod test_plan_models;
