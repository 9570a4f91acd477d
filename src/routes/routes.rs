use actix_web::web;

use super::admin::admin_handlers;
use super::ai::ai_handlers;
use super::auth::auth_handlers;
use super::bugs::bug_handlers;
use super::dashboard::dashboard_handlers;
use super::knowledge_base::knowledge_handlers;
use super::projects::project_handlers;
use super::system_health::health_handlers;
use super::test_cases::test_case_handlers;
use super::test_executions::test_execution_handlers;
use super::test_plans::test_plan_handlers;
use super::tickets::ticket_handlers;

pub fn auth_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .route("", web::get().to(auth_handlers::auth_get))
            .route("/register", web::post().to(auth_handlers::register))
            .route("/login", web::post().to(auth_handlers::login))
            .route("/auto-login", web::post().to(auth_handlers::auto_login))
            .route("/logout", web::post().to(auth_handlers::logout)),
    );
}

pub fn project_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/projects")
            .route("", web::get().to(project_handlers::get_projects))
            .route("", web::post().to(project_handlers::create_project)),
    );
}

pub fn test_case_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/test-cases")
            .route("", web::get().to(test_case_handlers::get_test_cases))
            .route("", web::post().to(test_case_handlers::create_test_case))
            .route("", web::patch().to(test_case_handlers::update_test_case))
            .route("", web::delete().to(test_case_handlers::delete_test_case)),
    );
}

pub fn test_plan_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/test-plans")
            .route("", web::get().to(test_plan_handlers::get_test_plans))
            .route("", web::post().to(test_plan_handlers::create_test_plan))
            .route("/{id}", web::get().to(test_plan_handlers::get_test_plan))
            .route("/{id}", web::put().to(test_plan_handlers::update_test_plan)),
    );
}

pub fn test_execution_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/test-executions")
            .route("", web::get().to(test_execution_handlers::get_test_executions))
            .route(
                "",
                web::post().to(test_execution_handlers::record_test_execution),
            ),
    );
}

pub fn ticket_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/tickets")
            .route("", web::get().to(ticket_handlers::get_tickets))
            .route("", web::post().to(ticket_handlers::create_ticket))
            .route("", web::put().to(ticket_handlers::update_ticket)),
    );
}

pub fn bug_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/bugs")
            .route("", web::get().to(bug_handlers::get_bugs))
            .route("", web::post().to(bug_handlers::create_bug))
            .route("", web::put().to(bug_handlers::update_bug))
            .route("", web::delete().to(bug_handlers::delete_bug)),
    );
}

pub fn knowledge_base_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/knowledge-base")
            .route("", web::get().to(knowledge_handlers::get_knowledge))
            .route("", web::post().to(knowledge_handlers::create_knowledge))
            .route("", web::put().to(knowledge_handlers::update_knowledge))
            .route("", web::delete().to(knowledge_handlers::delete_knowledge)),
    );
}

pub fn admin_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/admin")
            .route("/users", web::get().to(admin_handlers::get_users))
            .route("/users", web::post().to(admin_handlers::create_user))
            .route("/users", web::put().to(admin_handlers::update_user))
            .route("/users", web::delete().to(admin_handlers::delete_user))
            .route("/sessions", web::delete().to(admin_handlers::session_reset)),
    );
}

pub fn dashboard_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/dashboard")
            .route("", web::get().to(dashboard_handlers::get_dashboard)),
    );
}

pub fn system_health_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/system-health")
            .route("", web::get().to(health_handlers::get_system_health)),
    );
}

pub fn ai_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/ai")
            .route(
                "/generate-test-cases",
                web::post().to(ai_handlers::generate_test_cases),
            )
            .route(
                "/generate-test-plans",
                web::post().to(ai_handlers::generate_test_plans),
            )
            .route(
                "/analyze-test-cases",
                web::post().to(ai_handlers::analyze_test_cases),
            ),
    );
}
