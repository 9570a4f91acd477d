use actix_web::{web, App, HttpResponse, HttpServer};
use dotenv::dotenv;
use sqlx::mysql::MySqlPoolOptions;
use std::env;

mod models;
mod routes;

use routes::system_health::health_models::HealthCache;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = MySqlPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to create pool");

    let health_cache = web::Data::new(HealthCache::new());

    let server_address =
        env::var("SERVER_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    println!("Server running at http://{}", server_address);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(health_cache.clone())
            .route(
                "/",
                web::get().to(|| async { HttpResponse::Ok().body("Hello, this is TestHub!") }),
            )
            .configure(routes::routes::auth_configure)
            .configure(routes::routes::project_configure)
            .configure(routes::routes::test_case_configure)
            .configure(routes::routes::test_plan_configure)
            .configure(routes::routes::test_execution_configure)
            .configure(routes::routes::ticket_configure)
            .configure(routes::routes::bug_configure)
            .configure(routes::routes::knowledge_base_configure)
            .configure(routes::routes::admin_configure)
            .configure(routes::routes::dashboard_configure)
            .configure(routes::routes::system_health_configure)
            .configure(routes::routes::ai_configure)
    })
    .bind(server_address)?
    .run()
    .await
}
