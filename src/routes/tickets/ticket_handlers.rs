use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{error, info};
use sqlx::MySqlPool;
use uuid::Uuid;

use super::ticket_models::{
    normalize_ticket_priority, normalize_ticket_status, CreateTicketRequest, RelatedTestCase,
    TicketDetail, TicketQuery, TicketWithRelations, UpdateTicketRequest,
};
use crate::models::ticket::Ticket;
use crate::routes::guard::{self, ErrorResponse};

const TICKET_COLUMNS: &str = "id, title, description, status, priority, project_id, \
     created_by_id, assigned_to_id, created_at, updated_at";

const TICKET_JOIN_SELECT: &str = "SELECT t.id, t.title, t.description, t.status, t.priority, \
     t.project_id, t.created_by_id, t.assigned_to_id, t.created_at, t.updated_at, \
     cu.name AS created_by_name, au.name AS assigned_to_name \
     FROM tickets t \
     JOIN users cu ON t.created_by_id = cu.id \
     LEFT JOIN users au ON t.assigned_to_id = au.id";

// `?id=` returns one ticket with its linked test cases, otherwise the
// (optionally project-filtered) list.
pub async fn get_tickets(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    query: web::Query<TicketQuery>,
) -> impl Responder {
    if let Err(resp) = guard::current_user(pool.get_ref(), &req).await {
        return resp;
    }

    if let Some(ticket_id) = &query.id {
        let ticket_result = sqlx::query_as::<_, TicketWithRelations>(&format!(
            "{} WHERE t.id = ?",
            TICKET_JOIN_SELECT
        ))
        .bind(ticket_id)
        .fetch_optional(pool.get_ref())
        .await;

        let ticket = match ticket_result {
            Ok(Some(ticket)) => ticket,
            Ok(None) => {
                info!("Ticket not found: {}", ticket_id);
                return HttpResponse::NotFound().json(ErrorResponse::new("Ticket not found"));
            }
            Err(e) => {
                error!("Failed to fetch ticket {}: {}", ticket_id, e);
                return HttpResponse::InternalServerError()
                    .json(ErrorResponse::with_details("Failed to fetch ticket", e));
            }
        };

        let related_result = sqlx::query_as::<_, RelatedTestCase>(
            "SELECT tc.id, tc.title, tc.status FROM test_cases tc \
             JOIN ticket_test_cases ttc ON ttc.test_case_id = tc.id \
             WHERE ttc.ticket_id = ?",
        )
        .bind(ticket_id)
        .fetch_all(pool.get_ref())
        .await;

        let related_test_cases = match related_result {
            Ok(cases) => cases,
            Err(e) => {
                error!(
                    "Failed to fetch test cases linked to ticket {}: {}",
                    ticket_id, e
                );
                Vec::new()
            }
        };

        return HttpResponse::Ok().json(TicketDetail {
            ticket,
            related_test_cases,
        });
    }

    let mut sql = TICKET_JOIN_SELECT.to_string();
    if query.project_id.is_some() {
        sql.push_str(" WHERE t.project_id = ?");
    }
    sql.push_str(" ORDER BY t.updated_at DESC");

    let mut db_query = sqlx::query_as::<_, TicketWithRelations>(&sql);
    if let Some(project_id) = &query.project_id {
        db_query = db_query.bind(project_id);
    }

    match db_query.fetch_all(pool.get_ref()).await {
        Ok(tickets) => HttpResponse::Ok().json(tickets),
        Err(e) => {
            error!("Failed to fetch tickets: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::with_details("Failed to fetch tickets", e))
        }
    }
}

pub async fn create_ticket(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<CreateTicketRequest>,
) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    if request.title.trim().is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse::new("Title is required"));
    }
    let project_id = match &request.project_id {
        Some(id) if !id.is_empty() => id,
        _ => {
            return HttpResponse::BadRequest().json(ErrorResponse::new("Project ID is required"));
        }
    };

    let status = normalize_ticket_status(request.status.as_deref());
    let priority = normalize_ticket_priority(request.priority.as_deref());

    let ticket_id = Uuid::new_v4().to_string();
    let insert_result = sqlx::query(
        "INSERT INTO tickets (id, title, description, status, priority, project_id, \
         created_by_id, assigned_to_id) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&ticket_id)
    .bind(request.title.trim())
    .bind(request.description.as_deref().unwrap_or(""))
    .bind(status)
    .bind(priority)
    .bind(project_id)
    .bind(&user.id)
    .bind(&request.assigned_to_id)
    .execute(pool.get_ref())
    .await;

    if let Err(e) = insert_result {
        error!("Failed to create ticket for user {}: {}", user.id, e);
        return HttpResponse::InternalServerError()
            .json(ErrorResponse::with_details("Failed to create ticket", e));
    }

    let fetch_result = sqlx::query_as::<_, Ticket>(&format!(
        "SELECT {} FROM tickets WHERE id = ?",
        TICKET_COLUMNS
    ))
    .bind(&ticket_id)
    .fetch_one(pool.get_ref())
    .await;

    match fetch_result {
        Ok(ticket) => {
            info!("Ticket {} created by user {}", ticket.id, user.id);
            HttpResponse::Created().json(ticket)
        }
        Err(e) => {
            error!("Ticket not found after insertion: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Ticket not found after insertion"))
        }
    }
}

pub async fn update_ticket(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<UpdateTicketRequest>,
) -> impl Responder {
    if let Err(resp) = guard::current_user(pool.get_ref(), &req).await {
        return resp;
    }

    if request.id.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse::new("Ticket ID is required"));
    }

    let status = normalize_ticket_status(request.status.as_deref());
    let priority = normalize_ticket_priority(request.priority.as_deref());

    let update_result = sqlx::query(
        "UPDATE tickets SET title = ?, description = ?, status = ?, priority = ?, \
         assigned_to_id = ? WHERE id = ?",
    )
    .bind(request.title.trim())
    .bind(request.description.as_deref().unwrap_or(""))
    .bind(status)
    .bind(priority)
    .bind(&request.assigned_to_id)
    .bind(&request.id)
    .execute(pool.get_ref())
    .await;

    match update_result {
        Ok(done) if done.rows_affected() == 0 => {
            info!("Ticket not found for update: {}", request.id);
            HttpResponse::NotFound().json(ErrorResponse::new("Ticket not found"))
        }
        Ok(_) => {
            let fetch_result = sqlx::query_as::<_, Ticket>(&format!(
                "SELECT {} FROM tickets WHERE id = ?",
                TICKET_COLUMNS
            ))
            .bind(&request.id)
            .fetch_one(pool.get_ref())
            .await;

            match fetch_result {
                Ok(ticket) => HttpResponse::Ok().json(ticket),
                Err(e) => {
                    error!("Failed to fetch updated ticket {}: {}", request.id, e);
                    HttpResponse::InternalServerError()
                        .json(ErrorResponse::with_details("Failed to fetch ticket", e))
                }
            }
        }
        Err(e) => {
            error!("Failed to update ticket {}: {}", request.id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::with_details("Failed to update ticket", e))
        }
    }
}
