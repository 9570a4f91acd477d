use std::collections::BTreeMap;

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::{NaiveDate, NaiveTime};
use log::{error, info};
use sqlx::MySqlPool;

use super::ai_client::{AiClient, ChatMessage};
use super::ai_models::{
    build_analysis_prompt, extract_keywords, AnalyzeTestCasesRequest, AnalyzeTestCasesResponse,
    CasePriorityCount, FailurePattern, GenerateTestCasesRequest, GenerateTestPlansRequest,
    TEST_CASE_SYSTEM_PROMPT, TEST_PLAN_SYSTEM_PROMPT,
};
use crate::routes::guard::{self, ErrorResponse};
use crate::routes::test_cases::test_case_models::VALID_PRIORITIES;

const AI_TEMPERATURE: f32 = 0.7;

// Relay a streamed completion to the client as chunked plain text.
async fn stream_completion(messages: Vec<ChatMessage>) -> HttpResponse {
    let client = match AiClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            error!("AI client unavailable: {}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("AI generation is not configured"));
        }
    };

    match client.stream_chat(messages, AI_TEMPERATURE).await {
        Ok(stream) => HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .streaming(stream),
        Err(e) => {
            error!("Failed to open completion stream: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::with_details("Failed to generate content", e))
        }
    }
}

pub async fn generate_test_cases(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<GenerateTestCasesRequest>,
) -> impl Responder {
    if let Err(resp) = guard::current_user(pool.get_ref(), &req).await {
        return resp;
    }

    let requirement = request.requirement.trim();
    if requirement.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse::new("Requirement is required"));
    }

    info!("Generating test cases from requirement ({} chars)", requirement.len());
    stream_completion(vec![
        ChatMessage::system(TEST_CASE_SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "Generate test cases for the following requirement:\n{}",
            requirement
        )),
    ])
    .await
}

pub async fn generate_test_plans(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<GenerateTestPlansRequest>,
) -> impl Responder {
    if let Err(resp) = guard::current_user(pool.get_ref(), &req).await {
        return resp;
    }

    let objective = request.objective.trim();
    if objective.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse::new("Objective is required"));
    }

    info!("Generating test plan from objective ({} chars)", objective.len());
    stream_completion(vec![
        ChatMessage::system(TEST_PLAN_SYSTEM_PROMPT),
        ChatMessage::user(objective.to_string()),
    ])
    .await
}

// Aggregate the user's test cases, send the digest upstream, return both.
pub async fn analyze_test_cases(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<AnalyzeTestCasesRequest>,
) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    // All three queries alias test_cases as `tc`, so one filter fits them all.
    let mut filter = String::from("tc.created_by_id = ?");
    let mut start_bound = None;
    let mut end_bound = None;

    if let Some(range) = &request.date_range {
        if let Some(start) = range.start.as_deref().filter(|s| !s.is_empty()) {
            match NaiveDate::parse_from_str(start, "%Y-%m-%d") {
                Ok(date) => {
                    filter.push_str(" AND tc.created_at >= ?");
                    start_bound = Some(date.and_time(NaiveTime::MIN));
                }
                Err(_) => {
                    return HttpResponse::BadRequest()
                        .json(ErrorResponse::new("Invalid start date"));
                }
            }
        }
        if let Some(end) = range.end.as_deref().filter(|s| !s.is_empty()) {
            match NaiveDate::parse_from_str(end, "%Y-%m-%d") {
                Ok(date) => {
                    filter.push_str(" AND tc.created_at <= ?");
                    end_bound = Some(date.and_time(NaiveTime::MIN));
                }
                Err(_) => {
                    return HttpResponse::BadRequest()
                        .json(ErrorResponse::new("Invalid end date"));
                }
            }
        }
    }

    // Whitelisted values only, so they can be inlined into the IN clause.
    if let Some(priorities) = &request.priorities {
        let selected: Vec<&str> = priorities
            .iter()
            .map(String::as_str)
            .filter(|p| VALID_PRIORITIES.contains(p))
            .collect();
        if !selected.is_empty() {
            let quoted: Vec<String> = selected.iter().map(|p| format!("'{}'", p)).collect();
            filter.push_str(&format!(" AND tc.priority IN ({})", quoted.join(", ")));
        }
    }

    let titles_sql = format!("SELECT tc.title FROM test_cases tc WHERE {}", filter);
    let mut titles_query = sqlx::query_scalar::<_, String>(&titles_sql).bind(&user.id);
    if let Some(start) = start_bound {
        titles_query = titles_query.bind(start);
    }
    if let Some(end) = end_bound {
        titles_query = titles_query.bind(end);
    }
    let titles = match titles_query.fetch_all(pool.get_ref()).await {
        Ok(titles) => titles,
        Err(e) => {
            error!("Failed to fetch test cases for analysis: {}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::with_details("Failed to analyze test cases", e));
        }
    };

    let distribution_sql = format!(
        "SELECT tc.priority, COUNT(*) AS cnt FROM test_cases tc WHERE {} \
         GROUP BY tc.priority",
        filter
    );
    let mut distribution_query =
        sqlx::query_as::<_, CasePriorityCount>(&distribution_sql).bind(&user.id);
    if let Some(start) = start_bound {
        distribution_query = distribution_query.bind(start);
    }
    if let Some(end) = end_bound {
        distribution_query = distribution_query.bind(end);
    }
    let priority_distribution: BTreeMap<String, i64> =
        match distribution_query.fetch_all(pool.get_ref()).await {
            Ok(rows) => rows.into_iter().map(|row| (row.priority, row.cnt)).collect(),
            Err(e) => {
                error!("Failed to fetch priority distribution for analysis: {}", e);
                return HttpResponse::InternalServerError()
                    .json(ErrorResponse::with_details("Failed to analyze test cases", e));
            }
        };

    let failures_sql = format!(
        "SELECT tc.id, tc.title, COUNT(te.id) AS failure_count \
         FROM test_cases tc \
         JOIN test_executions te ON te.test_case_id = tc.id AND te.status = 'FAILED' \
         WHERE {} GROUP BY tc.id, tc.title ORDER BY failure_count DESC",
        filter
    );
    let mut failures_query = sqlx::query_as::<_, FailurePattern>(&failures_sql).bind(&user.id);
    if let Some(start) = start_bound {
        failures_query = failures_query.bind(start);
    }
    if let Some(end) = end_bound {
        failures_query = failures_query.bind(end);
    }
    let failure_patterns = match failures_query.fetch_all(pool.get_ref()).await {
        Ok(patterns) => patterns,
        Err(e) => {
            error!("Failed to fetch failure patterns for analysis: {}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::with_details("Failed to analyze test cases", e));
        }
    };

    let total_cases = titles.len() as i64;
    let common_keywords = extract_keywords(&titles);
    let prompt = build_analysis_prompt(
        total_cases,
        &priority_distribution,
        &failure_patterns,
        &common_keywords,
    );

    let client = match AiClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            error!("AI client unavailable: {}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("AI analysis is not configured"));
        }
    };

    let ai_analysis = match client
        .chat(vec![ChatMessage::system(prompt)], AI_TEMPERATURE)
        .await
    {
        Ok(analysis) => analysis,
        Err(e) => {
            error!("Completion request failed: {}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::with_details("Failed to analyze test cases", e));
        }
    };

    HttpResponse::Ok().json(AnalyzeTestCasesResponse {
        total_cases,
        priority_distribution,
        failure_patterns,
        common_keywords,
        ai_analysis,
    })
}
