use crate::error::QueueError;
use crate::queues::queue_pool::QueuePool;
use actix_web::{get, web, HttpResponse, Responder};
use serde_json::json;

#[get("/queue/list")]
pub async fn get_queues(queue_pool: web::Data<QueuePool>) -> impl Responder {
    web::Json(queue_pool.summaries().await)
}

#[get("/queue/{queue_id}")]
pub async fn get_queue(queue_pool: web::Data<QueuePool>, queue_id: web::Path<String>) -> HttpResponse {
    match queue_pool.snapshot(&queue_id).await {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(err @ QueueError::UnknownQueue(_)) => {
            HttpResponse::NotFound().json(json!({ "error": err.to_string() }))
        }
        Err(err) => HttpResponse::InternalServerError().json(json!({ "error": err.to_string() })),
    }
}
