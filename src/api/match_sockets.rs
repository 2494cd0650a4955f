use crate::matchmaker::formed_match::FormedMatch;
use crate::notify::BroadcastNotifier;
use crate::queues::queue_pool::QueuePool;
use crate::queues::queue_store::normalize;
use actix_web::{get, web, HttpRequest, HttpResponse};
use actix_ws::Message;
use log::{debug, error, info, warn};
use tokio::sync::broadcast::error::RecvError;

/// JSON frame for a match, or `None` when it was formed on another queue.
fn match_frame(formed: &FormedMatch, queue_name: &str) -> Option<String> {
    if formed.queue != queue_name {
        return None;
    }

    match serde_json::to_string(formed) {
        Ok(json) => Some(json),
        Err(e) => {
            error!("Failed to serialize round {}: {}", formed.round, e);
            None
        }
    }
}

/// Streams every match formed on a queue to the connected client as JSON.
#[get("/queue/{queue_id}/matches")]
pub async fn match_feed_socket(
    req: HttpRequest,
    queue_id: web::Path<String>,
    queue_pool: web::Data<QueuePool>,
    feed: web::Data<BroadcastNotifier>,
    body: web::Payload,
) -> actix_web::Result<HttpResponse> {
    let queue_name = normalize(&queue_id.into_inner());
    if !queue_pool.queue_exists(&queue_name).await {
        return Ok(HttpResponse::NotFound().body(format!("Unknown queue {queue_name}")));
    }

    let (response, mut session, mut msg_stream) = actix_ws::handle(&req, body)?;
    let mut matches = feed.subscribe();

    info!("Match feed opened for queue {}", queue_name);

    actix_web::rt::spawn(async move {
        loop {
            tokio::select! {
                msg = msg_stream.recv() => match msg {
                    Some(Ok(Message::Ping(bytes))) => {
                        if session.pong(&bytes).await.is_err() {
                            return;
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                },
                formed = matches.recv() => match formed {
                    Ok(formed) => {
                        if let Some(json) = match_frame(&formed, &queue_name) {
                            if session.text(json).await.is_err() {
                                return;
                            }
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Match feed for {} skipped {} matches", queue_name, skipped);
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }

        debug!("Match feed closed for queue {}", queue_name);
        let _ = session.close(None).await;
    });

    Ok(response)
}
