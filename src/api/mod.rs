pub mod match_sockets;
pub mod queue_endpoints;

use actix_web::web;

/// `/queue/list` is registered before `/queue/{queue_id}` so it is not taken
/// for a queue name.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(queue_endpoints::get_queues)
        .service(match_sockets::match_feed_socket)
        .service(queue_endpoints::get_queue);
}
