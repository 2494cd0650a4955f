use crate::bot::announcer::DiscordAnnouncer;
use crate::config::{Config, QueueFile};
use crate::error::AppError;
use crate::notify::{BroadcastNotifier, MatchNotifier};
use crate::queues::queue_pool::QueuePool;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use web::Data;

mod api;
mod bot;
mod config;
mod error;
mod matchmaker;
mod notify;
mod queues;

const MATCH_FEED_CAPACITY: usize = 64;

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to read .env: {e}");
        }
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let queue_file = QueueFile::load_or_create(&config.queue_config_path).await?;
    let feed = Arc::new(BroadcastNotifier::new(MATCH_FEED_CAPACITY));

    let queue_pool = Arc::new(QueuePool::new(
        &queue_file.queues,
        vec![feed.clone() as Arc<dyn MatchNotifier>],
    )?);

    let (bot_client, discord_http) = bot::start::init_bot(&config, queue_pool.clone()).await?;
    queue_pool
        .add_notifier(Arc::new(DiscordAnnouncer::new(
            discord_http,
            config.host_channel_id,
            config.host_role_id,
        )))
        .await;

    log::info!(
        "Loaded {} queue(s), default queue is {}",
        queue_file.queues.len(),
        queue_pool.default_queue()
    );

    let server = HttpServer::new({
        let pool_data = Data::from(queue_pool.clone());
        let feed_data = Data::from(feed.clone());
        move || {
            App::new()
                .wrap(Logger::default())
                .app_data(pool_data.clone())
                .app_data(feed_data.clone())
                .configure(api::configure)
        }
    })
    .workers(4)
    .bind(config.http_bind.as_str())?
    .run();

    log::info!("Inspection API listening on {}", config.http_bind);

    tokio::select! {
        result = server => result?,
        result = bot::start::start_bot(bot_client) => result?,
    }

    Ok(())
}
