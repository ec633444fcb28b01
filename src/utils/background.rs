use async_trait::async_trait;
use log::debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinSet;

/// Trait defining scheduling and running of background tasks for storage
#[async_trait]
pub trait BackgroundService {
    /// Defines period of running background task
    fn background_period(&self) -> Duration;

    /// Background task for storage
    async fn background(&mut self);

    fn cancel_token(&self) -> watch::Receiver<bool>;

    async fn stop(&mut self) {}
}

pub type SharedBackgroundService = Arc<RwLock<dyn BackgroundService + Send + Sync>>;

/// Run every service periodically until its cancel token flips to `true`
pub fn serve_background(services: &[SharedBackgroundService]) -> JoinSet<()> {
    let mut futures = JoinSet::new();

    for s in services.iter() {
        let service = s.clone();
        futures.spawn(async move {
            let guard = service.read().await;
            let interval = guard.background_period();
            let mut rx = guard.cancel_token();

            drop(guard);
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {
                        let mut guard = service.write().await;
                        guard.background().await;
                    }
                    changed = rx.changed() => {
                        if changed.is_err() || *rx.borrow() {
                            debug!("Background service cancelled");
                            break;
                        }
                    }
                }
            }
        });
    }

    futures
}

/// Stop all services and wait for their loops to finish
pub async fn stop_background(services: &[SharedBackgroundService], mut running: JoinSet<()>) {
    for service in services.iter() {
        service.write().await.stop().await;
    }
    while running.join_next().await.is_some() {}
}
