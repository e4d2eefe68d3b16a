use futures::FutureExt;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::direct::AccountDataDirectRoomRepository;
use crate::event::EventRouter;
use crate::gateway::{EventSource, MatrixGateway, SessionGateway, SyncStream};
use crate::room::models::{RoomId, RoomReference};
use crate::room::{resolve_relay_target, resolve_watch_set, WatchSet};
use crate::shared::AppError;
use crate::templates::GreetingTemplate;

/// Log in, set everything up and process events until shutdown
///
/// The session is logged out once the event loop has ended, whether it ended
/// through `shutdown` or through a transport failure.
pub async fn run(config: Config, shutdown: impl Future<Output = ()>) -> Result<(), AppError> {
    let watched = config.watched_rooms()?;
    let relay = config.relay_room()?;
    let template = GreetingTemplate::load(&config.txt_msg_path, &config.html_msg_path).await?;

    info!(homeserver = %config.homeserver, username = %config.username, "Logging in");
    let gateway = MatrixGateway::login(&config.homeserver, &config.credentials())
        .await
        .map(Arc::new)
        .map_err(|e| AppError::Auth(e.to_string()))?;

    let result = serve(gateway.clone(), &watched, relay.as_ref(), template, shutdown).await;

    if let Err(e) = gateway.logout().await {
        warn!(error = %e, "Could not log out");
    }
    result
}

async fn serve(
    gateway: Arc<MatrixGateway>,
    watched: &[RoomReference],
    relay: Option<&RoomReference>,
    template: GreetingTemplate,
    shutdown: impl Future<Output = ()>,
) -> Result<(), AppError> {
    let (watch_set, relay_target) = resolve_rooms(gateway.as_ref(), watched, relay).await?;

    let session: Arc<dyn SessionGateway> = gateway.clone();
    let registry = Arc::new(AccountDataDirectRoomRepository::new(session.clone()));
    let router = EventRouter::new(
        session,
        registry,
        watch_set,
        relay_target,
        template,
        gateway.user_id().clone(),
    );

    let mut stream = SyncStream::new(gateway);
    run_event_loop(&router, &mut stream, shutdown).await
}

/// Resolve the watched rooms and the relay room; any failure is fatal
pub async fn resolve_rooms(
    gateway: &dyn SessionGateway,
    watched: &[RoomReference],
    relay: Option<&RoomReference>,
) -> Result<(WatchSet, Option<RoomId>), AppError> {
    let watch_set = resolve_watch_set(gateway, watched).await?;
    let relay_target = resolve_relay_target(gateway, relay).await?;
    Ok((watch_set, relay_target))
}

/// Feed events to the router one at a time until shutdown or transport failure
///
/// Shutdown is honoured while waiting for events and between events, never
/// in the middle of an action.
#[instrument(skip_all)]
pub async fn run_event_loop<S>(
    router: &EventRouter,
    source: &mut S,
    shutdown: impl Future<Output = ()>,
) -> Result<(), AppError>
where
    S: EventSource + ?Sized,
{
    tokio::pin!(shutdown);
    info!("Listening for events");

    loop {
        let batch = tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                return Ok(());
            }
            batch = source.next_batch() => {
                batch.map_err(|e| AppError::Transport(e.to_string()))?
            }
        };

        for event in &batch {
            router.handle_event(event).await;

            if (&mut shutdown).now_or_never().is_some() {
                info!("Shutdown requested, stopping between events");
                return Ok(());
            }
        }
    }
}
