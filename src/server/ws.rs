use crate::hub::BroadcastHub;
use crate::server::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::info;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.hub))
}

/// One task per subscriber connection. Registered for the lifetime of the
/// socket: swipe events flow out in publish order, inbound messages are
/// read and ignored, and any close (graceful or abrupt) unregisters.
async fn handle_socket(socket: WebSocket, hub: Arc<BroadcastHub>) {
    let (id, events) = hub.register();
    let mut events = UnboundedReceiverStream::new(events);
    info!(
        "New subscriber {} connected. Total subscribers: {}",
        id,
        hub.subscriber_count()
    );

    let (mut sink, mut stream) = socket.split();
    loop {
        tokio::select! {
            event = events.next() => {
                match event {
                    Some(event) => {
                        if sink.send(Message::Text(event.as_str().into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            incoming = stream.next() => {
                match incoming {
                    // Subscribers may send messages; they carry no meaning.
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                }
            }
        }
    }

    hub.unregister(id);
    info!(
        "Subscriber {} disconnected. Total subscribers: {}",
        id,
        hub.subscriber_count()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::classifier::SwipeEvent;
    use crate::server::{router, AppState};
    use crate::store::MemoryFrameStore;
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio_tungstenite::connect_async;
    use tokio_tungstenite::tungstenite::protocol::Message as ClientMessage;

    async fn serve(hub: Arc<BroadcastHub>) -> SocketAddr {
        let state = AppState {
            store: Arc::new(MemoryFrameStore::new()),
            hub,
        };
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        addr
    }

    async fn wait_for_subscriber_count(hub: &BroadcastHub, expected: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while hub.subscriber_count() != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("subscriber count never settled");
    }

    #[tokio::test]
    async fn open_registers_and_close_unregisters() {
        let hub = Arc::new(BroadcastHub::new());
        let addr = serve(hub.clone()).await;

        let (mut socket, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
        wait_for_subscriber_count(&hub, 1).await;

        socket.close(None).await.unwrap();
        wait_for_subscriber_count(&hub, 0).await;
    }

    #[tokio::test]
    async fn published_event_arrives_as_the_bare_token() {
        let hub = Arc::new(BroadcastHub::new());
        let addr = serve(hub.clone()).await;

        let (mut socket, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
        wait_for_subscriber_count(&hub, 1).await;

        // Inbound traffic is accepted and ignored; it must not disturb
        // the outbound event flow.
        socket
            .send(ClientMessage::text("anything at all"))
            .await
            .unwrap();

        hub.publish(SwipeEvent::Left);
        let message = tokio::time::timeout(Duration::from_secs(2), socket.next())
            .await
            .expect("no event delivered")
            .unwrap()
            .unwrap();
        assert_eq!(message.into_text().unwrap().as_str(), "Left");

        socket.close(None).await.unwrap();
        wait_for_subscriber_count(&hub, 0).await;
    }

    #[tokio::test]
    async fn abrupt_disconnect_unregisters() {
        let hub = Arc::new(BroadcastHub::new());
        let addr = serve(hub.clone()).await;

        let (socket, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
        wait_for_subscriber_count(&hub, 1).await;

        // No close handshake: the connection just vanishes.
        drop(socket);
        wait_for_subscriber_count(&hub, 0).await;
    }
}
