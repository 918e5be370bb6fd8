use async_trait::async_trait;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::future::{abortable, AbortHandle};
use futures::stream::SplitSink;
use futures::{SinkExt, Stream, StreamExt};
use gloo_net::websocket::{futures::WebSocket, Message, WebSocketError};
use gloo_timers::future::IntervalStream;
use leptos::logging::{error, log, warn};
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;

use super::protocol::{self, ChannelSpec, Inbound, RefCounter};
use super::{InsertCallback, RealtimeFeed, Subscription};
use crate::config::WidgetConfig;
use crate::error::RealtimeError;

/// Supabase Realtime client: one websocket and one channel per subscription.
#[derive(Clone)]
pub struct SupabaseRealtime {
    config: Rc<WidgetConfig>,
}

impl SupabaseRealtime {
    pub fn new(config: Rc<WidgetConfig>) -> Self {
        Self { config }
    }
}

#[async_trait(?Send)]
impl RealtimeFeed for SupabaseRealtime {
    async fn subscribe(
        &self,
        post_id: &str,
        on_insert: InsertCallback,
    ) -> Result<Subscription, RealtimeError> {
        let spec = ChannelSpec::for_post(&self.config, post_id);
        log!("[REALTIME] Opening channel {}", spec.topic);

        let socket = WebSocket::open(&self.config.realtime_url())
            .map_err(|err| RealtimeError::Connect(err.to_string()))?;
        let (sink, stream) = socket.split();

        // Every outbound frame goes through this queue so the sink has one owner.
        let (outbound, queued) = mpsc::unbounded::<String>();
        let refs = Rc::new(RefCounter::default());
        let join_ref = refs.next();
        outbound
            .unbounded_send(protocol::join(&spec, &join_ref))
            .map_err(|_| RealtimeError::Closed)?;

        spawn_local(pump_outbound(sink, queued));

        let (beats, heartbeat_handle) = abortable(send_heartbeats(
            outbound.clone(),
            refs.clone(),
            self.config.heartbeat_interval_ms,
        ));
        spawn_local(async move {
            let _ = beats.await;
        });

        let teardown = Teardown {
            outbound,
            heartbeat: heartbeat_handle,
        };
        let (reader, reader_handle) = abortable(read_inbound(
            stream,
            spec.topic.clone(),
            join_ref,
            on_insert,
            teardown.clone(),
        ));
        spawn_local(async move {
            let _ = reader.await;
        });

        let topic = spec.topic.clone();
        Ok(Subscription::new(spec.topic, move || {
            log!("[REALTIME] Leaving channel {}", topic);
            reader_handle.abort();
            let _ = teardown
                .outbound
                .unbounded_send(protocol::leave(&topic, &refs.next()));
            teardown.run();
        }))
    }
}

/// Stops the heartbeat and closes the writer queue, which closes the socket.
#[derive(Clone)]
struct Teardown {
    outbound: UnboundedSender<String>,
    heartbeat: AbortHandle,
}

impl Teardown {
    fn run(&self) {
        self.heartbeat.abort();
        self.outbound.close_channel();
    }
}

async fn pump_outbound(
    mut sink: SplitSink<WebSocket, Message>,
    mut queued: UnboundedReceiver<String>,
) {
    while let Some(frame) = queued.next().await {
        if let Err(err) = sink.send(Message::Text(frame)).await {
            error!("[REALTIME] Failed to send frame: {:?}", err);
            break;
        }
    }
    let _ = sink.close().await;
}

async fn send_heartbeats(outbound: UnboundedSender<String>, refs: Rc<RefCounter>, interval_ms: u32) {
    let mut ticks = IntervalStream::new(interval_ms);
    while ticks.next().await.is_some() {
        if outbound.unbounded_send(protocol::heartbeat(&refs.next())).is_err() {
            break;
        }
    }
}

async fn read_inbound<S>(
    mut stream: S,
    topic: String,
    join_ref: String,
    on_insert: InsertCallback,
    teardown: Teardown,
) where
    S: Stream<Item = Result<Message, WebSocketError>> + Unpin,
{
    while let Some(message) = stream.next().await {
        let text = match message {
            Ok(Message::Text(text)) => text,
            Ok(Message::Bytes(_)) => continue,
            Err(err) => {
                warn!("[REALTIME] Socket for {} failed: {:?}", topic, err);
                break;
            }
        };

        match protocol::decode(&text, &topic, &join_ref) {
            Ok(Inbound::Insert(review)) => {
                log!("[REALTIME] Insert received on {}", topic);
                on_insert(review);
            }
            Ok(Inbound::Joined) => log!("[REALTIME] Joined {}", topic),
            Ok(Inbound::JoinFailed(reason)) => {
                error!("[REALTIME] Join rejected for {}: {}", topic, reason);
                break;
            }
            Ok(Inbound::ChannelError(reason)) => {
                error!("[REALTIME] Channel error on {}: {}", topic, reason);
            }
            Ok(Inbound::Closed) => {
                log!("[REALTIME] Channel {} closed by server", topic);
                break;
            }
            Ok(Inbound::Ignored) => {}
            Err(err) => warn!("[REALTIME] Dropping frame on {}: {}", topic, err),
        }
    }
    // The channel is dead: nothing is left to keep the socket open for.
    log!("[REALTIME] Connection for {} ended", topic);
    teardown.run();
}
