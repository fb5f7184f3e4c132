use std::{sync::Arc, time::Duration};

use backon::{ExponentialBuilder, Retryable};
use log::{debug, error, info, warn};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, Publish, QoS, TlsConfiguration, Transport};
use snafu::{OptionExt, ResultExt};
use tokio::sync::mpsc;
use url::Url;

use crate::config::models::Channel;

use super::models::*;
use super::tls::system_tls_config;

const DEFAULT_PORT: u16 = 1883;
const DEFAULT_SECURE_PORT: u16 = 8883;

/// What the channel reports back to the event-processing context.
#[derive(Debug)]
pub enum ChannelNotice {
    /// (Re)connected; subscriptions have to be renewed.
    Connected,
    Event(InboundEvent),
}

/// Where the channel connects to, as parsed from the configured uri.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    pub secure: bool,
}

impl Endpoint {
    pub fn parse(uri: &str) -> Result<Self, ChannelError> {
        let url = Url::parse(uri).context(InvalidUriSnafu { uri })?;
        let secure = match url.scheme() {
            "mqtt" | "tcp" => false,
            "mqtts" | "ssl" => true,
            scheme => return UnsupportedSchemeSnafu { scheme }.fail(),
        };
        let host = url.host_str().context(MissingHostSnafu { uri })?.to_string();
        let port = url.port().unwrap_or(if secure { DEFAULT_SECURE_PORT } else { DEFAULT_PORT });

        Ok(Endpoint { host, port, secure })
    }
}

/// Outbound half of the real-time channel. Every emission is fire-and-forget.
#[derive(Clone)]
pub struct ChannelClient {
    client: AsyncClient,
    root_topic: String,
}

impl ChannelClient {
    /// Sets up the connection and spawns the task driving it.
    pub fn connect(settings: &Channel) -> Result<(Self, mpsc::Receiver<ChannelNotice>), ChannelError> {
        let endpoint = Endpoint::parse(&settings.uri)?;
        let mut mqtt_options = MqttOptions::new(settings.client_id.to_owned(), endpoint.host.to_owned(), endpoint.port);
        mqtt_options.set_keep_alive(settings.keep_alive);
        if !settings.username.is_empty() {
            mqtt_options.set_credentials(settings.username.to_owned(), settings.password.to_owned());
        }
        mqtt_options.set_transport(match endpoint.secure {
            true => Transport::tls_with_config(TlsConfiguration::Rustls(Arc::new(system_tls_config()?))),
            false => Transport::tcp(),
        });

        info!("Connecting to channel at {}:{} (tls: {}).", endpoint.host, endpoint.port, endpoint.secure);
        let (client, eventloop) = AsyncClient::new(mqtt_options, 10);
        let (sender, receiver) = mpsc::channel(32);
        tokio::spawn(drive(eventloop, settings.root_topic.clone(), settings.failure_wait, sender));

        Ok((Self { client, root_topic: settings.root_topic.clone() }, receiver))
    }

    /// Subscribes to every inbound event topic, retrying with backoff.
    pub async fn subscribe(&self) -> Result<(), ChannelError> {
        for event in INBOUND_EVENTS {
            let topic = topic_for(&self.root_topic, event);
            (|| {
                let client = self.client.clone();
                let topic = topic.clone();
                async move { client.subscribe(topic, QoS::AtLeastOnce).await }
            })
                .retry(ExponentialBuilder::default().with_factor(4.0))
                .notify(|e, wait| warn!("Subscribing to {} failed ({}), retrying in {:?}.", topic, e, wait))
                .await
                .context(ClientSnafu { action: format!("subscribe to {topic}") })?;
            debug!("Subscribed to {}.", topic);
        }
        Ok(())
    }

    /// Publishes a command without waiting for delivery. Failures are logged and dropped.
    pub fn emit(&self, command: &OutboundCommand) {
        let topic = topic_for(&self.root_topic, command.name());
        let result = command.payload().and_then(|payload| {
            self.client.try_publish(&topic, QoS::AtLeastOnce, false, payload)
                .context(ClientSnafu { action: format!("publish to {topic}") })
        });

        match result {
            Ok(()) => debug!("Emitted {:?} on {}.", command, topic),
            Err(e) => warn!("Dropping {:?}: {}", command, e),
        }
    }
}

async fn drive(mut eventloop: EventLoop, root_topic: String, failure_wait: Duration, sender: mpsc::Sender<ChannelNotice>) {
    loop {
        let notice = match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                info!("Connected to channel.");
                Some(ChannelNotice::Connected)
            },
            Ok(Event::Incoming(Packet::Publish(publish))) => match decode_publish(&root_topic, &publish) {
                Ok(event) => Some(ChannelNotice::Event(event)),
                Err(e) => {
                    warn!("Ignoring message on {}: {}", publish.topic, e);
                    None
                }
            },
            Ok(_) => None,
            Err(e) => {
                error!("Channel connection error: {:?}", e);
                failure_wait_for(failure_wait).await;
                None
            }
        };

        if let Some(notice) = notice {
            if sender.send(notice).await.is_err() {
                debug!("Kiosk stopped listening, closing channel task.");
                return;
            }
        }
    }
}

async fn failure_wait_for(wait: Duration) {
    error!("Channel unavailable, waiting {:?} before reconnecting.", wait);
    tokio::time::sleep(wait).await;
}

/// Turns a received message into a validated inbound event.
pub fn decode_publish(root_topic: &str, publish: &Publish) -> Result<InboundEvent, ChannelError> {
    let event = inbound_event_for(root_topic, &publish.topic).context(UnknownTopicSnafu { topic: publish.topic.as_str() })?;
    InboundEvent::decode(event, &publish.payload)
}
