//! Server network layer handling WebSocket connections and game loop coordination

use crate::client_manager::{Outbound, OutboundSender};
use crate::session::Session;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::{ClientEvent, ClientId};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Messages sent from connection tasks to the main server loop
#[derive(Debug)]
pub enum ServerMessage {
    Connected {
        client_id: ClientId,
        sender: OutboundSender,
    },
    EventReceived {
        client_id: ClientId,
        event: ClientEvent,
    },
    Disconnected {
        client_id: ClientId,
    },
    Shutdown,
}

/// Main server coordinating connections and game simulation
///
/// The run loop is the only owner of the [`Session`]. Connection events and
/// physics ticks arrive on one `select!` and are handled one at a time.
pub struct Server {
    listener: Arc<TcpListener>,
    session: Session,
    tick_duration: Duration,

    // Communication channels
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl Server {
    pub async fn new(
        addr: &str,
        tick_duration: Duration,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        if tick_duration.is_zero() {
            return Err("tick interval must be greater than zero".into());
        }

        let listener = Arc::new(TcpListener::bind(addr).await?);
        info!("Server listening on {}", listener.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener,
            session: Session::new(),
            tick_duration,
            server_tx,
            server_rx,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Returns a sender into the main loop, e.g. to request [`ServerMessage::Shutdown`]
    pub fn handle(&self) -> mpsc::UnboundedSender<ServerMessage> {
        self.server_tx.clone()
    }

    /// Spawns task that accepts TCP connections and hands each one its own task
    fn spawn_acceptor(&self) {
        let listener = Arc::clone(&self.listener);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut next_client_id: ClientId = 1;

            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => {
                        if server_tx.is_closed() {
                            break;
                        }
                        let client_id = next_client_id;
                        next_client_id = next_client_id.wrapping_add(1);
                        tokio::spawn(handle_connection(
                            stream,
                            addr,
                            client_id,
                            server_tx.clone(),
                        ));
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    fn handle_message(&mut self, message: ServerMessage) -> bool {
        match message {
            ServerMessage::Connected { client_id, sender } => {
                self.session.handle_connect(client_id, sender);
            }
            ServerMessage::EventReceived { client_id, event } => {
                self.session.handle_event(client_id, event, Instant::now());
            }
            ServerMessage::Disconnected { client_id } => {
                self.session.handle_disconnect(client_id);
            }
            ServerMessage::Shutdown => return false,
        }
        true
    }

    /// Main server loop coordinating all operations
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.spawn_acceptor();

        let mut tick_interval = interval(self.tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Server started successfully");

        loop {
            tokio::select! {
                // Handle connection events in arrival order
                message = self.server_rx.recv() => {
                    let keep_running = match message {
                        Some(message) => self.handle_message(message),
                        None => false,
                    };
                    if !keep_running {
                        info!("Server shutting down");
                        break;
                    }
                },

                // Handle server tick events
                _ = tick_interval.tick() => {
                    self.session.tick();
                },
            }
        }

        Ok(())
    }
}

/// Drives one WebSocket connection until either side closes it
///
/// Inbound frames are parsed and forwarded to the main loop; outbound events
/// are drained from the connection's own queue by a writer task.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    client_id: ClientId,
    server_tx: mpsc::UnboundedSender<ServerMessage>,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake with {} failed: {}", addr, e);
            return;
        }
    };
    info!("Connection {} opened from {}", client_id, addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Outbound>();

    if server_tx
        .send(ServerMessage::Connected {
            client_id,
            sender: out_tx,
        })
        .is_err()
    {
        return;
    }

    let mut writer = tokio::spawn(async move {
        while let Some(outbound) = out_rx.recv().await {
            match outbound {
                Outbound::Event(event) => {
                    let text = match event.to_json() {
                        Ok(text) => text,
                        Err(e) => {
                            error!("Failed to serialize event: {}", e);
                            continue;
                        }
                    };
                    if let Err(e) = ws_sender.send(Message::Text(text)).await {
                        debug!("Write to connection {} failed: {}", client_id, e);
                        break;
                    }
                }
                Outbound::Close => {
                    let _ = ws_sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    loop {
        tokio::select! {
            frame = ws_receiver.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => match ClientEvent::from_json(&text) {
                        Ok(event) => {
                            if server_tx
                                .send(ServerMessage::EventReceived { client_id, event })
                                .is_err()
                            {
                                break;
                            }
                        }
                        // Malformed frames are dropped silently
                        Err(_) => {}
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!("Connection {} read error: {}", client_id, e);
                        break;
                    }
                }
            },

            // Writer finished: the server closed this connection
            _ = &mut writer => break,
        }
    }

    writer.abort();
    let _ = server_tx.send(ServerMessage::Disconnected { client_id });
    info!("Connection {} closed", client_id);
}
