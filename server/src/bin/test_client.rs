use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use log::{info, warn};
use shared::{ClientEvent, Direction, ServerEvent};
use std::time::Duration;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Headless client that joins the game, readies up and wiggles its paddle
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server WebSocket URL
    #[arg(short, long, default_value = "ws://127.0.0.1:3000")]
    server: String,

    /// Number of paddle moves to send once the match starts
    #[arg(short, long, default_value_t = 40)]
    moves: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    println!("Connecting to {}", args.server);
    let (ws_stream, _) = connect_async(args.server.as_str()).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    ws_sender
        .send(Message::Text(ClientEvent::PlayerReady.to_json()?))
        .await?;
    println!("Sent playerReady, waiting for an opponent...");

    let mut moves_sent = 0;
    let mut ball_updates = 0u64;

    while let Some(frame) = ws_receiver.next().await {
        let text = match frame? {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        let event = match ServerEvent::from_json(&text) {
            Ok(event) => event,
            Err(e) => {
                warn!("Unrecognized event {}: {}", text, e);
                continue;
            }
        };

        match event {
            ServerEvent::GameFull => println!("Game is full"),
            ServerEvent::PlayerAssigned(role) => println!("Assigned {}", role),
            ServerEvent::GameState(snapshot) => {
                println!(
                    "State: {} players, score {}-{}",
                    snapshot.players.len(),
                    snapshot.score.player1,
                    snapshot.score.player2
                );
            }
            ServerEvent::GameStart(_) => println!("Match started"),
            ServerEvent::PaddleUpdate(update) => {
                info!("Paddles at {} / {}", update.paddle1.y, update.paddle2.y);
            }
            ServerEvent::BallUpdate(update) => {
                ball_updates += 1;
                if ball_updates % 30 == 0 {
                    println!(
                        "Ball ({:.1}, {:.1}) score {}-{}",
                        update.ball.x, update.ball.y, update.score.player1, update.score.player2
                    );
                }

                if moves_sent < args.moves {
                    let direction = if (moves_sent / 10) % 2 == 0 {
                        Direction::Up
                    } else {
                        Direction::Down
                    };
                    ws_sender
                        .send(Message::Text(ClientEvent::PaddleMove(direction).to_json()?))
                        .await?;
                    moves_sent += 1;
                }
            }
            ServerEvent::PointScored { player } => println!("Point for Player {}", player.number()),
            ServerEvent::GameOver { winner } => {
                println!("Game over, {} wins", winner);
                break;
            }
            ServerEvent::PlayerDisconnected => {
                println!("Opponent disconnected");
                break;
            }
        }
    }

    ws_sender.send(Message::Close(None)).await.ok();
    // Give the close frame a moment to go out
    sleep(Duration::from_millis(50)).await;
    println!("Test client finished");

    Ok(())
}
