//! Headless scripted client for smoke-testing a running server.
//!
//! Connects, drops onto the nearest platform, walks right for a while
//! while claiming any coin it overlaps, then disconnects. Prints every
//! broadcast it sees along the way.

use bincode::{deserialize, serialize};
use clap::Parser;
use shared::{
    default_platform_layout, Packet, PhysicsBody, Vec2, World, MOVE_SPEED, PLAYER_HEIGHT,
    PLAYER_WIDTH, PROTOCOL_VERSION, SPAWN_X, SPAWN_Y,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::sleep;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    server: String,

    /// How many simulation ticks to run
    #[arg(short, long, default_value = "600")]
    ticks: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let server_addr: SocketAddr = args.server.parse()?;

    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    println!("bot socket bound to {}", socket.local_addr()?);

    let connect = Packet::Connect {
        client_version: PROTOCOL_VERSION,
    };
    socket.send_to(&serialize(&connect)?, server_addr).await?;

    let mut buf = [0u8; 2048];
    let mut world = World::new(default_platform_layout());
    let mut body = PhysicsBody::new(
        Vec2::new(SPAWN_X, SPAWN_Y),
        Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
    );
    let mut player_id = None;
    let mut seeded = false;

    // Wait for the identity assignment and coin snapshot before
    // simulating.
    while player_id.is_none() || !seeded {
        let (len, _) = socket.recv_from(&mut buf).await?;
        match deserialize::<Packet>(&buf[0..len]) {
            Ok(Packet::Connected { player_id: id }) => {
                println!("connected as player {}", id);
                player_id = Some(id);
            }
            Ok(Packet::CurrentCoins { coins }) => {
                println!("seeded with {} coins", coins.len());
                world.set_coins(coins);
                seeded = true;
            }
            Ok(Packet::CurrentPlayers { players }) => {
                println!("{} players already in game", players.len());
            }
            Ok(other) => println!("pre-join broadcast: {:?}", other),
            Err(e) => println!("undecodable packet: {}", e),
        }
    }

    for tick in 0..args.ticks {
        body.velocity.x = MOVE_SPEED;
        if body.grounded && tick % 90 == 0 {
            body.jump();
        }
        body.integrate();
        body.resolve_ground_collision(world.platforms());

        let movement = Packet::PlayerMovement {
            x: body.position.x,
            y: body.position.y,
        };
        socket.send_to(&serialize(&movement)?, server_addr).await?;

        for index in world.collect_overlapping(&body.bounds()) {
            println!("tick {}: claiming coin at index {}", tick, index);
            let claim = Packet::CollectCoin {
                coin_index: index as u32,
            };
            socket.send_to(&serialize(&claim)?, server_addr).await?;
        }

        // Drain whatever the server pushed since the last tick.
        while let Ok((len, _)) = socket.try_recv_from(&mut buf) {
            if let Ok(packet) = deserialize::<Packet>(&buf[0..len]) {
                match packet {
                    Packet::CoinCollected {
                        coin_index,
                        player_id: collector,
                        new_score,
                    } => {
                        println!(
                            "coin {} collected by player {} (score {})",
                            coin_index, collector, new_score
                        );
                        if Some(collector) != player_id {
                            world.remove_coin(coin_index as usize);
                        }
                    }
                    Packet::GameOver { winner_id, .. } => {
                        println!("game over, winner: {:?}", winner_id);
                    }
                    Packet::ResetCoins { coins } => {
                        println!("coins reset ({})", coins.len());
                        world.set_coins(coins);
                    }
                    other => println!("broadcast: {:?}", other),
                }
            }
        }

        sleep(Duration::from_millis(16)).await;
    }

    println!("bot finished, disconnecting");
    socket
        .send_to(&serialize(&Packet::Disconnect)?, server_addr)
        .await?;

    Ok(())
}
