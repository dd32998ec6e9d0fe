//! Client network layer: connection handshake plus the frame loop.

use crate::game::ClientSimulator;
use crate::input::InputManager;
use crate::rendering::{Renderer, Scene};
use bincode::{deserialize, serialize};
use log::{error, info, warn};
use macroquad::window::next_frame;
use shared::{Packet, PROTOCOL_VERSION};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::interval;

pub struct Client {
    socket: UdpSocket,
    server_addr: SocketAddr,
    connected: bool,

    simulator: ClientSimulator,
    input: InputManager,
    renderer: Renderer,
}

impl Client {
    pub async fn new(
        server_addr: &str,
        width: usize,
        height: usize,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        let server_addr = server_addr.parse()?;

        Ok(Client {
            socket,
            server_addr,
            connected: false,
            simulator: ClientSimulator::new(),
            input: InputManager::new(),
            renderer: Renderer::new(width, height),
        })
    }

    async fn connect(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        info!("connecting to {}", self.server_addr);
        self.send_packet(&Packet::Connect {
            client_version: PROTOCOL_VERSION,
        })
        .await
    }

    async fn send_packet(&self, packet: &Packet) -> Result<(), Box<dyn std::error::Error>> {
        let data = serialize(packet)?;
        self.socket.send_to(&data, self.server_addr).await?;
        Ok(())
    }

    async fn handle_packet(&mut self, packet: Packet) {
        match packet {
            Packet::Connected { player_id } => {
                info!("connected as player {}", player_id);
                self.connected = true;
                self.simulator.player_id = Some(player_id);
            }

            Packet::Disconnected { reason } => {
                warn!("server closed the connection: {}", reason);
                self.connected = false;
                self.simulator.player_id = None;
            }

            other => self.simulator.apply(other),
        }
    }

    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.connect().await?;

        let mut frame_interval = interval(Duration::from_millis(16));
        let mut buffer = [0u8; 2048];

        loop {
            tokio::select! {
                result = self.socket.recv_from(&mut buffer) => {
                    match result {
                        Ok((len, _)) => {
                            if let Ok(packet) = deserialize::<Packet>(&buffer[0..len]) {
                                self.handle_packet(packet).await;
                            } else {
                                warn!("dropping malformed packet from server");
                            }
                        }
                        Err(e) => error!("error receiving packet: {}", e),
                    }
                },

                _ = frame_interval.tick() => {
                    if self.input.quit_requested() {
                        break;
                    }

                    let sample = self.input.sample();

                    if self.connected {
                        // Fire-and-forget: the simulation never waits on
                        // the server.
                        for packet in self.simulator.tick(&sample) {
                            if let Err(e) = self.send_packet(&packet).await {
                                error!("error sending packet: {}", e);
                            }
                        }
                    }

                    self.renderer.render(Scene {
                        world: &self.simulator.world,
                        local_position: self.simulator.body.position,
                        score: self.simulator.score,
                        remote_players: &self.simulator.remote_players,
                        winner: self.simulator.winner,
                        player_id: self.simulator.player_id,
                    });
                    next_frame().await;
                },
            }
        }

        if self.connected {
            let _ = self.send_packet(&Packet::Disconnect).await;
        }

        Ok(())
    }
}
