//! Server network layer: UDP IO tasks around the single event loop.
//!
//! Three background tasks do nothing but IO (receive datagrams, send
//! queued packets, sweep silent sessions); every game-visible effect
//! happens in [`Server::run`]'s `select!` loop, which drains one ordered
//! queue. Handlers therefore never interleave, which is the whole
//! concurrency story: coin claims are decided strictly in arrival order
//! without a lock in sight.

use crate::game::{ClaimOutcome, GameState};
use crate::session::SessionRegistry;
use bincode::{deserialize, serialize};
use log::{error, info, warn};
use shared::{Packet, PlayerState};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, RwLock};

/// Messages sent from network tasks to the main server loop.
#[derive(Debug)]
pub enum ServerMessage {
    PacketReceived {
        packet: Packet,
        addr: SocketAddr,
    },
    SessionTimeout {
        player_id: u32,
    },
    #[allow(dead_code)]
    Shutdown,
}

/// Messages sent from the main loop to the network sender task.
#[derive(Debug)]
pub enum GameMessage {
    SendPacket {
        packet: Packet,
        addr: SocketAddr,
    },
    BroadcastPacket {
        packet: Packet,
        exclude: Option<u32>,
    },
}

/// The authoritative server: socket, sessions and game state, plus the
/// channels wiring the IO tasks to the event loop.
pub struct Server {
    socket: Arc<UdpSocket>,
    sessions: Arc<RwLock<SessionRegistry>>,
    game_state: GameState,

    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    game_tx: mpsc::UnboundedSender<GameMessage>,
    game_rx: mpsc::UnboundedReceiver<GameMessage>,
}

impl Server {
    pub async fn new(
        addr: &str,
        max_clients: usize,
        reset_delay: Duration,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        info!("server listening on {}", socket.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (game_tx, game_rx) = mpsc::unbounded_channel();

        Ok(Server {
            socket,
            sessions: Arc::new(RwLock::new(SessionRegistry::new(max_clients))),
            game_state: GameState::new(reset_delay),
            server_tx,
            server_rx,
            game_tx,
            game_rx,
        })
    }

    /// Spawns the task that turns inbound datagrams into queued events.
    /// Undecodable payloads are logged and dropped, never fatal.
    async fn spawn_network_receiver(&self) {
        let socket = Arc::clone(&self.socket);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; 2048];

            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, addr)) => {
                        if let Ok(packet) = deserialize::<Packet>(&buffer[0..len]) {
                            if server_tx
                                .send(ServerMessage::PacketReceived { packet, addr })
                                .is_err()
                            {
                                break;
                            }
                        } else {
                            warn!("dropping malformed datagram from {}", addr);
                        }
                    }
                    Err(e) => {
                        error!("error receiving datagram: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Spawns the task that drains the outgoing packet queue.
    async fn spawn_network_sender(&mut self) {
        let socket = Arc::clone(&self.socket);
        let sessions = Arc::clone(&self.sessions);
        let mut game_rx = std::mem::replace(&mut self.game_rx, mpsc::unbounded_channel().1);

        tokio::spawn(async move {
            while let Some(message) = game_rx.recv().await {
                match message {
                    GameMessage::SendPacket { packet, addr } => {
                        if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await {
                            error!("failed to send to {}: {}", addr, e);
                        }
                    }
                    GameMessage::BroadcastPacket { packet, exclude } => {
                        let targets = {
                            let sessions_guard = sessions.read().await;
                            sessions_guard.addrs()
                        };

                        for (player_id, addr) in targets {
                            if Some(player_id) == exclude {
                                continue;
                            }
                            if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await {
                                error!("failed to send to player {}: {}", player_id, e);
                            }
                        }
                    }
                }
            }
        });
    }

    /// Spawns the task that removes sessions gone silent. The matching
    /// player removal happens back in the event loop.
    async fn spawn_timeout_sweeper(&self) {
        let sessions = Arc::clone(&self.sessions);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));

            loop {
                interval.tick().await;

                let swept = {
                    let mut sessions_guard = sessions.write().await;
                    sessions_guard.sweep_timeouts()
                };

                for player_id in swept {
                    if server_tx
                        .send(ServerMessage::SessionTimeout { player_id })
                        .is_err()
                    {
                        return;
                    }
                }
            }
        });
    }

    async fn send_packet_impl(
        socket: &UdpSocket,
        packet: &Packet,
        addr: SocketAddr,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let data = serialize(packet)?;
        socket.send_to(&data, addr).await?;
        Ok(())
    }

    async fn send_packet(&self, packet: &Packet, addr: SocketAddr) {
        if self
            .game_tx
            .send(GameMessage::SendPacket {
                packet: packet.clone(),
                addr,
            })
            .is_err()
        {
            error!("failed to queue packet for sending");
        }
    }

    async fn broadcast_packet(&self, packet: &Packet, exclude: Option<u32>) {
        if self
            .game_tx
            .send(GameMessage::BroadcastPacket {
                packet: packet.clone(),
                exclude,
            })
            .is_err()
        {
            error!("failed to queue broadcast packet");
        }
    }

    /// Applies one inbound message to the authoritative state. Runs to
    /// completion before the next message is looked at.
    async fn handle_packet(&mut self, packet: Packet, addr: SocketAddr) {
        match packet {
            Packet::Connect { client_version } => {
                info!("connection from {} (version {})", addr, client_version);

                // A repeat connect from a live address tears the old
                // identity down first; reconnects are new players.
                let existing = {
                    let sessions = self.sessions.read().await;
                    sessions.find_by_addr(addr)
                };
                if let Some(old_id) = existing {
                    info!("replacing session {} from {}", old_id, addr);
                    self.sessions.write().await.disconnect(&old_id);
                    self.game_state.remove_player(&old_id);
                    self.broadcast_packet(&Packet::PlayerDisconnected { id: old_id }, None)
                        .await;
                }

                let player_id = {
                    let mut sessions = self.sessions.write().await;
                    sessions.connect(addr)
                };

                match player_id {
                    Some(player_id) => {
                        self.game_state.add_player(player_id);

                        self.send_packet(&Packet::Connected { player_id }, addr).await;
                        self.send_packet(
                            &Packet::CurrentPlayers {
                                players: self.game_state.player_snapshot(),
                            },
                            addr,
                        )
                        .await;
                        self.send_packet(
                            &Packet::CurrentCoins {
                                coins: self.game_state.ledger.positions(),
                            },
                            addr,
                        )
                        .await;

                        self.broadcast_packet(
                            &Packet::NewPlayer {
                                id: player_id,
                                player: PlayerState::at_spawn(),
                            },
                            Some(player_id),
                        )
                        .await;
                    }
                    None => {
                        self.send_packet(
                            &Packet::Disconnected {
                                reason: "Server full".to_string(),
                            },
                            addr,
                        )
                        .await;
                    }
                }
            }

            Packet::PlayerMovement { x, y } => {
                let player_id = {
                    let mut sessions = self.sessions.write().await;
                    sessions.touch_by_addr(addr)
                };

                // Unknown senders are ignored: the session may have been
                // swept while this report was in flight.
                if let Some(id) = player_id {
                    if self.game_state.report_movement(id, x, y) {
                        self.broadcast_packet(&Packet::PlayerMoved { id, x, y }, Some(id))
                            .await;
                    }
                }
            }

            Packet::CollectCoin { coin_index } => {
                let player_id = {
                    let mut sessions = self.sessions.write().await;
                    sessions.touch_by_addr(addr)
                };

                if let Some(id) = player_id {
                    self.handle_claim(id, coin_index).await;
                }
            }

            Packet::Disconnect => {
                let player_id = {
                    let sessions = self.sessions.read().await;
                    sessions.find_by_addr(addr)
                };

                if let Some(id) = player_id {
                    self.sessions.write().await.disconnect(&id);
                    self.game_state.remove_player(&id);
                    self.broadcast_packet(&Packet::PlayerDisconnected { id }, None)
                        .await;
                }
            }

            _ => {
                warn!("unexpected server-bound packet from {}", addr);
            }
        }
    }

    /// Decides one claim. Acceptance broadcasts the removal to everyone
    /// (sender included, since its index space must shift too); rejection
    /// stays silent on the wire. The claim that empties the ledger ends
    /// the round.
    async fn handle_claim(&mut self, player_id: u32, coin_index: u32) {
        match self.game_state.claim_coin(player_id, coin_index) {
            ClaimOutcome::Accepted {
                coin_index,
                new_score,
            } => {
                self.broadcast_packet(
                    &Packet::CoinCollected {
                        coin_index,
                        player_id,
                        new_score,
                    },
                    None,
                )
                .await;

                if self.game_state.ledger.is_empty() {
                    if let Some(winner_id) = self.game_state.finish_round(Instant::now()) {
                        self.broadcast_packet(
                            &Packet::GameOver {
                                winner_id,
                                players: self.game_state.player_snapshot(),
                            },
                            None,
                        )
                        .await;
                    }
                }
            }
            ClaimOutcome::Rejected => {}
        }
    }

    /// Fires the scheduled round reset: restock coins, zero scores,
    /// clear the winner, tell everyone.
    async fn perform_reset(&mut self) {
        let coins = self.game_state.begin_round();

        self.broadcast_packet(&Packet::ResetCoins { coins }, None).await;
        self.broadcast_packet(
            &Packet::ResetScores {
                players: self.game_state.player_snapshot(),
            },
            None,
        )
        .await;
    }

    /// Resolves when the pending reset deadline elapses; never resolves
    /// while no reset is scheduled.
    async fn sleep_until_reset(deadline: Option<Instant>) {
        match deadline {
            Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
            None => std::future::pending().await,
        }
    }

    /// Main event loop. Every handler runs to completion before the next
    /// event is taken, including the reset timer firing.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.spawn_network_receiver().await;
        self.spawn_network_sender().await;
        self.spawn_timeout_sweeper().await;

        info!("server started");

        loop {
            let reset_deadline = self.game_state.round.reset_deadline();

            tokio::select! {
                message = self.server_rx.recv() => {
                    match message {
                        Some(ServerMessage::PacketReceived { packet, addr }) => {
                            self.handle_packet(packet, addr).await;
                        }
                        Some(ServerMessage::SessionTimeout { player_id }) => {
                            info!("player {} timed out", player_id);
                            self.game_state.remove_player(&player_id);
                            self.broadcast_packet(
                                &Packet::PlayerDisconnected { id: player_id },
                                None,
                            )
                            .await;
                        }
                        Some(ServerMessage::Shutdown) | None => {
                            info!("server shutting down");
                            break;
                        }
                    }
                },

                _ = Self::sleep_until_reset(reset_deadline) => {
                    self.perform_reset().await;
                },
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{initial_coin_layout, reset_coin_layout, PROTOCOL_VERSION};

    async fn test_server() -> Server {
        Server::new("127.0.0.1:0", 8, Duration::from_secs(5))
            .await
            .expect("bind test server")
    }

    fn drain(server: &mut Server) -> Vec<GameMessage> {
        let mut queued = Vec::new();
        while let Ok(message) = server.game_rx.try_recv() {
            queued.push(message);
        }
        queued
    }

    fn client_addr(port: u16) -> SocketAddr {
        SocketAddr::new("127.0.0.1".parse().unwrap(), port)
    }

    #[test]
    fn connect_sends_snapshot_and_announces() {
        tokio_test::block_on(async {
            let mut server = test_server().await;
            let addr = client_addr(9100);

            server
                .handle_packet(
                    Packet::Connect {
                        client_version: PROTOCOL_VERSION,
                    },
                    addr,
                )
                .await;

            let queued = drain(&mut server);
            assert_eq!(queued.len(), 4);

            match &queued[0] {
                GameMessage::SendPacket {
                    packet: Packet::Connected { player_id },
                    addr: to,
                } => {
                    assert_eq!(*player_id, 1);
                    assert_eq!(*to, addr);
                }
                other => panic!("expected Connected, got {:?}", other),
            }
            match &queued[1] {
                GameMessage::SendPacket {
                    packet: Packet::CurrentPlayers { players },
                    ..
                } => assert_eq!(players.len(), 1),
                other => panic!("expected CurrentPlayers, got {:?}", other),
            }
            match &queued[2] {
                GameMessage::SendPacket {
                    packet: Packet::CurrentCoins { coins },
                    ..
                } => assert_eq!(coins, &initial_coin_layout()),
                other => panic!("expected CurrentCoins, got {:?}", other),
            }
            match &queued[3] {
                GameMessage::BroadcastPacket {
                    packet: Packet::NewPlayer { id, .. },
                    exclude,
                } => {
                    assert_eq!(*id, 1);
                    assert_eq!(*exclude, Some(1));
                }
                other => panic!("expected NewPlayer broadcast, got {:?}", other),
            }
        });
    }

    #[test]
    fn movement_broadcast_excludes_sender() {
        tokio_test::block_on(async {
            let mut server = test_server().await;
            let addr = client_addr(9101);

            server
                .handle_packet(Packet::Connect { client_version: 1 }, addr)
                .await;
            drain(&mut server);

            server
                .handle_packet(Packet::PlayerMovement { x: 250.0, y: 310.0 }, addr)
                .await;

            assert_eq!(server.game_state.players[&1].x, 250.0);
            assert_eq!(server.game_state.players[&1].y, 310.0);

            let queued = drain(&mut server);
            assert_eq!(queued.len(), 1);
            match &queued[0] {
                GameMessage::BroadcastPacket {
                    packet: Packet::PlayerMoved { id, x, y },
                    exclude,
                } => {
                    assert_eq!((*id, *x, *y), (1, 250.0, 310.0));
                    assert_eq!(*exclude, Some(1));
                }
                other => panic!("expected PlayerMoved, got {:?}", other),
            }
        });
    }

    #[test]
    fn movement_from_unknown_address_is_dropped() {
        tokio_test::block_on(async {
            let mut server = test_server().await;

            server
                .handle_packet(Packet::PlayerMovement { x: 1.0, y: 2.0 }, client_addr(9102))
                .await;

            assert!(server.game_state.players.is_empty());
            assert!(drain(&mut server).is_empty());
        });
    }

    #[test]
    fn claiming_every_coin_ends_the_round_and_resets() {
        tokio_test::block_on(async {
            let mut server = test_server().await;
            let addr = client_addr(9103);

            server
                .handle_packet(Packet::Connect { client_version: 1 }, addr)
                .await;
            drain(&mut server);

            // Claim the head of the sequence until the ledger is empty.
            let total = initial_coin_layout().len();
            for _ in 0..total {
                server
                    .handle_packet(Packet::CollectCoin { coin_index: 0 }, addr)
                    .await;
            }

            let queued = drain(&mut server);
            let collected = queued
                .iter()
                .filter(|m| {
                    matches!(
                        m,
                        GameMessage::BroadcastPacket {
                            packet: Packet::CoinCollected { .. },
                            ..
                        }
                    )
                })
                .count();
            assert_eq!(collected, total);

            let game_overs: Vec<_> = queued
                .iter()
                .filter_map(|m| match m {
                    GameMessage::BroadcastPacket {
                        packet: Packet::GameOver { winner_id, players },
                        ..
                    } => Some((*winner_id, players.clone())),
                    _ => None,
                })
                .collect();
            assert_eq!(game_overs.len(), 1);
            assert_eq!(game_overs[0].0, Some(1));
            assert_eq!(game_overs[0].1[&1].score, total as u32);

            // A stale claim after the round ends stays silent.
            server
                .handle_packet(Packet::CollectCoin { coin_index: 0 }, addr)
                .await;
            assert!(drain(&mut server).is_empty());

            assert!(server.game_state.round.reset_deadline().is_some());

            server.perform_reset().await;
            let queued = drain(&mut server);
            assert_eq!(queued.len(), 2);
            match &queued[0] {
                GameMessage::BroadcastPacket {
                    packet: Packet::ResetCoins { coins },
                    ..
                } => assert_eq!(coins, &reset_coin_layout()),
                other => panic!("expected ResetCoins, got {:?}", other),
            }
            match &queued[1] {
                GameMessage::BroadcastPacket {
                    packet: Packet::ResetScores { players },
                    ..
                } => assert!(players.values().all(|p| p.score == 0)),
                other => panic!("expected ResetScores, got {:?}", other),
            }
            assert!(server.game_state.round.reset_deadline().is_none());
        });
    }

    #[test]
    fn disconnect_removes_player_and_announces() {
        tokio_test::block_on(async {
            let mut server = test_server().await;
            let addr = client_addr(9104);

            server
                .handle_packet(Packet::Connect { client_version: 1 }, addr)
                .await;
            drain(&mut server);

            server.handle_packet(Packet::Disconnect, addr).await;

            assert!(server.game_state.players.is_empty());
            let queued = drain(&mut server);
            assert_eq!(queued.len(), 1);
            assert!(matches!(
                &queued[0],
                GameMessage::BroadcastPacket {
                    packet: Packet::PlayerDisconnected { id: 1 },
                    exclude: None,
                }
            ));
        });
    }

    #[test]
    fn reconnect_from_same_address_replaces_identity() {
        tokio_test::block_on(async {
            let mut server = test_server().await;
            let addr = client_addr(9105);

            server
                .handle_packet(Packet::Connect { client_version: 1 }, addr)
                .await;
            drain(&mut server);

            server
                .handle_packet(Packet::Connect { client_version: 1 }, addr)
                .await;

            let queued = drain(&mut server);
            assert!(matches!(
                &queued[0],
                GameMessage::BroadcastPacket {
                    packet: Packet::PlayerDisconnected { id: 1 },
                    ..
                }
            ));
            assert!(server.game_state.players.contains_key(&2));
            assert!(!server.game_state.players.contains_key(&1));
        });
    }
}
