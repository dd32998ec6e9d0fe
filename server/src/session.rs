//! Connection bookkeeping for the server.
//!
//! The registry is the single source of truth for who is in the game.
//! Identities are connection-scoped: ids are handed out from a monotonic
//! counter, so a reconnecting player is a new player, and ascending id
//! order is join order.

use log::info;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// How long a session may stay silent before it is swept.
const SESSION_TIMEOUT: Duration = Duration::from_secs(5);

/// One connected client: its identity, return address and liveness.
#[derive(Debug)]
pub struct Session {
    pub id: u32,
    pub addr: SocketAddr,
    pub last_seen: Instant,
}

impl Session {
    pub fn new(id: u32, addr: SocketAddr) -> Self {
        Self {
            id,
            addr,
            last_seen: Instant::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

/// All live sessions, capacity-limited, indexed by player id.
pub struct SessionRegistry {
    sessions: HashMap<u32, Session>,
    next_id: u32,
    max_sessions: usize,
}

impl SessionRegistry {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            next_id: 1,
            max_sessions,
        }
    }

    /// Admits a connection and allocates its identity, or `None` at
    /// capacity.
    pub fn connect(&mut self, addr: SocketAddr) -> Option<u32> {
        if self.sessions.len() >= self.max_sessions {
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;

        info!("player {} connected from {}", id, addr);
        self.sessions.insert(id, Session::new(id, addr));
        Some(id)
    }

    /// Removes a session. Returns false if it was already gone.
    pub fn disconnect(&mut self, id: &u32) -> bool {
        if let Some(session) = self.sessions.remove(id) {
            info!("player {} disconnected", session.id);
            true
        } else {
            false
        }
    }

    /// Resolves an inbound datagram's source to a player id, refreshing
    /// the session's liveness on a hit.
    pub fn touch_by_addr(&mut self, addr: SocketAddr) -> Option<u32> {
        let session = self.sessions.values_mut().find(|s| s.addr == addr)?;
        session.touch();
        Some(session.id)
    }

    pub fn find_by_addr(&self, addr: SocketAddr) -> Option<u32> {
        self.sessions
            .values()
            .find(|s| s.addr == addr)
            .map(|s| s.id)
    }

    /// Removes every session that has gone silent and returns their ids
    /// so the game state can drop the matching players.
    pub fn sweep_timeouts(&mut self) -> Vec<u32> {
        let timed_out: Vec<u32> = self
            .sessions
            .values()
            .filter(|s| s.is_timed_out(SESSION_TIMEOUT))
            .map(|s| s.id)
            .collect();

        for id in &timed_out {
            self.disconnect(id);
        }

        timed_out
    }

    /// `(id, addr)` of every live session, for broadcasting.
    pub fn addrs(&self) -> Vec<(u32, SocketAddr)> {
        self.sessions.values().map(|s| (s.id, s.addr)).collect()
    }

    pub fn addr_of(&self, id: &u32) -> Option<SocketAddr> {
        self.sessions.get(id).map(|s| s.addr)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
