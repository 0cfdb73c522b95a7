//! Connection registry and fan-out for the two player slots
//!
//! This module tracks which connections currently hold a player slot:
//! - Role assignment (Player 1 / Player 2) and rejection of excess connections
//! - Per-slot readiness flags
//! - Per-connection input throttling state
//! - Point-to-point and broadcast delivery onto each connection's outbound queue
//!
//! Delivery is fire-and-forget. Each client owns an unbounded queue drained by
//! its writer task, so pushing an event never waits on the network.

use log::{debug, info, warn};
use shared::{ClientId, PlayerSlot, Role, ServerEvent, INPUT_THROTTLE};
use std::collections::BTreeMap;
use std::time::Instant;
use tokio::sync::mpsc;

/// Frames queued for a single connection's writer task
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Event(ServerEvent),
    /// Close the transport once everything queued before it has been written
    Close,
}

pub type OutboundSender = mpsc::UnboundedSender<Outbound>;

/// A connection that holds one of the two player slots
#[derive(Debug)]
pub struct Client {
    /// Connection identifier assigned by the accept loop
    pub id: ClientId,
    /// Paddle and score side controlled by this connection
    pub role: Role,
    /// Set by an explicit `playerReady`, cleared only by a full reset
    pub ready: bool,
    /// When the last paddle input from this connection was accepted
    pub last_input: Option<Instant>,
    sender: OutboundSender,
}

impl Client {
    pub fn new(id: ClientId, role: Role, sender: OutboundSender) -> Self {
        Self {
            id,
            role,
            ready: false,
            last_input: None,
            sender,
        }
    }

    /// Queues an event for this connection
    ///
    /// A closed queue means the connection is already going away; its
    /// disconnect is on its way through the inbound queue, so the event
    /// is simply dropped.
    pub fn send(&self, event: ServerEvent) {
        if self.sender.send(Outbound::Event(event)).is_err() {
            debug!("Dropping event for closed connection {}", self.id);
        }
    }

    /// Applies the per-connection input throttle
    ///
    /// Returns true and records `now` if at least [`INPUT_THROTTLE`] has
    /// passed since the previously accepted input.
    pub fn try_accept_input(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_input {
            if now.saturating_duration_since(last) < INPUT_THROTTLE {
                return false;
            }
        }
        self.last_input = Some(now);
        true
    }
}

/// Tracks the (at most two) connections that hold a player slot
///
/// Roles are handed out lowest-free-first, so they stay unique across the
/// current connections no matter which side disconnected earlier.
#[derive(Debug, Default)]
pub struct ClientManager {
    clients: BTreeMap<ClientId, Client>,
}

impl ClientManager {
    /// Number of player slots in the single shared game
    pub const MAX_CLIENTS: usize = 2;

    pub fn new() -> Self {
        Self {
            clients: BTreeMap::new(),
        }
    }

    /// Attempts to give a new connection a player slot
    ///
    /// Returns the assigned role, or None if both slots are taken or `id`
    /// already holds one.
    pub fn add_client(&mut self, id: ClientId, sender: OutboundSender) -> Option<Role> {
        if self.clients.contains_key(&id) {
            warn!("Connection {} already holds a slot", id);
            return None;
        }

        if self.clients.len() >= Self::MAX_CLIENTS {
            return None;
        }

        let role = Role::ALL
            .into_iter()
            .find(|role| self.clients.values().all(|client| client.role != *role))?;

        info!("Connection {} assigned {}", id, role);
        self.clients.insert(id, Client::new(id, role, sender));
        Some(role)
    }

    /// Releases a connection's slot, returning it if one was held
    pub fn remove_client(&mut self, id: &ClientId) -> Option<Client> {
        let client = self.clients.remove(id)?;
        info!("{} (connection {}) left", client.role, id);
        Some(client)
    }

    pub fn get(&self, id: &ClientId) -> Option<&Client> {
        self.clients.get(id)
    }

    pub fn get_mut(&mut self, id: &ClientId) -> Option<&mut Client> {
        self.clients.get_mut(id)
    }

    /// Marks a slot ready. Returns false for connections without a slot.
    pub fn mark_ready(&mut self, id: &ClientId) -> bool {
        match self.clients.get_mut(id) {
            Some(client) => {
                client.ready = true;
                true
            }
            None => false,
        }
    }

    /// True when both slots are occupied and both players are ready
    pub fn all_ready(&self) -> bool {
        self.is_full() && self.clients.values().all(|client| client.ready)
    }

    /// Player slots keyed by connection id, as they appear in snapshots
    pub fn slots(&self) -> BTreeMap<ClientId, PlayerSlot> {
        self.clients
            .iter()
            .map(|(id, client)| {
                (
                    *id,
                    PlayerSlot {
                        player: client.role,
                        ready: client.ready,
                    },
                )
            })
            .collect()
    }

    /// Sends an event to a single connection, if it holds a slot
    pub fn send_to(&self, id: &ClientId, event: ServerEvent) {
        if let Some(client) = self.clients.get(id) {
            client.send(event);
        }
    }

    /// Sends an event to every connection holding a slot
    pub fn broadcast(&self, event: &ServerEvent) {
        for client in self.clients.values() {
            client.send(event.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.clients.len() == Self::MAX_CLIENTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn channel() -> (OutboundSender, mpsc::UnboundedReceiver<Outbound>) {
        mpsc::unbounded_channel()
    }

    #[test]
    fn test_roles_assigned_in_order() {
        let mut manager = ClientManager::new();
        let (tx1, _rx1) = channel();
        let (tx2, _rx2) = channel();
        let (tx3, _rx3) = channel();

        assert_eq!(manager.add_client(1, tx1), Some(Role::One));
        assert_eq!(manager.add_client(2, tx2), Some(Role::Two));
        assert_eq!(manager.add_client(3, tx3), None);
        assert_eq!(manager.len(), 2);
        assert!(manager.is_full());
        assert!(manager.get(&3).is_none());
    }

    #[test]
    fn test_freed_role_is_reassigned() {
        let mut manager = ClientManager::new();
        let (tx1, _rx1) = channel();
        let (tx2, _rx2) = channel();
        let (tx3, _rx3) = channel();

        manager.add_client(1, tx1);
        manager.add_client(2, tx2);

        // Player 1 leaves; the survivor keeps Two, the newcomer gets One
        assert!(manager.remove_client(&1).is_some());
        assert_eq!(manager.add_client(3, tx3), Some(Role::One));
        assert_eq!(manager.get(&2).map(|c| c.role), Some(Role::Two));
    }

    #[test]
    fn test_roles_stay_unique_under_churn() {
        let mut manager = ClientManager::new();
        let mut receivers = Vec::new();

        for id in 1..=20u64 {
            let (tx, rx) = channel();
            receivers.push(rx);
            manager.add_client(id, tx);
            if id % 3 == 0 {
                let first = manager.slots().keys().next().copied();
                if let Some(first) = first {
                    manager.remove_client(&first);
                }
            }

            let roles: Vec<Role> = manager.slots().values().map(|slot| slot.player).collect();
            assert!(roles.len() <= ClientManager::MAX_CLIENTS);
            if roles.len() == 2 {
                assert_ne!(roles[0], roles[1]);
            }
        }
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let mut manager = ClientManager::new();
        let (tx1, mut rx1) = channel();
        let (tx2, _rx2) = channel();

        assert_eq!(manager.add_client(1, tx1), Some(Role::One));
        assert_eq!(manager.add_client(1, tx2), None);
        assert_eq!(manager.len(), 1);

        // The original connection keeps its slot and its own queue
        manager.send_to(&1, ServerEvent::GameFull);
        assert_eq!(rx1.try_recv().unwrap(), Outbound::Event(ServerEvent::GameFull));
    }

    #[test]
    fn test_remove_unknown_client() {
        let mut manager = ClientManager::new();
        assert!(manager.remove_client(&42).is_none());
        assert!(manager.is_empty());
    }

    #[test]
    fn test_all_ready_requires_two_players() {
        let mut manager = ClientManager::new();
        let (tx1, _rx1) = channel();
        let (tx2, _rx2) = channel();

        manager.add_client(1, tx1);
        assert!(manager.mark_ready(&1));
        assert!(!manager.all_ready());

        manager.add_client(2, tx2);
        assert!(!manager.all_ready());
        assert!(manager.mark_ready(&2));
        assert!(manager.all_ready());

        assert!(!manager.mark_ready(&9));
    }

    #[test]
    fn test_input_throttle() {
        let (tx, _rx) = channel();
        let mut client = Client::new(1, Role::One, tx);
        let start = Instant::now();

        assert!(client.try_accept_input(start));
        assert!(!client.try_accept_input(start + Duration::from_millis(10)));
        assert!(client.try_accept_input(start + INPUT_THROTTLE));
        assert!(!client.try_accept_input(start + INPUT_THROTTLE + Duration::from_millis(15)));
    }

    #[test]
    fn test_broadcast_and_send_to() {
        let mut manager = ClientManager::new();
        let (tx1, mut rx1) = channel();
        let (tx2, mut rx2) = channel();
        manager.add_client(1, tx1);
        manager.add_client(2, tx2);

        manager.broadcast(&ServerEvent::PlayerDisconnected);
        manager.send_to(&2, ServerEvent::PlayerAssigned(Role::Two));

        assert_eq!(
            rx1.try_recv().unwrap(),
            Outbound::Event(ServerEvent::PlayerDisconnected)
        );
        assert!(rx1.try_recv().is_err());

        assert_eq!(
            rx2.try_recv().unwrap(),
            Outbound::Event(ServerEvent::PlayerDisconnected)
        );
        assert_eq!(
            rx2.try_recv().unwrap(),
            Outbound::Event(ServerEvent::PlayerAssigned(Role::Two))
        );
    }

    #[test]
    fn test_send_to_closed_connection_is_ignored() {
        let mut manager = ClientManager::new();
        let (tx, rx) = channel();
        manager.add_client(1, tx);
        drop(rx);

        manager.broadcast(&ServerEvent::GameFull);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_slots_snapshot() {
        let mut manager = ClientManager::new();
        let (tx1, _rx1) = channel();
        let (tx2, _rx2) = channel();
        manager.add_client(5, tx1);
        manager.add_client(9, tx2);
        manager.mark_ready(&9);

        let slots = manager.slots();
        assert_eq!(
            slots.get(&5),
            Some(&PlayerSlot {
                player: Role::One,
                ready: false
            })
        );
        assert_eq!(
            slots.get(&9),
            Some(&PlayerSlot {
                player: Role::Two,
                ready: true
            })
        );
    }
}
