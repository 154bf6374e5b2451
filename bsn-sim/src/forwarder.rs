// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Serial forwarder: exposes the motes' serial output on a TCP port.
//!
//! Clients are greeted with the two byte `"U "` handshake. Every serial
//! frame is then written to every client as a length byte followed by the
//! encoded frame. The forwarder never blocks the simulation: clients are only
//! accepted when [`SerialForwarder::process`] is called, and a client that
//! cannot take a whole frame without blocking is dropped.

use std::io::{ErrorKind, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::rc::Rc;

use bsn_engine::packet::SerialPacket;
use bsn_engine::types::{SimError, SimResult};
use bsn_track::entity::Entity;
use bsn_track::{debug, info, warn};

/// Greeting sent to each new client.
pub const HANDSHAKE: &[u8; 2] = b"U ";

struct Client {
    addr: SocketAddr,
    stream: TcpStream,
}

pub struct SerialForwarder {
    pub entity: Rc<Entity>,
    listener: TcpListener,
    clients: Vec<Client>,
    forwarded: u64,
}

impl SerialForwarder {
    /// Listen on `port` of all interfaces. Port 0 picks a free port.
    pub fn bind(parent: &Rc<Entity>, port: u16) -> Result<Self, SimError> {
        let entity = Rc::new(Entity::new(parent, "forwarder"));
        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .map_err(|e| SimError(format!("Unable to listen on port {port}: {e}")))?;
        listener
            .set_nonblocking(true)
            .map_err(|e| SimError(format!("Unable to configure port {port}: {e}")))?;
        info!(entity ; "listening on port {port}");
        Ok(Self {
            entity,
            listener,
            clients: Vec::new(),
            forwarded: 0,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, SimError> {
        self.listener
            .local_addr()
            .map_err(|e| SimError(format!("Unable to get forwarder address: {e}")))
    }

    #[must_use]
    pub fn num_clients(&self) -> usize {
        self.clients.len()
    }

    /// Number of packets written to at least one client.
    #[must_use]
    pub fn forwarded(&self) -> u64 {
        self.forwarded
    }

    /// Accept any waiting clients and forward `packets` to all clients.
    pub fn process(&mut self, packets: &[SerialPacket]) -> SimResult {
        self.accept_clients()?;

        for packet in packets {
            let frame = packet.encode();
            let Ok(len) = u8::try_from(frame.len()) else {
                warn!(self.entity ; "dropping {} byte frame from node {}", frame.len(), packet.src);
                continue;
            };

            let mut message = Vec::with_capacity(frame.len() + 1);
            message.push(len);
            message.extend_from_slice(&frame);

            let before = self.clients.len();
            let entity = &self.entity;
            self.clients.retain_mut(|client| match client.stream.write_all(&message) {
                Ok(()) => true,
                Err(e) => {
                    warn!(entity ; "client {} dropped: {e}", client.addr);
                    false
                }
            });
            if !self.clients.is_empty() {
                self.forwarded += 1;
            }
            if self.clients.len() != before {
                debug!(self.entity ; "{} clients remaining", self.clients.len());
            }
        }
        Ok(())
    }

    fn accept_clients(&mut self) -> SimResult {
        loop {
            match self.listener.accept() {
                Ok((stream, addr)) => self.add_client(stream, addr),
                Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(()),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(SimError(format!("Forwarder accept failed: {e}"))),
            }
        }
    }

    fn add_client(&mut self, mut stream: TcpStream, addr: SocketAddr) {
        let setup = stream
            .set_nonblocking(true)
            .and_then(|()| stream.set_nodelay(true))
            .and_then(|()| stream.write_all(HANDSHAKE));
        match setup {
            Ok(()) => {
                info!(self.entity ; "client {addr} connected");
                self.clients.push(Client { addr, stream });
            }
            Err(e) => {
                warn!(self.entity ; "client {addr} rejected: {e}");
            }
        }
    }
}
