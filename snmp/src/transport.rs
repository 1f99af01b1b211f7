/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use log::debug;
use parking_lot::Mutex;
use tokio::net::UdpSocket;
use tokio::time;
use trust_dns_resolver::AsyncResolver;

use super::error::{Error, Result};

const RECV_BUF_SIZE: usize = 65536;

/// The request/response contract of the wire: send one request
/// datagram, return the reply datagram or fail with a timeout.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        host: &str,
        port: u16,
        msg: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>>;
}

/// UDP transport binding a fresh socket per operation.
pub struct UdpTransport;

#[async_trait]
impl Transport for UdpTransport {
    async fn send(
        &self,
        host: &str,
        port: u16,
        msg: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>> {
        let peer = SocketAddr::new(ip_lookup_one(host).await?, port);
        let local: SocketAddr = match peer {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(local).await?;
        debug!("SNMP: sending {} bytes to {}", msg.len(), peer);
        socket.send_to(msg, peer).await?;

        let mut buf = vec![0; RECV_BUF_SIZE];
        let (len, _) = time::timeout(timeout, socket.recv_from(&mut buf))
            .await
            .map_err(|_| Error::Timeout(timeout))??;
        buf.truncate(len);
        Ok(buf)
    }
}

/// Resolve a host name or address literal to a single IP address.
pub async fn ip_lookup_one(host: &str) -> Result<IpAddr> {
    if let Ok(addr) = host.parse() {
        return Ok(addr);
    }
    AsyncResolver::tokio_from_system_conf()
        .map_err(|e| Error::Resolve(host.to_string(), e))?
        .lookup_ip(host)
        .await
        .map_err(|e| Error::Resolve(host.to_string(), e))?
        .iter()
        .next()
        .ok_or_else(|| Error::NoIp(host.to_string()))
}

/// Source of request identifiers: non-zero 32-bit values, unique per
/// request.
pub struct RequestIds(Ids);

enum Ids {
    Counter(Arc<AtomicI32>),
    Fixed(Mutex<Vec<i32>>),
}

impl RequestIds {
    /// The process-wide counter, seeded once from the clock; the
    /// wrap-around skips zero.
    pub fn shared() -> Self {
        static COUNTER: OnceLock<Arc<AtomicI32>> = OnceLock::new();
        let counter = COUNTER.get_or_init(|| {
            let seed = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|since| since.subsec_nanos() as i32)
                .unwrap_or(1);
            Arc::new(AtomicI32::new(match seed {
                0 => 1,
                seed => seed,
            }))
        });
        Self(Ids::Counter(counter.clone()))
    }

    /// A deterministic source for request fixtures.
    pub fn fixed(ids: Vec<i32>) -> Self {
        let mut ids = ids;
        ids.reverse();
        Self(Ids::Fixed(Mutex::new(ids)))
    }

    pub fn next_id(&self) -> i32 {
        match &self.0 {
            Ids::Counter(counter) => loop {
                let id = counter.fetch_add(1, Ordering::Relaxed);
                if id != 0 {
                    return id;
                }
            },
            Ids::Fixed(ids) => ids.lock().pop().unwrap_or(1),
        }
    }
}

impl Default for RequestIds {
    fn default() -> Self {
        Self::shared()
    }
}
