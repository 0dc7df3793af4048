//! Outbound address discovery.
//!
//! A node listening on `0.0.0.0` still needs one concrete address to hash
//! into its ring position and to hand to peers. The kernel picks the source
//! address of a connected UDP socket without sending anything; that address
//! is the one peers can route back to.

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use tracing::{info, warn};

/// Public resolver used only as a routing destination. No packet is sent.
const PROBE_DESTINATION: &str = "8.8.8.8:80";

/// Source address the host would use for outbound traffic.
pub fn discover_outbound_ip() -> io::Result<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    socket.connect(PROBE_DESTINATION)?;
    Ok(socket.local_addr()?.ip())
}

/// Address this node advertises to peers.
///
/// Uses `advertise` when given, the bound address when it is concrete, and
/// otherwise the discovered outbound IP with the bound port. Falls back to
/// loopback on hosts without a route.
pub fn advertised_address(advertise: Option<&str>, bound: SocketAddr) -> String {
    if let Some(address) = advertise {
        return address.to_string();
    }
    if !bound.ip().is_unspecified() {
        return bound.to_string();
    }

    match discover_outbound_ip() {
        Ok(ip) => {
            let address = SocketAddr::new(ip, bound.port());
            info!(address = %address, "Discovered outbound address");
            address.to_string()
        }
        Err(e) => {
            let address = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), bound.port());
            warn!(error = %e, fallback = %address, "Outbound address discovery failed");
            address.to_string()
        }
    }
}
