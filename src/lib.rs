//! # relay-conn
//!
//! Connection wrappers for a relay tunnel protocol.
//!
//! A raw transport (TCP, Unix socket, in-memory pipe) is wrapped in one of
//! four types, picked by direction and traffic kind, and then handed to code
//! that only knows the [`Conn`] contract:
//!
//! | | stream | datagram |
//! |---|---|---|
//! | client (dialing) | [`RelayStream`] | [`RelayDatagram`] |
//! | bound (accepting) | [`BoundConn`] | [`BoundDatagram`] |
//!
//! ## Architecture
//!
//! - **Client wrappers**: the relay response is checked by the first read,
//!   exactly once; a queued request header rides along with the first write
//! - **Datagram wrappers**: every message is framed as `[len: u16 BE][payload]`
//! - **Bound wrappers**: report tunnel-assigned addresses and carry
//!   [`Metadata`]
//!
//! ## Example
//!
//! ```ignore
//! use relay_conn::{Conn, RelayDatagram};
//!
//! #[tokio::main]
//! async fn main() -> relay_conn::Result<()> {
//!     let tcp = tokio::net::TcpStream::connect("relay.example:8443").await?;
//!     let conn = RelayDatagram::new(tcp, encode_udp_request());
//!
//!     conn.write(b"dns query").await?;
//!     let mut buf = [0u8; 1500];
//!     let n = conn.read(&mut buf).await?;
//!     println!("reply: {:?}", &buf[..n]);
//!     Ok(())
//! }
//! ```

pub mod bound;
pub mod config;
pub mod conn;
pub mod error;
pub mod metadata;
pub mod pool;
pub mod protocol;
pub mod relay;
pub mod transport;

#[cfg(test)]
mod testing;

pub use bound::{BoundConn, BoundDatagram};
pub use config::RelayConfig;
pub use conn::{forward, Conn, Metadatable, PacketConn};
pub use error::{RelayError, Result};
pub use metadata::Metadata;
pub use relay::{RelayDatagram, RelayStream};
pub use transport::Transport;
