//! ISO 15118 transport traits.
//!
//! Provides a driver trait that allows to run the protocol engine on top of various
//! TCP or TLS connection implementations.
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
use core::future::Future;

/// Receive Error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverRxError {
    /// The connection was closed by the peer.
    Closed,

    /// The receive buffer is too small for the incoming V2GTP frame.
    Overflow,
}

/// Transmit Error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverTxError {
    /// The connection was closed by the peer.
    Closed,
}

/// Driver trait, through which the protocol engine talks to the connection.
///
/// One driver instance serves exactly one connection, and therefore one charging session.
pub trait Driver {
    /// Receive one complete V2GTP frame, including its 8 byte header.
    ///
    /// Returns the number of bytes written to `buffer`.
    fn receive(&mut self, buffer: &mut [u8]) -> impl Future<Output = Result<usize, DriverRxError>>;

    /// Transmit one complete V2GTP frame.
    fn transmit(&mut self, data: &[u8]) -> impl Future<Output = Result<(), DriverTxError>>;

    /// SHA-512 hash of the vehicle certificate presented during the TLS handshake.
    ///
    /// Plain TCP connections have no vehicle certificate and return `None`.
    fn vehicle_cert_hash(&self) -> Option<[u8; 64]> {
        None
    }
}
