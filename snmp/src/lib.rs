/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

mod ber;
mod client;
mod config;
mod error;
mod native;
mod oid;
mod pdu;
mod table;
mod transport;
mod walk;

pub use ber::Value;
pub use client::{BulkResult, Client};
pub use config::{BulkConfig, Config, ErrorHandling};
pub use error::{Error, Result, TypeError};
pub use native::{Native, NativeBulkResult, NativeValue, NativeWalk};
pub use oid::Oid;
pub use pdu::{BulkBody, Message, Pdu, PduBody, VarBind};
pub use table::{tablify, TableRow};
pub use transport::{ip_lookup_one, RequestIds, Transport, UdpTransport};
pub use walk::{BulkFetcher, Fetcher, GetNextFetcher, Walk};
