/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::collections::HashMap;
use std::fmt;
use std::net::Ipv4Addr;

use super::ber::Value;
use super::client::Client;
use super::error::{Error, Result, TypeError};
use super::oid::Oid;
use super::transport::Transport;
use super::walk::Walk;

/// A tagged value unwrapped to its host-native representation.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum NativeValue {
    Null,
    Int(i64),
    Uint(u64),
    Bytes(Vec<u8>),
    Text(String),
}

impl TryFrom<Value> for NativeValue {
    type Error = TypeError;

    fn try_from(value: Value) -> std::result::Result<Self, TypeError> {
        match value {
            Value::Integer(n) => Ok(Self::Int(n)),
            Value::OctetString(bytes) => Ok(Self::Bytes(bytes)),
            Value::Null => Ok(Self::Null),
            Value::ObjectIdentifier(oid) => Ok(Self::Text(oid.to_string())),
            Value::IpAddress(addr) => {
                Ok(Self::Text(Ipv4Addr::from(addr).to_string()))
            }
            Value::Counter32(n) | Value::Gauge32(n) | Value::TimeTicks(n) => {
                Ok(Self::Uint(n as u64))
            }
            Value::Counter64(n) => Ok(Self::Uint(n)),
            Value::Sequence(_) => Err(TypeError::NoNativeValue("sequence")),
            Value::NoSuchObject => {
                Err(TypeError::NoNativeValue("noSuchObject"))
            }
            Value::NoSuchInstance => {
                Err(TypeError::NoNativeValue("noSuchInstance"))
            }
            Value::EndOfMibView => {
                Err(TypeError::NoNativeValue("endOfMibView"))
            }
        }
    }
}

impl fmt::Display for NativeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Int(n) => write!(f, "{}", n),
            Self::Uint(n) => write!(f, "{}", n),
            Self::Bytes(bytes) => {
                write!(f, "{}", String::from_utf8_lossy(bytes))
            }
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

fn native(value: Value) -> Result<NativeValue> {
    value.try_into().map_err(Error::from)
}

/// Result of a native bulk get.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct NativeBulkResult {
    pub scalars: HashMap<Oid, NativeValue>,
    pub listing: Vec<(Oid, NativeValue)>,
}

/// A view over a client that unwraps tagged values into host-native
/// ones. The surface mirrors the client one-to-one; no I/O of its own.
pub struct Native<'a, T: Transport> {
    client: &'a Client<T>,
}

impl<'a, T: Transport> Native<'a, T> {
    pub(crate) fn new(client: &'a Client<T>) -> Self {
        Self { client }
    }

    pub async fn get(&self, oid: &Oid) -> Result<NativeValue> {
        native(self.client.get(oid).await?)
    }

    pub async fn multiget(&self, oids: &[Oid]) -> Result<Vec<NativeValue>> {
        self.client
            .multiget(oids)
            .await?
            .into_iter()
            .map(native)
            .collect()
    }

    pub async fn getnext(&self, oid: &Oid) -> Result<(Oid, NativeValue)> {
        let bind = self.client.getnext(oid).await?;
        Ok((bind.oid, native(bind.value)?))
    }

    pub async fn multigetnext(
        &self,
        oids: &[Oid],
    ) -> Result<Vec<(Oid, NativeValue)>> {
        self.client
            .multigetnext(oids)
            .await?
            .into_iter()
            .map(|bind| Ok((bind.oid, native(bind.value)?)))
            .collect()
    }

    pub async fn set(&self, oid: &Oid, value: Value) -> Result<NativeValue> {
        native(self.client.set(oid, value).await?)
    }

    pub async fn multiset(
        &self,
        bindings: &[(Oid, Value)],
    ) -> Result<HashMap<Oid, NativeValue>> {
        self.client
            .multiset(bindings)
            .await?
            .into_iter()
            .map(|(oid, value)| Ok((oid, native(value)?)))
            .collect()
    }

    pub async fn bulkget(
        &self,
        scalar_oids: &[Oid],
        repeating_oids: &[Oid],
        max_list_size: u32,
    ) -> Result<NativeBulkResult> {
        let result = self
            .client
            .bulkget(scalar_oids, repeating_oids, max_list_size)
            .await?;
        Ok(NativeBulkResult {
            scalars: result
                .scalars
                .into_iter()
                .map(|(oid, value)| Ok((oid, native(value)?)))
                .collect::<Result<_>>()?,
            listing: result
                .listing
                .into_iter()
                .map(|bind| Ok((bind.oid, native(bind.value)?)))
                .collect::<Result<_>>()?,
        })
    }

    pub fn walk(&self, oid: &Oid) -> NativeWalk<'a, T> {
        NativeWalk(self.client.walk(oid))
    }

    pub fn multiwalk(&self, oids: &[Oid]) -> NativeWalk<'a, T> {
        NativeWalk(self.client.multiwalk(oids))
    }

    pub fn bulkwalk(&self, oids: &[Oid]) -> NativeWalk<'a, T> {
        NativeWalk(self.client.bulkwalk(oids))
    }

    pub async fn table(
        &self,
        oid: &Oid,
        num_base_nodes: usize,
    ) -> Result<Vec<HashMap<String, NativeValue>>> {
        self.client
            .table(oid, num_base_nodes)
            .await?
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|(col, value)| Ok((col, native(value)?)))
                    .collect()
            })
            .collect()
    }
}

/// A walk yielding native values.
pub struct NativeWalk<'a, T: Transport>(Walk<'a, T>);

impl<T: Transport> NativeWalk<'_, T> {
    pub async fn next(&mut self) -> Option<Result<(Oid, NativeValue)>> {
        match self.0.next().await? {
            Ok(bind) => {
                Some(native(bind.value).map(|value| (bind.oid, value)))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
