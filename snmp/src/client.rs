/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::collections::HashMap;

use log::debug;

use super::ber::Value;
use super::config::Config;
use super::error::{Error, Result};
use super::native::Native;
use super::oid::Oid;
use super::pdu::{Message, Pdu, PduBody, VarBind};
use super::table::{tablify, TableRow};
use super::transport::{RequestIds, Transport, UdpTransport};
use super::walk::{BulkFetcher, GetNextFetcher, Walk};

/// Error-status code reported by agents for missing OIDs.
const NO_SUCH_NAME: u32 = 2;

/// An SNMPv2c client bound to a single agent.
pub struct Client<T = UdpTransport> {
    host: String,
    community: Vec<u8>,
    config: Config,
    transport: T,
    request_ids: RequestIds,
}

impl Client<UdpTransport> {
    pub fn new(host: impl Into<String>, community: impl AsRef<[u8]>) -> Self {
        Self::with_transport(host, community, UdpTransport)
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(
        host: impl Into<String>,
        community: impl AsRef<[u8]>,
        transport: T,
    ) -> Self {
        Self {
            host: host.into(),
            community: community.as_ref().to_vec(),
            config: Config::default(),
            transport,
            request_ids: RequestIds::shared(),
        }
    }

    pub fn set_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn set_request_ids(mut self, request_ids: RequestIds) -> Self {
        self.request_ids = request_ids;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The native-value view on this client.
    pub fn native(&self) -> Native<'_, T> {
        Native::new(self)
    }

    /// Read a single variable.
    pub async fn get(&self, oid: &Oid) -> Result<Value> {
        let mut values = self.multiget(std::slice::from_ref(oid)).await?;
        match values.remove(0) {
            Value::NoSuchObject | Value::NoSuchInstance => {
                Err(Error::NoSuchOid(oid.clone()))
            }
            value => Ok(value),
        }
    }

    /// Read multiple variables in one request; values are returned in
    /// request order.
    pub async fn multiget(&self, oids: &[Oid]) -> Result<Vec<Value>> {
        let request_id = self.request_ids.next_id();
        let body = self.request(Pdu::get(request_id, oids)).await?;
        check_varbind_count(oids.len(), body.varbinds.len())?;
        Ok(body.varbinds.into_iter().map(|bind| bind.value).collect())
    }

    /// Read the variable following an OID.
    pub async fn getnext(&self, oid: &Oid) -> Result<VarBind> {
        let mut binds = self.multigetnext(std::slice::from_ref(oid)).await?;
        Ok(binds.remove(0))
    }

    /// Read the variables following a list of OIDs. A returned OID
    /// that does not strictly follow its request OID is reported as
    /// agent misbehaviour, never returned.
    pub async fn multigetnext(&self, oids: &[Oid]) -> Result<Vec<VarBind>> {
        let request_id = self.request_ids.next_id();
        let body = self.request(Pdu::get_next(request_id, oids)).await?;
        check_varbind_count(oids.len(), body.varbinds.len())?;
        for (requested, returned) in oids.iter().zip(&body.varbinds) {
            if returned.oid <= *requested {
                return Err(Error::NotIncreasing {
                    requested: requested.clone(),
                    returned: returned.oid.clone(),
                });
            }
        }
        Ok(body.varbinds)
    }

    /// Write a single variable; the agent echoes the stored value.
    pub async fn set(&self, oid: &Oid, value: Value) -> Result<Value> {
        let mut values = self.multiset(&[(oid.clone(), value)]).await?;
        values.remove(oid).ok_or_else(|| {
            Error::Snmp(format!("agent did not echo a value for {}", oid))
        })
    }

    /// Write multiple variables in one request.
    pub async fn multiset(
        &self,
        bindings: &[(Oid, Value)],
    ) -> Result<HashMap<Oid, Value>> {
        let request_id = self.request_ids.next_id();
        let varbinds = bindings
            .iter()
            .map(|(oid, value)| VarBind::new(oid.clone(), value.clone()))
            .collect();
        let body = self.request(Pdu::set(request_id, varbinds)).await?;
        check_varbind_count(bindings.len(), body.varbinds.len())?;
        Ok(body
            .varbinds
            .into_iter()
            .map(|bind| (bind.oid, bind.value))
            .collect())
    }

    /// Run a bulk get: the scalar OIDs are fetched as single values,
    /// the repeating OIDs as lists of up to max_list_size values.
    /// Like getnext, this returns the variables immediately following
    /// the requested OIDs.
    pub async fn bulkget(
        &self,
        scalar_oids: &[Oid],
        repeating_oids: &[Oid],
        max_list_size: u32,
    ) -> Result<BulkResult> {
        if scalar_oids.is_empty() && repeating_oids.is_empty() {
            return Err(Error::Snmp(String::from(
                "bulk get without any OIDs",
            )));
        }

        let oids: Vec<Oid> = scalar_oids
            .iter()
            .chain(repeating_oids)
            .cloned()
            .collect();
        let non_repeaters = scalar_oids.len() as u32;
        let request_id = self.request_ids.next_id();
        let body = self
            .request(Pdu::bulk_get(
                request_id,
                non_repeaters,
                max_list_size,
                &oids,
            ))
            .await?;

        // Response size bound per RFC 3416: n + m * r.
        let n = scalar_oids.len();
        let r = oids.len() - n;
        let expected_max = n + max_list_size as usize * r;
        if body.varbinds.len() > expected_max {
            return Err(Error::FaultyResponse(format!(
                "expected no more than {} varbinds, got {}",
                expected_max,
                body.varbinds.len()
            )));
        }

        let mut scalars = body.varbinds;
        let listing = scalars.split_off(n.min(scalars.len()));
        Ok(BulkResult {
            scalars: scalars
                .into_iter()
                .map(|bind| (bind.oid, bind.value))
                .collect(),
            listing,
        })
    }

    /// Traverse a single OID subtree using getnext requests.
    pub fn walk<'a>(&'a self, oid: &Oid) -> Walk<'a, T> {
        self.multiwalk(std::slice::from_ref(oid))
    }

    /// Traverse one or more OID subtrees in parallel using getnext
    /// requests.
    pub fn multiwalk<'a>(&'a self, oids: &[Oid]) -> Walk<'a, T> {
        Walk::new(self, oids.to_vec(), Box::new(GetNextFetcher))
    }

    /// Traverse one or more OID subtrees using bulk requests, with
    /// the configured number of repetitions per round.
    pub fn bulkwalk<'a>(&'a self, oids: &[Oid]) -> Walk<'a, T> {
        let fetcher = BulkFetcher::new(self.config.bulk.bulk_size);
        Walk::new(self, oids.to_vec(), Box::new(fetcher))
    }

    /// Walk a subtree and fold the result into table rows.
    pub async fn table(
        &self,
        oid: &Oid,
        num_base_nodes: usize,
    ) -> Result<Vec<TableRow>> {
        let mut walk = self.walk(oid);
        let mut varbinds = Vec::new();
        while let Some(bind) = walk.next().await {
            varbinds.push(bind?);
        }
        Ok(tablify(&varbinds, num_base_nodes))
    }

    /// Send a request PDU and return the validated response body:
    /// request and response ids must match and the error status must
    /// be clear.
    async fn request(&self, pdu: Pdu) -> Result<PduBody> {
        let request_id = pdu.request_id();
        let request_oids: Vec<Oid> =
            pdu.varbinds().iter().map(|bind| bind.oid.clone()).collect();

        let msg = Message::v2c(&self.community, pdu).to_bytes();
        let reply = self
            .transport
            .send(&self.host, self.config.port, &msg, self.config.timeout())
            .await?;
        debug!("SNMP: received {} bytes from {}", reply.len(), self.host);

        let body = Message::from_bytes(&reply)?.pdu.into_response()?;
        if body.request_id != request_id {
            return Err(Error::Snmp(format!(
                "response id {} does not match request id {}",
                body.request_id, request_id
            )));
        }

        match body.error_status {
            0 => Ok(body),
            NO_SUCH_NAME => Err(Error::NoSuchOid(
                request_oids
                    .get((body.error_index as usize).saturating_sub(1))
                    .cloned()
                    .unwrap_or_else(Oid::empty),
            )),
            status => Err(Error::ErrorStatus {
                status,
                index: body.error_index,
            }),
        }
    }
}

fn check_varbind_count(expected: usize, got: usize) -> Result<()> {
    match got == expected {
        true => Ok(()),
        false => Err(Error::Snmp(format!(
            "unexpected response: expected {} varbinds, got {}",
            expected, got
        ))),
    }
}

/// Result of a bulk get: one value per scalar OID and the agent-ordered
/// listing for the repeating OIDs.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct BulkResult {
    pub scalars: HashMap<Oid, Value>,
    pub listing: Vec<VarBind>,
}
