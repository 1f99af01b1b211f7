/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use super::ber::{self, Decoder, Value};
use super::error::{Error, Result};
use super::oid::Oid;

/// Wire encoding of the v2c version field.
pub(crate) const VERSION_2C: i64 = 1;

/* PDU tags (context-specific, constructed). */

const TAG_GET_REQUEST: u8 = 0xa0;
const TAG_GET_NEXT_REQUEST: u8 = 0xa1;
const TAG_RESPONSE: u8 = 0xa2;
const TAG_SET_REQUEST: u8 = 0xa3;
const TAG_BULK_GET_REQUEST: u8 = 0xa5;

/// An OID paired with its tagged value; the unit of payload in all
/// SNMP PDUs.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct VarBind {
    pub oid: Oid,
    pub value: Value,
}

impl VarBind {
    pub fn new(oid: Oid, value: Value) -> Self {
        Self { oid, value }
    }

    /// A request varbind: the value slot holds a placeholder null.
    pub fn unbound(oid: Oid) -> Self {
        Self::new(oid, Value::Null)
    }
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Pdu {
    GetRequest(PduBody),
    GetNextRequest(PduBody),
    Response(PduBody),
    SetRequest(PduBody),
    BulkGetRequest(BulkBody),
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct PduBody {
    pub request_id: i32,
    pub error_status: u32,
    pub error_index: u32,
    pub varbinds: Vec<VarBind>,
}

/// The bulk request reuses the error-status and error-index slots for
/// the non-repeaters and max-repetitions parameters.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct BulkBody {
    pub request_id: i32,
    pub non_repeaters: u32,
    pub max_repetitions: u32,
    pub varbinds: Vec<VarBind>,
}

impl PduBody {
    fn request(request_id: i32, varbinds: Vec<VarBind>) -> Self {
        Self {
            request_id,
            error_status: 0,
            error_index: 0,
            varbinds,
        }
    }
}

impl Pdu {
    pub fn get(request_id: i32, oids: &[Oid]) -> Self {
        Self::GetRequest(PduBody::request(request_id, unbound(oids)))
    }

    pub fn get_next(request_id: i32, oids: &[Oid]) -> Self {
        Self::GetNextRequest(PduBody::request(request_id, unbound(oids)))
    }

    pub fn set(request_id: i32, varbinds: Vec<VarBind>) -> Self {
        Self::SetRequest(PduBody::request(request_id, varbinds))
    }

    pub fn bulk_get(
        request_id: i32,
        non_repeaters: u32,
        max_repetitions: u32,
        oids: &[Oid],
    ) -> Self {
        Self::BulkGetRequest(BulkBody {
            request_id,
            non_repeaters,
            max_repetitions,
            varbinds: unbound(oids),
        })
    }

    pub fn request_id(&self) -> i32 {
        match self {
            Self::GetRequest(body)
            | Self::GetNextRequest(body)
            | Self::Response(body)
            | Self::SetRequest(body) => body.request_id,
            Self::BulkGetRequest(body) => body.request_id,
        }
    }

    pub fn varbinds(&self) -> &[VarBind] {
        match self {
            Self::GetRequest(body)
            | Self::GetNextRequest(body)
            | Self::Response(body)
            | Self::SetRequest(body) => &body.varbinds,
            Self::BulkGetRequest(body) => &body.varbinds,
        }
    }

    /// Unwrap a response PDU; any other shape is a protocol violation.
    pub fn into_response(self) -> Result<PduBody> {
        match self {
            Self::Response(body) => Ok(body),
            pdu => Err(Error::Snmp(format!(
                "expected a response PDU, got tag {:#x}",
                pdu.tag()
            ))),
        }
    }

    fn tag(&self) -> u8 {
        match self {
            Self::GetRequest(_) => TAG_GET_REQUEST,
            Self::GetNextRequest(_) => TAG_GET_NEXT_REQUEST,
            Self::Response(_) => TAG_RESPONSE,
            Self::SetRequest(_) => TAG_SET_REQUEST,
            Self::BulkGetRequest(_) => TAG_BULK_GET_REQUEST,
        }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        let (request_id, second, third, varbinds) = match self {
            Self::GetRequest(body)
            | Self::GetNextRequest(body)
            | Self::Response(body)
            | Self::SetRequest(body) => (
                body.request_id,
                body.error_status,
                body.error_index,
                &body.varbinds,
            ),
            Self::BulkGetRequest(body) => (
                body.request_id,
                body.non_repeaters,
                body.max_repetitions,
                &body.varbinds,
            ),
        };

        let mut content = Vec::new();
        ber::encode_integer(&mut content, request_id as i64);
        ber::encode_integer(&mut content, second as i64);
        ber::encode_integer(&mut content, third as i64);

        let mut binds = Vec::new();
        for varbind in varbinds {
            let mut bind = Vec::new();
            ber::encode_oid(&mut bind, &varbind.oid);
            varbind.value.encode(&mut bind);
            ber::encode_tlv(&mut binds, ber::TAG_SEQUENCE, &bind);
        }
        ber::encode_tlv(&mut content, ber::TAG_SEQUENCE, &binds);

        ber::encode_tlv(out, self.tag(), &content);
    }

    fn decode(tag: u8, content: &[u8]) -> Result<Self> {
        let mut decoder = Decoder::new(content);
        let request_id = int_field(decoder.read_integer()?, "request-id")?;
        let second = uint_field(decoder.read_integer()?, "error-status")?;
        let third = uint_field(decoder.read_integer()?, "error-index")?;

        let mut binds = decoder.read_sequence()?;
        let mut varbinds = Vec::new();
        while !binds.is_empty() {
            let mut bind = binds.read_sequence()?;
            let oid = bind.read_oid()?;
            let value = bind.read_value()?;
            varbinds.push(VarBind::new(oid, value));
        }

        match tag {
            TAG_BULK_GET_REQUEST => Ok(Self::BulkGetRequest(BulkBody {
                request_id,
                non_repeaters: second,
                max_repetitions: third,
                varbinds,
            })),
            _ => {
                let body = PduBody {
                    request_id,
                    error_status: second,
                    error_index: third,
                    varbinds,
                };
                match tag {
                    TAG_GET_REQUEST => Ok(Self::GetRequest(body)),
                    TAG_GET_NEXT_REQUEST => Ok(Self::GetNextRequest(body)),
                    TAG_RESPONSE => Ok(Self::Response(body)),
                    TAG_SET_REQUEST => Ok(Self::SetRequest(body)),
                    tag => Err(Error::FaultyResponse(format!(
                        "unknown PDU tag {:#x}",
                        tag
                    ))),
                }
            }
        }
    }
}

fn unbound(oids: &[Oid]) -> Vec<VarBind> {
    oids.iter().cloned().map(VarBind::unbound).collect()
}

fn int_field(n: i64, name: &str) -> Result<i32> {
    i32::try_from(n).map_err(|_| {
        Error::FaultyResponse(format!("{} {} out of range", name, n))
    })
}

fn uint_field(n: i64, name: &str) -> Result<u32> {
    u32::try_from(n).map_err(|_| {
        Error::FaultyResponse(format!("{} {} out of range", name, n))
    })
}

/// The outer message envelope: version, community and request PDU.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Message {
    pub version: i64,
    pub community: Vec<u8>,
    pub pdu: Pdu,
}

impl Message {
    pub fn v2c(community: &[u8], pdu: Pdu) -> Self {
        Self {
            version: VERSION_2C,
            community: community.to_vec(),
            pdu,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut content = Vec::new();
        ber::encode_integer(&mut content, self.version);
        ber::encode_tlv(&mut content, ber::TAG_OCTET_STRING, &self.community);
        self.pdu.encode(&mut content);

        let mut out = Vec::new();
        ber::encode_tlv(&mut out, ber::TAG_SEQUENCE, &content);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut outer = Decoder::new(bytes);
        let mut message = outer
            .read_sequence()
            .map_err(|_| Error::Snmp(String::from("message is not a sequence")))?;
        if !outer.is_empty() {
            return Err(Error::Snmp(String::from(
                "trailing data after message",
            )));
        }

        let version = message.read_integer()?;
        let community = message.read_octet_string()?.to_vec();
        let (tag, content) = message.read_tlv()?;
        let pdu = Pdu::decode(tag, content)?;

        Ok(Self {
            version,
            community,
            pdu,
        })
    }
}
