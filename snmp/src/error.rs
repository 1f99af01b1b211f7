/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::time::Duration;

use thiserror::Error;

use super::oid::Oid;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to lookup IP for {0}: {1}")]
    Resolve(String, trust_dns_resolver::error::ResolveError),
    #[error("No IP found for {0}")]
    NoIp(String),
    #[error("No reply received within {0:?}")]
    Timeout(Duration),
    #[error("Invalid OID {0:?}")]
    ParseOid(String),
    #[error("SNMP error: {0}")]
    Snmp(String),
    #[error("Agent returned error status {status} for varbind {index}")]
    ErrorStatus { status: u32, index: u32 },
    #[error("No such OID: {0}")]
    NoSuchOid(Oid),
    #[error("Faulty SNMP implementation: OID {returned} is not a successor of {requested}")]
    NotIncreasing { requested: Oid, returned: Oid },
    #[error("Faulty SNMP implementation: {0}")]
    FaultyResponse(String),
    #[error("Type error: {0}")]
    Type(#[from] TypeError),
}

#[derive(Error, Debug)]
pub enum TypeError {
    #[error("{0} has no native representation")]
    NoNativeValue(&'static str),
}
