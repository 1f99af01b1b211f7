/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::error::Error;

/// An object identifier: a non-empty sequence of sub-identifiers,
/// ordered lexicographically.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug, Default)]
pub struct Oid(Vec<u32>);

impl Oid {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn from_vec(ids: Vec<u32>) -> Self {
        Self(ids)
    }

    pub fn as_slice(&self) -> &[u32] {
        self.0.as_slice()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Subtree containment: self is a strict prefix of other.
    pub fn contains(&self, other: &Oid) -> bool {
        other.0.len() > self.0.len() && other.0[..self.0.len()] == self.0[..]
    }

    /// The sub-identifiers of self below a table OID. Empty if self
    /// does not lie under the table.
    pub fn in_table(&self, table: &Oid) -> Oid {
        match table.contains(self) {
            true => Oid(self.0[table.0.len()..].to_vec()),
            false => Oid::empty(),
        }
    }
}

impl FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(Error::ParseOid(s.to_string()));
        }
        s.split('.')
            .map(|id| id.parse::<u32>())
            .collect::<Result<Vec<u32>, _>>()
            .map(Oid)
            .map_err(|_| Error::ParseOid(s.to_string()))
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids = self.0.iter();
        if let Some(id) = ids.next() {
            write!(f, "{}", id)?;
            for id in ids {
                write!(f, ".{}", id)?;
            }
        }
        Ok(())
    }
}

impl Serialize for Oid {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Oid {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
