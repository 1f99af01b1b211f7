/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::collections::{HashSet, VecDeque};

use async_trait::async_trait;
use futures::stream::{self, Stream};
use log::{debug, warn};

use super::ber::Value;
use super::client::Client;
use super::config::ErrorHandling;
use super::error::{Error, Result};
use super::oid::Oid;
use super::pdu::VarBind;
use super::transport::Transport;

/// Retrieves the variables following a list of OIDs: one result per
/// requested OID for getnext, up to bulk_size per requested OID for
/// bulk requests, interleaved in wire order in both cases.
#[async_trait]
pub trait Fetcher<T: Transport>: Send + Sync {
    async fn fetch(
        &self,
        client: &Client<T>,
        oids: &[Oid],
    ) -> Result<Vec<VarBind>>;
}

/// Getnext-based fetcher.
pub struct GetNextFetcher;

#[async_trait]
impl<T: Transport> Fetcher<T> for GetNextFetcher {
    async fn fetch(
        &self,
        client: &Client<T>,
        oids: &[Oid],
    ) -> Result<Vec<VarBind>> {
        client.multigetnext(oids).await
    }
}

/// Bulk-based fetcher with a fixed limit on repetitions per round.
pub struct BulkFetcher {
    bulk_size: u32,
}

impl BulkFetcher {
    pub fn new(bulk_size: u32) -> Self {
        Self { bulk_size }
    }
}

#[async_trait]
impl<T: Transport> Fetcher<T> for BulkFetcher {
    async fn fetch(
        &self,
        client: &Client<T>,
        oids: &[Oid],
    ) -> Result<Vec<VarBind>> {
        Ok(client.bulkget(&[], oids, self.bulk_size).await?.listing)
    }
}

struct WalkVar {
    root: Oid,
    last: Oid,
    done: bool,
}

impl WalkVar {
    fn new(root: Oid) -> Self {
        Self {
            last: root.clone(),
            root,
            done: false,
        }
    }
}

/// A lazy traversal of one or more OID subtrees. Each pull drains the
/// round buffer; when it runs dry and any subtree is unfinished, one
/// more request is issued through the fetcher.
pub struct Walk<'a, T: Transport> {
    client: &'a Client<T>,
    fetcher: Box<dyn Fetcher<T> + Send + 'a>,
    errors: ErrorHandling,
    roots: Vec<Oid>,
    vars: Vec<WalkVar>,
    yielded: HashSet<Oid>,
    buffer: VecDeque<VarBind>,
    failed: bool,
}

impl<'a, T: Transport> Walk<'a, T> {
    pub(crate) fn new(
        client: &'a Client<T>,
        roots: Vec<Oid>,
        fetcher: Box<dyn Fetcher<T> + Send + 'a>,
    ) -> Self {
        Self {
            client,
            fetcher,
            errors: client.config().errors,
            vars: roots.iter().cloned().map(WalkVar::new).collect(),
            roots,
            yielded: HashSet::new(),
            buffer: VecDeque::new(),
            failed: false,
        }
    }

    /// The next varbind of the traversal. Varbinds under one subtree
    /// come in strictly increasing OID order; subtrees are drained in
    /// ascending root order within each round; no OID is yielded
    /// twice.
    pub async fn next(&mut self) -> Option<Result<VarBind>> {
        loop {
            if let Some(bind) = self.buffer.pop_front() {
                return Some(Ok(bind));
            }
            if self.failed || self.vars.iter().all(|var| var.done) {
                return None;
            }
            if let Err(e) = self.round().await {
                self.failed = true;
                return Some(Err(e));
            }
        }
    }

    /// Adapt the walk into a stream of varbinds.
    pub fn into_stream(self) -> impl Stream<Item = Result<VarBind>> + 'a {
        stream::unfold(self, |mut walk| async move {
            walk.next().await.map(|item| (item, walk))
        })
    }

    async fn round(&mut self) -> Result<()> {
        let frontier: Vec<usize> = self
            .vars
            .iter()
            .enumerate()
            .filter(|(_, var)| !var.done)
            .map(|(i, _)| i)
            .collect();
        let oids: Vec<Oid> = frontier
            .iter()
            .map(|i| self.vars[*i].last.clone())
            .collect();

        debug!("SNMP: walk: continuing {} subtrees", oids.len());
        let varbinds = match self.fetcher.fetch(self.client, &oids).await {
            Ok(varbinds) => varbinds,
            Err(Error::NoSuchOid(_)) => {
                // The agent has nothing past the frontier: clean end
                // of the tree.
                debug!("SNMP: walk: done (end of OID tree)");
                for i in frontier {
                    self.vars[i].done = true;
                }
                return Ok(());
            }
            Err(Error::NotIncreasing {
                requested,
                returned,
            }) if self.errors == ErrorHandling::Warn => {
                self.finish_faulty(&frontier, &requested, &returned);
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let n = oids.len();
        let mut received: Vec<Vec<VarBind>> = vec![Vec::new(); n];
        for (j, bind) in varbinds.into_iter().enumerate() {
            let slot = j % n;
            let var = &mut self.vars[frontier[slot]];
            if var.done {
                continue;
            }
            if let Value::EndOfMibView = bind.value {
                debug!("SNMP: walk {}: done (end of mib view)", var.root);
                var.done = true;
            } else if !var.root.contains(&bind.oid) {
                debug!(
                    "SNMP: walk {}: done (got oid past subtree: {})",
                    var.root, bind.oid
                );
                var.done = true;
                // May still lie under another requested subtree; the
                // guards below decide.
                received[slot].push(bind);
            } else if bind.oid <= var.last {
                match self.errors {
                    ErrorHandling::Strict => {
                        return Err(Error::NotIncreasing {
                            requested: var.last.clone(),
                            returned: bind.oid.clone(),
                        })
                    }
                    ErrorHandling::Warn => {
                        warn!(
                            "SNMP: walk {}: done (OID {} is not a \
                             successor of {}; faulty agent)",
                            var.root, bind.oid, var.last
                        );
                        var.done = true;
                    }
                }
            } else {
                var.last = bind.oid.clone();
                received[slot].push(bind);
            }
        }

        // Drain the round in ascending root order.
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|a, b| {
            self.vars[frontier[*a]].root.cmp(&self.vars[frontier[*b]].root)
        });
        for slot in order {
            for bind in std::mem::take(&mut received[slot]) {
                if !self.roots.iter().any(|root| root.contains(&bind.oid)) {
                    debug!(
                        "SNMP: walk: skipping {} (outside the requested \
                         subtrees)",
                        bind.oid
                    );
                    continue;
                }
                if !self.yielded.insert(bind.oid.clone()) {
                    debug!(
                        "SNMP: walk: skipping {} (already yielded)",
                        bind.oid
                    );
                    continue;
                }
                self.buffer.push_back(bind);
            }
        }

        Ok(())
    }

    /// Finish the subtree whose frontier OID provoked a non-increasing
    /// reply, leaving the others running.
    fn finish_faulty(
        &mut self,
        frontier: &[usize],
        requested: &Oid,
        returned: &Oid,
    ) {
        match frontier
            .iter()
            .copied()
            .find(|i| self.vars[*i].last == *requested)
        {
            Some(i) => {
                let var = &mut self.vars[i];
                warn!(
                    "SNMP: walk {}: done (OID {} is not a successor of {}; \
                     faulty agent)",
                    var.root, returned, requested
                );
                var.done = true;
            }
            None => {
                // Cannot attribute the reply to a subtree; give up on
                // all of them rather than loop forever.
                warn!(
                    "SNMP: walk: done (OID {} is not a successor of {}; \
                     faulty agent)",
                    returned, requested
                );
                for i in frontier {
                    self.vars[*i].done = true;
                }
            }
        }
    }
}
