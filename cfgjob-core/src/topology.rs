// vim: tw=80
//! Client for the topology service
//!
//! Lifecycle-state queries and the bounded waits that commit phases use as
//! barriers.  Also carries the raw-mirror quiesce window used when system
//! drives are (re)created.

use crate::types::*;
use futures::channel::{mpsc, oneshot};
#[cfg(test)] use mockall::automock;
use serde_derive::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{sleep, timeout};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub enum Request {
    GetState(ObjectId),
    QuiesceRawMirror,
    ReinitializeRawMirrorEdges,
    UnquiesceRawMirror,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub enum Response {
    GetState(Result<LifecycleState>),
    QuiesceRawMirror(Result<()>),
    ReinitializeRawMirrorEdges(Result<()>),
    UnquiesceRawMirror(Result<()>),
}

impl Response {
    pub fn into_get_state(self) -> Result<LifecycleState> {
        match self {
            Response::GetState(r) => r,
            x => panic!("Unexpected response type {x:?}")
        }
    }

    pub fn into_unit(self) -> Result<()> {
        match self {
            Response::QuiesceRawMirror(r) => r,
            Response::ReinitializeRawMirrorEdges(r) => r,
            Response::UnquiesceRawMirror(r) => r,
            x => panic!("Unexpected response type {x:?}")
        }
    }
}

pub type TopologyEnvelope = (Request, oneshot::Sender<Response>);

/// How often a bounded lifecycle wait polls the object's state.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone)]
pub struct TopologyClient {
    tx: mpsc::UnboundedSender<TopologyEnvelope>,
}

#[cfg_attr(test, automock)]
impl TopologyClient {
    pub fn new(tx: mpsc::UnboundedSender<TopologyEnvelope>) -> Self {
        TopologyClient{tx}
    }

    async fn call(&self, req: Request) -> Result<Response> {
        let (tx, rx) = oneshot::channel();
        self.tx.unbounded_send((req, tx))
            .map_err(|_| Error::Internal)?;
        rx.await.map_err(|_| Error::Internal)
    }

    pub async fn get_state(&self, object: ObjectId) -> Result<LifecycleState>
    {
        self.call(Request::GetState(object)).await?.into_get_state()
    }

    /// Poll `object` until it reaches `state`, up to `limit`.  `NotExist` is
    /// reported by the service for destroyed ids rather than being an error,
    /// so destruction barriers use the same path as readiness barriers.
    pub async fn wait_for_state(&self, object: ObjectId,
        state: LifecycleState, limit: Duration) -> Result<()>
    {
        let poll = async {
            loop {
                if self.get_state(object).await? == state {
                    break Ok(());
                }
                sleep(POLL_INTERVAL).await;
            }
        };
        match timeout(limit, poll).await {
            Ok(r) => r,
            Err(_) => Err(Error::Timeout),
        }
    }

    pub async fn quiesce_raw_mirror(&self) -> Result<()> {
        self.call(Request::QuiesceRawMirror).await?.into_unit()
    }

    pub async fn reinitialize_raw_mirror_edges(&self) -> Result<()> {
        self.call(Request::ReinitializeRawMirrorEdges).await?.into_unit()
    }

    pub async fn unquiesce_raw_mirror(&self) -> Result<()> {
        self.call(Request::UnquiesceRawMirror).await?.into_unit()
    }
}

// LCOV_EXCL_STOP
