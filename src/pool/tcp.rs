//! TCP store connector
//!
//! Treats the store as reachable when a TCP connection to its address can be
//! opened within the timeout. The handle keeps no socket open between probes,
//! so it reports no pool counters.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tokio::net::TcpStream;

use crate::pool::{StoreClient, StoreConnector};

#[derive(Debug, Clone)]
pub struct TcpConnector {
    addr: String,
    connect_timeout: Duration,
}

impl TcpConnector {
    pub fn new(addr: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            connect_timeout,
        }
    }
}

#[derive(Debug)]
pub struct TcpStoreClient {
    addr: String,
    connect_timeout: Duration,
}

impl TcpStoreClient {
    pub fn addr(&self) -> &str {
        &self.addr
    }
}

async fn open(addr: &str, connect_timeout: Duration) -> anyhow::Result<TcpStream> {
    tokio::time::timeout(connect_timeout, TcpStream::connect(addr))
        .await
        .with_context(|| format!("connecting to {} timed out", addr))?
        .with_context(|| format!("connecting to {}", addr))
}

#[async_trait]
impl StoreConnector for TcpConnector {
    type Client = TcpStoreClient;

    async fn connect(&self) -> anyhow::Result<TcpStoreClient> {
        open(&self.addr, self.connect_timeout).await?;

        Ok(TcpStoreClient {
            addr: self.addr.clone(),
            connect_timeout: self.connect_timeout,
        })
    }
}

#[async_trait]
impl StoreClient for TcpStoreClient {
    async fn ping(&self) -> anyhow::Result<()> {
        open(&self.addr, self.connect_timeout).await.map(drop)
    }
}
