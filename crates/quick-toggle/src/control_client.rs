//! Line-protocol client for the tunneling service's control port.
//!
//! Every request is one line (`PROFILE`, `TRAFFIC`, `START`, `STOP`) and
//! every reply is one line: `OK`, `OK <payload>`,
//! `PERMISSION <description>[|<target>]` or `ERR <message>`.

use quick_toggle_core::{
    BindingId, BridgeError, ConnectionCallbacks, CoreResult, PermissionRequest, RemoteControl,
    ServiceBinder, ServiceLauncher, StatusQuery,
};

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::TcpStream,
    runtime::Handle,
    task::JoinHandle,
};
use tracing::{debug, info, instrument, warn};

/// One parsed reply line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Reply {
    /// Success, with the payload if one followed `OK`.
    Ok(Option<String>),
    /// The service needs the user to grant something first.
    Permission(PermissionRequest),
    /// The service refused or failed.
    Err(String),
}

/// Parse a reply line. `None` for anything outside the protocol.
pub(crate) fn parse_reply(line: &str) -> Option<Reply> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (word, rest) = match line.split_once(' ') {
        Some((word, rest)) => (word, Some(rest)),
        None => (line, None),
    };

    match (word, rest) {
        ("OK", None) => Some(Reply::Ok(None)),
        ("OK", Some(payload)) => Some(Reply::Ok(Some(payload.to_string()))),
        ("PERMISSION", Some(body)) => {
            let (description, target) = match body.split_once('|') {
                Some((description, target)) if !target.is_empty() => {
                    (description, Some(target.to_string()))
                }
                Some((description, _)) => (description, None),
                None => (body, None),
            };
            Some(Reply::Permission(PermissionRequest {
                description: description.to_string(),
                target,
            }))
        }
        ("ERR", rest) => Some(Reply::Err(rest.unwrap_or_default().to_string())),
        _ => None,
    }
}

async fn exchange(
    stream: &mut BufReader<TcpStream>,
    operation: &'static str,
    request: &str,
) -> CoreResult<Reply> {
    stream
        .get_mut()
        .write_all(format!("{}\n", request).as_bytes())
        .await
        .map_err(|e| BridgeError::operation_failure(operation, e))?;

    let mut line = String::new();
    let read = stream
        .read_line(&mut line)
        .await
        .map_err(|e| BridgeError::operation_failure(operation, e))?;

    if read == 0 {
        return Err(BridgeError::operation_failure(
            operation,
            "Control connection closed",
        ));
    }

    match parse_reply(&line) {
        Some(Reply::Err(message)) => Err(BridgeError::operation_failure(operation, message)),
        Some(reply) => Ok(reply),
        None => Err(BridgeError::operation_failure(
            operation,
            format!("Malformed reply: {:?}", line.trim_end()),
        )),
    }
}

async fn connect(addr: &str) -> CoreResult<BufReader<TcpStream>> {
    TcpStream::connect(addr)
        .await
        .map(BufReader::new)
        .map_err(|e| BridgeError::connect_failure(format!("{}: {}", addr, e)))
}

/// Short-lived request connections for status and start/stop.
pub struct ControlClient {
    addr: String,
    request_timeout: Duration,
}

impl ControlClient {
    /// Client for the control port at `addr`.
    pub fn new(addr: impl Into<String>, request_timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            request_timeout,
        }
    }

    #[instrument(skip(self), fields(addr = %self.addr))]
    async fn request(&self, operation: &'static str, line: &'static str) -> CoreResult<Reply> {
        let round_trip = async {
            let mut stream = connect(&self.addr).await?;
            exchange(&mut stream, operation, line).await
        };

        match tokio::time::timeout(self.request_timeout, round_trip).await {
            Ok(result) => result,
            Err(_) => Err(BridgeError::timeout(operation, self.request_timeout)),
        }
    }
}

#[async_trait]
impl StatusQuery for ControlClient {
    async fn current_profile_name(&self) -> CoreResult<Option<String>> {
        match self.request("current_profile_name", "PROFILE").await? {
            Reply::Ok(profile) => Ok(profile),
            other => Err(BridgeError::operation_failure(
                "current_profile_name",
                format!("Unexpected reply: {:?}", other),
            )),
        }
    }
}

#[async_trait]
impl ServiceLauncher for ControlClient {
    async fn start(&self) -> CoreResult<Option<PermissionRequest>> {
        match self.request("start", "START").await? {
            Reply::Ok(_) => {
                info!("Service start requested");
                Ok(None)
            }
            Reply::Permission(request) => {
                info!(description = %request.description, "Service start needs permission");
                Ok(Some(request))
            }
            Reply::Err(message) => Err(BridgeError::operation_failure("start", message)),
        }
    }

    async fn stop(&self) -> CoreResult<()> {
        match self.request("stop", "STOP").await? {
            Reply::Ok(_) => {
                info!("Service stop requested");
                Ok(())
            }
            other => Err(BridgeError::operation_failure(
                "stop",
                format!("Unexpected reply: {:?}", other),
            )),
        }
    }
}

/// Connected control handle held for one binding session.
pub struct TcpRemote {
    stream: tokio::sync::Mutex<BufReader<TcpStream>>,
}

#[async_trait]
impl RemoteControl for TcpRemote {
    async fn query_traffic_total(&self) -> CoreResult<Option<u64>> {
        let mut stream = self.stream.lock().await;

        match exchange(&mut stream, "query_traffic_total", "TRAFFIC").await? {
            Reply::Ok(None) => Ok(None),
            Reply::Ok(Some(payload)) => payload.trim().parse::<u64>().map(Some).map_err(|e| {
                BridgeError::operation_failure("query_traffic_total", e)
            }),
            other => Err(BridgeError::operation_failure(
                "query_traffic_total",
                format!("Unexpected reply: {:?}", other),
            )),
        }
    }
}

/// Binding facility over persistent TCP connections.
///
/// `bind` starts a background connect and reports through the callbacks;
/// `unbind` aborts the connect if it is still running.
pub struct TcpBinder {
    addr: String,
    runtime: Handle,
    next_id: AtomicU64,
    connecting: Mutex<HashMap<u64, JoinHandle<()>>>,
}

impl TcpBinder {
    /// Binder for the control port at `addr`, connecting on `runtime`.
    pub fn new(addr: impl Into<String>, runtime: Handle) -> Self {
        Self {
            addr: addr.into(),
            runtime,
            next_id: AtomicU64::new(1),
            connecting: Mutex::new(HashMap::new()),
        }
    }

    /// Bindings not yet released.
    pub fn outstanding(&self) -> usize {
        self.connecting
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl ServiceBinder for TcpBinder {
    #[instrument(skip(self, callbacks), fields(addr = %self.addr))]
    fn bind(&self, callbacks: ConnectionCallbacks) -> CoreResult<BindingId> {
        if self.addr.trim().is_empty() {
            return Err(BridgeError::connect_failure("No control address configured"));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let addr = self.addr.clone();

        let task = self.runtime.spawn(async move {
            match TcpStream::connect(&addr).await {
                Ok(stream) => {
                    debug!(binding = id, "Control connection established");
                    callbacks.on_connected(Arc::new(TcpRemote {
                        stream: tokio::sync::Mutex::new(BufReader::new(stream)),
                    }));
                }
                Err(e) => {
                    warn!(binding = id, error = ?e, "Control connection failed");
                    callbacks.on_connect_failed(format!("{}: {}", addr, e));
                }
            }
        });

        self.connecting
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, task);

        Ok(BindingId(id))
    }

    fn unbind(&self, binding: BindingId) {
        let task = self
            .connecting
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&binding.0);

        match task {
            Some(task) => {
                task.abort();
                debug!(
                    binding = binding.0,
                    outstanding = self.outstanding(),
                    "Binding released"
                );
            }
            None => warn!(binding = binding.0, "Unbind for unknown binding"),
        }
    }
}
