use std::sync::Arc;

use bollard::models::{
    ContainerInspectResponse, ContainerStateStatusEnum, ContainerSummary, PortMap,
};
use chrono::{DateTime, Utc};

use crate::engine::{self, Engine};
use crate::fmt;

/// Lifecycle state reported by the engine; lowercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerState {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
}

impl ContainerState {
    fn from_engine(status: Option<ContainerStateStatusEnum>) -> Self {
        match status {
            Some(ContainerStateStatusEnum::RUNNING) => Self::Running,
            Some(ContainerStateStatusEnum::PAUSED) => Self::Paused,
            Some(ContainerStateStatusEnum::RESTARTING) => Self::Restarting,
            Some(ContainerStateStatusEnum::REMOVING) => Self::Removing,
            Some(ContainerStateStatusEnum::EXITED) => Self::Exited,
            Some(ContainerStateStatusEnum::DEAD) => Self::Dead,
            // A container that has never been started reports `created` or
            // no status at all.
            Some(ContainerStateStatusEnum::CREATED)
            | Some(ContainerStateStatusEnum::EMPTY)
            | None => Self::Created,
        }
    }
}

/// A container port actually published to the host. Merely exposed ports
/// never appear here.
#[derive(Debug, PartialEq, Eq, serde::Serialize)]
pub struct PortMapping {
    pub host_ip: String,
    pub private_port: u16,
    pub public_port: u16,
    pub protocol: String,
}

/// One container as reported by the API.
#[derive(Debug, serde::Serialize)]
pub struct ContainerRecord {
    /// Truncated 12-character container id.
    pub id: String,
    /// Container names with the leading `/` stripped.
    pub names: Vec<String>,
    pub image: String,
    pub command: String,
    /// Engine-provided free text, e.g. `Up 2 hours`.
    pub status: String,
    pub state: ContainerState,
    /// Snapshot of the container's age at query time, in whole seconds.
    pub created_seconds_ago: u64,
    pub restart_policy: String,
    pub ports: Vec<PortMapping>,
}

#[derive(Clone)]
pub struct ContainerService {
    engine: Arc<dyn Engine>,
}

impl ContainerService {
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self { engine }
    }

    /// Lists all containers (non-running included) and inspects each one for
    /// the authoritative image reference, state, creation time, port
    /// bindings and restart policy.
    ///
    /// The list call and every per-container inspect run under their own
    /// 2 s budget, sequentially. Any inspect failure aborts the whole
    /// listing; partial results are never returned.
    ///
    /// # Errors
    ///
    /// [`engine::Error::Timeout`] or [`engine::Error::Unavailable`] if the
    /// list call fails, [`engine::Error::Inspect`] if any inspect fails
    /// after a successful list.
    pub async fn list(&self) -> engine::Result<Vec<ContainerRecord>> {
        let summaries = engine::bounded("container list", self.engine.list_containers()).await?;
        log::debug!("engine reported {} containers", summaries.len());

        let now = Utc::now();
        let mut records = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let id = summary.id.clone().unwrap_or_default();
            let inspect =
                engine::bounded("container inspect", self.engine.inspect_container(&id))
                    .await
                    .map_err(|source| engine::Error::Inspect {
                        id: fmt::short_id(&id),
                        source: Box::new(source),
                    })?;
            records.push(ContainerRecord::from_engine(summary, inspect, now));
        }

        Ok(records)
    }
}

impl ContainerRecord {
    fn from_engine(
        summary: ContainerSummary,
        inspect: ContainerInspectResponse,
        now: DateTime<Utc>,
    ) -> Self {
        let status = inspect.state.and_then(|state| state.status);
        let ports = inspect
            .network_settings
            .and_then(|settings| settings.ports);
        Self {
            id: fmt::short_id(summary.id.as_deref().unwrap_or_default()),
            names: summary
                .names
                .unwrap_or_default()
                .iter()
                .map(|name| name.trim_start_matches('/').to_owned())
                .collect(),
            image: inspect
                .config
                .and_then(|config| config.image)
                .or(summary.image)
                .unwrap_or_default(),
            command: summary.command.unwrap_or_default(),
            status: summary.status.unwrap_or_default(),
            state: ContainerState::from_engine(status),
            created_seconds_ago: fmt::age_seconds(inspect.created.as_deref(), now),
            restart_policy: inspect
                .host_config
                .and_then(|host_config| host_config.restart_policy)
                .and_then(|policy| policy.name)
                .map(|name| name.to_string())
                .unwrap_or_default(),
            ports: published_ports(ports),
        }
    }
}

/// Keeps only ports published to the host: an entry qualifies when it has a
/// binding with a non-empty host IP, and the first binding wins. Exposed
/// ports without a host binding are dropped. The engine's port map is
/// unordered, so the result is sorted by (private port, protocol).
fn published_ports(ports: Option<PortMap>) -> Vec<PortMapping> {
    let mut out: Vec<PortMapping> = ports
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(spec, bindings)| {
            let binding = bindings?.into_iter().next()?;
            let host_ip = binding.host_ip.filter(|ip| !ip.is_empty())?;
            let (private_port, protocol) = match spec.split_once('/') {
                Some((port, proto)) => (port, proto),
                None => (spec.as_str(), "tcp"),
            };
            let private_port = match private_port.parse() {
                Ok(port) => port,
                Err(_) => {
                    log::warn!("skipping port entry with unparsable key `{spec}`");
                    return None;
                }
            };
            let public_port = match binding.host_port.as_deref().unwrap_or_default().parse() {
                Ok(port) => port,
                Err(_) => {
                    log::warn!("skipping port entry `{spec}` with unparsable host port");
                    return None;
                }
            };
            Some(PortMapping {
                host_ip,
                private_port,
                public_port,
                protocol: protocol.to_owned(),
            })
        })
        .collect();
    out.sort_by(|a, b| {
        (a.private_port, a.protocol.as_str()).cmp(&(b.private_port, b.protocol.as_str()))
    });
    out
}
