use serde::{Deserialize, Serialize};

/// The fields that decide whether two flows are aggregated together.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FlowKey {
    /// Virtual network in which the traffic was observed.
    pub network_id: Box<str>,
    /// Application that initiated the traffic.
    pub source_app: Box<str>,
    /// Application on the receiving end.
    pub dest_app: Box<str>,
    /// Hour bucket of the observation.
    pub hour: u64,
}

/// Running byte counters for a single [`FlowKey`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FlowUsage {
    pub bytes_transmitted: u64,
    pub bytes_received: u64,
}

impl FlowUsage {
    /// Adds the counters of `other` into `self`. Counters saturate at [`u64::MAX`].
    pub fn absorb(&mut self, other: Self) {
        self.bytes_transmitted = self.bytes_transmitted.saturating_add(other.bytes_transmitted);
        self.bytes_received = self.bytes_received.saturating_add(other.bytes_received);
    }
}

/// Either a single observation or an aggregate. Both look the same on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "WireFlow", into = "WireFlow")]
pub struct Flow {
    key: FlowKey,
    usage: FlowUsage,
}

impl Flow {
    pub fn new(
        network_id: impl Into<Box<str>>,
        source_app: impl Into<Box<str>>,
        dest_app: impl Into<Box<str>>,
        hour: u64,
        bytes_tx: u64,
        bytes_rx: u64,
    ) -> Self {
        let key = FlowKey {
            network_id: network_id.into(),
            source_app: source_app.into(),
            dest_app: dest_app.into(),
            hour,
        };
        let usage = FlowUsage { bytes_transmitted: bytes_tx, bytes_received: bytes_rx };
        Self { key, usage }
    }

    pub fn from_parts(key: FlowKey, usage: FlowUsage) -> Self {
        Self { key, usage }
    }

    pub fn into_parts(self) -> (FlowKey, FlowUsage) {
        (self.key, self.usage)
    }

    pub fn key(&self) -> &FlowKey {
        &self.key
    }

    pub fn usage(&self) -> FlowUsage {
        self.usage
    }
}

/// Flattened representation used for JSON.
#[derive(Deserialize, Serialize)]
struct WireFlow {
    vpc_id: Box<str>,
    src_app: Box<str>,
    dest_app: Box<str>,
    hour: u64,
    bytes_tx: u64,
    bytes_rx: u64,
}

impl From<WireFlow> for Flow {
    fn from(WireFlow { vpc_id, src_app, dest_app, hour, bytes_tx, bytes_rx }: WireFlow) -> Self {
        Self::new(vpc_id, src_app, dest_app, hour, bytes_tx, bytes_rx)
    }
}

impl From<Flow> for WireFlow {
    fn from(Flow { key, usage }: Flow) -> Self {
        Self {
            vpc_id: key.network_id,
            src_app: key.source_app,
            dest_app: key.dest_app,
            hour: key.hour,
            bytes_tx: usage.bytes_transmitted,
            bytes_rx: usage.bytes_received,
        }
    }
}
