use crate::{
    error::Result,
    model::{Flow, FlowKey, FlowUsage},
    store::FlowStore,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Sums a batch by key. Each key of the result appears exactly once.
pub(crate) fn fold<'a>(flows: impl IntoIterator<Item = &'a Flow>) -> HashMap<FlowKey, FlowUsage> {
    let mut totals = HashMap::<FlowKey, FlowUsage>::new();
    for flow in flows {
        absorb_into(&mut totals, flow);
    }
    totals
}

fn absorb_into(totals: &mut HashMap<FlowKey, FlowUsage>, flow: &Flow) {
    if let Some(usage) = totals.get_mut(flow.key()) {
        usage.absorb(flow.usage());
    } else {
        totals.insert(flow.key().clone(), flow.usage());
    }
}

/// Thread-safe store that keeps every aggregate in process memory. Contents are lost on drop.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<FlowKey, FlowUsage>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct keys currently aggregated.
    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.lock().is_empty()
    }

    fn collect<P>(&self, mut predicate: P) -> Vec<Flow>
    where
        P: FnMut(&FlowKey) -> bool,
    {
        let data = self.data.lock();
        data.iter()
            .filter(|(key, _)| predicate(key))
            .map(|(key, usage)| Flow::from_parts(key.clone(), *usage))
            .collect()
    }
}

#[async_trait]
impl FlowStore for MemoryStore {
    async fn merge(&self, flows: &[Flow]) -> Result<()> {
        // The whole batch goes in under one guard so readers never see half of it.
        let mut data = self.data.lock();
        data.reserve(flows.len());
        for flow in flows {
            absorb_into(&mut data, flow);
        }
        Ok(())
    }

    async fn query_all(&self) -> Result<Vec<Flow>> {
        Ok(self.collect(|_| true))
    }

    async fn query_by_hour(&self, hour: u64) -> Result<Vec<Flow>> {
        Ok(self.collect(|key| key.hour == hour))
    }
}
