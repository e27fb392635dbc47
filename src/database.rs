pub use tokio_postgres::Client;

use crate::{
    error::{Result, StoreError},
    memory::fold,
    model::{Flow, FlowKey, FlowUsage},
    store::FlowStore,
};
use async_trait::async_trait;
use tokio_postgres::Row;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS flow (\
    vpc_id TEXT NOT NULL, \
    src_app TEXT NOT NULL, \
    dest_app TEXT NOT NULL, \
    hour NUMERIC(20) NOT NULL, \
    bytes_tx NUMERIC(20) NOT NULL, \
    bytes_rx NUMERIC(20) NOT NULL, \
    PRIMARY KEY (vpc_id, src_app, dest_app, hour))";

const SELECT: &str = "SELECT vpc_id, src_app, dest_app, hour::TEXT, bytes_tx::TEXT, bytes_rx::TEXT FROM flow";

pub struct Database {
    db: Client,
}

impl From<Client> for Database {
    fn from(db: Client) -> Self {
        Self { db }
    }
}

fn parse_counter(row: &Row, idx: usize) -> Result<u64> {
    let text: String = row.try_get(idx)?;
    text.parse().map_err(|_| StoreError::Corrupt(text.into_boxed_str()))
}

fn row_to_flow(row: &Row) -> Result<Flow> {
    let network_id: String = row.try_get(0)?;
    let source_app: String = row.try_get(1)?;
    let dest_app: String = row.try_get(2)?;
    let key = FlowKey {
        network_id: network_id.into_boxed_str(),
        source_app: source_app.into_boxed_str(),
        dest_app: dest_app.into_boxed_str(),
        hour: parse_counter(row, 3)?,
    };
    let usage = FlowUsage { bytes_transmitted: parse_counter(row, 4)?, bytes_received: parse_counter(row, 5)? };
    Ok(Flow::from_parts(key, usage))
}

impl Database {
    /// Creates the `flow` table if it does not exist yet. Counters are stored as `NUMERIC(20)`
    /// since Postgres has no unsigned 64-bit integer type.
    pub async fn migrate(&self) -> Result<()> {
        self.db.batch_execute(SCHEMA).await?;
        Ok(())
    }
}

#[async_trait]
impl FlowStore for Database {
    /// Folds the batch locally so that every key appears once, then upserts everything in a
    /// single statement. `ON CONFLICT DO UPDATE` may not touch the same row twice per command.
    async fn merge(&self, flows: &[Flow]) -> Result<()> {
        let totals = fold(flows);
        if totals.is_empty() {
            return Ok(());
        }

        let mut vpcs = Vec::with_capacity(totals.len());
        let mut srcs = Vec::with_capacity(totals.len());
        let mut dests = Vec::with_capacity(totals.len());
        let mut hours = Vec::with_capacity(totals.len());
        let mut txs = Vec::with_capacity(totals.len());
        let mut rxs = Vec::with_capacity(totals.len());
        for (key, usage) in &totals {
            vpcs.push(&*key.network_id);
            srcs.push(&*key.source_app);
            dests.push(&*key.dest_app);
            hours.push(key.hour.to_string());
            txs.push(usage.bytes_transmitted.to_string());
            rxs.push(usage.bytes_received.to_string());
        }

        self.db
            .execute(
                "INSERT INTO flow (vpc_id, src_app, dest_app, hour, bytes_tx, bytes_rx) \
                SELECT * FROM UNNEST($1::TEXT[], $2::TEXT[], $3::TEXT[], \
                $4::TEXT[]::NUMERIC[], $5::TEXT[]::NUMERIC[], $6::TEXT[]::NUMERIC[]) \
                ON CONFLICT (vpc_id, src_app, dest_app, hour) DO UPDATE SET \
                bytes_tx = LEAST(flow.bytes_tx + EXCLUDED.bytes_tx, 18446744073709551615), \
                bytes_rx = LEAST(flow.bytes_rx + EXCLUDED.bytes_rx, 18446744073709551615)",
                &[&vpcs, &srcs, &dests, &hours, &txs, &rxs],
            )
            .await?;
        Ok(())
    }

    async fn query_all(&self) -> Result<Vec<Flow>> {
        let rows = self.db.query(SELECT, &[]).await?;
        rows.iter().map(row_to_flow).collect()
    }

    async fn query_by_hour(&self, hour: u64) -> Result<Vec<Flow>> {
        let hour = hour.to_string();
        let query = alloc::format!("{SELECT} WHERE hour = $1::TEXT::NUMERIC");
        let rows = self.db.query(query.as_str(), &[&hour]).await?;
        rows.iter().map(row_to_flow).collect()
    }
}
