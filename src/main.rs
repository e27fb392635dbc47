use alloc::sync::Arc;
use flowagg::{config::Config, database::Database, memory::MemoryStore, store::FlowStore};
use std::net::TcpListener;

extern crate alloc;

fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let tcp = TcpListener::bind((config.host, config.port))?;
    tcp.set_nonblocking(true)?;

    env_logger::init();

    let addr = tcp.local_addr()?;
    log::info!("listening to {addr}");

    let rt = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    rt.block_on(async {
        let tcp = tokio::net::TcpListener::from_std(tcp)?;

        let (store, handle) = match config.pg_url {
            Some(pg) => {
                let tls = native_tls::TlsConnector::new()?;
                let tls = postgres_native_tls::MakeTlsConnector::new(tls);
                let (client, conn) = pg.connect(tls).await?;
                let handle = rt.spawn(conn);
                let db = Database::from(client);
                db.migrate().await?;
                log::info!("aggregating flows into postgres");
                (Arc::new(db) as Arc<dyn FlowStore>, Some(handle))
            }
            None => {
                log::warn!("PG_URL not set; flows are only kept in memory");
                (Arc::new(MemoryStore::new()) as Arc<dyn FlowStore>, None)
            }
        };

        flowagg::server::serve(tcp, store.clone(), tokio::signal::ctrl_c()).await?;

        // Open connections may still hold the client, so the driver is stopped outright.
        drop(store);
        if let Some(handle) = handle {
            handle.abort();
        }
        anyhow::Ok(())
    })?;

    log::warn!("stop signal received");
    Ok(())
}
