use milvus_client::MilvusError;

fn main() -> Result<(), MilvusError> {
    tracing_subscriber::fmt::init();

    let client = milvus_connect::connect()?;
    tracing::info!(uri = %client.config().base_url(), "client constructed");
    Ok(())
}
