use milvus_client::{ConnectConfig, MilvusClient, MilvusError};

#[tokio::main]
async fn main() -> Result<(), MilvusError> {
    tracing_subscriber::fmt::init();

    // MILVUS_URI is required, MILVUS_TOKEN / MILVUS_DB_NAME are optional.
    let config = ConnectConfig::from_env()?;
    println!("=== Connecting to {} ===", config.base_url());
    let client = MilvusClient::new(config)?;

    println!("\n=== Users ===");
    for user in client.list_users().await? {
        println!("  {user}");
    }

    println!("\n=== Databases ===");
    for db in client.list_databases().await? {
        println!("  {db}");
    }

    println!(
        "\n=== Collections in '{}' ===",
        client.config().db_name.as_deref().unwrap_or("default")
    );
    let collections = client.list_collections().await?;
    if collections.is_empty() {
        println!("  (none)");
    }
    for name in collections {
        println!("  {name}");
    }

    client.close();
    Ok(())
}
