use milvus_client::{
    ConnectConfig, DatabaseDescription, DatabaseProperties, MilvusClient, MilvusError,
};

const DEFAULT_DATABASE: &str = "my_database_from_rust";

fn print_description(desc: &DatabaseDescription) {
    println!("  name: {}", desc.name);
    if let Some(ref id) = desc.id {
        println!("  id:   {id}");
    }
    for (key, value) in &desc.properties {
        println!("  {key} = {value}");
    }
}

#[tokio::main]
async fn main() -> Result<(), MilvusError> {
    tracing_subscriber::fmt::init();

    let database = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DATABASE.to_string());
    let drop_at_end = std::env::var("MILVUS_DROP_DATABASE").is_ok_and(|v| v == "1");

    let client = MilvusClient::new(ConnectConfig::from_env()?)?;

    // --- Create ---
    println!("=== Creating database '{database}' ===");
    let props = DatabaseProperties::new()
        .with_replica_number(2)
        .with_disk_quota_mb(1024)
        .with_max_collections(2);
    match client.create_database(&database, &props).await {
        Ok(()) => println!("Created"),
        Err(MilvusError::Server { message, .. })
            if message.to_lowercase().contains("already exist") =>
        {
            tracing::warn!(%database, "database already exists, reusing it");
        }
        Err(e) => return Err(e),
    }
    print_description(&client.describe_database(&database).await?);

    // --- Alter ---
    println!("\n=== Raising max collections to 10 ===");
    client
        .alter_database_properties(
            &database,
            &DatabaseProperties::new().with_max_collections(10),
        )
        .await?;

    // --- Drop property ---
    println!("\n=== Dropping '{}' ===", DatabaseProperties::MAX_COLLECTIONS);
    client
        .drop_database_properties(&database, [DatabaseProperties::MAX_COLLECTIONS])
        .await?;
    print_description(&client.describe_database(&database).await?);

    // --- Drop database ---
    if drop_at_end {
        println!("\n=== Dropping database '{database}' ===");
        client.drop_database(&database).await?;
    } else {
        println!("\nKeeping '{database}' (set MILVUS_DROP_DATABASE=1 to drop it)");
    }

    client.close();
    Ok(())
}
