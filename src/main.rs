use std::env;

use tubechef::{import_recipe, scrape_channel, scrape_query, AppConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mode = args
        .get(1)
        .ok_or("Usage: tubechef <id|query|channel> <argument>")?;
    let arg = args
        .get(2)
        .ok_or("Please provide an argument for the search mode")?;

    let config = AppConfig::load()?;

    let recipes = match mode.as_str() {
        "id" => vec![import_recipe(&config, arg).await?],
        "query" => scrape_query(&config, arg).await?,
        "channel" => scrape_channel(&config, arg).await?,
        other => return Err(format!("Invalid search mode: {}", other).into()),
    };

    println!("{}", serde_json::to_string_pretty(&recipes)?);

    Ok(())
}
