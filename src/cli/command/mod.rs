pub mod daily;
pub mod inventory;
pub mod stations;

use anyhow::{Context, Result};
use ghcnd::{ArchiveItem, Config, InventoryIndex, ParseMode};

pub use daily::{daily, station};
pub use inventory::inventory;
pub use stations::stations;

use super::create_spinner;

/// Fetches the inventory if needed and loads it.
pub async fn load_inventory(config: &Config) -> Result<InventoryIndex> {
    let bar = create_spinner("Downloading inventory...".to_string());
    let path = config
        .fetcher()
        .fetch_with_progress(&ArchiveItem::Inventory, &config.data_dir, &bar)
        .await?;
    bar.finish_with_message("Inventory downloaded");

    // Strict: a malformed inventory row fails the command
    let (index, _) = InventoryIndex::from_file(&path, ParseMode::Strict)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    Ok(index)
}
