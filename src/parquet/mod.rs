//! Handles serialising and saving tables to disk in the _parquet_ file format.

pub mod daily;
pub mod inventory;

pub use daily::save_daily;
pub use inventory::save_inventory;
