//! Output of conformed tables.

mod writer;

pub use writer::{save_table, write_jsonl, OUTPUT_FILE_NAME};
