mod block_file;

pub use block_file::{persist_block, restore_block};
