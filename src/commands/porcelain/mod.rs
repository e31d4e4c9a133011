//! Porcelain commands
//!
//! - `set-offset`: Repoint a path inside a transaction and save the index

pub mod set_offset;
