//! Core data model: transactions, blocks, accounts

pub mod account;
pub mod block;
pub mod transaction;

pub use account::Account;
pub use block::Block;
pub use transaction::{Transaction, TxType};
