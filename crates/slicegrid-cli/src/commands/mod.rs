pub mod balance;
pub mod evaluate;
