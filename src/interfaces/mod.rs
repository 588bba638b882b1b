pub mod jsonl;
pub mod stripe;
