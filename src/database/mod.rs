pub mod attempt_store;
#[cfg(test)]
pub(crate) mod memory;
pub mod pool;
pub mod question_store;
