// Adapters layer: concrete implementations for external systems (filesystem, content store, generative http endpoint).

pub mod generator;
pub mod storage;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;
