/// In-memory adapters
mod in_memory_graph_store;

pub use in_memory_graph_store::InMemoryGraphStore;
