pub mod metrics_manager;
pub mod rag_client;
pub mod session_manager;
pub mod token_client;
