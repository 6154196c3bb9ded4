pub mod chat;
pub mod graph_panel;
pub mod query_details;
