pub mod text_store;
