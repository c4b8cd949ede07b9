pub mod fragment_crud;
pub mod value_ops;
pub mod vector_search;
