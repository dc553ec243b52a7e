//! Storage layer tests

mod test_local_store;
