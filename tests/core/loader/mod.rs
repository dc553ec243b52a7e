//! Loader layer tests
