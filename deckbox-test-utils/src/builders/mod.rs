//! Test data builders

pub mod test_data;

pub use test_data::{card_list, user, UserBuilder};
