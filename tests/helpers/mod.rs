pub mod source_fixtures;
pub mod tree_assertions;
