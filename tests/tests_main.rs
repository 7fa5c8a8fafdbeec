#[path = "helpers/mod.rs"]
mod helpers;

#[path = "incremental/mod.rs"]
mod incremental;

#[path = "parser/mod.rs"]
mod parser;

#[path = "recovery/mod.rs"]
mod recovery;

#[path = "tree/mod.rs"]
mod tree;
