mod tests_batch;
#[cfg(feature = "serde")]
mod tests_json;
mod tests_parse;
