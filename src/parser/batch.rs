//! Parallel parsing of independent sources.

use super::{ParseOptions, ParseOutcome, Parser};
use crate::grammar::Language;
use rayon::prelude::*;

/// Parse every source in parallel, one [`Parser`] per worker thread
///
/// Outcomes come back in the order of `sources`. The grammar table is shared
/// by all workers.
pub fn parse_batch<S>(language: &Language, sources: &[S], options: &ParseOptions) -> Vec<ParseOutcome>
where
    S: AsRef<[u8]> + Sync,
{
    tracing::debug!("[PARSE] batch of {} sources with {}", sources.len(), language.name());
    sources
        .par_iter()
        .map_init(
            || Parser::new(language.clone()).with_options(options.clone()),
            |parser, source| parser.parse(source.as_ref()),
        )
        .collect()
}
