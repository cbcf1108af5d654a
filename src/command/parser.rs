//! Attachment tokenizer.
//!
//! Phone gateways deliver command texts with inconsistent separators, so
//! tokenization is forgiving: split a blob on newlines if it has any,
//! else on `", "`, else treat the whole blob as one token. Every token is
//! then split on its first `": "` into a lowercased command name and an
//! optional argument.
//!
//! The output is one deduplicated mapping across the whole batch of
//! blobs. Source order carries no meaning, so two tokens naming the same
//! command collapse to whichever was seen last.

use std::collections::{BTreeMap, HashSet};

/// Parsed batch: lowercased command name → optional argument.
/// A `BTreeMap` keeps dispatch order deterministic.
pub type CommandBatch = BTreeMap<String, Option<String>>;

/// Tokenize a batch of attachment bodies into commands.
pub fn parse_batch<'a, I>(blobs: I) -> CommandBatch
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashSet<&str> = HashSet::new();
    let mut batch = CommandBatch::new();

    for blob in blobs {
        let tokens: Vec<&str> = if blob.contains('\n') {
            blob.split('\n').collect()
        } else if blob.contains(", ") {
            blob.split(", ").collect()
        } else {
            vec![blob]
        };

        for token in tokens {
            let token = token.trim_end_matches('\r');
            if token.trim().is_empty() {
                continue;
            }
            if !seen.insert(token) {
                continue;
            }
            match token.split_once(": ") {
                Some((name, arg)) => {
                    batch.insert(name.to_lowercase(), Some(arg.to_string()));
                }
                None => {
                    batch.insert(token.to_lowercase(), None);
                }
            }
        }
    }

    batch
}
