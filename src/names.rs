//! Material name cleanup: vendor prefixes and packaging descriptors.
//!
//! Both word lists are literal text. They are escaped and compiled once into
//! two regexes:
//!
//! - a start-anchored, case-insensitive alternation of vendor prefixes, each
//!   optionally followed by whitespace or hyphens;
//! - an unanchored alternation of packaging keywords that swallows the rest
//!   of the string.
//!
//! Prefixes are tried longest first, and stripped repeatedly, so the result
//! of [`NameNormalizer::normalize`] is a fixed point.

use std::borrow::Cow;

use anyhow::{Context, Result};
use itertools::Itertools;
use regex::{Regex, RegexBuilder};

#[derive(Debug, Clone)]
pub struct NameNormalizer {
    prefix: Option<Regex>,
    packaging: Option<Regex>,
}

impl NameNormalizer {
    pub fn new<P, K>(vendor_prefixes: &[P], packaging_keywords: &[K]) -> Result<Self>
    where
        P: AsRef<str>,
        K: AsRef<str>,
    {
        let prefix = alternation(vendor_prefixes)
            .map(|alt| {
                RegexBuilder::new(&format!(r"^(?:{alt})[\s\-]*"))
                    .case_insensitive(true)
                    .build()
                    .context("Compiling vendor prefix pattern")
            })
            .transpose()?;
        let packaging = alternation(packaging_keywords)
            .map(|alt| {
                Regex::new(&format!(r"(?s)(?:{alt}).*$"))
                    .context("Compiling packaging keyword pattern")
            })
            .transpose()?;
        Ok(NameNormalizer { prefix, packaging })
    }

    pub fn normalize(&self, name: &str) -> String {
        let mut current = name.trim();
        if let Some(prefix) = &self.prefix {
            while let Some(found) = prefix.find(current) {
                if found.end() == 0 {
                    break;
                }
                current = current[found.end()..].trim_start();
            }
        }
        let stripped: Cow<'_, str> = match &self.packaging {
            Some(packaging) => packaging.replace(current, ""),
            None => Cow::Borrowed(current),
        };
        stripped.trim().to_string()
    }
}

fn alternation<S: AsRef<str>>(words: &[S]) -> Option<String> {
    let alt = words
        .iter()
        .map(AsRef::as_ref)
        .filter(|word| !word.is_empty())
        .sorted_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)))
        .dedup()
        .map(regex::escape)
        .join("|");
    (!alt.is_empty()).then_some(alt)
}
