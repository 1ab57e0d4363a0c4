// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Identifier case conversion used for output keys, enum items and file hints.

/// `snake_case` or `kebab-case` to `PascalCase`.
///
/// Segments keep their own capitalization after the first letter, so an
/// identifier that is already PascalCase is returned unchanged. Trailing
/// underscores are kept.
pub fn snake_to_pascal(name: &str) -> String {
    let trimmed = name.trim_end_matches('_');
    let trailing = &name[trimmed.len()..];

    let mut out = String::with_capacity(name.len());
    for segment in trimmed.split(['_', '-']) {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out.push_str(trailing);
    out
}

/// `UPPER_CASE` enum item to `PascalCase`.
pub fn upper_to_pascal(item: &str) -> String {
    let trimmed = item.trim_end_matches('_');
    let trailing = &item[trimmed.len()..];

    let mut out = String::with_capacity(item.len());
    for segment in trimmed.split('_') {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }
    out.push_str(trailing);
    out
}
