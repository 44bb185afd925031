/*
 * ranges.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Compact rendering of citation number sets: `1,2,4\-7,9`.

/// The troff non-breaking hyphen placed between the ends of a range.
pub const RANGE_DASH: &str = "\\-";

/// Render a set of citation ids as comma-separated numbers and ranges.
///
/// Ids are sorted and deduplicated first. Runs of three or more consecutive
/// ids collapse to `first\-last`; a run of two stays `n,n+1`.
pub fn compress(ids: &[usize]) -> String {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    let mut out = String::new();
    let mut i = 0;
    while i < ids.len() {
        let start = i;
        while i + 1 < ids.len() && ids[i + 1] == ids[i] + 1 {
            i += 1;
        }
        if start > 0 {
            out.push(',');
        }
        match i - start {
            0 => out.push_str(&ids[start].to_string()),
            1 => out.push_str(&format!("{},{}", ids[start], ids[i])),
            _ => out.push_str(&format!("{}{}{}", ids[start], RANGE_DASH, ids[i])),
        }
        i += 1;
    }
    out
}

/// Parse the output of [`compress`] back into ids.
///
/// Returns `None` if the text is not a list of numbers and ranges.
pub fn expand(text: &str) -> Option<Vec<usize>> {
    let mut ids = Vec::new();
    if text.is_empty() {
        return Some(ids);
    }
    for item in text.split(',') {
        match item.split_once(RANGE_DASH) {
            Some((first, last)) => {
                let first: usize = first.parse().ok()?;
                let last: usize = last.parse().ok()?;
                if last < first {
                    return None;
                }
                ids.extend(first..=last);
            }
            None => ids.push(item.parse().ok()?),
        }
    }
    Some(ids)
}
