use std::cmp::Reverse;

use super::Page;

/// One entry of an `Accept` header.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    pub kind: String,
    pub subtype: String,
    pub quality: f32,
}

impl MediaRange {
    fn matches(&self, content_type: &str) -> bool {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();
        let Some((kind, subtype)) = essence.split_once('/') else {
            return false;
        };
        (self.kind == "*" || self.kind.eq_ignore_ascii_case(kind))
            && (self.subtype == "*" || self.subtype.eq_ignore_ascii_case(subtype))
    }

    /// `*/*` < `type/*` < `type/subtype`
    fn specificity(&self) -> u8 {
        match (self.kind == "*", self.subtype == "*") {
            (true, _) => 0,
            (false, true) => 1,
            (false, false) => 2,
        }
    }
}

/// Parse an `Accept` header into media ranges ordered by preference.
///
/// Malformed entries are dropped. Ranges with `q=0` are kept, last, since
/// they refuse what they match. Equal qualities keep header order.
pub fn parse_accept(header: &str) -> Vec<MediaRange> {
    let mut ranges = header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let (kind, subtype) = parts.next()?.trim().split_once('/')?;
            if kind.is_empty() || subtype.is_empty() {
                return None;
            }
            let mut quality = 1.0f32;
            for param in parts {
                if let Some((name, value)) = param.split_once('=') {
                    if name.trim().eq_ignore_ascii_case("q") {
                        quality = value.trim().parse().ok()?;
                    }
                }
            }
            Some(MediaRange {
                kind: kind.to_string(),
                subtype: subtype.to_string(),
                quality,
            })
        })
        .collect::<Vec<_>>();
    ranges.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    ranges
}

/// Pick the page to serve for `accept`.
///
/// Without an `Accept` header, or with one that has no parseable ranges, the
/// first page wins. Otherwise each page takes the quality of the most specific
/// range matching it and the best page wins; ties go to the earlier header
/// entry, then the earlier page. `None` means nothing is acceptable, which
/// includes every page being refused with `q=0`.
pub fn select<'p>(pages: &'p [Page], accept: Option<&str>) -> Option<&'p Page> {
    let ranges = accept.map(parse_accept).unwrap_or_default();
    if ranges.is_empty() {
        return pages.first();
    }
    pages
        .iter()
        .enumerate()
        .filter_map(|(index, page)| {
            let (rank, range) = ranges
                .iter()
                .enumerate()
                .filter(|(_, range)| range.matches(page.content_type))
                .max_by_key(|(rank, range)| (range.specificity(), Reverse(*rank)))?;
            (range.quality > 0.0).then_some((range.quality, rank, index, page))
        })
        .min_by(|a, b| {
            b.0.total_cmp(&a.0)
                .then(a.1.cmp(&b.1))
                .then(a.2.cmp(&b.2))
        })
        .map(|(_, _, _, page)| page)
}
