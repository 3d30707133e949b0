//! Boolean AND across several record queries.
//!
//! Each sub-query resolves to one suffix-array range. The smallest range is
//! scanned into a candidate set; every other range only bumps hit counts of
//! ids already in that set. A record survives iff it was hit by all ranges.

use super::engine::RecordIndex;
use crate::error::{Error, Result};
use crate::index::text_index::TextIndex;
use crate::index::types::{RecordId, SaRange};
use ahash::AHashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Kind of a sub-query in a multi-search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Single pattern: records containing it
    Search,
    /// Pattern pair: records containing anything lexicographically between them
    RangeSearch,
}

impl QueryKind {
    /// Number of patterns this kind takes
    pub fn arity(&self) -> usize {
        match self {
            QueryKind::Search => 1,
            QueryKind::RangeSearch => 2,
        }
    }
}

impl FromStr for QueryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "search" => Ok(QueryKind::Search),
            "range" | "rangesearch" => Ok(QueryKind::RangeSearch),
            other => Err(Error::InvalidArgument(format!(
                "unsupported query kind: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKind::Search => f.write_str("search"),
            QueryKind::RangeSearch => f.write_str("range"),
        }
    }
}

/// One sub-query of a multi-search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordQuery {
    Search(Vec<u8>),
    Range { begin: Vec<u8>, end: Vec<u8> },
}

impl RecordQuery {
    pub fn kind(&self) -> QueryKind {
        match self {
            RecordQuery::Search(_) => QueryKind::Search,
            RecordQuery::Range { .. } => QueryKind::RangeSearch,
        }
    }

    /// Build from a kind and its pattern list, checking the pattern count
    pub fn from_parts(kind: QueryKind, patterns: &[Vec<u8>]) -> Result<Self> {
        if patterns.len() != kind.arity() {
            return Err(Error::InvalidArgument(format!(
                "{} query takes {} pattern(s), got {}",
                kind,
                kind.arity(),
                patterns.len()
            )));
        }
        Ok(match kind {
            QueryKind::Search => RecordQuery::Search(patterns[0].clone()),
            QueryKind::RangeSearch => RecordQuery::Range {
                begin: patterns[0].clone(),
                end: patterns[1].clone(),
            },
        })
    }
}

impl FromStr for RecordQuery {
    type Err = Error;

    /// Parse `search:<pattern>` or `range:<begin>:<end>`
    fn from_str(s: &str) -> Result<Self> {
        let (kind, rest) = s.split_once(':').ok_or_else(|| {
            Error::InvalidArgument(format!("expected <kind>:<pattern>, got {:?}", s))
        })?;
        let kind: QueryKind = kind.parse()?;
        let patterns: Vec<Vec<u8>> = match kind {
            QueryKind::Search => vec![rest.as_bytes().to_vec()],
            QueryKind::RangeSearch => rest.splitn(2, ':').map(|p| p.as_bytes().to_vec()).collect(),
        };
        RecordQuery::from_parts(kind, &patterns)
    }
}

impl<T: TextIndex> RecordIndex<T> {
    /// Suffix-array range a sub-query resolves to
    pub fn resolve_query(&self, query: &RecordQuery) -> SaRange {
        match query {
            RecordQuery::Search(pattern) => self.text_index().get_range(pattern),
            RecordQuery::Range { begin, end } => self.range_between(begin, end),
        }
    }

    /// Ids of records matched by every query, in the order they were first
    /// seen in the smallest range
    pub fn multi_search_ids(&self, queries: &[RecordQuery]) -> Result<Vec<RecordId>> {
        if queries.is_empty() {
            return Err(Error::InvalidArgument(
                "multi-search called with no queries".to_string(),
            ));
        }

        let mut ranges = Vec::with_capacity(queries.len());
        for query in queries {
            let range = self.resolve_query(query);
            if range.is_empty() {
                debug!(?query, "multi-search short-circuit on empty range");
                return Ok(Vec::new());
            }
            ranges.push(range);
        }

        // Smallest first so the candidate set starts as small as possible
        ranges.sort_by_key(|r| r.len());
        debug!(
            queries = queries.len(),
            sizes = ?ranges.iter().map(|r| r.len()).collect::<Vec<_>>(),
            "multi-search ranges"
        );

        let (order, counts) = self.candidates(ranges[0]);
        let counts = ranges[1..]
            .iter()
            .fold(counts, |counts, &range| self.count_hits(counts, range));

        let needed = ranges.len();
        Ok(order
            .into_iter()
            .filter(|id| counts.get(id) == Some(&needed))
            .collect())
    }

    /// Records matched by every query
    pub fn multi_search(&self, queries: &[RecordQuery]) -> Result<Vec<Vec<u8>>> {
        self.multi_search_ids(queries)?
            .into_iter()
            .map(|id| self.record(id))
            .collect()
    }

    /// Multi-search over parallel kind and pattern-list arrays
    pub fn multi_search_by_kind(
        &self,
        kinds: &[QueryKind],
        queries: &[Vec<Vec<u8>>],
    ) -> Result<Vec<Vec<u8>>> {
        if kinds.len() != queries.len() {
            return Err(Error::InvalidArgument(format!(
                "{} query kinds for {} queries",
                kinds.len(),
                queries.len()
            )));
        }
        let queries = kinds
            .iter()
            .zip(queries)
            .map(|(&kind, patterns)| RecordQuery::from_parts(kind, patterns))
            .collect::<Result<Vec<_>>>()?;
        self.multi_search(&queries)
    }

    /// Build phase: distinct ids in `range`, in first-encounter order, each with one hit
    fn candidates(&self, range: SaRange) -> (Vec<RecordId>, AHashMap<RecordId, usize>) {
        let mut order = Vec::new();
        let mut counts = AHashMap::new();
        for id in self.scan(range) {
            counts.entry(id).or_insert_with(|| {
                order.push(id);
                1
            });
        }
        (order, counts)
    }

    /// Fold phase: bump candidates hit by `range`, at most once per range
    fn count_hits(
        &self,
        mut counts: AHashMap<RecordId, usize>,
        range: SaRange,
    ) -> AHashMap<RecordId, usize> {
        let mut seen = roaring::RoaringBitmap::new();
        for id in self.scan(range) {
            if let Some(count) = counts.get_mut(&id) {
                if seen.insert(id) {
                    *count += 1;
                }
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::suffix_array::{RecordIndexBuilder, SuffixArrayIndex};
    use std::collections::HashSet;

    fn build(records: &[&str]) -> RecordIndex<SuffixArrayIndex> {
        let mut builder = RecordIndexBuilder::with_defaults();
        for record in records {
            builder.add_record(record.as_bytes()).unwrap();
        }
        builder.build().unwrap().into_record_index()
    }

    fn search(p: &str) -> RecordQuery {
        RecordQuery::Search(p.as_bytes().to_vec())
    }

    fn ids(idx: &RecordIndex<SuffixArrayIndex>, queries: &[RecordQuery]) -> HashSet<RecordId> {
        idx.multi_search_ids(queries).unwrap().into_iter().collect()
    }

    /// Ten records where "ant" hits {0, 2, 5} and "bee" hits {2, 5, 9}
    fn ant_bee_index() -> RecordIndex<SuffixArrayIndex> {
        build(&[
            "ant", "x", "ant bee", "y", "z", "bee ant ant", "w", "v", "u", "bee bee",
        ])
    }

    #[test]
    fn test_two_pattern_and() {
        let idx = ant_bee_index();
        let expected: HashSet<RecordId> = [2, 5].into_iter().collect();
        assert_eq!(ids(&idx, &[search("ant"), search("bee")]), expected);
        assert_eq!(ids(&idx, &[search("bee"), search("ant")]), expected);
    }

    #[test]
    fn test_repeated_hits_in_one_record_count_once() {
        // Record 5 holds "ant" twice, which must not stand in for missing "bee bee"
        let idx = ant_bee_index();
        assert!(ids(&idx, &[search("bee a"), search("ant"), search("bee bee")]).is_empty());
        assert!(ids(&idx, &[search("ant"), search("an")]).contains(&5));
    }

    #[test]
    fn test_single_query_matches_record_search() {
        let idx = ant_bee_index();
        let multi: HashSet<Vec<u8>> = idx.multi_search(&[search("bee")]).unwrap().into_iter().collect();
        let single: HashSet<Vec<u8>> = idx.record_search(b"bee").unwrap().into_iter().collect();
        assert_eq!(multi, single);

        let range = RecordQuery::Range {
            begin: b"ant".to_vec(),
            end: b"bee".to_vec(),
        };
        let multi: HashSet<Vec<u8>> = idx.multi_search(&[range]).unwrap().into_iter().collect();
        let single: HashSet<Vec<u8>> = idx
            .record_range_search(b"ant", b"bee")
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(multi, single);
    }

    #[test]
    fn test_empty_range_short_circuits() {
        let idx = ant_bee_index();
        assert!(idx
            .multi_search(&[search("ant"), search("nothing here")])
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_empty_queries_rejected() {
        let idx = ant_bee_index();
        assert!(matches!(
            idx.multi_search(&[]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            idx.multi_search_by_kind(&[], &[]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_by_kind_validates_shapes() {
        let idx = ant_bee_index();
        // Mismatched lengths
        assert!(matches!(
            idx.multi_search_by_kind(&[QueryKind::Search], &[]),
            Err(Error::InvalidArgument(_))
        ));
        // Range with one pattern
        assert!(matches!(
            idx.multi_search_by_kind(&[QueryKind::RangeSearch], &[vec![b"a".to_vec()]]),
            Err(Error::InvalidArgument(_))
        ));

        let records = idx
            .multi_search_by_kind(
                &[QueryKind::Search, QueryKind::RangeSearch],
                &[vec![b"ant".to_vec()], vec![b"bee".to_vec(), b"bee".to_vec()]],
            )
            .unwrap();
        let records: HashSet<Vec<u8>> = records.into_iter().collect();
        let expected: HashSet<Vec<u8>> =
            [b"ant bee".to_vec(), b"bee ant ant".to_vec()].into_iter().collect();
        assert_eq!(records, expected);
    }

    #[test]
    fn test_query_kind_parse() {
        assert_eq!("search".parse::<QueryKind>().unwrap(), QueryKind::Search);
        assert_eq!("RANGE".parse::<QueryKind>().unwrap(), QueryKind::RangeSearch);
        assert!(matches!(
            "fuzzy".parse::<QueryKind>(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_record_query_parse() {
        assert_eq!("search:a:b".parse::<RecordQuery>().unwrap(), search("a:b"));
        assert_eq!(
            "range:a:c".parse::<RecordQuery>().unwrap(),
            RecordQuery::Range {
                begin: b"a".to_vec(),
                end: b"c".to_vec()
            }
        );
        assert!("range:onlyone".parse::<RecordQuery>().is_err());
        assert!("nokind".parse::<RecordQuery>().is_err());
    }

    #[test]
    fn test_results_follow_smallest_range_order() {
        let idx = ant_bee_index();
        let order = idx
            .multi_search_ids(&[search("a"), search("ant bee")])
            .unwrap();
        assert_eq!(order, vec![2]);
    }
}
