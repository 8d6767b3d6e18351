//! Cross-source search
//!
//! Runs both sources' searches concurrently and interleaves the results so
//! neither site dominates the top of the list. Each search runs in its own
//! task: an error or a panic in one source costs only that source's results.

use chords_common::{SearchResultItem, SourceType};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::error::ScrapeError;
use crate::sources::SearchSource;

#[derive(Clone)]
pub struct Aggregator {
    primary: Arc<dyn SearchSource>,
    secondary: Arc<dyn SearchSource>,
}

impl Aggregator {
    /// `primary` results take the even positions of the merged list
    pub fn new(primary: Arc<dyn SearchSource>, secondary: Arc<dyn SearchSource>) -> Self {
        Self { primary, secondary }
    }

    pub async fn search(&self, query: &str) -> Vec<SearchResultItem> {
        let primary_type = self.primary.source_type();
        let secondary_type = self.secondary.source_type();

        let primary = spawn_search(Arc::clone(&self.primary), query);
        let secondary = spawn_search(Arc::clone(&self.secondary), query);
        let (primary, secondary) = tokio::join!(primary, secondary);

        let primary = settle(primary_type, primary);
        let secondary = settle(secondary_type, secondary);
        info!(
            query = %query,
            "[SEARCH] {}: {}, {}: {}",
            primary_type.label(),
            primary.len(),
            secondary_type.label(),
            secondary.len()
        );

        let merged = interleave(primary, secondary);
        info!(query = %query, "[SEARCH] {} results total", merged.len());
        merged
    }
}

fn spawn_search(
    source: Arc<dyn SearchSource>,
    query: &str,
) -> JoinHandle<Result<Vec<SearchResultItem>, ScrapeError>> {
    let query = query.to_string();
    tokio::spawn(async move { source.search_source(&query).await })
}

/// Collapse a task outcome to a result list, logging what was lost
fn settle(
    source: SourceType,
    outcome: Result<Result<Vec<SearchResultItem>, ScrapeError>, tokio::task::JoinError>,
) -> Vec<SearchResultItem> {
    match outcome {
        Ok(Ok(items)) => items,
        Ok(Err(e)) => {
            warn!(source = source.label(), error = %e, "[SEARCH] Source failed");
            Vec::new()
        }
        Err(e) => {
            error!(source = source.label(), error = %e, "[SEARCH] Source task aborted");
            Vec::new()
        }
    }
}

/// Position-wise merge: `a[0], b[0], a[1], b[1], ...`
///
/// Once one list runs out the rest of the other follows in order.
pub fn interleave<T>(a: Vec<T>, b: Vec<T>) -> Vec<T> {
    let mut merged = Vec::with_capacity(a.len() + b.len());
    let mut a = a.into_iter();
    let mut b = b.into_iter();
    loop {
        match (a.next(), b.next()) {
            (None, None) => break,
            (x, y) => merged.extend(x.into_iter().chain(y)),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    enum Behaviour {
        Returns(Vec<&'static str>),
        Fails,
        Panics,
    }

    struct FakeSource {
        source_type: SourceType,
        behaviour: Behaviour,
    }

    #[async_trait]
    impl SearchSource for FakeSource {
        fn source_type(&self) -> SourceType {
            self.source_type
        }

        async fn search_source(&self, query: &str) -> Result<Vec<SearchResultItem>, ScrapeError> {
            match &self.behaviour {
                Behaviour::Returns(titles) => Ok(titles
                    .iter()
                    .map(|title| {
                        SearchResultItem::new(
                            title.to_string(),
                            query.to_string(),
                            format!("https://example.com/{}", title),
                            self.source_type,
                        )
                    })
                    .collect()),
                Behaviour::Fails => Err(ScrapeError::Unavailable {
                    url: "https://example.com".to_string(),
                    reason: "connection refused".to_string(),
                }),
                Behaviour::Panics => panic!("source blew up"),
            }
        }
    }

    fn aggregator(a: Behaviour, b: Behaviour) -> Aggregator {
        Aggregator::new(
            Arc::new(FakeSource {
                source_type: SourceType::UltimateGuitar,
                behaviour: a,
            }),
            Arc::new(FakeSource {
                source_type: SourceType::MyChords,
                behaviour: b,
            }),
        )
    }

    fn titles(items: &[SearchResultItem]) -> Vec<&str> {
        items.iter().map(|i| i.title.as_str()).collect()
    }

    #[test]
    fn test_interleave_uneven() {
        assert_eq!(interleave(vec!["X1", "X2"], vec!["Y1"]), vec!["X1", "Y1", "X2"]);
        assert_eq!(interleave(vec!["X1"], vec!["Y1", "Y2", "Y3"]), vec!["X1", "Y1", "Y2", "Y3"]);
    }

    #[test]
    fn test_interleave_empty_sides() {
        assert_eq!(interleave(Vec::<u8>::new(), vec![1, 2]), vec![1, 2]);
        assert_eq!(interleave(vec![1, 2], Vec::new()), vec![1, 2]);
        assert!(interleave(Vec::<u8>::new(), Vec::new()).is_empty());
    }

    #[test]
    fn test_interleave_length_and_relative_order() {
        let a: Vec<u32> = (0..5).collect();
        let b: Vec<u32> = (100..103).collect();
        let merged = interleave(a.clone(), b.clone());
        assert_eq!(merged.len(), a.len() + b.len());

        let from_a: Vec<u32> = merged.iter().copied().filter(|v| *v < 100).collect();
        let from_b: Vec<u32> = merged.iter().copied().filter(|v| *v >= 100).collect();
        assert_eq!(from_a, a);
        assert_eq!(from_b, b);
    }

    #[tokio::test]
    async fn test_search_interleaves_sources() {
        let agg = aggregator(
            Behaviour::Returns(vec!["X1", "X2"]),
            Behaviour::Returns(vec!["Y1"]),
        );
        let items = agg.search("q").await;
        assert_eq!(titles(&items), vec!["X1", "Y1", "X2"]);
        assert_eq!(items[1].source_type, SourceType::MyChords);
    }

    #[tokio::test]
    async fn test_failing_source_is_isolated() {
        let agg = aggregator(Behaviour::Fails, Behaviour::Returns(vec!["Y1", "Y2"]));
        assert_eq!(titles(&agg.search("q").await), vec!["Y1", "Y2"]);
    }

    #[tokio::test]
    async fn test_panicking_source_is_isolated() {
        let agg = aggregator(Behaviour::Returns(vec!["X1"]), Behaviour::Panics);
        assert_eq!(titles(&agg.search("q").await), vec!["X1"]);
    }

    #[tokio::test]
    async fn test_both_sources_failing_is_empty() {
        let agg = aggregator(Behaviour::Panics, Behaviour::Fails);
        assert!(agg.search("q").await.is_empty());
    }
}
