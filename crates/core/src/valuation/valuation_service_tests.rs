#[cfg(test)]
mod tests {
    use crate::cache::{CacheBackend, CacheError, InMemoryCacheStore, QueryFingerprint, ResultCache};
    use crate::errors::{DatabaseError, Error, Result};
    use crate::valuation::{
        EstimateOutcome, EstimationResult, PriceEstimator, ValuationConfig, ValuationError,
        ValuationService, ValuationServiceTrait,
    };
    use crate::vehicles::{
        ComparableFilter, EstimateQuery, ListingRepositoryTrait, ListingRow, NewListing,
        VehicleRecord,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    // --- Mock ListingRepository ---
    #[derive(Default)]
    struct MockListingRepository {
        rows: Mutex<Vec<ListingRow>>,
        fetch_calls: AtomicUsize,
        fail: bool,
    }

    impl MockListingRepository {
        fn with_rows(rows: Vec<ListingRow>) -> Self {
            Self {
                rows: Mutex::new(rows),
                ..Default::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn fetch_calls(&self) -> usize {
            self.fetch_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ListingRepositoryTrait for MockListingRepository {
        fn find_comparables(
            &self,
            make: &str,
            model: &str,
            _filter: &ComparableFilter,
        ) -> Result<Vec<ListingRow>> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::Database(DatabaseError::ConnectionFailed(
                    "database is locked".to_string(),
                )));
            }
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|r| r.make == make && r.model == model)
                .cloned()
                .collect())
        }

        async fn insert_listings(&self, _listings: Vec<NewListing>) -> Result<usize> {
            unimplemented!()
        }

        fn count_listings(&self) -> Result<i64> {
            Ok(self.rows.lock().unwrap().len() as i64)
        }
    }

    // --- Mock cache backend that is always down ---
    struct UnavailableCache;

    #[async_trait]
    impl CacheBackend for UnavailableCache {
        async fn get(&self, _key: &str) -> std::result::Result<Option<Vec<u8>>, CacheError> {
            Err(CacheError::Unavailable("redis timeout".to_string()))
        }

        async fn set(&self, _key: &str, _value: Vec<u8>) -> std::result::Result<(), CacheError> {
            Err(CacheError::Unavailable("redis timeout".to_string()))
        }
    }

    // --- Helpers ---

    fn row(year: &str, mileage: &str, price: &str) -> ListingRow {
        ListingRow {
            year: Some(year.to_string()),
            make: "Subaru".to_string(),
            mileage: Some(mileage.to_string()),
            model: "Outback".to_string(),
            price: Some(price.to_string()),
            location: Some("Boise, ID".to_string()),
        }
    }

    fn scenario_rows() -> Vec<ListingRow> {
        vec![
            row("2018", "30000", "20000"),
            row("2019", "25000", "22000"),
            row("2017", "40000", "18000"),
            row("2020", "15000", "25000"),
            row("2016", "50000", "16000"),
        ]
    }

    /// Deterministic listings with a known linear price relation.
    fn synthetic_rows(count: usize) -> Vec<ListingRow> {
        (0..count)
            .map(|i| {
                let year = 2005 + (i % 15) as i64;
                let mileage = 5000 + ((i * 7919) % 140000) as i64;
                let price = 30000 - mileage / 10 + 900 * (year - 2005) + 11 * i as i64;
                row(&year.to_string(), &mileage.to_string(), &price.to_string())
            })
            .collect()
    }

    fn query(mileage: f64, year: f64) -> EstimateQuery {
        EstimateQuery::new("Subaru", "Outback", mileage, year).unwrap()
    }

    fn service(
        repository: Arc<MockListingRepository>,
        store: Arc<dyn CacheBackend>,
        min_records: usize,
    ) -> ValuationService {
        ValuationService::new(
            repository,
            ResultCache::new(store),
            ValuationConfig::with_min_records(min_records).unwrap(),
        )
    }

    fn expect_estimate(outcome: EstimateOutcome) -> EstimationResult {
        match outcome {
            EstimateOutcome::Estimated(result) => result,
            other => panic!("expected an estimate, got {:?}", other),
        }
    }

    // --- Tests ---

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let repository = Arc::new(MockListingRepository::with_rows(scenario_rows()));
        let svc = service(repository, Arc::new(InMemoryCacheStore::new()), 5);

        let result = expect_estimate(svc.get_estimate(&query(28000.0, 2019.0)).await.unwrap());

        assert!(
            (18000.0..=25000.0).contains(&result.estimate),
            "estimate {} outside observed range",
            result.estimate
        );
        assert!((result.estimate - 21520.4156).abs() < 1e-3);
        let expected: Vec<VehicleRecord> =
            scenario_rows().into_iter().map(VehicleRecord::from).collect();
        assert_eq!(result.comparables, expected);
    }

    #[tokio::test]
    async fn test_repeated_query_is_served_from_cache() {
        let repository = Arc::new(MockListingRepository::with_rows(scenario_rows()));
        let store = Arc::new(InMemoryCacheStore::new());
        let svc = service(repository.clone(), store.clone(), 5);

        let first = expect_estimate(svc.get_estimate(&query(28000.0, 2019.0)).await.unwrap());
        let second = expect_estimate(svc.get_estimate(&query(28000.0, 2019.0)).await.unwrap());

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
        assert_eq!(repository.fetch_calls(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_retrieval_entirely() {
        let repository = Arc::new(MockListingRepository::default());
        let store = Arc::new(InMemoryCacheStore::new());
        let cache = ResultCache::new(store.clone());
        let q = query(1000.0, 2021.0);
        let seeded = EstimationResult {
            estimate: 31337.5,
            comparables: vec![],
        };
        cache.put(&QueryFingerprint::compute(&q), &seeded).await;

        let svc = ValuationService::new(
            repository.clone(),
            cache,
            ValuationConfig::with_min_records(5).unwrap(),
        );

        let result = expect_estimate(svc.get_estimate(&q).await.unwrap());
        assert_eq!(result, seeded);
        assert_eq!(repository.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn test_one_below_threshold_is_insufficient_and_not_cached() {
        let mut rows = scenario_rows();
        rows.pop();
        let repository = Arc::new(MockListingRepository::with_rows(rows));
        let store = Arc::new(InMemoryCacheStore::new());
        let svc = service(repository.clone(), store.clone(), 5);

        let outcome = svc.get_estimate(&query(28000.0, 2019.0)).await.unwrap();

        assert_eq!(
            outcome,
            EstimateOutcome::InsufficientData {
                found: 4,
                required: 5
            }
        );
        assert!(store.is_empty());

        // Nothing cached, so a retry goes back to the store.
        svc.get_estimate(&query(28000.0, 2019.0)).await.unwrap();
        assert_eq!(repository.fetch_calls(), 2);
    }

    #[tokio::test]
    async fn test_exactly_threshold_records_produces_estimate() {
        let repository = Arc::new(MockListingRepository::with_rows(scenario_rows()));
        let svc = service(repository, Arc::new(InMemoryCacheStore::new()), 5);

        let outcome = svc.get_estimate(&query(28000.0, 2019.0)).await.unwrap();

        let result = expect_estimate(outcome);
        assert!(result.estimate.is_finite());
    }

    #[tokio::test]
    async fn test_returned_comparables_are_capped_but_fit_uses_all_records() {
        let rows = synthetic_rows(250);
        let repository = Arc::new(MockListingRepository::with_rows(rows.clone()));
        let svc = service(repository, Arc::new(InMemoryCacheStore::new()), 5);

        // A far-off year trips the plausibility guard, exposing the mean price.
        let result = expect_estimate(svc.get_estimate(&query(60000.0, 1950.0)).await.unwrap());

        assert_eq!(result.comparables.len(), 100);
        let records: Vec<VehicleRecord> = rows.into_iter().map(VehicleRecord::from).collect();
        assert_eq!(result.comparables, records[..100].to_vec());

        let full = PriceEstimator::default()
            .estimate(&records, 1950.0, 60000.0)
            .unwrap();
        let capped = PriceEstimator::default()
            .estimate(&records[..100], 1950.0, 60000.0)
            .unwrap();

        let mean_all =
            records.iter().filter_map(|r| r.price).sum::<f64>() / records.len() as f64;
        let mean_first_100 = records[..100].iter().filter_map(|r| r.price).sum::<f64>() / 100.0;

        assert_eq!(result.estimate, full.value);
        assert_eq!(result.estimate, mean_all);
        assert_ne!(result.estimate, capped.value);
        assert_ne!(result.estimate, mean_first_100);
    }

    #[tokio::test]
    async fn test_store_failure_is_distinct_from_insufficient_data() {
        let repository = Arc::new(MockListingRepository::failing());
        let store = Arc::new(InMemoryCacheStore::new());
        let svc = service(repository, store.clone(), 5);

        let err = svc.get_estimate(&query(28000.0, 2019.0)).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Valuation(ValuationError::StoreUnavailable(_))
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_imputation_failure_is_surfaced_and_not_cached() {
        let rows: Vec<ListingRow> = scenario_rows()
            .into_iter()
            .map(|mut r| {
                r.mileage = Some(String::new());
                r
            })
            .collect();
        let repository = Arc::new(MockListingRepository::with_rows(rows));
        let store = Arc::new(InMemoryCacheStore::new());
        let svc = service(repository, store.clone(), 5);

        let err = svc.get_estimate(&query(28000.0, 2019.0)).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Valuation(ValuationError::ImputationFailure { column: "mileage" })
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_cache_does_not_fail_estimation() {
        let repository = Arc::new(MockListingRepository::with_rows(scenario_rows()));
        let svc = service(repository.clone(), Arc::new(UnavailableCache), 5);

        let first = expect_estimate(svc.get_estimate(&query(28000.0, 2019.0)).await.unwrap());
        let second = expect_estimate(svc.get_estimate(&query(28000.0, 2019.0)).await.unwrap());

        assert_eq!(first, second);
        assert_eq!(repository.fetch_calls(), 2);
    }

    #[tokio::test]
    async fn test_other_models_are_not_comparables() {
        let mut rows = scenario_rows();
        rows.push(ListingRow {
            model: "Forester".to_string(),
            ..row("2020", "1000", "90000")
        });
        let repository = Arc::new(MockListingRepository::with_rows(rows));
        let svc = service(repository, Arc::new(InMemoryCacheStore::new()), 5);

        let result = expect_estimate(svc.get_estimate(&query(28000.0, 2019.0)).await.unwrap());
        assert_eq!(result.comparables.len(), 5);
        assert!(result.comparables.iter().all(|r| r.model == "Outback"));
    }
}
