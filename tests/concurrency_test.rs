use poimap::generator::{Region, generate};
use poimap::{BoundingBox, ClusterCache, Config, GeoPoint, PoiError, PoiService, PointStore, compute};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn store(count: usize) -> PointStore {
    PointStore::from_points(generate(count, &Region::ALL, &mut StdRng::seed_from_u64(11)))
}

/// N concurrent callers against a cold cache trigger exactly one computation.
#[test]
fn test_cold_cache_single_flight() {
    for callers in [2, 8, 32] {
        let cache = Arc::new(ClusterCache::<Vec<GeoPoint>>::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(callers));
        let points = Arc::new(store(2_000));

        let handles: Vec<_> = (0..callers)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                let barrier = Arc::clone(&barrier);
                let points = Arc::clone(&points);
                thread::spawn(move || {
                    barrier.wait();
                    cache.get_or_compute(|| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        let mut rng = StdRng::seed_from_u64(1);
                        compute::cluster(points.all(), 20, 5, &mut rng).unwrap()
                    })
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(calls.load(Ordering::SeqCst), 1, "{} callers", callers);
        assert!(results.iter().all(|r| **r == *results[0]));
    }
}

/// Readers of the store never block each other and see identical results.
#[test]
fn test_parallel_bbox_queries() {
    let service = Arc::new(PoiService::new(store(20_000), Config::default()).unwrap());
    let bbox = BoundingBox::new(-128.0, 14.0, -70.0, 62.0);
    let expected = service.fetch_within(&bbox).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            let expected = expected.clone();
            thread::spawn(move || {
                for _ in 0..10 {
                    assert_eq!(service.fetch_within(&bbox).unwrap().len(), expected.len());
                }
                service.fetch_within(&bbox).unwrap()
            })
        })
        .collect();

    for h in handles {
        assert_eq!(h.join().unwrap(), expected);
    }
}

/// Mixed zoom levels hitting the service at once share one cluster run.
#[test]
fn test_mixed_zoom_requests() {
    let config = Config::default().with_cluster_count(30).with_seed(4);
    let service = Arc::new(PoiService::new(store(5_000), config).unwrap());
    let barrier = Arc::new(Barrier::new(12));

    let handles: Vec<_> = (0..12)
        .map(|i| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let zoom = if i % 2 == 0 { "4" } else { "12" };
                service.fetch_view_str("-20,-40,60,70", zoom).unwrap()
            })
        })
        .collect();

    let views: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let clustered: Vec<_> = views.iter().filter(|v| v.is_clusters()).collect();
    assert_eq!(clustered.len(), 6);
    assert!(clustered.iter().all(|v| v.len() == 30));
    assert_eq!(service.stats().cluster_computations, 1);
}

/// A bounded wait surfaces as a request-scoped timeout, not a hang.
#[test]
fn test_cluster_wait_timeout_is_request_scoped() {
    let config = Config::default()
        .with_cluster_count(200)
        .with_max_iterations(10)
        .with_seed(5)
        .with_cluster_wait_timeout(Duration::from_millis(1));
    let service = Arc::new(PoiService::new(store(20_000), config).unwrap());
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                service.fetch_clusters()
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for result in &results {
        match result {
            Ok(view) => assert_eq!(view.len(), 200),
            Err(err) => assert!(matches!(err, PoiError::ClusterTimeout { .. })),
        }
    }
    assert!(results.iter().any(|r| r.is_ok()));

    // Once filled, nobody waits.
    assert_eq!(service.fetch_clusters().unwrap().len(), 200);
    assert_eq!(service.stats().cluster_computations, 1);
}
