//! Query cache in front of a canned warehouse.

mod common;

use chrono::NaiveDate;
use common::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tradewarehouse::adapters::query_cache::{CachedWarehouse, Clock, DEFAULT_TTL};
use tradewarehouse::domain::dashboards;
use tradewarehouse::domain::query::QueryParams;
use tradewarehouse::domain::sql;
use tradewarehouse::domain::view::{Selection, View};
use tradewarehouse::ports::warehouse_port::WarehousePort;

#[derive(Clone)]
struct ManualClock {
    base: Instant,
    elapsed_ms: Arc<AtomicU64>,
}

impl ManualClock {
    fn new() -> Self {
        Self {
            base: Instant::now(),
            elapsed_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    fn advance(&self, by: Duration) {
        self.elapsed_ms
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_millis(self.elapsed_ms.load(Ordering::SeqCst))
    }
}

fn cached(port: MockWarehouse) -> (CachedWarehouse<MockWarehouse, ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    (
        CachedWarehouse::with_clock(port, DEFAULT_TTL, clock.clone()),
        clock,
    )
}

#[test]
fn repeat_inside_window_skips_round_trip() {
    let (cache, clock) = cached(
        MockWarehouse::new().with_table(sql::TOTAL_TRADES, scalar("count", int(10))),
    );
    let first = cache.query(sql::TOTAL_TRADES, &QueryParams::new()).unwrap();
    clock.advance(Duration::from_secs(299));
    let second = cache.query(sql::TOTAL_TRADES, &QueryParams::new()).unwrap();
    assert_eq!(first, second);
    assert_eq!(cache.inner().call_count(), 1);
}

#[test]
fn window_elapsing_forces_round_trip() {
    let (cache, clock) = cached(MockWarehouse::new());
    cache.query(sql::TOTAL_TRADES, &QueryParams::new()).unwrap();
    clock.advance(DEFAULT_TTL);
    cache.query(sql::TOTAL_TRADES, &QueryParams::new()).unwrap();
    assert_eq!(cache.inner().call_count(), 2);
}

#[test]
fn bound_parameters_are_part_of_the_key() {
    let (cache, _clock) = cached(MockWarehouse::new());
    let since = |d: &str| {
        QueryParams::new().with_date("since", NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap())
    };
    cache.query(sql::DAILY_ACTIVITY, &since("2024-05-01")).unwrap();
    cache.query(sql::DAILY_ACTIVITY, &since("2024-05-02")).unwrap();
    cache.query(sql::DAILY_ACTIVITY, &since("2024-05-01")).unwrap();
    assert_eq!(cache.inner().call_count(), 2);
}

#[test]
fn failures_retry_on_next_request() {
    let (cache, _clock) = cached(MockWarehouse::failing("too many connections"));
    assert!(cache.query(sql::TOTAL_TRADES, &QueryParams::new()).is_err());
    assert!(cache.query(sql::TOTAL_TRADES, &QueryParams::new()).is_err());
    assert_eq!(cache.inner().call_count(), 2);
    assert!(cache.is_empty());
}

#[test]
fn second_render_is_served_from_memory() {
    let (cache, clock) = cached(MockWarehouse::new());
    let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
    let sel = Selection::default();

    dashboards::build(View::Overview, &cache, &sel, today);
    let after_first = cache.inner().call_count();
    assert_eq!(after_first, 6);

    dashboards::build(View::Overview, &cache, &sel, today);
    assert_eq!(cache.inner().call_count(), after_first);

    clock.advance(Duration::from_secs(301));
    dashboards::build(View::Overview, &cache, &sel, today);
    assert_eq!(cache.inner().call_count(), after_first * 2);
}
