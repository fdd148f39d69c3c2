use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Days, NaiveDate, Weekday};
use futures::future::join_all;
use ulid::Ulid;

use crewcal::engine::{Engine, resolve_availability};
use crewcal::model::*;
use crewcal::store::{MemoryStore, ScheduleStore};

const WORKERS: usize = 500;
const DAYS: u64 = 30;
const JOBS_PER_WORKER_DAY: u32 = 4;
const QUERIES: usize = 500;

/// Nearest-rank summary of one batch of timings.
struct Latencies {
    sorted: Vec<Duration>,
}

impl Latencies {
    fn new(mut samples: Vec<Duration>) -> Self {
        samples.sort_unstable();
        Self { sorted: samples }
    }

    fn rank(&self, pct: usize) -> Duration {
        match self.sorted.len() {
            0 => Duration::ZERO,
            n => self.sorted[((n * pct).div_ceil(100)).clamp(1, n) - 1],
        }
    }

    fn mean(&self) -> Duration {
        let n = self.sorted.len().max(1) as u32;
        self.sorted.iter().sum::<Duration>() / n
    }

    fn report(&self, label: &str) {
        let ms = |d: Duration| d.as_micros() as f64 / 1000.0;
        println!(
            "  {label}: n={} mean={:.3}ms p50={:.3}ms p95={:.3}ms p99={:.3}ms worst={:.3}ms",
            self.sorted.len(),
            ms(self.mean()),
            ms(self.rank(50)),
            ms(self.rank(95)),
            ms(self.rank(99)),
            ms(self.rank(100)),
        );
    }
}

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

fn time(minutes: u32) -> TimeOfDay {
    TimeOfDay::from_minutes(minutes as u64)
}

fn setup() -> MemoryStore {
    let store = MemoryStore::new(DurationConfig::default());
    let weekdays = [Weekday::Sun, Weekday::Sat, Weekday::Wed];
    for i in 0..WORKERS {
        let worker = Worker {
            id: Ulid::new(),
            name: format!("worker-{i:04}"),
            active: i % 10 != 0,
        };
        store.upsert_worker(worker.clone());
        store
            .add_block(AvailabilityBlock::recurring(worker.id, weekdays[i % weekdays.len()]))
            .unwrap();
        if i % 7 == 0 {
            let off = base_date().checked_add_days(Days::new(i as u64 % DAYS)).unwrap();
            store
                .add_block(AvailabilityBlock::one_off(worker.id, off, Some("PTO".into())))
                .unwrap();
        }
        for d in 0..DAYS {
            let date = base_date().checked_add_days(Days::new(d)).unwrap();
            for j in 0..JOBS_PER_WORKER_DAY {
                let start = 7 * 60 + j * 150 + (i as u32 % 4) * 15;
                store.upsert_job(ScheduledJob {
                    id: Ulid::new(),
                    job_number: format!("{i}-{d}-{j}"),
                    worker_id: Some(worker.id),
                    date,
                    start_time: Some(time(start)),
                    end_time: Some(time(start + 120)),
                });
            }
        }
    }
    store
}

fn query(n: usize) -> AvailabilityQuery {
    let date = base_date().checked_add_days(Days::new(n as u64 % DAYS)).unwrap();
    let start = 7 * 60 + (n as u32 % 40) * 15;
    AvailabilityQuery::on(date).between(time(start), time(start + 90))
}

#[tokio::main]
async fn main() {
    println!("crewcal stress: {WORKERS} workers, {DAYS} days, {JOBS_PER_WORKER_DAY} jobs/worker/day");

    let setup_start = Instant::now();
    let engine = Arc::new(Engine::new(Arc::new(setup())));
    println!("  setup: {:.1}ms", setup_start.elapsed().as_secs_f64() * 1000.0);

    // Pure resolver over a pre-fetched day.
    let store = engine.store();
    let workers = store.active_workers().await.unwrap();
    let ids: Vec<Ulid> = workers.iter().map(|w| w.id).collect();
    let blocks = store.blocks_for(&ids).await.unwrap();
    let jobs = store.jobs_on(base_date(), &ids).await.unwrap();
    let mut pure = Vec::with_capacity(QUERIES);
    let mut available = 0usize;
    for n in 0..QUERIES {
        let mut q = query(n);
        q.date = base_date();
        let started = Instant::now();
        let result = resolve_availability(&q, &workers, &blocks, &jobs);
        pure.push(started.elapsed());
        available += result.available.len();
    }
    Latencies::new(pure).report("resolve (in-memory snapshot)");
    println!("    avg available per query: {}", available / QUERIES);

    // Full engine path, concurrent callers.
    let wall = Instant::now();
    let tasks = (0..QUERIES).map(|n| {
        let engine = engine.clone();
        async move {
            let started = Instant::now();
            engine.availability(&query(n)).await.unwrap();
            started.elapsed()
        }
    });
    let engine_latencies = join_all(tasks).await;
    let elapsed = wall.elapsed();
    Latencies::new(engine_latencies).report("engine.availability (concurrent)");
    println!(
        "    throughput: {:.0} queries/s",
        QUERIES as f64 / elapsed.as_secs_f64()
    );
}
