use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::Rng;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::RwLock;

/// Rolling window length in days. The dashboard always shows the last 30
/// days; this is behaviour, not configuration.
pub const HISTORY_DAYS: usize = 30;

/// One daily observation in a series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: i64,
}

/// Wire name of a series' value field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKey {
    Count,
    Amount,
}

impl ValueKey {
    fn point_json(self, p: &SeriesPoint) -> Value {
        let date = p.date.to_string();
        match self {
            Self::Count => json!({ "date": date, "count": p.value }),
            Self::Amount => json!({ "date": date, "amount": p.value }),
        }
    }
}

/// Value bands for one series: a uniform base draw plus an independent
/// uniform jitter draw, summed.
#[derive(Debug, Clone, Copy)]
pub struct SeriesSpec {
    pub name: &'static str,
    pub key: ValueKey,
    pub base: (i64, i64),
    pub jitter: (i64, i64),
}

impl SeriesSpec {
    fn draw(&self, rng: &mut impl Rng) -> i64 {
        rng.gen_range(self.base.0..=self.base.1) + rng.gen_range(self.jitter.0..=self.jitter.1)
    }
}

pub const USERS: SeriesSpec = SeriesSpec {
    name: "users",
    key: ValueKey::Count,
    base: (800, 1200),
    jitter: (-100, 100),
};
pub const SALES: SeriesSpec = SeriesSpec {
    name: "sales",
    key: ValueKey::Amount,
    base: (50, 150),
    jitter: (-20, 20),
};
pub const PAGE_VIEWS: SeriesSpec = SeriesSpec {
    name: "page_views",
    key: ValueKey::Count,
    base: (2000, 5000),
    jitter: (-500, 500),
};
pub const CONVERSIONS: SeriesSpec = SeriesSpec {
    name: "conversions",
    key: ValueKey::Count,
    base: (20, 80),
    jitter: (-10, 10),
};
pub const REVENUE: SeriesSpec = SeriesSpec {
    name: "revenue",
    key: ValueKey::Amount,
    base: (10000, 25000),
    jitter: (-2000, 2000),
};

#[derive(Debug, Clone, Default)]
struct SeriesSet {
    users: Vec<SeriesPoint>,
    sales: Vec<SeriesPoint>,
    page_views: Vec<SeriesPoint>,
    conversions: Vec<SeriesPoint>,
    revenue: Vec<SeriesPoint>,
}

impl SeriesSet {
    fn each_mut(&mut self) -> [(SeriesSpec, &mut Vec<SeriesPoint>); 5] {
        [
            (USERS, &mut self.users),
            (SALES, &mut self.sales),
            (PAGE_VIEWS, &mut self.page_views),
            (CONVERSIONS, &mut self.conversions),
            (REVENUE, &mut self.revenue),
        ]
    }

    fn seed(&mut self, rng: &mut impl Rng, today: NaiveDate) {
        for (spec, points) in self.each_mut() {
            for i in 0..HISTORY_DAYS {
                let date = today - Duration::days((HISTORY_DAYS - 1 - i) as i64);
                points.push(SeriesPoint {
                    date,
                    value: spec.draw(rng),
                });
            }
        }
    }

    fn append_and_trim(&mut self, rng: &mut impl Rng, today: NaiveDate) {
        for (spec, points) in self.each_mut() {
            points.push(SeriesPoint {
                date: today,
                value: spec.draw(rng),
            });
            if points.len() > HISTORY_DAYS {
                let excess = points.len() - HISTORY_DAYS;
                points.drain(..excess);
            }
        }
    }
}

/// Rolling 30-day history for the five dashboard series. Written only by
/// the ticker; read by HTTP and WS handlers via `snapshot()`.
#[derive(Debug)]
pub struct SeriesStore {
    inner: RwLock<SeriesSet>,
}

impl SeriesStore {
    /// Build a store pre-populated with `HISTORY_DAYS` days of history
    /// ending at `today`. Seeding happens here and nowhere else.
    pub fn seeded(today: NaiveDate) -> Self {
        let mut set = SeriesSet::default();
        set.seed(&mut rand::thread_rng(), today);
        Self {
            inner: RwLock::new(set),
        }
    }

    /// Append a point dated `today` to every series, then trim each back
    /// to its newest `HISTORY_DAYS` entries. All five series stay the same
    /// length.
    pub fn append_and_trim(&self, today: NaiveDate) {
        let mut set = self.inner.write().unwrap();
        set.append_and_trim(&mut rand::thread_rng(), today);
    }

    /// Copy the full store out for lock-free serialization.
    pub fn snapshot(&self) -> SeriesSnapshot {
        SeriesSnapshot(self.inner.read().unwrap().clone())
    }
}

/// Point-in-time copy of the store, safe to hand to any reader.
#[derive(Debug, Clone)]
pub struct SeriesSnapshot(SeriesSet);

impl SeriesSnapshot {
    /// The five series in wire order.
    pub fn series(&self) -> [(SeriesSpec, &[SeriesPoint]); 5] {
        [
            (USERS, &self.0.users),
            (SALES, &self.0.sales),
            (PAGE_VIEWS, &self.0.page_views),
            (CONVERSIONS, &self.0.conversions),
            (REVENUE, &self.0.revenue),
        ]
    }

    /// JSON object keyed by series name, each an ordered array of
    /// `{date, count}` or `{date, amount}` points.
    pub fn to_json(&self) -> Value {
        let mut map = serde_json::Map::new();
        for (spec, points) in self.series() {
            let arr = points.iter().map(|p| spec.key.point_json(p)).collect();
            map.insert(spec.name.to_string(), Value::Array(arr));
        }
        Value::Object(map)
    }
}

/// One live metrics tick. Generated fresh per broadcast, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct RealtimeSnapshot {
    pub timestamp: String,
    pub active_users: i64,
    pub current_sales: i64,
    pub page_views_per_minute: i64,
    pub conversion_rate: f64,
    pub revenue_per_hour: i64,
    pub bounce_rate: f64,
    pub avg_session_duration: i64,
}

impl RealtimeSnapshot {
    pub fn sample(rng: &mut impl Rng, now: DateTime<Utc>) -> Self {
        Self {
            timestamp: now.to_rfc3339(),
            active_users: rng.gen_range(150..=300),
            current_sales: rng.gen_range(5..=25),
            page_views_per_minute: rng.gen_range(50..=150),
            conversion_rate: round2(rng.gen_range(2.5..=8.5)),
            revenue_per_hour: rng.gen_range(500..=1500),
            bounce_rate: round2(rng.gen_range(25.0..=45.0)),
            avg_session_duration: rng.gen_range(120..=300),
        }
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
