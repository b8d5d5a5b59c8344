//! Canned query registry for Crimewatch.
//!
//! Maps human-chosen names to producers of (SQL text, chart-type hint). The
//! registry is populated once at startup via [`QueryRegistry::with_defaults`]
//! and shared read-only for the life of the process.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Advisory chart rendering hint attached to a canned query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
}

impl ChartType {
    /// Returns the chart type as the string the frontend expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
        }
    }
}

/// A zero-argument producer of (SQL text, chart-type hint).
pub type QueryProducer = fn() -> (String, ChartType);

/// Registry of canned analytical queries.
#[derive(Debug, Default)]
pub struct QueryRegistry {
    producers: HashMap<&'static str, QueryProducer>,
}

impl QueryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry populated with the built-in analytical queries.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("monthly_trends", monthly_trends);
        registry.register("common_crime", common_crime);
        registry.register("high_arrest", high_arrest);
        registry.register("peak_hours", peak_hours);
        registry.register("peak_days", peak_days);
        registry.register("hotspots", hotspots);
        registry.register("yoy_crime", yoy_crime);
        registry.register("crime_district", crime_district);
        registry.register("crime_season", crime_season);
        registry.register("crime_slide", crime_slide);
        registry
    }

    /// Registers a producer under the given name.
    ///
    /// Re-registering a name silently overwrites the previous producer; the
    /// last registration wins.
    pub fn register(&mut self, name: &'static str, producer: QueryProducer) {
        self.producers.insert(name, producer);
    }

    /// Looks up a producer by name.
    pub fn lookup(&self, name: &str) -> Option<QueryProducer> {
        self.producers.get(name).copied()
    }

    /// Returns the registered names, sorted for stable display.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.producers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered queries.
    pub fn len(&self) -> usize {
        self.producers.len()
    }

    /// Returns true if no queries are registered.
    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }
}

// The producers below encode the product's analytical surface. Grouping keys,
// ordering, and aggregation expressions are load-bearing; changing them
// changes what the dashboard reports.

/// Monthly crime trends per city.
fn monthly_trends() -> (String, ChartType) {
    let query = r#"
        SELECT
            l.city,
            to_char(date_trunc('month', t.crimetime), 'Month') AS month,
            COUNT(*) AS crime_count
        FROM crime c
        JOIN location l ON c.locationid = l.locationid
        JOIN timeinfo t ON c.timeid = t.timeid
        GROUP BY l.city, to_char(date_trunc('month', t.crimetime), 'Month')
        ORDER BY l.city, month;
    "#;
    (query.to_string(), ChartType::Bar)
}

/// Most common types of crime by city.
fn common_crime() -> (String, ChartType) {
    let query = r#"
        SELECT
            l.city,
            ct.crimedesc,
            COUNT(*) AS count_crimes
        FROM crime c
        JOIN location l ON c.locationid = l.locationid
        JOIN crimetype ct ON c.crimetypeid = ct.crimetypeid
        GROUP BY l.city, ct.crimedesc
        ORDER BY l.city, count_crimes DESC;
    "#;
    (query.to_string(), ChartType::Bar)
}

/// Areas with the highest arrest rate.
fn high_arrest() -> (String, ChartType) {
    let query = r#"
        SELECT
            l.city,
            l.area,
            SUM(CASE WHEN c.arrestmade THEN 1 ELSE 0 END) AS arrests,
            COUNT(*) AS total_crimes,
            ROUND(100.0 * SUM(CASE WHEN c.arrestmade THEN 1 ELSE 0 END) / COUNT(*), 2) AS arrest_rate_percentage
        FROM crime c
        JOIN location l ON c.locationid = l.locationid
        GROUP BY l.city, l.area
        ORDER BY arrest_rate_percentage DESC;
    "#;
    (query.to_string(), ChartType::Bar)
}

/// Incident counts by hour of day.
fn peak_hours() -> (String, ChartType) {
    let query = r#"
        SELECT
            EXTRACT(HOUR FROM t.crimetime) AS hour,
            COUNT(*) AS crime_count
        FROM crime c
        JOIN timeinfo t ON c.timeid = t.timeid
        GROUP BY hour
        ORDER BY hour;
    "#;
    (query.to_string(), ChartType::Bar)
}

/// Incident counts by day of week, busiest first.
fn peak_days() -> (String, ChartType) {
    let query = r#"
        SELECT
            to_char(t.crimetime, 'Day') AS day_of_week,
            COUNT(*) AS crime_count
        FROM crime c
        JOIN timeinfo t ON c.timeid = t.timeid
        GROUP BY day_of_week
        ORDER BY crime_count DESC;
    "#;
    (query.to_string(), ChartType::Bar)
}

/// Top 50 geographical hotspots by incident count.
fn hotspots() -> (String, ChartType) {
    let query = r#"
        SELECT
            l.latitude,
            l.longitude,
            COUNT(*) AS crime_count
        FROM crime c
        JOIN location l ON c.locationid = l.locationid
        GROUP BY l.latitude, l.longitude
        ORDER BY crime_count DESC
        LIMIT 50;
    "#;
    (query.to_string(), ChartType::Bar)
}

/// Year-over-year incident counts with percent change.
///
/// The first year has no prior year: its previous_year_count and
/// percent_change are NULL (NULLIF guards the division).
fn yoy_crime() -> (String, ChartType) {
    let query = r#"
        WITH yearly AS (
            SELECT
              EXTRACT(YEAR FROM t.crimetime) AS year,
              COUNT(*) AS crime_count
            FROM crime c
            JOIN timeinfo t ON c.timeid = t.timeid
            GROUP BY year
            ORDER BY year
          )
          SELECT
              year,
              crime_count,
              LAG(crime_count) OVER (ORDER BY year) AS previous_year_count,
              ROUND(100.0 * (crime_count - LAG(crime_count) OVER (ORDER BY year)) / NULLIF(LAG(crime_count) OVER (ORDER BY year), 0), 2) AS percent_change
          FROM yearly;
    "#;
    (query.to_string(), ChartType::Bar)
}

/// Crime type distribution by city district.
fn crime_district() -> (String, ChartType) {
    let query = r#"
        SELECT
            l.city,
            l.area,
            ct.crimedesc,
            COUNT(*) AS crime_count
        FROM crime c
        JOIN location l ON c.locationid = l.locationid
        JOIN crimetype ct ON c.crimetypeid = ct.crimetypeid
        GROUP BY l.city, l.area, ct.crimedesc
        ORDER BY l.city, l.area, crime_count DESC;
    "#;
    (query.to_string(), ChartType::Bar)
}

/// Seasonal incident counts, ordered Winter, Spring, Summer, Fall.
fn crime_season() -> (String, ChartType) {
    let query = r#"
        SELECT
          season,
          COUNT(*) AS crime_count
        FROM (
          SELECT
            CASE
              WHEN EXTRACT(MONTH FROM t.crimetime) IN (3,4,5) THEN 'Spring'
              WHEN EXTRACT(MONTH FROM t.crimetime) IN (6,7,8) THEN 'Summer'
              WHEN EXTRACT(MONTH FROM t.crimetime) IN (9,10,11) THEN 'Fall'
              WHEN EXTRACT(MONTH FROM t.crimetime) IN (12,1,2) THEN 'Winter'
            END AS season
          FROM crime c
          JOIN timeinfo t ON c.timeid = t.timeid
        ) sub
        GROUP BY season
        ORDER BY
          CASE
            WHEN season = 'Winter' THEN 1
            WHEN season = 'Spring' THEN 2
            WHEN season = 'Summer' THEN 3
            WHEN season = 'Fall' THEN 4
          END;
    "#;
    (query.to_string(), ChartType::Line)
}

/// Trailing 7-day moving average, standard deviation, and z-score of daily
/// incident counts per crime type over the last year.
fn crime_slide() -> (String, ChartType) {
    let query = r#"
        WITH daily_counts AS (
          SELECT
            ct.crimedesc,
            date(t.crimetime) AS crime_date,
            COUNT(*) AS daily_count
          FROM crime c
          JOIN timeinfo t ON c.timeid = t.timeid
          JOIN crimetype ct ON c.crimetypeid = ct.crimetypeid
          WHERE t.crimetime >= current_date - interval '1 year'
          GROUP BY ct.crimedesc, date(t.crimetime)
        ),
        moving_stats AS (
          SELECT
            crimedesc,
            crime_date,
            daily_count,
            AVG(daily_count) OVER (PARTITION BY crimedesc ORDER BY crime_date ROWS BETWEEN 6 PRECEDING AND CURRENT ROW) AS ma_7,
            STDDEV(daily_count) OVER (PARTITION BY crimedesc ORDER BY crime_date ROWS BETWEEN 6 PRECEDING AND CURRENT ROW) AS sd_7
          FROM daily_counts
        )
        SELECT
          crimedesc,
          crime_date,
          daily_count,
          ma_7,
          sd_7,
          ROUND((daily_count - ma_7) / NULLIF(sd_7, 0), 2) AS z_score
        FROM moving_stats
        ORDER BY crimedesc, crime_date;
    "#;
    (query.to_string(), ChartType::Bar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EXPECTED_NAMES: [&str; 10] = [
        "common_crime",
        "crime_district",
        "crime_season",
        "crime_slide",
        "high_arrest",
        "hotspots",
        "monthly_trends",
        "peak_days",
        "peak_hours",
        "yoy_crime",
    ];

    #[test]
    fn test_defaults_register_all_queries() {
        let registry = QueryRegistry::with_defaults();
        assert_eq!(registry.len(), 10);
        assert_eq!(registry.names(), EXPECTED_NAMES.to_vec());
    }

    #[test]
    fn test_lookup_unknown_name() {
        let registry = QueryRegistry::with_defaults();
        assert!(registry.lookup("no_such_query").is_none());
    }

    #[test]
    fn test_producers_are_deterministic() {
        let registry = QueryRegistry::with_defaults();
        for name in EXPECTED_NAMES {
            let producer = registry.lookup(name).unwrap();
            let (sql_a, chart_a) = producer();
            let (sql_b, chart_b) = producer();
            assert_eq!(sql_a, sql_b, "SQL for {name} should be stable");
            assert_eq!(chart_a, chart_b, "chart type for {name} should be stable");
            assert!(!sql_a.trim().is_empty());
        }
    }

    #[test]
    fn test_chart_type_tags() {
        let registry = QueryRegistry::with_defaults();
        for name in EXPECTED_NAMES {
            let (_, chart) = registry.lookup(name).unwrap()();
            // crime_season is the one line chart; everything else is a bar.
            if name == "crime_season" {
                assert_eq!(chart, ChartType::Line);
            } else {
                assert_eq!(chart, ChartType::Bar);
            }
        }
    }

    #[test]
    fn test_monthly_trends_sql_golden() {
        let (sql, chart) = QueryRegistry::with_defaults().lookup("monthly_trends").unwrap()();
        assert_eq!(chart, ChartType::Bar);
        assert!(sql.contains("to_char(date_trunc('month', t.crimetime), 'Month') AS month"));
        assert!(sql.contains("GROUP BY l.city, to_char(date_trunc('month', t.crimetime), 'Month')"));
        assert!(sql.contains("ORDER BY l.city, month"));
    }

    #[test]
    fn test_peak_hours_sql_matches_exactly() {
        let (sql, chart) = QueryRegistry::with_defaults().lookup("peak_hours").unwrap()();
        assert_eq!(chart, ChartType::Bar);
        assert_eq!(
            sql,
            r#"
        SELECT
            EXTRACT(HOUR FROM t.crimetime) AS hour,
            COUNT(*) AS crime_count
        FROM crime c
        JOIN timeinfo t ON c.timeid = t.timeid
        GROUP BY hour
        ORDER BY hour;
    "#
        );
    }

    #[test]
    fn test_crime_season_sql_matches_exactly() {
        let (sql, chart) = QueryRegistry::with_defaults().lookup("crime_season").unwrap()();
        assert_eq!(chart, ChartType::Line);
        assert_eq!(
            sql,
            r#"
        SELECT
          season,
          COUNT(*) AS crime_count
        FROM (
          SELECT
            CASE
              WHEN EXTRACT(MONTH FROM t.crimetime) IN (3,4,5) THEN 'Spring'
              WHEN EXTRACT(MONTH FROM t.crimetime) IN (6,7,8) THEN 'Summer'
              WHEN EXTRACT(MONTH FROM t.crimetime) IN (9,10,11) THEN 'Fall'
              WHEN EXTRACT(MONTH FROM t.crimetime) IN (12,1,2) THEN 'Winter'
            END AS season
          FROM crime c
          JOIN timeinfo t ON c.timeid = t.timeid
        ) sub
        GROUP BY season
        ORDER BY
          CASE
            WHEN season = 'Winter' THEN 1
            WHEN season = 'Spring' THEN 2
            WHEN season = 'Summer' THEN 3
            WHEN season = 'Fall' THEN 4
          END;
    "#
        );
    }

    #[test]
    fn test_high_arrest_rounds_rate_to_two_places() {
        let (sql, _) = QueryRegistry::with_defaults().lookup("high_arrest").unwrap()();
        assert!(sql.contains(
            "ROUND(100.0 * SUM(CASE WHEN c.arrestmade THEN 1 ELSE 0 END) / COUNT(*), 2)"
        ));
        assert!(sql.contains("ORDER BY arrest_rate_percentage DESC"));
    }

    #[test]
    fn test_hotspots_limits_to_top_50() {
        let (sql, _) = QueryRegistry::with_defaults().lookup("hotspots").unwrap()();
        assert!(sql.contains("LIMIT 50"));
        assert!(sql.contains("ORDER BY crime_count DESC"));
    }

    #[test]
    fn test_yoy_division_is_null_safe() {
        let (sql, _) = QueryRegistry::with_defaults().lookup("yoy_crime").unwrap()();
        assert!(sql.contains("LAG(crime_count) OVER (ORDER BY year) AS previous_year_count"));
        assert!(sql.contains("NULLIF(LAG(crime_count) OVER (ORDER BY year), 0)"));
    }

    #[test]
    fn test_season_bucketing_and_ordering() {
        let (sql, chart) = QueryRegistry::with_defaults().lookup("crime_season").unwrap()();
        assert_eq!(chart, ChartType::Line);
        assert!(sql.contains("IN (12,1,2) THEN 'Winter'"));
        assert!(sql.contains("IN (3,4,5) THEN 'Spring'"));
        assert!(sql.contains("IN (6,7,8) THEN 'Summer'"));
        assert!(sql.contains("IN (9,10,11) THEN 'Fall'"));
        // Output order is fixed Winter through Fall, not alphabetical.
        assert!(sql.contains("WHEN season = 'Winter' THEN 1"));
        assert!(sql.contains("WHEN season = 'Fall' THEN 4"));
    }

    #[test]
    fn test_crime_slide_window_and_zscore() {
        let (sql, _) = QueryRegistry::with_defaults().lookup("crime_slide").unwrap()();
        assert!(sql.contains("ROWS BETWEEN 6 PRECEDING AND CURRENT ROW"));
        assert!(sql.contains("t.crimetime >= current_date - interval '1 year'"));
        assert!(sql.contains("ROUND((daily_count - ma_7) / NULLIF(sd_7, 0), 2) AS z_score"));
        assert!(sql.contains("ORDER BY crimedesc, crime_date"));
    }

    #[test]
    fn test_reregistering_overwrites_silently() {
        fn replacement() -> (String, ChartType) {
            ("SELECT 1;".to_string(), ChartType::Line)
        }

        let mut registry = QueryRegistry::with_defaults();
        registry.register("peak_hours", replacement);

        assert_eq!(registry.len(), 10);
        let (sql, chart) = registry.lookup("peak_hours").unwrap()();
        assert_eq!(sql, "SELECT 1;");
        assert_eq!(chart, ChartType::Line);
    }

    #[test]
    fn test_chart_type_as_str() {
        assert_eq!(ChartType::Bar.as_str(), "bar");
        assert_eq!(ChartType::Line.as_str(), "line");
    }
}
