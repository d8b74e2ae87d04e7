//! Search instrumentation.
//!
//! With the `metrics` feature, counters and histograms are registered on the
//! global OpenTelemetry meter; installing an exporter is left to the
//! application. With the `tracing` feature, searches and store statements
//! run inside spans.

#[cfg(feature = "metrics")]
use once_cell::sync::Lazy;
#[cfg(feature = "metrics")]
use opentelemetry::{
    global,
    metrics::{Counter, Histogram},
};
#[cfg(feature = "metrics")]
use std::time::Duration;

#[cfg(feature = "metrics")]
pub static METRICS: Lazy<SearchMetrics> = Lazy::new(SearchMetrics::init);

#[cfg(feature = "metrics")]
pub struct SearchMetrics {
    pub searches_total: Counter<u64>,
    pub search_duration: Histogram<f64>,
    pub page_size: Histogram<u64>,
    pub count_queries_total: Counter<u64>,
    pub store_queries_total: Counter<u64>,
    pub store_query_duration: Histogram<f64>,
    pub store_errors_total: Counter<u64>,
}

#[cfg(feature = "metrics")]
impl SearchMetrics {
    pub fn init() -> Self {
        let meter = global::meter("pagesearch");

        let searches_total = meter.u64_counter("pagesearch_searches_total")
            .with_description("Total paged searches executed").build();

        let search_duration = meter.f64_histogram("pagesearch_search_duration_seconds")
            .with_description("Duration of paged searches").build();

        let page_size = meter.u64_histogram("pagesearch_page_size")
            .with_description("Records returned per page").build();

        let count_queries_total = meter.u64_counter("pagesearch_count_queries_total")
            .with_description("Total queries issued for the unpaged total").build();

        let store_queries_total = meter.u64_counter("pagesearch_store_queries_total")
            .with_description("Total statements sent to the store").build();

        let store_query_duration = meter.f64_histogram("pagesearch_store_query_duration_seconds")
            .with_description("Duration of store statements").build();

        let store_errors_total = meter.u64_counter("pagesearch_store_errors_total")
            .with_description("Total failed store statements").build();

        Self {
            searches_total,
            search_duration,
            page_size,
            count_queries_total,
            store_queries_total,
            store_query_duration,
            store_errors_total,
        }
    }

    pub fn record_search(&self, elapsed: Duration, items: usize) {
        self.searches_total.add(1, &[]);
        self.search_duration.record(elapsed.as_secs_f64(), &[]);
        self.page_size.record(items as u64, &[]);
    }

    pub fn record_count_query(&self) {
        self.count_queries_total.add(1, &[]);
    }

    pub fn record_store_query(&self, elapsed: Duration) {
        self.store_queries_total.add(1, &[]);
        self.store_query_duration.record(elapsed.as_secs_f64(), &[]);
    }

    pub fn record_store_error(&self) {
        self.store_errors_total.add(1, &[]);
    }
}

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use tracing::Span;

    /// Span around one blocking search execution.
    pub fn execute_search_span(record_type: &str, ordering: &str) -> Span {
        tracing::info_span!("pagesearch.execute", record_type = record_type, ordering = ordering)
    }

    pub fn store_query_span(query: &str) -> Span {
        tracing::debug_span!("pagesearch.store_query", db.statement = query)
    }
}
