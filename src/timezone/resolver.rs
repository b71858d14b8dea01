use super::{
    catalog::{SystemCatalog, TimezoneCatalog},
    clock::{Clock, SystemClock},
    matching::search_by_city,
    resolution::{ResolveError, Resolution},
};
use jiff::tz::TimeZone;
use std::sync::Arc;
use tracing::{debug, warn};

/// Upper bound on candidates returned for an ambiguous query
pub const MAX_CANDIDATES: usize = 10;

const REPORT_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z%z";

/// Maps a city name or IANA identifier to a time zone and reports the current
/// local time there.
#[derive(Debug, Clone)]
pub struct TimezoneResolver {
    catalog: Arc<dyn TimezoneCatalog>,
    clock: Arc<dyn Clock>,
}

impl TimezoneResolver {
    pub fn new(catalog: Arc<dyn TimezoneCatalog>, clock: Arc<dyn Clock>) -> Self {
        Self { catalog, clock }
    }

    /// Resolver over the host tz database and wall clock.
    pub fn system() -> Self {
        Self::new(SystemCatalog::shared(), Arc::new(SystemClock))
    }

    pub fn catalog(&self) -> &dyn TimezoneCatalog {
        self.catalog.as_ref()
    }

    /// Resolve `query` and report the current time in the matching zone.
    ///
    /// A query containing `/` is first tried as an IANA identifier. If that
    /// lookup fails the same string goes through city-name matching, which in
    /// practice rarely finds anything for slash-containing input.
    pub fn resolve_time(&self, query: &str) -> Resolution {
        if query.is_empty() {
            return ResolveError::InvalidInput.into();
        }

        if query.contains('/') {
            match self.catalog.get(query) {
                Ok(tz) => {
                    debug!(target: "weather_time_agent::timezone", query, "Resolved IANA identifier directly");
                    return self.report(query, query, tz);
                }
                Err(err) => {
                    debug!(target: "weather_time_agent::timezone", query, error = %err, "Direct lookup failed, falling back to city search");
                }
            }
        }

        let mut candidates = self.search(query);
        match candidates.len() {
            0 => {
                debug!(target: "weather_time_agent::timezone", query, "No time zone matched");
                ResolveError::Unresolvable {
                    query: query.to_string(),
                }
                .into()
            }
            1 => {
                let tz_name = candidates.remove(0);
                match self.catalog.get(&tz_name) {
                    Ok(tz) => self.report(query, &tz_name, tz),
                    Err(err) => {
                        warn!(target: "weather_time_agent::timezone", query, timezone = %tz_name, error = %err, "Catalog entry could not be constructed");
                        ResolveError::Construction {
                            query: query.to_string(),
                            timezone: tz_name,
                            reason: err.to_string(),
                        }
                        .into()
                    }
                }
            }
            count => {
                candidates.sort();
                candidates.truncate(MAX_CANDIDATES);
                debug!(target: "weather_time_agent::timezone", query, count, "Query is ambiguous");
                Resolution::Ambiguous {
                    query: query.to_string(),
                    candidates,
                }
            }
        }
    }

    /// Catalog identifiers matching a city name, unsorted and uncapped.
    pub fn search(&self, city: &str) -> Vec<String> {
        search_by_city(self.catalog.names(), city)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn report(&self, query: &str, timezone: &str, tz: TimeZone) -> Resolution {
        let local_time = self.clock.now().to_zoned(tz);
        let report = format!(
            "The current time in {} is {}",
            query,
            local_time.strftime(REPORT_FORMAT)
        );
        Resolution::Resolved {
            timezone: timezone.to_string(),
            report,
            local_time,
        }
    }
}
