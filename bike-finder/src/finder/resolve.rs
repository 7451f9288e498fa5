//! Nearest-station resolution.
//!
//! Drives the permission gate, fetches the catalog and availability
//! concurrently, and ranks the result.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::bikes::{BikeApiError, BikeClient};
use crate::domain::{Availability, Coordinate, RankedStation, Station};
use crate::permission::{PermissionGate, PermissionState, PermissionStore, StoreError};

use super::rank::rank_stations;

/// Error from resolving the nearest station.
///
/// Every variant is terminal for the request; none is retried here.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A bike API request failed (network error or non-success status)
    #[error("failed to fetch bike data")]
    Fetch(#[source] BikeApiError),

    /// A bike API response did not match the expected schema
    #[error("unexpected bike API response")]
    Parse(#[source] BikeApiError),

    /// The user has not granted access to their device location
    #[error("location permission not granted")]
    PermissionDenied,

    /// No station currently has a bike available
    #[error("no station with available bikes")]
    NoAvailableStation,

    /// The permission store could not be read
    #[error("permission lookup failed")]
    PermissionStore(#[from] StoreError),
}

impl From<BikeApiError> for ResolveError {
    fn from(e: BikeApiError) -> Self {
        if e.is_parse() {
            ResolveError::Parse(e)
        } else {
            ResolveError::Fetch(e)
        }
    }
}

/// Request to find the nearest station with bikes.
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    /// Identity used to look up the permission grant.
    pub user_id: String,

    /// Precise device position, present only when the device confirmed
    /// that the user granted location access.
    pub device_location: Option<Coordinate>,
}

impl ResolveRequest {
    /// Create a new resolve request.
    pub fn new(user_id: impl Into<String>, device_location: Option<Coordinate>) -> Self {
        Self {
            user_id: user_id.into(),
            device_location,
        }
    }
}

/// Trait for providing station and availability data.
///
/// This abstraction allows the finder to be tested with mock data.
pub trait BikeSource {
    /// Fetch the full station catalog.
    fn fetch_stations(&self) -> impl Future<Output = Result<Vec<Station>, BikeApiError>> + Send;

    /// Fetch current bike counts per station.
    fn fetch_availability(
        &self,
    ) -> impl Future<Output = Result<Availability, BikeApiError>> + Send;
}

impl BikeSource for BikeClient {
    fn fetch_stations(&self) -> impl Future<Output = Result<Vec<Station>, BikeApiError>> + Send {
        BikeClient::fetch_stations(self)
    }

    fn fetch_availability(
        &self,
    ) -> impl Future<Output = Result<Availability, BikeApiError>> + Send {
        BikeClient::fetch_availability(self)
    }
}

impl<B: BikeSource + Sync> BikeSource for Arc<B> {
    fn fetch_stations(&self) -> impl Future<Output = Result<Vec<Station>, BikeApiError>> + Send {
        self.as_ref().fetch_stations()
    }

    fn fetch_availability(
        &self,
    ) -> impl Future<Output = Result<Availability, BikeApiError>> + Send {
        self.as_ref().fetch_availability()
    }
}

/// Resolves the nearest station with an available bike.
///
/// Holds no per-request state; one finder serves any number of concurrent
/// requests.
#[derive(Debug, Clone)]
pub struct Finder<B, P> {
    bikes: B,
    permissions: P,
}

impl<B: BikeSource, P: PermissionStore> Finder<B, P> {
    /// Create a new finder.
    pub fn new(bikes: B, permissions: P) -> Self {
        Self { bikes, permissions }
    }

    /// Consult the permission gate for `user_id` without resolving.
    pub async fn permission(&self, user_id: &str) -> Result<PermissionState, ResolveError> {
        let mut gate = PermissionGate::new(&self.permissions, user_id);
        Ok(gate.resolve().await?)
    }

    /// Find the nearest station with at least one bike.
    pub async fn resolve(&self, request: &ResolveRequest) -> Result<RankedStation, ResolveError> {
        let state = self.permission(&request.user_id).await?;
        self.resolve_for(state, request).await
    }

    /// Like [`Finder::resolve`], for a caller that has already consulted the
    /// gate. The store is not read again.
    pub async fn resolve_for(
        &self,
        state: PermissionState,
        request: &ResolveRequest,
    ) -> Result<RankedStation, ResolveError> {
        let nearest = self
            .rank_for(state, request)
            .await?
            .into_iter()
            .next()
            .ok_or(ResolveError::NoAvailableStation)?;

        info!(
            station_id = %nearest.id,
            distance_m = nearest.distance_meters,
            bikes = nearest.bikes_available,
            "Resolved nearest station"
        );
        Ok(nearest)
    }

    /// All stations with bikes, nearest first.
    ///
    /// An empty list means nothing is available; it is not an error here.
    pub async fn resolve_ranked(
        &self,
        request: &ResolveRequest,
    ) -> Result<Vec<RankedStation>, ResolveError> {
        let state = self.permission(&request.user_id).await?;
        self.rank_for(state, request).await
    }

    async fn rank_for(
        &self,
        state: PermissionState,
        request: &ResolveRequest,
    ) -> Result<Vec<RankedStation>, ResolveError> {
        let user = authorize(state, request)?;
        let (stations, availability) = self.fetch_all().await?;

        let catalog_size = stations.len();
        let ranked = rank_stations(stations, &availability, &user);

        debug!(
            catalog_size,
            reported = availability.len(),
            with_bikes = ranked.len(),
            "Ranked stations"
        );
        Ok(ranked)
    }

    /// Fetch catalog and availability concurrently.
    ///
    /// Both requests run to completion before either result is inspected.
    /// If both fail, the catalog error is reported.
    async fn fetch_all(&self) -> Result<(Vec<Station>, Availability), ResolveError> {
        let (stations, availability) = tokio::join!(
            self.bikes.fetch_stations(),
            self.bikes.fetch_availability()
        );

        let stations = stations.inspect_err(|e| warn!(error = %e, "Station catalog fetch failed"))?;
        let availability =
            availability.inspect_err(|e| warn!(error = %e, "Availability fetch failed"))?;

        Ok((stations, availability))
    }
}

/// Position to rank from, given the gate's decision.
fn authorize(state: PermissionState, request: &ResolveRequest) -> Result<Coordinate, ResolveError> {
    match state {
        PermissionState::Granted => request.device_location.ok_or_else(|| {
            debug!("Permission on record but device sent no location");
            ResolveError::PermissionDenied
        }),
        state => {
            debug!(%state, "Location permission missing");
            Err(ResolveError::PermissionDenied)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::InMemoryPermissionStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// How a fake fetch ends.
    #[derive(Clone, Copy)]
    enum Outcome {
        Succeed,
        ServerError,
        Malformed,
    }

    impl Outcome {
        fn into_result<T>(self, value: T) -> Result<T, BikeApiError> {
            match self {
                Outcome::Succeed => Ok(value),
                Outcome::ServerError => Err(BikeApiError::Api {
                    status: 503,
                    message: "unavailable".into(),
                }),
                Outcome::Malformed => Err(BikeApiError::Json {
                    message: "missing field `stations`".into(),
                }),
            }
        }
    }

    /// Mock bike source with per-endpoint outcomes and delays.
    struct MockBikes {
        stations: Vec<Station>,
        availability: Availability,
        stations_outcome: Outcome,
        availability_outcome: Outcome,
        stations_delay: Duration,
        availability_delay: Duration,
        stations_calls: AtomicUsize,
        availability_calls: AtomicUsize,
        completed: AtomicUsize,
    }

    impl MockBikes {
        fn new(stations: Vec<Station>, availability: Availability) -> Self {
            Self {
                stations,
                availability,
                stations_outcome: Outcome::Succeed,
                availability_outcome: Outcome::Succeed,
                stations_delay: Duration::ZERO,
                availability_delay: Duration::ZERO,
                stations_calls: AtomicUsize::new(0),
                availability_calls: AtomicUsize::new(0),
                completed: AtomicUsize::new(0),
            }
        }

        fn oslo() -> Self {
            Self::new(
                vec![
                    Station::new("A", "Alpha", Coordinate::new(59.91, 10.75)),
                    Station::new("B", "Beta", Coordinate::new(59.94, 10.72)),
                ],
                [("A", 0), ("B", 3)].into_iter().collect(),
            )
        }

        fn network_calls(&self) -> usize {
            self.stations_calls.load(Ordering::SeqCst) + self.availability_calls.load(Ordering::SeqCst)
        }
    }

    impl BikeSource for MockBikes {
        async fn fetch_stations(&self) -> Result<Vec<Station>, BikeApiError> {
            self.stations_calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.stations_delay).await;
            self.completed.fetch_add(1, Ordering::SeqCst);
            self.stations_outcome.into_result(self.stations.clone())
        }

        async fn fetch_availability(&self) -> Result<Availability, BikeApiError> {
            self.availability_calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.availability_delay).await;
            self.completed.fetch_add(1, Ordering::SeqCst);
            self.availability_outcome.into_result(self.availability.clone())
        }
    }

    fn user() -> Coordinate {
        Coordinate::new(59.938893, 10.722658)
    }

    async fn granted_store() -> InMemoryPermissionStore {
        let store = InMemoryPermissionStore::new();
        store.set("user-1", true).await;
        store
    }

    fn request() -> ResolveRequest {
        ResolveRequest::new("user-1", Some(user()))
    }

    #[tokio::test]
    async fn nearest_station_with_bikes() {
        let finder = Finder::new(MockBikes::oslo(), granted_store().await);

        let nearest = finder.resolve(&request()).await.unwrap();

        assert_eq!(nearest.id, "B");
        assert_eq!(nearest.display_name, "Beta");
        assert_eq!(nearest.bikes_available, 3);
    }

    #[tokio::test]
    async fn ranked_listing_excludes_empty_stations() {
        let finder = Finder::new(MockBikes::oslo(), granted_store().await);

        let ranked = finder.resolve_ranked(&request()).await.unwrap();
        let ids: Vec<_> = ranked.iter().map(|r| r.id.as_str()).collect();

        assert_eq!(ids, vec!["B"]);
    }

    #[tokio::test]
    async fn no_record_denies_without_network_calls() {
        let finder = Finder::new(MockBikes::oslo(), InMemoryPermissionStore::new());

        let err = finder.resolve(&request()).await.unwrap_err();

        assert!(matches!(err, ResolveError::PermissionDenied));
        assert_eq!(finder.bikes.network_calls(), 0);
    }

    #[tokio::test]
    async fn decided_grant_skips_the_store() {
        // Empty store: a lookup here would deny
        let finder = Finder::new(MockBikes::oslo(), InMemoryPermissionStore::new());

        let nearest = finder
            .resolve_for(PermissionState::Granted, &request())
            .await
            .unwrap();

        assert_eq!(nearest.id, "B");
    }

    #[tokio::test]
    async fn decided_denial_makes_no_network_calls() {
        let finder = Finder::new(MockBikes::oslo(), granted_store().await);

        for state in [PermissionState::Unknown, PermissionState::NotGranted] {
            let err = finder.resolve_for(state, &request()).await.unwrap_err();
            assert!(matches!(err, ResolveError::PermissionDenied));
        }
        assert_eq!(finder.bikes.network_calls(), 0);
    }

    #[tokio::test]
    async fn revoked_grant_denies() {
        let store = InMemoryPermissionStore::new();
        store.set("user-1", false).await;
        let finder = Finder::new(MockBikes::oslo(), store);

        let err = finder.resolve(&request()).await.unwrap_err();

        assert!(matches!(err, ResolveError::PermissionDenied));
        assert_eq!(finder.bikes.network_calls(), 0);
    }

    #[tokio::test]
    async fn missing_device_location_denies() {
        let finder = Finder::new(MockBikes::oslo(), granted_store().await);

        let err = finder
            .resolve(&ResolveRequest::new("user-1", None))
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::PermissionDenied));
        assert_eq!(finder.bikes.network_calls(), 0);
    }

    #[tokio::test]
    async fn availability_failure_is_fetch_error() {
        let mut bikes = MockBikes::oslo();
        bikes.availability_outcome = Outcome::ServerError;
        let finder = Finder::new(bikes, granted_store().await);

        let err = finder.resolve(&request()).await.unwrap_err();

        assert!(matches!(err, ResolveError::Fetch(BikeApiError::Api { status: 503, .. })));
    }

    #[tokio::test]
    async fn catalog_failure_is_fetch_error() {
        let mut bikes = MockBikes::oslo();
        bikes.stations_outcome = Outcome::ServerError;
        let finder = Finder::new(bikes, granted_store().await);

        let err = finder.resolve(&request()).await.unwrap_err();
        assert!(matches!(err, ResolveError::Fetch(_)));
    }

    #[tokio::test]
    async fn malformed_response_is_parse_error() {
        let mut bikes = MockBikes::oslo();
        bikes.availability_outcome = Outcome::Malformed;
        let finder = Finder::new(bikes, granted_store().await);

        let err = finder.resolve(&request()).await.unwrap_err();
        assert!(matches!(err, ResolveError::Parse(_)));
    }

    #[tokio::test]
    async fn catalog_error_reported_when_both_fail() {
        let mut bikes = MockBikes::oslo();
        bikes.stations_outcome = Outcome::Malformed;
        bikes.availability_outcome = Outcome::ServerError;
        let finder = Finder::new(bikes, granted_store().await);

        let err = finder.resolve(&request()).await.unwrap_err();
        assert!(matches!(err, ResolveError::Parse(_)));
    }

    #[tokio::test]
    async fn waits_for_slower_failing_fetch() {
        let mut bikes = MockBikes::oslo();
        bikes.availability_delay = Duration::from_millis(50);
        bikes.availability_outcome = Outcome::ServerError;
        let finder = Finder::new(bikes, granted_store().await);

        let err = finder.resolve(&request()).await.unwrap_err();

        assert!(matches!(err, ResolveError::Fetch(_)));
        assert_eq!(finder.bikes.completed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn waits_for_slower_successful_fetch() {
        let mut bikes = MockBikes::oslo();
        bikes.availability_delay = Duration::from_millis(50);
        let finder = Finder::new(bikes, granted_store().await);

        let nearest = finder.resolve(&request()).await.unwrap();

        assert_eq!(nearest.id, "B");
        assert_eq!(finder.bikes.completed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fetches_run_concurrently() {
        let mut bikes = MockBikes::oslo();
        bikes.stations_delay = Duration::from_millis(200);
        bikes.availability_delay = Duration::from_millis(200);
        let finder = Finder::new(bikes, granted_store().await);

        let started = std::time::Instant::now();
        finder.resolve(&request()).await.unwrap();

        assert!(started.elapsed() < Duration::from_millis(390));
    }

    #[tokio::test]
    async fn empty_availability_is_no_available_station() {
        let bikes = MockBikes::new(
            vec![Station::new("A", "Alpha", Coordinate::new(59.91, 10.75))],
            Availability::new(),
        );
        let finder = Finder::new(bikes, granted_store().await);

        let err = finder.resolve(&request()).await.unwrap_err();
        assert!(matches!(err, ResolveError::NoAvailableStation));

        let ranked = finder.resolve_ranked(&request()).await.unwrap();
        assert!(ranked.is_empty());
    }

    #[tokio::test]
    async fn disjoint_ids_is_no_available_station() {
        let bikes = MockBikes::new(
            vec![Station::new("A", "Alpha", Coordinate::new(59.91, 10.75))],
            [("Z", 9)].into_iter().collect(),
        );
        let finder = Finder::new(bikes, granted_store().await);

        let err = finder.resolve(&request()).await.unwrap_err();
        assert!(matches!(err, ResolveError::NoAvailableStation));
    }

    #[tokio::test]
    async fn permission_check_alone() {
        let finder = Finder::new(MockBikes::oslo(), granted_store().await);

        assert_eq!(
            finder.permission("user-1").await.unwrap(),
            PermissionState::Granted
        );
        assert_eq!(
            finder.permission("someone-else").await.unwrap(),
            PermissionState::NotGranted
        );
        assert_eq!(finder.bikes.network_calls(), 0);
    }

    #[tokio::test]
    async fn works_through_shared_handles() {
        let finder = Finder::new(Arc::new(MockBikes::oslo()), Arc::new(granted_store().await));
        let nearest = finder.resolve(&request()).await.unwrap();
        assert_eq!(nearest.id, "B");
    }

    #[test]
    fn error_display() {
        use std::error::Error;

        assert_eq!(
            ResolveError::PermissionDenied.to_string(),
            "location permission not granted"
        );
        assert_eq!(
            ResolveError::NoAvailableStation.to_string(),
            "no station with available bikes"
        );

        let err = ResolveError::from(BikeApiError::Api {
            status: 500,
            message: "boom".into(),
        });
        assert_eq!(err.to_string(), "failed to fetch bike data");
        assert_eq!(
            err.source().map(|cause| cause.to_string()).as_deref(),
            Some("API error 500: boom")
        );
    }
}
