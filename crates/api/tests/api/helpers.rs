use async_trait::async_trait;
use axum::Router;
use mockall::mock;
use smokeynet_api::{
    app, app_state, FetchError, ObservationSource, RawObservation, StationMappings,
};
use std::sync::{Arc, Once};

static LOGGER: Once = Once::new();

mock! {
    pub Observations {}

    #[async_trait]
    impl ObservationSource for Observations {
        async fn fetch_latest(&self, station_ids: &[String]) -> Result<Vec<RawObservation>, FetchError>;
    }
}

pub const MAPPINGS: &str = "\
camera_id,stid,distance_mi
hpwren30_south,SDG20,2.0
hpwren30_south,HPWR1,8.0
hpwren30_north,SDG20,10.0
";

pub struct TestApp {
    pub app: Router,
}

pub fn spawn_app(observations: Arc<dyn ObservationSource>) -> TestApp {
    LOGGER.call_once(|| {
        let _ = smokeynet_api::setup_logger()
            .level(log::LevelFilter::Debug)
            .apply();
    });

    let mappings = StationMappings::from_reader(MAPPINGS.as_bytes()).expect("valid mappings");
    let state = app_state(Arc::new(mappings), observations);
    TestApp { app: app(state) }
}
