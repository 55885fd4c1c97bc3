use super::mock::{FleetAppSim, VehicleFixture};
use crate::config::Credentials;
use crate::engine::Session;
use crate::errors::NavigateError;
use crate::login::{LoginFlow, LoginStatus, PortalLogin};
use crate::navigator::VehicleNavigator;

#[tokio::test(start_paused = true)]
async fn loads_known_vehicle() {
    super::init_tracing();
    let sim = FleetAppSim::new();
    sim.add_vehicle("12345678", VehicleFixture::default());
    let session = Session::new(sim.clone());

    VehicleNavigator::new(&session)
        .load("12345678")
        .await
        .unwrap();

    assert_eq!(sim.event_count("mva_entered:12345678"), 1);
    assert_eq!(sim.mva_value(), "12345678");
}

#[tokio::test(start_paused = true)]
async fn unknown_mva_is_not_found() {
    let sim = FleetAppSim::new();
    sim.add_vehicle("12345678", VehicleFixture::default());
    let session = Session::new(sim.clone());

    let result = VehicleNavigator::new(&session).load("99999999").await;

    assert!(matches!(result, Err(NavigateError::NotFound)));
}

#[tokio::test(start_paused = true)]
async fn missing_search_input_is_input_unavailable() {
    // The login screen has no MVA search field.
    let sim = FleetAppSim::new();
    sim.start_at_login();
    let session = Session::new(sim.clone());

    let result = VehicleNavigator::new(&session).load("12345678").await;

    assert!(matches!(result, Err(NavigateError::InputUnavailable)));
}

#[tokio::test(start_paused = true)]
async fn stale_prefill_is_cleared_before_entry() {
    let sim = FleetAppSim::new();
    sim.add_vehicle("12345678", VehicleFixture::default());
    sim.prefill_mva("87654321");
    let session = Session::new(sim.clone());

    VehicleNavigator::new(&session)
        .load("12345678")
        .await
        .unwrap();

    // Only the fresh MVA remains; the stale value never concatenates.
    assert_eq!(sim.mva_value(), "12345678");
}

#[tokio::test(start_paused = true)]
async fn return_home_verifies_search_field() {
    let sim = FleetAppSim::new();
    sim.add_vehicle("12345678", VehicleFixture::default());
    let session = Session::new(sim.clone());
    let navigator = VehicleNavigator::new(&session);

    navigator.load("12345678").await.unwrap();
    navigator.return_home().await.unwrap();

    assert_eq!(sim.event_count("return_home"), 1);
    assert_eq!(sim.mva_value(), "");
}

#[tokio::test(start_paused = true)]
async fn portal_login_lands_on_search_screen() {
    let sim = FleetAppSim::new();
    sim.start_at_login();
    let session = Session::new(sim.clone());
    let credentials = Credentials {
        username: "user".to_string(),
        password: "hunter2".to_string(),
        login_id: "779".to_string(),
    };

    let status = PortalLogin::new(&session)
        .login(&credentials)
        .await
        .unwrap();

    assert_eq!(status, LoginStatus::Ok);
    assert_eq!(sim.event_count("login"), 1);
}
