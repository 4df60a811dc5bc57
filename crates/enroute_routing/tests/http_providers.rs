use std::time::Duration;

use axum::{
    Json, Router,
    extract::RawQuery,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use enroute_geo::{Coordinate, encode_polyline};
use enroute_routing::{
    FailureKind, RouteProvider, RouteProviderChain, RouteSource, RoutingConfig,
    providers::{
        graphhopper::{GraphHopperRouteClient, GraphHopperRouteClientParams},
        osrm::{OsrmRouteClient, OsrmRouteClientParams},
    },
};
use serde_json::json;

const DRIVER: Coordinate = Coordinate::new(34.261, -6.583);
const RIDER: Coordinate = Coordinate::new(34.2702, -6.5802);

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

async fn osrm_handler(RawQuery(query): RawQuery) -> Response {
    let query = query.unwrap_or_default();
    if !query.contains("geometries=geojson") || !query.contains("overview=full") {
        return (StatusCode::BAD_REQUEST, "missing parameters").into_response();
    }

    Json(json!({
        "code": "Ok",
        "routes": [{
            "distance": 1520.0,
            "duration": 300.0,
            "geometry": {
                "type": "LineString",
                "coordinates": [[-6.583, 34.261], [-6.5815, 34.2661], [-6.5802, 34.2702]]
            }
        }]
    }))
    .into_response()
}

async fn graphhopper_handler(RawQuery(query): RawQuery) -> Response {
    let query = query.unwrap_or_default();
    if query.matches("point=").count() != 2 || !query.contains("profile=car") {
        return (StatusCode::BAD_REQUEST, "missing parameters").into_response();
    }

    Json(json!({
        "paths": [{
            "distance": 1610.0,
            "time": 420_000,
            "points": encode_polyline(&[DRIVER, Coordinate::new(34.2655, -6.5812), RIDER]),
        }]
    }))
    .into_response()
}

async fn failing_handler() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
}

fn osrm_client(url: String) -> OsrmRouteClient {
    OsrmRouteClient::new(OsrmRouteClientParams {
        osrm_url: url,
        user_agent: String::from("enroute-tests"),
        timeout: Duration::from_secs(2),
    })
    .unwrap()
}

fn graphhopper_client(url: String) -> GraphHopperRouteClient {
    GraphHopperRouteClient::new(GraphHopperRouteClientParams {
        url,
        api_key: None,
        user_agent: String::from("enroute-tests"),
        timeout: Duration::from_secs(2),
    })
    .unwrap()
}

#[tokio::test]
async fn osrm_client_reads_geojson_route() {
    let url = serve(Router::new().route("/route/v1/driving/{coordinates}", get(osrm_handler))).await;

    let route = osrm_client(url).route(DRIVER, RIDER).await.unwrap();

    assert!((route.distance_km - 1.52).abs() < 1e-9);
    assert_eq!(route.duration_min, 5);
    assert_eq!(route.path.first(), Some(&DRIVER));
    assert_eq!(route.path.last(), Some(&RIDER));
}

#[tokio::test]
async fn graphhopper_client_decodes_points() {
    let url = serve(Router::new().route("/route", get(graphhopper_handler))).await;

    let route = graphhopper_client(url).route(DRIVER, RIDER).await.unwrap();

    assert!((route.distance_km - 1.61).abs() < 1e-9);
    assert_eq!(route.duration_min, 7);
    assert_eq!(route.path.len(), 3);
    assert!((route.path[2].latitude - RIDER.latitude).abs() < 1e-5);
}

#[tokio::test]
async fn server_error_is_a_transport_failure() {
    let url = serve(Router::new().fallback(failing_handler)).await;

    let err = osrm_client(url).route(DRIVER, RIDER).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::TransportFailure);
}

#[tokio::test]
async fn refused_connection_is_a_transport_failure() {
    let err = graphhopper_client(closed_port_url().await)
        .route(DRIVER, RIDER)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::TransportFailure);
}

#[tokio::test]
async fn configured_chain_prefers_osrm() {
    let config = RoutingConfig {
        osrm_url: serve(Router::new().route("/route/v1/driving/{coordinates}", get(osrm_handler)))
            .await,
        graphhopper_url: serve(Router::new().route("/route", get(graphhopper_handler))).await,
        ..RoutingConfig::default()
    };

    let chain = RouteProviderChain::from_config(&config).unwrap();
    let result = chain.get_route(DRIVER, RIDER).await;

    assert_eq!(result.source_tag, RouteSource::Primary);
    assert_eq!(result.duration_min, 5);
}

#[tokio::test]
async fn configured_chain_uses_graphhopper_when_osrm_is_down() {
    let config = RoutingConfig {
        osrm_url: serve(Router::new().fallback(failing_handler)).await,
        graphhopper_url: serve(Router::new().route("/route", get(graphhopper_handler))).await,
        ..RoutingConfig::default()
    };

    let chain = RouteProviderChain::from_config(&config).unwrap();
    let result = chain.get_route(DRIVER, RIDER).await;

    assert_eq!(result.source_tag, RouteSource::Secondary);
    assert_eq!(result.duration_min, 7);
}

#[tokio::test]
async fn configured_chain_falls_back_when_everything_is_down() {
    let config = RoutingConfig {
        osrm_url: closed_port_url().await,
        graphhopper_url: serve(Router::new().fallback(failing_handler)).await,
        request_timeout: Duration::from_secs(2),
        ..RoutingConfig::default()
    };

    let chain = RouteProviderChain::from_config(&config).unwrap();
    let result = chain.get_route(DRIVER, RIDER).await;

    assert_eq!(result.source_tag, RouteSource::Fallback);
    assert_eq!(result.path.first(), Some(&DRIVER));
    assert_eq!(result.path.last(), Some(&RIDER));
}
