use assert_matches::assert_matches;
use crux_core::testing::AppTester;
use crux_core::Request;
use crux_http::protocol::{HttpRequest, HttpResponse, HttpResult};
use serde_json::json;

use shared::capabilities::{GeoPosition, GeolocationError, NavigationOperation, Route};
use shared::model::{SubmissionState, ToastKind};
use shared::selection::ContactField;
use shared::view::SubmissionView;
use shared::{App, Effect, Event, Model};

const ITEMS_URL: &str = "http://localhost:3333/items";
const POINTS_URL: &str = "http://localhost:3333/points";
const REGIONS_URL: &str = "https://servicodados.ibge.gov.br/api/v1/localidades/estados";
const SP_URL: &str = "https://servicodados.ibge.gov.br/api/v1/localidades/estados/SP/municipios";

fn http_requests(effects: Vec<Effect>) -> Vec<Request<HttpRequest>> {
    effects
        .into_iter()
        .filter_map(|e| match e {
            Effect::Http(request) => Some(request),
            _ => None,
        })
        .collect()
}

fn take_request(requests: &mut Vec<Request<HttpRequest>>, url: &str) -> Request<HttpRequest> {
    let index = requests
        .iter()
        .position(|r| r.operation.url == url)
        .unwrap_or_else(|| panic!("no request for {url}"));
    requests.remove(index)
}

fn respond(
    app: &AppTester<App, Effect>,
    model: &mut Model,
    request: &mut Request<HttpRequest>,
    response: HttpResponse,
) -> Vec<Effect> {
    let update = app.resolve(request, HttpResult::Ok(response)).unwrap();
    let mut effects = update.effects;
    for event in update.events {
        effects.extend(app.update(event, model).effects);
    }
    effects
}

/// Mounts the form and answers both catalog loads. Returns the pending
/// geolocation request.
fn mounted(app: &AppTester<App, Effect>, model: &mut Model) -> Vec<Effect> {
    let update = app.update(Event::Mount, model);
    let (geolocation, others): (Vec<_>, Vec<_>) = update
        .effects
        .into_iter()
        .partition(|e| matches!(e, Effect::Geolocation(_)));

    let mut requests = http_requests(others);
    let mut regions = take_request(&mut requests, REGIONS_URL);
    respond(
        app,
        model,
        &mut regions,
        HttpResponse::ok()
            .json(json!([{ "sigla": "SP" }, { "sigla": "RJ" }]))
            .build(),
    );
    let mut items = take_request(&mut requests, ITEMS_URL);
    respond(
        app,
        model,
        &mut items,
        HttpResponse::ok()
            .json(json!([
                { "id": 1, "title": "Lamps", "image_url": "http://localhost:3333/uploads/lamps.svg" },
                { "id": 2, "title": "Batteries", "image_url": "http://localhost:3333/uploads/batteries.svg" },
                { "id": 3, "title": "Paper", "image_url": "http://localhost:3333/uploads/paper.svg" }
            ]))
            .build(),
    );
    assert!(requests.is_empty());
    geolocation
}

fn choose_sp_santos(app: &AppTester<App, Effect>, model: &mut Model) {
    let update = app.update(Event::RegionSelected { value: "SP".into() }, model);
    let mut requests = http_requests(update.effects);
    let mut localities = take_request(&mut requests, SP_URL);
    respond(
        app,
        model,
        &mut localities,
        HttpResponse::ok()
            .json(json!([{ "nome": "Campinas" }, { "nome": "Santos" }]))
            .build(),
    );
    app.update(Event::LocalitySelected { value: "Santos".into() }, model);
}

fn fill_contact(app: &AppTester<App, Effect>, model: &mut Model) {
    for (field, value) in [
        (ContactField::Name, "ONG X"),
        (ContactField::Email, "a@b.com"),
        (ContactField::Whatsapp, "119999"),
    ] {
        app.update(
            Event::ContactChanged {
                field,
                value: value.into(),
            },
            model,
        );
    }
}

fn complete_form(app: &AppTester<App, Effect>, model: &mut Model) {
    mounted(app, model);
    fill_contact(app, model);
    choose_sp_santos(app, model);
    app.update(Event::MapClicked { lat: -23.5, lng: -46.6 }, model);
    app.update(Event::ItemToggled { id: shared::catalog::ItemId(1) }, model);
    app.update(Event::ItemToggled { id: shared::catalog::ItemId(3) }, model);
}

#[test]
fn test_mount_starts_every_load() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(Event::Mount, &mut model);

    assert!(update
        .effects
        .iter()
        .any(|e| matches!(e, Effect::Geolocation(_))));
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Render(_))));
    let urls: Vec<String> = http_requests(update.effects)
        .into_iter()
        .map(|r| r.operation.url)
        .collect();
    assert_eq!(urls.len(), 2);
    assert!(urls.contains(&REGIONS_URL.to_string()));
    assert!(urls.contains(&ITEMS_URL.to_string()));

    let view = app.view(&model);
    assert_eq!(view.map.center, [0.0, 0.0]);
    assert_eq!(view.region_options.len(), 1);
}

#[test]
fn test_mount_is_idempotent() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(Event::Mount, &mut model);
    let update = app.update(Event::Mount, &mut model);

    assert!(update.effects.is_empty());
}

#[test]
fn test_catalogs_populate_options_and_tiles() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    mounted(&app, &mut model);

    let view = app.view(&model);
    let regions: Vec<&str> = view.region_options.iter().map(|o| o.value.as_str()).collect();
    assert_eq!(regions, ["0", "SP", "RJ"]);
    assert_eq!(view.items.len(), 3);
    assert_eq!(view.items[1].title, "Batteries");
    assert!(view.items.iter().all(|tile| !tile.selected));
}

#[test]
fn test_geolocation_centers_map_once() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let mut geolocation = mounted(&app, &mut model);
    let Some(Effect::Geolocation(mut request)) = geolocation.pop() else {
        panic!("expected a geolocation request");
    };

    let update = app
        .resolve(
            &mut request,
            Ok(GeoPosition {
                latitude: -22.9,
                longitude: -43.2,
            }),
        )
        .unwrap();
    for event in update.events {
        app.update(event, &mut model);
    }

    let view = app.view(&model);
    assert_eq!(view.map.center, [-22.9, -43.2]);
    assert_eq!(view.map.marker, [0.0, 0.0]);

    // A second fix never moves the map.
    app.update(
        Event::PositionResolved(Ok(GeoPosition {
            latitude: 1.0,
            longitude: 1.0,
        })),
        &mut model,
    );
    assert_eq!(app.view(&model).map.center, [-22.9, -43.2]);
}

#[test]
fn test_geolocation_failure_keeps_origin_silently() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    mounted(&app, &mut model);
    app.update(
        Event::PositionResolved(Err(GeolocationError::PermissionDenied)),
        &mut model,
    );

    let view = app.view(&model);
    assert_eq!(view.map.center, [0.0, 0.0]);
    assert!(view.error.is_none());
}

#[test]
fn test_geolocation_never_answering_does_not_block_form() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    complete_form(&app, &mut model);

    let view = app.view(&model);
    assert_eq!(view.map.center, [0.0, 0.0]);
    assert_eq!(view.map.marker, [-23.5, -46.6]);
    assert!(view.can_submit);
}

#[test]
fn test_contact_edits_touch_one_field() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    fill_contact(&app, &mut model);
    app.update(
        Event::ContactChanged {
            field: ContactField::Email,
            value: "c@d.org".into(),
        },
        &mut model,
    );

    let view = app.view(&model);
    assert_eq!(view.name, "ONG X");
    assert_eq!(view.email, "c@d.org");
    assert_eq!(view.whatsapp, "119999");
}

#[test]
fn test_map_click_overwrites_previous() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(Event::MapClicked { lat: 1.0, lng: 2.0 }, &mut model);
    app.update(Event::MapClicked { lat: -3.0, lng: 4.0 }, &mut model);

    let view = app.view(&model);
    assert_eq!(view.map.marker, [-3.0, 4.0]);
    assert!(view.map.has_selection);
}

#[test]
fn test_map_click_past_antimeridian_is_stored_as_given() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(Event::MapClicked { lat: -23.5, lng: -46.6 }, &mut model);
    app.update(Event::MapClicked { lat: -23.5, lng: 313.4 }, &mut model);

    let view = app.view(&model);
    assert_eq!(view.map.marker, [-23.5, 313.4]);
    assert!(view.error.is_none());
}

#[test]
fn test_long_contact_value_is_kept_exactly() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let long = "x".repeat(300);
    app.update(
        Event::ContactChanged {
            field: ContactField::Name,
            value: long.clone(),
        },
        &mut model,
    );

    assert_eq!(app.view(&model).name, long);
}

#[test]
fn test_item_toggle_marks_tiles() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    mounted(&app, &mut model);
    let two = shared::catalog::ItemId(2);
    app.update(Event::ItemToggled { id: two }, &mut model);
    assert!(app.view(&model).items[1].selected);

    app.update(Event::ItemToggled { id: two }, &mut model);
    assert!(!app.view(&model).items[1].selected);
}

#[test]
fn test_submit_posts_snapshot_and_navigates_home() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    complete_form(&app, &mut model);
    let update = app.update(Event::SubmitRequested, &mut model);

    let mut requests = http_requests(update.effects);
    let mut post = take_request(&mut requests, POINTS_URL);
    assert_eq!(post.operation.method, "POST");
    let body: serde_json::Value = serde_json::from_slice(&post.operation.body).unwrap();
    assert_eq!(
        body,
        json!({
            "name": "ONG X",
            "email": "a@b.com",
            "whatsapp": "119999",
            "uf": "SP",
            "city": "Santos",
            "latitude": -23.5,
            "longitude": -46.6,
            "items": [1, 3]
        })
    );
    assert_eq!(app.view(&model).submission, SubmissionView::Submitting);
    assert!(!app.view(&model).can_submit);

    let effects = respond(
        &app,
        &mut model,
        &mut post,
        HttpResponse::ok().json(json!({ "id": 7 })).build(),
    );

    let navigation = effects.into_iter().find_map(|e| match e {
        Effect::Navigation(request) => Some(request.operation),
        _ => None,
    });
    assert_eq!(
        navigation,
        Some(NavigationOperation::Navigate { route: Route::Home })
    );
    assert_eq!(model.submission, SubmissionState::Succeeded);
    let toast = app.view(&model).toast.expect("success toast");
    assert_eq!(toast.message, "Collection point created");
    assert_eq!(toast.kind, ToastKind::Success);
}

#[test]
fn test_submit_with_no_items_is_accepted() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    mounted(&app, &mut model);
    fill_contact(&app, &mut model);
    choose_sp_santos(&app, &mut model);
    app.update(Event::MapClicked { lat: -23.5, lng: -46.6 }, &mut model);

    let update = app.update(Event::SubmitRequested, &mut model);
    let mut requests = http_requests(update.effects);
    let post = take_request(&mut requests, POINTS_URL);
    let body: serde_json::Value = serde_json::from_slice(&post.operation.body).unwrap();
    assert_eq!(body["items"], json!([]));
}

#[test]
fn test_incomplete_form_is_not_sent() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    mounted(&app, &mut model);
    fill_contact(&app, &mut model);

    let update = app.update(Event::SubmitRequested, &mut model);

    assert!(http_requests(update.effects).is_empty());
    let error = app.view(&model).error.expect("validation error");
    assert_eq!(error.error_code, "VALIDATION_ERROR");
    assert_eq!(error.message, "Missing fields: state, city, map position");
    assert_matches!(
        app.view(&model).submission,
        SubmissionView::Failed {
            is_retryable: false,
            ..
        }
    );
}

#[test]
fn test_second_submit_while_in_flight_is_ignored() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    complete_form(&app, &mut model);
    app.update(Event::SubmitRequested, &mut model);
    let update = app.update(Event::SubmitRequested, &mut model);

    assert!(http_requests(update.effects).is_empty());
    assert_eq!(app.view(&model).submission, SubmissionView::Submitting);
}

#[test]
fn test_submit_after_success_is_ignored() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    complete_form(&app, &mut model);
    let update = app.update(Event::SubmitRequested, &mut model);
    let mut post = take_request(&mut http_requests(update.effects), POINTS_URL);
    respond(
        &app,
        &mut model,
        &mut post,
        HttpResponse::ok().json(json!({ "id": 7 })).build(),
    );
    assert!(!app.view(&model).can_submit);

    let update = app.update(Event::SubmitRequested, &mut model);

    assert!(http_requests(update.effects).is_empty());
    assert_eq!(model.submission, SubmissionState::Succeeded);
}

#[test]
fn test_failed_submission_can_be_retried() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    complete_form(&app, &mut model);
    let update = app.update(Event::SubmitRequested, &mut model);
    let mut post = take_request(&mut http_requests(update.effects), POINTS_URL);

    let effects = respond(
        &app,
        &mut model,
        &mut post,
        HttpResponse::status(500).build(),
    );

    assert!(!effects.iter().any(|e| matches!(e, Effect::Navigation(_))));
    assert_matches!(
        app.view(&model).submission,
        SubmissionView::Failed {
            is_retryable: true,
            ..
        }
    );
    assert!(app.view(&model).can_submit);

    let update = app.update(Event::SubmitRequested, &mut model);
    let retry = take_request(&mut http_requests(update.effects), POINTS_URL);
    assert_eq!(retry.operation.method, "POST");
    assert!(app.view(&model).error.is_none());
}

#[test]
fn test_configure_after_mount_is_ignored() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(Event::Mount, &mut model);
    let update = app.update(
        Event::Configure(shared::EndpointConfig {
            api_base_url: "https://api.example.test".into(),
            ..shared::EndpointConfig::default()
        }),
        &mut model,
    );

    assert!(update.effects.is_empty());
    assert_eq!(model.config, shared::EndpointConfig::default());
}

#[test]
fn test_configure_before_mount_redirects_requests() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(
        Event::Configure(shared::EndpointConfig {
            api_base_url: "https://api.example.test/v2".into(),
            ..shared::EndpointConfig::default()
        }),
        &mut model,
    );
    let update = app.update(Event::Mount, &mut model);

    let urls: Vec<String> = http_requests(update.effects)
        .into_iter()
        .map(|r| r.operation.url)
        .collect();
    assert!(urls.contains(&"https://api.example.test/v2/items".to_string()));
}

#[test]
fn test_invalid_config_fails_mount() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(
        Event::Configure(shared::EndpointConfig {
            api_base_url: "ftp://nope".into(),
            ..shared::EndpointConfig::default()
        }),
        &mut model,
    );
    assert_eq!(
        app.view(&model).error.map(|e| e.error_code),
        Some("CONFIGURATION_ERROR".to_string())
    );
    assert_eq!(model.config, shared::EndpointConfig::default());
}
