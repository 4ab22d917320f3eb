use tracing::{debug, info, instrument, warn};

use crate::capabilities::http::{decode_json, expect_success};
use crate::capabilities::{Capabilities, Route};
use crate::catalog::{
    locality_names, region_codes, ItemCategory, LocalityRecord, LocalityRequest, RegionRecord,
    Remote,
};
use crate::config::Endpoints;
use crate::event::Event;
use crate::model::{Model, SubmissionState, ToastKind};
use crate::selection::{Choice, Coordinate, LocalityName, RegionCode};
use crate::submission::{missing_fields, SubmissionPayload};
use crate::view::{
    select_options, CatalogStatus, ItemTile, MapView, SubmissionView, ToastView, UserFacingError,
    ViewModel,
};
use crate::{
    AppError, ErrorKind, DEFAULT_MAP_ZOOM, LOCALITY_PLACEHOLDER, REGION_PLACEHOLDER,
    SUBMISSION_SUCCESS_MESSAGE,
};

#[derive(Default)]
pub struct App;

impl App {
    fn fetch_regions(endpoints: &Endpoints, caps: &Capabilities) {
        caps.http
            .get(endpoints.regions())
            .expect_json::<Vec<RegionRecord>>()
            .send(|result| Event::RegionsLoaded(Box::new(result)));
    }

    fn fetch_items(endpoints: &Endpoints, caps: &Capabilities) {
        caps.http
            .get(endpoints.items())
            .expect_json::<Vec<ItemCategory>>()
            .send(|result| Event::ItemsLoaded(Box::new(result)));
    }

    #[instrument(skip_all, fields(region = %request.region, epoch = request.epoch))]
    fn fetch_localities(request: LocalityRequest, endpoints: &Endpoints, caps: &Capabilities) {
        debug!("requesting localities");
        caps.http
            .get(endpoints.localities(&request.region))
            .expect_json::<Vec<LocalityRecord>>()
            .send(move |result| Event::LocalitiesLoaded {
                request,
                result: Box::new(result),
            });
    }

    #[instrument(skip_all, fields(uf = %payload.uf, city = %payload.city, items = payload.items.len()))]
    fn send_submission(
        payload: &SubmissionPayload,
        endpoints: &Endpoints,
        caps: &Capabilities,
    ) -> Result<(), AppError> {
        let request = caps.http.post(endpoints.points()).body_json(payload).map_err(|e| {
            AppError::new(ErrorKind::Serialization, "Failed to encode submission")
                .with_internal(e.to_string())
        })?;
        request.send(|result| Event::SubmissionCompleted(Box::new(result)));
        info!("submission sent");
        Ok(())
    }

    fn mount(model: &mut Model, caps: &Capabilities) {
        let endpoints = match model.config.resolve() {
            Ok(endpoints) => endpoints,
            Err(e) => {
                let error = AppError::from(e);
                warn!(error = %error, "cannot mount with invalid endpoint config");
                model.regions = Remote::Failed(error.clone());
                model.items = Remote::Failed(error.clone());
                model.set_error(error);
                return;
            }
        };

        if model.initial_position.is_idle() {
            model.initial_position = Remote::Loading;
            caps.geolocation.current_position(Event::PositionResolved);
        }

        model.regions = Remote::Loading;
        Self::fetch_regions(&endpoints, caps);
        model.items = Remote::Loading;
        Self::fetch_items(&endpoints, caps);

        info!(api = endpoints.api_base(), "form mounted");
        model.endpoints = Some(endpoints);
    }

    fn select_region(value: &str, model: &mut Model, caps: &Capabilities) {
        let region = Choice::<RegionCode>::from_input(value);
        let retrying = model.localities.state().error().is_some();
        if &region == model.selection.region() && !(retrying && region.is_chosen()) {
            return;
        }

        if let Choice::Chosen(code) = &region {
            let known = model.regions.loaded().map_or(true, |codes| codes.contains(code));
            if !known {
                warn!(region = %code, "unknown region selected");
                model.set_error(
                    AppError::new(ErrorKind::Validation, format!("Unknown state: {code}"))
                        .with_context("region", code.as_str()),
                );
                return;
            }
        }

        model.selection = model.selection.with_region(region);
        let Some(request) = model.localities.observe_region(model.selection.region()) else {
            return;
        };

        match &model.endpoints {
            Some(endpoints) => Self::fetch_localities(request, endpoints, caps),
            None => model.localities.fail(AppError::new(
                ErrorKind::InvalidState,
                "Localities requested before the form was mounted",
            )),
        }
    }

    fn select_locality(value: &str, model: &mut Model) {
        let locality = Choice::<LocalityName>::from_input(value);
        if let Choice::Chosen(name) = &locality {
            if !model.selection.region().is_chosen() || !model.localities.contains(name) {
                warn!(locality = %name, "locality not offered for the current state");
                model.set_error(
                    AppError::new(ErrorKind::Validation, format!("Unknown city: {name}"))
                        .with_context("locality", name.as_str()),
                );
                return;
            }
        }
        model.selection = model.selection.with_locality(locality);
    }

    fn submit(model: &mut Model, caps: &Capabilities) {
        if !model.submission.accepts_submit() {
            debug!(in_flight = model.submission.is_in_flight(), "submit ignored");
            return;
        }

        let snapshot = model.selection.clone();
        let sent = SubmissionPayload::from_snapshot(&snapshot)
            .map_err(AppError::from)
            .and_then(|payload| match &model.endpoints {
                Some(endpoints) => {
                    Self::send_submission(&payload, endpoints, caps).map(|()| payload)
                }
                None => Err(AppError::new(
                    ErrorKind::InvalidState,
                    "Submitted before mount",
                )),
            });

        match sent {
            Ok(payload) => {
                model.clear_error();
                model.submission = SubmissionState::Submitting(Box::new(payload));
            }
            Err(error) => {
                debug!(error = %error, "submission not sent");
                model.submission = SubmissionState::Failed(error.clone());
                model.set_error(error);
            }
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        debug!(
            event = event.name(),
            user_initiated = event.is_user_initiated(),
            "update"
        );

        match event {
            Event::Noop => {}

            Event::Configure(config) => {
                if model.is_mounted() {
                    warn!("endpoint config ignored after mount");
                    return;
                }
                match config.resolve() {
                    Ok(_) => model.config = config,
                    Err(e) => model.set_error(e.into()),
                }
                caps.render.render();
            }

            Event::Mount => {
                if model.is_mounted() {
                    debug!("already mounted");
                    return;
                }
                Self::mount(model, caps);
                caps.render.render();
            }

            Event::PositionResolved(result) => {
                if !model.initial_position.is_loading() {
                    debug!("late position fix ignored");
                    return;
                }
                let position = result
                    .map_err(AppError::from)
                    .and_then(|p| Coordinate::new(p.latitude, p.longitude).map_err(AppError::from));
                match &position {
                    Ok(c) => info!(lat = c.lat(), lng = c.lng(), "initial position resolved"),
                    Err(e) => warn!(error = %e, "initial position unavailable"),
                }
                model.initial_position.settle(position);
                caps.render.render();
            }

            Event::RegionsLoaded(result) => {
                let regions = decode_json(*result).map(region_codes);
                match &regions {
                    Ok(codes) => info!(count = codes.len(), "regions loaded"),
                    Err(e) => warn!(error = %e, "regions failed to load"),
                }
                model.regions.settle(regions);
                caps.render.render();
            }

            Event::ItemsLoaded(result) => {
                let items = decode_json(*result);
                match &items {
                    Ok(items) => info!(count = items.len(), "items loaded"),
                    Err(e) => warn!(error = %e, "items failed to load"),
                }
                model.items.settle(items);
                caps.render.render();
            }

            Event::LocalitiesLoaded { request, result } => {
                let names = decode_json(*result).map(locality_names);
                if let Err(e) = &names {
                    warn!(region = %request.region, error = %e, "localities failed to load");
                }
                if model.localities.complete(&request, names) {
                    caps.render.render();
                }
            }

            Event::ContactChanged { field, value } => {
                model.selection = model.selection.with_contact(field, value);
                caps.render.render();
            }

            Event::RegionSelected { value } => {
                Self::select_region(&value, model, caps);
                caps.render.render();
            }

            Event::LocalitySelected { value } => {
                Self::select_locality(&value, model);
                caps.render.render();
            }

            Event::MapClicked { lat, lng } => {
                match Coordinate::from_click(lat, lng) {
                    Ok(position) => model.selection = model.selection.with_position(position),
                    Err(e) => {
                        warn!(lat, lng, error = %e, "map click ignored");
                        model.set_error(e.into());
                    }
                }
                caps.render.render();
            }

            Event::ItemToggled { id } => {
                model.selection = model.selection.with_item_toggled(id);
                caps.render.render();
            }

            Event::SubmitRequested => {
                Self::submit(model, caps);
                caps.render.render();
            }

            Event::SubmissionCompleted(result) => {
                if !model.submission.is_in_flight() {
                    debug!("unexpected submission response ignored");
                    return;
                }
                match expect_success(*result) {
                    Ok(()) => {
                        info!("collection point created");
                        model.submission = SubmissionState::Succeeded;
                        model.show_toast(SUBMISSION_SUCCESS_MESSAGE, ToastKind::Success);
                        caps.navigation.navigate(Route::Home);
                    }
                    Err(error) => {
                        warn!(error = %error, retryable = error.is_retryable(), "submission failed");
                        model.submission = SubmissionState::Failed(error.clone());
                        model.set_error(error);
                    }
                }
                caps.render.render();
            }

            Event::DismissError => {
                model.clear_error();
                caps.render.render();
            }

            Event::DismissToast => {
                model.clear_toast();
                caps.render.render();
            }
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        let selection = &model.selection;
        let contact = selection.contact();

        let items = model
            .items
            .entries()
            .iter()
            .map(|item| ItemTile {
                id: item.id,
                title: item.title.clone(),
                image: item.image.clone(),
                selected: selection.items().contains(item.id),
            })
            .collect();

        let can_submit = model.is_mounted()
            && model.submission.accepts_submit()
            && missing_fields(selection).is_empty();

        ViewModel {
            name: contact.name.clone(),
            email: contact.email.clone(),
            whatsapp: contact.whatsapp.clone(),

            region_options: select_options(
                REGION_PLACEHOLDER,
                model.regions.entries().iter().map(RegionCode::as_str),
            ),
            selected_region: selection.region().as_input().to_string(),
            locality_options: select_options(
                LOCALITY_PLACEHOLDER,
                model.localities.names().iter().map(LocalityName::as_str),
            ),
            selected_locality: selection.locality().as_input().to_string(),

            map: MapView {
                center: model.map_center().as_pair(),
                marker: model.marker().as_pair(),
                zoom: DEFAULT_MAP_ZOOM,
                has_selection: selection.position().is_some(),
            },
            items,

            regions_status: CatalogStatus::from(&model.regions),
            localities_status: CatalogStatus::from(model.localities.state()),
            items_status: CatalogStatus::from(&model.items),

            can_submit,
            submission: SubmissionView::from(&model.submission),
            error: model.active_error.as_ref().map(UserFacingError::from),
            toast: model.active_toast.as_ref().map(ToastView::from),
        }
    }
}
