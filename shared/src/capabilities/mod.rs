mod geolocation;
pub mod http;
mod navigation;

pub use self::geolocation::{
    GeoPosition, Geolocation, GeolocationError, GeolocationOperation, GeolocationResult,
};
pub use self::http::{UrlError, ValidatedUrl};
pub use self::navigation::{Navigation, NavigationOperation, Route};

pub use crux_core::render::Render;
pub use crux_http::Http;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub http: Http<Event>,
    pub render: Render<Event>,
    pub geolocation: Geolocation<Event>,
    pub navigation: Navigation<Event>,
}
