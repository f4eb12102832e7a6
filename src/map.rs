use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::MapSettings;
use crate::host::{Dialog, GeolocationError, Geolocator};
use crate::overlay::{TileOverlay, TileSource};
use crate::query::{ParamValue, QueryParamStore, PARAM_LAT, PARAM_LON, PARAM_ZOOM};
use crate::share::{ShareOutcome, ShareWidget};
use crate::theme::{StyleRule, HEATMAP_STYLE, HEATMAP_THEME_NAME};

pub const MIN_ZOOM: u8 = 2;
pub const MAX_ZOOM: u8 = 19;
const LOCATE_ZOOM: u8 = 13;
const MAP_TYPE_TERRAIN: &str = "terrain";
const LOCATION_DENIED_MESSAGE: &str =
    "You must grant access to your location in order to use this feature.";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Viewport centre and zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraState {
    pub center: LatLng,
    pub zoom: u8,
}

impl CameraState {
    /// Reads the camera from `lat`, `lon` and `z`, falling back to `default`
    /// per parameter. Zoom is read as a number, clamped to the supported
    /// range and rounded to a whole level.
    pub fn from_params(params: &QueryParamStore, default: &CameraState) -> Self {
        let zoom = params
            .get(PARAM_ZOOM, f64::from(default.zoom))
            .clamp(f64::from(MIN_ZOOM), f64::from(MAX_ZOOM))
            .round() as u8;
        Self {
            center: LatLng::new(
                params.get(PARAM_LAT, default.center.lat),
                params.get(PARAM_LON, default.center.lng),
            ),
            zoom,
        }
    }

    pub fn of(map: &dyn MapSurface) -> Self {
        Self {
            center: map.center(),
            zoom: map.zoom(),
        }
    }

    pub fn write_to(&self, params: &QueryParamStore) {
        params.set([
            (PARAM_LAT, self.center.lat.to_param()),
            (PARAM_LON, self.center.lng.to_param()),
            (PARAM_ZOOM, self.zoom.to_param()),
        ]);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOptions {
    pub center: LatLng,
    pub zoom: u8,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub map_type_id: &'static str,
    pub styles: &'static [StyleRule],
    pub zoom_control: bool,
    pub scale_control: bool,
    pub map_type_control: bool,
    pub street_view_control: bool,
    pub rotate_control: bool,
    pub fullscreen_control: bool,
}

impl MapOptions {
    pub fn new(camera: CameraState) -> Self {
        Self {
            center: camera.center,
            zoom: camera.zoom,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            map_type_id: MAP_TYPE_TERRAIN,
            styles: HEATMAP_STYLE,
            zoom_control: true,
            scale_control: true,
            map_type_control: false,
            street_view_control: false,
            rotate_control: false,
            fullscreen_control: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapEvent {
    CenterChanged,
    ZoomChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(pub u64);

pub type MapListener = Box<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerIcon {
    pub path: &'static str,
    pub scale: f32,
    pub fill_opacity: f32,
    pub stroke_weight: f32,
    pub fill_color: &'static str,
    pub stroke_color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerOptions {
    pub position: LatLng,
    pub icon: MarkerIcon,
}

impl MarkerOptions {
    fn gps(position: LatLng) -> Self {
        Self {
            position,
            icon: MarkerIcon {
                path: "circle",
                scale: 8.0,
                fill_opacity: 1.0,
                stroke_weight: 2.0,
                fill_color: "#5384ED",
                stroke_color: "#ffffff",
            },
        }
    }
}

/// The map widget as provided by the mapping library.
pub trait MapSurface: Send + Sync {
    fn set_options(&self, options: &MapOptions);
    fn center(&self) -> LatLng;
    fn zoom(&self) -> u8;
    fn set_center(&self, center: LatLng);
    fn pan_to(&self, center: LatLng);
    fn set_zoom(&self, zoom: u8);
    fn add_listener(&self, event: MapEvent, listener: MapListener) -> ListenerId;
    fn remove_listener(&self, id: ListenerId);
    fn insert_overlay(&self, index: usize, overlay: Arc<dyn TileSource>);
    fn add_marker(&self, options: &MarkerOptions) -> MarkerId;
    fn set_marker_position(&self, id: MarkerId, position: LatLng);
}

/// Slot for the single "you are here" marker.
#[derive(Default)]
pub struct GpsMarker {
    marker: Mutex<Option<MarkerId>>,
}

impl GpsMarker {
    /// Creates the marker on the first call and moves it afterwards.
    pub fn update(&self, map: &dyn MapSurface, position: LatLng) -> MarkerId {
        let mut slot = self.marker.lock();
        match *slot {
            Some(id) => {
                map.set_marker_position(id, position);
                id
            }
            None => {
                let id = map.add_marker(&MarkerOptions::gps(position));
                *slot = Some(id);
                id
            }
        }
    }

    pub fn id(&self) -> Option<MarkerId> {
        *self.marker.lock()
    }
}

/// Owns the map for the lifetime of the page.
pub struct MapViewController {
    map: Arc<dyn MapSurface>,
    params: Arc<QueryParamStore>,
    geolocator: Arc<dyn Geolocator>,
    dialog: Arc<dyn Dialog>,
    share: ShareWidget,
    gps_marker: GpsMarker,
    listeners: Mutex<Vec<ListenerId>>,
}

impl MapViewController {
    pub fn initialize(
        map: Arc<dyn MapSurface>,
        params: Arc<QueryParamStore>,
        geolocator: Arc<dyn Geolocator>,
        dialog: Arc<dyn Dialog>,
        share: ShareWidget,
        settings: &MapSettings,
    ) -> Self {
        let camera = CameraState::from_params(&params, &settings.default_camera);
        map.set_options(&MapOptions::new(camera));

        let listeners: Vec<ListenerId> = [MapEvent::CenterChanged, MapEvent::ZoomChanged]
            .into_iter()
            .map(|event| {
                let weak = Arc::downgrade(&map);
                let params = Arc::clone(&params);
                map.add_listener(
                    event,
                    Box::new(move || {
                        if let Some(map) = weak.upgrade() {
                            CameraState::of(map.as_ref()).write_to(&params);
                        }
                    }),
                )
            })
            .collect();

        map.insert_overlay(
            0,
            Arc::new(TileOverlay::new(
                settings.tile_endpoint.clone(),
                settings.map_id.clone(),
            )),
        );

        info!(
            lat = camera.center.lat,
            lng = camera.center.lng,
            zoom = camera.zoom,
            theme = HEATMAP_THEME_NAME,
            "map view initialized"
        );

        Self {
            map,
            params,
            geolocator,
            dialog,
            share,
            gps_marker: GpsMarker::default(),
            listeners: Mutex::new(listeners),
        }
    }

    /// Initialises the map and requests the silent first location fix in the
    /// background. Must be called from within a tokio runtime.
    pub fn start(
        map: Arc<dyn MapSurface>,
        params: Arc<QueryParamStore>,
        geolocator: Arc<dyn Geolocator>,
        dialog: Arc<dyn Dialog>,
        share: ShareWidget,
        settings: &MapSettings,
    ) -> Arc<Self> {
        let controller = Arc::new(Self::initialize(
            map, params, geolocator, dialog, share, settings,
        ));
        tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.enable_gps().await }
        });
        controller
    }

    /// Silent first fix after start-up.
    pub async fn enable_gps(&self) {
        match self.geolocator.current_position().await {
            Ok(position) => {
                self.gps_marker.update(self.map.as_ref(), position);
            }
            Err(err) => debug!(?err, "initial location fix unavailable"),
        }
    }

    pub async fn on_location_clicked(&self) -> Option<LatLng> {
        match self.geolocator.current_position().await {
            Ok(position) => {
                self.map.set_center(position);
                self.map.pan_to(position);
                self.map.set_zoom(LOCATE_ZOOM);
                self.gps_marker.update(self.map.as_ref(), position);
                Some(position)
            }
            Err(GeolocationError::Unsupported) => {
                debug!("location button ignored; geolocation unsupported");
                None
            }
            Err(err) => {
                warn!(?err, "location request failed");
                self.dialog.alert(LOCATION_DENIED_MESSAGE);
                None
            }
        }
    }

    pub async fn on_share_clicked(&self) -> ShareOutcome {
        self.share.share().await
    }

    pub fn camera(&self) -> CameraState {
        CameraState::of(self.map.as_ref())
    }

    pub fn params(&self) -> &Arc<QueryParamStore> {
        &self.params
    }

    pub fn gps_marker(&self) -> &GpsMarker {
        &self.gps_marker
    }

    /// Removes the camera listeners. Later calls do nothing.
    pub fn teardown(&self) {
        let listeners = std::mem::take(&mut *self.listeners.lock());
        for id in &listeners {
            self.map.remove_listener(*id);
        }
        debug!(listeners = listeners.len(), "map view torn down");
    }
}
