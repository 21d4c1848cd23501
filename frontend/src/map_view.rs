use gloo_console::error;
use gloo_utils::document;
use leaflet::{LatLng, Map, MapOptions, Marker, Popup, PopupOptions, TileLayer, TileLayerOptions};
use wasm_bindgen::{JsCast, JsValue, closure::Closure, prelude::wasm_bindgen};
use web_sys::{HtmlElement, Node, js_sys::Reflect};
use workout_lib::{
    Coordinates,
    config::AppConfig,
    map::{MapView, MarkerPopup},
};
use yew::Html;

#[wasm_bindgen]
extern "C" {
    type MapClickEvent;

    #[wasm_bindgen(method, getter)]
    fn latlng(this: &MapClickEvent) -> LatLng;
}

/// Leaflet map living in a detached `div` that yew mounts by reference.
pub struct LeafletMap {
    map: Map,
    container: HtmlElement,
    tile_url: String,
    tile_attribution: String,
    tiles_added: bool,
    click_listener: Option<Closure<dyn Fn(MapClickEvent)>>,
}

impl LeafletMap {
    pub fn new(config: &AppConfig) -> Self {
        let container: HtmlElement = document()
            .create_element("div")
            .ok()
            .and_then(|element| element.dyn_into().ok())
            .expect("document can create a div");
        container.set_class_name("map");

        let map = Map::new_with_element(&container, &MapOptions::default());

        Self {
            map,
            container,
            tile_url: config.tile_url.clone(),
            tile_attribution: config.tile_attribution.clone(),
            tiles_added: false,
            click_listener: None,
        }
    }

    pub fn render(&self) -> Html {
        let node: &Node = &self.container.clone().into();
        Html::VRef(node.clone())
    }

    fn add_tile_layer(&mut self) {
        if self.tiles_added {
            return;
        }

        let opts = TileLayerOptions::new();
        opts.set_update_when_idle(true);
        if let Err(err) = Reflect::set(&opts, &JsValue::from_str("attribution"), &JsValue::from_str(&self.tile_attribution)) {
            error!("Failed to set tile attribution", err);
        }
        TileLayer::new_options(&self.tile_url, &opts).add_to(&self.map);
        self.tiles_added = true;
    }
}

fn lat_lng(at: Coordinates) -> LatLng {
    LatLng::new(at.lat(), at.lng())
}

impl MapView for LeafletMap {
    fn show(&mut self, center: Coordinates, zoom: f64) {
        self.map.invalidate_size(false);
        self.map.set_view(&lat_lng(center), zoom);
        self.add_tile_layer();
    }

    fn on_click(&mut self, handler: Box<dyn Fn(Coordinates)>) {
        let listener = Closure::<dyn Fn(MapClickEvent)>::new(move |event: MapClickEvent| {
            let latlng = event.latlng();
            // Clicks on a world copy past the antimeridian report e.g. lng 200.
            if let Ok(at) = Coordinates::wrapped(latlng.lat(), latlng.lng()) {
                handler(at);
            }
        });

        self.map.on("click", listener.as_ref());
        self.click_listener = Some(listener);
    }

    fn add_marker(&mut self, at: Coordinates, popup: &MarkerPopup) {
        let opts = PopupOptions::default();
        opts.set_max_width(250.);
        opts.set_min_width(100.);
        opts.set_auto_close(false);
        opts.set_close_on_click(false);
        opts.set_class_name(popup.class_name.clone());

        let content = Popup::new(&opts, None);
        content.set_content(&popup.text.as_str().into());

        let marker = Marker::new(&lat_lng(at));
        marker.add_to(&self.map);
        marker.bind_popup(&content);
        marker.open_popup();
    }

    fn recenter(&mut self, center: Coordinates, zoom: f64) {
        self.map.set_view(&lat_lng(center), zoom);
    }
}
