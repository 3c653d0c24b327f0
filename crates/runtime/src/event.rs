use foundation::LngLat;
use layers::LayerId;
use serde_json::{Map, Value};

/// A rendered feature under the pointer, as reported by the map engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feature {
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn new(properties: Map<String, Value>) -> Self {
        Self { properties }
    }

    /// Builds a feature from a JSON object; anything else gives an empty bag.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(properties) => Self { properties },
            _ => Self::default(),
        }
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

/// Everything a viewer session reacts to.
///
/// Engine adapters translate their native callbacks into these and hand them
/// to the session in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// The engine finished loading its base style.
    Ready,
    /// Click on a subscribed layer. `features` is topmost-first.
    Click {
        layer: LayerId,
        at: LngLat,
        features: Vec<Feature>,
    },
    /// A checkbox control changed state.
    ControlChanged { control: String, checked: bool },
}

impl MapEvent {
    /// Assembles a click from the pieces an engine callback carries: the
    /// pointer position and each hit feature's property object.
    ///
    /// Without a full position there is nothing to anchor a popup to.
    pub fn click(
        layer: LayerId,
        lng: Option<f64>,
        lat: Option<f64>,
        properties: impl IntoIterator<Item = Value>,
    ) -> Option<Self> {
        Some(MapEvent::Click {
            layer,
            at: LngLat::new(lng?, lat?),
            features: properties.into_iter().map(Feature::from_value).collect(),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MapEvent::Ready => "ready",
            MapEvent::Click { .. } => "click",
            MapEvent::ControlChanged { .. } => "control",
        }
    }
}
