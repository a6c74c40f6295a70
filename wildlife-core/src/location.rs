//! Free-text location to coordinates.
//!
//! Only one place is known. Every other input resolves to it as well, but the
//! [`Resolution`] records whether the lookup actually matched.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

const NEW_YORK: Coordinates = Coordinates {
    lat: 40.71,
    lon: -74.01,
};

/// Key substituted on a lookup miss.
pub const DEFAULT_KEY: &str = "newyork";

/// Keys are stored normalized. `"new york"` can never be produced by
/// [`normalize`] and is kept only as a documented synonym.
static COORDINATE_TABLE: &[(&str, Coordinates)] = &[
    ("new york", NEW_YORK),
    ("newyork", NEW_YORK),
    ("ny", NEW_YORK),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationMatch {
    Known,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    /// Location exactly as the caller supplied it.
    pub query: String,
    /// Table key that produced the coordinates.
    pub key: &'static str,
    pub coordinates: Coordinates,
    pub matched: LocationMatch,
}

impl Resolution {
    pub fn is_fallback(&self) -> bool {
        self.matched == LocationMatch::Fallback
    }
}

/// Lowercase and drop every ASCII space.
pub fn normalize(location: &str) -> String {
    location.to_lowercase().replace(' ', "")
}

fn lookup(key: &str) -> Option<(&'static str, Coordinates)> {
    COORDINATE_TABLE
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(k, c)| (*k, *c))
}

pub fn default_coordinates() -> Coordinates {
    NEW_YORK
}

pub fn resolve(location: &str) -> Resolution {
    let normalized = normalize(location);

    match lookup(&normalized) {
        Some((key, coordinates)) => {
            tracing::debug!(location, key, "Resolved location");
            Resolution {
                query: location.to_string(),
                key,
                coordinates,
                matched: LocationMatch::Known,
            }
        }
        None => {
            tracing::info!(
                location,
                fallback = DEFAULT_KEY,
                "Unknown location, using default coordinates"
            );
            Resolution {
                query: location.to_string(),
                key: DEFAULT_KEY,
                coordinates: default_coordinates(),
                matched: LocationMatch::Fallback,
            }
        }
    }
}
