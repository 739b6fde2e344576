use thiserror::Error;

use crate::config::Locale;

/// Failure kinds surfaced by every operation of the core.
///
/// Each call is all-or-nothing: an `Err` never carries partial data.
#[derive(Debug, Error)]
pub enum AirQualityError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("nothing found for \"{0}\"")]
    NotFound(String),

    #[error("{}", describe_upstream(.status, .detail))]
    Upstream { status: Option<u16>, detail: String },

    #[error("operation cancelled")]
    Cancelled,

    #[error("geolocation is not supported on this device")]
    Unsupported,

    #[error("location access was denied")]
    PermissionDenied,

    #[error("location could not be determined")]
    PositionUnavailable,

    #[error("timed out while acquiring location")]
    Timeout,

    #[error("failed to acquire location: {0}")]
    Unknown(String),
}

fn describe_upstream(status: &Option<u16>, detail: &str) -> String {
    match status {
        Some(code) => format!("upstream request failed with status {code}: {detail}"),
        None => format!("upstream request failed: {detail}"),
    }
}

impl AirQualityError {
    pub(crate) fn upstream(status: Option<u16>, detail: impl Into<String>) -> Self {
        AirQualityError::Upstream { status, detail: detail.into() }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, AirQualityError::Cancelled)
    }

    /// HTTP status carried by an upstream failure, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            AirQualityError::Upstream { status, .. } => *status,
            _ => None,
        }
    }

    /// Human-readable message for end users.
    ///
    /// Returns `None` for [`AirQualityError::Cancelled`]: a cancellation is
    /// never shown as an error.
    pub fn user_message(&self, locale: Locale) -> Option<String> {
        let msg = match (self, locale) {
            (AirQualityError::Cancelled, _) => return None,

            (AirQualityError::InvalidInput(_), Locale::En) => {
                "Please enter a city name.".to_string()
            }
            (AirQualityError::InvalidInput(_), Locale::Id) => {
                "Silakan masukkan nama kota.".to_string()
            }

            (AirQualityError::NotFound(name), Locale::En) => {
                format!("No results found for \"{name}\". Check the spelling and try again.")
            }
            (AirQualityError::NotFound(name), Locale::Id) => {
                format!("\"{name}\" tidak ditemukan. Periksa ejaan dan coba lagi.")
            }

            (AirQualityError::Upstream { status: Some(code), .. }, Locale::En) => {
                format!("Failed to fetch data from the air quality service (HTTP {code}). Please try again.")
            }
            (AirQualityError::Upstream { status: Some(code), .. }, Locale::Id) => {
                format!("Gagal mengambil data dari layanan kualitas udara (HTTP {code}). Silakan coba lagi.")
            }
            (AirQualityError::Upstream { status: None, .. }, Locale::En) => {
                "Could not reach the air quality service. Check your connection and try again."
                    .to_string()
            }
            (AirQualityError::Upstream { status: None, .. }, Locale::Id) => {
                "Tidak dapat terhubung ke layanan kualitas udara. Periksa koneksi Anda dan coba lagi."
                    .to_string()
            }

            (AirQualityError::Unsupported, Locale::En) => {
                "Geolocation is not supported on this device. Search by city name instead."
                    .to_string()
            }
            (AirQualityError::Unsupported, Locale::Id) => {
                "Geolocation tidak didukung oleh perangkat ini. Gunakan pencarian manual dengan nama kota."
                    .to_string()
            }

            (AirQualityError::PermissionDenied, Locale::En) => {
                "Location access was denied. Allow location access in your settings, or search by city name instead."
                    .to_string()
            }
            (AirQualityError::PermissionDenied, Locale::Id) => {
                "Akses lokasi ditolak. Silakan izinkan akses lokasi di pengaturan Anda, atau gunakan pencarian manual dengan nama kota."
                    .to_string()
            }

            (AirQualityError::PositionUnavailable, Locale::En) => {
                "Your location could not be detected. Enable GPS or location services, or search by city name instead."
                    .to_string()
            }
            (AirQualityError::PositionUnavailable, Locale::Id) => {
                "Lokasi tidak dapat dideteksi. Silakan aktifkan GPS/WiFi atau gunakan pencarian manual dengan nama kota."
                    .to_string()
            }

            (AirQualityError::Timeout, Locale::En) => {
                "Timed out while finding your location. Try again, or search by city name instead."
                    .to_string()
            }
            (AirQualityError::Timeout, Locale::Id) => {
                "Waktu tunggu habis saat mencari lokasi. Silakan coba lagi atau gunakan pencarian manual dengan nama kota."
                    .to_string()
            }

            (AirQualityError::Unknown(_), Locale::En) => {
                "Something went wrong while getting your location. Search by city name instead."
                    .to_string()
            }
            (AirQualityError::Unknown(_), Locale::Id) => {
                "Terjadi kesalahan saat mengambil lokasi. Silakan gunakan pencarian manual dengan nama kota."
                    .to_string()
            }
        };

        Some(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_has_no_user_message() {
        for locale in Locale::all() {
            assert!(AirQualityError::Cancelled.user_message(*locale).is_none());
        }
    }

    #[test]
    fn geolocation_messages_suggest_manual_search() {
        let kinds = [
            AirQualityError::Unsupported,
            AirQualityError::PermissionDenied,
            AirQualityError::PositionUnavailable,
            AirQualityError::Timeout,
            AirQualityError::Unknown("boom".into()),
        ];

        for kind in &kinds {
            let en = kind.user_message(Locale::En).expect("has message");
            assert!(en.contains("city name"), "{en}");

            let id = kind.user_message(Locale::Id).expect("has message");
            assert!(id.contains("nama kota"), "{id}");
        }
    }

    #[test]
    fn upstream_display_includes_status_when_present() {
        let err = AirQualityError::upstream(Some(401), "Invalid API key");
        assert_eq!(err.status(), Some(401));
        assert_eq!(
            err.to_string(),
            "upstream request failed with status 401: Invalid API key"
        );

        let err = AirQualityError::upstream(None, "connection refused");
        assert_eq!(err.status(), None);
        assert!(err.to_string().ends_with("failed: connection refused"));
    }
}
