//! Conversion of pollutant concentrations to a US EPA-style 0–500 AQI.
//!
//! Two conversions coexist and are not expected to agree:
//! - [`to_aqi`] interpolates PM2.5 and PM10 over fixed breakpoint tables and
//!   keeps the worse of the two.
//! - [`approximate_from_index`] scales the provider's 1–5 index by 50.

use serde::{Deserialize, Serialize};

use crate::{config::Locale, model::Components};

pub const MAX_AQI: u16 = 500;

/// Multiplier turning the provider's 1–5 index into a rough 0–500 score.
pub const INDEX_SCALE: u16 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthySensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    /// Lower bounds are inclusive: 50 is Good, 51 is Moderate.
    pub fn from_score(score: u16) -> Self {
        match score {
            0..=50 => AqiCategory::Good,
            51..=100 => AqiCategory::Moderate,
            101..=150 => AqiCategory::UnhealthySensitive,
            151..=200 => AqiCategory::Unhealthy,
            201..=300 => AqiCategory::VeryUnhealthy,
            _ => AqiCategory::Hazardous,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthySensitive => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    pub fn color_hex(&self) -> &'static str {
        match self {
            AqiCategory::Good => "#3A7D44",
            AqiCategory::Moderate => "#D5A021",
            AqiCategory::UnhealthySensitive => "#FF9800",
            AqiCategory::Unhealthy => "#B55239",
            AqiCategory::VeryUnhealthy => "#9C27B0",
            AqiCategory::Hazardous => "#7B1FA2",
        }
    }

    /// Short health guidance for the category.
    pub fn advice(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (AqiCategory::Good, Locale::En) => {
                "Air quality is good. Clean air, fine for outdoor activity."
            }
            (AqiCategory::Good, Locale::Id) => {
                "Kualitas udara baik. Udara bersih dan sehat untuk aktivitas outdoor."
            }
            (AqiCategory::Moderate, Locale::En) => {
                "Air quality is moderate. Acceptable for most people."
            }
            (AqiCategory::Moderate, Locale::Id) => {
                "Kualitas udara sedang. Dapat diterima untuk sebagian besar orang."
            }
            (AqiCategory::UnhealthySensitive, Locale::En) => {
                "Unhealthy for sensitive groups. Limit strenuous outdoor activity."
            }
            (AqiCategory::UnhealthySensitive, Locale::Id) => {
                "Tidak sehat untuk kelompok sensitif. Batasi aktivitas outdoor yang berat."
            }
            (AqiCategory::Unhealthy, Locale::En) => {
                "Unhealthy. Everyone may begin to experience health effects."
            }
            (AqiCategory::Unhealthy, Locale::Id) => {
                "Tidak sehat. Semua orang mungkin mengalami efek kesehatan."
            }
            (AqiCategory::VeryUnhealthy, Locale::En) => {
                "Very unhealthy. Health alert: everyone may be affected."
            }
            (AqiCategory::VeryUnhealthy, Locale::Id) => {
                "Sangat tidak sehat. Peringatan kesehatan: semua orang dapat terkena dampak."
            }
            (AqiCategory::Hazardous, Locale::En) => {
                "Hazardous. Health emergency: avoid outdoor activity."
            }
            (AqiCategory::Hazardous, Locale::Id) => {
                "Berbahaya. Peringatan darurat kesehatan: hindari aktivitas outdoor."
            }
        }
    }
}

impl std::fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AqiResult {
    pub score: u16,
    pub category: AqiCategory,
}

impl AqiResult {
    pub fn from_score(score: u16) -> Self {
        let score = score.min(MAX_AQI);
        Self { score, category: AqiCategory::from_score(score) }
    }
}

/// One bracket: concentrations in `(conc_lo, conc_hi]` map linearly onto `(aqi_lo, aqi_hi]`.
#[derive(Debug, Clone, Copy)]
struct Breakpoint {
    conc_lo: f64,
    conc_hi: f64,
    aqi_lo: f64,
    aqi_hi: f64,
}

const fn bp(conc_lo: f64, conc_hi: f64, aqi_lo: f64, aqi_hi: f64) -> Breakpoint {
    Breakpoint { conc_lo, conc_hi, aqi_lo, aqi_hi }
}

const PM25_BREAKPOINTS: [Breakpoint; 6] = [
    bp(0.0, 12.0, 0.0, 50.0),
    bp(12.0, 35.4, 50.0, 100.0),
    bp(35.4, 55.4, 100.0, 150.0),
    bp(55.4, 150.4, 150.0, 200.0),
    bp(150.4, 250.4, 200.0, 300.0),
    bp(250.4, 500.0, 300.0, 500.0),
];

const PM10_BREAKPOINTS: [Breakpoint; 6] = [
    bp(0.0, 54.0, 0.0, 50.0),
    bp(54.0, 154.0, 50.0, 100.0),
    bp(154.0, 254.0, 100.0, 150.0),
    bp(254.0, 354.0, 150.0, 200.0),
    bp(354.0, 424.0, 200.0, 300.0),
    bp(424.0, 604.0, 300.0, 500.0),
];

fn sub_index(conc: f64, table: &[Breakpoint]) -> u16 {
    // NaN and negative readings contribute nothing.
    let conc = if conc > 0.0 { conc } else { 0.0 };

    let Some(bracket) = table.iter().find(|b| conc <= b.conc_hi).or_else(|| table.last()) else {
        return 0;
    };

    let slope = (bracket.aqi_hi - bracket.aqi_lo) / (bracket.conc_hi - bracket.conc_lo);
    let value = bracket.aqi_lo + slope * (conc - bracket.conc_lo);

    value.round().clamp(0.0, f64::from(MAX_AQI)) as u16
}

/// AQI sub-index for a PM2.5 concentration (µg/m³).
pub fn pm25_sub_index(pm2_5: f64) -> u16 {
    sub_index(pm2_5, &PM25_BREAKPOINTS)
}

/// AQI sub-index for a PM10 concentration (µg/m³).
pub fn pm10_sub_index(pm10: f64) -> u16 {
    sub_index(pm10, &PM10_BREAKPOINTS)
}

/// Headline AQI from pollutant components: the worse of the PM2.5 and PM10 sub-indices.
pub fn to_aqi(components: &Components) -> AqiResult {
    let score = pm25_sub_index(components.pm2_5).max(pm10_sub_index(components.pm10));
    AqiResult::from_score(score)
}

/// Rough 0–500 score straight from the provider's 1–5 index (`index * 50`).
pub fn approximate_from_index(foreign_index: u8) -> AqiResult {
    AqiResult::from_score(u16::from(foreign_index).saturating_mul(INDEX_SCALE))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pm(pm2_5: f64, pm10: f64) -> Components {
        Components { pm2_5, pm10, ..Components::default() }
    }

    #[test]
    fn zero_components_are_good() {
        let result = to_aqi(&pm(0.0, 0.0));
        assert_eq!(result.score, 0);
        assert_eq!(result.category, AqiCategory::Good);
    }

    #[test]
    fn pm25_bracket_edges() {
        assert_eq!(to_aqi(&pm(12.0, 0.0)).score, 50);
        assert_eq!(to_aqi(&pm(35.4, 0.0)).score, 100);
        assert_eq!(to_aqi(&pm(55.4, 0.0)).score, 150);
        assert_eq!(to_aqi(&pm(150.4, 0.0)).score, 200);
        assert_eq!(to_aqi(&pm(250.4, 0.0)).score, 300);
        assert_eq!(to_aqi(&pm(500.0, 0.0)).score, 500);
    }

    #[test]
    fn pm10_bracket_edges() {
        assert_eq!(pm10_sub_index(54.0), 50);
        assert_eq!(pm10_sub_index(154.0), 100);
        assert_eq!(pm10_sub_index(254.0), 150);
        assert_eq!(pm10_sub_index(354.0), 200);
        assert_eq!(pm10_sub_index(424.0), 300);
        assert_eq!(pm10_sub_index(604.0), 500);
    }

    #[test]
    fn interpolates_within_bracket() {
        // 50 + 50/23.4 * 11.7 = 75
        assert_eq!(pm25_sub_index(23.7), 75);
        // 50 + 0.5 * 50 = 75
        assert_eq!(pm10_sub_index(104.0), 75);
    }

    #[test]
    fn brackets_are_continuous_at_edges() {
        for table in [&PM25_BREAKPOINTS[..], &PM10_BREAKPOINTS[..]] {
            for pair in table.windows(2) {
                let (lower, upper) = (pair[0], pair[1]);
                let from_lower = lower.aqi_lo
                    + (lower.aqi_hi - lower.aqi_lo) / (lower.conc_hi - lower.conc_lo)
                        * (lower.conc_hi - lower.conc_lo);
                let from_upper = upper.aqi_lo
                    + (upper.aqi_hi - upper.aqi_lo) / (upper.conc_hi - upper.conc_lo)
                        * (lower.conc_hi - upper.conc_lo);
                assert!((from_lower - from_upper).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn dominant_pollutant_governs() {
        let result = to_aqi(&pm(5.0, 200.0));
        assert_eq!(result.score, pm10_sub_index(200.0));
        assert_eq!(result.category, AqiCategory::UnhealthySensitive);
    }

    #[test]
    fn monotonic_and_bounded() {
        let mut prev = 0;
        let mut conc = 0.0;
        while conc <= 500.0 {
            let score = to_aqi(&pm(conc, 0.0)).score;
            assert!(score >= prev, "pm2.5 {conc}: {score} < {prev}");
            assert!(score <= MAX_AQI);
            prev = score;
            conc += 0.1;
        }

        let mut prev = 0;
        let mut conc = 0.0;
        while conc <= 604.0 {
            let score = to_aqi(&pm(0.0, conc)).score;
            assert!(score >= prev, "pm10 {conc}: {score} < {prev}");
            assert!(score <= MAX_AQI);
            prev = score;
            conc += 0.5;
        }
    }

    #[test]
    fn out_of_domain_values_are_clamped() {
        assert_eq!(to_aqi(&pm(-3.0, f64::NAN)).score, 0);
        assert_eq!(to_aqi(&pm(900.0, 0.0)).score, MAX_AQI);
        assert_eq!(to_aqi(&pm(0.0, f64::INFINITY)).score, MAX_AQI);
    }

    #[test]
    fn category_boundaries() {
        assert_eq!(AqiCategory::from_score(50), AqiCategory::Good);
        assert_eq!(AqiCategory::from_score(51), AqiCategory::Moderate);
        assert_eq!(AqiCategory::from_score(100), AqiCategory::Moderate);
        assert_eq!(AqiCategory::from_score(101), AqiCategory::UnhealthySensitive);
        assert_eq!(AqiCategory::from_score(150), AqiCategory::UnhealthySensitive);
        assert_eq!(AqiCategory::from_score(151), AqiCategory::Unhealthy);
        assert_eq!(AqiCategory::from_score(200), AqiCategory::Unhealthy);
        assert_eq!(AqiCategory::from_score(201), AqiCategory::VeryUnhealthy);
        assert_eq!(AqiCategory::from_score(300), AqiCategory::VeryUnhealthy);
        assert_eq!(AqiCategory::from_score(301), AqiCategory::Hazardous);
    }

    #[test]
    fn index_approximation_is_linear() {
        assert_eq!(approximate_from_index(1).score, 50);
        assert_eq!(approximate_from_index(3).score, 150);
        assert_eq!(approximate_from_index(5).category, AqiCategory::VeryUnhealthy);
        assert_eq!(approximate_from_index(255).score, MAX_AQI);
    }

    #[test]
    fn conversions_may_disagree() {
        // Provider index 2 says 100, components say 0.
        let components = pm(0.0, 0.0);
        assert_ne!(to_aqi(&components).score, approximate_from_index(2).score);
    }
}
