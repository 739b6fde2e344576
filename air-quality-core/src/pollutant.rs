use anyhow::anyhow;

use crate::{config::Locale, model::Components};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pollutant {
    Pm25,
    Pm10,
    Co,
    No2,
    So2,
    O3,
}

impl Pollutant {
    pub const fn all() -> &'static [Pollutant] {
        &[
            Pollutant::Pm25,
            Pollutant::Pm10,
            Pollutant::Co,
            Pollutant::No2,
            Pollutant::So2,
            Pollutant::O3,
        ]
    }

    /// Short key used on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "pm25",
            Pollutant::Pm10 => "pm10",
            Pollutant::Co => "co",
            Pollutant::No2 => "no2",
            Pollutant::So2 => "so2",
            Pollutant::O3 => "o3",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::Co => "CO",
            Pollutant::No2 => "NO₂",
            Pollutant::So2 => "SO₂",
            Pollutant::O3 => "O₃",
        }
    }

    pub fn unit(&self) -> &'static str {
        "μg/m³"
    }

    pub fn value(&self, components: &Components) -> f64 {
        match self {
            Pollutant::Pm25 => components.pm2_5,
            Pollutant::Pm10 => components.pm10,
            Pollutant::Co => components.co,
            Pollutant::No2 => components.no2,
            Pollutant::So2 => components.so2,
            Pollutant::O3 => components.o3,
        }
    }
}

impl std::fmt::Display for Pollutant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<&str> for Pollutant {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase().replace(['.', '_'], "");
        Pollutant::all()
            .iter()
            .copied()
            .find(|p| p.key() == lower)
            .ok_or_else(|| {
                anyhow!("Unknown pollutant '{value}'. Supported: pm25, pm10, co, no2, so2, o3.")
            })
    }
}

/// Pollutant families used to narrow what a view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PollutantGroup {
    #[default]
    All,
    /// Particulates and ozone.
    Air,
    /// Vehicle exhaust.
    Emission,
    /// Fuel burning and industry.
    Industrial,
}

impl PollutantGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollutantGroup::All => "all",
            PollutantGroup::Air => "air",
            PollutantGroup::Emission => "emission",
            PollutantGroup::Industrial => "industrial",
        }
    }

    pub const fn all() -> &'static [PollutantGroup] {
        &[
            PollutantGroup::All,
            PollutantGroup::Air,
            PollutantGroup::Emission,
            PollutantGroup::Industrial,
        ]
    }

    pub fn members(&self) -> &'static [Pollutant] {
        match self {
            PollutantGroup::All => Pollutant::all(),
            PollutantGroup::Air => &[Pollutant::Pm25, Pollutant::Pm10, Pollutant::O3],
            PollutantGroup::Emission => &[Pollutant::Co, Pollutant::No2],
            PollutantGroup::Industrial => &[Pollutant::So2, Pollutant::No2],
        }
    }

    pub fn contains(&self, pollutant: Pollutant) -> bool {
        self.members().contains(&pollutant)
    }

    pub fn insight(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (PollutantGroup::All, Locale::En) => {
                "All available pollutants: fine particles (PM2.5, PM10), harmful gases (CO, NO₂, SO₂) and ozone (O₃)."
            }
            (PollutantGroup::All, Locale::Id) => {
                "Semua data polutan yang tersedia: partikel halus (PM2.5, PM10), gas berbahaya (CO, NO₂, SO₂), dan ozon (O₃)."
            }
            (PollutantGroup::Air, Locale::En) => {
                "PM2.5 and PM10 are fine particles that reach deep into the lungs. Ground-level ozone irritates the airways. Avoid outdoor activity when levels are high."
            }
            (PollutantGroup::Air, Locale::Id) => {
                "PM2.5 dan PM10 adalah partikel halus yang dapat menembus paru-paru. Ozon (O₃) di permukaan dapat menyebabkan iritasi pernapasan. Hindari aktivitas outdoor saat levelnya tinggi."
            }
            (PollutantGroup::Emission, Locale::En) => {
                "CO and NO₂ come mostly from motor vehicles. High levels cause breathing problems and reduce the blood's oxygen capacity."
            }
            (PollutantGroup::Emission, Locale::Id) => {
                "CO dan NO₂ terutama berasal dari kendaraan bermotor. Tingkat tinggi dapat menyebabkan masalah pernapasan dan mengurangi kapasitas oksigen darah."
            }
            (PollutantGroup::Industrial, Locale::En) => {
                "SO₂ comes mainly from burning coal and oil; industry also produces NO₂. Both contribute to acid rain and respiratory problems."
            }
            (PollutantGroup::Industrial, Locale::Id) => {
                "SO₂ terutama dari pembakaran batu bara dan minyak. NO₂ juga diproduksi oleh industri. Keduanya dapat menyebabkan hujan asam dan masalah pernapasan."
            }
        }
    }
}

impl TryFrom<&str> for PollutantGroup {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();
        PollutantGroup::all()
            .iter()
            .copied()
            .find(|g| g.as_str() == lower)
            .ok_or_else(|| {
                anyhow!("Unknown group '{value}'. Supported: all, air, emission, industrial.")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pollutant_keys_parse_loosely() {
        assert_eq!(Pollutant::try_from("PM2.5").expect("parses"), Pollutant::Pm25);
        assert_eq!(Pollutant::try_from("pm2_5").expect("parses"), Pollutant::Pm25);
        assert_eq!(Pollutant::try_from("NO2").expect("parses"), Pollutant::No2);
        assert!(Pollutant::try_from("lead").is_err());
    }

    #[test]
    fn value_reads_matching_component() {
        let c = Components { pm2_5: 1.0, pm10: 2.0, co: 3.0, no2: 4.0, so2: 5.0, o3: 6.0, ..Default::default() };
        let values: Vec<f64> = Pollutant::all().iter().map(|p| p.value(&c)).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn group_membership() {
        assert_eq!(PollutantGroup::All.members().len(), 6);
        assert!(PollutantGroup::Air.contains(Pollutant::O3));
        assert!(!PollutantGroup::Air.contains(Pollutant::Co));
        assert!(PollutantGroup::Emission.contains(Pollutant::No2));
        assert!(PollutantGroup::Industrial.contains(Pollutant::No2));
        assert!(PollutantGroup::Industrial.contains(Pollutant::So2));
    }

    #[test]
    fn group_roundtrip() {
        for group in PollutantGroup::all() {
            assert_eq!(PollutantGroup::try_from(group.as_str()).expect("roundtrip"), *group);
        }
    }
}
