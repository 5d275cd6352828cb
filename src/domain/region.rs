//! California Health Service Areas and the county lookup table.

use serde::{Deserialize, Serialize};

/// One of the fourteen California Health Service Areas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HsaRegion {
    NorthernCalifornia,
    GoldenEmpire,
    NorthBay,
    WestBay,
    EastBay,
    NorthSanJoaquin,
    SantaClara,
    MidCoast,
    Central,
    SantaBarbaraVentura,
    #[default]
    LosAngeles,
    OrangeCounty,
    InlandEmpire,
    SanDiegoImperial,
}

impl HsaRegion {
    /// All regions in code order.
    pub const ALL: [HsaRegion; 14] = [
        Self::NorthernCalifornia,
        Self::GoldenEmpire,
        Self::NorthBay,
        Self::WestBay,
        Self::EastBay,
        Self::NorthSanJoaquin,
        Self::SantaClara,
        Self::MidCoast,
        Self::Central,
        Self::SantaBarbaraVentura,
        Self::LosAngeles,
        Self::OrangeCounty,
        Self::InlandEmpire,
        Self::SanDiegoImperial,
    ];

    /// Label sent to the prediction service, e.g. `11 - Los Angeles`.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::NorthernCalifornia => "01 - Northern California",
            Self::GoldenEmpire => "02 - Golden Empire",
            Self::NorthBay => "03 - North Bay",
            Self::WestBay => "04 - West Bay",
            Self::EastBay => "05 - East Bay",
            Self::NorthSanJoaquin => "06 - North San Joaquin",
            Self::SantaClara => "07 - Santa Clara",
            Self::MidCoast => "08 - Mid-Coast",
            Self::Central => "09 - Central",
            Self::SantaBarbaraVentura => "10 - Santa Barbara/Ventura",
            Self::LosAngeles => "11 - Los Angeles",
            Self::OrangeCounty => "12 - Orange County",
            Self::InlandEmpire => "13 - Inland Empire",
            Self::SanDiegoImperial => "14 - San Diego/Imperial",
        }
    }

    /// Parse a label back into a region.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|r| r.label() == label)
    }
}

impl std::fmt::Display for HsaRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// County → HSA lookup covering all 58 California counties.
pub const COUNTY_REGIONS: [(&str, HsaRegion); 58] = [
    ("Shasta", HsaRegion::NorthernCalifornia),
    ("Tehama", HsaRegion::NorthernCalifornia),
    ("Butte", HsaRegion::NorthernCalifornia),
    ("Glenn", HsaRegion::NorthernCalifornia),
    ("Lassen", HsaRegion::NorthernCalifornia),
    ("Modoc", HsaRegion::NorthernCalifornia),
    ("Plumas", HsaRegion::NorthernCalifornia),
    ("Siskiyou", HsaRegion::NorthernCalifornia),
    ("Trinity", HsaRegion::NorthernCalifornia),
    ("Colusa", HsaRegion::NorthernCalifornia),
    ("Del Norte", HsaRegion::NorthernCalifornia),
    ("Humboldt", HsaRegion::NorthernCalifornia),
    ("Lake", HsaRegion::NorthernCalifornia),
    ("Mendocino", HsaRegion::NorthernCalifornia),
    ("Placer", HsaRegion::GoldenEmpire),
    ("El Dorado", HsaRegion::GoldenEmpire),
    ("Nevada", HsaRegion::GoldenEmpire),
    ("Sierra", HsaRegion::GoldenEmpire),
    ("Yuba", HsaRegion::GoldenEmpire),
    ("Sutter", HsaRegion::GoldenEmpire),
    ("Marin", HsaRegion::NorthBay),
    ("Napa", HsaRegion::NorthBay),
    ("Sonoma", HsaRegion::NorthBay),
    ("Solano", HsaRegion::NorthBay),
    ("San Francisco", HsaRegion::WestBay),
    ("San Mateo", HsaRegion::WestBay),
    ("Alameda", HsaRegion::EastBay),
    ("Contra Costa", HsaRegion::EastBay),
    ("Sacramento", HsaRegion::NorthSanJoaquin),
    ("San Joaquin", HsaRegion::NorthSanJoaquin),
    ("Stanislaus", HsaRegion::NorthSanJoaquin),
    ("Yolo", HsaRegion::NorthSanJoaquin),
    ("Amador", HsaRegion::NorthSanJoaquin),
    ("Calaveras", HsaRegion::NorthSanJoaquin),
    ("Santa Clara", HsaRegion::SantaClara),
    ("Monterey", HsaRegion::MidCoast),
    ("San Luis Obispo", HsaRegion::MidCoast),
    ("Santa Cruz", HsaRegion::MidCoast),
    ("San Benito", HsaRegion::MidCoast),
    ("Fresno", HsaRegion::Central),
    ("Kern", HsaRegion::Central),
    ("Tulare", HsaRegion::Central),
    ("Kings", HsaRegion::Central),
    ("Madera", HsaRegion::Central),
    ("Merced", HsaRegion::Central),
    ("Mariposa", HsaRegion::Central),
    ("Tuolumne", HsaRegion::Central),
    ("Alpine", HsaRegion::Central),
    ("Mono", HsaRegion::Central),
    ("Inyo", HsaRegion::Central),
    ("Santa Barbara", HsaRegion::SantaBarbaraVentura),
    ("Ventura", HsaRegion::SantaBarbaraVentura),
    ("Los Angeles", HsaRegion::LosAngeles),
    ("Orange", HsaRegion::OrangeCounty),
    ("Riverside", HsaRegion::InlandEmpire),
    ("San Bernardino", HsaRegion::InlandEmpire),
    ("San Diego", HsaRegion::SanDiegoImperial),
    ("Imperial", HsaRegion::SanDiegoImperial),
];

/// Quick-pick counties shown at the top of the picker.
pub const MAJOR_COUNTIES: [&str; 10] = [
    "Los Angeles",
    "San Francisco",
    "San Diego",
    "Orange",
    "Riverside",
    "Sacramento",
    "Alameda",
    "Santa Clara",
    "Fresno",
    "Kern",
];

/// Look up the HSA for a county name (exact match).
#[must_use]
pub fn region_for_county(county: &str) -> Option<HsaRegion> {
    COUNTY_REGIONS
        .iter()
        .find(|(name, _)| *name == county)
        .map(|(_, region)| *region)
}

/// Picker order: major counties first, then the rest alphabetically.
#[must_use]
pub fn picker_counties() -> Vec<&'static str> {
    let mut rest: Vec<&'static str> = COUNTY_REGIONS
        .iter()
        .map(|(name, _)| *name)
        .filter(|name| !MAJOR_COUNTIES.contains(name))
        .collect();
    rest.sort_unstable();

    MAJOR_COUNTIES.iter().copied().chain(rest).collect()
}

/// Region selection with a hover cursor over the county picker.
#[derive(Debug, Clone)]
pub struct RegionSelector {
    selected: HsaRegion,
    counties: Vec<&'static str>,
    cursor: usize,
}

impl RegionSelector {
    #[must_use]
    pub fn new(selected: HsaRegion) -> Self {
        Self {
            selected,
            counties: picker_counties(),
            cursor: 0,
        }
    }

    #[must_use]
    pub fn selected(&self) -> HsaRegion {
        self.selected
    }

    /// Select the region of `county`. Unmapped names leave the selection as is.
    pub fn select_county(&mut self, county: &str) -> Option<HsaRegion> {
        let region = region_for_county(county)?;
        self.selected = region;
        Some(region)
    }

    /// County under the cursor and its region.
    #[must_use]
    pub fn hovered(&self) -> (&'static str, Option<HsaRegion>) {
        let county = self.counties[self.cursor];
        (county, region_for_county(county))
    }

    #[must_use]
    pub fn counties(&self) -> &[&'static str] {
        &self.counties
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn next(&mut self) {
        self.cursor = (self.cursor + 1) % self.counties.len();
    }

    pub fn prev(&mut self) {
        if self.cursor == 0 {
            self.cursor = self.counties.len() - 1;
        } else {
            self.cursor -= 1;
        }
    }

    /// Whether `county` belongs to the selected region.
    #[must_use]
    pub fn is_selected(&self, county: &str) -> bool {
        region_for_county(county) == Some(self.selected)
    }
}

impl Default for RegionSelector {
    fn default() -> Self {
        Self::new(HsaRegion::default())
    }
}
