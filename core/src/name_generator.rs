//! Deterministic fake identities: people, companies, addresses.
//!
//! All generation draws from the caller's SimRng, so the same
//! seed always yields the same customers and headquarters.

use crate::{
    company::{GeoPoint, PostalAddress},
    rng::SimRng,
};

/// (city, region, country, lat, lon)
type City = (&'static str, &'static str, &'static str, f64, f64);

pub struct NameGenerator;

impl NameGenerator {
    pub fn full_name(rng: &mut SimRng) -> String {
        format!("{} {}", Self::pick(rng, FIRST_NAMES), Self::pick(rng, LAST_NAMES))
    }

    /// "ada.byron42@example.org"-style address derived from a full name.
    pub fn email_for(name: &str, rng: &mut SimRng) -> String {
        let local = name.to_lowercase().replace(' ', ".");
        let domain = Self::pick(rng, MAIL_DOMAINS);
        format!("{local}{}@{domain}", rng.next_u64_below(100))
    }

    pub fn company_name(rng: &mut SimRng) -> String {
        if rng.chance(0.5) {
            format!("{} {}", Self::pick(rng, COMPANY_STEMS), Self::pick(rng, COMPANY_SUFFIXES))
        } else {
            format!(
                "{} & {} {}",
                Self::pick(rng, LAST_NAMES),
                Self::pick(rng, LAST_NAMES),
                Self::pick(rng, COMPANY_SUFFIXES)
            )
        }
    }

    /// A street address in one of the known cities, jittered within ~10 km.
    pub fn address(rng: &mut SimRng) -> PostalAddress {
        let idx = rng.next_u64_below(CITIES.len() as u64) as usize;
        let (city, region, country, lat, lon) = CITIES[idx];
        PostalAddress {
            street:   format!("{} {}", 1 + rng.next_u64_below(250), Self::pick(rng, STREETS)),
            city:     city.to_string(),
            region:   region.to_string(),
            country:  country.to_string(),
            zip_code: format!("{:05}", rng.next_u64_below(100_000)),
            location: GeoPoint::new(lat + rng.range_f64(-0.1, 0.1), lon + rng.range_f64(-0.1, 0.1)),
        }
    }

    fn pick(rng: &mut SimRng, list: &'static [&'static str]) -> &'static str {
        list[rng.next_u64_below(list.len() as u64) as usize]
    }
}

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Amara", "Bjorn", "Camille", "Chen", "Dario", "Elena", "Farah", "Gustav",
    "Hana", "Ines", "Jonas", "Kemal", "Lena", "Mateo", "Nadia", "Oskar", "Priya", "Quentin",
    "Rosa", "Sven", "Tariq", "Ulla", "Viktor", "Wen", "Yara", "Zoltan",
];

const LAST_NAMES: &[&str] = &[
    "Andersen", "Becker", "Costa", "Dubois", "Eriksen", "Fischer", "Garcia", "Haddad",
    "Ivanova", "Jensen", "Kowalski", "Laurent", "Moreau", "Novak", "Okafor", "Petrov",
    "Quinn", "Rossi", "Schmidt", "Tanaka", "Ueda", "Vogel", "Weber", "Yilmaz", "Zhang",
];

const MAIL_DOMAINS: &[&str] = &["example.org", "example.com", "mail.test", "post.test"];

const COMPANY_STEMS: &[&str] = &[
    "Northwind", "Bluewater", "Ironbridge", "Harbor", "Summit", "Meridian", "Keystone",
    "Silverline", "Evergreen", "Crossroads",
];

const COMPANY_SUFFIXES: &[&str] = &[
    "Logistics", "Trading", "Freight", "Distribution", "Supply Co", "Holdings", "GmbH", "Ltd",
];

const STREETS: &[&str] = &[
    "Harbour Road", "Mill Lane", "Station Street", "Canal Walk", "Market Square",
    "Industrial Way", "Dock Street", "Rail Yard Road",
];

const CITIES: &[City] = &[
    ("Hamburg",   "Hamburg",        "Germany",     53.55,   9.99),
    ("Rotterdam", "South Holland",  "Netherlands", 51.92,   4.48),
    ("Lyon",      "Rhone",          "France",      45.76,   4.84),
    ("Milan",     "Lombardy",       "Italy",       45.46,   9.19),
    ("Gdansk",    "Pomerania",      "Poland",      54.35,  18.65),
    ("Valencia",  "Valencia",       "Spain",       39.47,  -0.38),
    ("Chicago",   "Illinois",       "USA",         41.88, -87.63),
    ("Memphis",   "Tennessee",      "USA",         35.15, -90.05),
    ("Osaka",     "Osaka",          "Japan",       34.69, 135.50),
    ("Santos",    "Sao Paulo",      "Brazil",     -23.96, -46.33),
];
