/// Major metropolitan cities. Spellings match the names the model was trained on.
pub const TIER_1_CITIES: [&str; 8] = [
    "Mumbai", "Delhi", "Banglore", "Chennai", "Kolkata", "Pune", "Hyderabad", "Ahemadabad",
];

pub const TIER_2_CITIES: [&str; 83] = [
    "Agra", "Ajmer", "Aligarh", "Amravati", "Amritsar", "Anand", "Asansol", "Aurangabad", "Bareilly",
    "Belgaum", "Bhavnagar", "Bhopal", "Bhubaneswar", "Bikaner", "Bokaro", "Chandigarh", "Coimbatore",
    "Cuttack", "Dehradun", "Dhanbad", "Erode", "Faridabad", "Gaya", "Ghaziabad", "Gorakhpur",
    "Guntur", "Gurgaon", "Guwahati", "Gwalior", "Hubli-Dharwad", "Indore", "Jabalpur", "Jaipur",
    "Jalandhar", "Jammu", "Jamnagar", "Jamshedpur", "Jhansi", "Jodhpur", "Kanpur", "Karnal",
    "Kochi", "Kolhapur", "Kollam", "Kota", "Kozhikode", "Ludhiana", "Lucknow", "Madurai", "Mangalore",
    "Meerut", "Moradabad", "Mysore", "Nagpur", "Nashik", "Nellore", "Noida", "Palakkad", "Patna",
    "Pondicherry", "Prayagraj", "Raipur", "Rajahmundry", "Rajkot", "Ranchi", "Rourkela", "Salem",
    "Sangli", "Siliguri", "Solapur", "Srinagar", "Surat", "Thiruvananthapuram", "Thrissur",
    "Tiruchirappalli", "Tirunelveli", "Ujjain", "Vadodara", "Varanasi", "Vasai-Virar", "Vijayawada",
    "Visakhapatnam", "Warangal",
];

/// Economic tier of a city. Unknown cities land in `Tier3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CityTier {
    Tier1,
    Tier2,
    Tier3,
}

impl CityTier {
    pub fn as_u8(self) -> u8 {
        match self {
            CityTier::Tier1 => 1,
            CityTier::Tier2 => 2,
            CityTier::Tier3 => 3,
        }
    }
}

impl serde::Serialize for CityTier {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8(self.as_u8())
    }
}

/// Look up the tier of an already normalized city name.
pub fn classify(city: &str) -> CityTier {
    if TIER_1_CITIES.contains(&city) {
        CityTier::Tier1
    } else if TIER_2_CITIES.contains(&city) {
        CityTier::Tier2
    } else {
        CityTier::Tier3
    }
}

/// Trim surrounding whitespace and title-case every alphabetic run,
/// so `" vasai-VIRAR "` becomes `"Vasai-Virar"`.
pub fn normalize_city(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_word = false;
    for c in raw.trim().chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
