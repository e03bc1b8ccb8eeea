//! Deterministic keyword classifier.
//!
//! `KEYWORDS` is scanned in order and the first keyword found as a substring
//! wins, so order is part of the behaviour: `park` shadows `amusement_park`,
//! `car` shadows `car_dealer`, `store` shadows `book_store`. Each keyword
//! appears once; `hotel` sits at its first position with the `Tourism`
//! category.

/// Category returned when nothing matches.
pub const OTHERS: &str = "Others";

/// Land-use categories a keyword can map to, plus `Others`.
pub const CATEGORIES: [&str; 16] = [
    "Educational",
    "Healthcare",
    "Residential",
    "Recreational",
    "Commercial",
    "Industrial",
    "Agricultural",
    "Government",
    "Religious",
    "Transport",
    "Tourism",
    "Green Spaces",
    "Infrastructure",
    "Mixed-Use",
    "Cultural",
    OTHERS,
];

pub const KEYWORDS: &[(&str, &str)] = &[
    ("school", "Educational"),
    ("university", "Educational"),
    ("city_hall", "Educational"),
    ("college", "Educational"),
    ("hospital", "Healthcare"),
    ("doctor", "Healthcare"),
    ("physiotherapist", "Healthcare"),
    ("dentist", "Healthcare"),
    ("clinic", "Healthcare"),
    ("pharmacy", "Healthcare"),
    ("residential", "Residential"),
    ("residence", "Residential"),
    ("apartment", "Residential"),
    ("house", "Residential"),
    ("park", "Recreational"),
    ("toilet", "Recreational"),
    ("stadium", "Recreational"),
    ("playground", "Recreational"),
    ("amusement_park", "Recreational"),
    ("shelter", "Recreational"),
    ("restaurant", "Commercial"),
    ("marketplace", "Commercial"),
    ("fast_food", "Commercial"),
    ("mall", "Commercial"),
    ("store", "Commercial"),
    ("showroom", "Commercial"),
    ("supermarket", "Commercial"),
    ("gym", "Commercial"),
    ("hardware", "Commercial"),
    ("fuel", "Commercial"),
    ("car", "Commercial"),
    ("lawyer", "Commercial"),
    ("cloth", "Commercial"),
    ("electronic", "Commercial"),
    ("fabric", "Commercial"),
    ("cafe", "Commercial"),
    ("office", "Commercial"),
    ("bank", "Commercial"),
    ("theatre", "Commercial"),
    ("theater", "Commercial"),
    ("florist", "Commercial"),
    ("cinema", "Commercial"),
    ("movie_theater", "Commercial"),
    ("meal_delivery", "Commercial"),
    ("movie_rental", "Commercial"),
    ("lodging", "Commercial"),
    ("hostel", "Commercial"),
    ("library", "Educational"),
    ("hotel", "Tourism"),
    ("atm", "Commercial"),
    ("aquarium", "Recreational"),
    ("bench", "Recreational"),
    ("zoo", "Recreational"),
    ("art_gallery", "Cultural"),
    ("bakery", "Commercial"),
    ("bicycle_store", "Commercial"),
    ("book_store", "Commercial"),
    ("beauty_salon", "Commercial"),
    ("hair_care", "Commercial"),
    ("accounting", "Commercial"),
    ("real_estate_agency", "Commercial"),
    ("insurance_agency", "Commercial"),
    ("shipping", "Commercial"),
    ("laundry", "Commercial"),
    ("casino", "Commercial"),
    ("cassino", "Commercial"),
    ("pvt ltd", "Commercial"),
    ("spa", "Commercial"),
    ("pub", "Commercial"),
    ("car_dealer", "Commercial"),
    ("jewel", "Commercial"),
    ("jewelry", "Commercial"),
    ("art_work", "Commercial"),
    ("bar", "Commercial"),
    ("night_club", "Commercial"),
    ("music", "Commercial"),
    ("airport", "Infrastructure"),
    ("museum", "Infrastructure"),
    ("industrial", "Industrial"),
    ("agricultural", "Agricultural"),
    ("government_office", "Government"),
    ("townhall", "Government"),
    ("police", "Government"),
    // Upper-case key never matches the lower-cased input.
    ("Department", "Government"),
    ("post_box", "Government"),
    ("embassy", "Government"),
    ("church", "Religious"),
    ("synagogue", "Religious"),
    ("place_of_worship", "Religious"),
    ("mosque", "Religious"),
    ("temple", "Religious"),
    ("train_station", "Transport"),
    ("bus_station", "Transport"),
    ("travel_agency", "Tourism"),
    ("resort", "Tourism"),
    ("historical_landmark", "Tourism"),
    ("mixed_use", "Mixed-Use"),
    ("green_space", "Green Spaces"),
];

fn first_match(text: &str) -> Option<&'static str> {
    KEYWORDS
        .iter()
        .find(|(keyword, _)| text.contains(keyword))
        .map(|&(_, category)| category)
}

/// Keyword land-use category: place type first, then name, else `Others`.
pub fn classify_land_use(name: &str, place_type: &str) -> &'static str {
    let name = name.to_lowercase();
    let place_type = place_type.to_lowercase();
    first_match(&place_type)
        .or_else(|| first_match(&name))
        .unwrap_or(OTHERS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn church_by_place_type() {
        assert_eq!(classify_land_use("St. Mary Church", "place_of_worship"), "Religious");
    }

    #[test]
    fn place_type_beats_name() {
        // Name says hospital, type says school.
        assert_eq!(classify_land_use("Hospital Road Primary", "school"), "Educational");
    }

    #[test]
    fn falls_back_to_name() {
        assert_eq!(classify_land_use("Central Hospital", "unspecified"), "Healthcare");
        assert_eq!(classify_land_use("Royal Bank", ""), "Commercial");
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(classify_land_use("KANDY MOSQUE", "YES"), "Religious");
        assert_eq!(classify_land_use("x", "Fast_Food"), "Commercial");
    }

    #[test]
    fn nothing_matches_is_others() {
        assert_eq!(classify_land_use("Unnamed", "unspecified"), OTHERS);
        assert_eq!(classify_land_use("", ""), OTHERS);
    }

    #[test]
    fn duplicate_hotel_key_resolves_to_tourism() {
        assert_eq!(classify_land_use("Galle Face Hotel", "hotel"), "Tourism");
    }

    #[test]
    fn earlier_keyword_shadows_longer_one() {
        assert_eq!(classify_land_use("Fun World", "amusement_park"), "Recreational");
        assert_eq!(classify_land_use("x", "car_dealer"), "Commercial");
        assert_eq!(classify_land_use("x", "bicycle_store"), "Commercial");
    }

    #[test]
    fn keywords_are_unique_and_categories_known() {
        let mut seen = HashSet::new();
        for (keyword, category) in KEYWORDS {
            assert!(seen.insert(*keyword), "duplicate keyword {keyword}");
            assert!(CATEGORIES.contains(category), "unknown category {category}");
        }
    }
}
