//! Hemisphere resolution.
//!
//! Precedence, first match wins:
//! 1. an explicit, recognized hemisphere
//! 2. latitude, when both latitude and longitude are given
//! 3. a country code from the Southern Hemisphere list
//! 4. Northern

use super::{Hemisphere, HemisphereInput, SeasonOptions};

/// Countries lying entirely or predominantly south of the equator.
///
/// Countries the equator cuts through roughly in half (Ecuador, Kenya,
/// Indonesia, ...) are left out and resolve to the Northern default.
pub const SOUTHERN_COUNTRY_CODES: &[&str] = &[
    "AO", // Angola
    "AR", // Argentina
    "AS", // American Samoa
    "AU", // Australia
    "BI", // Burundi
    "BO", // Bolivia
    "BR", // Brazil
    "BW", // Botswana
    "CK", // Cook Islands
    "CL", // Chile
    "FJ", // Fiji
    "FK", // Falkland Islands
    "KM", // Comoros
    "LS", // Lesotho
    "MG", // Madagascar
    "MU", // Mauritius
    "MW", // Malawi
    "MZ", // Mozambique
    "NA", // Namibia
    "NC", // New Caledonia
    "NR", // Nauru
    "NU", // Niue
    "NZ", // New Zealand
    "PE", // Peru
    "PF", // French Polynesia
    "PG", // Papua New Guinea
    "PY", // Paraguay
    "RE", // Réunion
    "RW", // Rwanda
    "SB", // Solomon Islands
    "SC", // Seychelles
    "SH", // Saint Helena
    "SZ", // Eswatini
    "TK", // Tokelau
    "TL", // Timor-Leste
    "TO", // Tonga
    "TV", // Tuvalu
    "TZ", // Tanzania
    "UY", // Uruguay
    "VU", // Vanuatu
    "WF", // Wallis and Futuna
    "WS", // Samoa
    "YT", // Mayotte
    "ZA", // South Africa
    "ZM", // Zambia
    "ZW", // Zimbabwe
];

/// Check a country code against [`SOUTHERN_COUNTRY_CODES`], ignoring case.
pub fn is_southern_country(code: &str) -> bool {
    SOUTHERN_COUNTRY_CODES
        .iter()
        .any(|southern| southern.eq_ignore_ascii_case(code))
}

/// Resolve the hemisphere for `options`. Never fails.
pub fn resolve(options: &SeasonOptions) -> Hemisphere {
    if let Some(HemisphereInput::Known(hemisphere)) = &options.hemisphere {
        return *hemisphere;
    }

    // Longitude has to be present but does not influence the result
    if let (Some(latitude), Some(_)) = (options.latitude, options.longitude) {
        return if latitude >= 0.0 {
            Hemisphere::Northern
        } else {
            Hemisphere::Southern
        };
    }

    if let Some(code) = options.country_code.as_deref()
        && is_southern_country(code)
    {
        return Hemisphere::Southern;
    }

    Hemisphere::Northern
}
