// Classification tests against the built-in tables
#[cfg(test)]
mod classify_tests {
    use crate::season::*;
    use chrono::NaiveDate;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn meteorological() -> SeasonOptions {
        SeasonOptions::default().with_calendar_type(CalendarType::Meteorological)
    }

    /// Winter wraps across New Year in the Northern astronomical table.
    #[test]
    fn test_year_wrap_northern_astronomical() {
        let options = SeasonOptions::default();
        assert_eq!(classify(&date(12, 25), &options), Season::Winter);
        assert_eq!(classify(&date(1, 15), &options), Season::Winter);
        assert_eq!(classify(&date(3, 20), &options), Season::Winter);
        assert_eq!(classify(&date(3, 21), &options), Season::Spring);
        assert_eq!(classify(&date(12, 20), &options), Season::Autumn);
        assert_eq!(classify(&date(12, 21), &options), Season::Winter);
    }

    #[test]
    fn test_meteorological_boundaries_differ() {
        assert_eq!(classify(&date(3, 1), &meteorological()), Season::Spring);
        assert_eq!(classify(&date(3, 1), &SeasonOptions::default()), Season::Winter);
        assert_eq!(classify(&date(2, 29), &meteorological()), Season::Winter);
        assert_eq!(classify(&date(12, 1), &meteorological()), Season::Winter);
        assert_eq!(classify(&date(11, 30), &meteorological()), Season::Autumn);
    }

    #[test]
    fn test_non_leap_february_end() {
        let feb_28 = NaiveDate::from_ymd_opt(2023, 2, 28).unwrap();
        assert_eq!(classify(&feb_28, &meteorological()), Season::Winter);
        let mar_1 = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
        assert_eq!(classify(&mar_1, &meteorological()), Season::Spring);
    }

    #[test]
    fn test_southern_mirroring() {
        let southern = SeasonOptions::default().with_hemisphere(Hemisphere::Southern);
        assert_eq!(classify(&date(12, 25), &southern), Season::Summer);
        assert_eq!(classify(&date(7, 4), &southern), Season::Winter);
        assert_eq!(classify(&date(4, 1), &southern), Season::Autumn);
        assert_eq!(classify(&date(10, 1), &southern), Season::Spring);
    }

    #[test]
    fn test_hemisphere_from_country_code() {
        let sydney = SeasonOptions::default().with_country_code("au");
        assert_eq!(classify(&date(1, 10), &sydney), Season::Summer);

        let oslo = SeasonOptions::default().with_country_code("NO");
        assert_eq!(classify(&date(1, 10), &oslo), Season::Winter);
    }

    #[test]
    fn test_hemisphere_from_coordinates() {
        let cape_town = SeasonOptions::default().with_coordinates(-33.92, 18.42);
        assert_eq!(classify(&date(8, 1), &cape_town), Season::Winter);
    }

    /// Every day of the year is exactly one of the four seasons, for every
    /// calendar and hemisphere.
    #[test]
    fn test_every_day_is_classified() {
        for calendar_type in CalendarType::ALL {
            for hemisphere in Hemisphere::ALL {
                let options = SeasonOptions::default()
                    .with_calendar_type(calendar_type)
                    .with_hemisphere(hemisphere);
                for day in all_month_days() {
                    let d = date(day.month, day.day);
                    let season = classify(&d, &options);
                    assert_ne!(
                        season,
                        Season::Unknown,
                        "{calendar_type}/{hemisphere} left {day} unclassified"
                    );
                }
            }
        }
    }

    /// The two hemispheres are half a year apart.
    #[test]
    fn test_hemispheres_are_opposite() {
        let opposite = |season: Season| match season {
            Season::Spring => Season::Autumn,
            Season::Summer => Season::Winter,
            Season::Autumn => Season::Spring,
            Season::Winter => Season::Summer,
            Season::Unknown => Season::Unknown,
        };
        for calendar_type in CalendarType::ALL {
            let north = SeasonOptions::default()
                .with_calendar_type(calendar_type)
                .with_hemisphere(Hemisphere::Northern);
            let south = north.clone().with_hemisphere(Hemisphere::Southern);
            for day in all_month_days() {
                let d = date(day.month, day.day);
                assert_eq!(classify(&d, &south), opposite(classify(&d, &north)));
            }
        }
    }

    #[test]
    fn test_special_season_type_behaves_like_calendar() {
        let special = SeasonOptions::default().with_season_type(SeasonType::Special);
        for day in all_month_days() {
            let d = date(day.month, day.day);
            assert_eq!(
                classify(&d, &special),
                classify(&d, &SeasonOptions::default())
            );
        }
    }

    #[test]
    fn test_language_culture_is_ignored() {
        let options = SeasonOptions {
            language_culture: Some("de-DE".to_string()),
            ..SeasonOptions::default()
        };
        assert_eq!(classify(&date(1, 1), &options), Season::Winter);
    }

    #[test]
    fn test_time_of_day_and_year_are_ignored() {
        use chrono::{Local, TimeZone};
        let late = Local.with_ymd_and_hms(1999, 3, 20, 23, 59, 59).unwrap();
        let early = Local.with_ymd_and_hms(2031, 3, 21, 0, 0, 1).unwrap();
        assert_eq!(classify(&late, &SeasonOptions::default()), Season::Winter);
        assert_eq!(classify(&early, &SeasonOptions::default()), Season::Spring);
    }

    #[test]
    fn test_missing_table_entry_is_unknown() {
        let table = SeasonTable::empty();
        assert_eq!(
            classify_with_table(&table, &date(12, 25), &SeasonOptions::default()),
            Season::Unknown
        );
    }

    #[test]
    fn test_classify_now_uses_time_source() {
        use crate::time_source::VirtualTimeSource;
        let source = VirtualTimeSource::at_date(date(7, 15)).unwrap();
        assert_eq!(
            classify_now(&source, &SeasonOptions::default()),
            Season::Summer
        );
    }
}

#[cfg(test)]
mod parse_tests {
    use crate::season::*;

    #[test]
    fn test_calendar_type_parsing_is_case_insensitive() {
        assert_eq!(
            "meteorological".parse::<CalendarType>(),
            Ok(CalendarType::Meteorological)
        );
        assert_eq!(
            "Astronomical".parse::<CalendarType>(),
            Ok(CalendarType::Astronomical)
        );
        let err = "lunar".parse::<CalendarType>().unwrap_err();
        assert_eq!(err.to_string(), "unrecognized calendar type: 'lunar'");
    }

    #[test]
    fn test_hemisphere_parsing_is_exact() {
        assert_eq!("Northern".parse::<Hemisphere>(), Ok(Hemisphere::Northern));
        assert_eq!("Southern".parse::<Hemisphere>(), Ok(Hemisphere::Southern));
        assert!("southern".parse::<Hemisphere>().is_err());
        assert!("S".parse::<Hemisphere>().is_err());
    }

    #[test]
    fn test_hemisphere_input_from_str() {
        assert_eq!(
            HemisphereInput::from("Southern"),
            HemisphereInput::Known(Hemisphere::Southern)
        );
        assert_eq!(
            HemisphereInput::from("down under"),
            HemisphereInput::Unrecognized("down under".to_string())
        );
    }

    #[test]
    fn test_season_serializes_by_name() {
        assert_eq!(
            serde_json::to_string(&Season::Winter).unwrap(),
            "\"Winter\""
        );
        assert!(Season::Winter.is_winter());
        assert!(!Season::Unknown.is_winter());
    }
}
