use cndc_core::acquisition::{release_code, release_months, release_urls};
use cndc_core::config::AcquisitionConfig;
use cndc_core::CanonicalPeriod;

fn period(year: i32, month: u32) -> CanonicalPeriod {
    CanonicalPeriod::new(year, month).unwrap()
}

#[test]
fn months_cross_year_boundary() {
    let months = release_months(period(2023, 11), period(2024, 2));
    assert_eq!(
        months,
        vec![period(2023, 11), period(2023, 12), period(2024, 1), period(2024, 2)]
    );
    assert!(release_months(period(2024, 2), period(2023, 11)).is_empty());
    assert_eq!(release_months(period(2024, 2), period(2024, 2)).len(), 1);
}

#[test]
fn codes_are_month_then_two_digit_year() {
    assert_eq!(release_code(period(2023, 2)), "0223");
    assert_eq!(release_code(period(2010, 12)), "1210");
    assert_eq!(release_code(period(2000, 1)), "0100");
}

#[test]
fn urls_follow_release_naming() {
    let config = AcquisitionConfig::default();
    let urls = release_urls(&config, period(2023, 12), period(2024, 1));
    assert_eq!(urls.len(), 2);
    assert_eq!(urls[0].code, "1223");
    assert_eq!(
        urls[0].archive,
        "https://www.cndc.bo/media/archivos/estadistica_mensual/c_iny_1223.zip"
    );
    assert_eq!(
        urls[1].workbook,
        "https://www.cndc.bo/media/archivos/estadistica_mensual/c_iny_0124.xlsx"
    );
}
