use solar_epc_manager::currency::{CurrencyConverter, ProjectCurrency};
use solar_epc_manager::models::Project;
use solar_epc_manager::session::DisplayCurrency;

use chrono::NaiveDate;

#[test]
fn cop_and_usd_examples() {
    let cop = CurrencyConverter::new("COP", 4000.0).unwrap();
    assert_eq!(cop.to_display(100.0), "400,000");
    assert_eq!(CurrencyConverter::usd().to_display(100.0), "100.00");
}

#[test]
fn project_currency_is_frozen_and_independent_of_the_toggle() {
    let start = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    let project = Project::new(
        "Granja Solar La Guajira",
        "Celsia",
        250_000.0,
        ProjectCurrency::with_rate("Colombia", 3_950.0).unwrap(),
        start,
    )
    .unwrap();

    let project_view = project.converter().unwrap();
    assert_eq!(project_view.to_display(1_000.0), "3,950,000");

    // the session toggle only changes dashboard figures
    let display = DisplayCurrency::Usd.toggle(4_000.0).unwrap();
    assert_eq!(display.converter().to_display(1_000.0), "4,000,000");
    assert_eq!(project.converter().unwrap().to_display(1_000.0), "3,950,000");
}

#[test]
fn round_trip_through_display_amount() {
    for (code, rate) in [("COP", 4000.0), ("USD", 1.0), ("MXN", 17.0)] {
        let conv = CurrencyConverter::new(code, rate).unwrap();
        let decimals = conv.currency().decimals as i32;
        let slack = 0.5 * 10f64.powi(-decimals) / rate + 1e-9;
        for x in [0.25, 10.0, 2_345.67, 1_000_000.0] {
            let back = conv.to_usd(conv.to_display_amount(x));
            assert!((back - x).abs() <= slack, "{code} {x} -> {back}");
        }
    }
}

#[test]
fn zero_rate_fails_fast() {
    assert!(CurrencyConverter::new("COP", 0.0).is_err());
    assert!(ProjectCurrency::with_rate("Colombia", -1.0).is_err());
}
