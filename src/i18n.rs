//! Display strings for the dashboard in English and Tamil.

use axum_extra::extract::cookie::{Cookie, PrivateCookieJar};

pub const LANGUAGE_COOKIE: &str = "van_rental_lang";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    En,
    Ta,
}

impl Language {
    /// Unknown codes fall back to English.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "ta" => Self::Ta,
            _ => Self::En,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ta => "ta",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::En => Self::Ta,
            Self::Ta => Self::En,
        }
    }

    pub fn translations(self) -> &'static Translations {
        match self {
            Self::En => &EN,
            Self::Ta => &TA,
        }
    }

    pub fn from_jar(jar: &PrivateCookieJar) -> Self {
        jar.get(LANGUAGE_COOKIE)
            .map(|cookie| Self::from_code(cookie.value()))
            .unwrap_or_default()
    }

    pub fn store(self, jar: PrivateCookieJar) -> PrivateCookieJar {
        let cookie = Cookie::build((LANGUAGE_COOKIE, self.code()))
            .path("/")
            .http_only(true)
            .permanent();
        jar.add(cookie)
    }
}

#[derive(Debug)]
pub struct Translations {
    pub app_title: &'static str,
    pub app_subtitle: &'static str,
    pub refresh: &'static str,
    pub language_name: &'static str,
    pub trips: &'static str,
    pub payments: &'static str,

    pub add_new_trip: &'static str,
    pub van_number: &'static str,
    pub date: &'static str,
    pub pickup_location: &'static str,
    pub dropoff_location: &'static str,
    pub wayment: &'static str,
    pub no_of_bags: &'static str,
    pub rent: &'static str,
    pub misc_spending: &'static str,
    pub total_rent: &'static str,
    pub add_trip: &'static str,
    pub auto_calculated_bags: &'static str,
    pub auto_calculated_total: &'static str,

    pub search_trips: &'static str,
    pub advanced_search: &'static str,
    pub search: &'static str,
    pub start_date: &'static str,
    pub end_date: &'static str,
    pub search_placeholder: &'static str,

    pub trip_records: &'static str,
    pub export_to_excel: &'static str,
    pub export_report: &'static str,
    pub trip_id: &'static str,
    pub pickup: &'static str,
    pub dropoff: &'static str,
    pub bags: &'static str,
    pub misc: &'static str,
    pub actions: &'static str,
    pub total_rent_sum: &'static str,
    pub no_trips_found: &'static str,
    pub add_trip_to_start: &'static str,
    pub edit_trip: &'static str,
    pub delete_trip: &'static str,
    pub save_changes: &'static str,
    pub cancel_edit: &'static str,

    pub showing_results: &'static str,
    pub show_all_trips: &'static str,
    pub delete_confirm: &'static str,

    pub van_number_placeholder: &'static str,
    pub pickup_placeholder: &'static str,
    pub dropoff_placeholder: &'static str,

    pub payment_status: &'static str,
    pub status_all: &'static str,
    pub status_paid: &'static str,
    pub status_unpaid: &'static str,

    pub record_payment: &'static str,
    pub payment_records: &'static str,
    pub payment_id: &'static str,
    pub from_date: &'static str,
    pub to_date: &'static str,
    pub amount: &'static str,
    pub payment_date: &'static str,
    pub transaction_date: &'static str,
    pub billed: &'static str,
    pub outstanding: &'static str,
    pub total_payment_sum: &'static str,
    pub no_payments_found: &'static str,
    pub search_payments: &'static str,
    pub show_all_payments: &'static str,
    pub delete_payment_confirm: &'static str,
    pub rows_per_page: &'static str,
    pub all_rows: &'static str,
    pub showing: &'static str,
    pub page: &'static str,
    pub generated_on: &'static str,
    pub total_records: &'static str,
}

pub static EN: Translations = Translations {
    app_title: "LKJ",
    app_subtitle: "Van Rental Service",
    refresh: "Refresh",
    language_name: "English",
    trips: "Trips",
    payments: "Payments",

    add_new_trip: "Add New Trip",
    van_number: "Van Number",
    date: "Date",
    pickup_location: "Pickup Location",
    dropoff_location: "Dropoff Location",
    wayment: "Wayment",
    no_of_bags: "No of Bags",
    rent: "Rent",
    misc_spending: "Misc Spending",
    total_rent: "Total Rent",
    add_trip: "Add Trip",
    auto_calculated_bags: "Auto-calculated (Wayment ÷ 78)",
    auto_calculated_total: "Auto-calculated (Bags × Rent + Misc)",

    search_trips: "Search Trips",
    advanced_search: "Advanced Search",
    search: "Search",
    start_date: "Start Date",
    end_date: "End Date",
    search_placeholder: "Search by Trip ID, Van Number, Location...",

    trip_records: "Trip Records",
    export_to_excel: "Export to Excel",
    export_report: "Printable Report",
    trip_id: "Trip ID",
    pickup: "Pickup",
    dropoff: "Dropoff",
    bags: "Bags",
    misc: "Misc",
    actions: "Actions",
    total_rent_sum: "Total Rent Sum:",
    no_trips_found: "No trips found",
    add_trip_to_start: "Add a new trip to get started",
    edit_trip: "Edit trip",
    delete_trip: "Delete trip",
    save_changes: "Save changes",
    cancel_edit: "Cancel edit",

    showing_results: "search results",
    show_all_trips: "Show all trips",
    delete_confirm: "Are you sure you want to delete this trip?",

    van_number_placeholder: "VAN-101",
    pickup_placeholder: "Downtown Station",
    dropoff_placeholder: "Airport Terminal",

    payment_status: "Payment Status",
    status_all: "All",
    status_paid: "Paid",
    status_unpaid: "Unpaid",

    record_payment: "Record Payment",
    payment_records: "Payment Records",
    payment_id: "Payment ID",
    from_date: "From Date",
    to_date: "To Date",
    amount: "Amount",
    payment_date: "Payment Date",
    transaction_date: "Transaction Date",
    billed: "Billed",
    outstanding: "Outstanding",
    total_payment_sum: "Total Payment Sum:",
    no_payments_found: "No payments found",
    search_payments: "Search Payments",
    show_all_payments: "Show all payments",
    delete_payment_confirm: "Are you sure you want to delete this payment?",
    rows_per_page: "Rows per page",
    all_rows: "All",
    showing: "Showing",
    page: "Page",
    generated_on: "Generated on",
    total_records: "Total Records",
};

pub static TA: Translations = Translations {
    app_title: "LKJ",
    app_subtitle: "வேன் வாடகை சேவை",
    refresh: "புதுப்பிக்கவும்",
    language_name: "தமிழ்",
    trips: "பயணங்கள்",
    payments: "கட்டணங்கள்",

    add_new_trip: "புதிய பயணம் சேர்க்கவும்",
    van_number: "வேன் எண்",
    date: "தேதி",
    pickup_location: "எடுக்கும் இடம்",
    dropoff_location: "விடும் இடம்",
    wayment: "வேமென்ட்",
    no_of_bags: "பைகளின் எண்ணிக்கை",
    rent: "வாடகை",
    misc_spending: "பிற செலவுகள்",
    total_rent: "மொத்த வாடகை",
    add_trip: "பயணம் சேர்க்கவும்",
    auto_calculated_bags: "தானாக கணக்கிடப்பட்டது (வேமென்ட் ÷ 78)",
    auto_calculated_total: "தானாக கணக்கிடப்பட்டது (பைகள் × வாடகை + பிற)",

    search_trips: "பயணங்களை தேடவும்",
    advanced_search: "மேம்பட்ட தேடல்",
    search: "தேடவும்",
    start_date: "தொடக்க தேதி",
    end_date: "முடிவு தேதி",
    search_placeholder: "பயண ஐடி, வேன் எண், இடம் மூலம் தேடவும்...",

    trip_records: "பயண பதிவுகள்",
    export_to_excel: "எக்செல் ஏற்றுமதி",
    export_report: "அச்சிடக்கூடிய அறிக்கை",
    trip_id: "பயண ஐடி",
    pickup: "எடுக்கும் இடம்",
    dropoff: "விடும் இடம்",
    bags: "பைகள்",
    misc: "பிற",
    actions: "செயல்கள்",
    total_rent_sum: "மொத்த வாடகை தொகை:",
    no_trips_found: "பயணங்கள் இல்லை",
    add_trip_to_start: "தொடங்க புதிய பயணம் சேர்க்கவும்",
    edit_trip: "பயணத்தை திருத்தவும்",
    delete_trip: "பயணத்தை நீக்கவும்",
    save_changes: "மாற்றங்களை சேமிக்கவும்",
    cancel_edit: "திருத்தலை ரத்து செய்யவும்",

    showing_results: "தேடல் முடிவுகள்",
    show_all_trips: "அனைத்து பயணங்களையும் காட்டவும்",
    delete_confirm: "இந்த பயணத்தை நீக்க விரும்புகிறீர்களா?",

    van_number_placeholder: "வேன்-101",
    pickup_placeholder: "நகர மையம்",
    dropoff_placeholder: "விமான நிலையம்",

    payment_status: "கட்டண நிலை",
    status_all: "அனைத்தும்",
    status_paid: "செலுத்தப்பட்டது",
    status_unpaid: "செலுத்தப்படவில்லை",

    record_payment: "Record Payment",
    payment_records: "Payment Records",
    payment_id: "Payment ID",
    from_date: "From Date",
    to_date: "To Date",
    amount: "தொகை",
    payment_date: "Payment Date",
    transaction_date: "Transaction Date",
    billed: "Billed",
    outstanding: "Outstanding",
    total_payment_sum: "Total Payment Sum:",
    no_payments_found: "No payments found",
    search_payments: "Search Payments",
    show_all_payments: "Show all payments",
    delete_payment_confirm: "Are you sure you want to delete this payment?",
    rows_per_page: "Rows per page",
    all_rows: "அனைத்தும்",
    showing: "Showing",
    page: "Page",
    generated_on: "Generated on",
    total_records: "Total Records",
};

/// Renders an amount with thousands separators and at most two decimals,
/// dropping the fraction for whole numbers.
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return "0".into();
    }
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = group_thousands(cents / 100);
    let fraction = cents % 100;
    let sign = if negative && cents > 0 { "-" } else { "" };
    match fraction {
        0 => format!("{sign}{whole}"),
        f if f % 10 == 0 => format!("{sign}{whole}.{}", f / 10),
        f => format!("{sign}{whole}.{f:02}"),
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_like_the_tables() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(175.0), "175");
        assert_eq!(format_amount(15000.0), "15,000");
        assert_eq!(format_amount(1234567.5), "1,234,567.5");
        assert_eq!(format_amount(12.345), "12.35");
        assert_eq!(format_amount(-100.0), "-100");
        assert_eq!(format_amount(f64::NAN), "0");
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        assert_eq!(Language::from_code("ta"), Language::Ta);
        assert_eq!(Language::from_code("fr"), Language::En);
        assert_eq!(Language::Ta.toggled(), Language::En);
        assert_eq!(Language::Ta.translations().refresh, "புதுப்பிக்கவும்");
    }
}
