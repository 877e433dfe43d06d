use crate::config::model::{Config, DEFAULT_SITE_URL};
use chrono::{Local, NaiveDate};
use std::env;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn load_config() -> Config {
    let site_url = load_site_url_config("SITE_URL");
    let events_date = load_date_config("EVENTS_DATE")
        .unwrap_or_else(|| Local::now().date_naive());
    let output_json = load_bool_config("OUTPUT_JSON", false);

    Config {
        site_url,
        events_date,
        output_json,
    }
}

fn load_site_url_config(name: &str) -> String {
    let site_url = env::var(name).unwrap_or_else(|_| DEFAULT_SITE_URL.to_string());

    if site_url.trim().is_empty() {
        panic!("{} must not be empty", name);
    }

    site_url
}

fn load_bool_config(name: &str, default: bool) -> bool {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .unwrap_or_else(|_| {
            panic!(
                "Invalid config '{}'. Expected either 'true' or 'false'",
                name
            )
        })
}

fn load_date_config(name: &str) -> Option<NaiveDate> {
    match env::var(name) {
        Ok(value) => Some(NaiveDate::parse_from_str(&value, DATE_FORMAT).unwrap_or_else(|_| {
            panic!(
                "Invalid config '{}'. Expected a date like 2024-03-10.",
                name
            )
        })),
        Err(_) => None,
    }
}
