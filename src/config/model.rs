use chrono::NaiveDate;

pub const DEFAULT_SITE_URL: &str = "http://www.liepajniekiem.lv/lat/afisas-kalendars/";

#[derive(Debug)]
pub struct Config {
    pub site_url: String,
    pub events_date: NaiveDate,
    pub output_json: bool,
}
