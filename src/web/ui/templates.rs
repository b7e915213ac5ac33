use askama::Template;
use askama_web::WebTemplate;

use crate::tracker::TrackerStatus;

#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub status: TrackerStatus,
    pub refresh_secs: u64,
}
