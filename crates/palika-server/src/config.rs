use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub max_body_bytes: usize,
    pub admin_role: String,
    pub attachment_url_ttl: Duration,
    pub building_form_id: String,
    pub business_form_id: String,
    pub family_form_id: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 256 * 1024,
            admin_role: "admin".to_string(),
            attachment_url_ttl: Duration::from_secs(24 * 60 * 60),
            building_form_id: "building_survey".to_string(),
            business_form_id: "business_survey".to_string(),
            family_form_id: "family_survey".to_string(),
        }
    }
}
