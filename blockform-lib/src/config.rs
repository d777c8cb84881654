use std::time::Duration;

/// How the payload reaches the submit endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmitMethod {
    /// GET with the payload in the query string.
    #[default]
    Get,
    /// POST with a `{"data": payload}` JSON body.
    Post,
}

/// Knobs shared by the form builder and the submission handler.
#[derive(Debug, Clone)]
pub struct FormConfig {
    pub submit_href: String,
    pub submit_method: SubmitMethod,
    /// How long success / error notices stay on the page.
    pub notice_lifetime: Duration,
    pub minimum_age: u32,
    /// Id of the field that must repeat the primary email address.
    pub confirm_email_id: String,
    /// Name of the primary email input the confirm field is compared to.
    pub primary_email_name: String,
    pub pdf_file_name: String,
    pub paths_href: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        FormConfig {
            submit_href: "/dummy-url.json".to_string(),
            submit_method: SubmitMethod::Get,
            notice_lifetime: Duration::from_secs(10),
            minimum_age: 18,
            confirm_email_id: "edit-email-address-mail-2".to_string(),
            primary_email_name: "email_address[mail_1]".to_string(),
            pdf_file_name: "form-submission.pdf".to_string(),
            paths_href: "/paths.json".to_string(),
        }
    }
}
