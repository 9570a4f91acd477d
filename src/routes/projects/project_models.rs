use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub project_type: String,
    pub description: Option<String>,
}
