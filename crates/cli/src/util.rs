use reqwatch_core::models::RepositoryRef;

// For argp::FromArgs
pub fn repository(value: &str) -> Result<RepositoryRef, String> {
    RepositoryRef::parse(value).map_err(|e| e.to_string())
}
