use anyhow::Context;

pub mod adf;
pub mod config;
pub mod jira;
pub mod logger;
pub mod report;
pub mod utils;

/// Deserializes a JSON document, reporting the path of the offending field on
/// failure.
pub fn deserialize_json<T: serde::de::DeserializeOwned>(v: &[u8]) -> anyhow::Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(v);
    let res: Result<T, _> = serde_path_to_error::deserialize(&mut deserializer);
    match res {
        Ok(r) => Ok(r),
        Err(e) => {
            let ctx = format!("at {:?}", e.path().to_string());
            Err(e.into_inner()).context(ctx)
        }
    }
}
