use std::env;
use std::error;
use std::str::FromStr;

/// Prefix shared by every environment variable the engine reads.
pub const ENV_PREFIX: &str = "DELTASET_";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("value of {0:?} environment variable is not valid UTF-8")]
    NotUtf8(String),

    #[error("couldn't parse the value of {0:?} environment variable: {1}")]
    ParsingFailed(String, #[source] Box<dyn error::Error + Send + Sync>),
}

/// Builds the full variable name for an engine setting, e.g. `TRACE_CAPACITY`
/// becomes `DELTASET_TRACE_CAPACITY`.
pub fn var_name(setting: &str) -> String {
    format!("{ENV_PREFIX}{setting}")
}

pub fn parse_env_var<T: FromStr>(name: &str) -> Result<Option<T>, Error>
where
    T::Err: error::Error + Send + Sync + 'static,
{
    let Some(value) = env::var_os(name) else {
        return Ok(None);
    };
    let value = value
        .into_string()
        .map_err(|_| Error::NotUtf8(name.to_string()))?;
    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|err| Error::ParsingFailed(name.to_string(), Box::new(err)))
}

pub fn parse_env_var_or<T: FromStr>(name: &str, default: T) -> Result<T, Error>
where
    T::Err: error::Error + Send + Sync + 'static,
{
    Ok(parse_env_var(name)?.unwrap_or(default))
}
