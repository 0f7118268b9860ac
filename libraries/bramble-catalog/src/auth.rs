//! Subsonic authentication parameters.

use crate::types::{AuthMode, CatalogConfig, API_VERSION};
use rand::distributions::Alphanumeric;
use rand::Rng;

const SALT_LEN: usize = 12;

/// Query parameters shared by every request: credentials, API version,
/// client name and response format.
pub(crate) fn auth_params(config: &CatalogConfig) -> Vec<(&'static str, String)> {
    let mut params = vec![("u", config.username.clone())];

    match config.auth {
        AuthMode::Token => {
            let salt = new_salt();
            params.push(("t", token(&config.password, &salt)));
            params.push(("s", salt));
        }
        AuthMode::Plain => {
            params.push(("p", format!("enc:{}", hex::encode(config.password.as_bytes()))));
        }
    }

    params.push(("v", API_VERSION.to_string()));
    params.push(("c", config.client_name.clone()));
    params.push(("f", "json".to_string()));
    params
}

pub(crate) fn token(password: &str, salt: &str) -> String {
    format!("{:x}", md5::compute(format!("{password}{salt}").as_bytes()))
}

fn new_salt() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LEN)
        .map(char::from)
        .collect()
}
