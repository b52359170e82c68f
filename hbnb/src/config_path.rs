use std::fs;

pub const CONFIG_PATH_ENV: &str = "HBNB_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yml";

pub fn get() -> Result<String, String> {
    let config_path =
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());

    match fs::metadata(&config_path) {
        Ok(_) => Ok(config_path),
        Err(err) => Err(format!(
            "Config file '{config_path}' (set {CONFIG_PATH_ENV} or place config.yml in the current directory) is not readable: {err}"
        )),
    }
}
