//! Default values for configuration settings.

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

pub fn root_path() -> String {
    String::new() // Config file directory
}

pub fn fonts_path() -> String {
    String::new() // Same as root
}

pub fn font_request_timeout_ms() -> u64 {
    10_000
}

pub fn bool_false() -> bool {
    false
}
