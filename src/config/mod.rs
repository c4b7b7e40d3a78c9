use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::PathBuf,
    time::Duration,
};

use directories::BaseDirs;

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        let mut map = default_map();
        let config_path = default_config_path();

        // Read .codepadrc if exists
        if config_path.exists() {
            if let Ok(file) = fs::File::open(&config_path) {
                let reader = BufReader::new(file);
                for line in reader.lines().map_while(Result::ok) {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    if let Some((k, v)) = line.split_once('=') {
                        map.insert(k.trim().to_string(), v.trim().to_string());
                    }
                }
            }
        }

        // Overlay environment variables (take precedence)
        for (k, v) in env::vars() {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self { inner: map, config_path }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        // ENV first
        if let Ok(v) = env::var(key) {
            return Some(v);
        }
        self.inner.get(key).cloned()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.parse::<u64>().ok())
    }

    /// Configured Python interpreter, or `None` when left on `auto`.
    pub fn python_bin(&self) -> Option<String> {
        self.get("CODEPAD_PYTHON_BIN")
            .filter(|v| !v.is_empty() && v != "auto")
    }

    pub fn boot_timeout(&self) -> Duration {
        Duration::from_secs(self.get_u64("CODEPAD_BOOT_TIMEOUT").unwrap_or(30))
    }

    pub fn default_language(&self) -> String {
        self.get("CODEPAD_DEFAULT_LANGUAGE")
            .unwrap_or_else(|| "javascript".to_string())
    }

    pub fn warm_start(&self) -> bool {
        self.get_bool("CODEPAD_WARM_START")
    }
}

fn is_config_key(k: &str) -> bool {
    k.starts_with("CODEPAD_")
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("codepad").join(".codepadrc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();

    m.insert("CODEPAD_PYTHON_BIN".into(), "auto".into());
    m.insert("CODEPAD_BOOT_TIMEOUT".into(), "30".into());
    m.insert("CODEPAD_DEFAULT_LANGUAGE".into(), "javascript".into());
    m.insert("CODEPAD_WARM_START".into(), "true".into());

    m
}
