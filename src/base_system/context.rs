//! 全局配置结构（Config）与默认值。
//!
//! 该模块同时提供生成 `config.yml` 的字段元信息。

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::config::{ConfigSpec, FieldMeta};
use super::retry::RetryPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // 数据源
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,
    #[serde(default = "default_per_ayah_base_url")]
    pub per_ayah_base_url: String,
    #[serde(default = "default_chapter_text_url")]
    pub chapter_text_url: String,

    // 网络配置
    #[serde(default)]
    pub request_timeout: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_probe_attempts")]
    pub probe_attempts: u32,

    // 保存配置
    #[serde(default)]
    pub save_path: String,
    #[serde(default = "default_true")]
    pub allow_overwrite_files: bool,
    #[serde(default = "default_true")]
    pub show_progress_bar: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_url: default_catalog_url(),
            per_ayah_base_url: default_per_ayah_base_url(),
            chapter_text_url: default_chapter_text_url(),
            request_timeout: 0,
            connect_timeout: default_connect_timeout(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            probe_attempts: default_probe_attempts(),
            save_path: String::new(),
            allow_overwrite_files: default_true(),
            show_progress_bar: default_true(),
        }
    }
}

impl ConfigSpec for Config {
    const FILE_NAME: &'static str = "config.yml";

    fn fields() -> &'static [FieldMeta] {
        static FIELDS: [FieldMeta; 11] = [
            FieldMeta {
                name: "catalog_url",
                description: "Reciter catalog endpoint (reciter -> moshaf listing)",
            },
            FieldMeta {
                name: "per_ayah_base_url",
                description: "Per-ayah audio host, files at {base}/{source_key}/{CCC}{AAA}.mp3",
            },
            FieldMeta {
                name: "chapter_text_url",
                description: "Chapter text endpoint, requested as {base}/{chapter}/quran-uthmani",
            },
            FieldMeta {
                name: "request_timeout",
                description: "Whole-request timeout in seconds (0 = transport default, no timeout)",
            },
            FieldMeta {
                name: "connect_timeout",
                description: "Connect timeout in seconds (0 = none)",
            },
            FieldMeta {
                name: "max_retries",
                description: "Total attempts per ayah fetch (404 is never retried)",
            },
            FieldMeta {
                name: "retry_base_delay_ms",
                description: "Linear backoff step in ms: wait attempt x step after each failure",
            },
            FieldMeta {
                name: "probe_attempts",
                description: "Attempts for the per-ayah availability probe",
            },
            FieldMeta {
                name: "save_path",
                description: "Save directory (empty = current directory)",
            },
            FieldMeta {
                name: "allow_overwrite_files",
                description: "Overwrite existing files; otherwise a ' (n)' suffix is added",
            },
            FieldMeta {
                name: "show_progress_bar",
                description: "Show a terminal progress bar during range downloads",
            },
        ];
        &FIELDS
    }
}

impl Config {
    pub fn default_save_dir(&self) -> PathBuf {
        if self.save_path.trim().is_empty() {
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        } else {
            PathBuf::from(&self.save_path)
        }
    }

    pub fn fetch_policy(&self) -> RetryPolicy {
        RetryPolicy::linear(
            self.max_retries,
            Duration::from_millis(self.retry_base_delay_ms),
        )
    }

    pub fn probe_policy(&self) -> RetryPolicy {
        RetryPolicy::linear(
            self.probe_attempts,
            Duration::from_millis(self.retry_base_delay_ms),
        )
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout > 0).then(|| Duration::from_secs(self.request_timeout))
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        (self.connect_timeout > 0).then(|| Duration::from_secs(self.connect_timeout))
    }
}

/// 把任意显示名转成可安全落盘的文件名。
pub fn safe_fs_name(name: &str, replacement: &str, max_len: usize) -> String {
    let repl = replacement.chars().next().unwrap_or('_');
    let mut cleaned: String = name
        .chars()
        .map(|ch| match ch {
            ':' | '"' | '<' | '>' | '/' | '\\' | '|' | '?' | '*' => repl,
            c if (c as u32) < 32 => repl,
            _ => ch,
        })
        .collect();

    let trim_tail = |s: &mut String| {
        while s.ends_with(' ') || s.ends_with('.') {
            s.pop();
        }
    };
    trim_tail(&mut cleaned);

    if cleaned.is_empty() {
        cleaned.push_str("unnamed");
    }

    const RESERVED: [&str; 22] = [
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    let stem = cleaned.split('.').next().unwrap_or("").to_uppercase();
    if RESERVED.contains(&stem.as_str()) {
        cleaned = format!("_{}", cleaned);
    }

    if cleaned.len() > max_len {
        // 阿拉伯文是多字节 UTF-8，只能在字符边界截断
        let mut end = max_len;
        while end > 0 && !cleaned.is_char_boundary(end) {
            end -= 1;
        }
        cleaned.truncate(end);
        trim_tail(&mut cleaned);
        if cleaned.is_empty() {
            cleaned.push_str("unnamed");
        }
    }

    cleaned
}

fn default_true() -> bool {
    true
}

fn default_catalog_url() -> String {
    "https://www.mp3quran.net/api/v3/reciters?language=ar".to_string()
}

fn default_per_ayah_base_url() -> String {
    "https://everyayah.com/data".to_string()
}

fn default_chapter_text_url() -> String {
    "https://api.alquran.cloud/v1/surah".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    500
}

fn default_probe_attempts() -> u32 {
    1
}
