//! Zhongdu podcast episode extractor
//!
//! Pulls episode metadata from the Zhongdu reading platform's article
//! endpoint, keyed by the `artId` query parameter of the shared episode
//! URL.

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info};

use shelfsync_common::Record;

use super::{ExtractError, Extractor};

/// Base URL of the Zhongdu article API.
pub const DEFAULT_BASE_URL: &str = "http://ny.zdline.cn";

/// Extractor for Zhongdu audio article URLs.
#[derive(Debug)]
pub struct ZhongduExtractor {
    http: reqwest::Client,
    base_url: String,
    url_pattern: Regex,
    art_id_pattern: Regex,
}

#[derive(Debug, Deserialize)]
struct MetaInfo {
    model: Model,
}

#[derive(Debug, Deserialize)]
struct Model {
    title: String,
    #[serde(default)]
    daodu: Option<String>,
    #[serde(rename = "openPic", default)]
    open_pic: Option<String>,
    #[serde(rename = "aboutAuthors", default)]
    about_authors: Vec<RawAuthor>,
    #[serde(rename = "dayStr", default)]
    day_str: Option<String>,
    #[serde(rename = "audioInfo", default)]
    audio_info: Vec<AudioInfo>,
    #[serde(default)]
    zhuanlan: Option<Zhuanlan>,
}

#[derive(Debug, Deserialize)]
struct RawAuthor {
    name: String,
    #[serde(default)]
    pic: Option<String>,
    #[serde(default)]
    desc: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AudioInfo {
    #[serde(rename = "audioTime")]
    audio_time: String,
}

#[derive(Debug, Deserialize)]
struct Zhuanlan {
    name: String,
}

impl ZhongduExtractor {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the article API at a custom host (tests use a mock server).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            url_pattern: Regex::new(r"ny\.zdline\.cn/mobile/audio")
                .unwrap_or_else(|_| unreachable!("static pattern")),
            art_id_pattern: Regex::new(r"artId=(\d+)")
                .unwrap_or_else(|_| unreachable!("static pattern")),
        }
    }

    fn art_id<'a>(&self, url: &'a str) -> Option<&'a str> {
        self.art_id_pattern
            .captures(url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }

    async fn fetch_meta_info(&self, art_id: &str) -> Result<MetaInfo, ExtractError> {
        let endpoint = format!(
            "{}/h5/article/newDetailToH5.do?ticket=null&artId={}&code=",
            self.base_url, art_id
        );
        debug!(%endpoint, "fetching zhongdu article metadata");

        let meta_info = self.http.get(&endpoint).send().await?.json().await?;
        Ok(meta_info)
    }

    /// Day strings come as either `YYYY-MM-DD` or a short `MM-DD`; short
    /// ones get the current year prefixed.
    fn normalize_published(day_str: &str) -> String {
        if day_str.len() <= 5 {
            let year = chrono::Utc::now().format("%Y");
            format!("{}-{}", year, day_str)
        } else {
            day_str.to_string()
        }
    }

    /// Audio time comes as `MM:SS`; the stored duration is whole minutes.
    fn duration_minutes(audio_time: &str) -> Option<i64> {
        audio_time.split(':').next()?.trim().parse().ok()
    }

    fn to_record(&self, meta_info: MetaInfo) -> Record {
        let model = meta_info.model;
        let mut record = Record::new();

        record.set("title", model.title);
        record.set("type", "Podcast");
        record.set("language", "Chinese");
        if let Some(daodu) = model.daodu {
            record.set("description", daodu);
        }
        if let Some(pic) = model.open_pic {
            record.set("icon_url", pic.clone());
            record.set("cover_url", pic);
        }
        if let Some(day_str) = model.day_str {
            record.set("published", Self::normalize_published(&day_str));
        }
        if let Some(minutes) = model
            .audio_info
            .first()
            .and_then(|a| Self::duration_minutes(&a.audio_time))
        {
            record.set("duration", minutes);
        }
        if let Some(zhuanlan) = model.zhuanlan {
            record.set("series", zhuanlan.name);
        }

        let authors: Vec<serde_json::Value> = model
            .about_authors
            .into_iter()
            .map(|author| {
                serde_json::json!({
                    "name": author.name,
                    "icon_url": author.pic,
                    "description": author.desc,
                })
            })
            .collect();
        record.set("author", serde_json::Value::Array(authors));

        record
    }
}

impl Default for ZhongduExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for ZhongduExtractor {
    fn matches(&self, identifier: &str) -> bool {
        self.url_pattern.is_match(identifier)
    }

    async fn extract(&self, identifier: &str) -> Result<Option<Record>, ExtractError> {
        // A matching URL without an artId cannot be looked up; treat it as
        // absent so dispatch can keep scanning.
        let Some(art_id) = self.art_id(identifier) else {
            info!(%identifier, "no artId in zhongdu url");
            return Ok(None);
        };

        let meta_info = self.fetch_meta_info(art_id).await?;
        Ok(Some(self.to_record(meta_info)))
    }
}
