//! Douban book extractor
//!
//! Looks a book up by ISBN through Douban's redirecting `/isbn/` endpoint,
//! then scrapes the subject page: the JSON-LD schema block for title and
//! authors, the info block for publication details, and the intro blocks
//! for the description. No redirect means Douban does not know the ISBN,
//! which is the absent outcome.

use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, info};

use shelfsync_common::Record;

use super::{ExtractError, Extractor};

/// Base URL of the Douban book site.
pub const DEFAULT_BASE_URL: &str = "https://book.douban.com";

/// Douban blocks the default reqwest user agent.
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0 Safari/537.36";

/// Icon for book people rows (the teacher emoji).
const AUTHOR_EMOJI: &str = "\u{1F9D1}\u{200D}\u{1F3EB}";

/// Extractor for ISBN identifiers, backed by Douban.
#[derive(Debug)]
pub struct DoubanBookExtractor {
    http: reqwest::Client,
    base_url: String,
    isbn_pattern: Regex,
    bracket_pattern: Regex,
}

/// Pre-parsed selectors and label patterns for the subject page.
struct PageSelectors {
    schema: Selector,
    cover: Selector,
    info: Selector,
    ranking: Selector,
    intro: Selector,
    anchor: Selector,
    paragraph: Selector,
}

impl PageSelectors {
    fn new() -> Self {
        let parse = |s: &str| Selector::parse(s).unwrap_or_else(|_| unreachable!("static selector"));
        Self {
            schema: parse(r#"script[type="application/ld+json"]"#),
            cover: parse(r#"meta[property="og:image"]"#),
            info: parse("#info"),
            ranking: parse(r#"strong[property="v:average"]"#),
            intro: parse("div.intro"),
            anchor: parse("a"),
            paragraph: parse("p"),
        }
    }
}

impl DoubanBookExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the lookup endpoint at a custom host (tests use a mock
    /// server).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ExtractError> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            isbn_pattern: Regex::new(r"^[0-9]+$").unwrap_or_else(|_| unreachable!("static pattern")),
            bracket_pattern: Regex::new(r"\[.*?\]")
                .unwrap_or_else(|_| unreachable!("static pattern")),
        })
    }

    /// Follow the ISBN endpoint's redirect to the subject page. `None`
    /// when Douban does not redirect, i.e. the ISBN is unknown.
    async fn fetch_subject_page(
        &self,
        isbn: &str,
    ) -> Result<Option<(String, String)>, ExtractError> {
        let endpoint = format!("{}/isbn/{}/", self.base_url, isbn);
        let response = self.http.get(&endpoint).send().await?;
        let final_url = response.url().to_string();

        if final_url == endpoint {
            info!(%isbn, "douban has no forwarding url for isbn");
            return Ok(None);
        }

        debug!(%isbn, %final_url, "resolved douban subject page");
        let html = response.text().await?;
        Ok(Some((final_url, html)))
    }

    /// Strip the `[国籍]` prefix and normalize the separator spacing in
    /// transliterated names ("斯图尔特·基利" -> "斯图尔特 · 基利").
    fn clean_author_name(&self, raw: &str) -> String {
        let name = self.bracket_pattern.replace_all(raw, "");
        let name = name.trim();
        if name.contains('·') {
            name.split('·')
                .map(str::trim)
                .collect::<Vec<_>>()
                .join(" · ")
        } else {
            name.to_string()
        }
    }

    fn schema_object(&self, document: &Html, selectors: &PageSelectors) -> Option<Value> {
        let script = document.select(&selectors.schema).next()?;
        let text: String = script.text().collect();
        serde_json::from_str(&text).ok()
    }

    fn authors_from_schema(&self, schema: &Value) -> Vec<Value> {
        schema
            .get("author")
            .and_then(Value::as_array)
            .map(|authors| {
                authors
                    .iter()
                    .filter_map(|author| author.get("name").and_then(Value::as_str))
                    .map(|name| {
                        serde_json::json!({
                            "name": self.clean_author_name(name),
                            "icon_emoji": AUTHOR_EMOJI,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Pull one labeled field out of the info block ("出版社: 上海译文出版社").
    fn info_field(info_text: &str, label: &str) -> Option<String> {
        let start = info_text.find(label)? + label.len();
        let rest = info_text[start..].trim_start_matches(':').trim_start();
        let line = rest.lines().next()?.trim();
        if line.is_empty() {
            None
        } else {
            Some(line.to_string())
        }
    }

    /// Normalize "2021-5" / "2021-5-1" style dates to `YYYY-MM-DD`, day
    /// defaulting to the first of the month.
    fn normalize_published(raw: &str) -> Option<String> {
        let mut parts = raw.trim().split('-');
        let year: i32 = parts.next()?.parse().ok()?;
        let month: u32 = parts.next()?.parse().ok()?;
        let day: u32 = parts.next().and_then(|d| d.parse().ok()).unwrap_or(1);
        let date = chrono::NaiveDate::from_ymd_opt(year, month, day)?;
        Some(date.format("%Y-%m-%d").to_string())
    }

    fn translators(&self, info_text: &str) -> Option<Vec<Value>> {
        let line = Self::info_field(info_text, "译者")?;
        let translators: Vec<Value> = line
            .split('/')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                serde_json::json!({
                    "name": name,
                    "icon_emoji": AUTHOR_EMOJI,
                })
            })
            .collect();
        if translators.is_empty() {
            None
        } else {
            Some(translators)
        }
    }

    /// The subject page carries up to two intro blocks; the first is the
    /// truncated teaser when it contains an expand link.
    fn description(&self, document: &Html, selectors: &PageSelectors) -> Option<String> {
        let intros: Vec<_> = document.select(&selectors.intro).collect();
        let intro = match intros.first() {
            Some(first) if first.select(&selectors.anchor).next().is_some() => intros.get(1)?,
            Some(first) => first,
            None => return None,
        };

        let paragraphs: Vec<String> = intro
            .select(&selectors.paragraph)
            .map(|p| p.text().collect::<String>().trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        if paragraphs.is_empty() {
            None
        } else {
            Some(paragraphs.join("\n"))
        }
    }

    fn to_record(
        &self,
        isbn: &str,
        douban_url: &str,
        html: &str,
    ) -> Result<Record, ExtractError> {
        let selectors = PageSelectors::new();
        let document = Html::parse_document(html);

        let schema = self
            .schema_object(&document, &selectors)
            .ok_or_else(|| ExtractError::Parse("subject page has no ld+json schema".to_string()))?;
        let title = schema
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ExtractError::Parse("schema object has no book name".to_string()))?;

        let info_text: String = document
            .select(&selectors.info)
            .next()
            .map(|info| info.text().collect())
            .unwrap_or_default();

        let mut record = Record::new();
        record.set("title", title);
        record.set("type", "Book");
        record.set("isbn", isbn);
        record.set("douban_url", douban_url);
        record.set(
            "author",
            Value::Array(self.authors_from_schema(&schema)),
        );

        if let Some(description) = self.description(&document, &selectors) {
            record.set("description", description);
        }
        if let Some(cover) = document
            .select(&selectors.cover)
            .next()
            .and_then(|meta| meta.value().attr("content"))
        {
            record.set("cover_url", cover);
            record.set("icon_url", cover);
        }
        if let Some(publisher) = Self::info_field(&info_text, "出版社") {
            record.set("publisher", publisher);
        }
        if let Some(original_title) = Self::info_field(&info_text, "原作名") {
            record.set("original_title", original_title);
        }
        if let Some(published) = Self::info_field(&info_text, "出版年")
            .and_then(|raw| Self::normalize_published(&raw))
        {
            record.set("published", published);
        }
        if let Some(pages) = Self::info_field(&info_text, "页数")
            .and_then(|raw| raw.parse::<i64>().ok())
        {
            record.set("pages", pages);
        }
        if let Some(translators) = self.translators(&info_text) {
            record.set("translator", Value::Array(translators));
        }
        if let Some(ranking) = document
            .select(&selectors.ranking)
            .next()
            .and_then(|strong| strong.text().collect::<String>().trim().parse::<f64>().ok())
        {
            record.set("douban_ranking", ranking);
        }

        Ok(record)
    }
}

#[async_trait]
impl Extractor for DoubanBookExtractor {
    fn matches(&self, identifier: &str) -> bool {
        let isbn = identifier.replace('-', "");
        self.isbn_pattern.is_match(&isbn)
    }

    async fn extract(&self, identifier: &str) -> Result<Option<Record>, ExtractError> {
        let isbn = identifier.replace('-', "");
        match self.fetch_subject_page(&isbn).await? {
            Some((douban_url, html)) => Ok(Some(self.to_record(&isbn, &douban_url, &html)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SUBJECT_HTML: &str = r#"<html><head>
<meta property="og:image" content="https://img.douban.com/cover.jpg" />
<script type="application/ld+json">
{"name": "思辨与立场 ", "author": [{"name": "[美] 理查德·保罗"}, {"name": "琳达·埃尔德"}]}
</script>
</head><body>
<div id="info">
 <span>出版社:</span> 中国人民大学出版社
 <br/>
 原作名: Critical Thinking
 <br/>
 译者: 李小平 / 张三
 <br/>
 出版年: 2021-5
 <br/>
 页数: 364
</div>
<strong property="v:average">8.4</strong>
<div class="intro"><p>第一段。</p><p>第二段。</p></div>
</body></html>"#;

    fn extractor(base_url: &str) -> DoubanBookExtractor {
        DoubanBookExtractor::with_base_url(base_url).unwrap()
    }

    #[test]
    fn matches_isbn_shapes() {
        let extractor = extractor(DEFAULT_BASE_URL);
        assert!(extractor.matches("9787300264929"));
        assert!(extractor.matches("978-7-300-26492-9"));
        assert!(!extractor.matches("http://ny.zdline.cn/mobile/audioText?artId=1"));
        assert!(!extractor.matches(""));
    }

    #[tokio::test]
    async fn extracts_a_book_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/isbn/9787300264929/"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("Location", "/subject/35217103/"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/subject/35217103/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SUBJECT_HTML))
            .mount(&server)
            .await;

        let extractor = extractor(&server.uri());
        let record = extractor.extract("978-7-300-26492-9").await.unwrap().unwrap();

        assert_eq!(record.get_str("title"), Some("思辨与立场"));
        assert_eq!(record.get_str("type"), Some("Book"));
        assert_eq!(record.get_str("isbn"), Some("9787300264929"));
        assert_eq!(
            record.get_str("douban_url"),
            Some(format!("{}/subject/35217103/", server.uri()).as_str())
        );
        assert_eq!(record.get_str("publisher"), Some("中国人民大学出版社"));
        assert_eq!(record.get_str("original_title"), Some("Critical Thinking"));
        assert_eq!(record.get_str("published"), Some("2021-05-01"));
        assert_eq!(record.get("pages"), Some(&serde_json::json!(364)));
        assert_eq!(record.get("douban_ranking"), Some(&serde_json::json!(8.4)));
        assert_eq!(
            record.get_str("cover_url"),
            Some("https://img.douban.com/cover.jpg")
        );
        assert_eq!(record.get_str("description"), Some("第一段。\n第二段。"));

        let authors = record.people("author").unwrap().unwrap();
        assert_eq!(authors.len(), 2);
        assert_eq!(authors[0].name, "理查德 · 保罗");
        assert_eq!(authors[1].name, "琳达 · 埃尔德");

        let translators = record.people("translator").unwrap().unwrap();
        assert_eq!(translators.len(), 2);
        assert_eq!(translators[0].name, "李小平");
        assert_eq!(translators[1].name, "张三");
    }

    #[tokio::test]
    async fn unknown_isbn_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/isbn/0000000000/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not a redirect"))
            .mount(&server)
            .await;

        let extractor = extractor(&server.uri());
        let result = extractor.extract("0000000000").await.unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn author_names_are_cleaned() {
        let extractor = extractor(DEFAULT_BASE_URL);
        assert_eq!(extractor.clean_author_name("[美] 理查德·保罗"), "理查德 · 保罗");
        assert_eq!(
            extractor.clean_author_name("斯图尔特 ·  基利"),
            "斯图尔特 · 基利"
        );
        assert_eq!(extractor.clean_author_name(" 梁永安 "), "梁永安");
    }

    #[test]
    fn published_dates_are_normalized() {
        assert_eq!(
            DoubanBookExtractor::normalize_published("2021-5").as_deref(),
            Some("2021-05-01")
        );
        assert_eq!(
            DoubanBookExtractor::normalize_published("2021-5-17").as_deref(),
            Some("2021-05-17")
        );
        assert_eq!(DoubanBookExtractor::normalize_published("2021"), None);
    }
}
