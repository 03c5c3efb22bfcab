use std::fmt;
use std::io::Read;

use serde_json::{Map, Value};
use ureq::{Agent, AgentBuilder};
use url::Url;

use crate::config::{Config, ConfigError};
use crate::error::{Error, Result};

const DEFAULT_COUNT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Options for [`Client::phrases`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhrasesOptions {
    /// Number of results to return.
    pub count: u32,
}

impl Default for PhrasesOptions {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
        }
    }
}

/// Options for [`Client::definitions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionsOptions {
    /// Number of results to return.
    pub count: u32,
    /// Only return definitions for this part of speech, e.g. `noun`.
    pub part_of_speech: Option<String>,
}

impl Default for DefinitionsOptions {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            part_of_speech: None,
        }
    }
}

/// Options for [`Client::related_words`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedWordsOptions {
    /// Number of results to return.
    pub count: u32,
    /// Only return one kind of relation, e.g. `synonym` or `antonym`.
    pub relation_type: Option<String>,
}

impl Default for RelatedWordsOptions {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            relation_type: None,
        }
    }
}

/// The client for accessing Wordnik word data.
///
/// Every operation is a single blocking request. Results are the decoded
/// JSON exactly as the service sent it; a 404 comes back as
/// [`Value::Null`]. The client holds no per-request state, so one instance
/// can be cloned or shared across threads.
#[derive(Clone)]
pub struct Client {
    /// The stored API key for your app.
    api_key: String,
    /// Everything requested is relative to this.
    base_uri: Url,
    /// The agent used to make HTTP requests. Carries the timeout.
    agent: Agent,
}

impl Client {
    /// Builds a client whose agent enforces `config.timeout()`. A zero
    /// timeout is rejected, since every request would fail at once.
    pub fn new(config: Config) -> Result<Client> {
        if config.timeout().is_zero() {
            return Err(ConfigError::InvalidTimeout {
                value: "0".to_string(),
            }
            .into());
        }
        let agent = AgentBuilder::new().timeout(config.timeout()).build();
        Client::new_with_agent(config, agent)
    }

    /// Like [`Client::new`], but with a caller-built agent. The config's
    /// timeout is ignored in favour of whatever `agent` was built with.
    pub fn new_with_agent(config: Config, agent: Agent) -> Result<Client> {
        if config.api_key().trim().is_empty() {
            return Err(ConfigError::MissingApiKey.into());
        }

        let base_uri = Url::parse(config.base_uri()).map_err(|e| ConfigError::InvalidBaseUri {
            uri: config.base_uri().to_string(),
            reason: e.to_string(),
        })?;
        if base_uri.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUri {
                uri: config.base_uri().to_string(),
                reason: "URI cannot have path segments appended".to_string(),
            }
            .into());
        }

        Ok(Client {
            api_key: config.api_key().to_string(),
            base_uri,
            agent,
        })
    }

    pub fn base_uri(&self) -> &Url {
        &self.base_uri
    }

    /// Two-word phrases (bigrams) containing `word`.
    pub fn phrases(&self, word: &str, options: &PhrasesOptions) -> Result<Value> {
        let word = require_word("phrases", word)?;
        self.call(
            &["word.json", word, "phrases"],
            &[("count", Some(options.count.to_string()))],
            Method::Get,
        )
    }

    /// Definitions of `word`, optionally restricted to one part of speech.
    pub fn definitions(&self, word: &str, options: &DefinitionsOptions) -> Result<Value> {
        let word = require_word("definitions", word)?;
        self.call(
            &["word.json", word, "definitions"],
            &[
                ("count", Some(options.count.to_string())),
                ("partOfSpeech", options.part_of_speech.clone()),
            ],
            Method::Get,
        )
    }

    /// Example sentences using `word`.
    pub fn examples(&self, word: &str) -> Result<Value> {
        let word = require_word("examples", word)?;
        self.call(&["word.json", word, "examples"], &[], Method::Get)
    }

    /// Words related to `word` (synonyms, antonyms, ...).
    pub fn related_words(&self, word: &str, options: &RelatedWordsOptions) -> Result<Value> {
        let word = require_word("related_words", word)?;
        self.call(
            &["word.json", word, "related"],
            &[
                ("count", Some(options.count.to_string())),
                ("type", options.relation_type.clone()),
            ],
            Method::Get,
        )
    }

    pub fn frequency(&self, word: &str) -> Result<Value> {
        let word = require_word("frequency", word)?;
        self.call(&["word.json", word, "frequency"], &[], Method::Get)
    }

    pub fn punctuation(&self, word: &str) -> Result<Value> {
        let word = require_word("punctuation", word)?;
        self.call(&["word.json", word, "punctuationFactor"], &[], Method::Get)
    }

    pub fn word_of_the_day(&self) -> Result<Value> {
        // The service wants the trailing slash.
        self.call(&["wordoftheday.json", ""], &[], Method::Get)
    }

    pub fn random_word(&self) -> Result<Value> {
        self.call(&["words.json", "randomWord"], &[], Method::Get)
    }

    /// Sends one request and maps the outcome.
    ///
    /// `path` is a list of unencoded segments appended to the base URI.
    /// Params with a `None` value are dropped; the rest become the query
    /// string for GET or a JSON object body for POST.
    ///
    /// 200 decodes the body, 404 is [`Value::Null`], 401 is
    /// [`Error::Unauthorized`], any other status is [`Error::Api`] and a
    /// request that gets no response at all is [`Error::Timeout`].
    ///
    /// A 200 whose body is not JSON (including bytes that are not UTF-8) is
    /// [`Error::Decode`] rather than a null value; an empty 200 body is
    /// [`Value::Null`].
    pub fn call(
        &self,
        path: &[&str],
        params: &[(&str, Option<String>)],
        method: Method,
    ) -> Result<Value> {
        let url = self.url_for(path, params, method);
        log::debug!("{method} {url}");

        let request = self
            .agent
            .request(method.as_str(), url.as_str())
            .set("Content-type", "application/json")
            .set("api_key", &self.api_key);

        let outcome = match method {
            Method::Get => request.call(),
            Method::Post => request.send_json(Value::Object(json_body(params))),
        };

        match outcome {
            Ok(response) if response.status() == 200 => {
                log::debug!("{method} {url} -> 200");
                let mut body = Vec::new();
                // only I/O failures land here: the read deadline or a dropped connection
                response
                    .into_reader()
                    .read_to_end(&mut body)
                    .map_err(|e| Error::Timeout {
                        url: url.to_string(),
                        reason: e.to_string(),
                    })?;
                decode(&url, &body)
            }
            Ok(response) => Err(Error::Api {
                url: url.to_string(),
                status: response.status(),
            }),
            Err(ureq::Error::Status(401, _)) => {
                log::warn!("{method} {url} -> 401, check the API key");
                Err(Error::Unauthorized {
                    url: url.to_string(),
                })
            }
            Err(ureq::Error::Status(404, _)) => {
                log::trace!("{method} {url} -> 404, returning null");
                Ok(Value::Null)
            }
            Err(ureq::Error::Status(status, _)) => {
                log::debug!("{method} {url} -> {status}");
                Err(Error::Api {
                    url: url.to_string(),
                    status,
                })
            }
            Err(ureq::Error::Transport(transport)) => {
                log::debug!("{method} {url} -> no response: {transport}");
                Err(Error::Timeout {
                    url: url.to_string(),
                    reason: transport.to_string(),
                })
            }
        }
    }

    fn url_for(&self, path: &[&str], params: &[(&str, Option<String>)], method: Method) -> Url {
        let mut url = self.base_uri.clone();
        // cannot-be-a-base URIs are rejected at construction
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(path);
        }

        let mut present = present_params(params).peekable();
        if method == Method::Get && present.peek().is_some() {
            url.query_pairs_mut().extend_pairs(present);
        }
        url
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_key", &"<redacted>")
            .field("base_uri", &self.base_uri.as_str())
            .finish_non_exhaustive()
    }
}

/// Rejects words that are blank or that would not survive as a single path
/// segment.
///
/// `.` and `..` count as invalid too: URL normalisation drops them as
/// segments, so `/word.json/../examples` would reach a different endpoint.
fn require_word<'a>(operation: &'static str, word: &'a str) -> Result<&'a str> {
    if word.trim().is_empty() || word == "." || word == ".." {
        return Err(Error::InvalidArgument { operation });
    }
    Ok(word)
}

fn present_params<'a>(
    params: &'a [(&'a str, Option<String>)],
) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
    params
        .iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (*name, v)))
}

fn json_body(params: &[(&str, Option<String>)]) -> Map<String, Value> {
    present_params(params)
        .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
        .collect()
}

fn decode(url: &Url, body: &[u8]) -> Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|source| Error::Decode {
        url: url.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client(base: &str) -> Client {
        Client::new(Config::new("test-key").with_base_uri(base)).unwrap()
    }

    #[test]
    fn definitions_url_carries_count_and_part_of_speech() {
        let c = client("http://api.wordnik.com/api");
        let url = c.url_for(
            &["word.json", "donkey", "definitions"],
            &[
                ("count", Some("5".to_string())),
                ("partOfSpeech", Some("noun".to_string())),
            ],
            Method::Get,
        );
        assert_eq!(url.path(), "/api/word.json/donkey/definitions");
        assert_eq!(url.query(), Some("count=5&partOfSpeech=noun"));
    }

    #[test]
    fn absent_params_are_dropped() {
        let c = client("http://api.wordnik.com/api");
        let url = c.url_for(
            &["word.json", "donkey", "related"],
            &[("count", Some("10".to_string())), ("type", None)],
            Method::Get,
        );
        assert_eq!(url.query(), Some("count=10"));

        let url = c.url_for(&["word.json", "donkey", "examples"], &[("type", None)], Method::Get);
        assert_eq!(url.query(), None);
    }

    #[test]
    fn post_keeps_params_out_of_the_url() {
        let c = client("http://api.wordnik.com/api");
        let url = c.url_for(&["words.json"], &[("count", Some("3".to_string()))], Method::Post);
        assert_eq!(url.query(), None);
        assert_eq!(
            Value::Object(json_body(&[("count", Some("3".to_string())), ("type", None)])),
            serde_json::json!({"count": "3"})
        );
    }

    #[test]
    fn word_is_encoded_as_one_segment() {
        let c = client("http://api.wordnik.com/api");
        let url = c.url_for(&["word.json", "ice cream/x?y#z", "examples"], &[], Method::Get);
        assert_eq!(url.path(), "/api/word.json/ice%20cream%2Fx%3Fy%23z/examples");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn trailing_slash_on_base_is_tolerated() {
        let c = client("http://api.wordnik.com/api/");
        let url = c.url_for(&["words.json", "randomWord"], &[], Method::Get);
        assert_eq!(url.as_str(), "http://api.wordnik.com/api/words.json/randomWord");
    }

    #[test]
    fn word_of_the_day_path_keeps_trailing_slash() {
        let c = client("http://api.wordnik.com/api");
        let url = c.url_for(&["wordoftheday.json", ""], &[], Method::Get);
        assert_eq!(url.as_str(), "http://api.wordnik.com/api/wordoftheday.json/");
    }

    #[test]
    fn blank_words_are_rejected() {
        for word in ["", " ", "\t\n", ".", ".."] {
            let err = require_word("examples", word).unwrap_err();
            assert!(
                matches!(err, Error::InvalidArgument { operation: "examples" }),
                "{word:?}"
            );
        }
        assert_eq!(require_word("examples", " donkey ").unwrap(), " donkey ");
    }

    #[test]
    fn blank_words_fail_before_any_request() {
        // Nothing listens here; a request would come back as a timeout.
        let c = Client::new(
            Config::new("test-key")
                .with_base_uri("http://127.0.0.1:9/api")
                .with_timeout(Duration::from_millis(50)),
        )
        .unwrap();

        let results = [
            c.phrases("  ", &PhrasesOptions::default()),
            c.definitions("", &DefinitionsOptions::default()),
            c.examples(" "),
            c.related_words("", &RelatedWordsOptions::default()),
            c.frequency("\t"),
            c.punctuation(""),
        ];
        for result in results {
            assert!(matches!(result, Err(Error::InvalidArgument { .. })));
        }
    }

    #[test]
    fn construction_validates_config() {
        let err = Client::new(Config::new("  ")).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::MissingApiKey)));

        let err = Client::new(Config::new("k").with_base_uri("not a uri")).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidBaseUri { .. })));

        let err = Client::new(Config::new("k").with_base_uri("mailto:someone@example.com"))
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidBaseUri { .. })));
    }

    #[test]
    fn debug_hides_key() {
        let shown = format!("{:?}", client("http://api.wordnik.com/api"));
        assert!(!shown.contains("test-key"));
    }

    #[test]
    fn defaults_ask_for_ten_results() {
        assert_eq!(PhrasesOptions::default().count, 10);
        assert_eq!(DefinitionsOptions::default().count, 10);
        assert_eq!(RelatedWordsOptions::default().count, 10);
        assert_eq!(DefinitionsOptions::default().part_of_speech, None);
    }

    #[test]
    fn empty_body_decodes_to_null() {
        let url = Url::parse("http://localhost/").unwrap();
        assert_eq!(decode(&url, b"  ").unwrap(), Value::Null);
        assert_eq!(decode(&url, b"").unwrap(), Value::Null);
        assert!(matches!(decode(&url, b"<html>"), Err(Error::Decode { .. })));
    }

    #[test]
    fn invalid_utf8_is_a_decode_error() {
        let url = Url::parse("http://localhost/").unwrap();
        assert!(matches!(
            decode(&url, b"[\"ab\xff\"]"),
            Err(Error::Decode { .. })
        ));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = Client::new(Config::new("k").with_timeout(Duration::ZERO)).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidTimeout { .. })
        ));
    }
}
