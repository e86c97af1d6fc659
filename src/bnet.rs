use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::cache::ItemCache;
use crate::config::{Config, Locale, Region};
use crate::model::{Equipment, Fetch, ItemData, Realm, Token};

const AUTH_SCOPE: &str = "wow.profile";
const NAMESPACE_HEADER: &str = "Battlenet-Namespace";
const ITEM_SEARCH_PATH: &str = "/data/wow/search/item";
const REALM_SEARCH_PATH: &str = "/data/wow/search/connected-realm";
const SEARCH_PAGE_SIZE: u32 = 1000;
const LEVEL_WINDOW: u32 = 50;
const NON_EQUIP: &str = "NON_EQUIP";
/// Pause before resolving a batch of search results, to stay under the API rate limit.
const SEARCH_COOLDOWN: Duration = Duration::from_secs(1);

/// Failures that end the run. Data calls never produce these, they report
/// `Fetch::Unavailable` instead.
#[derive(Debug, thiserror::Error)]
pub enum BnetError {
    #[error("Invalid authentication, status code: {0}")]
    AuthRejected(StatusCode),
    #[error("Authentication request failed: {0}")]
    AuthTransport(#[from] reqwest::Error),
    #[error("Token lifetime out of range: {0}s")]
    InvalidExpiry(i64),
}

/// The part of the configuration the client reads.
#[derive(Debug, Clone)]
pub struct Settings {
    pub region: Region,
    pub locale: Locale,
    pub realm: String,
    pub character: String,
    pub client_id: String,
    pub client_secret: String,
}

impl From<&Config> for Settings {
    fn from(config: &Config) -> Self {
        Self {
            region: config.region(),
            locale: config.locale(),
            realm: config.realm.clone(),
            character: config.character.clone(),
            client_id: config.client.id.clone(),
            client_secret: config.client.secret.clone(),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Deserialize)]
struct SearchPage<T> {
    #[serde(rename = "pageCount", default)]
    page_count: u32,
    #[serde(default = "Vec::new")]
    results: Vec<SearchResult<T>>,
}

#[derive(Deserialize)]
struct SearchResult<T> {
    data: T,
}

#[derive(Deserialize)]
struct ConnectedRealm {
    realms: Vec<RealmEntry>,
}

#[derive(Deserialize)]
struct RealmEntry {
    name: HashMap<String, String>,
    slug: String,
}

#[derive(Deserialize)]
struct ItemRef {
    id: u64,
}

#[derive(Deserialize)]
struct EquipmentResponse {
    equipped_items: Vec<EquippedItem>,
}

#[derive(Deserialize)]
struct EquippedItem {
    item: ItemRef,
    slot: SlotRef,
}

#[derive(Deserialize)]
struct SlotRef {
    #[serde(rename = "type")]
    slot_type: String,
}

/// Battle.net API client holding its own access token.
pub struct BnetClient {
    http: Client,
    settings: Settings,
    auth_base: String,
    api_base: String,
    token: Option<Token>,
    cooldown: Duration,
}

impl BnetClient {
    pub fn new(config: &Config) -> Self {
        let settings = Settings::from(config);
        let region = settings.region;
        Self {
            http: Client::new(),
            settings,
            auth_base: format!("https://{}.battle.net", region),
            api_base: format!("https://{}.api.blizzard.com", region),
            token: None,
            cooldown: SEARCH_COOLDOWN,
        }
    }

    /// Point the client at other hosts (used against mock servers).
    #[cfg(test)]
    pub fn with_base_urls(mut self, auth_base: impl Into<String>, api_base: impl Into<String>) -> Self {
        self.auth_base = auth_base.into();
        self.api_base = api_base.into();
        self
    }

    #[cfg(test)]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Realm and character are usually only known after the realm list was shown.
    pub fn set_character(&mut self, realm: &str, character: &str) {
        self.settings.realm = realm.to_string();
        self.settings.character = character.to_string();
    }

    /// Fetch a token via client credentials unless the current one is still valid.
    pub async fn authenticate(&mut self) -> Result<(), BnetError> {
        if self
            .token
            .as_ref()
            .is_some_and(|t| t.is_valid_at(OffsetDateTime::now_utc()))
        {
            return Ok(());
        }

        debug!("Requesting access token");
        let resp = self
            .http
            .post(format!("{}/oauth/token", self.auth_base))
            .basic_auth(&self.settings.client_id, Some(&self.settings.client_secret))
            .form(&[("grant_type", "client_credentials"), ("scope", AUTH_SCOPE)])
            .send()
            .await?;

        if resp.status() != StatusCode::OK {
            return Err(BnetError::AuthRejected(resp.status()));
        }

        let body: TokenResponse = resp.json().await?;
        let expires_at = OffsetDateTime::now_utc()
            .checked_add(time::Duration::seconds(body.expires_in))
            .ok_or(BnetError::InvalidExpiry(body.expires_in))?;
        self.token = Some(Token {
            access_token: body.access_token,
            expires_at,
        });
        debug!("Token refreshed, expires in {}s", body.expires_in);
        Ok(())
    }

    fn bearer(&self) -> &str {
        self.token.as_ref().map_or("", |t| t.access_token.as_str())
    }

    fn namespace(&self, kind: &str) -> String {
        format!("{}-{}", kind, self.settings.region)
    }

    /// Authenticated GET against the data API. `locale` is always added to
    /// the query. Only authentication problems are returned as errors.
    pub async fn get(
        &mut self,
        path: &str,
        namespace: &str,
        query: &[(&str, String)],
    ) -> Result<Fetch<Value>, BnetError> {
        self.authenticate().await?;

        let mut params: Vec<(&str, String)> = vec![("locale", self.settings.locale.to_string())];
        params.extend(query.iter().cloned());

        let mut req = self
            .http
            .get(format!("{}{}", self.api_base, path))
            .query(&params)
            .bearer_auth(self.bearer())
            .header(ACCEPT, "application/json");
        if !namespace.is_empty() {
            req = req.header(NAMESPACE_HEADER, namespace);
        }

        debug!("GET {} ({})", path, namespace);
        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) => return Ok(unavailable(format!("Request to {} failed: {}", path, e))),
        };
        let status = resp.status();
        if status.as_u16() >= 400 {
            return Ok(unavailable(format!(
                "Invalid API status code for {}: {}",
                path,
                status.as_u16()
            )));
        }

        match resp.json::<Value>().await {
            Ok(body) => Ok(Fetch::Data(body)),
            Err(e) => Ok(unavailable(format!("Unreadable response from {}: {}", path, e))),
        }
    }

    /// First page of connected realms, flattened and sorted by name.
    pub async fn realms_list(&mut self) -> Result<Fetch<Vec<Realm>>, BnetError> {
        let namespace = self.namespace("dynamic");
        let locale = self.settings.locale.as_str();
        let page = self
            .get(REALM_SEARCH_PATH, &namespace, &[("_page", "1".to_string())])
            .await?
            .and_then(|v| decode::<SearchPage<ConnectedRealm>>(REALM_SEARCH_PATH, v));

        Ok(page.map(|page| {
            let mut realms: Vec<Realm> = page
                .results
                .into_iter()
                .flat_map(|r| r.data.realms)
                .map(|mut r| Realm {
                    name: r.name.remove(locale).unwrap_or_else(|| r.slug.clone()),
                    slug: r.slug,
                })
                .collect();
            realms.sort_by(|a, b| a.name.cmp(&b.name));
            realms
        }))
    }

    /// Equipped items of the configured character, keyed by slot type.
    /// Slots whose item detail cannot be fetched are left out.
    pub async fn character_equipment(
        &mut self,
        cache: &mut ItemCache,
    ) -> Result<Fetch<Equipment>, BnetError> {
        let path = format!(
            "/profile/wow/character/{}/{}/equipment",
            self.settings.realm,
            self.settings.character.to_lowercase()
        );
        let namespace = self.namespace("profile");
        let equipment = match self
            .get(&path, &namespace, &[])
            .await?
            .and_then(|v| decode::<EquipmentResponse>(&path, v))
        {
            Fetch::Data(e) => e,
            Fetch::Unavailable(reason) => return Ok(Fetch::Unavailable(reason)),
        };

        let mut result = Equipment::new();
        for equipped in equipment.equipped_items {
            match self.item_data(equipped.item.id, cache).await? {
                Fetch::Data(item) => {
                    result.insert(equipped.slot.slot_type, item);
                }
                Fetch::Unavailable(reason) => {
                    warn!("Skipping {} slot: {}", equipped.slot.slot_type, reason);
                }
            }
        }
        Ok(Fetch::Data(result))
    }

    /// Item detail, from the cache when possible. Only successful fetches are cached.
    pub async fn item_data(
        &mut self,
        item_id: u64,
        cache: &mut ItemCache,
    ) -> Result<Fetch<ItemData>, BnetError> {
        if let Some(cached) = cache.get(item_id) {
            debug!("Item {} served from cache", item_id);
            return Ok(Fetch::Data(cached.clone()));
        }

        let namespace = self.namespace("static");
        let fetched = self
            .get(&format!("/data/wow/item/{}", item_id), &namespace, &[])
            .await?;
        if let Fetch::Data(item) = &fetched {
            cache.set(item_id, item.clone());
        }
        Ok(fetched)
    }

    /// Every equippable item of `slot` with a level in `(min_level, min_level + 50]`.
    ///
    /// All search pages are collected first, then each result is resolved
    /// through [`Self::item_data`] after a fixed cooldown.
    pub async fn top_items(
        &mut self,
        min_level: u32,
        slot: &str,
        cache: &mut ItemCache,
    ) -> Result<Fetch<Vec<ItemData>>, BnetError> {
        let namespace = self.namespace("static");
        let level = format!("({},{}]", min_level, min_level + LEVEL_WINDOW);
        let mut item_ids = Vec::new();
        let mut page: u32 = 1;

        loop {
            let query = [
                ("orderby", "level:desc".to_string()),
                ("_page", page.to_string()),
                ("_pageSize", SEARCH_PAGE_SIZE.to_string()),
                ("level", level.clone()),
                ("inventory_type.type", slot.to_string()),
            ];
            let results = match self
                .get(ITEM_SEARCH_PATH, &namespace, &query)
                .await?
                .and_then(|v| decode::<SearchPage<ItemRef>>(ITEM_SEARCH_PATH, v))
            {
                Fetch::Data(p) => p,
                Fetch::Unavailable(reason) => return Ok(Fetch::Unavailable(reason)),
            };

            item_ids.extend(results.results.into_iter().map(|r| r.data.id));
            if page >= results.page_count {
                break;
            }
            page += 1;
        }
        debug!("{} search results for {} in {}", item_ids.len(), slot, level);

        tokio::time::sleep(self.cooldown).await;

        let mut items = Vec::with_capacity(item_ids.len());
        for item_id in item_ids {
            match self.item_data(item_id, cache).await? {
                Fetch::Data(item) => {
                    if item["inventory_type"]["type"].as_str() != Some(NON_EQUIP) {
                        items.push(item);
                    }
                }
                Fetch::Unavailable(reason) => warn!("Skipping item {}: {}", item_id, reason),
            }
        }
        Ok(Fetch::Data(items))
    }
}

fn unavailable<T>(reason: String) -> Fetch<T> {
    warn!("{}", reason);
    Fetch::Unavailable(reason)
}

fn decode<T: DeserializeOwned>(path: &str, body: Value) -> Fetch<T> {
    match serde_json::from_value(body) {
        Ok(v) => Fetch::Data(v),
        Err(e) => unavailable(format!("Unexpected response shape from {}: {}", path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{basic_auth, bearer_token, body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> Config {
        let mut config = Config::default();
        config.client.id = "client-id".to_string();
        config.client.secret = "client-secret".to_string();
        config.set_region("eu").unwrap();
        config.set_locale("en_GB").unwrap();
        config.realm = "hyjal".to_string();
        config.character = "Thrall".to_string();
        config
    }

    fn test_client(server: &MockServer) -> BnetClient {
        BnetClient::new(&test_config())
            .with_base_urls(server.uri(), server.uri())
            .with_cooldown(Duration::ZERO)
    }

    fn test_cache() -> (TempDir, ItemCache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = ItemCache::new(dir.path().join("cache.json"));
        (dir, cache)
    }

    async fn mount_auth(server: &MockServer, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(basic_auth("client-id", "client-secret"))
            .and(body_string_contains("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "fake_token",
                "token_type": "bearer",
                "expires_in": 86399
            })))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    async fn mount_item(server: &MockServer, id: u64, inventory_type: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/data/wow/item/{}", id)))
            .and(header(NAMESPACE_HEADER, "static-eu"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": id,
                "name": format!("Item {}", id),
                "level": 200,
                "inventory_type": {"type": inventory_type},
                "item_subclass": {"id": 4}
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_valid_token_is_reused() {
        let server = MockServer::start().await;
        mount_auth(&server, 1).await;
        let mut client = test_client(&server);

        client.authenticate().await.unwrap();
        client.authenticate().await.unwrap();
        client.authenticate().await.unwrap();

        assert_eq!(client.bearer(), "fake_token");
        // MockServer verifies the single auth call on drop
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed() {
        let server = MockServer::start().await;
        mount_auth(&server, 1).await;
        let mut client = test_client(&server);
        let before = OffsetDateTime::now_utc();
        client.token = Some(Token {
            access_token: "stale".to_string(),
            expires_at: before - time::Duration::seconds(1),
        });

        client.authenticate().await.unwrap();

        let token = client.token.as_ref().unwrap();
        assert_eq!(token.access_token, "fake_token");
        assert!(token.expires_at >= before + time::Duration::seconds(86399));
    }

    #[tokio::test]
    async fn test_rejected_auth_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        let mut client = test_client(&server);

        let err = client.get("/data/wow/item/1", "static-eu", &[]).await.unwrap_err();
        assert!(matches!(err, BnetError::AuthRejected(s) if s == StatusCode::UNAUTHORIZED));
        assert!(client.token.is_none());
    }

    #[tokio::test]
    async fn test_out_of_range_token_lifetime_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "fake_token",
                "token_type": "bearer",
                "expires_in": i64::MAX
            })))
            .mount(&server)
            .await;
        let mut client = test_client(&server);

        let err = client.authenticate().await.unwrap_err();
        assert!(matches!(err, BnetError::InvalidExpiry(i64::MAX)));
        assert!(client.token.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_api_is_unavailable() {
        let server = MockServer::start().await;
        mount_auth(&server, 1).await;
        // Nothing listens on port 1
        let mut client = BnetClient::new(&test_config())
            .with_base_urls(server.uri(), "http://127.0.0.1:1")
            .with_cooldown(Duration::ZERO);

        let res = client.get("/data/wow/item/1", "static-eu", &[]).await.unwrap();
        assert!(matches!(res, Fetch::Unavailable(ref reason) if reason.contains("/data/wow/item/1")));
        assert!(client.token.is_some());
    }

    #[tokio::test]
    async fn test_not_found_is_unavailable() {
        let server = MockServer::start().await;
        mount_auth(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/data/wow/item/1"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let mut client = test_client(&server);

        let res = client.get("/data/wow/item/1", "static-eu", &[]).await.unwrap();
        assert!(res.is_unavailable());
    }

    #[tokio::test]
    async fn test_get_sends_headers_and_locale() {
        let server = MockServer::start().await;
        mount_auth(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/data/wow/thing"))
            .and(bearer_token("fake_token"))
            .and(header("accept", "application/json"))
            .and(header(NAMESPACE_HEADER, "dynamic-eu"))
            .and(query_param("locale", "en_GB"))
            .and(query_param("extra", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;
        let mut client = test_client(&server);

        let res = client
            .get("/data/wow/thing", "dynamic-eu", &[("extra", "1".to_string())])
            .await
            .unwrap();
        assert_eq!(res, Fetch::Data(json!({"ok": true})));
    }

    #[tokio::test]
    async fn test_realms_list_is_flattened_and_sorted() {
        let server = MockServer::start().await;
        mount_auth(&server, 1).await;
        let body = json!({
            "page": 1,
            "pageCount": 4,
            "results": [
                {"data": {"realms": [
                    {"name": {"en_GB": "Ysondre", "fr_FR": "Ysondre"}, "slug": "ysondre"},
                    {"name": {"en_GB": "Archimonde", "fr_FR": "Archimonde"}, "slug": "archimonde"}
                ]}},
                {"data": {"realms": [
                    {"name": {"en_GB": "Hyjal", "fr_FR": "Hyjal"}, "slug": "hyjal"}
                ]}}
            ]
        });
        Mock::given(method("GET"))
            .and(path(REALM_SEARCH_PATH))
            .and(header(NAMESPACE_HEADER, "dynamic-eu"))
            .and(query_param("_page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;
        let mut client = test_client(&server);

        let realms = client.realms_list().await.unwrap().data().unwrap();
        let slugs: Vec<&str> = realms.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, vec!["archimonde", "hyjal", "ysondre"]);
        assert_eq!(realms[1].name, "Hyjal");
    }

    #[tokio::test]
    async fn test_realms_list_unavailable() {
        let server = MockServer::start().await;
        mount_auth(&server, 1).await;
        Mock::given(method("GET"))
            .and(path(REALM_SEARCH_PATH))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        let mut client = test_client(&server);

        assert!(client.realms_list().await.unwrap().is_unavailable());
    }

    #[tokio::test]
    async fn test_item_data_is_cached() {
        let server = MockServer::start().await;
        mount_auth(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/data/wow/item/6"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 6})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/data/wow/item/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 5})))
            .expect(0)
            .mount(&server)
            .await;
        let mut client = test_client(&server);
        let (_dir, mut cache) = test_cache();
        cache.set(5, json!({"id": 5, "cached": true}));

        let hit = client.item_data(5, &mut cache).await.unwrap();
        assert_eq!(hit, Fetch::Data(json!({"id": 5, "cached": true})));

        let first = client.item_data(6, &mut cache).await.unwrap();
        let second = client.item_data(6, &mut cache).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.get(6), Some(&json!({"id": 6})));
    }

    #[tokio::test]
    async fn test_unavailable_item_is_not_cached() {
        let server = MockServer::start().await;
        mount_auth(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/data/wow/item/9"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let mut client = test_client(&server);
        let (_dir, mut cache) = test_cache();

        assert!(client.item_data(9, &mut cache).await.unwrap().is_unavailable());
        assert!(cache.get(9).is_none());
    }

    #[tokio::test]
    async fn test_top_items_pagination_and_filtering() {
        let server = MockServer::start().await;
        mount_auth(&server, 1).await;

        let pages = [vec![1, 2], vec![3], vec![4]];
        for (i, ids) in pages.iter().enumerate() {
            let results: Vec<Value> = ids.iter().map(|id| json!({"data": {"id": id}})).collect();
            Mock::given(method("GET"))
                .and(path(ITEM_SEARCH_PATH))
                .and(header(NAMESPACE_HEADER, "static-eu"))
                .and(query_param("_page", (i + 1).to_string()))
                .and(query_param("_pageSize", "1000"))
                .and(query_param("orderby", "level:desc"))
                .and(query_param("level", "(200,250]"))
                .and(query_param("inventory_type.type", "HEAD"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "page": i + 1,
                    "pageCount": 3,
                    "results": results
                })))
                .expect(1)
                .mount(&server)
                .await;
        }
        mount_item(&server, 1, "HEAD").await;
        mount_item(&server, 2, "HEAD").await;
        mount_item(&server, 3, NON_EQUIP).await;
        mount_item(&server, 4, "HEAD").await;

        let mut client = test_client(&server);
        let (_dir, mut cache) = test_cache();
        let items = client
            .top_items(200, "HEAD", &mut cache)
            .await
            .unwrap()
            .data()
            .unwrap();

        let ids: Vec<u64> = items.iter().filter_map(|i| i["id"].as_u64()).collect();
        assert_eq!(ids, vec![1, 2, 4]);
        // Filtered items are still cached
        assert!(cache.get(3).is_some());

        // Every search page is requested before any item lookup
        let requests = server.received_requests().await.unwrap();
        let paths: Vec<String> = requests
            .iter()
            .map(|r| r.url.path().to_string())
            .filter(|p| p != "/oauth/token")
            .collect();
        assert_eq!(paths.len(), 7);
        assert!(paths[..3].iter().all(|p| p == ITEM_SEARCH_PATH));
        assert!(paths[3..].iter().all(|p| p.starts_with("/data/wow/item/")));
    }

    #[tokio::test]
    async fn test_top_items_unavailable_page() {
        let server = MockServer::start().await;
        mount_auth(&server, 1).await;
        Mock::given(method("GET"))
            .and(path(ITEM_SEARCH_PATH))
            .and(query_param("_page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pageCount": 2,
                "results": [{"data": {"id": 1}}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(ITEM_SEARCH_PATH))
            .and(query_param("_page", "2"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let mut client = test_client(&server);
        let (_dir, mut cache) = test_cache();

        let res = client.top_items(10, "HEAD", &mut cache).await.unwrap();
        assert!(res.is_unavailable());
    }

    #[tokio::test]
    async fn test_character_equipment_by_slot() {
        let server = MockServer::start().await;
        mount_auth(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/profile/wow/character/hyjal/thrall/equipment"))
            .and(header(NAMESPACE_HEADER, "profile-eu"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "equipped_items": [
                    {"item": {"id": 1}, "slot": {"type": "HEAD"}},
                    {"item": {"id": 2}, "slot": {"type": "FINGER_1"}},
                    {"item": {"id": 77}, "slot": {"type": "BACK"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;
        mount_item(&server, 1, "HEAD").await;
        mount_item(&server, 2, "FINGER").await;
        Mock::given(method("GET"))
            .and(path("/data/wow/item/77"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let mut client = test_client(&server);
        let (_dir, mut cache) = test_cache();
        let equipment = client
            .character_equipment(&mut cache)
            .await
            .unwrap()
            .data()
            .unwrap();

        assert_eq!(equipment.len(), 2);
        assert_eq!(equipment["HEAD"]["id"], 1);
        assert_eq!(equipment["FINGER_1"]["id"], 2);
        assert!(!equipment.contains_key("BACK"));
    }
}
