use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use placefinder_types::geo::GeoPoint;
use placefinder_types::GeoCoordinates;
use reqwest::RequestBuilder;
use serde::Deserialize;

use super::{Address, Place, SearchEngine, SearchOptions, TextQuery};
use crate::config::SdkOptions;
use crate::error::SearchError;

/// [`SearchEngine`] backed by the HERE Geocoding & Search REST service.
///
/// Created by [`SdkEngine::search_engine`](crate::SdkEngine::search_engine). Stops working once the
/// engine is disposed.
#[derive(Debug, Clone)]
pub struct HereSearchEngine {
    http_client: reqwest::Client,
    options: Arc<SdkOptions>,
    disposed: Arc<AtomicBool>,
}

impl HereSearchEngine {
    pub(crate) fn new(
        http_client: reqwest::Client,
        options: Arc<SdkOptions>,
        disposed: Arc<AtomicBool>,
    ) -> Self {
        Self {
            http_client,
            options,
            disposed,
        }
    }

    fn suggest_request(&self, query: &TextQuery, options: &SearchOptions) -> RequestBuilder {
        let mut params = vec![
            ("q", query.text.trim().to_string()),
            ("at", query_point(query.at)),
            ("limit", options.max_items.to_string()),
        ];
        if let Some(language) = &options.language {
            params.push(("lang", language.clone()));
        }
        params.push(("apiKey", self.options.access_key_secret().to_string()));

        self.http_client
            .get(self.options.autosuggest_url())
            .query(&params)
    }

    fn nearby_request(&self, at: GeoCoordinates, options: &SearchOptions) -> RequestBuilder {
        let mut params = vec![
            ("at", query_point(at)),
            ("limit", options.max_items.to_string()),
        ];
        if let Some(language) = &options.language {
            params.push(("lang", language.clone()));
        }
        params.push(("apiKey", self.options.access_key_secret().to_string()));

        self.http_client
            .get(self.options.reverse_geocode_url())
            .query(&params)
    }

    async fn fetch(&self, request: RequestBuilder) -> Result<Vec<Place>, SearchError> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(SearchError::EngineUnavailable);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::debug!("Search service returned {status}: {body}");
            return Err(error_from_status(status.as_u16(), &body));
        }

        let body = response.text().await?;
        parse_items(&body)
    }
}

#[async_trait]
impl SearchEngine for HereSearchEngine {
    async fn suggest(
        &self,
        query: &TextQuery,
        options: &SearchOptions,
    ) -> Result<Vec<Place>, SearchError> {
        if query.is_blank() {
            return Ok(vec![]);
        }

        self.fetch(self.suggest_request(query, options)).await
    }

    async fn nearby(
        &self,
        coordinates: GeoCoordinates,
        options: &SearchOptions,
    ) -> Result<Vec<Place>, SearchError> {
        self.fetch(self.nearby_request(coordinates, options)).await
    }
}

fn query_point(point: GeoCoordinates) -> String {
    format!("{:.6},{:.6}", point.lat(), point.lon())
}

#[derive(Debug, Deserialize)]
struct ItemsResponse {
    #[serde(default)]
    items: Vec<ResponseItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseItem {
    title: String,
    id: Option<String>,
    result_type: Option<String>,
    address: Option<ResponseAddress>,
    position: Option<ResponsePosition>,
    distance: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ResponseAddress {
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponsePosition {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    title: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl From<ResponseItem> for Place {
    fn from(item: ResponseItem) -> Self {
        let mut place = Place::new(item.title);
        if let Some(id) = item.id {
            place = place.with_id(id);
        }
        if let Some(result_type) = item.result_type {
            place = place.with_result_type(result_type);
        }
        if let Some(label) = item.address.and_then(|address| address.label) {
            place = place.with_address(Address::new(label));
        }
        if let Some(position) = item.position {
            match GeoCoordinates::new(position.lat, position.lng) {
                Ok(coordinates) => place = place.with_coordinates(coordinates),
                Err(err) => log::warn!("Ignoring position of '{}': {err}", place.title()),
            }
        }
        if let Some(distance) = item.distance {
            place = place.with_distance(distance);
        }

        place
    }
}

fn parse_items(body: &str) -> Result<Vec<Place>, SearchError> {
    let response: ItemsResponse = serde_json::from_str(body)?;
    Ok(response.items.into_iter().map(Place::from).collect())
}

fn error_from_status(status: u16, body: &str) -> SearchError {
    match status {
        401 | 403 => SearchError::Authorization,
        429 => SearchError::Quota,
        _ => {
            let response: ErrorResponse = serde_json::from_str(body).unwrap_or_default();
            let message = response
                .title
                .or(response.error_description)
                .or(response.error)
                .unwrap_or_default();
            SearchError::Service { status, message }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;
    use insta::assert_compact_debug_snapshot;
    use placefinder_types::latlon;

    use super::*;

    const AUTOSUGGEST_RESPONSE: &str = r#"{
        "items": [
            {
                "title": "Berlin, Deutschland",
                "id": "here:cm:namedplace:20187403",
                "resultType": "locality",
                "address": { "label": "Berlin, Deutschland" },
                "position": { "lat": 52.51604, "lng": 13.37691 },
                "distance": 1185
            },
            {
                "title": "berlin hotels",
                "id": "here:cm:ontology:500-5000",
                "resultType": "categoryQuery",
                "href": "https://autosuggest.search.hereapi.com/v1/discover?q=berlin"
            }
        ],
        "queryTerms": []
    }"#;

    fn engine() -> HereSearchEngine {
        HereSearchEngine::new(
            reqwest::Client::new(),
            Arc::new(SdkOptions::new("key-id", "secret")),
            Arc::new(AtomicBool::new(false)),
        )
    }

    fn query_pairs(request: RequestBuilder) -> HashMap<String, String> {
        let request = request.build().unwrap();
        request.url().query_pairs().into_owned().collect()
    }

    #[test]
    fn parse_autosuggest_items() {
        let places = parse_items(AUTOSUGGEST_RESPONSE).unwrap();

        assert_eq!(places.len(), 2);
        assert_eq!(places[0].title(), "Berlin, Deutschland");
        assert_eq!(places[0].result_type(), Some("locality"));
        assert_eq!(places[0].address().unwrap().text(), "Berlin, Deutschland");
        assert_eq!(places[0].coordinates(), Some(latlon!(52.51604, 13.37691)));
        assert_eq!(places[0].distance(), Some(1185.0));

        assert_eq!(places[1].title(), "berlin hotels");
        assert_eq!(places[1].coordinates(), None);
        assert_eq!(places[1].address(), None);
    }

    #[test]
    fn parse_empty_and_invalid_bodies() {
        assert_eq!(parse_items("{}").unwrap(), vec![]);
        assert_matches!(parse_items("<html>"), Err(SearchError::InvalidResponse(_)));
    }

    #[test]
    fn out_of_range_position_is_dropped() {
        let body = r#"{"items":[{"title":"Nowhere","position":{"lat":123.0,"lng":0.0}}]}"#;
        let places = parse_items(body).unwrap();

        assert_eq!(places[0].coordinates(), None);
    }

    #[test]
    fn status_codes() {
        assert_eq!(error_from_status(401, ""), SearchError::Authorization);
        assert_eq!(error_from_status(403, ""), SearchError::Authorization);
        assert_eq!(error_from_status(429, ""), SearchError::Quota);

        let body = r#"{"status":400,"title":"Illegal input for parameter 'at'"}"#;
        assert_compact_debug_snapshot!(
            error_from_status(400, body),
            @r#"Service { status: 400, message: "Illegal input for parameter 'at'" }"#
        );
        assert_compact_debug_snapshot!(
            error_from_status(503, "unavailable"),
            @r#"Service { status: 503, message: "" }"#
        );
    }

    #[test]
    fn suggest_request_parameters() {
        let options = SearchOptions {
            max_items: 5,
            language: Some("de-DE".into()),
        };
        let query = TextQuery::new(" Berlin ", latlon!(52.530932, 13.384915));
        let request = engine().suggest_request(&query, &options);
        let params = query_pairs(request);

        assert_eq!(params["q"], "Berlin");
        assert_eq!(params["at"], "52.530932,13.384915");
        assert_eq!(params["limit"], "5");
        assert_eq!(params["lang"], "de-DE");
        assert_eq!(params["apiKey"], "secret");
    }

    #[test]
    fn nearby_request_parameters() {
        let options = SearchOptions::with_max_items(10);
        let request = engine().nearby_request(latlon!(48.8566, 2.3522), &options);
        let url = request.build().unwrap().url().clone();

        assert_eq!(url.path(), "/v1/revgeocode");
        assert_eq!(url.host_str(), Some("revgeocode.search.hereapi.com"));

        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(params["at"], "48.856600,2.352200");
        assert_eq!(params["limit"], "10");
        assert!(!params.contains_key("lang"));
    }

    #[test]
    fn blank_query_is_not_sent() {
        let options = SearchOptions::with_max_items(5);
        let query = TextQuery::new("   ", latlon!(0.0, 0.0));

        let result = tokio_test::block_on(engine().suggest(&query, &options));
        assert_eq!(result, Ok(vec![]));
    }

    #[test]
    fn disposed_engine_is_unavailable() {
        let engine = engine();
        engine.disposed.store(true, Ordering::Release);

        let options = SearchOptions::with_max_items(1);
        let result = tokio_test::block_on(engine.nearby(latlon!(0.0, 0.0), &options));
        assert_eq!(result, Err(SearchError::EngineUnavailable));
    }
}
