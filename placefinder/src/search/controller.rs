use std::sync::Arc;

use placefinder_types::GeoCoordinates;
use tokio::sync::mpsc::UnboundedSender;

use super::{SearchEngine, SearchOptions, TextQuery};
use crate::app::Event;
use crate::async_runtime;
use crate::config::PlaceFinderOptions;
use crate::messenger::Messenger;
use crate::sequence::RequestId;

/// Runs search requests in the background and reports their results as [`Event`]s.
///
/// Requests are never cancelled. Every result is tagged with the id of its request, and it is up
/// to the receiver to drop results that are no longer relevant.
pub struct SearchController<S: SearchEngine + ?Sized> {
    engine: Arc<S>,
    suggestion_options: SearchOptions,
    nearby_options: SearchOptions,
    sink: ResponseSink,
}

impl<S: SearchEngine + ?Sized + 'static> SearchController<S> {
    /// Creates a controller that sends results into `responses`.
    pub fn new(
        engine: Arc<S>,
        options: &PlaceFinderOptions,
        responses: UnboundedSender<Event>,
    ) -> Self {
        Self {
            engine,
            suggestion_options: SearchOptions {
                max_items: options.suggestion_limit,
                language: options.language.clone(),
            },
            nearby_options: SearchOptions {
                max_items: options.nearby_limit,
                language: options.language.clone(),
            },
            sink: ResponseSink {
                sender: responses,
                messenger: None,
            },
        }
    }

    /// Sets the messenger notified after every delivered result.
    pub fn set_messenger(&mut self, messenger: Option<Arc<dyn Messenger>>) {
        self.sink.messenger = messenger;
    }

    /// Search engine used by the controller.
    pub fn engine(&self) -> &Arc<S> {
        &self.engine
    }

    /// Requests suggestions for the query. The result arrives as [`Event::SuggestionsReceived`].
    ///
    /// A blank query yields an empty list right away, without contacting the engine.
    ///
    /// Must be called within a tokio runtime.
    pub fn autosuggest(&self, request: RequestId, query: TextQuery) {
        if query.is_blank() {
            self.sink.send(Event::SuggestionsReceived {
                request,
                result: Ok(vec![]),
            });
            return;
        }

        log::debug!("Requesting suggestions {request} for '{}'", query.text);

        let engine = self.engine.clone();
        let options = self.suggestion_options.clone();
        let sink = self.sink.clone();
        async_runtime::spawn(async move {
            let result = engine.suggest(&query, &options).await;
            log::debug!("Suggestions {request} received");
            sink.send(Event::SuggestionsReceived { request, result });
        });
    }

    /// Requests places near the point. The result arrives as [`Event::NearbyReceived`].
    ///
    /// Must be called within a tokio runtime.
    pub fn fetch_nearby(&self, request: RequestId, coordinates: GeoCoordinates) {
        log::debug!("Requesting nearby places {request} around {coordinates}");

        let engine = self.engine.clone();
        let options = self.nearby_options.clone();
        let sink = self.sink.clone();
        async_runtime::spawn(async move {
            let result = engine.nearby(coordinates, &options).await;
            log::debug!("Nearby places {request} received");
            sink.send(Event::NearbyReceived { request, result });
        });
    }
}

#[derive(Clone)]
struct ResponseSink {
    sender: UnboundedSender<Event>,
    messenger: Option<Arc<dyn Messenger>>,
}

impl ResponseSink {
    fn send(&self, event: Event) {
        if self.sender.send(event).is_err() {
            log::debug!("Response receiver is dropped, discarding search result");
            return;
        }

        if let Some(messenger) = &self.messenger {
            log::trace!("Requesting redraw after search result");
            messenger.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert_matches::assert_matches;
    use placefinder_types::latlon;
    use tokio::sync::mpsc::unbounded_channel;

    use super::*;
    use crate::error::SearchError;
    use crate::fixtures::StaticSearchEngine;
    use crate::sequence::RequestSequence;

    fn controller(
        engine: StaticSearchEngine,
    ) -> (
        SearchController<StaticSearchEngine>,
        tokio::sync::mpsc::UnboundedReceiver<Event>,
    ) {
        let (sender, receiver) = unbounded_channel();
        let options = PlaceFinderOptions::builder()
            .with_suggestion_limit(2)
            .build()
            .unwrap();
        (
            SearchController::new(Arc::new(engine), &options, sender),
            receiver,
        )
    }

    #[tokio::test]
    async fn blank_query_does_not_reach_engine() {
        let (controller, mut receiver) = controller(StaticSearchEngine::berlin());
        let request = RequestSequence::new().issue();

        controller.autosuggest(request, TextQuery::new(" ", latlon!(52.5, 13.4)));

        let event = receiver.try_recv().unwrap();
        assert_eq!(
            event,
            Event::SuggestionsReceived {
                request,
                result: Ok(vec![])
            }
        );
        assert_eq!(controller.engine().suggest_calls(), 0);
    }

    #[tokio::test]
    async fn suggestions_are_tagged_and_limited() {
        let (controller, mut receiver) = controller(StaticSearchEngine::berlin());
        let request = RequestSequence::new().issue();

        controller.autosuggest(request, TextQuery::new("berlin", latlon!(52.5, 13.4)));

        let event = receiver.recv().await.unwrap();
        assert_matches!(
            event,
            Event::SuggestionsReceived { request: received, result: Ok(places) } => {
                assert_eq!(received, request);
                assert_eq!(places.len(), 2);
            }
        );
    }

    #[tokio::test]
    async fn errors_are_delivered_and_messenger_notified() {
        let engine = StaticSearchEngine::berlin();
        engine.fail_with(Some(SearchError::Authorization));
        let (mut controller, mut receiver) = controller(engine);

        let redraws = Arc::new(AtomicUsize::new(0));
        let counter = redraws.clone();
        controller.set_messenger(Some(Arc::new(move || {
            counter.fetch_add(1, Ordering::Relaxed);
        })));

        let request = RequestSequence::new().issue();
        controller.fetch_nearby(request, latlon!(52.52, 13.37));

        let event = receiver.recv().await.unwrap();
        assert_eq!(
            event,
            Event::NearbyReceived {
                request,
                result: Err(SearchError::Authorization)
            }
        );
        assert_eq!(redraws.load(Ordering::Relaxed), 1);
    }
}
