use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{
    BidAcceptedEvent,
    BidPlacedEvent,
    EventHandler,
    EventProducer,
    Handler,
    LoadMatchedEvent,
    LoadPublishedEvent,
    TripCancelledEvent,
    TripCompletedEvent,
};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub load_published_producer: Vec<EventProducer<LoadPublishedEvent>>,
    pub load_matched_producer: Vec<EventProducer<LoadMatchedEvent>>,
    pub bid_placed_producer: Vec<EventProducer<BidPlacedEvent>>,
    pub bid_accepted_producer: Vec<EventProducer<BidAcceptedEvent>>,
    pub trip_completed_producer: Vec<EventProducer<TripCompletedEvent>>,
    pub trip_cancelled_producer: Vec<EventProducer<TripCancelledEvent>>,
}

pub struct EventHandlers {
    pub on_load_published: Option<EventHandler<LoadPublishedEvent>>,
    pub on_load_matched: Option<EventHandler<LoadMatchedEvent>>,
    pub on_bid_placed: Option<EventHandler<BidPlacedEvent>>,
    pub on_bid_accepted: Option<EventHandler<BidAcceptedEvent>>,
    pub on_trip_completed: Option<EventHandler<TripCompletedEvent>>,
    pub on_trip_cancelled: Option<EventHandler<TripCancelledEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_load_published = hooks.on_load_published.map(|f| EventHandler::new(buffer_size, f));
        let on_load_matched = hooks.on_load_matched.map(|f| EventHandler::new(buffer_size, f));
        let on_bid_placed = hooks.on_bid_placed.map(|f| EventHandler::new(buffer_size, f));
        let on_bid_accepted = hooks.on_bid_accepted.map(|f| EventHandler::new(buffer_size, f));
        let on_trip_completed = hooks.on_trip_completed.map(|f| EventHandler::new(buffer_size, f));
        let on_trip_cancelled = hooks.on_trip_cancelled.map(|f| EventHandler::new(buffer_size, f));
        Self { on_load_published, on_load_matched, on_bid_placed, on_bid_accepted, on_trip_completed, on_trip_cancelled }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_load_published {
            result.load_published_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_load_matched {
            result.load_matched_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_bid_placed {
            result.bid_placed_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_bid_accepted {
            result.bid_accepted_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_trip_completed {
            result.trip_completed_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_trip_cancelled {
            result.trip_cancelled_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_load_published {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_load_matched {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_bid_placed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_bid_accepted {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_trip_completed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_trip_cancelled {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_load_published: Option<Handler<LoadPublishedEvent>>,
    pub on_load_matched: Option<Handler<LoadMatchedEvent>>,
    pub on_bid_placed: Option<Handler<BidPlacedEvent>>,
    pub on_bid_accepted: Option<Handler<BidAcceptedEvent>>,
    pub on_trip_completed: Option<Handler<TripCompletedEvent>>,
    pub on_trip_cancelled: Option<Handler<TripCancelledEvent>>,
}

impl EventHooks {
    pub fn on_load_published<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(LoadPublishedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_load_published = Some(Arc::new(f));
        self
    }

    pub fn on_load_matched<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(LoadMatchedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_load_matched = Some(Arc::new(f));
        self
    }

    pub fn on_bid_placed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(BidPlacedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_bid_placed = Some(Arc::new(f));
        self
    }

    pub fn on_bid_accepted<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(BidAcceptedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_bid_accepted = Some(Arc::new(f));
        self
    }

    pub fn on_trip_completed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(TripCompletedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_trip_completed = Some(Arc::new(f));
        self
    }

    pub fn on_trip_cancelled<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(TripCancelledEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_trip_cancelled = Some(Arc::new(f));
        self
    }
}
