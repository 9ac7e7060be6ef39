//! Event filters.
//!
//! An [`EventFilter`] is a pure predicate over an [`Event`]. Filters gate
//! entry into the handler chain: an entry runs if **any** of its filters
//! accepts the event, and an entry with no filters accepts everything.
//!
//! ```rust,ignore
//! use switchyard_framework::EventFilter;
//! use switchyard_core::{EventKind, MessageEvent};
//!
//! let by_kind = EventFilter::kind(EventKind::PinAdded);
//! let by_type = EventFilter::of::<MessageEvent>();
//! let by_channel = EventFilter::channel("C0123456");
//! let custom = EventFilter::new(|event| event.channel().is_some_and(|c| c.starts_with('D')));
//! ```

use std::fmt;
use std::sync::Arc;

use switchyard_core::{Event, EventKind, FromEvent};

/// A type-erased predicate function.
pub type PredicateFn = Arc<dyn Fn(&Event) -> bool + Send + Sync>;

/// A cheap-to-clone, side-effect free predicate over events.
#[derive(Clone)]
pub struct EventFilter {
    predicate: PredicateFn,
    label: FilterLabel,
}

#[derive(Clone)]
enum FilterLabel {
    Kind(EventKind),
    Channel(Arc<str>),
    Custom,
}

impl EventFilter {
    /// Wraps an arbitrary predicate.
    ///
    /// The predicate must not have side effects; it may be called any number
    /// of times and from many tasks at once.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            label: FilterLabel::Custom,
        }
    }

    /// Matches events of exactly this kind.
    pub fn kind(kind: EventKind) -> Self {
        Self {
            predicate: Arc::new(move |event: &Event| event.kind() == kind),
            label: FilterLabel::Kind(kind),
        }
    }

    /// Matches events that narrow to the payload type `T`.
    pub fn of<T: FromEvent>() -> Self {
        Self::kind(T::KIND)
    }

    /// Matches events of the same kind as `example`.
    pub fn like(example: &Event) -> Self {
        Self::kind(example.kind())
    }

    /// Matches events whose channel equals `channel`.
    ///
    /// Kinds that carry no channel never match.
    pub fn channel(channel: impl Into<String>) -> Self {
        let target: Arc<str> = Arc::from(channel.into());
        let wanted = Arc::clone(&target);
        Self {
            predicate: Arc::new(move |event: &Event| event.channel() == Some(&*wanted)),
            label: FilterLabel::Channel(target),
        }
    }

    /// Evaluates the filter.
    pub fn matches(&self, event: &Event) -> bool {
        (self.predicate)(event)
    }
}

impl fmt::Debug for EventFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            FilterLabel::Kind(kind) => f.debug_tuple("EventFilter::Kind").field(kind).finish(),
            FilterLabel::Channel(channel) => f
                .debug_tuple("EventFilter::Channel")
                .field(&&**channel)
                .finish(),
            FilterLabel::Custom => f.write_str("EventFilter::Custom"),
        }
    }
}

/// Returns `true` if any filter accepts `event`, or if there are no filters.
///
/// Filters are evaluated in order and evaluation stops at the first match.
pub fn any_match(filters: &[EventFilter], event: &Event) -> bool {
    filters.is_empty() || filters.iter().any(|filter| filter.matches(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use switchyard_core::{
        AppHomeOpenedEvent, AppMentionEvent, AppUninstalledEvent, LinkSharedEvent,
        MemberJoinedChannelEvent, MessageEvent, PinAddedEvent, PinRemovedEvent, TeamJoinEvent,
    };

    fn one_of_each(channel: &str) -> Vec<Event> {
        let channel = channel.to_string();
        vec![
            Event::Message(MessageEvent {
                channel: channel.clone(),
                ..Default::default()
            }),
            Event::AppMention(AppMentionEvent {
                channel: channel.clone(),
                ..Default::default()
            }),
            Event::PinAdded(PinAddedEvent {
                channel: channel.clone(),
                ..Default::default()
            }),
            Event::PinRemoved(PinRemovedEvent {
                channel: channel.clone(),
                ..Default::default()
            }),
            Event::MemberJoinedChannel(MemberJoinedChannelEvent {
                channel: channel.clone(),
                ..Default::default()
            }),
            Event::LinkShared(LinkSharedEvent {
                channel: channel.clone(),
                ..Default::default()
            }),
            Event::AppHomeOpened(AppHomeOpenedEvent {
                channel,
                ..Default::default()
            }),
            Event::TeamJoin(TeamJoinEvent::default()),
            Event::AppUninstalled(AppUninstalledEvent::default()),
        ]
    }

    #[test]
    fn test_kind_filter() {
        let filter = EventFilter::kind(EventKind::PinAdded);
        for event in one_of_each("C1") {
            assert_eq!(filter.matches(&event), event.kind() == EventKind::PinAdded);
        }
    }

    #[test]
    fn test_kind_filter_from_type_and_example() {
        let msg = Event::Message(MessageEvent::default());
        assert!(EventFilter::of::<MessageEvent>().matches(&msg));
        assert!(EventFilter::like(&msg).matches(&msg));
        assert!(!EventFilter::of::<AppMentionEvent>().matches(&msg));
    }

    #[test]
    fn test_channel_filter_every_kind() {
        let filter = EventFilter::channel("C1");
        for event in one_of_each("C1") {
            assert_eq!(filter.matches(&event), event.channel().is_some());
        }
        for event in one_of_each("C2") {
            assert!(!filter.matches(&event));
        }
    }

    #[test]
    fn test_empty_filter_set_matches_everything() {
        for event in one_of_each("C1") {
            assert!(any_match(&[], &event));
        }
    }

    #[test]
    fn test_any_match_is_disjunction() {
        let filters = [
            EventFilter::kind(EventKind::TeamJoin),
            EventFilter::channel("C1"),
        ];
        for event in one_of_each("C1").into_iter().chain(one_of_each("C2")) {
            let expected = filters[0].matches(&event) || filters[1].matches(&event);
            assert_eq!(any_match(&filters, &event), expected);
        }
    }

    #[test]
    fn test_any_match_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let filters = [
            EventFilter::new(|_| true),
            EventFilter::new(move |_| {
                counted.fetch_add(1, Ordering::SeqCst);
                true
            }),
        ];

        assert!(any_match(&filters, &Event::TeamJoin(TeamJoinEvent::default())));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_debug_labels() {
        assert_eq!(
            format!("{:?}", EventFilter::kind(EventKind::Message)),
            "EventFilter::Kind(Message)"
        );
        assert_eq!(
            format!("{:?}", EventFilter::channel("C7")),
            "EventFilter::Channel(\"C7\")"
        );
    }
}
