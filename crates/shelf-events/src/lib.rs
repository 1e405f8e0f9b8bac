mod event;
mod sink;

use std::sync::Arc;

pub use event::*;
pub use sink::*;

/// Shared handle to an event sink.
pub type EventSinkHandle = Arc<dyn EventSink>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_sink() {
        let (sink, rx) = ChannelSink::new();
        sink.emit(ShelfEvent::SyncStarted { total: 2 });
        sink.emit(ShelfEvent::EntrySyncing {
            entry_id: 1,
            name: "Zustand".to_string(),
        });
        sink.emit(ShelfEvent::EntrySynced {
            entry_id: 1,
            name: "Zustand".to_string(),
            popularity_score: 88,
            maintenance_score: 90,
        });

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], ShelfEvent::SyncStarted { total: 2 }));
        assert!(matches!(
            &events[2],
            ShelfEvent::EntrySynced {
                popularity_score: 88,
                ..
            }
        ));
    }

    #[test]
    fn test_channel_sink_receiver_dropped() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.emit(ShelfEvent::Log {
            level: LogLevel::Info,
            message: "orphaned".to_string(),
        });
    }

    #[test]
    fn test_collector_sink() {
        let sink = CollectorSink::default();
        assert!(sink.is_empty());

        sink.emit(ShelfEvent::EntrySyncFailed {
            entry_id: 3,
            name: "Axios".to_string(),
            error: "Failed to fetch repository metrics".to_string(),
        });
        sink.emit(ShelfEvent::SyncComplete {
            success_count: 0,
            fail_count: 1,
        });

        assert_eq!(sink.len(), 2);
        assert_eq!(
            sink.events()[1],
            ShelfEvent::SyncComplete {
                success_count: 0,
                fail_count: 1
            }
        );
    }

    #[test]
    fn test_event_sink_handle() {
        let collector = Arc::new(CollectorSink::default());
        let sink: EventSinkHandle = collector.clone();
        sink.emit(ShelfEvent::SyncStarted { total: 0 });
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn test_event_sink_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ChannelSink>();
        assert_send_sync::<CollectorSink>();
    }
}
