//! Tests for the tracker facade: startup, event handling and capture dispatch.

use super::*;
use crate::host::{Capabilities, Document, ElementSpec, MemoryHost};
use crate::model::ComputedStyle;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

type Captured = Rc<RefCell<Vec<ContentSnapshot>>>;

fn collector() -> (Captured, Option<SnapshotCallback>) {
    let captured: Captured = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&captured);
    let callback: SnapshotCallback = Box::new(move |snapshot| sink.borrow_mut().push(snapshot));
    (captured, Some(callback))
}

fn page() -> MemoryHost {
    MemoryHost::new([
        ElementSpec::new("div")
            .style(ComputedStyle::hidden())
            .child(ElementSpec::new("p").id("hidden").text("hidden"))
            .into(),
        ElementSpec::new("p").id("a").text("visible text").into(),
    ])
    .unwrap()
}

fn ms(value: u64) -> Millis {
    Millis::new(value)
}

fn set_ratio(tracker: &mut ViewportTracker<MemoryHost>, dom_id: &str, ratio: f64) {
    let node = tracker.host().lookup(dom_id).unwrap();
    assert!(tracker.host_mut().set_ratio(node, ratio), "{dom_id} is observed");
    tracker.deliver_pending();
}

mod startup {
    use super::*;

    #[test]
    fn watches_only_scan_eligible_elements() {
        let tracker = start_tracking(page(), &TrackerConfig::default(), None).unwrap();
        let a = tracker.host().lookup("a").unwrap();
        let hidden = tracker.host().lookup("hidden").unwrap();

        assert_eq!(tracker.registry().len(), 1);
        assert!(tracker.registry().contains(a));
        assert!(!tracker.host().is_observed(hidden));
    }

    #[test]
    fn listens_for_scroll_click_and_load() {
        let tracker = start_tracking(page(), &TrackerConfig::default(), None).unwrap();
        assert_eq!(tracker.host().listening(), &InteractionKind::ALL);
    }

    #[test]
    fn registers_structural_observer_on_body() {
        let tracker = start_tracking(page(), &TrackerConfig::default(), None).unwrap();
        let body = tracker.host().body().unwrap();
        assert_eq!(
            tracker.host().mutation_registration(),
            Some((body, MutationObserverInit::structural_subtree()))
        );
    }

    #[test]
    fn missing_intersection_facility_fails_fast() {
        let host = page().with_capabilities(Capabilities {
            intersection: false,
            mutation: true,
        });
        let result = start_tracking(host, &TrackerConfig::default(), None);
        assert_eq!(
            result.err(),
            Some(TrackerError::UnsupportedHost {
                facility: Facility::Intersection
            })
        );
    }

    #[test]
    fn missing_mutation_facility_fails_fast() {
        let host = page().with_capabilities(Capabilities {
            intersection: true,
            mutation: false,
        });
        let result = start_tracking(host, &TrackerConfig::default(), None);
        assert_eq!(
            result.err(),
            Some(TrackerError::UnsupportedHost {
                facility: Facility::Mutation
            })
        );
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let config = TrackerConfig {
            threshold: 0.0,
            ..TrackerConfig::default()
        };
        assert_eq!(
            start_tracking(page(), &config, None).err(),
            Some(TrackerError::InvalidThreshold(0.0))
        );

        let config = TrackerConfig {
            quiet_period_ms: 0,
            ..TrackerConfig::default()
        };
        assert_eq!(
            start_tracking(page(), &config, None).err(),
            Some(TrackerError::InvalidQuietPeriod)
        );
    }

    #[test]
    fn document_without_body_starts_with_nothing_watched() {
        let tracker =
            start_tracking(MemoryHost::without_body(), &TrackerConfig::default(), None).unwrap();
        assert!(tracker.registry().is_empty());
        assert!(tracker.host().mutation_registration().is_none());
    }
}

mod capture {
    use super::*;

    #[test]
    fn visible_paragraph_is_captured_then_dropped() {
        let (captured, callback) = collector();
        let mut tracker = start_tracking(page(), &TrackerConfig::default(), callback).unwrap();

        set_ratio(&mut tracker, "a", 0.9);
        tracker.on_interaction(InteractionKind::Scroll, ms(0));
        assert!(tracker.tick(ms(1000)));

        set_ratio(&mut tracker, "a", 0.5);
        tracker.on_interaction(InteractionKind::Scroll, ms(2000));
        assert!(tracker.tick(ms(3000)));

        let captured = captured.borrow();
        assert_eq!(captured.len(), 2);
        assert_eq!(
            serde_json::to_value(&captured[0]).unwrap(),
            serde_json::json!({ "p": ["visible text"] })
        );
        assert!(captured[1].is_empty());
    }

    #[test]
    fn burst_of_scrolls_captures_once_after_quiet_period() {
        let (captured, callback) = collector();
        let mut tracker = start_tracking(page(), &TrackerConfig::default(), callback).unwrap();

        for at in [0, 200, 400] {
            tracker.on_interaction(InteractionKind::Scroll, ms(at));
        }
        assert!(!tracker.tick(ms(1399)));
        assert_eq!(tracker.next_deadline(), Some(ms(1400)));
        assert!(tracker.tick(ms(1400)));
        assert!(!tracker.tick(ms(5000)));

        assert_eq!(captured.borrow().len(), 1);
        assert_eq!(tracker.captures(), 1);
    }

    #[test]
    fn spaced_out_events_capture_each_time() {
        let (captured, callback) = collector();
        let mut tracker = start_tracking(page(), &TrackerConfig::default(), callback).unwrap();

        for at in [0, 1500, 3000] {
            tracker.on_interaction(InteractionKind::Click, ms(at));
        }
        tracker.tick(ms(10_000));

        assert_eq!(captured.borrow().len(), 3);
    }

    #[test]
    fn custom_quiet_period_is_used() {
        let (captured, callback) = collector();
        let config = TrackerConfig {
            quiet_period_ms: 250,
            ..TrackerConfig::default()
        };
        let mut tracker = start_tracking(page(), &config, callback).unwrap();

        tracker.on_interaction(InteractionKind::Load, ms(100));
        assert!(!tracker.tick(ms(349)));
        assert!(tracker.tick(ms(350)));
        assert_eq!(captured.borrow().len(), 1);
    }

    /// Run `f` with a scoped subscriber and return everything it logged.
    fn logged_during(f: impl FnOnce()) -> String {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buffer);
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || SharedBuffer(Arc::clone(&sink)))
            .finish();

        tracing::subscriber::with_default(subscriber, f);

        let bytes = buffer.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn default_dump_is_used_without_callback() {
        let output = logged_during(|| {
            let mut tracker = start_tracking(page(), &TrackerConfig::default(), None).unwrap();
            set_ratio(&mut tracker, "a", 1.0);

            tracker.on_interaction(InteractionKind::Scroll, ms(0));
            assert!(tracker.tick(ms(1000)));
            assert_eq!(tracker.captures(), 1);
        });

        assert!(output.contains("the following text has been captured"), "{output}");
        assert!(output.contains("\"p\": [\n    \"visible text\"\n  ]"), "{output}");
        assert!(output.contains("texts=1"), "{output}");
    }

    #[test]
    fn callback_replaces_default_dump() {
        let (captured, callback) = collector();
        let output = logged_during(|| {
            let mut tracker =
                start_tracking(page(), &TrackerConfig::default(), callback).unwrap();
            set_ratio(&mut tracker, "a", 1.0);

            tracker.on_interaction(InteractionKind::Scroll, ms(0));
            assert!(tracker.tick(ms(1000)));
        });

        assert_eq!(captured.borrow().len(), 1);
        assert!(!output.contains("the following text has been captured"), "{output}");
    }

    #[test]
    fn snapshot_does_not_dispatch() {
        let (captured, callback) = collector();
        let mut tracker = start_tracking(page(), &TrackerConfig::default(), callback).unwrap();
        set_ratio(&mut tracker, "a", 0.8);

        let snapshot = tracker.snapshot();

        assert_eq!(snapshot.texts("p").unwrap(), &["visible text".to_string()]);
        assert!(captured.borrow().is_empty());
        assert_eq!(tracker.captures(), 0);
    }
}

mod dynamic {
    use super::*;

    #[test]
    fn inserted_element_is_tracked_and_captured() {
        let (captured, callback) = collector();
        let mut tracker = start_tracking(page(), &TrackerConfig::default(), callback).unwrap();
        let body = tracker.host().body().unwrap();

        tracker
            .host_mut()
            .append_child(body, &ElementSpec::new("h2").id("late").text("Late title").into())
            .unwrap();
        tracker.deliver_pending();
        set_ratio(&mut tracker, "late", 0.76);

        tracker.on_interaction(InteractionKind::Scroll, ms(0));
        tracker.tick(ms(1000));

        assert_eq!(tracker.registry().len(), 2);
        assert_eq!(
            captured.borrow()[0].texts("h2").unwrap(),
            &["Late title".to_string()]
        );
    }

    #[test]
    fn inserted_hidden_element_is_watched_anyway() {
        let mut tracker = start_tracking(page(), &TrackerConfig::default(), None).unwrap();
        let body = tracker.host().body().unwrap();

        let hidden = tracker
            .host_mut()
            .append_child(body, &ElementSpec::new("aside").style(ComputedStyle::hidden()).into())
            .unwrap();
        tracker.deliver_pending();

        assert!(tracker.registry().contains(hidden));
    }

    #[test]
    fn removal_revokes_registration_but_not_visibility() {
        let mut tracker = start_tracking(page(), &TrackerConfig::default(), None).unwrap();
        set_ratio(&mut tracker, "a", 0.9);
        let a = tracker.host().lookup("a").unwrap();

        tracker.host_mut().remove(a).unwrap();
        tracker.deliver_pending();

        assert!(!tracker.registry().contains(a));
        assert!(!tracker.host().is_observed(a));
        // Only intersection reports change visibility.
        assert!(tracker.visible().contains(a));
    }

    #[test]
    fn custom_excluded_tags_apply_to_scan_and_insertion() {
        let config = TrackerConfig {
            excluded_tags: vec!["p".to_string()],
            ..TrackerConfig::default()
        };
        let mut tracker = start_tracking(page(), &config, None).unwrap();
        assert!(tracker.registry().is_empty());

        let body = tracker.host().body().unwrap();
        let script = tracker
            .host_mut()
            .append_child(body, &ElementSpec::new("script").into())
            .unwrap();
        tracker.deliver_pending();
        assert!(
            tracker.registry().contains(script),
            "script is allowed once the exclusion list is replaced"
        );
    }
}
