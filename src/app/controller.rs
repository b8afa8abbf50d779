use crate::config::{PageConfig, Settings};
use crate::datetime::{TimeParser, ViewerZone};
use crate::dom::Document;
use crate::models::{PromptTick, Snapshot, Transition};
use crate::schedule::{
    BannerEvent, BannerWatcher, Notice, SessionClock, TransitionNotifier, VisibilityProjector,
    WindowReport, WindowUpdater,
};
use chrono::{DateTime, Duration, Utc};
use tracing::info;

use super::report::StatusReport;

/// What an overlay check changed
#[derive(Debug, Clone, Default)]
pub struct OverlayOutcome {
    pub notice: Option<Notice>,
    pub banners: Vec<BannerEvent>,
}

/// Owns the page and every component that reads or writes it.
///
/// Components never reach each other directly; the controller passes the
/// clock's snapshot to whoever needs the session list.
pub struct PageController {
    doc: Document,
    settings: Settings,
    page: PageConfig,
    clock: SessionClock,
    projector: VisibilityProjector,
    windows: WindowUpdater,
    notifier: TransitionNotifier,
    banners: BannerWatcher,
    last_windows: WindowReport,
    banner_log: Vec<BannerEvent>,
    feedback_visible: bool,
    navigations: Vec<String>,
}

impl PageController {
    pub fn new(doc: Document, settings: Settings, zone: ViewerZone) -> Self {
        let parser = TimeParser::new(settings.time.source_offset_minutes);
        let containers = &settings.containers;
        let windows = WindowUpdater::new(
            parser,
            containers.nested_buffer(),
            containers.live_upcoming_hide(),
            containers.start_countdown_hide(),
        );
        let buffer = settings.redirect.next_session_buffer();

        Self {
            doc,
            page: PageConfig::default(),
            clock: SessionClock::new(parser),
            projector: VisibilityProjector::new(zone),
            windows,
            notifier: TransitionNotifier::new(None, buffer),
            banners: BannerWatcher::new(),
            last_windows: WindowReport::default(),
            banner_log: Vec::new(),
            feedback_visible: false,
            navigations: Vec::new(),
            settings,
        }
    }

    fn buffer(&self) -> Duration {
        self.settings.redirect.next_session_buffer()
    }

    /// Discover sessions, read the page configuration and run every pass once.
    /// Stands in for a page load, so the prompt starts with no claimed sessions.
    pub fn init(&mut self, now: DateTime<Utc>) -> (Vec<Transition>, OverlayOutcome) {
        self.scan();
        self.notifier = TransitionNotifier::new(self.page.redirect.as_ref(), self.buffer());
        self.notifier.hide_overlay(&mut self.doc, self.page.redirect.as_ref());
        self.run_passes(now)
    }

    fn scan(&mut self) {
        self.clock.discover(&self.doc);
        self.page = PageConfig::from_document(&self.doc, &self.settings);
    }

    fn run_passes(&mut self, now: DateTime<Utc>) -> (Vec<Transition>, OverlayOutcome) {
        let transitions = self.poll(now);
        let outcome = self.overlay_check(now);
        (transitions, outcome)
    }

    /// Full reclassification and projection
    pub fn poll(&mut self, now: DateTime<Utc>) -> Vec<Transition> {
        let transitions = self.clock.poll(&self.doc, now);
        let snapshot = self.clock.snapshot();
        self.projector.apply_all(&mut self.doc, snapshot, now);
        self.last_windows = self.windows.update(&mut self.doc, &self.page, snapshot, now);
        self.projector.render_time_copy(&mut self.doc, snapshot);
        transitions
    }

    /// Per-second digits only
    pub fn countdown_tick(&mut self, now: DateTime<Utc>) {
        self.projector
            .tick_countdowns(&mut self.doc, self.clock.snapshot(), now);
    }

    /// Prompt trigger, banners, feedback and the start countdown
    pub fn overlay_check(&mut self, now: DateTime<Utc>) -> OverlayOutcome {
        let snapshot = self.clock.snapshot();
        let notice = self
            .notifier
            .check(&mut self.doc, self.page.redirect.as_ref(), snapshot, now);
        let banners = self
            .banners
            .check(&mut self.doc, &self.page.banners, snapshot, now);
        self.feedback_visible =
            self.banners
                .update_feedback(&mut self.doc, self.page.feedback.as_ref(), snapshot, now);
        self.last_windows.start_countdown = self.windows.update_start_countdown_only(
            &mut self.doc,
            &self.page,
            snapshot,
            now,
        );

        self.banner_log.extend(banners.iter().cloned());
        OverlayOutcome { notice, banners }
    }

    /// Re-render localized copy once the page settles
    pub fn load_settled(&mut self) {
        self.projector
            .render_time_copy(&mut self.doc, self.clock.snapshot());
    }

    pub fn prompt_tick(&mut self) -> PromptTick {
        self.notifier
            .prompt_tick(&mut self.doc, self.page.redirect.as_ref())
    }

    pub fn cancel_prompt(&mut self) -> bool {
        self.notifier
            .cancel(&mut self.doc, self.page.redirect.as_ref())
    }

    pub fn follow_link(&self) -> Option<String> {
        self.notifier.follow_link()
    }

    /// Move to another page: forget per-page state and start over
    pub fn navigate(&mut self, url: &str, now: DateTime<Utc>) -> (Vec<Transition>, OverlayOutcome) {
        info!(from = self.doc.location(), to = url, "navigating");
        self.navigations.push(url.to_string());
        self.doc.set_location(url);
        self.banners.reset();
        self.projector.forget();
        self.init(now)
    }

    /// Manual re-scan of the same page. Timers restart, so a visible prompt
    /// is dismissed, but sessions that already prompted never prompt again.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> (Vec<Transition>, OverlayOutcome) {
        info!("refreshing sessions");
        self.scan();
        self.notifier
            .reconfigure(self.page.redirect.as_ref(), self.buffer());
        self.notifier
            .cancel(&mut self.doc, self.page.redirect.as_ref());
        self.run_passes(now)
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.doc.set_hidden(hidden);
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn page(&self) -> &PageConfig {
        &self.page
    }

    pub fn snapshot(&self) -> &Snapshot {
        self.clock.snapshot()
    }

    pub fn notifier(&self) -> &TransitionNotifier {
        &self.notifier
    }

    pub fn zone(&self) -> &ViewerZone {
        self.projector.zone()
    }

    pub fn windows(&self) -> &WindowReport {
        &self.last_windows
    }

    pub fn banner_log(&self) -> &[BannerEvent] {
        &self.banner_log
    }

    pub fn feedback_visible(&self) -> bool {
        self.feedback_visible
    }

    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    pub fn report(&self, now: DateTime<Utc>) -> StatusReport {
        StatusReport::build(self, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{attrs, Display, Element, NodeId};

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
    }

    fn page() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new("https://event.example.com/sessions/keynote");
        let root = doc.root();
        let keynote = doc.append_child(
            root,
            Element::new("div")
                .with_attr(attrs::AGENDA_ITEM, "keynote")
                .with_attr(attrs::AGENDA_TITLE, "Opening Keynote")
                .with_attr(attrs::START_TIME, "2025-10-17 9:00")
                .with_attr(attrs::END_TIME, "2025-10-17 10:00"),
        );
        doc.append_child(keynote, Element::new("div").with_attr(attrs::DURING_SESSION, ""));
        doc.append_child(
            root,
            Element::new("div")
                .with_attr(attrs::AGENDA_ITEM, "panel")
                .with_attr(attrs::AGENDA_TITLE, "Panel")
                .with_attr(attrs::START_TIME, "2025-10-17 10:00")
                .with_attr(attrs::END_TIME, "2025-10-17 11:00"),
        );
        let overlay = doc.append_child(root, Element::new("div").with_attr(attrs::NEXT_REDIRECT, "15"));
        doc.append_child(overlay, Element::new("a").with_attr(attrs::NEXT_REDIRECT_LINK, ""));
        let ended = doc.append_child(
            root,
            Element::new("div").with_attr(attrs::SESSION_ENDED, "").with_class("hide"),
        );
        (doc, overlay, ended)
    }

    fn controller(doc: Document) -> PageController {
        PageController::new(doc, Settings::default(), ViewerZone::new("UTC", 0))
    }

    #[test]
    fn test_init_hides_prompt_and_projects() {
        let (doc, overlay, _) = page();
        let mut ctl = controller(doc);
        let (transitions, outcome) = ctl.init(at("2025-10-17T09:30:00-07:00"));

        assert_eq!(transitions.len(), 2);
        assert!(outcome.notice.is_none());
        assert_eq!(ctl.document().display(overlay), Display::None);
        assert_eq!(ctl.snapshot().count(crate::models::Phase::During), 1);
    }

    #[test]
    fn test_overlay_check_shows_then_cancel() {
        let (doc, overlay, _) = page();
        let mut ctl = controller(doc);
        ctl.init(at("2025-10-17T09:59:00-07:00"));

        let outcome = ctl.overlay_check(at("2025-10-17T09:59:50-07:00"));
        assert_eq!(outcome.notice, Some(Notice::Shown("panel".to_string())));
        assert_eq!(ctl.document().display(overlay), Display::Flex);
        assert_eq!(
            ctl.follow_link().as_deref(),
            Some("https://event.example.com/sessions/panel")
        );

        assert!(ctl.cancel_prompt());
        assert_eq!(ctl.document().display(overlay), Display::None);
        assert!(ctl.overlay_check(at("2025-10-17T09:59:55-07:00")).notice.is_none());
    }

    #[test]
    fn test_navigate_resets_page_state() {
        let (doc, _, ended) = page();
        let mut ctl = controller(doc);
        ctl.init(at("2025-10-17T10:01:00-07:00"));
        assert!(!ctl.document().has_class(ended, "hide"));
        assert_eq!(ctl.banner_log().len(), 1);

        ctl.document_mut().add_class(ended, "hide");
        ctl.navigate(
            "https://event.example.com/sessions/panel",
            at("2025-10-17T10:01:05-07:00"),
        );
        assert_eq!(ctl.navigations(), ["https://event.example.com/sessions/panel"]);
        // panel has not ended, so its banner stays hidden
        assert!(ctl.document().has_class(ended, "hide"));
        assert!(!ctl.notifier().prompt().has_shown("keynote"));
    }

    #[test]
    fn test_refresh_keeps_prompt_claims() {
        let (doc, overlay, _) = page();
        let mut ctl = controller(doc);
        ctl.init(at("2025-10-17T09:59:00-07:00"));
        let first = ctl.overlay_check(at("2025-10-17T09:59:50-07:00"));
        assert_eq!(first.notice, Some(Notice::Shown("panel".to_string())));

        ctl.document_mut().set_attr(overlay, attrs::NEXT_REDIRECT, "30");
        let (_, outcome) = ctl.refresh(at("2025-10-17T09:59:52-07:00"));
        assert!(outcome.notice.is_none());
        assert!(ctl.overlay_check(at("2025-10-17T09:59:55-07:00")).notice.is_none());
        assert_eq!(ctl.notifier().prompt().show_count(), 1);
        assert_eq!(ctl.notifier().prompt().lead_seconds, 30);
        // the countdown stopped with the refresh, so the overlay goes away
        assert!(ctl.notifier().prompt().active().is_none());
        assert_eq!(ctl.document().display(overlay), Display::None);
    }

    #[test]
    fn test_out_of_range_attributes_keep_polling() {
        let (mut doc, overlay, _) = page();
        let root = doc.root();
        doc.set_attr(overlay, attrs::NEXT_REDIRECT, "99999999999999");
        let odd = doc.append_child(
            root,
            Element::new("div")
                .with_attr(attrs::AGENDA_ITEM, "odd")
                .with_attr(attrs::START_TIME, "2025-10-17 12:00")
                .with_attr(attrs::END_TIME, "2025-10-17 13:00")
                .with_attr(attrs::DURING_OFFSET, "-999999999999"),
        );
        doc.append_child(odd, Element::new("div").with_attr(attrs::AFTER_SESSION, "999999999999999"));
        let mut ctl = controller(doc);

        let (_, outcome) = ctl.init(at("2025-10-17T09:30:00-07:00"));
        let snapshot = ctl.snapshot();
        assert_eq!(snapshot.sessions.len(), 3);
        // an offset beyond the calendar pulls the start all the way back
        assert_eq!(snapshot.by_id("odd").unwrap().phase, crate::models::Phase::During);
        assert_eq!(snapshot.by_id("keynote").unwrap().phase, crate::models::Phase::During);
        assert_eq!(snapshot.by_id("panel").unwrap().phase, crate::models::Phase::Before);

        // a lead longer than the calendar means the window is already open
        assert_eq!(outcome.notice, Some(Notice::Shown("panel".to_string())));
        assert_eq!(ctl.document().display(overlay), Display::Flex);
    }
}
