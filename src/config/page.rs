use super::settings::Settings;
use crate::dom::{attrs, Document, NodeId};
use crate::models::{BannerKind, NestedList, OneShotBanner, SessionWindow, WindowKind};
use chrono::Duration;
use tracing::debug;

/// Nodes and timing of the redirect overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectConfig {
    pub node: NodeId,
    pub lead_seconds: i64,
    pub auto_navigate: bool,
    pub link: Option<NodeId>,
    pub title: Option<NodeId>,
    pub cancel: Option<NodeId>,
    pub progress: Option<NodeId>,
    pub count: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackConfig {
    pub node: NodeId,
    pub minutes_before_end: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartCountdownConfig {
    pub node: NodeId,
    pub cover: Option<NodeId>,
}

/// Everything the page's markup configures, read once at init and on refresh
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageConfig {
    pub redirect: Option<RedirectConfig>,
    pub windows: Vec<SessionWindow>,
    pub nested: Vec<NestedList>,
    pub live_upcoming: Option<NodeId>,
    pub banners: Vec<OneShotBanner>,
    pub feedback: Option<FeedbackConfig>,
    pub start_countdown: Option<StartCountdownConfig>,
}

fn positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(attrs::parse_int).filter(|n| *n > 0)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl PageConfig {
    pub fn from_document(doc: &Document, settings: &Settings) -> Self {
        let root = doc.root();

        let redirect = doc.query(root, attrs::NEXT_REDIRECT).map(|node| {
            let lead_seconds = positive(doc.attr(node, attrs::NEXT_REDIRECT))
                .unwrap_or(settings.redirect.lead_seconds);
            let auto_navigate = doc
                .attr(node, attrs::NEXT_REDIRECT_AUTO)
                .and_then(parse_bool)
                .unwrap_or(settings.redirect.auto_navigate);
            RedirectConfig {
                node,
                lead_seconds,
                auto_navigate,
                link: doc.query(node, attrs::NEXT_REDIRECT_LINK),
                title: doc.query(node, attrs::NEXT_REDIRECT_TITLE),
                cancel: doc.query(node, attrs::NEXT_REDIRECT_CANCEL),
                progress: doc.query(node, attrs::NEXT_REDIRECT_PROGRESS),
                count: doc.query(node, attrs::NEXT_REDIRECT_COUNT),
            }
        });

        let limit_of = |node: NodeId, attr: &str| {
            positive(doc.attr(node, attr))
                .map(|n| n as usize)
                .unwrap_or(settings.containers.default_limit)
        };
        let mut windows: Vec<SessionWindow> = doc
            .query_all(root, attrs::UPCOMING_SESSIONS)
            .into_iter()
            .map(|node| {
                SessionWindow::new(node, WindowKind::Upcoming, limit_of(node, attrs::UPCOMING_SESSIONS))
            })
            .collect();
        windows.extend(doc.query_all(root, attrs::LIVE_SESSIONS).into_iter().map(|node| {
            SessionWindow::new(node, WindowKind::Live, limit_of(node, attrs::LIVE_SESSIONS))
        }));

        let nested = doc
            .query_all(root, attrs::AGENDA_NEXT)
            .into_iter()
            .filter_map(|node| {
                let parent_id = doc.attr(node, attrs::AGENDA_NEXT)?.trim();
                (!parent_id.is_empty()).then(|| NestedList {
                    node,
                    parent_id: parent_id.to_string(),
                })
            })
            .collect();

        let mut banners = Vec::new();
        if let Some(node) = doc.query(root, attrs::SESSION_ENDED) {
            banners.push(OneShotBanner {
                node,
                kind: BannerKind::Ended,
                delay: settings.banners.ended_delay(),
            });
        }
        if let Some(node) = doc.query(root, attrs::SESSION_ONDEMAND) {
            let delay = doc
                .attr(node, attrs::SESSION_ONDEMAND)
                .and_then(attrs::parse_int)
                .and_then(Duration::try_minutes);
            match delay {
                Some(delay) => banners.push(OneShotBanner {
                    node,
                    kind: BannerKind::OnDemand,
                    delay,
                }),
                None => debug!(node, "on-demand banner without a usable delay, ignored"),
            }
        }

        let feedback = doc.query(root, attrs::SESSION_FEEDBACK).map(|node| FeedbackConfig {
            node,
            minutes_before_end: positive(doc.attr(node, attrs::SESSION_FEEDBACK))
                .unwrap_or(settings.banners.feedback_minutes),
        });

        let start_countdown = doc
            .query(root, attrs::START_COUNTDOWN)
            .map(|node| StartCountdownConfig {
                node,
                cover: doc.query(root, attrs::NEXT_SESSION_COVER),
            });

        let config = Self {
            redirect,
            windows,
            nested,
            live_upcoming: doc.query(root, attrs::LIVE_UPCOMING_SESSIONS),
            banners,
            feedback,
            start_countdown,
        };
        debug!(
            windows = config.windows.len(),
            nested = config.nested.len(),
            banners = config.banners.len(),
            redirect = config.redirect.is_some(),
            "page config read"
        );
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Element;

    fn page() -> Document {
        let mut doc = Document::new("https://event.example.com/sessions/keynote");
        let root = doc.root();
        let overlay = doc.append_child(root, Element::new("div").with_attr(attrs::NEXT_REDIRECT, "20"));
        doc.append_child(overlay, Element::new("a").with_attr(attrs::NEXT_REDIRECT_LINK, ""));
        doc.append_child(overlay, Element::new("div").with_attr(attrs::NEXT_REDIRECT_COUNT, ""));
        doc.append_child(root, Element::new("div").with_attr(attrs::UPCOMING_SESSIONS, "5"));
        doc.append_child(root, Element::new("div").with_attr(attrs::LIVE_SESSIONS, "0"));
        doc.append_child(root, Element::new("div").with_attr(attrs::AGENDA_NEXT, "keynote"));
        doc.append_child(root, Element::new("div").with_attr(attrs::AGENDA_NEXT, ""));
        doc.append_child(root, Element::new("div").with_attr(attrs::SESSION_ENDED, ""));
        doc.append_child(root, Element::new("div").with_attr(attrs::SESSION_ONDEMAND, "45"));
        doc.append_child(root, Element::new("div").with_attr(attrs::SESSION_FEEDBACK, "abc"));
        doc
    }

    #[test]
    fn test_reads_redirect_overlay() {
        let doc = page();
        let config = PageConfig::from_document(&doc, &Settings::default());
        let redirect = config.redirect.unwrap();
        assert_eq!(redirect.lead_seconds, 20);
        assert!(!redirect.auto_navigate);
        assert!(redirect.link.is_some());
        assert!(redirect.count.is_some());
        assert!(redirect.progress.is_none());
        assert!(redirect.cancel.is_none());
    }

    #[test]
    fn test_container_limits_fall_back() {
        let doc = page();
        let config = PageConfig::from_document(&doc, &Settings::default());
        assert_eq!(config.windows.len(), 2);
        assert_eq!(config.windows[0].kind, WindowKind::Upcoming);
        assert_eq!(config.windows[0].limit, 5);
        assert_eq!(config.windows[1].kind, WindowKind::Live);
        assert_eq!(config.windows[1].limit, 3);
        assert_eq!(config.nested.len(), 1);
        assert_eq!(config.nested[0].parent_id, "keynote");
    }

    #[test]
    fn test_banners_and_feedback() {
        let doc = page();
        let config = PageConfig::from_document(&doc, &Settings::default());
        assert_eq!(config.banners.len(), 2);
        assert_eq!(config.banners[0].kind, BannerKind::Ended);
        assert_eq!(config.banners[0].delay, Duration::seconds(30));
        assert_eq!(config.banners[1].kind, BannerKind::OnDemand);
        assert_eq!(config.banners[1].delay, Duration::minutes(45));
        assert_eq!(config.feedback.unwrap().minutes_before_end, 10);
        assert!(config.start_countdown.is_none());
    }

    #[test]
    fn test_auto_attribute_overrides_settings() {
        let mut doc = page();
        let overlay = doc.query(doc.root(), attrs::NEXT_REDIRECT).unwrap();
        doc.set_attr(overlay, attrs::NEXT_REDIRECT_AUTO, "true");
        let config = PageConfig::from_document(&doc, &Settings::default());
        assert!(config.redirect.unwrap().auto_navigate);

        let mut settings = Settings::default();
        settings.redirect.auto_navigate = true;
        doc.set_attr(overlay, attrs::NEXT_REDIRECT_AUTO, "false");
        let config = PageConfig::from_document(&doc, &settings);
        assert!(!config.redirect.unwrap().auto_navigate);
    }
}
